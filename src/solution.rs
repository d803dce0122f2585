use colored::Colorize;
use uuid::Uuid;

use std::fmt;

use crate::error::{Result, SimplexError};
use crate::model::Model;
use crate::tableau::Tableau;
use crate::var::Variable;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolutionStatus {
    Optimal,
    Unbounded,
    Infeasible,
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "optimal"),
            SolutionStatus::Unbounded => write!(f, "unbounded"),
            SolutionStatus::Infeasible => write!(f, "infeasible"),
        }
    }
}

/// Outcome of one solve.
///
/// The assignment covers every column of the final tableau (original
/// variables first, then slack, surplus and, for infeasible programs,
/// artificial variables). For unbounded and infeasible programs it is the
/// last basic solution visited and only useful for diagnostics.
///
/// The objective value is `+inf`/`-inf` for unbounded maximization and
/// minimization and NaN for infeasible programs.
#[derive(Clone, Debug)]
pub struct Solution {
    status: SolutionStatus,
    model_id: Uuid,
    obj_fn_val: f64,
    var_values: Vec<f64>,
    var_names: Vec<String>,
    initial_tableau: Tableau,
    tableau: Tableau,
}

impl Solution {
    pub(crate) fn new(
        status: SolutionStatus,
        model: &Model,
        obj_fn_val: f64,
        var_values: Vec<f64>,
        initial_tableau: Tableau,
        tableau: Tableau,
    ) -> Self {
        Self {
            status,
            model_id: model.id,
            obj_fn_val,
            var_values,
            var_names: model
                .variables()
                .iter()
                .map(|v| v.name().to_string())
                .collect(),
            initial_tableau,
            tableau,
        }
    }

    pub fn status(&self) -> SolutionStatus {
        self.status
    }

    pub fn is_bounded(&self) -> bool {
        self.status != SolutionStatus::Unbounded
    }

    pub fn is_feasible(&self) -> bool {
        self.status != SolutionStatus::Infeasible
    }

    pub fn objective_value(&self) -> f64 {
        self.obj_fn_val
    }

    /// Values of `model`'s variables, in model order.
    pub fn assignment(&self, model: &Model) -> Vec<f64> {
        (0..model.variables().len())
            .map(|i| self.var_values.get(i).copied().unwrap_or(0.0_f64))
            .collect()
    }

    /// Value of `var`, which must belong to the solved model or a copy of it.
    pub fn value(&self, var: &Variable) -> Result<f64> {
        if var.model_id() != self.model_id || var.index() >= self.var_names.len() {
            return Err(SimplexError::ForeignVariable(var.name().to_string()));
        }
        Ok(self.var_values.get(var.index()).copied().unwrap_or(0.0_f64))
    }

    /// First tableau built: the phase one tableau when artificial variables
    /// were needed, the slack basis tableau otherwise.
    pub fn initial_tableau(&self) -> &Tableau {
        &self.initial_tableau
    }

    pub fn tableau(&self) -> &Tableau {
        &self.tableau
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.status {
            SolutionStatus::Optimal => {
                writeln!(f, "{} (objective {})", self.status.to_string().green(), self.obj_fn_val)?;
                for (name, val) in self.var_names.iter().zip(self.var_values.iter()) {
                    writeln!(f, "  {} = {}", name, val)?;
                }
                Ok(())
            }
            SolutionStatus::Unbounded => writeln!(f, "{}", self.status.to_string().yellow()),
            SolutionStatus::Infeasible => writeln!(f, "{}", self.status.to_string().red()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solved() -> (Model, Variable, Variable, Solution) {
        let mut model = Model::new("solution");
        let x = model.create_variable("x").unwrap();
        let y = model.create_variable("y").unwrap();
        model.add_constraint((&x + &y).leq(4)).unwrap();
        model.add_constraint((&x + 3_f64 * &y).leq(6)).unwrap();
        model.maximize(3_f64 * &x + 2_f64 * &y).unwrap();
        let solution = model.solve().unwrap();
        (model, x, y, solution)
    }

    #[test]
    fn values_and_assignment() {
        let (model, x, y, solution) = solved();
        assert_eq!(solution.status(), SolutionStatus::Optimal);
        assert_eq!(solution.value(&x), Ok(4.0));
        assert_eq!(solution.value(&y), Ok(0.0));
        assert_eq!(solution.assignment(&model), vec![4.0, 0.0]);
        assert_eq!(solution.objective_value(), 12.0);
    }

    #[test]
    fn value_rejects_foreign_variables() {
        let (model, x, _, solution) = solved();
        let mut other = Model::new("other");
        let z = other.create_variable("x").unwrap();
        assert_eq!(z.index(), x.index());
        assert_eq!(
            solution.value(&z),
            Err(SimplexError::ForeignVariable("x".to_string()))
        );

        //copies share the identity of the solved model
        let mut copy = model.clone();
        assert_eq!(solution.value(&copy.variables()[0]), Ok(4.0));
        let w = copy.create_variable("w").unwrap();
        assert_eq!(
            solution.value(&w),
            Err(SimplexError::ForeignVariable("w".to_string()))
        );
    }

    #[test]
    fn keeps_both_tableaux() {
        let (_, _, _, solution) = solved();
        assert_eq!(solution.initial_tableau().objective_value(), 0.0);
        assert_eq!(solution.tableau().objective_value(), 12.0);
        assert!(solution.tableau().is_optimal());
    }

    #[test]
    fn display_lists_original_variables() {
        let (_, _, _, solution) = solved();
        let out = format!("{}", solution);
        assert!(out.contains("optimal"));
        assert!(out.contains("x = 4"));
        assert!(out.contains("y = 0"));
        assert!(!out.contains("s0"));
    }
}
