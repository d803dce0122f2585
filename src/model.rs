use log::debug;
use rustc_hash::FxHashMap;
use tabular::{Row, Table};
use uuid::Uuid; //used for unique model ID

use std::fmt;

use crate::affine_expr::AffineExpression;
use crate::constraint::Constraint;
use crate::error::{Result, SimplexError};
use crate::objective::{Objective, OptDir};
use crate::simplex::{Simplex, SolveAlgorithm};
use crate::solution::Solution;
use crate::var::Variable;

/// A linear program over non-negative variables.
///
/// Variables and constraints are append only. Cloning a model produces an
/// independent deep copy that keeps the model identity, so variables of the
/// original remain valid in the copy.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    pub(crate) name: String,
    pub(crate) id: Uuid,
    pub(crate) variables: Vec<Variable>,
    pub(crate) var_names: FxHashMap<String, usize>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) objective: Option<Objective>,
}

impl Model {
    pub fn new<T: ToString>(name: T) -> Self {
        Self {
            name: name.to_string(),
            id: Uuid::new_v4(),
            variables: Vec::new(),
            var_names: FxHashMap::default(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Appends a variable with the next free index.
    pub fn create_variable<T: ToString>(&mut self, name: T) -> Result<Variable> {
        let name = name.to_string();
        if self.var_names.contains_key(&name) {
            return Err(SimplexError::DuplicateVariable(name));
        }
        let var = Variable::new(name.clone(), self.variables.len(), self.id);
        self.var_names.insert(name, var.index());
        self.variables.push(var.clone());
        Ok(var)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.var_names.get(name).map(|&i| &self.variables[i])
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    //reject expressions built from another model's variables
    fn check_owned(&self, expr: &AffineExpression) -> Result<()> {
        match expr
            .coeffs
            .keys()
            .find(|var| var.model_id() != self.id || var.index() >= self.variables.len())
        {
            Some(var) => Err(SimplexError::ForeignVariable(var.name().to_string())),
            None => Ok(()),
        }
    }

    /// Appends a constraint, assigning its row index.
    pub fn add_constraint(&mut self, mut constraint: Constraint) -> Result<()> {
        self.check_owned(constraint.expression())?;
        constraint.index = self.constraints.len();
        self.constraints.push(constraint);
        Ok(())
    }

    /// Sets a minimization objective, replacing any previous objective.
    pub fn minimize<T: Into<AffineExpression>>(&mut self, expr: T) -> Result<()> {
        self.set_objective(Objective::new(expr.into(), OptDir::Min))
    }

    /// Sets a maximization objective, replacing any previous objective.
    pub fn maximize<T: Into<AffineExpression>>(&mut self, expr: T) -> Result<()> {
        self.set_objective(Objective::new(expr.into(), OptDir::Max))
    }

    fn set_objective(&mut self, objective: Objective) -> Result<()> {
        self.check_owned(objective.expression())?;
        if let Some(previous) = self.objective.replace(objective) {
            debug!("model {}: replacing objective `{}`", self.name, previous);
        }
        Ok(())
    }

    /// Drops zero terms from the objective and every constraint. Idempotent.
    pub fn simplify(&mut self) {
        if let Some(obj) = self.objective.as_mut() {
            obj.expression.simplify();
        }
        for constraint in self.constraints.iter_mut() {
            constraint.expression.simplify();
        }
    }

    /// Evaluates `expr` for an assignment covering every model variable.
    pub fn evaluate(&self, expr: &AffineExpression, assignment: &[f64]) -> Result<f64> {
        if assignment.len() < self.variables.len() {
            return Err(SimplexError::Dimension {
                expected: self.variables.len(),
                actual: assignment.len(),
            });
        }
        expr.evaluate(assignment)
    }

    pub fn solve(&self) -> Result<Solution> {
        self.solve_with(&Simplex::new())
    }

    pub fn solve_with<A: SolveAlgorithm>(&self, algorithm: &A) -> Result<Solution> {
        algorithm.solve(self)
    }

    //one cell per model variable, sign carried by the cell
    fn term_cells(&self, expr: &AffineExpression) -> Vec<String> {
        let mut cells = vec![String::new(); self.variables.len()];
        let mut first = true;
        for (var, coeff) in expr.terms() {
            let Some(cell) = cells.get_mut(var.index()) else {
                continue;
            };
            *cell = match (first, coeff < 0.0_f64) {
                (true, false) => format!("{}*{}", coeff, var.name()),
                (true, true) => format!("-{}*{}", coeff.abs(), var.name()),
                (false, false) => format!("+ {}*{}", coeff, var.name()),
                (false, true) => format!("- {}*{}", coeff.abs(), var.name()),
            };
            first = false;
        }
        cells
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        //Label, colon, one column per variable, Comp, bound
        let columns = format!("{{:<}} {{:^}}{} {{:^}} {{:<}}", " {:>}".repeat(self.variables.len()));
        let mut table = Table::new(columns.as_str());

        let mut row = Row::new();
        match &self.objective {
            Some(obj) => {
                row.add_cell(obj.opt_dir());
                row.add_cell(":");
                self.term_cells(obj.expression()).iter().for_each(|cell| {
                    row.add_cell(cell);
                });
                row.add_cell("");
                if obj.expression().constant() != 0.0_f64 {
                    row.add_cell(format!("{:+}", obj.expression().constant()));
                } else {
                    row.add_cell("");
                }
            }
            None => {
                row.add_cell("No objective");
                row.add_cell(":");
                (0..self.variables.len() + 2).for_each(|_| {
                    row.add_cell("");
                });
            }
        }
        table.add_row(row);

        let mut row = Row::new().with_cell("Subject to").with_cell(":");
        (0..self.variables.len() + 2).for_each(|_| {
            row.add_cell("");
        });
        table.add_row(row);

        for constraint in &self.constraints {
            let mut row = Row::new()
                .with_cell(format!("c{}", constraint.index()))
                .with_cell(":");
            self.term_cells(constraint.expression()).iter().for_each(|cell| {
                row.add_cell(cell);
            });
            row.add_cell(constraint.comp());
            row.add_cell(constraint.bound());
            table.add_row(row);
        }

        writeln!(f, "{}", self.name)?;
        write!(f, "{}", table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Comp;

    #[test]
    fn variables_get_sequential_indices() {
        let mut model = Model::new("m");
        let x = model.create_variable("x").unwrap();
        let y = model.create_variable("y").unwrap();
        assert_eq!(x.index(), 0);
        assert_eq!(y.index(), 1);
        assert_eq!(model.variable("y"), Some(&y));
        assert_eq!(model.variable("z"), None);
    }

    #[test]
    fn duplicate_variable_name_is_an_error() {
        let mut model = Model::new("m");
        model.create_variable("x").unwrap();
        assert_eq!(
            model.create_variable("x"),
            Err(SimplexError::DuplicateVariable("x".to_string()))
        );
        assert_eq!(model.variables().len(), 1);
    }

    #[test]
    fn constraints_get_row_indices() {
        let mut model = Model::new("m");
        let x = model.create_variable("x").unwrap();
        model.add_constraint((&x + 0).leq(1)).unwrap();
        model.add_constraint((&x + 0).geq(0)).unwrap();
        let indices: Vec<usize> = model.constraints().iter().map(|c| c.index()).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn foreign_variables_are_rejected() {
        let mut model = Model::new("m");
        let mut other = Model::new("other");
        let y = other.create_variable("y").unwrap();
        assert_eq!(
            model.add_constraint((&y + 0).leq(1)),
            Err(SimplexError::ForeignVariable("y".to_string()))
        );
        assert!(model.maximize(&y).is_err());
        assert!(model.constraints().is_empty());
    }

    #[test]
    fn last_objective_wins() {
        let mut model = Model::new("m");
        let x = model.create_variable("x").unwrap();
        model.minimize(&x).unwrap();
        model.maximize(2_f64 * &x).unwrap();
        let obj = model.objective().unwrap();
        assert_eq!(obj.opt_dir(), OptDir::Max);
        assert_eq!(obj.expression().coefficient(&x), 2.0);
    }

    #[test]
    fn simplify_is_idempotent() {
        let mut model = Model::new("m");
        let x = model.create_variable("x").unwrap();
        let y = model.create_variable("y").unwrap();
        model.add_constraint((&x + &y - &y + &x).leq(4)).unwrap();
        model.add_constraint(Constraint::new(0_f64 * &y + &x, Comp::Ge, 1)).unwrap();
        model.maximize(&x - &x + &y).unwrap();

        let mut once = model.clone();
        once.simplify();
        let mut twice = once.clone();
        twice.simplify();
        assert_eq!(once, twice);

        assert!(!once.constraints()[0].expression().contains_var(&y));
        assert_eq!(once.constraints()[0].expression().coefficient(&x), 2.0);
        assert!(!once.objective().unwrap().expression().contains_var(&x));
        //the original is left alone
        assert!(model.constraints()[0].expression().contains_var(&y));
    }

    #[test]
    fn evaluate_checks_dimension() {
        let mut model = Model::new("m");
        let x = model.create_variable("x").unwrap();
        model.create_variable("y").unwrap();
        let expr = 3_f64 * &x + 1;
        assert_eq!(model.evaluate(&expr, &[2.0, 0.0]).unwrap(), 7.0);
        assert_eq!(
            model.evaluate(&expr, &[2.0]),
            Err(SimplexError::Dimension {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn display_lists_objective_and_constraints() {
        let mut model = Model::new("printed");
        let x = model.create_variable("x1").unwrap();
        let y = model.create_variable("x2").unwrap();
        model.add_constraint((&x + 2_f64 * &y).leq(10)).unwrap();
        model.maximize(3_f64 * &x - &y).unwrap();
        let out = format!("{}", model);
        assert!(out.starts_with("printed"));
        assert!(out.contains("Max"));
        assert!(out.contains("Subject to"));
        assert!(out.contains("c0"));
        assert!(out.contains("- 1*x2"));
        assert!(out.contains("10"));
    }
}
