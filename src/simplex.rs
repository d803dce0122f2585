use log::{debug, trace};
use ndarray::Array1;

use std::sync::Arc;

use crate::constraint::Comp;
use crate::error::{Result, SimplexError};
use crate::model::Model;
use crate::objective::OptDir;
use crate::solution::{Solution, SolutionStatus};
use crate::tableau::{Tableau, TableauIx};
use crate::var::Variable;

pub trait SolveAlgorithm {
    fn solve(&self, mdl: &Model) -> Result<Solution>;
}

/// Canonical form of a model: maximization over equality constraints with
/// non-negative bounds, plus the bookkeeping needed to read results back.
#[derive(Clone, Debug)]
pub struct StandardForm {
    pub mdl: Model,
    /// slack variable -> constraint index
    pub slacks: Vec<(Variable, usize)>,
    /// surplus variable -> constraint index
    pub surpluses: Vec<(Variable, usize)>,
    pub flipped_obj_fn: bool,
}

impl StandardForm {
    /// Artificial variables are needed for every constraint without a slack.
    pub fn needs_presolve(&self) -> bool {
        self.slacks.len() < self.mdl.constraints().len()
    }
}

enum Termination {
    Optimal,
    Unbounded,
}

/// Two phase primal simplex using Dantzig's rule.
///
/// Entering column is the most negative objective coefficient and the
/// leaving row comes from the minimum ratio test, lowest index winning ties
/// in both. Degenerate problems may cycle, which the pivot cap turns into
/// [`SimplexError::IterationLimitExceeded`].
#[derive(Clone, Debug)]
pub struct Simplex {
    tolerance: f64,
    max_iterations: usize,
}

impl Default for Simplex {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            max_iterations: 10_000,
        }
    }
}

impl Simplex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    //first free name of the form base, base_1, base_2, ...
    fn fresh_name(mdl: &Model, base: String) -> String {
        let mut name = base.clone();
        let mut k = 1;
        while mdl.variable(&name).is_some() {
            name = format!("{}_{}", base, k);
            k += 1;
        }
        name
    }

    /// Copies `mdl` into canonical form, adding slack and surplus variables.
    pub fn as_standard_form(&self, mdl: &Model) -> Result<StandardForm> {
        let mut mdl = mdl.clone();
        mdl.simplify();

        //convert to maximization problem
        let obj = mdl.objective.as_mut().ok_or(SimplexError::MissingObjective)?;
        let flipped_obj_fn = match obj.opt_dir() {
            OptDir::Min => {
                obj.invert();
                true
            }
            OptDir::Max => false,
        };

        //ensure non-negative rhs
        for constraint in mdl.constraints.iter_mut() {
            if constraint.bound() < 0.0_f64 {
                constraint.invert();
            }
        }

        let mut slacks = Vec::new();
        for i in 0..mdl.constraints.len() {
            if mdl.constraints[i].comp() != Comp::Le {
                continue;
            }
            let name = Self::fresh_name(&mdl, format!("s{}", i));
            let svar = mdl.create_variable(name)?;
            let constraint = &mut mdl.constraints[i];
            constraint.expression += &svar;
            constraint.comp = Comp::Eq;
            slacks.push((svar, i));
        }

        let mut surpluses = Vec::new();
        for i in 0..mdl.constraints.len() {
            if mdl.constraints[i].comp() != Comp::Ge {
                continue;
            }
            let name = Self::fresh_name(&mdl, format!("s{}", i));
            let svar = mdl.create_variable(name)?;
            let constraint = &mut mdl.constraints[i];
            constraint.expression -= &svar;
            constraint.comp = Comp::Eq;
            surpluses.push((svar, i));
        }

        debug!(
            "model {}: {} slack, {} surplus variables, objective flipped: {}",
            mdl.name(),
            slacks.len(),
            surpluses.len(),
            flipped_obj_fn
        );

        Ok(StandardForm {
            mdl,
            slacks,
            surpluses,
            flipped_obj_fn,
        })
    }

    /// Canonical model extended with one artificial variable per constraint
    /// lacking a slack.
    fn presolve_model(&self, std: &StandardForm) -> Result<(Model, Vec<(Variable, usize)>)> {
        let mut mdl = std.mdl.clone();
        let mut artificial_vars = Vec::new();
        for i in 0..mdl.constraints.len() {
            if std.slacks.iter().any(|(_, c)| *c == i) {
                continue;
            }
            let name = Self::fresh_name(&mdl, format!("a{}", i));
            let avar = mdl.create_variable(name)?;
            mdl.constraints[i].expression += &avar;
            artificial_vars.push((avar, i));
        }
        Ok((mdl, artificial_vars))
    }

    fn constraint_rows(mdl: &Model) -> Vec<Vec<f64>> {
        mdl.constraints()
            .iter()
            .map(|c| {
                let mut row = c.expression().coefficients(mdl);
                row.push(c.bound());
                row
            })
            .collect()
    }

    //negated objective coefficients, objective constant as initial value
    fn objective_row(mdl: &Model) -> Vec<f64> {
        let expr = mdl
            .objective()
            .map(|obj| obj.expression().clone())
            .unwrap_or_default();
        let mut row = (-expr.clone()).coefficients(mdl);
        row.push(expr.constant());
        row
    }

    fn basic_initial_tableau(&self, mdl: Model) -> Tableau {
        let objective_row = Self::objective_row(&mdl);
        let rows = Self::constraint_rows(&mdl);
        Tableau::from_rows(Arc::new(mdl), &objective_row, &rows, self.tolerance)
    }

    fn presolve_initial_tableau(&self, mdl: Model, artificial_vars: &[(Variable, usize)]) -> Tableau {
        let rows = Self::constraint_rows(&mdl);
        let mut objective_row = vec![0.0_f64; mdl.variables().len() + 1];
        artificial_vars.iter().for_each(|(var, _)| {
            objective_row[var.index()] = 1.0_f64;
        });

        //subtract artificial rows so the artificial columns become basic
        for (_, i) in artificial_vars {
            objective_row
                .iter_mut()
                .zip(rows[*i].iter())
                .for_each(|(o, r)| *o -= r);
        }

        Tableau::from_rows(Arc::new(mdl), &objective_row, &rows, self.tolerance)
    }

    fn optimize(&self, tableau: &mut Tableau, pivots: &mut usize) -> Result<Termination> {
        while !tableau.is_optimal() {
            let j = tableau.choose_entering_variable();
            if tableau.is_unbounded(j) {
                return Ok(Termination::Unbounded);
            }
            let Some(i) = tableau.choose_leaving_variable(j) else {
                return Ok(Termination::Unbounded);
            };
            if *pivots >= self.max_iterations {
                return Err(SimplexError::IterationLimitExceeded(self.max_iterations));
            }
            tableau.pivot(&TableauIx::new(i, j))?;
            *pivots += 1;
            trace!(
                "pivot {}: row {}, col {}, objective {}",
                pivots,
                i,
                j,
                tableau.objective_value()
            );
        }
        trace!("optimal tableau:\n{}", tableau);
        Ok(Termination::Optimal)
    }

    //the phase one objective is bounded below by zero
    fn phase_one(&self, tableau: &mut Tableau, pivots: &mut usize) -> Result<()> {
        match self.optimize(tableau, pivots)? {
            Termination::Optimal => Ok(()),
            Termination::Unbounded => Err(SimplexError::UnboundedPhaseOne),
        }
    }

    fn artificial_variables_are_positive(
        &self,
        tableau: &Tableau,
        artificial_cols: &[usize],
    ) -> bool {
        tableau.basis().iter().enumerate().any(|(r, col)| {
            matches!(col, Some(c) if artificial_cols.contains(c))
                && tableau.row_value(r) > self.tolerance
        })
    }

    /// Pivots artificial variables that stayed basic at zero out of the
    /// basis; rows where that is impossible are redundant and removed.
    fn drive_out_artificials(&self, tableau: &mut Tableau, artificial_cols: &[usize]) -> Result<()> {
        let mut r = 0;
        while r < tableau.basis().len() {
            let is_artificial = matches!(tableau.basis()[r], Some(c) if artificial_cols.contains(&c));
            if !is_artificial {
                r += 1;
                continue;
            }
            let n_cols = tableau.tbl().ncols() - 1;
            let entering = (0..n_cols)
                .filter(|j| !artificial_cols.contains(j))
                .find(|&j| tableau.tbl()[[r + 1, j]].abs() > self.tolerance);
            match entering {
                Some(j) => {
                    tableau.pivot(&TableauIx::new(r + 1, j))?;
                    r += 1;
                }
                None => {
                    debug!("removing redundant constraint row {}", r);
                    tableau.remove_row(r);
                }
            }
        }
        Ok(())
    }

    fn restore_initial_tableau(
        &self,
        tableau: &mut Tableau,
        std: &StandardForm,
        artificial_cols: &[usize],
    ) -> Result<()> {
        self.drive_out_artificials(tableau, artificial_cols)?;
        let mdl = Arc::new(std.mdl.clone());
        tableau.remove_columns(artificial_cols, mdl.clone());
        tableau.set_objective_row(Array1::from(Self::objective_row(&mdl)));
        Ok(())
    }

    fn objective_value(&self, tableau: &Tableau, std: &StandardForm) -> f64 {
        let val = tableau.objective_value();
        if std.flipped_obj_fn {
            -val
        } else {
            val
        }
    }

    fn solve_standard_form(&self, model: &Model, std: StandardForm) -> Result<Solution> {
        let mut pivots = 0;

        let (initial_tableau, mut tableau) = if std.needs_presolve() {
            let (presolve_mdl, artificial_vars) = self.presolve_model(&std)?;
            let artificial_cols: Vec<usize> =
                artificial_vars.iter().map(|(var, _)| var.index()).collect();
            debug!(
                "model {}: presolve with {} artificial variables",
                model.name(),
                artificial_cols.len()
            );

            let mut tableau = self.presolve_initial_tableau(presolve_mdl, &artificial_vars);
            let initial_tableau = tableau.clone();
            self.phase_one(&mut tableau, &mut pivots)?;

            if self.artificial_variables_are_positive(&tableau, &artificial_cols) {
                debug!("model {}: infeasible after {} pivots", model.name(), pivots);
                return Ok(Solution::new(
                    SolutionStatus::Infeasible,
                    model,
                    f64::NAN,
                    tableau.extract_assignment(),
                    initial_tableau,
                    tableau,
                ));
            }

            self.restore_initial_tableau(&mut tableau, &std, &artificial_cols)?;
            (initial_tableau, tableau)
        } else {
            let tableau = self.basic_initial_tableau(std.mdl.clone());
            (tableau.clone(), tableau)
        };

        let status = match self.optimize(&mut tableau, &mut pivots)? {
            Termination::Optimal => SolutionStatus::Optimal,
            Termination::Unbounded => SolutionStatus::Unbounded,
        };

        let obj_fn_val = match status {
            SolutionStatus::Unbounded if std.flipped_obj_fn => f64::NEG_INFINITY,
            SolutionStatus::Unbounded => f64::INFINITY,
            _ => self.objective_value(&tableau, &std),
        };
        debug!(
            "model {}: {} after {} pivots, objective {}",
            model.name(),
            status,
            pivots,
            obj_fn_val
        );

        Ok(Solution::new(
            status,
            model,
            obj_fn_val,
            tableau.extract_assignment(),
            initial_tableau,
            tableau,
        ))
    }
}

impl SolveAlgorithm for Simplex {
    fn solve(&self, mdl: &Model) -> Result<Solution> {
        let std = self.as_standard_form(mdl)?;
        self.solve_standard_form(mdl, std)
    }
}
