//! Two phase primal simplex for linear programs over non-negative variables.
//!
//! ```
//! use saport::Model;
//!
//! let mut model = Model::new("example");
//! let x1 = model.create_variable("x1").unwrap();
//! let x2 = model.create_variable("x2").unwrap();
//!
//! model.add_constraint((&x1 + &x2).leq(4)).unwrap();
//! model.add_constraint((&x1 + 3_f64 * &x2).leq(6)).unwrap();
//! model.maximize(3_f64 * &x1 + 2_f64 * &x2).unwrap();
//!
//! let solution = model.solve().unwrap();
//! assert!(solution.is_feasible() && solution.is_bounded());
//! assert_eq!(solution.objective_value(), 12.0);
//! assert_eq!(solution.assignment(&model), vec![4.0, 0.0]);
//! ```

pub mod affine_expr;
pub mod constraint;
pub mod error;
pub mod model;
pub mod objective;
pub mod simplex;
pub mod solution;
pub mod tableau;
pub mod var;

pub use crate::{
    affine_expr::AffineExpression,
    constraint::{Comp, Constraint},
    error::{Result, SimplexError},
    model::Model,
    objective::{Objective, OptDir},
    simplex::{Simplex, SolveAlgorithm, StandardForm},
    solution::{Solution, SolutionStatus},
    tableau::{Tableau, TableauIx},
    var::Variable,
};
