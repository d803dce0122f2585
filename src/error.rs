use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimplexError>;

/// Errors raised while building or solving a model.
///
/// Infeasible and unbounded programs are not errors, they are reported through
/// [`crate::solution::SolutionStatus`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimplexError {
    #[error("assignment has {actual} values, expected at least {expected}")]
    Dimension { expected: usize, actual: usize },
    #[error("variable `{0}` already exists in the model")]
    DuplicateVariable(String),
    #[error("variable `{0}` belongs to a different model")]
    ForeignVariable(String),
    #[error("model has no objective, call minimize or maximize first")]
    MissingObjective,
    #[error("simplex did not terminate within {0} pivots")]
    IterationLimitExceeded(usize),
    #[error("cannot pivot on row {row}, column {col}")]
    InvalidPivot { row: usize, col: usize },
    #[error("phase one objective reported unbounded")]
    UnboundedPhaseOne,
}
