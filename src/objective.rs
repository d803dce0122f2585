use std::fmt;

use crate::affine_expr::AffineExpression;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OptDir {
    Max,
    Min,
}

impl OptDir {
    pub fn flipped(self) -> Self {
        match self {
            OptDir::Max => OptDir::Min,
            OptDir::Min => OptDir::Max,
        }
    }
}

impl fmt::Display for OptDir {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OptDir::Max => write!(f, "Max"),
            OptDir::Min => write!(f, "Min"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Objective {
    pub(crate) expression: AffineExpression,
    pub(crate) opt_dir: OptDir,
}

impl Objective {
    pub fn new(expression: AffineExpression, opt_dir: OptDir) -> Self {
        Self {
            expression,
            opt_dir,
        }
    }

    pub fn expression(&self) -> &AffineExpression {
        &self.expression
    }

    pub fn opt_dir(&self) -> OptDir {
        self.opt_dir
    }

    /// Label of the objective row in tableau renderings.
    pub fn name(&self) -> &'static str {
        "z"
    }

    /// Negates the expression and flips the direction; the optimum is kept,
    /// its value changes sign.
    pub fn invert(&mut self) {
        self.expression *= -1;
        self.opt_dir = self.opt_dir.flipped();
    }

    pub fn inverted(&self) -> Self {
        let mut obj = self.clone();
        obj.invert();
        obj
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} = {}", self.opt_dir, self.name(), self.expression)
    }
}
