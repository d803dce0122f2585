use std::fmt;

use crate::affine_expr::AffineExpression;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comp {
    Le, // <=
    Ge, // >=
    Eq, // ==
}

impl Comp {
    pub fn flipped(self) -> Self {
        match self {
            Comp::Le => Comp::Ge,
            Comp::Eq => Comp::Eq,
            Comp::Ge => Comp::Le,
        }
    }
}

impl fmt::Display for Comp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Comp::Le => write!(f, "\u{2264}"),
            Comp::Eq => write!(f, "="),
            Comp::Ge => write!(f, "\u{2265}"),
        }
    }
}

/// `expression comp bound`, with every variable term on the left and every
/// constant folded into `bound`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub(crate) expression: AffineExpression,
    pub(crate) comp: Comp,
    pub(crate) bound: f64,
    pub(crate) index: usize,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.expression, self.comp, self.bound)
    }
}

impl Constraint {
    pub fn new<T: Into<AffineExpression>, U: Into<AffineExpression>>(
        lhs: T,
        comp: Comp,
        rhs: U,
    ) -> Self {
        //move all variables to lhs, constant to rhs
        let mut expression = lhs.into() - rhs.into();
        let bound = -expression.constant;
        expression.constant = 0.0_f64;
        Self {
            expression,
            comp,
            bound,
            index: 0,
        }
    }

    pub fn expression(&self) -> &AffineExpression {
        &self.expression
    }

    pub fn comp(&self) -> Comp {
        self.comp
    }

    pub fn bound(&self) -> f64 {
        self.bound
    }

    /// Row position within the owning model.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Multiplies both sides by -1, flipping the relation.
    pub fn invert(&mut self) {
        self.expression *= -1;
        self.bound = -self.bound;
        self.comp = self.comp.flipped();
    }

    pub fn inverted(&self) -> Self {
        let mut cons = self.clone();
        cons.invert();
        cons
    }

    /// Whether `assignment` satisfies the constraint within `tolerance`.
    pub fn is_satisfied(&self, assignment: &[f64], tolerance: f64) -> crate::Result<bool> {
        let lhs = self.expression.evaluate(assignment)?;
        Ok(match self.comp {
            Comp::Le => lhs <= self.bound + tolerance,
            Comp::Ge => lhs >= self.bound - tolerance,
            Comp::Eq => (lhs - self.bound).abs() <= tolerance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    #[test]
    fn constants_move_to_bound() {
        let mut model = Model::new("cons");
        let x = model.create_variable("x").unwrap();
        let y = model.create_variable("y").unwrap();

        //2x + 3 <= y + 7  ->  2x - y <= 4
        let cons = Constraint::new(2_f64 * &x + 3, Comp::Le, &y + 7);
        assert_eq!(cons.bound(), 4.0);
        assert_eq!(cons.expression().constant(), 0.0);
        assert_eq!(cons.expression().coefficient(&x), 2.0);
        assert_eq!(cons.expression().coefficient(&y), -1.0);
        assert_eq!(cons.comp(), Comp::Le);
    }

    #[test]
    fn invert_flips_relation() {
        let mut model = Model::new("cons");
        let x = model.create_variable("x").unwrap();

        let cons = (&x * 2).geq(-4);
        let inv = cons.inverted();
        assert_eq!(inv.comp(), Comp::Le);
        assert_eq!(inv.bound(), 4.0);
        assert_eq!(inv.expression().coefficient(&x), -2.0);

        let eq = (&x + 0).equals(3).inverted();
        assert_eq!(eq.comp(), Comp::Eq);
        assert_eq!(eq.bound(), -3.0);
    }

    #[test]
    fn invert_twice_is_identity() {
        let mut model = Model::new("cons");
        let x = model.create_variable("x").unwrap();
        let y = model.create_variable("y").unwrap();

        let cons = (&x - 3_f64 * &y).leq(12);
        assert_eq!(cons.inverted().inverted(), cons);
    }

    #[test]
    fn satisfaction() {
        let mut model = Model::new("cons");
        let x = model.create_variable("x").unwrap();
        let cons = (&x + 0).leq(2);
        assert!(cons.is_satisfied(&[2.0 + 1e-12], 1e-9).unwrap());
        assert!(!cons.is_satisfied(&[2.1], 1e-9).unwrap());
        assert!(cons.is_satisfied(&[], 1e-9).is_err());
    }
}
