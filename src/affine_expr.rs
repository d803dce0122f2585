use num::ToPrimitive;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::constraint::{Comp, Constraint};
use crate::error::{Result, SimplexError};
use crate::model::Model;
use crate::var::Variable;

/// Linear combination of variables plus a constant.
///
/// Coefficients are kept in a map keyed by variable, so a variable never
/// appears twice and iteration follows the model's variable order. Zero
/// coefficients produced by arithmetic are kept until [`simplify`] is called.
///
/// [`simplify`]: AffineExpression::simplify
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AffineExpression {
    pub(crate) coeffs: BTreeMap<Variable, f64>,
    pub(crate) constant: f64,
}

pub(crate) fn scalar<T: ToPrimitive>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

impl fmt::Display for AffineExpression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mult = "\u{00D7}";
        for (i, (var, coeff)) in self.coeffs.iter().enumerate() {
            match (i, *coeff < 0.0_f64) {
                (0, false) => write!(f, "{}{}{}", coeff, mult, var)?,
                (0, true) => write!(f, "-{}{}{}", coeff.abs(), mult, var)?,
                (_, false) => write!(f, " + {}{}{}", coeff, mult, var)?,
                (_, true) => write!(f, " - {}{}{}", coeff.abs(), mult, var)?,
            }
        }
        if self.coeffs.is_empty() {
            write!(f, "{}", self.constant)?;
        } else if self.constant > 0.0_f64 {
            write!(f, " + {}", self.constant)?;
        } else if self.constant < 0.0_f64 {
            write!(f, " - {}", self.constant.abs())?;
        }
        Ok(())
    }
}

impl From<&Variable> for AffineExpression {
    fn from(var: &Variable) -> Self {
        let mut coeffs = BTreeMap::new();
        coeffs.insert(var.clone(), 1.0_f64);
        Self {
            coeffs,
            constant: 0.0_f64,
        }
    }
}

impl From<Variable> for AffineExpression {
    fn from(var: Variable) -> Self {
        Self::from(&var)
    }
}

impl From<&AffineExpression> for AffineExpression {
    fn from(expr: &AffineExpression) -> Self {
        expr.clone()
    }
}

impl<T: ToPrimitive> From<T> for AffineExpression {
    fn from(num: T) -> Self {
        Self {
            coeffs: BTreeMap::new(),
            constant: scalar(num),
        }
    }
}

impl AffineExpression {
    /// Builds an expression from `(variable, coefficient)` terms, summing
    /// coefficients of repeated variables.
    pub fn new<I>(terms: I, constant: f64) -> Self
    where
        I: IntoIterator<Item = (Variable, f64)>,
    {
        let mut expr = Self {
            coeffs: BTreeMap::new(),
            constant,
        };
        for (var, coeff) in terms {
            expr.add_term(var, coeff);
        }
        expr
    }

    fn add_term(&mut self, var: Variable, coeff: f64) {
        *self.coeffs.entry(var).or_insert(0.0_f64) += coeff;
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn coefficient(&self, var: &Variable) -> f64 {
        self.coeffs.get(var).copied().unwrap_or(0.0_f64)
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Variable, f64)> + '_ {
        self.coeffs.iter().map(|(var, coeff)| (var, *coeff))
    }

    pub fn variables(&self) -> Vec<Variable> {
        self.coeffs.keys().cloned().collect()
    }

    pub fn contains_var(&self, var: &Variable) -> bool {
        self.coeffs.contains_key(var)
    }

    /// Value of the expression for an assignment indexed by variable index.
    pub fn evaluate(&self, assignment: &[f64]) -> Result<f64> {
        let mut val = self.constant;
        for (var, coeff) in self.coeffs.iter() {
            let x = assignment.get(var.index()).ok_or(SimplexError::Dimension {
                expected: var.index() + 1,
                actual: assignment.len(),
            })?;
            val += coeff * x;
        }
        Ok(val)
    }

    /// Dense coefficient vector in the model's variable order, zero filled.
    /// The constant is not included.
    pub fn coefficients(&self, model: &Model) -> Vec<f64> {
        let mut dense = vec![0.0_f64; model.variables().len()];
        for (var, coeff) in self.coeffs.iter() {
            if let Some(slot) = dense.get_mut(var.index()) {
                *slot += coeff;
            }
        }
        dense
    }

    /// Drops terms whose coefficient is exactly zero.
    pub fn simplify(&mut self) {
        self.coeffs.retain(|_, c| *c != 0.0_f64);
    }

    pub fn simplified(&self) -> Self {
        let mut expr = self.clone();
        expr.simplify();
        expr
    }

    /// `self <= rhs`
    pub fn leq<T: Into<AffineExpression>>(self, rhs: T) -> Constraint {
        Constraint::new(self, Comp::Le, rhs)
    }

    /// `self >= rhs`
    pub fn geq<T: Into<AffineExpression>>(self, rhs: T) -> Constraint {
        Constraint::new(self, Comp::Ge, rhs)
    }

    /// `self == rhs`
    pub fn equals<T: Into<AffineExpression>>(self, rhs: T) -> Constraint {
        Constraint::new(self, Comp::Eq, rhs)
    }
}

//AF + AF -> AF
impl Add for AffineExpression {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        rhs.coeffs
            .into_iter()
            .for_each(|(var, coeff)| self.add_term(var, coeff));
        self.constant += rhs.constant;
        self
    }
}

//AF - AF -> AF
impl Sub for AffineExpression {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

//&AF + &AF -> AF
impl<'a> Add<&'a AffineExpression> for &'a AffineExpression {
    type Output = AffineExpression;

    fn add(self, rhs: Self) -> Self::Output {
        self.clone() + rhs.clone()
    }
}

//&AF - &AF -> AF
impl<'a> Sub<&'a AffineExpression> for &'a AffineExpression {
    type Output = AffineExpression;

    fn sub(self, rhs: Self) -> Self::Output {
        self.clone() - rhs.clone()
    }
}

//AF + V -> AF
impl Add<&Variable> for AffineExpression {
    type Output = Self;

    fn add(mut self, rhs: &Variable) -> Self::Output {
        self.add_term(rhs.clone(), 1.0_f64);
        self
    }
}

//AF - V -> AF
impl Sub<&Variable> for AffineExpression {
    type Output = Self;

    fn sub(mut self, rhs: &Variable) -> Self::Output {
        self.add_term(rhs.clone(), -1.0_f64);
        self
    }
}

//V + AF -> AF
impl Add<AffineExpression> for &Variable {
    type Output = AffineExpression;

    fn add(self, rhs: AffineExpression) -> Self::Output {
        rhs + self
    }
}

//V - AF -> AF
impl Sub<AffineExpression> for &Variable {
    type Output = AffineExpression;

    fn sub(self, rhs: AffineExpression) -> Self::Output {
        -rhs + self
    }
}

//V + V -> AF
impl<'a> Add<&'a Variable> for &'a Variable {
    type Output = AffineExpression;

    fn add(self, rhs: Self) -> Self::Output {
        AffineExpression::from(self) + rhs
    }
}

//V - V -> AF
impl<'a> Sub<&'a Variable> for &'a Variable {
    type Output = AffineExpression;

    fn sub(self, rhs: Self) -> Self::Output {
        AffineExpression::from(self) - rhs
    }
}

//AF + C -> AF
impl<T: ToPrimitive> Add<T> for AffineExpression {
    type Output = AffineExpression;

    fn add(mut self, rhs: T) -> Self::Output {
        self.constant += scalar(rhs);
        self
    }
}

//AF - C -> AF
impl<T: ToPrimitive> Sub<T> for AffineExpression {
    type Output = AffineExpression;

    fn sub(mut self, rhs: T) -> Self::Output {
        self.constant -= scalar(rhs);
        self
    }
}

//AF * C -> AF
impl<T: ToPrimitive> Mul<T> for AffineExpression {
    type Output = AffineExpression;

    fn mul(mut self, rhs: T) -> Self::Output {
        self *= rhs;
        self
    }
}

//V + C -> AF
impl<T: ToPrimitive> Add<T> for &Variable {
    type Output = AffineExpression;

    fn add(self, rhs: T) -> Self::Output {
        AffineExpression::from(self) + rhs
    }
}

//V - C -> AF
impl<T: ToPrimitive> Sub<T> for &Variable {
    type Output = AffineExpression;

    fn sub(self, rhs: T) -> Self::Output {
        AffineExpression::from(self) - rhs
    }
}

//V * C -> AF
impl<T: ToPrimitive> Mul<T> for &Variable {
    type Output = AffineExpression;

    fn mul(self, rhs: T) -> Self::Output {
        AffineExpression::from(self) * rhs
    }
}

//C + AF, C - AF, C * AF, C + V, C - V, C * V
//One integer and one float type only, so an unsuffixed literal on the left
//resolves to a single impl inside a larger expression.
macro_rules! scalar_left_ops_impl(
    ($($T: ty), *$(, )*) => {$(
        impl Add<AffineExpression> for $T {
            type Output = AffineExpression;

            fn add(self, rhs: AffineExpression) -> Self::Output {
                rhs + self
            }
        }

        impl Sub<AffineExpression> for $T {
            type Output = AffineExpression;

            fn sub(self, rhs: AffineExpression) -> Self::Output {
                -rhs + self
            }
        }

        impl Mul<AffineExpression> for $T {
            type Output = AffineExpression;

            fn mul(self, rhs: AffineExpression) -> Self::Output {
                rhs * self
            }
        }

        impl Add<&Variable> for $T {
            type Output = AffineExpression;

            fn add(self, rhs: &Variable) -> Self::Output {
                AffineExpression::from(rhs) + self
            }
        }

        impl Sub<&Variable> for $T {
            type Output = AffineExpression;

            fn sub(self, rhs: &Variable) -> Self::Output {
                -AffineExpression::from(rhs) + self
            }
        }

        impl Mul<&Variable> for $T {
            type Output = AffineExpression;

            fn mul(self, rhs: &Variable) -> Self::Output {
                AffineExpression::from(rhs) * self
            }
        }
    )*}
);

scalar_left_ops_impl!(i32, f64);

//AF += V
impl AddAssign<&Variable> for AffineExpression {
    fn add_assign(&mut self, rhs: &Variable) {
        self.add_term(rhs.clone(), 1.0_f64);
    }
}

//AF -= V
impl SubAssign<&Variable> for AffineExpression {
    fn sub_assign(&mut self, rhs: &Variable) {
        self.add_term(rhs.clone(), -1.0_f64);
    }
}

//AF *= C
impl<T: ToPrimitive> MulAssign<T> for AffineExpression {
    fn mul_assign(&mut self, rhs: T) {
        let k = scalar(rhs);
        self.coeffs.values_mut().for_each(|c| *c *= k);
        self.constant *= k;
    }
}

//-AF
impl Neg for AffineExpression {
    type Output = AffineExpression;

    fn neg(mut self) -> Self::Output {
        self *= -1;
        self
    }
}

//-V
impl Neg for &Variable {
    type Output = AffineExpression;

    fn neg(self) -> Self::Output {
        -AffineExpression::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> (Model, Variable, Variable) {
        let mut model = Model::new("expr");
        let a = model.create_variable("a").unwrap();
        let b = model.create_variable("b").unwrap();
        (model, a, b)
    }

    #[test]
    fn af_add_af() {
        let (_, va, vb) = vars();
        //(a+1)+(b+2) = a+b+3
        let af3 = (&va + 1) + (&vb + 2);
        let expected = AffineExpression::new([(va, 1.0), (vb, 1.0)], 3.0);
        assert_eq!(af3, expected);
    }

    #[test]
    fn af_sub_af() {
        let (_, va, vb) = vars();
        //(a+1)-(b+2) = a-b-1
        let af3 = (&va + 1) - (&vb + 2);
        let expected = AffineExpression::new([(va, 1.0), (vb, -1.0)], -1.0);
        assert_eq!(af3, expected);
    }

    #[test]
    fn reference_ops_leave_operands_untouched() {
        let (_, va, vb) = vars();
        let e1 = 2_f64 * &va + 1;
        let e2 = 3_f64 * &vb;
        let sum = &e1 + &e2;
        assert_eq!(e1, AffineExpression::new([(va.clone(), 2.0)], 1.0));
        assert_eq!(e2, AffineExpression::new([(vb.clone(), 3.0)], 0.0));
        assert_eq!(sum, AffineExpression::new([(va, 2.0), (vb, 3.0)], 1.0));
    }

    #[test]
    fn duplicate_terms_are_summed() {
        let (_, va, vb) = vars();
        let af = &va + &vb + &va - 0.5_f64 * &vb;
        assert_eq!(af.coefficient(&va), 2.0);
        assert_eq!(af.coefficient(&vb), 0.5);
        assert_eq!(af.variables().len(), 2);

        let built = AffineExpression::new([(va.clone(), 1.0), (va.clone(), 4.0)], 0.0);
        assert_eq!(built.coefficient(&va), 5.0);
    }

    #[test]
    fn scalar_ops() {
        let (_, va, _) = vars();
        assert_eq!(2_f64 * (&va + 1), AffineExpression::new([(va.clone(), 2.0)], 2.0));
        assert_eq!((&va + 1) * 2.5, AffineExpression::new([(va.clone(), 2.5)], 2.5));
        assert_eq!(2 - &va, AffineExpression::new([(va.clone(), -1.0)], 2.0));
        assert_eq!(1 + &va, AffineExpression::new([(va.clone(), 1.0)], 1.0));
        assert_eq!(&va - 1, AffineExpression::new([(va.clone(), 1.0)], -1.0));
        assert_eq!(-&va, AffineExpression::new([(va.clone(), -1.0)], 0.0));
        assert_eq!(3.0 - (&va + 1), AffineExpression::new([(va, -1.0)], 2.0));
    }

    #[test]
    fn unsuffixed_literals_in_mixed_expressions() {
        let (_, va, vb) = vars();
        let af = &va + &vb + &va - 0.5 * &vb;
        assert_eq!(af, AffineExpression::new([(va.clone(), 2.0), (vb.clone(), 0.5)], 0.0));
        let cons = (&va + 2 * &vb + 1).leq(4);
        assert_eq!(cons.bound(), 3.0);
        assert_eq!(cons.expression().coefficient(&vb), 2.0);
    }

    #[test]
    fn assign_ops() {
        let (_, va, vb) = vars();
        let mut af = AffineExpression::from(&va);
        af += &vb;
        af -= &va;
        af *= 4;
        assert_eq!(af.coefficient(&va), 0.0);
        assert_eq!(af.coefficient(&vb), 4.0);
    }

    #[test]
    fn simplify_drops_zero_terms() {
        let (_, va, vb) = vars();
        let mut af = &va - &va + &vb;
        assert!(af.contains_var(&va));
        af.simplify();
        assert!(!af.contains_var(&va));
        assert_eq!(af, AffineExpression::new([(vb, 1.0)], 0.0));
        assert_eq!(af.simplified(), af);
    }

    #[test]
    fn evaluate() {
        let (_, va, vb) = vars();
        let af = 2_f64 * &va - 3_f64 * &vb + 1;
        assert_eq!(af.evaluate(&[1.0, 2.0]).unwrap(), -3.0);
        assert_eq!(
            af.evaluate(&[1.0]),
            Err(SimplexError::Dimension {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn dense_coefficients_follow_model_order() {
        let (mut model, va, vb) = vars();
        let vc = model.create_variable("c").unwrap();
        let af = 5_f64 * &vc + &va;
        assert_eq!(af.coefficients(&model), vec![1.0, 0.0, 5.0]);
        assert_eq!((&vb * 0).coefficients(&model), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn display() {
        let (_, va, vb) = vars();
        assert_eq!(format!("{}", 2_f64 * &va - &vb + 3), "2×a - 1×b + 3");
        assert_eq!(format!("{}", AffineExpression::from(4)), "4");
    }
}
