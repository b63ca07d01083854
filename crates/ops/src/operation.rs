use std::fmt;

use abacus_common::ValidationError;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// Errors from resolving or executing an operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    #[error("unknown operation: {0}")]
    Unknown(String),
    #[error("invalid operation name: {0:?}")]
    InvalidName(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("{0} overflowed the decimal range")]
    Overflow(String),
    #[error("{0} produced a non-finite result")]
    NonFinite(String),
}

/// A named, stateless arithmetic transform over two decimal operands.
pub trait Operation: fmt::Debug + Send + Sync {
    /// Display name recorded in calculations, e.g. "Addition".
    fn name(&self) -> &str;

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal, OperationError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Addition;

impl Operation for Addition {
    fn name(&self) -> &str {
        "Addition"
    }

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal, OperationError> {
        a.checked_add(b)
            .ok_or_else(|| OperationError::Overflow(self.name().into()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Subtraction;

impl Operation for Subtraction {
    fn name(&self) -> &str {
        "Subtraction"
    }

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal, OperationError> {
        a.checked_sub(b)
            .ok_or_else(|| OperationError::Overflow(self.name().into()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Multiplication;

impl Operation for Multiplication {
    fn name(&self) -> &str {
        "Multiplication"
    }

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal, OperationError> {
        a.checked_mul(b)
            .ok_or_else(|| OperationError::Overflow(self.name().into()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Division;

impl Operation for Division {
    fn name(&self) -> &str {
        "Division"
    }

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal, OperationError> {
        if b.is_zero() {
            return Err(ValidationError::DivisionByZero.into());
        }
        a.checked_div(b)
            .ok_or_else(|| OperationError::Overflow(self.name().into()))
    }
}

/// `a` raised to `b`.
///
/// Known precision defect: computed through `f64::powf`, so fractional and
/// negative exponents lose decimal exactness.
#[derive(Debug, Clone, Copy, Default)]
pub struct Power;

impl Operation for Power {
    fn name(&self) -> &str {
        "Power"
    }

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal, OperationError> {
        let value = to_float(a, self.name())?.powf(to_float(b, self.name())?);
        from_float(value, self.name())
    }
}

/// The `b`-th root of `a`.
///
/// Shares the floating-point path (and precision defect) of [`Power`].
/// Odd integer roots of negative numbers are defined; every other root of a
/// negative number is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct Root;

impl Operation for Root {
    fn name(&self) -> &str {
        "Root"
    }

    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal, OperationError> {
        if b.is_zero() {
            return Err(ValidationError::ZeroRoot.into());
        }
        let degree = to_float(b, self.name())?;
        if a.is_sign_negative() && !a.is_zero() {
            let odd_integer = b.fract().is_zero() && !(b % Decimal::from(2)).is_zero();
            if !odd_integer {
                return Err(ValidationError::NegativeRoot {
                    radicand: a.to_string(),
                    degree: b.to_string(),
                }
                .into());
            }
            let magnitude = to_float(a.abs(), self.name())?.powf(1.0 / degree);
            return from_float(-magnitude, self.name());
        }
        let value = to_float(a, self.name())?.powf(1.0 / degree);
        from_float(value, self.name())
    }
}

fn to_float(value: Decimal, operation: &str) -> Result<f64, OperationError> {
    value
        .to_f64()
        .ok_or_else(|| OperationError::Overflow(operation.into()))
}

fn from_float(value: f64, operation: &str) -> Result<Decimal, OperationError> {
    if !value.is_finite() {
        return Err(OperationError::NonFinite(operation.into()));
    }
    Decimal::from_f64(value).ok_or_else(|| OperationError::Overflow(operation.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn basic_arithmetic() {
        assert_eq!(Addition.execute(d("2"), d("3")).unwrap(), d("5"));
        assert_eq!(Subtraction.execute(d("2"), d("3")).unwrap(), d("-1"));
        assert_eq!(Multiplication.execute(d("2.5"), d("4")).unwrap(), d("10"));
        assert_eq!(Division.execute(d("7"), d("2")).unwrap(), d("3.5"));
    }

    #[test]
    fn decimal_addition_is_exact() {
        assert_eq!(Addition.execute(d("0.1"), d("0.2")).unwrap(), d("0.3"));
    }

    #[test]
    fn division_by_zero_is_validation_error() {
        assert_eq!(
            Division.execute(d("5"), Decimal::ZERO),
            Err(OperationError::Invalid(ValidationError::DivisionByZero))
        );
    }

    #[test]
    fn multiplication_overflow_reported() {
        let err = Multiplication.execute(Decimal::MAX, d("2")).unwrap_err();
        assert_eq!(err, OperationError::Overflow("Multiplication".into()));
    }

    #[test]
    fn power_integer_exponent() {
        assert_eq!(Power.execute(d("2"), d("10")).unwrap(), d("1024"));
        assert_eq!(Power.execute(d("2"), d("-1")).unwrap(), d("0.5"));
    }

    #[test]
    fn root_of_perfect_square() {
        assert_eq!(Root.execute(d("16"), d("2")).unwrap(), d("4"));
    }

    #[test]
    fn zero_root_rejected() {
        assert_eq!(
            Root.execute(d("16"), Decimal::ZERO),
            Err(OperationError::Invalid(ValidationError::ZeroRoot))
        );
    }

    #[test]
    fn even_root_of_negative_rejected() {
        let err = Root.execute(d("-16"), d("2")).unwrap_err();
        assert!(matches!(
            err,
            OperationError::Invalid(ValidationError::NegativeRoot { .. })
        ));
        assert!(Root.execute(d("-16"), d("2.5")).is_err());
    }

    #[test]
    fn odd_root_of_negative_is_negative() {
        let result = Root.execute(d("-8"), d("3")).unwrap();
        let approx = result.to_f64().unwrap();
        assert!((approx + 2.0).abs() < 1e-12, "got {result}");
    }

    #[test]
    fn power_non_finite_reported() {
        let err = Power.execute(Decimal::ZERO, d("-1")).unwrap_err();
        assert_eq!(err, OperationError::NonFinite("Power".into()));
    }
}
