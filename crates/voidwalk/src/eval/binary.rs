//! Binary operator evaluation
//!
//! Operand kinds must be compatible:
//!
//! | operands          | operators                                   |
//! |-------------------|---------------------------------------------|
//! | boolean, boolean  | `&&` `\|\|` `==` `!=`                        |
//! | numeric, numeric  | `+ - * / %` `== != < > <= >=`               |
//! | string, string    | `+` `==` `!=`                               |
//! | null, anything    | `==` `!=` (null-ness only)                  |
//!
//! Numeric operands widen to the wider of the two (integer < float <
//! double). `%` is defined on integers only. Anything else is a TypeError.

use std::cmp::Ordering;

use super::Evaluate;
use crate::ast::{BinaryOp, Expr};
use crate::{Environment, EvalContext, EvalError, Value};

/// Evaluate `lhs op rhs`, short-circuiting `&&` and `||`.
pub fn eval_binary(
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    match op {
        BinaryOp::And | BinaryOp::Or => {
            let left = expect_bool(op, lhs.eval(env, ctx)?)?;
            // && stops on false, || stops on true
            if left == (op == BinaryOp::Or) {
                return Ok(Value::Boolean(left));
            }
            let right = expect_bool(op, rhs.eval(env, ctx)?)?;
            Ok(Value::Boolean(right))
        }
        _ => {
            let left = lhs.eval(env, ctx)?;
            let right = rhs.eval(env, ctx)?;
            apply_binary(op, left, right)
        }
    }
}

fn expect_bool(op: BinaryOp, value: Value) -> Result<bool, EvalError> {
    match value {
        Value::Boolean(b) => Ok(b),
        other => Err(EvalError::type_error(format!(
            "operator {} expects boolean operands, got {}",
            op,
            other.type_name()
        ))),
    }
}

/// Apply a non-short-circuit binary operator to two evaluated operands.
pub fn apply_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    if left.is_null() || right.is_null() {
        return match op {
            BinaryOp::Eq => Ok(Value::Boolean(left.is_null() == right.is_null())),
            BinaryOp::Ne => Ok(Value::Boolean(left.is_null() != right.is_null())),
            _ => Err(mismatch(op, &left, &right)),
        };
    }

    match (&left, &right) {
        (Value::Boolean(a), Value::Boolean(b)) => match op {
            BinaryOp::And => Ok(Value::Boolean(*a && *b)),
            BinaryOp::Or => Ok(Value::Boolean(*a || *b)),
            BinaryOp::Eq => Ok(Value::Boolean(a == b)),
            BinaryOp::Ne => Ok(Value::Boolean(a != b)),
            _ => Err(mismatch(op, &left, &right)),
        },
        (Value::String(a), Value::String(b)) => match op {
            BinaryOp::Add => Ok(Value::String(format!("{}{}", a, b))),
            BinaryOp::Eq => Ok(Value::Boolean(a == b)),
            BinaryOp::Ne => Ok(Value::Boolean(a != b)),
            _ => Err(mismatch(op, &left, &right)),
        },
        _ => match (Number::from_value(&left), Number::from_value(&right)) {
            (Some(a), Some(b)) => numeric(op, a, b),
            _ => Err(mismatch(op, &left, &right)),
        },
    }
}

fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> EvalError {
    EvalError::type_error(format!(
        "unsupported operand types for {}: {} and {}",
        op,
        left.type_name(),
        right.type_name()
    ))
}

// ═══════════════════════════════════════════════════════════════════════
// Numeric Tower
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f32),
    Double(f64),
}

impl Number {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(n) => Some(Number::Int(*n)),
            Value::Float(n) => Some(Number::Float(*n)),
            Value::Double(n) => Some(Number::Double(*n)),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Number::Int(_) => 0,
            Number::Float(_) => 1,
            Number::Double(_) => 2,
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Number::Int(n) => *n as f64,
            Number::Float(n) => f64::from(*n),
            Number::Double(n) => *n,
        }
    }

    fn as_f32(&self) -> f32 {
        match self {
            Number::Int(n) => *n as f32,
            Number::Float(n) => *n,
            Number::Double(n) => *n as f32,
        }
    }
}

fn numeric(op: BinaryOp, a: Number, b: Number) -> Result<Value, EvalError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => integer(op, x, y),
        _ if a.rank().max(b.rank()) == 2 => {
            floating(op, a.as_f64(), b.as_f64(), Value::Double)
        }
        _ => floating(op, a.as_f32(), b.as_f32(), Value::Float),
    }
}

fn integer(op: BinaryOp, x: i64, y: i64) -> Result<Value, EvalError> {
    let overflow = || EvalError::runtime(format!("integer overflow in {} {} {}", x, op, y));
    let result = match op {
        BinaryOp::Add => x.checked_add(y).ok_or_else(overflow)?,
        BinaryOp::Sub => x.checked_sub(y).ok_or_else(overflow)?,
        BinaryOp::Mul => x.checked_mul(y).ok_or_else(overflow)?,
        BinaryOp::Div | BinaryOp::Rem if y == 0 => {
            return Err(EvalError::runtime("division by zero"))
        }
        BinaryOp::Div => x.checked_div(y).ok_or_else(overflow)?,
        BinaryOp::Rem => x.checked_rem(y).ok_or_else(overflow)?,
        _ => return compare(op, x.cmp(&y)),
    };
    Ok(Value::Integer(result))
}

fn floating<T>(op: BinaryOp, x: T, y: T, wrap: fn(T) -> Value) -> Result<Value, EvalError>
where
    T: Copy
        + PartialOrd
        + Default
        + std::ops::Add<Output = T>
        + std::ops::Sub<Output = T>
        + std::ops::Mul<Output = T>
        + std::ops::Div<Output = T>,
{
    let result = match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::Div if y == T::default() => {
            return Err(EvalError::runtime("division by zero"))
        }
        BinaryOp::Div => x / y,
        BinaryOp::Rem => {
            return Err(EvalError::type_error(
                "operator % expects integer operands",
            ))
        }
        _ => {
            return match x.partial_cmp(&y) {
                Some(ordering) => compare(op, ordering),
                // NaN: only != holds
                None => Ok(Value::Boolean(op == BinaryOp::Ne)),
            }
        }
    };
    Ok(wrap(result))
}

fn compare(op: BinaryOp, ordering: Ordering) -> Result<Value, EvalError> {
    let result = match op {
        BinaryOp::Eq => ordering == Ordering::Equal,
        BinaryOp::Ne => ordering != Ordering::Equal,
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Ge => ordering != Ordering::Less,
        _ => {
            return Err(EvalError::type_error(format!(
                "operator {} expects boolean operands",
                op
            )))
        }
    };
    Ok(Value::Boolean(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    fn apply(op: BinaryOp, a: impl Into<Value>, b: impl Into<Value>) -> Result<Value, EvalError> {
        apply_binary(op, a.into(), b.into())
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(apply(BinaryOp::Add, 2i64, 3i64).unwrap(), Value::Integer(5));
        assert_eq!(apply(BinaryOp::Div, 7i64, 2i64).unwrap(), Value::Integer(3));
        assert_eq!(apply(BinaryOp::Rem, 7i64, 2i64).unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_widening() {
        assert_eq!(apply(BinaryOp::Mul, 2i64, 1.5f64).unwrap(), Value::Double(3.0));
        assert_eq!(apply(BinaryOp::Add, 1i64, 0.5f32).unwrap(), Value::Float(1.5));
        assert_eq!(apply(BinaryOp::Add, 0.5f32, 0.25f64).unwrap(), Value::Double(0.75));
    }

    #[test]
    fn test_comparison_across_widths() {
        assert_eq!(apply(BinaryOp::Lt, 1i64, 1.5f64).unwrap(), Value::Boolean(true));
        assert_eq!(apply(BinaryOp::Eq, 2i64, 2.0f64).unwrap(), Value::Boolean(true));
        assert_eq!(apply(BinaryOp::Ge, 2i64, 3i64).unwrap(), Value::Boolean(false));
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            apply(BinaryOp::Div, 1i64, 0i64),
            Err(EvalError::RuntimeError { .. })
        ));
        assert!(matches!(
            apply(BinaryOp::Div, 1.0f64, 0.0f64),
            Err(EvalError::RuntimeError { .. })
        ));
    }

    #[test]
    fn test_remainder_requires_integers() {
        assert!(matches!(
            apply(BinaryOp::Rem, 1.5f64, 1i64),
            Err(EvalError::TypeError { .. })
        ));
    }

    #[test]
    fn test_overflow_is_runtime_error() {
        assert!(matches!(
            apply(BinaryOp::Add, i64::MAX, 1i64),
            Err(EvalError::RuntimeError { .. })
        ));
    }

    #[test]
    fn test_strings() {
        assert_eq!(apply(BinaryOp::Add, "ab", "cd").unwrap(), Value::string("abcd"));
        assert_eq!(apply(BinaryOp::Eq, "a", "a").unwrap(), Value::Boolean(true));
        assert!(matches!(
            apply(BinaryOp::Lt, "a", "b"),
            Err(EvalError::TypeError { .. })
        ));
    }

    #[test]
    fn test_mismatched_kinds() {
        assert!(matches!(
            apply(BinaryOp::Add, "a", 1i64),
            Err(EvalError::TypeError { .. })
        ));
        assert!(matches!(
            apply(BinaryOp::Eq, true, 1i64),
            Err(EvalError::TypeError { .. })
        ));
    }

    #[test]
    fn test_null_compares_null_ness_only() {
        let null = Value::Null(ValueType::String);
        assert_eq!(
            apply_binary(BinaryOp::Eq, null.clone(), Value::Null(ValueType::Integer)).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            apply_binary(BinaryOp::Ne, null.clone(), Value::Integer(0)).unwrap(),
            Value::Boolean(true)
        );
        assert!(apply_binary(BinaryOp::Add, null, Value::Integer(0)).is_err());
    }
}
