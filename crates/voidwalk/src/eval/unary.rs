//! Unary operation evaluation

use crate::ast::UnaryOp;
use crate::{EvalError, Value};

/// `!` requires a boolean; `-` and `+` require a number.
pub fn apply_unary(op: UnaryOp, operand: Value) -> Result<Value, EvalError> {
    match (op, operand) {
        (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOp::Neg, Value::Integer(n)) => n
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| EvalError::runtime(format!("integer overflow in -{}", n))),
        (UnaryOp::Neg, Value::Float(n)) => Ok(Value::Float(-n)),
        (UnaryOp::Neg, Value::Double(n)) => Ok(Value::Double(-n)),
        (UnaryOp::Plus, value) if value.is_numeric() => Ok(value),
        (op, value) => Err(EvalError::type_error(format!(
            "unsupported operand type for unary {}: {}",
            op.symbol(),
            value.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not() {
        assert_eq!(apply_unary(UnaryOp::Not, Value::Boolean(true)).unwrap(), Value::Boolean(false));
        assert!(matches!(
            apply_unary(UnaryOp::Not, Value::Integer(0)),
            Err(EvalError::TypeError { .. })
        ));
    }

    #[test]
    fn test_negate() {
        assert_eq!(apply_unary(UnaryOp::Neg, Value::Integer(4)).unwrap(), Value::Integer(-4));
        assert_eq!(apply_unary(UnaryOp::Neg, Value::Double(0.5)).unwrap(), Value::Double(-0.5));
        assert!(matches!(
            apply_unary(UnaryOp::Neg, Value::string("x")),
            Err(EvalError::TypeError { .. })
        ));
    }

    #[test]
    fn test_plus_is_identity_on_numbers() {
        assert_eq!(apply_unary(UnaryOp::Plus, Value::Float(1.5)).unwrap(), Value::Float(1.5));
        assert!(apply_unary(UnaryOp::Plus, Value::Boolean(true)).is_err());
    }
}
