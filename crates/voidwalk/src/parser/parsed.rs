//! Parsed-expression trees, as built by the operator-precedence parser
//!
//! These stay close to the token stream: member access and indexing are
//! still binary operators here. [`super::lower`] turns them into
//! [`crate::ast::Expr`].

use crate::ast::{BinaryOp, UnaryOp};
use crate::error::Location;
use crate::types::DeclaredType;
use crate::value::Value;

/// Binary operators as the parser sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Binary(BinaryOp),
    /// `->`
    Member,
    /// `[ ]`
    Index,
}

impl Operator {
    /// Member access and indexing bind tighter than anything else,
    /// unary operators included.
    pub const POSTFIX_PRECEDENCE: u8 = 6;
    pub const UNARY_PRECEDENCE: u8 = 5;

    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Binary(op) => op.precedence(),
            Operator::Member | Operator::Index => Self::POSTFIX_PRECEDENCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedExpr {
    Literal {
        value: Value,
        location: Location,
    },
    /// `$name`
    Variable {
        name: String,
        location: Location,
    },
    /// Bare identifier: a constant, or a member name right of `->`
    Name {
        name: String,
        location: Location,
    },
    /// `Name::member`
    Scoped {
        scope: String,
        member: String,
        location: Location,
    },
    Call {
        name: String,
        args: Vec<ParsedExpr>,
        location: Location,
    },
    New {
        class: String,
        args: Vec<ParsedExpr>,
        location: Location,
    },
    /// `{ [type] key: value, ... }`
    Object {
        entries: Vec<ObjectEntry>,
        location: Location,
    },
    /// `[a, b, ...]`
    Array {
        items: Vec<ParsedExpr>,
        location: Location,
    },
    Unary {
        op: UnaryOp,
        operand: Box<ParsedExpr>,
        location: Location,
    },
    Binary {
        op: Operator,
        lhs: Box<ParsedExpr>,
        rhs: Box<ParsedExpr>,
        location: Location,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEntry {
    pub key: String,
    pub ty: Option<DeclaredType>,
    pub value: ParsedExpr,
}

impl ParsedExpr {
    pub fn location(&self) -> &Location {
        match self {
            ParsedExpr::Literal { location, .. }
            | ParsedExpr::Variable { location, .. }
            | ParsedExpr::Name { location, .. }
            | ParsedExpr::Scoped { location, .. }
            | ParsedExpr::Call { location, .. }
            | ParsedExpr::New { location, .. }
            | ParsedExpr::Object { location, .. }
            | ParsedExpr::Array { location, .. }
            | ParsedExpr::Unary { location, .. }
            | ParsedExpr::Binary { location, .. } => location,
        }
    }

    /// Coerce numeric literals toward an expected type: integers become
    /// floats/doubles where one is expected, decimals become floats.
    /// Signed literals (`-1`) are coerced through the sign.
    pub fn coerce_literal(self, expected: &DeclaredType) -> ParsedExpr {
        match self {
            ParsedExpr::Literal { value, location } => {
                let value = match (expected, value) {
                    (DeclaredType::Double, Value::Integer(n)) => Value::Double(n as f64),
                    (DeclaredType::Float, Value::Integer(n)) => Value::Float(n as f32),
                    (DeclaredType::Float, Value::Double(n)) => Value::Float(n as f32),
                    (_, value) => value,
                };
                ParsedExpr::Literal { value, location }
            }
            ParsedExpr::Unary {
                op: op @ (UnaryOp::Neg | UnaryOp::Plus),
                operand,
                location,
            } => ParsedExpr::Unary {
                op,
                operand: Box::new(operand.coerce_literal(expected)),
                location,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(value: Value) -> ParsedExpr {
        ParsedExpr::Literal {
            value,
            location: Location::unknown(),
        }
    }

    #[test]
    fn test_postfix_binds_tighter_than_unary() {
        assert!(Operator::Member.precedence() > Operator::UNARY_PRECEDENCE);
        assert!(Operator::UNARY_PRECEDENCE > Operator::Binary(BinaryOp::Mul).precedence());
    }

    #[test]
    fn test_integer_literal_coerces_to_double() {
        let coerced = lit(Value::Integer(3)).coerce_literal(&DeclaredType::Double);
        assert_eq!(coerced, lit(Value::Double(3.0)));
    }

    #[test]
    fn test_negative_literal_coerces_through_sign() {
        let neg = ParsedExpr::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(lit(Value::Integer(2))),
            location: Location::unknown(),
        };
        let ParsedExpr::Unary { operand, .. } = neg.coerce_literal(&DeclaredType::Float) else {
            panic!("expected unary");
        };
        assert_eq!(*operand, lit(Value::Float(2.0)));
    }

    #[test]
    fn test_string_literal_is_left_alone() {
        let s = lit(Value::string("x"));
        assert_eq!(s.clone().coerce_literal(&DeclaredType::Int), s);
    }
}
