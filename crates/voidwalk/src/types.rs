//! Declared types of bindings, parameters, properties and returns

use std::fmt;

use crate::value::{ObjectMap, Value, ValueType};

/// A type written in source: `int $x`, `function f() string`, ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    Int,
    Double,
    Float,
    String,
    Boolean,
    Object,
    /// An instance of the named class or one of its subclasses
    Class(String),
    /// No value (`void`, `null`)
    Void,
    /// Anything; also used for omitted return types
    Auto,
}

impl DeclaredType {
    /// Map a type keyword to its type. Class names are not keywords.
    pub fn from_keyword(word: &str) -> Option<Self> {
        let ty = match word {
            "int" => DeclaredType::Int,
            "double" => DeclaredType::Double,
            "float" => DeclaredType::Float,
            "string" => DeclaredType::String,
            "bool" | "boolean" => DeclaredType::Boolean,
            "object" => DeclaredType::Object,
            "void" | "null" => DeclaredType::Void,
            "auto" => DeclaredType::Auto,
            _ => return None,
        };
        Some(ty)
    }

    /// The tag a typed null of this type carries.
    pub fn null_tag(&self) -> ValueType {
        match self {
            DeclaredType::Int => ValueType::Integer,
            DeclaredType::Double => ValueType::Double,
            DeclaredType::Float => ValueType::Float,
            DeclaredType::String => ValueType::String,
            DeclaredType::Boolean => ValueType::Boolean,
            DeclaredType::Object => ValueType::Object,
            DeclaredType::Class(_) => ValueType::Class,
            DeclaredType::Void | DeclaredType::Auto => ValueType::Null,
        }
    }

    /// Initial value of an uninitialized property of this type.
    pub fn zero_value(&self) -> Value {
        match self {
            DeclaredType::Int => Value::Integer(0),
            DeclaredType::Double => Value::Double(0.0),
            DeclaredType::Float => Value::Float(0.0),
            DeclaredType::String => Value::String(String::new()),
            DeclaredType::Boolean => Value::Boolean(false),
            DeclaredType::Object => Value::Object(ObjectMap::new()),
            other => Value::Null(other.null_tag()),
        }
    }

    /// Whether `value` may be stored in a binding of this type.
    ///
    /// Null is accepted everywhere; it takes on the declared type when bound.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null(_)) | (DeclaredType::Auto, _) => true,
            (DeclaredType::Int, Value::Integer(_))
            | (DeclaredType::Double, Value::Double(_))
            | (DeclaredType::Float, Value::Float(_))
            | (DeclaredType::String, Value::String(_))
            | (DeclaredType::Boolean, Value::Boolean(_))
            | (DeclaredType::Object, Value::Object(_)) => true,
            (DeclaredType::Class(name), Value::Class(instance)) => {
                instance.borrow().class().is_a(name)
            }
            _ => false,
        }
    }

    /// Bind `value` to this type: nulls take the declared tag, integers
    /// widen into floating-point bindings, floats convert between widths,
    /// anything else must be accepted as is.
    pub fn bind(&self, value: Value) -> Result<Value, Value> {
        if value.is_null() {
            return Ok(Value::Null(self.null_tag()));
        }
        match (self, value) {
            (DeclaredType::Double, Value::Integer(n)) => Ok(Value::Double(n as f64)),
            (DeclaredType::Double, Value::Float(n)) => Ok(Value::Double(f64::from(n))),
            (DeclaredType::Float, Value::Integer(n)) => Ok(Value::Float(n as f32)),
            (DeclaredType::Float, Value::Double(n)) => Ok(Value::Float(n as f32)),
            (_, value) if self.accepts(&value) => Ok(value),
            (_, value) => Err(value),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, DeclaredType::Void)
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Int => f.write_str("int"),
            DeclaredType::Double => f.write_str("double"),
            DeclaredType::Float => f.write_str("float"),
            DeclaredType::String => f.write_str("string"),
            DeclaredType::Boolean => f.write_str("bool"),
            DeclaredType::Object => f.write_str("object"),
            DeclaredType::Class(name) => f.write_str(name),
            DeclaredType::Void => f.write_str("void"),
            DeclaredType::Auto => f.write_str("auto"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_keyword() {
        assert_eq!(DeclaredType::from_keyword("boolean"), Some(DeclaredType::Boolean));
        assert_eq!(DeclaredType::from_keyword("bool"), Some(DeclaredType::Boolean));
        assert_eq!(DeclaredType::from_keyword("Point"), None);
    }

    #[test]
    fn test_accepts_exact_scalar_types() {
        assert!(DeclaredType::Int.accepts(&Value::Integer(1)));
        assert!(!DeclaredType::Int.accepts(&Value::Double(1.0)));
        assert!(!DeclaredType::String.accepts(&Value::Integer(1)));
        assert!(DeclaredType::Auto.accepts(&Value::string("x")));
    }

    #[test]
    fn test_null_binds_to_declared_tag() {
        let bound = DeclaredType::String.bind(Value::Null(ValueType::Null));
        assert!(matches!(bound, Ok(Value::Null(ValueType::String))));
    }

    #[test]
    fn test_bind_rejects_mismatch() {
        assert!(DeclaredType::Boolean.bind(Value::Integer(1)).is_err());
        assert!(DeclaredType::Int.bind(Value::Double(1.5)).is_err());
    }

    #[test]
    fn test_bind_widens_into_floating_point() {
        assert_eq!(DeclaredType::Double.bind(Value::Integer(2)), Ok(Value::Double(2.0)));
        assert_eq!(DeclaredType::Float.bind(Value::Double(0.5)), Ok(Value::Float(0.5)));
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(DeclaredType::Int.zero_value(), Value::Integer(0));
        assert_eq!(DeclaredType::String.zero_value(), Value::string(""));
        assert!(DeclaredType::Class("A".into()).zero_value().is_null());
    }
}
