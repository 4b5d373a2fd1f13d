//! Value constructors, predicates, accessors and conversions

use super::{ObjectMap, Value};

// ═══════════════════════════════════════════════════════════════════════
// Constructors
// ═══════════════════════════════════════════════════════════════════════

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Create an object value from key/value pairs
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Create an array-shaped object keyed `"0"`, `"1"`, ...
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Object(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Predicates
// ═══════════════════════════════════════════════════════════════════════

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    pub fn is_numeric(&self) -> bool {
        self.value_type().is_numeric()
    }

    pub fn is_instance(&self) -> bool {
        matches!(self, Value::Class(_))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Accessors
// ═══════════════════════════════════════════════════════════════════════

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value widened to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(f64::from(*n)),
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Equality
// ═══════════════════════════════════════════════════════════════════════

/// Structural equality. Variants must match exactly; all nulls are equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Class(a), Value::Class(b)) => {
                std::rc::Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Null(_), Value::Null(_)) => true,
            (Value::Undefined, Value::Undefined) => true,
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<ObjectMap> for Value {
    fn from(map: ObjectMap) -> Self {
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    #[test]
    fn test_array_keys() {
        let arr = Value::array([Value::Integer(10), Value::Integer(20)]);
        let map = arr.as_object().unwrap();
        assert_eq!(map["0"], Value::Integer(10));
        assert_eq!(map["1"], Value::Integer(20));
    }

    #[test]
    fn test_nulls_compare_equal_regardless_of_tag() {
        assert_eq!(Value::Null(ValueType::Integer), Value::Null(ValueType::String));
    }

    #[test]
    fn test_numeric_variants_do_not_cross_compare() {
        assert_ne!(Value::Integer(1), Value::Double(1.0));
    }

    #[test]
    fn test_as_f64_widens() {
        assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::string("x").as_f64(), None);
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(5i64), Value::Integer(5));
        assert_eq!(Value::from("hi"), Value::string("hi"));
        assert_eq!(Value::from(true), Value::Boolean(true));
    }
}
