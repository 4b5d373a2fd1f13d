//! Value representation for runtime values

mod display;
mod impls;
mod instance;

pub use instance::Instance;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Storage for `Object` values and instance fields.
///
/// A `BTreeMap` so that iteration (and therefore `for`-in output) is
/// key-sorted rather than insertion-ordered.
pub type ObjectMap = BTreeMap<String, Value>;

/// Runtime value representation.
///
/// `Clone` is a **deep** copy: cloning a `Class` value allocates a fresh
/// instance, so every new binding owns independent storage. The only way to
/// alias an instance is [`Value::share`], used for a method's `this`.
#[derive(Debug)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Scalars
    // ═══════════════════════════════════════════════════════════════════
    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point
    Double(f64),

    /// 32-bit floating point
    Float(f32),

    /// Owned string
    String(String),

    /// `true` or `false`
    Boolean(bool),

    // ═══════════════════════════════════════════════════════════════════
    // Composites
    // ═══════════════════════════════════════════════════════════════════
    /// Key-sorted map of name to value (also used for array literals)
    Object(ObjectMap),

    /// A class instance: fields plus the class it was built from
    Class(Rc<RefCell<Instance>>),

    // ═══════════════════════════════════════════════════════════════════
    // Absence
    // ═══════════════════════════════════════════════════════════════════
    /// Null carrying the type it stands in for
    Null(ValueType),

    /// Result of reading something that was never given a value
    Undefined,
}

/// The tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Integer,
    Double,
    Float,
    String,
    Boolean,
    Object,
    Class,
    Null,
    Undefined,
}

impl ValueType {
    /// Script-facing name of the type.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Integer => "int",
            ValueType::Double => "double",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Boolean => "bool",
            ValueType::Object => "object",
            ValueType::Class => "class",
            ValueType::Null => "null",
            ValueType::Undefined => "undefined",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::Integer | ValueType::Double | ValueType::Float
        )
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// The tag of this value. Every null reports [`ValueType::Null`].
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Integer(_) => ValueType::Integer,
            Value::Double(_) => ValueType::Double,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Object(_) => ValueType::Object,
            Value::Class(_) => ValueType::Class,
            Value::Null(_) => ValueType::Null,
            Value::Undefined => ValueType::Undefined,
        }
    }

    /// Name used in messages and by `typeof`; instances report their class.
    pub fn type_name(&self) -> String {
        match self {
            Value::Class(instance) => instance.borrow().class_name().to_string(),
            other => other.value_type().name().to_string(),
        }
    }

    /// Alias the same instance instead of copying it.
    ///
    /// Scalars and objects have no identity, so this is the same as `clone`
    /// for them.
    pub fn share(&self) -> Value {
        match self {
            Value::Class(instance) => Value::Class(Rc::clone(instance)),
            other => other.clone(),
        }
    }
}

impl Value {
    /// Make this value independent of every other binding before it is
    /// stored. Only instances need work; everything else already owns its
    /// payload.
    pub fn detach(self) -> Value {
        match self {
            Value::Class(_) => self.clone(),
            other => other,
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        match self {
            Value::Integer(n) => Value::Integer(*n),
            Value::Double(n) => Value::Double(*n),
            Value::Float(n) => Value::Float(*n),
            Value::String(s) => Value::String(s.clone()),
            Value::Boolean(b) => Value::Boolean(*b),
            Value::Object(map) => Value::Object(map.clone()),
            Value::Class(instance) => {
                let copy = instance.borrow().clone();
                Value::Class(Rc::new(RefCell::new(copy)))
            }
            Value::Null(tag) => Value::Null(*tag),
            Value::Undefined => Value::Undefined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_object_is_independent() {
        let original = Value::object([("k", Value::string("v"))]);
        let mut copy = original.clone();
        if let Value::Object(map) = &mut copy {
            map.insert("k".to_string(), Value::string("x"));
        }
        assert_eq!(original.as_object().unwrap()["k"], Value::string("v"));
        assert_eq!(copy.as_object().unwrap()["k"], Value::string("x"));
    }

    #[test]
    fn test_nested_object_clone_is_deep() {
        let inner = Value::object([("n", Value::Integer(1))]);
        let original = Value::object([("inner", inner)]);
        let mut copy = original.clone();
        if let Value::Object(map) = &mut copy {
            if let Some(Value::Object(inner)) = map.get_mut("inner") {
                inner.insert("n".to_string(), Value::Integer(2));
            }
        }
        let Value::Object(map) = &original else {
            panic!("expected object");
        };
        assert_eq!(map["inner"].as_object().unwrap()["n"], Value::Integer(1));
    }

    #[test]
    fn test_value_type_of_null_is_null() {
        assert_eq!(Value::Null(ValueType::String).value_type(), ValueType::Null);
        assert_eq!(Value::Undefined.value_type(), ValueType::Undefined);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Integer(1).type_name(), "int");
        assert_eq!(Value::Boolean(true).type_name(), "bool");
        assert_eq!(Value::object::<&str>([]).type_name(), "object");
    }
}
