//! Display formatting for values

use std::fmt;

use super::{ObjectMap, Value};

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            other => write_nested(f, other),
        }
    }
}

/// Top-level strings print raw; strings inside composites are quoted.
fn write_nested(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Integer(n) => write!(f, "{}", n),
        Value::Double(n) => write!(f, "{}", n),
        Value::Float(n) => write!(f, "{}", n),
        Value::String(s) => write!(f, "{:?}", s),
        Value::Boolean(b) => write!(f, "{}", b),
        Value::Object(map) => write_map(f, map),
        Value::Class(instance) => {
            let instance = instance.borrow();
            write!(f, "{} ", instance.class_name())?;
            write_map(f, &instance.fields)
        }
        Value::Null(_) => f.write_str("null"),
        Value::Undefined => f.write_str("undefined"),
    }
}

fn write_map(f: &mut fmt::Formatter<'_>, map: &ObjectMap) -> fmt::Result {
    if map.is_empty() {
        return f.write_str("{}");
    }
    f.write_str("{")?;
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{:?}: ", key)?;
        write_nested(f, value)?;
    }
    f.write_str("}")
}
