//! Standard prelude with built-in functions

use std::rc::Rc;

use super::{Environment, OutputBuffer};
use crate::symbol::BuiltinFn;
use crate::types::DeclaredType;
use crate::value::Value;

impl Environment {
    /// Create an environment with standard built-in functions.
    pub fn with_prelude() -> Self {
        let mut env = Self::new();
        env.load_prelude();
        env
    }

    /// Load the standard prelude into this environment.
    pub fn load_prelude(&mut self) {
        // Printing
        self.define_builtin(BuiltinFn {
            name: "print".to_string(),
            arity: None,
            return_type: DeclaredType::Void,
            func: Rc::new(builtin_print),
        });

        self.define_builtin(BuiltinFn {
            name: "printnl".to_string(),
            arity: None,
            return_type: DeclaredType::Void,
            func: Rc::new(builtin_printnl),
        });

        // Type inspection
        self.define_builtin(BuiltinFn {
            name: "typeof".to_string(),
            arity: Some(1),
            return_type: DeclaredType::String,
            func: Rc::new(builtin_typeof),
        });

        self.define_builtin(BuiltinFn {
            name: "count".to_string(),
            arity: Some(1),
            return_type: DeclaredType::Int,
            func: Rc::new(builtin_count),
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Function Implementations
// ═══════════════════════════════════════════════════════════════════════

fn builtin_printnl(args: &[Value], out: &mut OutputBuffer) -> Result<Value, String> {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.write(" ");
        }
        out.write(&arg.to_string());
    }
    Ok(Value::Null(DeclaredType::Void.null_tag()))
}

fn builtin_print(args: &[Value], out: &mut OutputBuffer) -> Result<Value, String> {
    builtin_printnl(args, out)?;
    out.write("\n");
    Ok(Value::Null(DeclaredType::Void.null_tag()))
}

fn builtin_typeof(args: &[Value], _out: &mut OutputBuffer) -> Result<Value, String> {
    match args {
        [value] => Ok(Value::String(value.type_name())),
        _ => Err(format!("typeof expects 1 argument, got {}", args.len())),
    }
}

fn builtin_count(args: &[Value], _out: &mut OutputBuffer) -> Result<Value, String> {
    match args {
        [Value::Object(map)] => Ok(Value::Integer(map.len() as i64)),
        [Value::Class(instance)] => Ok(Value::Integer(instance.borrow().fields.len() as i64)),
        [Value::String(s)] => Ok(Value::Integer(s.chars().count() as i64)),
        [other] => Err(format!("count() cannot measure a {}", other.type_name())),
        _ => Err(format!("count expects 1 argument, got {}", args.len())),
    }
}
