//! Member access, indexing, method calls, instantiation and `Name::member`

use std::cell::RefCell;
use std::rc::Rc;

use super::call::call_function;
use super::{eval_args, Evaluate};
use crate::ast::Expr;
use crate::class::{check_access, ClassInfo};
use crate::value::{Instance, ObjectMap};
use crate::{Environment, EvalContext, EvalError, Value};

// ═══════════════════════════════════════════════════════════════════════
// Reads
// ═══════════════════════════════════════════════════════════════════════

/// `object->property`
pub fn eval_member(
    object: &Expr,
    property: &str,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let target = object.eval(env, ctx)?;
    read_member(target, property, env.executing_class())
}

/// `object[index]`: objects and instances by key, strings by position.
pub fn eval_index(
    object: &Expr,
    index: &Expr,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let target = object.eval(env, ctx)?;
    let index = index.eval(env, ctx)?;
    if let Value::String(s) = &target {
        let Value::Integer(position) = index else {
            return Err(EvalError::type_error(format!(
                "string index must be int, got {}",
                index.type_name()
            )));
        };
        return usize::try_from(position)
            .ok()
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string()))
            .ok_or_else(|| EvalError::runtime(format!("string index {} out of range", position)));
    }
    let key = index_key(&index)?;
    read_member(target, &key, env.executing_class())
}

/// Object keys are strings; integer indexes name the same keys.
pub fn index_key(index: &Value) -> Result<String, EvalError> {
    match index {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(n) => Ok(n.to_string()),
        other => Err(EvalError::type_error(format!(
            "index must be string or int, got {}",
            other.type_name()
        ))),
    }
}

fn read_member(target: Value, name: &str, executing: Option<&str>) -> Result<Value, EvalError> {
    match target {
        Value::Object(mut map) => map
            .remove(name)
            .ok_or_else(|| EvalError::runtime(format!("undefined key \"{}\"", name))),
        Value::Class(instance) => {
            let instance = instance.borrow();
            let class = instance.class();
            let property = class.property(name).ok_or_else(|| {
                EvalError::name(format!("undefined property {} on {}", name, class.name()))
            })?;
            check_access(
                property.private,
                name,
                &property.declared_in,
                class.name(),
                executing,
            )?;
            instance
                .get(name)
                .map(Value::share)
                .ok_or_else(|| EvalError::name(format!("undefined property {}", name)))
        }
        other => Err(EvalError::runtime(format!(
            "cannot read member {} of a {} value",
            name,
            other.type_name()
        ))),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Methods and Instantiation
// ═══════════════════════════════════════════════════════════════════════

/// `receiver->method(args)`: resolved through the receiver's class chain.
pub fn eval_method_call(
    receiver: &Expr,
    method: &str,
    args: &[Expr],
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let target = receiver.eval(env, ctx)?;
    let class = match &target {
        Value::Class(instance) => Rc::clone(instance.borrow().class()),
        other => {
            return Err(EvalError::runtime(format!(
                "cannot call method {} on a {} value",
                method,
                other.type_name()
            )))
        }
    };

    let values = eval_args(args, env, ctx)?;

    let function = class.find_method(method).ok_or_else(|| {
        EvalError::name(format!("undefined method {} on {}", method, class.name()))
    })?;
    let owner = function.class.as_deref().unwrap_or(class.name());
    check_access(
        function.is_private(),
        method,
        owner,
        class.name(),
        env.executing_class(),
    )?;

    call_function(&function, Some(target), values, env, ctx)
}

/// `new Class(args)`: lay out the properties (defaults evaluated in the
/// class scope, zero values otherwise), then run the constructor if the
/// class chain has one.
pub fn eval_new(
    name: &str,
    args: &[Expr],
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let class = env.resolve_class(name)?;
    let values = eval_args(args, env, ctx)?;

    let fields = instance_fields(&class, env, ctx)?;
    let instance = Value::Class(Rc::new(RefCell::new(Instance::new(
        Rc::clone(&class),
        fields,
    ))));

    match class.constructor() {
        Some(constructor) => {
            let owner = constructor.class.as_deref().unwrap_or(class.name());
            check_access(
                constructor.is_private(),
                constructor.name(),
                owner,
                class.name(),
                env.executing_class(),
            )?;
            tracing::trace!(class = name, "construct");
            call_function(&constructor, Some(instance.share()), values, env, ctx)?;
        }
        None if !values.is_empty() => {
            return Err(EvalError::arity(format!("new {}", name), 0, values.len()));
        }
        None => {}
    }
    Ok(instance)
}

fn instance_fields(
    class: &ClassInfo,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<ObjectMap, EvalError> {
    let mut fields = ObjectMap::new();
    for property in class.properties() {
        let value = match &property.default {
            Some(default) => {
                let mut scope = env.enter_guard(class.scope())?;
                let value = default.eval(&mut scope, ctx)?.detach();
                property.ty.bind(value).map_err(|value| {
                    EvalError::type_error(format!(
                        "default of {}::${} must be {}, got {}",
                        property.declared_in,
                        property.name,
                        property.ty,
                        value.type_name()
                    ))
                    .at(&default.location)
                })?
            }
            None => property.ty.zero_value(),
        };
        fields.insert(property.name.clone(), value);
    }
    Ok(fields)
}

// ═══════════════════════════════════════════════════════════════════════
// Name::member
// ═══════════════════════════════════════════════════════════════════════

/// An enum member or a static property.
pub fn eval_scoped(scope: &str, member: &str, env: &Environment) -> Result<Value, EvalError> {
    if let Some(enumeration) = env.resolve_enum(scope) {
        return enumeration
            .value(member)
            .map(Value::Integer)
            .ok_or_else(|| EvalError::name(format!("undefined enum member {}::{}", scope, member)));
    }

    let class = env.resolve_class(scope)?;
    let (_, property) = class.find_static(member).ok_or_else(|| {
        EvalError::name(format!("undefined static property {}::{}", scope, member))
    })?;
    check_access(
        property.private,
        member,
        &property.declared_in,
        class.name(),
        env.executing_class(),
    )?;
    class
        .static_value(member)
        .ok_or_else(|| EvalError::name(format!("undefined static property {}::{}", scope, member)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Interpreter;

    fn run(src: &str) -> Result<Interpreter, EvalError> {
        let mut interp = Interpreter::new();
        interp.run_script(src, "test")?;
        Ok(interp)
    }

    #[test]
    fn test_property_defaults_and_zero_values() {
        let interp = run("class P { int $x = 3; string $s; double $d = 1; } P $p = new P();")
            .unwrap();
        let Value::Class(p) = interp.variable("p").unwrap() else {
            panic!("expected instance");
        };
        let p = p.borrow();
        assert_eq!(p.get("x"), Some(&Value::Integer(3)));
        assert_eq!(p.get("s"), Some(&Value::string("")));
        assert_eq!(p.get("d"), Some(&Value::Double(1.0)));
    }

    #[test]
    fn test_constructor_runs_with_live_this() {
        let interp = run(
            "class P { int $x; function construct(int $x) { $this->x = $x; } }
             P $p = new P(9);
             int $v = $p->x;",
        )
        .unwrap();
        assert_eq!(interp.variable("v").unwrap(), Value::Integer(9));
    }

    #[test]
    fn test_new_without_constructor_rejects_arguments() {
        let err = run("class P { } P $p = new P(1);").unwrap_err();
        assert!(matches!(err, EvalError::ArityError { .. }));
    }

    #[test]
    fn test_undefined_class_and_method() {
        assert!(matches!(run("auto $p = new Nope();"), Err(EvalError::NameError { .. })));
        assert!(matches!(
            run("class P { } P $p = new P(); $p->nope();"),
            Err(EvalError::NameError { .. })
        ));
    }

    #[test]
    fn test_member_of_non_object() {
        let err = run("int $a = 1; auto $b = $a->x;").unwrap_err();
        assert!(matches!(err, EvalError::RuntimeError { .. }));
    }

    #[test]
    fn test_missing_object_key() {
        let err = run("object $o = {a: 1}; auto $b = $o[\"b\"];").unwrap_err();
        assert!(matches!(err, EvalError::RuntimeError { .. }));
    }

    #[test]
    fn test_indexing() {
        let interp = run(
            "object $a = [10, 20, 30];
             int $x = $a[1];
             string $s = \"hey\";
             string $c = $s[2];",
        )
        .unwrap();
        assert_eq!(interp.variable("x").unwrap(), Value::Integer(20));
        assert_eq!(interp.variable("c").unwrap(), Value::string("y"));
    }

    #[test]
    fn test_inherited_method_and_override() {
        let interp = run(
            "class A { function who() string { return \"A\"; } function base() string { return \"base\"; } }
             class B extends A { function who() string { return \"B\"; } }
             B $b = new B();
             string $w = $b->who();
             string $x = $b->base();",
        )
        .unwrap();
        assert_eq!(interp.variable("w").unwrap(), Value::string("B"));
        assert_eq!(interp.variable("x").unwrap(), Value::string("base"));
    }

    #[test]
    fn test_enum_and_static_reads() {
        let interp = run(
            "enum Level { Low, High = 10, Higher }
             class C { static int $count = 4; }
             int $h = Level::Higher;
             int $c = C::count;",
        )
        .unwrap();
        assert_eq!(interp.variable("h").unwrap(), Value::Integer(11));
        assert_eq!(interp.variable("c").unwrap(), Value::Integer(4));
    }
}
