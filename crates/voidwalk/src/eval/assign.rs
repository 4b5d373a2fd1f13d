//! Declarations and assignments

use std::rc::Rc;

use super::member::index_key;
use super::Evaluate;
use crate::ast::{AssignTarget, Expr, PathSegment};
use crate::class::check_access;
use crate::symbol::Symbol;
use crate::types::DeclaredType;
use crate::{Environment, EvalContext, EvalError, Value};

/// `<type> $name = init;` / `const <type> NAME = init;`
pub fn exec_declare(
    name: &str,
    ty: &DeclaredType,
    init: &Expr,
    constant: bool,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<(), EvalError> {
    let value = init.eval(env, ctx)?.detach();
    let value = ty.bind(value).map_err(|value| {
        EvalError::type_error(format!(
            "cannot initialize {} ${} with a {} value",
            ty,
            name,
            value.type_name()
        ))
    })?;
    if constant {
        env.add(Symbol::Constant {
            name: name.to_string(),
            value,
        })
    } else {
        env.declare_variable(name, value, ty.clone())
    }
}

/// `target = value;`
pub fn exec_assign(
    target: &AssignTarget,
    value: &Expr,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<(), EvalError> {
    let value = value.eval(env, ctx)?.detach();
    match target {
        AssignTarget::Static { class, member } => assign_static(class, member, value, env),
        AssignTarget::Variable { name, path } => {
            // evaluate every index before borrowing the variable cell
            let mut keys = Vec::with_capacity(path.len());
            for segment in path {
                keys.push(match segment {
                    PathSegment::Member(name) => PathKey::Member(name.clone()),
                    PathSegment::Index(expr) => {
                        let index = expr.eval(env, ctx)?;
                        PathKey::Index(index_key(&index).map_err(|e| e.at(&expr.location))?)
                    }
                });
            }

            let executing = env.executing_class().map(str::to_string);
            let cell = env.resolve_variable_mut(name)?;
            if keys.is_empty() {
                cell.value = cell.ty.bind(value).map_err(|value| {
                    EvalError::type_error(format!(
                        "cannot assign a {} value to {} ${}",
                        value.type_name(),
                        cell.ty,
                        name
                    ))
                })?;
                return Ok(());
            }
            assign_path(&mut cell.value, &keys, value, executing.as_deref())
        }
    }
}

enum PathKey {
    /// `->name`: the slot must already exist
    Member(String),
    /// `[key]`: objects gain the key if missing
    Index(String),
}

impl PathKey {
    fn name(&self) -> &str {
        match self {
            PathKey::Member(name) | PathKey::Index(name) => name,
        }
    }
}

/// Store `value` at `slot` followed by `keys`, mutating the owning
/// binding in place.
fn assign_path(
    slot: &mut Value,
    keys: &[PathKey],
    value: Value,
    executing: Option<&str>,
) -> Result<(), EvalError> {
    let Some((key, rest)) = keys.split_first() else {
        *slot = value;
        return Ok(());
    };
    let name = key.name();

    match slot {
        Value::Object(map) => {
            if rest.is_empty() && matches!(key, PathKey::Index(_)) {
                map.insert(name.to_string(), value);
                return Ok(());
            }
            let child = map
                .get_mut(name)
                .ok_or_else(|| EvalError::runtime(format!("undefined key \"{}\"", name)))?;
            assign_path(child, rest, value, executing)
        }
        Value::Class(instance) => {
            let mut instance = instance.borrow_mut();
            let class = Rc::clone(instance.class());
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
            let field = instance
                .fields
                .get_mut(name)
                .ok_or_else(|| EvalError::name(format!("undefined property {}", name)))?;
            if !rest.is_empty() {
                return assign_path(field, rest, value, executing);
            }
            *field = property.ty.bind(value).map_err(|value| {
                EvalError::type_error(format!(
                    "cannot assign a {} value to {} {}->{}",
                    value.type_name(),
                    property.ty,
                    class.name(),
                    name
                ))
            })?;
            Ok(())
        }
        other => Err(EvalError::runtime(format!(
            "cannot assign member {} of a {} value",
            name,
            other.type_name()
        ))),
    }
}

fn assign_static(
    class_name: &str,
    member: &str,
    value: Value,
    env: &Environment,
) -> Result<(), EvalError> {
    let class = env.resolve_class(class_name)?;
    let (_, property) = class.find_static(member).ok_or_else(|| {
        EvalError::name(format!("undefined static property {}::{}", class_name, member))
    })?;
    check_access(
        property.private,
        member,
        &property.declared_in,
        class.name(),
        env.executing_class(),
    )?;
    let value = property.ty.bind(value).map_err(|value| {
        EvalError::type_error(format!(
            "cannot assign a {} value to {} {}::{}",
            value.type_name(),
            property.ty,
            class_name,
            member
        ))
    })?;
    class.set_static(member, value);
    Ok(())
}
