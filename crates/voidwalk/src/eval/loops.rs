//! Loop evaluation
//!
//! Each loop runs in one block scope, entered once per execution of the
//! loop statement and left exactly once when it finishes, however it
//! finishes. Iterations reuse that scope.

use super::branch::eval_condition;
use super::stmt::{block_scope_name, exec_block};
use super::{Completion, Evaluate, Execute};
use crate::ast::{Expr, ForEachBinding, Stmt};
use crate::error::Location;
use crate::types::DeclaredType;
use crate::{Environment, EvalContext, EvalError, Value};

/// What the loop should do after one run of its body.
enum Flow {
    Next,
    Exit(Completion),
}

fn after_body(completion: Completion) -> Flow {
    match completion {
        Completion::Normal | Completion::Continue => Flow::Next,
        Completion::Break => Flow::Exit(Completion::Normal),
        ret @ Completion::Return(_) => Flow::Exit(ret),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// while
// ═══════════════════════════════════════════════════════════════════════

pub fn exec_while(
    condition: &Expr,
    body: &[Stmt],
    location: &Location,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Completion, EvalError> {
    let name = block_scope_name(env, "while", location);
    let mut scope = env.block_guard(&name)?;
    while eval_condition(condition, &mut scope, ctx)? {
        if let Flow::Exit(completion) = after_body(exec_block(body, &mut scope, ctx)?) {
            return Ok(completion);
        }
    }
    Ok(Completion::Normal)
}

// ═══════════════════════════════════════════════════════════════════════
// for (init; condition; step)
// ═══════════════════════════════════════════════════════════════════════

pub fn exec_for(
    init: Option<&Stmt>,
    condition: Option<&Expr>,
    step: Option<&Stmt>,
    body: &[Stmt],
    location: &Location,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Completion, EvalError> {
    let name = block_scope_name(env, "for", location);
    let mut scope = env.block_guard(&name)?;
    if let Some(init) = init {
        init.exec(&mut scope, ctx)?;
    }
    loop {
        if let Some(condition) = condition {
            if !eval_condition(condition, &mut scope, ctx)? {
                break;
            }
        }
        if let Flow::Exit(completion) = after_body(exec_block(body, &mut scope, ctx)?) {
            return Ok(completion);
        }
        if let Some(step) = step {
            step.exec(&mut scope, ctx)?;
        }
    }
    Ok(Completion::Normal)
}

// ═══════════════════════════════════════════════════════════════════════
// for (key, value : iterable)
// ═══════════════════════════════════════════════════════════════════════

/// Iterate a snapshot of an object (key-sorted), an instance's properties
/// or a string's characters. Changes made by the body to the iterated
/// value do not affect the iteration.
pub fn exec_foreach(
    key: Option<&ForEachBinding>,
    value: &ForEachBinding,
    iterable: &Expr,
    body: &[Stmt],
    location: &Location,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Completion, EvalError> {
    let entries = snapshot(iterable.eval(env, ctx)?).map_err(|err| err.at(&iterable.location))?;

    let name = block_scope_name(env, "for", location);
    let mut scope = env.block_guard(&name)?;
    for (k, v) in entries {
        if let Some(key) = key {
            let k = key_value(k, &key.ty)?;
            bind(&mut scope, key, k)?;
        }
        bind(&mut scope, value, v)?;
        if let Flow::Exit(completion) = after_body(exec_block(body, &mut scope, ctx)?) {
            return Ok(completion);
        }
    }
    Ok(Completion::Normal)
}

fn snapshot(iterable: Value) -> Result<Vec<(String, Value)>, EvalError> {
    match iterable {
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Class(instance) => Ok(instance
            .borrow()
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()),
        Value::String(s) => Ok(s
            .chars()
            .enumerate()
            .map(|(i, c)| (i.to_string(), Value::String(c.to_string())))
            .collect()),
        other => Err(EvalError::type_error(format!(
            "cannot iterate over a {} value",
            other.type_name()
        ))),
    }
}

/// Keys are strings unless the binding asks for `int`.
fn key_value(key: String, ty: &DeclaredType) -> Result<Value, EvalError> {
    match ty {
        DeclaredType::Int => key
            .parse()
            .map(Value::Integer)
            .map_err(|_| EvalError::type_error(format!("key \"{}\" is not an int", key))),
        _ => Ok(Value::String(key)),
    }
}

fn bind(env: &mut Environment, binding: &ForEachBinding, value: Value) -> Result<(), EvalError> {
    let value = binding.ty.bind(value).map_err(|value| {
        EvalError::type_error(format!(
            "cannot bind a {} value to {} ${}",
            value.type_name(),
            binding.ty,
            binding.name
        ))
    })?;
    env.bind_variable(binding.name.as_str(), value, binding.ty.clone())
}
