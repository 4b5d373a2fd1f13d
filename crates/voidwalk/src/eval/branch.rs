//! `if` and `switch`

use super::binary::apply_binary;
use super::stmt::{block_scope_name, exec_block};
use super::{Completion, Evaluate};
use crate::ast::{BinaryOp, Expr, Stmt, SwitchCase};
use crate::error::Location;
use crate::{Environment, EvalContext, EvalError, Value};

/// Evaluate a condition, which must be boolean.
pub fn eval_condition(
    condition: &Expr,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<bool, EvalError> {
    match condition.eval(env, ctx)? {
        Value::Boolean(b) => Ok(b),
        other => Err(EvalError::type_error(format!(
            "condition must be bool, got {}",
            other.type_name()
        ))
        .at(&condition.location)),
    }
}

pub fn exec_if(
    condition: &Expr,
    then_branch: &[Stmt],
    else_branch: &[Stmt],
    location: &Location,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Completion, EvalError> {
    let branch = if eval_condition(condition, env, ctx)? {
        then_branch
    } else {
        else_branch
    };
    if branch.is_empty() {
        return Ok(Completion::Normal);
    }
    let name = block_scope_name(env, "if", location);
    let mut scope = env.block_guard(&name)?;
    exec_block(branch, &mut scope, ctx)
}

/// Compare the subject against each case in order with `==`; run from the
/// first match onward (falling through into later cases and then the
/// default) until `break`. Without a match only the default runs.
pub fn exec_switch(
    subject: &Expr,
    cases: &[SwitchCase],
    default: Option<&[Stmt]>,
    location: &Location,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Completion, EvalError> {
    let subject = subject.eval(env, ctx)?;
    let name = block_scope_name(env, "switch", location);
    let mut scope = env.block_guard(&name)?;

    let mut matched = None;
    for (i, case) in cases.iter().enumerate() {
        let value = case.value.eval(&mut scope, ctx)?;
        let equal = apply_binary(BinaryOp::Eq, subject.share(), value)
            .map_err(|err| err.at(&case.value.location))?;
        if equal == Value::Boolean(true) {
            matched = Some(i);
            break;
        }
    }

    let start = matched.unwrap_or(cases.len());
    let bodies = cases[start..]
        .iter()
        .map(|case| case.body.as_slice())
        .chain(default);
    for body in bodies {
        match exec_block(body, &mut scope, ctx)? {
            Completion::Normal => {}
            Completion::Break => return Ok(Completion::Normal),
            other => return Ok(other),
        }
    }
    Ok(Completion::Normal)
}
