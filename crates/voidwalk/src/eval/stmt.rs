//! Statement execution

use super::assign::{exec_assign, exec_declare};
use super::{branch, item, loops, Completion, Evaluate};
use crate::ast::{Stmt, StmtKind};
use crate::error::Location;
use crate::operation::Operation;
use crate::stack::ensure_sufficient_stack;
use crate::value::ValueType;
use crate::{Environment, EvalContext, EvalError, Value};

/// Trait for executing statement nodes.
pub trait Execute {
    /// Run this statement in the current scope of `env`.
    fn exec(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Completion, EvalError>;
}

impl Execute for Stmt {
    fn exec(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Completion, EvalError> {
        ensure_sufficient_stack(|| exec_kind(self, env, ctx))
            .map_err(|err| err.at(&self.location))
    }
}

fn exec_kind(stmt: &Stmt, env: &mut Environment, ctx: &EvalContext) -> Result<Completion, EvalError> {
    match &stmt.kind {
        StmtKind::Declare {
            name,
            ty,
            init,
            constant,
        } => exec_declare(name, ty, init, *constant, env, ctx)?,
        StmtKind::Assign { target, value } => exec_assign(target, value, env, ctx)?,
        StmtKind::Expression(expr) => {
            expr.eval(env, ctx)?;
        }
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => return branch::exec_if(condition, then_branch, else_branch, &stmt.location, env, ctx),
        StmtKind::While { condition, body } => {
            return loops::exec_while(condition, body, &stmt.location, env, ctx)
        }
        StmtKind::For {
            init,
            condition,
            step,
            body,
        } => {
            return loops::exec_for(
                init.as_deref(),
                condition.as_ref(),
                step.as_deref(),
                body,
                &stmt.location,
                env,
                ctx,
            )
        }
        StmtKind::ForEach {
            key,
            value,
            iterable,
            body,
        } => {
            return loops::exec_foreach(
                key.as_ref(),
                value,
                iterable,
                body,
                &stmt.location,
                env,
                ctx,
            )
        }
        StmtKind::Switch {
            subject,
            cases,
            default,
        } => {
            return branch::exec_switch(subject, cases, default.as_deref(), &stmt.location, env, ctx)
        }
        StmtKind::Return(value) => {
            let value = match value {
                Some(expr) => expr.eval(env, ctx)?.detach(),
                None => Value::Null(ValueType::Null),
            };
            return Ok(Completion::Return(value));
        }
        StmtKind::Break => return Ok(Completion::Break),
        StmtKind::Continue => return Ok(Completion::Continue),
        StmtKind::Function(decl) => item::declare_function(decl, env)?,
        StmtKind::Class(decl) => item::declare_class(decl, env, ctx)?,
        StmtKind::Enum(decl) => item::declare_enum(decl, env)?,
    }
    Ok(Completion::Normal)
}

/// Run a scope's operation log in order, stopping at the first abrupt
/// completion.
pub fn exec_operations(
    operations: &[Operation],
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Completion, EvalError> {
    for operation in operations {
        if ctx.trace {
            tracing::debug!(
                kind = ?operation.kind,
                target = %operation.target,
                scope = %env.current_name(),
                "execute"
            );
        }
        let completion = operation.stmt.exec(env, ctx)?;
        if completion.is_abrupt() {
            return Ok(completion);
        }
    }
    Ok(Completion::Normal)
}

/// Run an inline statement list (a loop or branch body).
pub fn exec_block(
    stmts: &[Stmt],
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Completion, EvalError> {
    for stmt in stmts {
        if ctx.trace {
            tracing::debug!(stmt = stmt.kind.label(), scope = %env.current_name(), "execute");
        }
        let completion = stmt.exec(env, ctx)?;
        if completion.is_abrupt() {
            return Ok(completion);
        }
    }
    Ok(Completion::Normal)
}

/// Name of the reusable scope for a loop or conditional at `location`,
/// nested under the current scope.
pub fn block_scope_name(env: &Environment, prefix: &str, location: &Location) -> String {
    format!(
        "{}::{}_{}_{}",
        env.current_name(),
        prefix,
        location.line,
        location.column
    )
}
