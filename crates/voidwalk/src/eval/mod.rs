//! Expression and statement evaluation

pub mod assign;
pub mod binary;
pub mod branch;
pub mod call;
pub mod control;
pub mod item;
pub mod loops;
pub mod member;
pub mod stmt;
pub mod unary;

pub use control::Completion;
pub use stmt::{exec_block, exec_operations, Execute};

use crate::ast::{Expr, ExprKind};
use crate::stack::ensure_sufficient_stack;
use crate::value::ObjectMap;
use crate::{Environment, EvalContext, EvalError, Value};

/// Trait for evaluating expression nodes to values.
///
/// Reading a variable yields the stored value with instances aliased
/// (see [`Value::share`]); whoever stores the result into a new binding
/// detaches it first.
pub trait Evaluate {
    /// Evaluate this node in the given environment.
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError>;
}

// ═══════════════════════════════════════════════════════════════════════
// Main Expression Dispatcher
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for Expr {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        ensure_sufficient_stack(|| eval_kind(self, env, ctx))
            .map_err(|err| err.at(&self.location))
    }
}

fn eval_kind(expr: &Expr, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
    match &expr.kind {
        ExprKind::Literal(value) => Ok(value.clone()),
        ExprKind::Identifier(name) => env.resolve_variable(name).map(Value::share),
        ExprKind::Binary { op, lhs, rhs } => binary::eval_binary(*op, lhs, rhs, env, ctx),
        ExprKind::Unary { op, operand } => {
            let value = operand.eval(env, ctx)?;
            unary::apply_unary(*op, value)
        }
        ExprKind::Call { name, args } => call::eval_call(name, args, env, ctx),
        ExprKind::Member { object, property } => {
            member::eval_member(object, property, env, ctx)
        }
        ExprKind::Index { object, index } => member::eval_index(object, index, env, ctx),
        ExprKind::ObjectLiteral(entries) => eval_object_literal(entries, env, ctx),
        ExprKind::New { class, args } => member::eval_new(class, args, env, ctx),
        ExprKind::MethodCall {
            receiver,
            method,
            args,
        } => member::eval_method_call(receiver, method, args, env, ctx),
        ExprKind::Scoped { scope, member } => member::eval_scoped(scope, member, env),
    }
}

/// Build an object; later duplicate keys overwrite earlier ones.
fn eval_object_literal(
    entries: &[(String, Expr)],
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let mut map = ObjectMap::new();
    for (key, value) in entries {
        let value = value.eval(env, ctx)?.detach();
        map.insert(key.clone(), value);
    }
    Ok(Value::Object(map))
}

/// Evaluate arguments left to right in the caller's scope.
pub fn eval_args(
    args: &[Expr],
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Vec<Value>, EvalError> {
    args.iter().map(|arg| arg.eval(env, ctx)).collect()
}

/// Evaluate an expression in a fresh interpreter-less environment.
#[cfg(test)]
pub(crate) fn eval_source(src: &str, env: &mut Environment) -> Result<Value, EvalError> {
    use crate::lexer::tokenize;
    use crate::parser::{lower, Parser};

    let tokens = tokenize(src, "test")?;
    let parsed = Parser::new(tokens, env).parse_expression(None)?;
    lower(parsed)?.eval(env, &EvalContext::default())
}
