//! Function and method calls
//!
//! # Call protocol
//!
//! 1. Evaluate the arguments left to right in the caller's scope.
//! 2. Resolve the callee: builtins first, then user functions by ascent
//!    (methods are resolved by the caller through the class chain).
//! 3. Check the argument count.
//! 4. Open a fresh `<defining>::<name>::call<N>` scope; methods bind `this`
//!    to the live receiver.
//! 5. Bind each parameter to a detached copy of its argument.
//! 6. Run the body's operation log in the call scope.
//! 7. Turn the completion into the call's value and check it against the
//!    declared return type.
//!
//! The call scope is exited exactly once whichever way the body finishes.

use super::{eval_args, exec_operations, Completion};
use crate::ast::Expr;
use crate::symbol::FunctionSymbol;
use crate::types::DeclaredType;
use crate::{Environment, EvalContext, EvalError, Value};

/// Evaluate `name(args)`.
pub fn eval_call(
    name: &str,
    args: &[Expr],
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let values = eval_args(args, env, ctx)?;

    if let Some(builtin) = env.builtin(name).cloned() {
        if let Some(arity) = builtin.arity {
            if arity != values.len() {
                return Err(EvalError::arity(name, arity, values.len()));
            }
        }
        tracing::trace!(builtin = name, args = values.len(), "call builtin");
        return (builtin.func)(&values, env.output_mut()).map_err(EvalError::runtime);
    }

    let function = env.resolve_function(name)?;
    call_function(&function, None, values, env, ctx)
}

/// Invoke a user-defined function or method with evaluated arguments.
///
/// `receiver` is the instance a method was called on; it is bound as
/// `this` without copying.
pub fn call_function(
    function: &FunctionSymbol,
    receiver: Option<Value>,
    args: Vec<Value>,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let params = function.params();
    if args.len() != params.len() {
        return Err(EvalError::arity(
            function.qualified_name(),
            params.len(),
            args.len(),
        ));
    }

    tracing::trace!(
        function = %function.qualified_name(),
        depth = env.call_depth(),
        "call"
    );

    let mut frame = env.call_guard(
        &function.defining_scope,
        function.name(),
        function.class.clone(),
        ctx.max_call_depth,
    )?;

    if let (Some(this), Some(class)) = (receiver, &function.class) {
        frame.bind_variable("this", this, DeclaredType::Class(class.clone()))?;
    }

    for (param, arg) in params.iter().zip(args) {
        let value = param.ty.bind(arg.detach()).map_err(|arg| {
            EvalError::type_error(format!(
                "parameter ${} of {} expects {}, got {}",
                param.name,
                function.qualified_name(),
                param.ty,
                arg.type_name()
            ))
        })?;
        frame.bind_variable(param.name.as_str(), value, param.ty.clone())?;
    }

    let body = frame.operations(&function.decl.body_scope);
    let value = match exec_operations(&body, &mut frame, ctx)? {
        Completion::Normal => Value::Null(function.return_type().null_tag()),
        Completion::Return(value) => value,
        other => {
            return Err(EvalError::runtime(format!(
                "{} outside of a loop in {}",
                other.label(),
                function.qualified_name()
            )))
        }
    };
    drop(frame);

    let return_type = function.return_type();
    return_type.bind(value).map_err(|value| {
        EvalError::type_error(format!(
            "{} must return {}, got {}",
            function.qualified_name(),
            return_type,
            value.type_name()
        ))
    })
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
    fn test_call_scope_is_discarded() {
        let interp = run("function f(int $a) int { int $b = $a * 2; return $b; } int $r = f(4);")
            .unwrap();
        assert_eq!(interp.variable("r").unwrap(), Value::Integer(8));
        let env = interp.environment();
        assert!(!env.contains_scope("main::f::call1"));
        assert_eq!(env.call_depth(), 0);
        assert_eq!(env.current_name(), "main");
    }

    #[test]
    fn test_call_counter_is_monotonic() {
        let interp = run("function f() { } f(); f(); f();").unwrap();
        assert_eq!(interp.environment().call_counter(), 3);
    }

    #[test]
    fn test_fall_off_yields_typed_null() {
        let interp = run("function f() string { } string $s = f();").unwrap();
        assert!(interp.variable("s").unwrap().is_null());
    }

    #[test]
    fn test_builtins_shadow_user_functions() {
        let interp = run("function count(object $o) int { return 99; } int $n = count({a: 1});")
            .unwrap();
        assert_eq!(interp.variable("n").unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_parameter_type_is_checked() {
        let err = run("function f(int $a) { } f(\"x\");").unwrap_err();
        assert!(matches!(err, EvalError::TypeError { .. }));
    }

    #[test]
    fn test_return_type_is_checked() {
        let err = run("function f() int { return \"x\"; } f();").unwrap_err();
        assert!(matches!(err, EvalError::TypeError { .. }));
        let err = run("function g() void { return 1; } g();").unwrap_err();
        assert!(matches!(err, EvalError::TypeError { .. }));
    }

    #[test]
    fn test_break_outside_loop_in_function() {
        let err = run("function f() { break; } f();").unwrap_err();
        assert!(matches!(err, EvalError::RuntimeError { .. }));
    }

    #[test]
    fn test_stack_overflow_is_runtime_error() {
        let mut interp = Interpreter::with_context(EvalContext::with_max_call_depth(50));
        let err = interp
            .run_script("function down(int $n) int { return down($n + 1); } down(0);", "t")
            .unwrap_err();
        assert!(matches!(err, EvalError::RuntimeError { .. }));
        assert_eq!(interp.environment().call_depth(), 0);
        assert_eq!(interp.environment().current_name(), "main");
    }

    #[test]
    fn test_error_in_callee_unwinds_scopes() {
        let mut interp = Interpreter::new();
        let err = interp
            .run_script("function f() { int $x = 1; $x = $nope; } f();", "t")
            .unwrap_err();
        assert!(matches!(err, EvalError::NameError { .. }));
        assert_eq!(interp.environment().depth(), 0);
        assert!(!interp.environment().contains_scope("main::f::call1"));
    }
}
