//! RAII scope guards for exactly-once scope exit

use super::{Environment, ScopeKind};
use crate::error::EvalError;

enum Exit {
    /// Leave a reusable block scope in place
    Block,
    /// Discard the per-call scope and pop the call bookkeeping
    Call { scope: String },
}

/// RAII guard that returns to the previous scope when dropped.
///
/// Whatever way evaluation leaves the guarded region (normal completion,
/// `return`, `break` or an error travelling up through `?`), the scope is
/// exited exactly once.
///
/// # Example
///
/// ```
/// use voidwalk::Environment;
///
/// let mut env = Environment::new();
/// {
///     let guard = env.block_guard("main::if_3_1").unwrap();
///     assert_eq!(guard.current_name(), "main::if_3_1");
/// }
/// assert_eq!(env.current_name(), "main");
/// // block scopes are kept for the next execution
/// assert!(env.contains_scope("main::if_3_1"));
/// ```
pub struct ScopeGuard<'a> {
    env: &'a mut Environment,
    exit: Exit,
}

impl Environment {
    /// Enter a loop/conditional scope, creating it on first use.
    pub fn block_guard(&mut self, name: &str) -> Result<ScopeGuard<'_>, EvalError> {
        self.create(name, ScopeKind::Block);
        self.enter(name)?;
        Ok(ScopeGuard {
            env: self,
            exit: Exit::Block,
        })
    }

    /// Enter an existing scope (a class scope while evaluating defaults).
    pub fn enter_guard(&mut self, name: &str) -> Result<ScopeGuard<'_>, EvalError> {
        self.enter(name)?;
        Ok(ScopeGuard {
            env: self,
            exit: Exit::Block,
        })
    }

    /// Start a call: check the depth limit, create a fresh
    /// `<defining>::<name>::call<N>` scope and enter it.
    pub fn call_guard(
        &mut self,
        defining_scope: &str,
        name: &str,
        class: Option<String>,
        max_depth: usize,
    ) -> Result<ScopeGuard<'_>, EvalError> {
        self.enter_call(class, max_depth)?;
        let scope = self.next_call_scope(defining_scope, name);
        self.create(&scope, ScopeKind::Call);
        if let Err(err) = self.enter(&scope) {
            self.remove_scope(&scope);
            self.exit_call();
            return Err(err);
        }
        Ok(ScopeGuard {
            env: self,
            exit: Exit::Call { scope },
        })
    }
}

impl<'a> Drop for ScopeGuard<'a> {
    fn drop(&mut self) {
        self.env.enter_previous();
        if let Exit::Call { scope } = &self.exit {
            self.env.remove_scope(scope);
            self.env.exit_call();
        }
    }
}

impl<'a> std::ops::Deref for ScopeGuard<'a> {
    type Target = Environment;

    fn deref(&self) -> &Self::Target {
        self.env
    }
}

impl<'a> std::ops::DerefMut for ScopeGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeclaredType;
    use crate::value::Value;

    #[test]
    fn test_block_guard_restores_scope() {
        let mut env = Environment::new();
        let depth = env.depth();
        {
            let guard = env.block_guard("main::while_1_1").unwrap();
            assert_eq!(guard.depth(), depth + 1);
        }
        assert_eq!(env.depth(), depth);
        assert_eq!(env.current_name(), "main");
    }

    #[test]
    fn test_block_scope_is_reused() {
        let mut env = Environment::new();
        {
            let mut guard = env.block_guard("main::while_1_1").unwrap();
            guard
                .declare_variable("i", Value::Integer(1), DeclaredType::Int)
                .unwrap();
        }
        {
            let guard = env.block_guard("main::while_1_1").unwrap();
            assert_eq!(guard.resolve_variable("i").unwrap(), &Value::Integer(1));
        }
    }

    #[test]
    fn test_call_guard_discards_scope() {
        let mut env = Environment::new();
        let name;
        {
            let mut guard = env.call_guard("main", "f", None, 10).unwrap();
            name = guard.current_name().to_string();
            guard
                .bind_variable("n", Value::Integer(3), DeclaredType::Int)
                .unwrap();
            assert_eq!(guard.call_depth(), 1);
        }
        assert_eq!(name, "main::f::call1");
        assert!(!env.contains_scope(&name));
        assert_eq!(env.call_depth(), 0);
        assert!(env.resolve_variable("n").is_err());
    }

    #[test]
    fn test_nested_call_guards_get_distinct_scopes() {
        let mut env = Environment::new();
        let mut outer = env.call_guard("main", "f", None, 10).unwrap();
        let outer_name = outer.current_name().to_string();
        {
            let inner = outer.call_guard("main", "f", None, 10).unwrap();
            assert_ne!(inner.current_name(), outer_name);
            assert_eq!(inner.call_depth(), 2);
        }
        assert_eq!(outer.current_name(), outer_name);
    }

    #[test]
    fn test_call_guard_depth_error_leaves_state_clean() {
        let mut env = Environment::new();
        let err = env.call_guard("main", "f", None, 0).err().unwrap();
        assert!(matches!(err, EvalError::RuntimeError { .. }));
        assert_eq!(env.current_name(), "main");
        assert_eq!(env.call_depth(), 0);
    }
}
