//! Evaluation context configuration

/// Name of the root scope every script runs in.
pub const ROOT_SCOPE: &str = "main";

/// Configuration for evaluation.
///
/// This is passed by reference through all evaluation calls and controls
/// recursion limits and diagnostics. It carries no mutable state; the
/// scope tree and call counter live in [`crate::Environment`].
#[derive(Debug, Clone)]
pub struct EvalContext {
    /// Maximum call depth (stack overflow protection)
    pub max_call_depth: usize,

    /// Log every executed operation at `debug` level
    pub trace: bool,

    /// Mirror builtin output to stdout as well as the capture buffer
    pub echo_output: bool,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self {
            max_call_depth: 1000,
            trace: false,
            echo_output: false,
        }
    }
}

impl EvalContext {
    /// Create a new context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a custom call depth limit.
    pub fn with_max_call_depth(max_depth: usize) -> Self {
        Self {
            max_call_depth: max_depth,
            ..Default::default()
        }
    }

    /// Enable or disable operation tracing.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Enable or disable echoing output to stdout.
    pub fn with_echo_output(mut self, echo: bool) -> Self {
        self.echo_output = echo;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let ctx = EvalContext::default();
        assert_eq!(ctx.max_call_depth, 1000);
        assert!(!ctx.trace);
        assert!(!ctx.echo_output);
    }

    #[test]
    fn test_builders() {
        let ctx = EvalContext::with_max_call_depth(8)
            .with_trace(true)
            .with_echo_output(true);
        assert_eq!(ctx.max_call_depth, 8);
        assert!(ctx.trace);
        assert!(ctx.echo_output);
    }
}
