//! Host-facing driver: scripts, templates and session state
//!
//! # Example
//!
//! ```
//! use voidwalk::{Interpreter, Value};
//!
//! let mut interp = Interpreter::new();
//! interp
//!     .run_script("function sq(int $n) int { return $n * $n; } int $x = sq(7);", "demo")
//!     .unwrap();
//! assert_eq!(interp.variable("x").unwrap(), Value::Integer(49));
//!
//! // the session keeps its state between runs
//! interp.run_script("print(sq($x));", "demo").unwrap();
//! assert_eq!(interp.output(), "2401\n");
//! ```

use crate::context::ROOT_SCOPE;
use crate::environment::parent_name;
use crate::eval::{exec_operations, Completion};
use crate::lexer::{tokenize, tokenize_range};
use crate::parser::Parser;
use crate::template::{segments, Segment};
use crate::token::Token;
use crate::{Environment, EvalContext, EvalError, Value};

/// An interpreter session: one environment plus its configuration.
#[derive(Debug)]
pub struct Interpreter {
    env: Environment,
    ctx: EvalContext,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_context(EvalContext::default())
    }

    pub fn with_context(ctx: EvalContext) -> Self {
        let mut env = Environment::with_prelude();
        env.output_mut().set_echo(ctx.echo_output);
        Self { env, ctx }
    }

    /// Parse `source` into the root scope and run what it added.
    ///
    /// Earlier runs' declarations stay visible; their statements are not
    /// run again. Any error stops the run and is returned as is.
    pub fn run_script(&mut self, source: &str, file: &str) -> Result<(), EvalError> {
        let tokens = tokenize(source, file)?;
        self.run_tokens(tokens)
    }

    /// Render a template: literal text is copied to the output, code
    /// between `<?void` and `?>` runs in this session, in order. Returns
    /// the text this call produced; it also stays in [`output`](Self::output).
    pub fn run_template(&mut self, source: &str, file: &str) -> Result<String, EvalError> {
        let mark = self.env.output().len();
        for segment in segments(source) {
            match segment {
                Segment::Text(range) => self.env.output_mut().write(&source[range]),
                Segment::Code(range) => {
                    let tokens = tokenize_range(source, range, file)?;
                    self.run_tokens(tokens)?;
                }
            }
        }
        Ok(self.env.output()[mark..].to_string())
    }

    fn run_tokens(&mut self, tokens: Vec<Token>) -> Result<(), EvalError> {
        let start = self.env.operations(ROOT_SCOPE).len();
        let mut parser = Parser::new(tokens, &mut self.env);
        let parsed = parser.parse_program()?;
        let bodies = parser.created_scopes().to_vec();
        tracing::debug!(operations = parsed, bodies = bodies.len(), "run");

        let operations = self.env.operations(ROOT_SCOPE);
        let result = exec_operations(&operations[start..], &mut self.env, &self.ctx)
            .and_then(|completion| match completion {
                Completion::Normal | Completion::Return(_) => Ok(()),
                other => Err(EvalError::runtime(format!(
                    "{} outside of a loop",
                    other.label()
                ))),
            });
        if result.is_err() {
            self.discard_undeclared(&bodies);
        }
        result
    }

    /// Remove the bodies of functions and classes whose declaration never
    /// ran because the run failed first, so the names stay free.
    fn discard_undeclared(&mut self, bodies: &[String]) {
        for body in bodies {
            let Some(parent) = parent_name(body) else {
                continue;
            };
            // nested bodies go with their outer body
            if bodies.iter().any(|b| b == parent) {
                continue;
            }
            let name = &body[parent.len() + 2..];
            let declared = self.env.scope(parent).is_some_and(|scope| {
                scope.function(name).is_some() || scope.type_symbol(name).is_some()
            });
            if !declared {
                tracing::trace!(scope = %body, "discard undeclared body");
                self.env.remove_scope(body);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Session State
    // ═══════════════════════════════════════════════════════════════════

    /// Everything the builtin printers have written so far.
    pub fn output(&self) -> &str {
        self.env.output()
    }

    pub fn take_output(&mut self) -> String {
        self.env.take_output()
    }

    /// A copy of a root-scope variable or constant.
    pub fn variable(&self, name: &str) -> Result<Value, EvalError> {
        self.env
            .scope(ROOT_SCOPE)
            .and_then(|root| {
                root.variable(name)
                    .map(|v| v.value.clone())
                    .or_else(|| root.constant(name).cloned())
            })
            .ok_or_else(|| EvalError::name(format!("undefined variable ${}", name)))
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn context(&self) -> &EvalContext {
        &self.ctx
    }

    /// Drop every scope and declaration, restart the call counter and
    /// restore the builtins. The configuration is kept.
    pub fn reset(&mut self) {
        self.env.reset();
        self.env.output_mut().set_echo(self.ctx.echo_output);
    }
}
