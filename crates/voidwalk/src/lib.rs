//! # Voidwalk
//!
//! A tree-walking runtime for a small, class-based scripting language
//! meant to be embedded in a host program.
//!
//! Source text is tokenized, parsed into an expression/statement tree and
//! recorded as an ordered operation log per scope. The evaluator then runs
//! each log against a tree of named scopes, with copy-on-bind value
//! semantics, per-call scopes for recursion and single-inheritance classes
//! with private members.
//!
//! ## Architecture
//!
//! - **Lexer**: `logos` token stream with source positions
//! - **Parser**: precedence climbing for expressions, recursive descent
//!   for statements, lowering into the executable AST
//! - **Environment**: scope tree, symbol namespaces, class registry
//! - **Evaluator**: `Evaluate` for expressions, `Execute` for statements
//! - **Interpreter**: the host-facing session (scripts and templates)
//!
//! ```
//! use voidwalk::Interpreter;
//!
//! let mut interp = Interpreter::new();
//! interp
//!     .run_script("for (int $i = 0; $i < 3; $i++) { printnl($i); }", "demo")
//!     .unwrap();
//! assert_eq!(interp.output(), "012");
//! ```

#![warn(clippy::all)]

pub mod ast;
pub mod class;
pub mod context;
pub mod environment;
pub mod error;
pub mod eval;
pub mod interpreter;
pub mod lexer;
pub mod operation;
pub mod parser;
pub mod stack;
pub mod symbol;
pub mod template;
pub mod token;
pub mod types;
pub mod value;

// Re-export main types
pub use class::{ClassInfo, PropertyInfo};
pub use context::{EvalContext, ROOT_SCOPE};
pub use environment::{Environment, OutputBuffer, Scope, ScopeGuard, ScopeKind};
pub use error::{Diagnostic, ErrorKind, EvalError, Location};
pub use eval::{Completion, Evaluate, Execute};
pub use interpreter::Interpreter;
pub use lexer::tokenize;
pub use parser::Parser;
pub use symbol::{BuiltinFn, FunctionSymbol, Symbol, Variable};
pub use types::DeclaredType;
pub use value::{Instance, Value, ValueType};

/// Voidwalk version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
