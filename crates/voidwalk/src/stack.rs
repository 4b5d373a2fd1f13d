//! Stack growth for deeply recursive evaluation
//!
//! Every script-level call passes through several Rust frames, so a script
//! recursing within `EvalContext::max_call_depth` can still exhaust the
//! native stack. The recursive entry points (`Expr::eval`, `Stmt::exec`,
//! statement parsing) run through [`ensure_sufficient_stack`], which moves
//! to a fresh heap-allocated segment when the current one runs low.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
