//! Statement completions for return/break/continue

use crate::value::Value;

/// How a statement finished.
///
/// Non-local exits travel up through nested statement execution as
/// ordinary return values, separate from the error channel. Loops consume
/// `Break` and `Continue`, `switch` consumes `Break`, and the call protocol
/// consumes `Return`.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Ran to the end; continue with the next statement
    Normal,

    /// `return`, carrying the (already detached) value
    Return(Value),

    Break,

    Continue,
}

impl Completion {
    /// Whether the enclosing statement list must stop here.
    pub fn is_abrupt(&self) -> bool {
        !matches!(self, Completion::Normal)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Completion::Normal => "normal",
            Completion::Return(_) => "return",
            Completion::Break => "break",
            Completion::Continue => "continue",
        }
    }
}
