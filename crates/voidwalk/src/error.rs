//! Error types for parsing and evaluation

use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use thiserror::Error;

/// A position in script source.
///
/// Lines and columns are 1-based. A line of `0` means "unknown", which is
/// what errors raised away from any token start out with before
/// [`EvalError::at`] fills them in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// Source file name (or a host-supplied label such as `<repl>`)
    pub file: Rc<str>,

    /// 1-based line
    pub line: usize,

    /// 1-based column
    pub column: usize,
}

impl Location {
    /// Create a location.
    pub fn new(file: impl Into<Rc<str>>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// A location with no position information.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Whether this location carries a real position.
    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        } else {
            write!(f, "{}:?", self.file)
        }
    }
}

/// The error taxonomy, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    SyntaxError,
    NameError,
    TypeError,
    ArityError,
    AccessError,
    RuntimeError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::NameError => "NameError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ArityError => "ArityError",
            ErrorKind::AccessError => "AccessError",
            ErrorKind::RuntimeError => "RuntimeError",
        };
        f.write_str(name)
    }
}

/// Errors raised while parsing or evaluating a script.
///
/// Every error is fatal to the current script run; the interpreter unwinds
/// through nested statements (exiting each scope exactly once) and hands the
/// error to the host.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Malformed source.
    #[error("SyntaxError at {location}: {message}{}", expected_suffix(.expected))]
    SyntaxError {
        message: String,
        expected: Option<String>,
        location: Location,
    },

    /// Unresolved variable, function, method, class or property.
    #[error("NameError at {location}: {message}")]
    NameError { message: String, location: Location },

    /// Declared-type mismatch or incompatible operand kinds.
    #[error("TypeError at {location}: {message}")]
    TypeError { message: String, location: Location },

    /// Argument count mismatch.
    #[error("ArityError at {location}: {name} expects {expected} argument(s), got {got}")]
    ArityError {
        name: String,
        expected: usize,
        got: usize,
        location: Location,
    },

    /// Private member reached from outside its class.
    #[error("AccessError at {location}: {member} is private to {class}")]
    AccessError {
        member: String,
        class: String,
        location: Location,
    },

    /// Everything else.
    #[error("RuntimeError at {location}: {message}")]
    RuntimeError { message: String, location: Location },
}

fn expected_suffix(expected: &Option<String>) -> String {
    match expected {
        Some(e) => format!(" (expected {})", e),
        None => String::new(),
    }
}

impl EvalError {
    // ═══════════════════════════════════════════════════════════════════
    // Constructors (location filled in later by `at`)
    // ═══════════════════════════════════════════════════════════════════

    pub fn syntax(message: impl Into<String>, location: Location) -> Self {
        EvalError::SyntaxError {
            message: message.into(),
            expected: None,
            location,
        }
    }

    pub fn expected(
        message: impl Into<String>,
        expected: impl Into<String>,
        location: Location,
    ) -> Self {
        EvalError::SyntaxError {
            message: message.into(),
            expected: Some(expected.into()),
            location,
        }
    }

    pub fn name(message: impl Into<String>) -> Self {
        EvalError::NameError {
            message: message.into(),
            location: Location::unknown(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        EvalError::TypeError {
            message: message.into(),
            location: Location::unknown(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        EvalError::RuntimeError {
            message: message.into(),
            location: Location::unknown(),
        }
    }

    pub fn arity(name: impl Into<String>, expected: usize, got: usize) -> Self {
        EvalError::ArityError {
            name: name.into(),
            expected,
            got,
            location: Location::unknown(),
        }
    }

    pub fn access(member: impl Into<String>, class: impl Into<String>) -> Self {
        EvalError::AccessError {
            member: member.into(),
            class: class.into(),
            location: Location::unknown(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════

    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::SyntaxError { .. } => ErrorKind::SyntaxError,
            EvalError::NameError { .. } => ErrorKind::NameError,
            EvalError::TypeError { .. } => ErrorKind::TypeError,
            EvalError::ArityError { .. } => ErrorKind::ArityError,
            EvalError::AccessError { .. } => ErrorKind::AccessError,
            EvalError::RuntimeError { .. } => ErrorKind::RuntimeError,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            EvalError::SyntaxError { location, .. }
            | EvalError::NameError { location, .. }
            | EvalError::TypeError { location, .. }
            | EvalError::ArityError { location, .. }
            | EvalError::AccessError { location, .. }
            | EvalError::RuntimeError { location, .. } => location,
        }
    }

    fn location_mut(&mut self) -> &mut Location {
        match self {
            EvalError::SyntaxError { location, .. }
            | EvalError::NameError { location, .. }
            | EvalError::TypeError { location, .. }
            | EvalError::ArityError { location, .. }
            | EvalError::AccessError { location, .. }
            | EvalError::RuntimeError { location, .. } => location,
        }
    }

    /// Attach a location unless the error already has one.
    ///
    /// Errors are annotated innermost-first, so the most precise position
    /// wins.
    pub fn at(mut self, location: &Location) -> Self {
        if !self.location().is_known() {
            *self.location_mut() = location.clone();
        }
        self
    }

    /// The message without kind or position.
    pub fn message(&self) -> String {
        match self {
            EvalError::SyntaxError {
                message, expected, ..
            } => format!("{}{}", message, expected_suffix(expected)),
            EvalError::NameError { message, .. }
            | EvalError::TypeError { message, .. }
            | EvalError::RuntimeError { message, .. } => message.clone(),
            EvalError::ArityError {
                name, expected, got, ..
            } => format!("{} expects {} argument(s), got {}", name, expected, got),
            EvalError::AccessError { member, class, .. } => {
                format!("{} is private to {}", member, class)
            }
        }
    }

    /// Flatten into the host-facing diagnostic record.
    pub fn diagnostic(&self) -> Diagnostic {
        let location = self.location();
        Diagnostic {
            kind: self.kind(),
            message: self.message(),
            file: location.file.to_string(),
            line: location.line,
            column: location.column,
        }
    }
}

/// The host-facing shape of an error: `{kind, message, file, line, column}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl Diagnostic {
    /// Render as a single-line JSON object.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.file, self.line, self.column, self.kind, self.message
        )
    }
}
