//! Error types for the evaluator.
//!
//! Three layers:
//! - `EvalErrorKind`: what went wrong at a token
//! - `Interrupt`: why evaluation unwound (error, cancellation, abort, exit)
//! - `RunError`: what an entry point reports to its caller

use std::fmt;

use ijm_lexer::LexError;

/// A syntax or semantic error raised while executing a program.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalErrorKind {
    #[error("'{0}' expected")]
    Expected(&'static str),
    #[error("Statement cannot begin with '{0}'")]
    BadStatement(String),
    #[error("Number or string expected")]
    ValueExpected,
    #[error("Number or numeric function expected")]
    NumberExpected,
    #[error("String expected")]
    StringExpected,
    #[error("Array expected")]
    ArrayExpected,
    #[error("Boolean expression expected")]
    BooleanExpected,
    #[error("Variable expected")]
    VariableExpected,
    #[error("Undefined variable")]
    UndefinedVariable,
    #[error("Undefined identifier")]
    UndefinedIdentifier,
    #[error("Undefined function")]
    UndefinedFunction,
    #[error("Index ({index}) out of 0-{} range", .len.saturating_sub(1))]
    IndexOutOfRange { index: i64, len: usize },
    #[error("Stack overflow")]
    StackOverflow,
    #[error("No return value")]
    NoReturnValue,
    #[error("Too many arguments")]
    TooManyArguments,
    #[error("{expected} argument(s) expected")]
    ArgumentCount { expected: usize },
    #[error("'{0}' not in a loop")]
    NotInLoop(&'static str),
    #[error("Invalid {0}")]
    Invalid(&'static str),
    #[error("Mixed strings and numbers")]
    MixedArray,
    #[error("No image")]
    NoImage,
    #[error("{0}")]
    Host(String),
}

/// The single diagnostic shown for a failed run.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub kind: EvalErrorKind,
    /// 1-based source line.
    pub line: usize,
    /// The reconstructed source line, offending token bracketed as `<tok>`.
    pub source_line: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in line {}:\n{}", self.kind, self.line, self.source_line)
    }
}

/// Non-local exit from evaluation. Never caught before the entry point.
#[derive(Debug, PartialEq)]
pub enum Interrupt {
    /// A diagnostic was shown; the run is over.
    Error(Box<Diagnostic>),
    /// A host call reported that the user canceled it.
    Canceled,
    /// The cancellation token was set, or a debugger halted the run.
    Aborted,
    /// The program called `exit`.
    Exited,
}

/// Result type for evaluation.
pub type EvalResult<T> = Result<T, Interrupt>;

/// Error returned by the interpreter's entry points.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("{0}")]
    Diagnostic(Box<Diagnostic>),
    #[error("macro canceled")]
    Canceled,
    #[error("macro aborted")]
    Aborted,
    #[error("interpreter already reported an error")]
    AlreadyFailed,
    #[error("no macro named '{0}'")]
    UnknownMacro(String),
    #[error("token {0} does not start a macro body")]
    BadEntry(usize),
}

impl RunError {
    /// The diagnostic, if this run ended with one.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            RunError::Diagnostic(d) => Some(d),
            _ => None,
        }
    }
}
