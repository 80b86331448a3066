//! Execution engine for the ijm image macro language.
//!
//! The evaluator walks a tokenized [`ijm_ir::Program`] with a single program
//! counter, parsing and executing in one pass. All variable storage lives in
//! one flat stack of [`Cell`]s owned by the [`Context`]: globals at the
//! bottom, one contiguous region per active call above them.
//!
//! Everything outside the language itself (images, dialogs, the log window,
//! the results table, files) is reached through the [`Host`] trait;
//! [`HeadlessHost`] is an in-memory implementation for tests and the CLI.
//!
//! # Example
//!
//! ```
//! use ijm_eval::{HeadlessHost, Interpreter};
//!
//! let mut interpreter = Interpreter::new(HeadlessHost::buffered());
//! interpreter.run_source("x = 6; print(x * 7);").ok();
//! assert_eq!(interpreter.host().log_text(), "42\n");
//! ```

mod builtins;
mod cancel;
mod config;
mod context;
mod debugger;
mod errors;
mod host;
mod interpreter;
mod stack;
mod value;

pub use cancel::CancelToken;
pub use config::EvalConfig;
pub use context::{Cell, Context, Frame};
pub use debugger::{DebugAction, DebugMode, DebugTick, Debugger, LineTracer};
pub use errors::{Diagnostic, EvalErrorKind, EvalResult, Interrupt, RunError};
pub use host::{
    buffer_output, stdout_output, Color, DialogAnswer, HeadlessHost, Host, HostError, HostResult,
    ImageId, ImageInfo, ImageRef, OutputSink, Roi, SharedOutput,
};
pub use interpreter::{Interpreter, InterpreterBuilder};
pub use stack::ensure_sufficient_stack;
pub use value::{d2s, n2s, parse_number, Value};
