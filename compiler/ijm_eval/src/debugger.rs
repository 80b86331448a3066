//! Debugger attach point.
//!
//! The interpreter calls [`Debugger::on_statement`] before dispatching each
//! statement, unless the debugger asks to run to completion. Stepping UI and
//! breakpoint storage belong to the implementor.

use crate::context::Context;

/// How the attached debugger wants execution to proceed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DebugMode {
    /// Pause before every statement.
    Step,
    /// Report every statement, slowly enough to follow.
    Trace,
    /// Report every statement without pausing.
    FastTrace,
    /// Stop reporting; the hook is no longer called.
    RunToCompletion,
    /// Run until the implementor recognises a breakpoint.
    RunToBreakpoint,
}

/// Debugger verdict for one statement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DebugAction {
    Continue,
    /// Stop the run; reported to the caller as an abort.
    Halt,
}

/// What the interpreter is about to execute.
#[derive(Debug)]
pub struct DebugTick<'a> {
    /// Token index of the statement's first token.
    pub pc: usize,
    /// 1-based source line of that token.
    pub line: usize,
    pub mode: DebugMode,
    pub context: &'a Context,
}

/// External debugger capability.
pub trait Debugger {
    fn mode(&self) -> DebugMode;

    fn on_statement(&mut self, tick: &DebugTick<'_>) -> DebugAction;
}

/// Debugger that emits one `tracing` event per statement, used by `ijm run --trace`.
#[derive(Debug, Default)]
pub struct LineTracer {
    last_line: usize,
}

impl Debugger for LineTracer {
    fn mode(&self) -> DebugMode {
        DebugMode::FastTrace
    }

    fn on_statement(&mut self, tick: &DebugTick<'_>) -> DebugAction {
        if tick.line != self.last_line {
            self.last_line = tick.line;
            tracing::info!(
                line = tick.line,
                stack = tick.context.len(),
                source = %tick.context.source_line(tick.pc),
                "trace"
            );
        }
        DebugAction::Continue
    }
}
