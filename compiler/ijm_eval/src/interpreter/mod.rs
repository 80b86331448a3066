//! The interpreter: one program counter over the token stream.
//!
//! There is no syntax tree. Statements and expressions are parsed and
//! executed in the same pass; loops jump the program counter back to their
//! condition and re-parse it on every iteration, and code that must not run
//! (untaken branches, declarations, short-circuited operands) is skipped by
//! scanning for balanced delimiters.
//!
//! # Control flow
//!
//! Every statement returns a [`Flow`]. `return`, `break` and `continue`
//! travel up as ordinary values until the function body or loop that owns
//! them; genuine failures travel as [`Interrupt`] through `Err`.
//!
//! # Entry points
//!
//! - `run_source` / `run`: execute from the start, in source order
//! - `push_globals`: load a program and hoist its globals only
//! - `run_macro` / `run_macro_named`: load, hoist, run one macro body
//! - `invoke_macro`: run another macro of the loaded program, keeping globals

mod builder;
mod calls;
mod entries;
mod expressions;
mod scan;
mod statements;


pub use builder::InterpreterBuilder;

use ijm_ir::{Program, SymbolId, Token, TokenKind};
use rand::rngs::StdRng;

use crate::cancel::CancelToken;
use crate::config::EvalConfig;
use crate::context::{Cell, Context, Frame};
use crate::debugger::{DebugAction, DebugMode, DebugTick, Debugger};
use crate::errors::{Diagnostic, EvalErrorKind, EvalResult, Interrupt, RunError};
use crate::host::{Host, HostError, HostResult, ImageId};
use crate::value::Value;

use entries::Entries;

/// Outcome of executing one statement.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Flow {
    Normal,
    /// `return`, with its value if one was given.
    Returned(Option<Value>),
    Broke,
    Continued,
}

/// Executes programs against a host.
///
/// One interpreter runs one program at a time. Independent programs run
/// concurrently only on independent interpreters.
pub struct Interpreter<H: Host> {
    pub(crate) host: H,
    pub(crate) config: EvalConfig,
    cancel: CancelToken,
    debugger: Option<Box<dyn Debugger>>,
    pub(crate) ctx: Context,
    /// Index of the next raw token to read.
    pub(crate) pc: usize,
    /// Index of the token read last; diagnostics point here.
    pub(crate) tok_pc: usize,
    /// Non-zero while parsing a control-construct header.
    pub(crate) strict_depth: u32,
    /// Loops enclosing the current statement within the current body.
    pub(crate) loop_depth: u32,
    /// Macro and function bodies currently executing.
    pub(crate) body_depth: u32,
    entries: Entries,
    /// Active image, memoized across consecutive builtin calls.
    pub(crate) image: Option<ImageId>,
    pub(crate) rng: StdRng,
    failed: bool,
    macro_ran: bool,
}

impl<H: Host> Interpreter<H> {
    /// Interpreter with default configuration.
    pub fn new(host: H) -> Self {
        InterpreterBuilder::new(host).build()
    }

    pub fn builder(host: H) -> InterpreterBuilder<H> {
        InterpreterBuilder::new(host)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Token an outside actor can use to stop the run.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Request that the current run stop at the next statement.
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    /// Whether a diagnostic has been shown. A failed interpreter runs nothing.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Current value of the newest variable called `name`.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        let symbol = self.ctx.program().symbols().lookup_word(name)?;
        let slot = self.ctx.lookup(symbol, &Frame::top(self.ctx.globals_end()))?;
        Some(&self.ctx.cell(slot).value)
    }

    /// Names of the macros declared in the loaded program, in source order.
    pub fn macro_names(&self) -> Vec<&str> {
        self.entries.macros().iter().map(|m| m.name.as_str()).collect()
    }

    /// Token index of the macro called `name`.
    pub fn macro_entry(&self, name: &str) -> Option<usize> {
        self.entries.macro_named(name).map(|m| m.keyword_pc)
    }

    /// Tokenize `source` and run it.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run_source(&mut self, source: &str) -> Result<(), RunError> {
        self.ensure_usable()?;
        let program = match ijm_lexer::tokenize(source) {
            Ok(program) => program,
            Err(error) => {
                self.failed = true;
                self.host.show_error(&error.to_string());
                return Err(error.into());
            }
        };
        self.run(program)
    }

    /// Run a tokenized program from the start.
    ///
    /// Statements run in source order. Each top-level `var` declaration
    /// extends the global region as it executes. The first `macro` block
    /// reached is executed; later ones are skipped.
    #[tracing::instrument(level = "debug", skip_all, fields(tokens = program.len()))]
    pub fn run(&mut self, program: Program) -> Result<(), RunError> {
        self.load(program)?;
        let result = self.main_pass();
        self.finish(result)
    }

    /// Load `program` and execute only its top-level `var` declarations.
    pub fn push_globals(&mut self, program: Program) -> Result<(), RunError> {
        self.load(program)?;
        let result = self.hoist_globals();
        self.finish(result)
    }

    /// Replace the context with a fresh one for `program` and index its
    /// declarations.
    fn load(&mut self, program: Program) -> Result<(), RunError> {
        self.ensure_usable()?;
        self.ctx = Context::new(program, self.config.stack_capacity);
        self.reset_state();
        self.entries = match Entries::index(self.ctx.program()) {
            Ok(entries) => entries,
            Err(error) => {
                self.tok_pc = error.pc;
                let interrupt = self.error(error.kind);
                return self.finish(Err(interrupt));
            }
        };
        Ok(())
    }

    /// Load `program` and run the macro whose `macro` keyword (or body
    /// brace) is at token index `entry`.
    #[tracing::instrument(level = "debug", skip_all, fields(entry))]
    pub fn run_macro(&mut self, program: Program, entry: usize) -> Result<(), RunError> {
        self.push_globals(program)?;
        self.invoke_macro(entry)
    }

    /// Load `program` and run the macro called `name`.
    pub fn run_macro_named(&mut self, program: Program, name: &str) -> Result<(), RunError> {
        self.push_globals(program)?;
        let entry = self
            .macro_entry(name)
            .ok_or_else(|| RunError::UnknownMacro(name.to_string()))?;
        self.invoke_macro(entry)
    }

    /// Run one macro of the already loaded program. Globals keep their
    /// values between invocations; the macro's locals are released.
    pub fn invoke_macro(&mut self, entry: usize) -> Result<(), RunError> {
        self.ensure_usable()?;
        let body = self
            .entries
            .macros()
            .iter()
            .find(|m| m.keyword_pc == entry || m.body_pc == entry)
            .map(|m| m.body_pc)
            .ok_or(RunError::BadEntry(entry))?;
        self.reset_state();
        let result = self.exec_macro_body(body);
        self.ctx.trim(self.ctx.globals_end());
        self.finish(result)
    }

    fn ensure_usable(&self) -> Result<(), RunError> {
        if self.failed {
            Err(RunError::AlreadyFailed)
        } else {
            Ok(())
        }
    }

    fn reset_state(&mut self) {
        self.pc = 0;
        self.tok_pc = 0;
        self.strict_depth = 0;
        self.loop_depth = 0;
        self.body_depth = 0;
        self.image = None;
        self.macro_ran = false;
    }

    fn finish(&mut self, result: EvalResult<()>) -> Result<(), RunError> {
        match result {
            Ok(()) | Err(Interrupt::Exited) => Ok(()),
            Err(Interrupt::Error(diagnostic)) => Err(RunError::Diagnostic(diagnostic)),
            Err(Interrupt::Canceled) => {
                tracing::debug!("canceled by host");
                Err(RunError::Canceled)
            }
            Err(Interrupt::Aborted) => {
                tracing::debug!("aborted");
                Err(RunError::Aborted)
            }
        }
    }

    /// Execute the top-level `var` declarations and seal the global region.
    fn hoist_globals(&mut self) -> EvalResult<()> {
        self.pc = 0;
        let frame = Frame::top(0);
        loop {
            match self.peek().kind {
                TokenKind::Eof => break,
                TokenKind::Var => {
                    self.next();
                    self.var_declarations(&frame)?;
                }
                _ => self.skip_statement()?,
            }
        }
        self.ctx.seal_globals();
        tracing::debug!(globals = self.ctx.globals_end(), "globals hoisted");
        Ok(())
    }

    fn main_pass(&mut self) -> EvalResult<()> {
        self.pc = 0;
        let frame = Frame::top(0);
        loop {
            match self.peek().kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Var => {
                    self.statement(&frame)?;
                    self.ctx.seal_globals();
                }
                TokenKind::Macro if !self.macro_ran => {
                    self.macro_ran = true;
                    self.next();
                    self.expect(TokenKind::Str)?;
                    let body = self.peek_pc();
                    self.exec_macro_body(body)?;
                }
                _ => {
                    if let Flow::Returned(_) = self.statement(&frame)? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Execute the block at `body_pc`, leaving the program counter after it.
    fn exec_macro_body(&mut self, body_pc: usize) -> EvalResult<()> {
        self.pc = body_pc;
        self.expect(TokenKind::LBrace)?;
        let frame = Frame::top(self.ctx.globals_end());
        self.body_depth += 1;
        let flow = self.block(&frame)?;
        self.body_depth -= 1;
        if flow != Flow::Normal {
            self.pc = body_pc;
            self.skip_block()?;
        }
        Ok(())
    }

    // Token reading

    /// Read the next token, stepping over end-of-line markers.
    pub(crate) fn next(&mut self) -> Token {
        loop {
            let token = self.ctx.token(self.pc);
            self.tok_pc = self.pc;
            if token.kind == TokenKind::Eof {
                return token;
            }
            self.pc += 1;
            if token.kind != TokenKind::Eol {
                return token;
            }
        }
    }

    /// The token `next` would return, without advancing.
    pub(crate) fn peek(&self) -> Token {
        self.ctx.token(self.peek_pc())
    }

    /// Index of the token `next` would return.
    pub(crate) fn peek_pc(&self) -> usize {
        let mut pc = self.pc;
        while self.ctx.token(pc).kind == TokenKind::Eol {
            pc += 1;
        }
        pc
    }

    /// Step back so the token read last is read again.
    pub(crate) fn back_up(&mut self) {
        self.pc = self.tok_pc;
    }

    /// Whether the raw token at the program counter ends a line.
    pub(crate) fn at_line_end(&self) -> bool {
        matches!(self.ctx.token(self.pc).kind, TokenKind::Eol | TokenKind::Eof)
    }

    /// Whether a missing `;` may be forgiven here.
    pub(crate) fn loose(&self) -> bool {
        self.config.loose_syntax && self.strict_depth == 0
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> EvalResult<Token> {
        let token = self.next();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.error(EvalErrorKind::Expected(kind.spelling())))
        }
    }

    /// Consume the `;` ending a statement.
    pub(crate) fn end_statement(&mut self) -> EvalResult<()> {
        if self.peek().kind == TokenKind::Semicolon {
            self.next();
            return Ok(());
        }
        if self.loose() && (self.at_line_end() || self.peek().kind == TokenKind::RBrace) {
            return Ok(());
        }
        self.next();
        Err(self.error(EvalErrorKind::Expected(";")))
    }

    /// Symbol carried by an identifier-like token.
    pub(crate) fn symbol(&mut self, token: Token) -> EvalResult<SymbolId> {
        match token.symbol {
            Some(symbol) => Ok(symbol),
            None => Err(self.error(EvalErrorKind::UndefinedIdentifier)),
        }
    }

    pub(crate) fn push_cell(&mut self, cell: Cell) -> EvalResult<usize> {
        match self.ctx.push(cell) {
            Ok(slot) => Ok(slot),
            Err(kind) => Err(self.error(kind)),
        }
    }

    // Per-statement hooks

    pub(crate) fn check_cancel(&self) -> EvalResult<()> {
        if self.cancel.is_canceled() {
            Err(Interrupt::Aborted)
        } else {
            Ok(())
        }
    }

    pub(crate) fn debug_tick(&mut self) -> EvalResult<()> {
        let Some(debugger) = self.debugger.as_mut() else {
            return Ok(());
        };
        let mode = debugger.mode();
        if mode == DebugMode::RunToCompletion {
            return Ok(());
        }
        let mut pc = self.pc;
        while self.ctx.token(pc).kind == TokenKind::Eol {
            pc += 1;
        }
        let tick = DebugTick {
            pc,
            line: self.ctx.line_of(pc),
            mode,
            context: &self.ctx,
        };
        match debugger.on_statement(&tick) {
            DebugAction::Continue => Ok(()),
            DebugAction::Halt => Err(Interrupt::Aborted),
        }
    }

    // Failures

    /// Report `kind` at the last token read and produce the unwinding signal.
    ///
    /// Only the first failure of an interpreter reaches the host.
    pub(crate) fn error(&mut self, kind: EvalErrorKind) -> Interrupt {
        let diagnostic = Diagnostic {
            kind,
            line: self.ctx.line_of(self.tok_pc),
            source_line: self.ctx.source_line(self.tok_pc),
        };
        if !self.failed {
            self.failed = true;
            tracing::debug!(line = diagnostic.line, error = %diagnostic.kind, "macro error");
            self.host.show_error(&diagnostic.to_string());
        }
        Interrupt::Error(Box::new(diagnostic))
    }

    /// Map a host result into evaluation.
    pub(crate) fn checked<T>(&mut self, result: HostResult<T>) -> EvalResult<T> {
        result.map_err(|error| match error {
            HostError::Canceled => Interrupt::Canceled,
            HostError::NoImage => self.error(EvalErrorKind::NoImage),
            HostError::Failed(message) => self.error(EvalErrorKind::Host(message)),
        })
    }

    /// Numeric view of a value; arrays are not numbers.
    pub(crate) fn number(&mut self, value: &Value) -> EvalResult<f64> {
        match value {
            Value::Array(_) => Err(self.error(EvalErrorKind::NumberExpected)),
            other => Ok(other.as_number()),
        }
    }

    /// Truth value of a boolean (exactly 1 or 0).
    pub(crate) fn boolean(&mut self, value: &Value) -> EvalResult<bool> {
        match value {
            Value::Number(n) if *n == 1.0 => Ok(true),
            Value::Number(n) if *n == 0.0 => Ok(false),
            _ => Err(self.error(EvalErrorKind::BooleanExpected)),
        }
    }
}
