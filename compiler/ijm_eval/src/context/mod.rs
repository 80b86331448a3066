//! Execution context: the program being run and its value stack.
//!
//! All storage lives in one flat stack of cells. Globals occupy
//! `[0, globals_end)`; every active call owns a contiguous region above them
//! that is released in bulk when the call returns. A [`Frame`] records where
//! the running code's region starts.

use std::fmt::Write as _;

use ijm_ir::{Program, SymbolId, Token, TokenKind};

use crate::errors::EvalErrorKind;
use crate::value::Value;


/// Most cells reserved up front; larger stacks grow on demand.
const PREALLOCATED: usize = 4096;

/// One stack slot: a value and the identifier it is bound to.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub symbol: Option<SymbolId>,
    pub value: Value,
}

impl Cell {
    pub fn new(symbol: SymbolId, value: Value) -> Self {
        Cell {
            symbol: Some(symbol),
            value,
        }
    }

    /// A pushed argument not yet bound to a parameter name.
    pub fn unbound(value: Value) -> Self {
        Cell {
            symbol: None,
            value,
        }
    }
}

/// Bounds of the code currently executing.
///
/// `base` is the first cell of the running call's locals (0 at top level);
/// `globals_end` marks where the declared globals end. Inside a call
/// `base >= globals_end`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub base: usize,
    pub globals_end: usize,
}

impl Frame {
    /// Frame for top-level code and macro bodies.
    pub const fn top(globals_end: usize) -> Self {
        Frame {
            base: 0,
            globals_end,
        }
    }
}

/// The program plus its value stack.
#[derive(Debug)]
pub struct Context {
    program: Program,
    stack: Vec<Cell>,
    capacity: usize,
    globals_end: usize,
}

impl Context {
    /// Context for `program` with room for `capacity` cells.
    pub fn new(program: Program, capacity: usize) -> Self {
        Context {
            program,
            stack: Vec::with_capacity(capacity.min(PREALLOCATED)),
            capacity,
            globals_end: 0,
        }
    }

    #[inline]
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Token at `pc`; `Eof` past the end.
    #[inline]
    pub fn token(&self, pc: usize) -> Token {
        self.program.token(pc)
    }

    /// Symbol name for `id`, or `?` for an unknown index.
    pub fn symbol_name(&self, id: SymbolId) -> &str {
        self.program
            .symbols()
            .get(id)
            .map_or("?", |symbol| symbol.name.as_str())
    }

    /// Push a cell, returning its index.
    pub fn push(&mut self, cell: Cell) -> Result<usize, EvalErrorKind> {
        if self.stack.len() >= self.capacity {
            return Err(EvalErrorKind::StackOverflow);
        }
        self.stack.push(cell);
        Ok(self.stack.len() - 1)
    }

    /// Find the cell bound to `symbol`.
    ///
    /// Searches the frame's locals newest-first, then the globals
    /// newest-first, so the most recent declaration of a name wins.
    pub fn lookup(&self, symbol: SymbolId, frame: &Frame) -> Option<usize> {
        let bound = |index: &usize| self.stack[*index].symbol == Some(symbol);
        (frame.base..self.stack.len())
            .rev()
            .find(bound)
            .or_else(|| (0..frame.globals_end.min(frame.base)).rev().find(bound))
    }

    /// Find `symbol` among cells the running code declared itself,
    /// excluding globals and enclosing frames.
    pub fn lookup_local(&self, symbol: SymbolId, frame: &Frame) -> Option<usize> {
        (frame.base.max(frame.globals_end)..self.stack.len())
            .rev()
            .find(|&index| self.stack[index].symbol == Some(symbol))
    }

    #[inline]
    pub fn cell(&self, index: usize) -> &Cell {
        &self.stack[index]
    }

    #[inline]
    pub fn cell_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.stack[index]
    }

    /// Number of live cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Release every cell at or above `len`.
    pub fn trim(&mut self, len: usize) {
        if len < self.stack.len() {
            tracing::trace!(from = self.stack.len(), to = len, "trim");
            self.stack.truncate(len);
        }
    }

    #[inline]
    pub fn globals_end(&self) -> usize {
        self.globals_end
    }

    /// Fix the end of the global region at the current stack height.
    pub fn seal_globals(&mut self) {
        self.globals_end = self.stack.len();
    }

    /// 1-based line of the token at `pc`.
    pub fn line_of(&self, pc: usize) -> usize {
        let end = pc.min(self.program.len());
        1 + self.program.tokens()[..end]
            .iter()
            .filter(|token| token.kind == TokenKind::Eol)
            .count()
    }

    /// Rebuild the source line containing `pc`, bracketing that token.
    pub fn source_line(&self, pc: usize) -> String {
        let tokens = self.program.tokens();
        let pc = pc.min(tokens.len());
        let start = tokens[..pc]
            .iter()
            .rposition(|token| token.kind == TokenKind::Eol)
            .map_or(0, |eol| eol + 1);
        let end = tokens[pc..]
            .iter()
            .position(|token| matches!(token.kind, TokenKind::Eol | TokenKind::Eof))
            .map_or(tokens.len(), |offset| pc + offset);

        let mut line = String::new();
        for (index, &token) in tokens.iter().enumerate().take(end).skip(start) {
            if !line.is_empty() {
                line.push(' ');
            }
            let text = self.program.token_text(token);
            if index == pc {
                let _ = write!(line, "<{text}>");
            } else {
                line.push_str(&text);
            }
        }
        if pc >= end {
            // Failure at end of line or end of file.
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str("<>");
        }
        line
    }

    /// Symbol table listing for `dump`.
    pub fn render_symbols(&self) -> String {
        let symbols = self.program.symbols();
        let mut out = String::from("Symbol table:\n");
        for (id, symbol) in symbols.iter().skip(symbols.preamble_len()) {
            let _ = writeln!(out, "{:5} {:?} {}", id.raw(), symbol.kind, symbol.name);
        }
        out
    }

    /// Token stream listing for `dump`, one source line per output line.
    pub fn render_tokens(&self) -> String {
        let mut out = String::from("Tokens:\n");
        let mut line = 1;
        let mut current = String::new();
        for &token in self.program.tokens() {
            match token.kind {
                TokenKind::Eol | TokenKind::Eof => {
                    let _ = writeln!(out, "{line:5} {current}");
                    current.clear();
                    line += 1;
                }
                _ => {
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(&self.program.token_text(token));
                }
            }
        }
        out
    }

    /// Stack listing for `dump`, newest cell last.
    pub fn render_stack(&self) -> String {
        let mut out = format!(
            "Stack ({} of {} cells, globals end at {}):\n",
            self.stack.len(),
            self.capacity,
            self.globals_end
        );
        for (index, cell) in self.stack.iter().enumerate() {
            let name = cell.symbol.map_or("", |id| self.symbol_name(id));
            let value = match &cell.value {
                Value::Text(s) => format!("\"{s}\""),
                Value::Array(items) => format!("array[{}]", items.len()),
                other => other.as_text(),
            };
            let _ = writeln!(out, "{index:5} {name} = {value}");
        }
        out
    }
}
