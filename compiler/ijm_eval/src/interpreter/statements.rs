//! Statement execution.

use ijm_ir::{SymbolId, Token, TokenKind};

use super::{Flow, Interpreter};
use crate::context::{Cell, Frame};
use crate::errors::{EvalErrorKind, EvalResult};
use crate::host::Host;
use crate::value::Value;

impl<H: Host> Interpreter<H> {
    /// Execute one statement.
    pub(crate) fn statement(&mut self, frame: &Frame) -> EvalResult<Flow> {
        self.check_cancel()?;
        self.debug_tick()?;

        let token = self.next();
        tracing::trace!(pc = self.tok_pc, kind = ?token.kind, "statement");
        match token.kind {
            TokenKind::LBrace => self.block(frame),
            TokenKind::Var => {
                self.var_declarations(frame)?;
                Ok(Flow::Normal)
            }
            TokenKind::If => self.if_statement(frame),
            TokenKind::For => self.for_statement(frame),
            TokenKind::While => self.while_statement(frame),
            TokenKind::Do => self.do_statement(frame),
            TokenKind::Return => self.return_statement(frame),
            TokenKind::Break | TokenKind::Continue => {
                if self.loop_depth == 0 {
                    let keyword = token.kind.spelling();
                    return Err(self.error(EvalErrorKind::NotInLoop(keyword)));
                }
                self.end_statement()?;
                Ok(if token.kind == TokenKind::Break {
                    Flow::Broke
                } else {
                    Flow::Continued
                })
            }
            // Declarations are indexed at load time.
            TokenKind::Macro | TokenKind::Function => {
                self.back_up();
                self.skip_statement()?;
                Ok(Flow::Normal)
            }
            TokenKind::Semicolon => Ok(Flow::Normal),
            // Only reachable as the missing body of a control construct.
            TokenKind::Eof => Err(self.error(EvalErrorKind::Expected("statement"))),
            TokenKind::VoidFn => {
                self.void_builtin(token, frame)?;
                self.end_statement()?;
                Ok(Flow::Normal)
            }
            TokenKind::Word
            | TokenKind::UserFn
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus
            | TokenKind::NumericFn
            | TokenKind::TextFn
            | TokenKind::ArrayFn => {
                self.back_up();
                self.simple_statement(frame)?;
                self.end_statement()?;
                Ok(Flow::Normal)
            }
            _ => {
                let text = self.ctx.program().token_text(token).into_owned();
                Err(self.error(EvalErrorKind::BadStatement(text)))
            }
        }
    }

    /// Execute statements up to the `}` closing a block whose `{` was read.
    pub(crate) fn block(&mut self, frame: &Frame) -> EvalResult<Flow> {
        loop {
            match self.peek().kind {
                TokenKind::RBrace => {
                    self.next();
                    return Ok(Flow::Normal);
                }
                TokenKind::Eof => {
                    self.next();
                    return Err(self.error(EvalErrorKind::Expected("}")));
                }
                _ => {
                    let flow = self.statement(frame)?;
                    if flow != Flow::Normal {
                        return Ok(flow);
                    }
                }
            }
        }
    }

    /// A statement without its terminating `;`: assignment, increment,
    /// call or builtin expression. Also used for `for` headers.
    pub(crate) fn simple_statement(&mut self, frame: &Frame) -> EvalResult<()> {
        let token = self.next();
        match token.kind {
            TokenKind::Word => self.word_statement(token, frame),
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let target = self.next();
                if target.kind != TokenKind::Word {
                    return Err(self.error(EvalErrorKind::VariableExpected));
                }
                let symbol = self.symbol(target)?;
                self.increment(symbol, step(token.kind), frame)?;
                Ok(())
            }
            TokenKind::UserFn => {
                self.call_user(token, frame)?;
                Ok(())
            }
            TokenKind::VoidFn => self.void_builtin(token, frame),
            _ => {
                self.back_up();
                self.expression(frame)?;
                Ok(())
            }
        }
    }

    /// Statement starting with an identifier.
    fn word_statement(&mut self, token: Token, frame: &Frame) -> EvalResult<()> {
        let start = self.tok_pc;
        let symbol = self.symbol(token)?;
        let next = self.peek().kind;
        match next {
            TokenKind::Eq => {
                self.next();
                let value = self.expression(frame)?;
                self.assign(symbol, value, frame)
            }
            kind if kind.is_compound_assign() => {
                self.next();
                let slot = self.existing(symbol, frame)?;
                let rhs = self.expression(frame)?;
                let current = self.ctx.cell(slot).value.clone();
                let updated = self.compound(kind, &current, &rhs)?;
                self.ctx.cell_mut(slot).value = updated;
                Ok(())
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                self.next();
                self.increment(symbol, step(next), frame)?;
                Ok(())
            }
            TokenKind::LBracket => self.element_statement(symbol, start, frame),
            _ => {
                // A bare expression such as `a.length;` or a misspelled call.
                self.back_up();
                self.expression(frame)?;
                Ok(())
            }
        }
    }

    /// `a[i] = v`, `a[i] op= v`, `a[i]++`; anything else is evaluated as an
    /// expression from `start`.
    fn element_statement(&mut self, symbol: SymbolId, start: usize, frame: &Frame) -> EvalResult<()> {
        self.next();
        let index = self.index(frame)?;
        self.expect(TokenKind::RBracket)?;
        let kind = self.peek().kind;
        match kind {
            TokenKind::Eq => {
                self.next();
                let value = self.expression(frame)?;
                self.store_element(symbol, index, value, frame)
            }
            kind if kind.is_compound_assign() => {
                self.next();
                let rhs = self.expression(frame)?;
                let current = self.load_element(symbol, index, frame)?;
                let updated = self.compound(kind, &current, &rhs)?;
                self.store_element(symbol, index, updated, frame)
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                self.next();
                let current = self.load_element(symbol, index, frame)?;
                let current = self.number(&current)?;
                self.store_element(symbol, index, Value::Number(current + step(kind)), frame)
            }
            _ => {
                self.pc = start;
                self.expression(frame)?;
                Ok(())
            }
        }
    }

    /// Bind `value` to `symbol`, declaring a local when the name is unknown.
    pub(crate) fn assign(&mut self, symbol: SymbolId, value: Value, frame: &Frame) -> EvalResult<()> {
        match self.ctx.lookup(symbol, frame) {
            Some(slot) => self.ctx.cell_mut(slot).value = value,
            None => {
                self.push_cell(Cell::new(symbol, value))?;
            }
        }
        Ok(())
    }

    /// Slot of a variable that must already exist.
    pub(crate) fn existing(&mut self, symbol: SymbolId, frame: &Frame) -> EvalResult<usize> {
        match self.ctx.lookup(symbol, frame) {
            Some(slot) => Ok(slot),
            None => Err(self.error(EvalErrorKind::UndefinedVariable)),
        }
    }

    /// Result of `current op= rhs`.
    fn compound(&mut self, op: TokenKind, current: &Value, rhs: &Value) -> EvalResult<Value> {
        if op == TokenKind::PlusEq && (current.is_text() || rhs.is_text()) {
            return Ok(Value::Text(current.as_text() + &rhs.as_text()));
        }
        let a = self.number(current)?;
        let b = self.number(rhs)?;
        Ok(Value::Number(match op {
            TokenKind::PlusEq => a + b,
            TokenKind::MinusEq => a - b,
            TokenKind::StarEq => a * b,
            _ => a / b,
        }))
    }

    /// Add `delta` to a numeric variable, returning the old value.
    pub(crate) fn increment(&mut self, symbol: SymbolId, delta: f64, frame: &Frame) -> EvalResult<f64> {
        let slot = self.existing(symbol, frame)?;
        self.increment_slot(slot, delta)
    }

    pub(crate) fn increment_slot(&mut self, slot: usize, delta: f64) -> EvalResult<f64> {
        let current = self.ctx.cell(slot).value.clone();
        let old = self.number(&current)?;
        self.ctx.cell_mut(slot).value = Value::Number(old + delta);
        Ok(old)
    }

    /// `name [= expr] {, name [= expr]} ;` after `var`.
    ///
    /// Each name gets a fresh cell unless the running code already declared
    /// it, so `var` shadows globals and enclosing frames.
    pub(crate) fn var_declarations(&mut self, frame: &Frame) -> EvalResult<()> {
        loop {
            let name = self.next();
            if name.kind != TokenKind::Word {
                return Err(self.error(EvalErrorKind::VariableExpected));
            }
            let symbol = self.symbol(name)?;
            let value = if self.peek().kind == TokenKind::Eq {
                self.next();
                self.expression(frame)?
            } else {
                Value::Number(0.0)
            };
            match self.ctx.lookup_local(symbol, frame) {
                Some(slot) => self.ctx.cell_mut(slot).value = value,
                None => {
                    self.push_cell(Cell::new(symbol, value))?;
                }
            }
            if self.peek().kind != TokenKind::Comma {
                break;
            }
            self.next();
        }
        self.end_statement()
    }

    /// `( boolean )` of an `if`, `while` or `do`.
    pub(crate) fn condition(&mut self, frame: &Frame) -> EvalResult<bool> {
        self.expect(TokenKind::LParen)?;
        self.strict_depth += 1;
        let value = self.expression(frame);
        self.strict_depth -= 1;
        let truth = self.boolean(&value?)?;
        self.expect(TokenKind::RParen)?;
        Ok(truth)
    }

    fn if_statement(&mut self, frame: &Frame) -> EvalResult<Flow> {
        if self.condition(frame)? {
            let flow = self.statement(frame)?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
            if self.peek().kind == TokenKind::Else {
                self.next();
                self.skip_statement()?;
            }
            Ok(Flow::Normal)
        } else {
            self.skip_statement()?;
            if self.peek().kind == TokenKind::Else {
                self.next();
                return self.statement(frame);
            }
            Ok(Flow::Normal)
        }
    }

    /// Run a loop body with `break`/`continue` enabled.
    fn loop_body(&mut self, frame: &Frame) -> EvalResult<Flow> {
        self.loop_depth += 1;
        let flow = self.statement(frame);
        self.loop_depth -= 1;
        flow
    }

    fn while_statement(&mut self, frame: &Frame) -> EvalResult<Flow> {
        let cond_pc = self.pc;
        loop {
            self.pc = cond_pc;
            let go = self.condition(frame)?;
            let body_pc = self.pc;
            if !go {
                self.skip_statement()?;
                return Ok(Flow::Normal);
            }
            match self.loop_body(frame)? {
                Flow::Normal | Flow::Continued => {}
                Flow::Broke => {
                    self.pc = body_pc;
                    self.skip_statement()?;
                    return Ok(Flow::Normal);
                }
                returned => return Ok(returned),
            }
        }
    }

    fn do_statement(&mut self, frame: &Frame) -> EvalResult<Flow> {
        let body_pc = self.pc;
        loop {
            self.pc = body_pc;
            match self.loop_body(frame)? {
                Flow::Normal => {}
                Flow::Continued => {
                    self.pc = body_pc;
                    self.skip_statement()?;
                }
                Flow::Broke => {
                    self.pc = body_pc;
                    self.skip_statement()?;
                    self.expect(TokenKind::While)?;
                    self.skip_parens()?;
                    self.end_statement()?;
                    return Ok(Flow::Normal);
                }
                returned => return Ok(returned),
            }
            self.expect(TokenKind::While)?;
            if !self.condition(frame)? {
                self.end_statement()?;
                return Ok(Flow::Normal);
            }
        }
    }

    /// `for (init; cond; step) body`. The header is read once to locate its
    /// parts; the condition and step are re-parsed on every iteration.
    fn for_statement(&mut self, frame: &Frame) -> EvalResult<Flow> {
        self.expect(TokenKind::LParen)?;
        self.strict_depth += 1;
        let header = self.for_header(frame);
        self.strict_depth -= 1;
        let (cond_pc, step_pc, body_pc) = header?;

        loop {
            self.pc = cond_pc;
            if self.peek().kind != TokenKind::Semicolon {
                self.strict_depth += 1;
                let value = self.expression(frame);
                self.strict_depth -= 1;
                let go = self.boolean(&value?)?;
                self.expect(TokenKind::Semicolon)?;
                if !go {
                    self.pc = body_pc;
                    self.skip_statement()?;
                    return Ok(Flow::Normal);
                }
            }

            self.pc = body_pc;
            match self.loop_body(frame)? {
                Flow::Normal | Flow::Continued => {}
                Flow::Broke => {
                    self.pc = body_pc;
                    self.skip_statement()?;
                    return Ok(Flow::Normal);
                }
                returned => return Ok(returned),
            }

            self.pc = step_pc;
            if self.peek().kind != TokenKind::RParen {
                self.strict_depth += 1;
                let stepped = self.simple_statement(frame);
                self.strict_depth -= 1;
                stepped?;
                self.expect(TokenKind::RParen)?;
            }
        }
    }

    /// Run the initializer and return the positions of condition, step and body.
    fn for_header(&mut self, frame: &Frame) -> EvalResult<(usize, usize, usize)> {
        if self.peek().kind != TokenKind::Semicolon {
            self.simple_statement(frame)?;
        }
        self.expect(TokenKind::Semicolon)?;
        let cond_pc = self.pc;
        self.scan_to(TokenKind::Semicolon)?;
        let step_pc = self.pc;
        self.scan_to(TokenKind::RParen)?;
        Ok((cond_pc, step_pc, self.pc))
    }

    fn return_statement(&mut self, frame: &Frame) -> EvalResult<Flow> {
        let bare = match self.peek().kind {
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => true,
            _ => self.loose() && self.at_line_end(),
        };
        let value = if bare {
            None
        } else {
            Some(self.expression(frame)?)
        };
        self.end_statement()?;
        Ok(Flow::Returned(value))
    }
}

/// `+1` for `++`, `-1` for `--`.
fn step(kind: TokenKind) -> f64 {
    if kind == TokenKind::PlusPlus {
        1.0
    } else {
        -1.0
    }
}
