//! Skipping code without executing it.
//!
//! Untaken branches, exhausted loop bodies, declarations and
//! short-circuited operands are passed over by counting delimiters. No
//! side effects happen while skipping; only structural errors (an
//! unbalanced brace running into end of file) are reported.

use ijm_ir::TokenKind;

use super::Interpreter;
use crate::errors::{EvalErrorKind, EvalResult};
use crate::host::Host;

impl<H: Host> Interpreter<H> {
    /// Skip one complete statement, including any `else` or `while` tail.
    pub(crate) fn skip_statement(&mut self) -> EvalResult<()> {
        let token = self.next();
        match token.kind {
            TokenKind::LBrace => {
                self.back_up();
                self.skip_block()
            }
            TokenKind::If => {
                self.skip_parens()?;
                self.skip_statement()?;
                if self.peek().kind == TokenKind::Else {
                    self.next();
                    self.skip_statement()?;
                }
                Ok(())
            }
            TokenKind::For | TokenKind::While => {
                self.skip_parens()?;
                self.skip_statement()
            }
            TokenKind::Do => {
                self.skip_statement()?;
                self.expect(TokenKind::While)?;
                self.skip_parens()?;
                if self.peek().kind == TokenKind::Semicolon {
                    self.next();
                }
                Ok(())
            }
            TokenKind::Macro => {
                self.expect(TokenKind::Str)?;
                self.skip_block()
            }
            TokenKind::Function => {
                self.next();
                self.skip_parens()?;
                self.skip_block()
            }
            TokenKind::Semicolon | TokenKind::Eof => Ok(()),
            TokenKind::RBrace => Err(self.error(EvalErrorKind::BadStatement("}".into()))),
            _ => {
                self.back_up();
                self.skip_simple()
            }
        }
    }

    /// Skip a `{ ... }` block, braces balanced.
    pub(crate) fn skip_block(&mut self) -> EvalResult<()> {
        self.expect(TokenKind::LBrace)?;
        let mut depth = 0usize;
        loop {
            let token = self.next();
            match token.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace if depth == 0 => return Ok(()),
                TokenKind::RBrace => depth -= 1,
                TokenKind::Eof => return Err(self.error(EvalErrorKind::Expected("}"))),
                _ => {}
            }
        }
    }

    /// Skip a `( ... )` group, parentheses balanced.
    pub(crate) fn skip_parens(&mut self) -> EvalResult<()> {
        self.expect(TokenKind::LParen)?;
        self.scan_to(TokenKind::RParen)
    }

    /// Advance past the next `stop` outside any parentheses.
    pub(crate) fn scan_to(&mut self, stop: TokenKind) -> EvalResult<()> {
        let mut depth = 0usize;
        loop {
            let token = self.next();
            match token.kind {
                kind if kind == stop && depth == 0 => return Ok(()),
                TokenKind::LParen => depth += 1,
                TokenKind::RParen if depth > 0 => depth -= 1,
                TokenKind::Eof => return Err(self.error(EvalErrorKind::Expected(stop.spelling()))),
                _ => {}
            }
        }
    }

    /// Skip a simple statement: up to and including its `;`, or up to a line
    /// end in loose mode, or up to an enclosing `}`.
    pub(crate) fn skip_simple(&mut self) -> EvalResult<()> {
        let loose = self.loose();
        let mut depth = 0usize;
        let mut seen = false;
        loop {
            let kind = self.ctx.token(self.pc).kind;
            match kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Eol if depth == 0 && loose && seen => return Ok(()),
                TokenKind::Semicolon if depth == 0 => {
                    self.tok_pc = self.pc;
                    self.pc += 1;
                    return Ok(());
                }
                TokenKind::LBrace | TokenKind::RBrace if depth == 0 => return Ok(()),
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                _ => {}
            }
            if kind != TokenKind::Eol {
                seen = true;
                self.tok_pc = self.pc;
            }
            self.pc += 1;
        }
    }

    /// Skip the right operand of a short-circuited `&&` or `||`.
    ///
    /// Stops, without consuming, at any token in `stops` or at a token that
    /// closes the enclosing expression.
    pub(crate) fn skip_operand(&mut self, stops: &[TokenKind]) -> EvalResult<()> {
        let loose = self.loose();
        let mut depth = 0usize;
        let mut seen = false;
        loop {
            let kind = self.ctx.token(self.pc).kind;
            if depth == 0 {
                let closes = matches!(
                    kind,
                    TokenKind::RParen
                        | TokenKind::RBracket
                        | TokenKind::Comma
                        | TokenKind::Semicolon
                        | TokenKind::RBrace
                        | TokenKind::Eof
                );
                if closes || stops.contains(&kind) || (kind == TokenKind::Eol && loose && seen) {
                    return Ok(());
                }
            }
            match kind {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth -= 1,
                TokenKind::Eof => return Err(self.error(EvalErrorKind::Expected(")"))),
                _ => {}
            }
            if kind != TokenKind::Eol {
                seen = true;
            }
            self.pc += 1;
        }
    }
}
