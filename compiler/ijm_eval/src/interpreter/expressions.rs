//! Expression evaluation by recursive descent over the token stream.
//!
//! Precedence, loosest first:
//!
//! | level        | operators                         |
//! |--------------|-----------------------------------|
//! | logical or   | `\|\|`                            |
//! | logical and  | `&&`                              |
//! | comparison   | `== != < <= > >=`                 |
//! | additive     | `+ -`                             |
//! | term         | `* / % & \| ^ << >>`              |
//! | factor       | literals, variables, calls, unary |
//!
//! `&&` and `||` skip their right operand when the left decides the result.

use ijm_ir::{Builtin, SymbolId, Token, TokenKind};

use super::Interpreter;
use crate::context::Frame;
use crate::errors::{EvalErrorKind, EvalResult};
use crate::host::Host;
use crate::value::Value;

impl<H: Host> Interpreter<H> {
    pub(crate) fn expression(&mut self, frame: &Frame) -> EvalResult<Value> {
        self.logical_or(frame)
    }

    fn logical_or(&mut self, frame: &Frame) -> EvalResult<Value> {
        let mut left = self.logical_and(frame)?;
        while self.peek().kind == TokenKind::OrOr {
            self.next();
            if self.boolean(&left)? {
                self.skip_operand(&[TokenKind::OrOr])?;
                left = Value::boolean(true);
            } else {
                let right = self.logical_and(frame)?;
                left = Value::boolean(self.boolean(&right)?);
            }
        }
        Ok(left)
    }

    fn logical_and(&mut self, frame: &Frame) -> EvalResult<Value> {
        let mut left = self.comparison(frame)?;
        while self.peek().kind == TokenKind::AndAnd {
            self.next();
            if self.boolean(&left)? {
                let right = self.comparison(frame)?;
                left = Value::boolean(self.boolean(&right)?);
            } else {
                self.skip_operand(&[TokenKind::AndAnd, TokenKind::OrOr])?;
                left = Value::boolean(false);
            }
        }
        Ok(left)
    }

    /// Comparisons are textual when either side is text, numeric otherwise.
    fn comparison(&mut self, frame: &Frame) -> EvalResult<Value> {
        let mut left = self.additive(frame)?;
        loop {
            let op = self.peek().kind;
            if !matches!(
                op,
                TokenKind::EqEq
                    | TokenKind::NotEq
                    | TokenKind::Lt
                    | TokenKind::LtEq
                    | TokenKind::Gt
                    | TokenKind::GtEq
            ) {
                return Ok(left);
            }
            self.next();
            let right = self.additive(frame)?;
            let ordering = if left.is_text() || right.is_text() {
                Some(left.as_text().cmp(&right.as_text()))
            } else {
                let a = self.number(&left)?;
                let b = self.number(&right)?;
                a.partial_cmp(&b)
            };
            let result = match ordering {
                Some(ordering) => match op {
                    TokenKind::EqEq => ordering.is_eq(),
                    TokenKind::NotEq => ordering.is_ne(),
                    TokenKind::Lt => ordering.is_lt(),
                    TokenKind::LtEq => ordering.is_le(),
                    TokenKind::Gt => ordering.is_gt(),
                    _ => ordering.is_ge(),
                },
                // NaN is unequal to everything, itself included.
                None => op == TokenKind::NotEq,
            };
            left = Value::boolean(result);
        }
    }

    /// `+` concatenates when either side is text.
    fn additive(&mut self, frame: &Frame) -> EvalResult<Value> {
        let mut left = self.term(frame)?;
        loop {
            match self.peek().kind {
                TokenKind::Plus => {
                    self.next();
                    let right = self.term(frame)?;
                    left = if left.is_text() || right.is_text() {
                        Value::Text(left.as_text() + &right.as_text())
                    } else {
                        Value::Number(self.number(&left)? + self.number(&right)?)
                    };
                }
                TokenKind::Minus => {
                    self.next();
                    let right = self.term(frame)?;
                    left = Value::Number(self.number(&left)? - self.number(&right)?);
                }
                _ => return Ok(left),
            }
        }
    }

    fn term(&mut self, frame: &Frame) -> EvalResult<Value> {
        let mut left = self.factor(frame)?;
        loop {
            let op = self.peek().kind;
            if !matches!(
                op,
                TokenKind::Star
                    | TokenKind::Slash
                    | TokenKind::Percent
                    | TokenKind::Amp
                    | TokenKind::Pipe
                    | TokenKind::Caret
                    | TokenKind::Shl
                    | TokenKind::Shr
            ) {
                return Ok(left);
            }
            self.next();
            let right = self.factor(frame)?;
            let a = self.number(&left)?;
            let b = self.number(&right)?;
            let result = match op {
                TokenKind::Star => a * b,
                TokenKind::Slash => a / b,
                TokenKind::Percent => a % b,
                TokenKind::Amp => ((a as i64) & (b as i64)) as f64,
                TokenKind::Pipe => ((a as i64) | (b as i64)) as f64,
                TokenKind::Caret => ((a as i64) ^ (b as i64)) as f64,
                TokenKind::Shl => (a as i64).wrapping_shl(b as u32) as f64,
                _ => (a as i64).wrapping_shr(b as u32) as f64,
            };
            left = Value::Number(result);
        }
    }

    fn factor(&mut self, frame: &Frame) -> EvalResult<Value> {
        let token = self.next();
        match token.kind {
            TokenKind::Number => {
                let value = self
                    .ctx
                    .program()
                    .symbol_of(token)
                    .and_then(|symbol| symbol.number())
                    .unwrap_or(f64::NAN);
                Ok(Value::Number(value))
            }
            TokenKind::Str => {
                let text = self
                    .ctx
                    .program()
                    .symbol_of(token)
                    .map(|symbol| symbol.name.clone())
                    .unwrap_or_default();
                Ok(Value::Text(text))
            }
            TokenKind::True => Ok(Value::boolean(true)),
            TokenKind::False => Ok(Value::boolean(false)),
            TokenKind::LParen => {
                let value = self.expression(frame)?;
                self.expect(TokenKind::RParen)?;
                Ok(value)
            }
            TokenKind::Minus => {
                let value = self.factor(frame)?;
                Ok(Value::Number(-self.number(&value)?))
            }
            TokenKind::Plus => {
                let value = self.factor(frame)?;
                Ok(Value::Number(self.number(&value)?))
            }
            TokenKind::Bang => {
                let value = self.factor(frame)?;
                Ok(Value::boolean(!self.boolean(&value)?))
            }
            TokenKind::Tilde => {
                let value = self.factor(frame)?;
                Ok(Value::Number(!(self.number(&value)? as i64) as f64))
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let delta = if token.kind == TokenKind::PlusPlus { 1.0 } else { -1.0 };
                let target = self.next();
                if target.kind != TokenKind::Word {
                    return Err(self.error(EvalErrorKind::VariableExpected));
                }
                let symbol = self.symbol(target)?;
                let old = self.increment(symbol, delta, frame)?;
                Ok(Value::Number(old + delta))
            }
            TokenKind::Word => self.variable_value(token, frame),
            TokenKind::UserFn => {
                let at = self.tok_pc;
                match self.call_user(token, frame)? {
                    Some(value) => Ok(value),
                    None => {
                        self.tok_pc = at;
                        Err(self.error(EvalErrorKind::NoReturnValue))
                    }
                }
            }
            TokenKind::NumericFn | TokenKind::TextFn | TokenKind::ArrayFn => {
                match self.builtin_of(token)? {
                    Builtin::Numeric(op) => self.numeric_builtin(op, frame).map(Value::Number),
                    Builtin::Text(op) => self.text_builtin(op, frame).map(Value::Text),
                    Builtin::Array(op) => self.array_builtin(op, frame).map(Value::Array),
                    Builtin::Void(_) => Err(self.error(EvalErrorKind::ValueExpected)),
                }
            }
            _ => Err(self.error(EvalErrorKind::ValueExpected)),
        }
    }

    /// A variable reference: plain, indexed, `.length`, or post-incremented.
    fn variable_value(&mut self, token: Token, frame: &Frame) -> EvalResult<Value> {
        let symbol = self.symbol(token)?;
        let Some(slot) = self.ctx.lookup(symbol, frame) else {
            let kind = if self.peek().kind == TokenKind::LParen {
                EvalErrorKind::UndefinedIdentifier
            } else {
                EvalErrorKind::UndefinedVariable
            };
            return Err(self.error(kind));
        };

        match self.peek().kind {
            TokenKind::LBracket => {
                self.next();
                let index = self.index(frame)?;
                self.expect(TokenKind::RBracket)?;
                let element = self.element(slot, index)?;
                let kind = self.peek().kind;
                if matches!(kind, TokenKind::PlusPlus | TokenKind::MinusMinus) {
                    self.next();
                    let old = self.number(&element)?;
                    let delta = if kind == TokenKind::PlusPlus { 1.0 } else { -1.0 };
                    self.store_slot_element(slot, index, Value::Number(old + delta))?;
                    return Ok(Value::Number(old));
                }
                Ok(element)
            }
            TokenKind::Dot => {
                self.next();
                let property = self.next();
                let is_length = property.kind == TokenKind::Word
                    && property
                        .symbol
                        .is_some_and(|id| self.ctx.symbol_name(id) == "length");
                if !is_length {
                    return Err(self.error(EvalErrorKind::Invalid("property")));
                }
                let length = match &self.ctx.cell(slot).value {
                    Value::Array(items) => Some(items.len()),
                    Value::Text(text) => Some(text.chars().count()),
                    Value::Number(_) => None,
                };
                match length {
                    Some(length) => Ok(Value::Number(length as f64)),
                    None => Err(self.error(EvalErrorKind::ArrayExpected)),
                }
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let delta = if self.next().kind == TokenKind::PlusPlus { 1.0 } else { -1.0 };
                Ok(Value::Number(self.increment_slot(slot, delta)?))
            }
            _ => Ok(self.ctx.cell(slot).value.clone()),
        }
    }

    /// An array index: the expression's value truncated to an integer.
    pub(crate) fn index(&mut self, frame: &Frame) -> EvalResult<i64> {
        let value = self.expression(frame)?;
        let n = self.number(&value)?;
        if n.is_nan() {
            return Err(self.error(EvalErrorKind::Invalid("index")));
        }
        Ok(n as i64)
    }

    /// Copy of element `index` of the array in `slot`.
    pub(crate) fn element(&mut self, slot: usize, index: i64) -> EvalResult<Value> {
        let outcome = match &self.ctx.cell(slot).value {
            Value::Array(items) => usize::try_from(index)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .ok_or(EvalErrorKind::IndexOutOfRange {
                    index,
                    len: items.len(),
                }),
            _ => Err(EvalErrorKind::ArrayExpected),
        };
        outcome.map_err(|kind| self.error(kind))
    }

    pub(crate) fn load_element(
        &mut self,
        symbol: SymbolId,
        index: i64,
        frame: &Frame,
    ) -> EvalResult<Value> {
        let slot = self.existing(symbol, frame)?;
        self.element(slot, index)
    }

    pub(crate) fn store_element(
        &mut self,
        symbol: SymbolId,
        index: i64,
        value: Value,
        frame: &Frame,
    ) -> EvalResult<()> {
        let slot = self.existing(symbol, frame)?;
        self.store_slot_element(slot, index, value)
    }

    /// Write element `index` of the array in `slot`, growing the array when
    /// expandable arrays are enabled.
    fn store_slot_element(&mut self, slot: usize, index: i64, value: Value) -> EvalResult<()> {
        let expandable = self.config.expandable_arrays;
        let max_len = self.config.max_array_len;
        let outcome = match &mut self.ctx.cell_mut(slot).value {
            Value::Array(items) => {
                let len = items.len();
                match usize::try_from(index) {
                    Ok(i) if i < len => {
                        items[i] = value;
                        Ok(())
                    }
                    Ok(i) if expandable && i < max_len => {
                        items.resize(i + 1, Value::Number(0.0));
                        items[i] = value;
                        Ok(())
                    }
                    Ok(_) if expandable => Err(EvalErrorKind::Invalid("array size")),
                    _ => Err(EvalErrorKind::IndexOutOfRange { index, len }),
                }
            }
            _ => Err(EvalErrorKind::ArrayExpected),
        };
        outcome.map_err(|kind| self.error(kind))
    }
}
