//! Builtin dispatch.
//!
//! Each builtin parses its own argument list straight from the token stream,
//! so the helpers here read `(`, argument expressions, commas and `)` in the
//! interpreter's current position. One submodule per opcode range:
//!
//! - `void`: statements (`print`, `setPixel`, `newImage`, ...)
//! - `numeric`: functions producing a number
//! - `text`: functions producing text
//! - `array`: functions producing an array

mod array;
mod numeric;
mod text;
mod void;


use ijm_ir::{Builtin, Token, TokenKind};
use smallvec::SmallVec;

use crate::context::Frame;
use crate::errors::{EvalErrorKind, EvalResult};
use crate::host::{Host, ImageId};
use crate::interpreter::Interpreter;
use crate::value::{n2s, Value};

/// Arguments of a variadic builtin.
pub(crate) type Args = SmallVec<[Value; 8]>;

impl<H: Host> Interpreter<H> {
    /// The builtin a `*Fn` token refers to.
    pub(crate) fn builtin_of(&mut self, token: Token) -> EvalResult<Builtin> {
        let builtin = self
            .ctx
            .program()
            .symbol_of(token)
            .and_then(|symbol| symbol.builtin());
        match builtin {
            Some(builtin) => Ok(builtin),
            None => Err(self.error(EvalErrorKind::UndefinedIdentifier)),
        }
    }

    // Single arguments at the current position

    fn number_arg(&mut self, frame: &Frame) -> EvalResult<f64> {
        let value = self.expression(frame)?;
        self.number(&value)
    }

    fn text_arg(&mut self, frame: &Frame) -> EvalResult<String> {
        match self.expression(frame)? {
            Value::Text(text) => Ok(text),
            Value::Number(n) => Ok(n2s(n)),
            Value::Array(_) => Err(self.error(EvalErrorKind::StringExpected)),
        }
    }

    fn array_arg(&mut self, frame: &Frame) -> EvalResult<Vec<Value>> {
        match self.expression(frame)? {
            Value::Array(items) => Ok(items),
            _ => Err(self.error(EvalErrorKind::ArrayExpected)),
        }
    }

    // Whole argument lists

    /// `(n1, ..., nN)`
    fn numbers<const N: usize>(&mut self, frame: &Frame) -> EvalResult<[f64; N]> {
        self.expect(TokenKind::LParen)?;
        let mut out = [0.0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            if i > 0 {
                self.expect(TokenKind::Comma)?;
            }
            *slot = self.number_arg(frame)?;
        }
        self.expect(TokenKind::RParen)?;
        Ok(out)
    }

    /// `(n)`
    fn one_number(&mut self, frame: &Frame) -> EvalResult<f64> {
        let [n] = self.numbers::<1>(frame)?;
        Ok(n)
    }

    /// `(text)`
    fn one_text(&mut self, frame: &Frame) -> EvalResult<String> {
        self.expect(TokenKind::LParen)?;
        let text = self.text_arg(frame)?;
        self.expect(TokenKind::RParen)?;
        Ok(text)
    }

    /// `(a, b)` of two texts.
    fn two_texts(&mut self, frame: &Frame) -> EvalResult<(String, String)> {
        self.expect(TokenKind::LParen)?;
        let a = self.text_arg(frame)?;
        self.expect(TokenKind::Comma)?;
        let b = self.text_arg(frame)?;
        self.expect(TokenKind::RParen)?;
        Ok((a, b))
    }

    /// `( [arg {, arg}] )`
    fn variadic(&mut self, frame: &Frame) -> EvalResult<Args> {
        self.expect(TokenKind::LParen)?;
        let mut args = Args::new();
        if self.peek().kind != TokenKind::RParen {
            loop {
                args.push(self.expression(frame)?);
                if !self.more_args() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    /// Consume a `,` if one follows.
    fn more_args(&mut self) -> bool {
        if self.peek().kind == TokenKind::Comma {
            self.next();
            true
        } else {
            false
        }
    }

    /// Optional `()` after a builtin that takes no arguments.
    fn optional_parens(&mut self) -> EvalResult<()> {
        if self.peek().kind == TokenKind::LParen {
            self.next();
            self.expect(TokenKind::RParen)?;
        }
        Ok(())
    }

    /// Length of a new `n`-element array. Negative, NaN and oversized
    /// requests fail with "Invalid array size".
    fn array_len(&mut self, n: f64) -> EvalResult<usize> {
        if n >= 0.0 && n <= self.config.max_array_len as f64 {
            Ok(n as usize)
        } else {
            Err(self.error(EvalErrorKind::Invalid("array size")))
        }
    }

    // Active image

    /// The active image, asking the host only when the memo is empty.
    pub(crate) fn active_image(&mut self) -> EvalResult<ImageId> {
        if let Some(id) = self.image {
            return Ok(id);
        }
        let current = self.host.current_image();
        let id = self.checked(current)?;
        self.image = Some(id);
        Ok(id)
    }

    /// Forget the memoized image after a builtin that may change it.
    fn invalidate_image(&mut self) {
        self.image = None;
    }
}
