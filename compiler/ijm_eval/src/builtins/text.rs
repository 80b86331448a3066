//! Builtins producing text.

use ijm_ir::{TextOp, TokenKind};

use crate::context::Frame;
use crate::errors::{EvalErrorKind, EvalResult};
use crate::host::Host;
use crate::interpreter::Interpreter;
use crate::value::{d2s, n2s};

impl<H: Host> Interpreter<H> {
    pub(crate) fn text_builtin(&mut self, op: TextOp, frame: &Frame) -> EvalResult<String> {
        match op {
            TextOp::GetTitle => {
                self.optional_parens()?;
                let image = self.active_image()?;
                let info = self.host.image_info(image);
                Ok(self.checked(info)?.title)
            }
            TextOp::GetString => {
                let (prompt, default) = self.two_texts(frame)?;
                let answer = self.host.get_string(&prompt, &default);
                self.checked(answer)
            }
            TextOp::D2s => {
                let [n, decimals] = self.numbers::<2>(frame)?;
                Ok(d2s(n, decimals as i32))
            }
            TextOp::ToString => {
                self.expect(TokenKind::LParen)?;
                let n = self.number_arg(frame)?;
                let text = if self.more_args() {
                    let decimals = self.number_arg(frame)?;
                    d2s(n, decimals as i32)
                } else {
                    n2s(n)
                };
                self.expect(TokenKind::RParen)?;
                Ok(text)
            }
            TextOp::Substring => {
                self.expect(TokenKind::LParen)?;
                let text = self.text_arg(frame)?;
                self.expect(TokenKind::Comma)?;
                let start = self.number_arg(frame)?;
                let len = text.chars().count();
                let end = if self.more_args() {
                    self.number_arg(frame)?
                } else {
                    len as f64
                };
                self.expect(TokenKind::RParen)?;
                let (start, end) = (start as i64, end as i64);
                if start < 0 || start > end {
                    return Err(self.error(EvalErrorKind::IndexOutOfRange { index: start, len }));
                }
                if end > len as i64 {
                    return Err(self.error(EvalErrorKind::IndexOutOfRange { index: end, len }));
                }
                Ok(text
                    .chars()
                    .skip(start as usize)
                    .take((end - start) as usize)
                    .collect())
            }
            TextOp::ToUpperCase => Ok(self.one_text(frame)?.to_uppercase()),
            TextOp::ToLowerCase => Ok(self.one_text(frame)?.to_lowercase()),
            TextOp::FromCharCode => {
                let codes = self.variadic(frame)?;
                let mut text = String::with_capacity(codes.len());
                for code in &codes {
                    let code = self.number(code)?;
                    match char::from_u32(code as u32) {
                        Some(c) if code >= 0.0 => text.push(c),
                        _ => return Err(self.error(EvalErrorKind::Invalid("character code"))),
                    }
                }
                Ok(text)
            }
            TextOp::GetArgument => {
                self.optional_parens()?;
                Ok(self.host.argument())
            }
            TextOp::Replace => {
                self.expect(TokenKind::LParen)?;
                let text = self.text_arg(frame)?;
                self.expect(TokenKind::Comma)?;
                let old = self.text_arg(frame)?;
                self.expect(TokenKind::Comma)?;
                let new = self.text_arg(frame)?;
                self.expect(TokenKind::RParen)?;
                if old.is_empty() {
                    return Ok(text);
                }
                Ok(text.replace(&old, &new))
            }
            TextOp::FileOpenAsString => {
                let path = self.one_text(frame)?;
                let contents = self.host.read_file(&path);
                self.checked(contents)
            }
        }
    }
}
