//! Builtins producing a number.

use std::time::{SystemTime, UNIX_EPOCH};

use ijm_ir::{NumericOp, TokenKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::context::Frame;
use crate::errors::{EvalErrorKind, EvalResult};
use crate::host::Host;
use crate::interpreter::Interpreter;
use crate::value::{parse_number, Value};

impl<H: Host> Interpreter<H> {
    pub(crate) fn numeric_builtin(&mut self, op: NumericOp, frame: &Frame) -> EvalResult<f64> {
        match op {
            NumericOp::GetPixel => {
                let [x, y] = self.numbers::<2>(frame)?;
                let image = self.active_image()?;
                let pixel = self.host.get_pixel(image, x, y);
                self.checked(pixel)
            }
            NumericOp::GetWidth | NumericOp::GetHeight => {
                self.optional_parens()?;
                let image = self.active_image()?;
                let info = self.host.image_info(image);
                let info = self.checked(info)?;
                Ok(if op == NumericOp::GetWidth {
                    info.width as f64
                } else {
                    info.height as f64
                })
            }
            NumericOp::GetImageId => {
                self.optional_parens()?;
                Ok(self.active_image()?.0 as f64)
            }
            NumericOp::NImages => {
                self.optional_parens()?;
                Ok(self.host.image_count() as f64)
            }
            NumericOp::NResults => {
                self.optional_parens()?;
                Ok(self.host.result_count() as f64)
            }
            NumericOp::GetResult => {
                self.expect(TokenKind::LParen)?;
                let column = self.text_arg(frame)?;
                self.expect(TokenKind::Comma)?;
                let row = self.number_arg(frame)?;
                self.expect(TokenKind::RParen)?;
                if row < 0.0 || row.is_nan() {
                    return Err(self.error(EvalErrorKind::Invalid("row")));
                }
                let result = self.host.get_result(&column, row as usize);
                self.checked(result)
            }
            NumericOp::GetNumber => {
                self.expect(TokenKind::LParen)?;
                let prompt = self.text_arg(frame)?;
                self.expect(TokenKind::Comma)?;
                let default = self.number_arg(frame)?;
                self.expect(TokenKind::RParen)?;
                let answer = self.host.get_number(&prompt, default);
                self.checked(answer)
            }
            NumericOp::GetBoolean => {
                let prompt = self.one_text(frame)?;
                let answer = self.host.get_boolean(&prompt);
                Ok(if self.checked(answer)? { 1.0 } else { 0.0 })
            }
            NumericOp::Random => self.random(frame),
            NumericOp::Sin => Ok(self.one_number(frame)?.sin()),
            NumericOp::Cos => Ok(self.one_number(frame)?.cos()),
            NumericOp::Tan => Ok(self.one_number(frame)?.tan()),
            NumericOp::Sqrt => Ok(self.one_number(frame)?.sqrt()),
            NumericOp::Abs => Ok(self.one_number(frame)?.abs()),
            NumericOp::Floor => Ok(self.one_number(frame)?.floor()),
            NumericOp::Round => Ok((self.one_number(frame)? + 0.5).floor()),
            NumericOp::Log => Ok(self.one_number(frame)?.ln()),
            NumericOp::Exp => Ok(self.one_number(frame)?.exp()),
            NumericOp::Atan => Ok(self.one_number(frame)?.atan()),
            NumericOp::IsNaN => Ok(if self.one_number(frame)?.is_nan() { 1.0 } else { 0.0 }),
            NumericOp::Pow => {
                let [base, exponent] = self.numbers::<2>(frame)?;
                Ok(base.powf(exponent))
            }
            NumericOp::Atan2 => {
                let [y, x] = self.numbers::<2>(frame)?;
                Ok(y.atan2(x))
            }
            NumericOp::MinOf => {
                let [a, b] = self.numbers::<2>(frame)?;
                Ok(a.min(b))
            }
            NumericOp::MaxOf => {
                let [a, b] = self.numbers::<2>(frame)?;
                Ok(a.max(b))
            }
            NumericOp::ParseInt => {
                self.expect(TokenKind::LParen)?;
                let text = self.text_arg(frame)?;
                let radix = if self.more_args() {
                    self.number_arg(frame)?
                } else {
                    10.0
                };
                self.expect(TokenKind::RParen)?;
                if !(2.0..=36.0).contains(&radix) {
                    return Err(self.error(EvalErrorKind::Invalid("radix")));
                }
                Ok(i64::from_str_radix(text.trim(), radix as u32).map_or(f64::NAN, |n| n as f64))
            }
            NumericOp::ParseFloat => Ok(parse_number(&self.one_text(frame)?)),
            NumericOp::LengthOf => {
                self.expect(TokenKind::LParen)?;
                let value = self.expression(frame)?;
                self.expect(TokenKind::RParen)?;
                let length = match value {
                    Value::Array(items) => items.len(),
                    other => other.as_text().chars().count(),
                };
                Ok(length as f64)
            }
            NumericOp::IndexOf => {
                self.expect(TokenKind::LParen)?;
                let text = self.text_arg(frame)?;
                self.expect(TokenKind::Comma)?;
                let needle = self.text_arg(frame)?;
                let from = if self.more_args() {
                    self.number_arg(frame)?.max(0.0) as usize
                } else {
                    0
                };
                self.expect(TokenKind::RParen)?;
                Ok(char_index_of(&text, &needle, from).map_or(-1.0, |i| i as f64))
            }
            NumericOp::StartsWith => {
                let (text, prefix) = self.two_texts(frame)?;
                Ok(if text.starts_with(&prefix) { 1.0 } else { 0.0 })
            }
            NumericOp::EndsWith => {
                let (text, suffix) = self.two_texts(frame)?;
                Ok(if text.ends_with(&suffix) { 1.0 } else { 0.0 })
            }
            NumericOp::GetTime => {
                self.optional_parens()?;
                let millis = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map_or(0, |elapsed| elapsed.as_millis());
                Ok(millis as f64)
            }
            NumericOp::Pi => Ok(std::f64::consts::PI),
            NumericOp::NaN => Ok(f64::NAN),
            NumericOp::FileExists => {
                let path = self.one_text(frame)?;
                Ok(if self.host.file_exists(&path) { 1.0 } else { 0.0 })
            }
        }
    }

    /// `random`, `random()`, `random("seed", s)` or `random("gaussian")`.
    fn random(&mut self, frame: &Frame) -> EvalResult<f64> {
        if self.peek().kind != TokenKind::LParen {
            return Ok(self.rng.gen::<f64>());
        }
        self.next();
        if self.peek().kind == TokenKind::RParen {
            self.next();
            return Ok(self.rng.gen::<f64>());
        }
        let option = self.text_arg(frame)?;
        match option.to_ascii_lowercase().as_str() {
            "seed" => {
                self.expect(TokenKind::Comma)?;
                let seed = self.number_arg(frame)?;
                self.expect(TokenKind::RParen)?;
                self.rng = StdRng::seed_from_u64(seed as u64);
                Ok(f64::NAN)
            }
            "gaussian" => {
                self.expect(TokenKind::RParen)?;
                Ok(self.rng.sample(StandardNormal))
            }
            _ => Err(self.error(EvalErrorKind::Invalid("random option"))),
        }
    }
}

/// Character index of `needle` in `text`, searching from character `from`.
pub(crate) fn char_index_of(text: &str, needle: &str, from: usize) -> Option<usize> {
    let start = text.char_indices().nth(from).map(|(byte, _)| byte)?;
    let found = text[start..].find(needle)? + start;
    Some(text[..found].chars().count())
}
