//! Builtins producing an array.
//!
//! Arrays are values: every builtin here returns a fresh array and never
//! modifies its argument.

use std::cmp::Ordering;

use ijm_ir::{ArrayOp, TokenKind};

use crate::context::Frame;
use crate::errors::{EvalErrorKind, EvalResult};
use crate::host::Host;
use crate::interpreter::Interpreter;
use crate::value::Value;

const DEFAULT_DELIMITERS: &str = " \t\n\r";

impl<H: Host> Interpreter<H> {
    pub(crate) fn array_builtin(&mut self, op: ArrayOp, frame: &Frame) -> EvalResult<Vec<Value>> {
        match op {
            ArrayOp::NewArray => {
                let args = self.variadic(frame)?;
                if let [Value::Number(n)] = args.as_slice() {
                    let len = self.array_len(*n)?;
                    return Ok(vec![Value::Number(0.0); len]);
                }
                Ok(args.into_vec())
            }
            ArrayOp::Split => {
                self.expect(TokenKind::LParen)?;
                let text = self.text_arg(frame)?;
                let delimiters = if self.more_args() {
                    self.text_arg(frame)?
                } else {
                    DEFAULT_DELIMITERS.to_string()
                };
                self.expect(TokenKind::RParen)?;
                Ok(split(&text, &delimiters))
            }
            ArrayOp::Copy => {
                self.expect(TokenKind::LParen)?;
                let items = self.array_arg(frame)?;
                self.expect(TokenKind::RParen)?;
                Ok(items)
            }
            ArrayOp::Concat => {
                let args = self.variadic(frame)?;
                let mut out = Vec::new();
                for arg in args {
                    match arg {
                        Value::Array(items) => out.extend(items),
                        scalar => out.push(scalar),
                    }
                }
                Ok(out)
            }
            ArrayOp::Sort => {
                self.expect(TokenKind::LParen)?;
                let items = self.array_arg(frame)?;
                self.expect(TokenKind::RParen)?;
                match sorted(items) {
                    Some(items) => Ok(items),
                    None => Err(self.error(EvalErrorKind::MixedArray)),
                }
            }
            ArrayOp::GetSequence => {
                let n = self.one_number(frame)?;
                let len = self.array_len(n)?;
                Ok((0..len).map(|i| Value::Number(i as f64)).collect())
            }
        }
    }
}

/// Split `text` at any of the characters in `delimiters`, dropping empty
/// pieces. An empty delimiter set splits into single characters.
pub(crate) fn split(text: &str, delimiters: &str) -> Vec<Value> {
    if delimiters.is_empty() {
        return text.chars().map(|c| Value::Text(c.to_string())).collect();
    }
    text.split(|c: char| delimiters.contains(c))
        .filter(|piece| !piece.is_empty())
        .map(|piece| Value::Text(piece.to_string()))
        .collect()
}

/// Sorted copy: numbers ascending (NaN last), text case-insensitively.
/// `None` when numbers and text are mixed or an element is an array.
pub(crate) fn sorted(mut items: Vec<Value>) -> Option<Vec<Value>> {
    if items.iter().all(|v| matches!(v, Value::Number(_))) {
        items.sort_by(|a, b| {
            let (x, y) = (a.as_number(), b.as_number());
            match (x.is_nan(), y.is_nan()) {
                (false, false) => x.total_cmp(&y),
                (false, true) => Ordering::Less,
                (true, false) => Ordering::Greater,
                (true, true) => Ordering::Equal,
            }
        });
        Some(items)
    } else if items.iter().all(Value::is_text) {
        items.sort_by_cached_key(|v| v.as_text().to_lowercase());
        Some(items)
    } else {
        None
    }
}
