//! Builtins valid only in statement position.

use ijm_ir::{Builtin, Token, TokenKind, VoidOp};

use crate::context::Frame;
use crate::errors::{EvalErrorKind, EvalResult, Interrupt};
use crate::host::{Color, Host, ImageId, ImageRef, Roi};
use crate::interpreter::Interpreter;
use crate::value::Value;

impl<H: Host> Interpreter<H> {
    /// Execute the procedure named by `token`.
    pub(crate) fn void_builtin(&mut self, token: Token, frame: &Frame) -> EvalResult<()> {
        let Builtin::Void(op) = self.builtin_of(token)? else {
            let text = self.ctx.program().token_text(token).into_owned();
            return Err(self.error(EvalErrorKind::BadStatement(text)));
        };
        tracing::trace!(builtin = op.name(), "void builtin");

        match op {
            VoidOp::Print => {
                let args = self.variadic(frame)?;
                let line = args
                    .iter()
                    .map(Value::as_text)
                    .collect::<Vec<_>>()
                    .join(" ");
                self.host.log(&line);
            }
            VoidOp::Wait => {
                let millis = self.one_number(frame)?;
                self.host.wait(millis);
            }
            VoidOp::Exit => {
                let args = if self.peek().kind == TokenKind::LParen {
                    self.variadic(frame)?
                } else {
                    super::Args::new()
                };
                if let Some(message) = args.first() {
                    self.host.log(&message.as_text());
                }
                return Err(Interrupt::Exited);
            }
            VoidOp::SetPixel => {
                let [x, y, value] = self.numbers::<3>(frame)?;
                let image = self.active_image()?;
                let put = self.host.put_pixel(image, x as i64, y as i64, value);
                self.checked(put)?;
            }
            VoidOp::MakeRectangle | VoidOp::MakeOval => {
                let [x, y, width, height] = self.numbers::<4>(frame)?;
                let roi = if op == VoidOp::MakeRectangle {
                    Roi::Rectangle {
                        x,
                        y,
                        width,
                        height,
                    }
                } else {
                    Roi::Oval {
                        x,
                        y,
                        width,
                        height,
                    }
                };
                self.select(roi)?;
            }
            VoidOp::MakeLine => {
                let [x1, y1, x2, y2] = self.numbers::<4>(frame)?;
                self.select(Roi::Line { x1, y1, x2, y2 })?;
            }
            VoidOp::DrawLine => {
                let [x1, y1, x2, y2] = self.numbers::<4>(frame)?;
                let image = self.active_image()?;
                let drawn = self.host.draw_line(image, (x1, y1), (x2, y2));
                self.checked(drawn)?;
            }
            VoidOp::SetColor => {
                let args = self.variadic(frame)?;
                let color = match args.as_slice() {
                    [value] => Color::Value(self.number(value)?),
                    [r, g, b] => Color::Rgb(
                        channel(self.number(r)?),
                        channel(self.number(g)?),
                        channel(self.number(b)?),
                    ),
                    _ => return Err(self.error(EvalErrorKind::ArgumentCount { expected: 3 })),
                };
                self.host.set_color(color);
            }
            VoidOp::Fill => {
                self.optional_parens()?;
                let image = self.active_image()?;
                let filled = self.host.fill(image);
                self.checked(filled)?;
            }
            VoidOp::NewImage => {
                self.expect(TokenKind::LParen)?;
                let title = self.text_arg(frame)?;
                self.expect(TokenKind::Comma)?;
                let kind = self.text_arg(frame)?;
                self.expect(TokenKind::Comma)?;
                let width = self.number_arg(frame)?;
                self.expect(TokenKind::Comma)?;
                let height = self.number_arg(frame)?;
                // Optional depth (slice count); the host model is single-plane.
                if self.more_args() {
                    self.number_arg(frame)?;
                }
                self.expect(TokenKind::RParen)?;
                if width < 1.0 || height < 1.0 {
                    return Err(self.error(EvalErrorKind::Invalid("image size")));
                }
                self.invalidate_image();
                let created = self
                    .host
                    .new_image(&title, &kind, width as usize, height as usize);
                self.checked(created)?;
            }
            VoidOp::SelectImage => {
                self.expect(TokenKind::LParen)?;
                let target = match self.expression(frame)? {
                    Value::Number(n) => ImageRef::Id(ImageId(n as i64)),
                    Value::Text(title) => ImageRef::Title(title),
                    Value::Array(_) => return Err(self.error(EvalErrorKind::StringExpected)),
                };
                self.expect(TokenKind::RParen)?;
                self.invalidate_image();
                let selected = self.host.select_image(&target);
                self.checked(selected)?;
            }
            VoidOp::Close => {
                self.optional_parens()?;
                self.invalidate_image();
                let closed = self.host.close_image();
                self.checked(closed)?;
            }
            VoidOp::Run => {
                self.expect(TokenKind::LParen)?;
                let command = self.text_arg(frame)?;
                let options = if self.more_args() {
                    self.text_arg(frame)?
                } else {
                    String::new()
                };
                self.expect(TokenKind::RParen)?;
                self.invalidate_image();
                let ran = self.host.run_command(&command, &options);
                self.checked(ran)?;
            }
            VoidOp::ShowStatus => {
                let text = self.one_text(frame)?;
                self.host.show_status(&text);
            }
            VoidOp::ShowProgress => {
                self.expect(TokenKind::LParen)?;
                let mut fraction = self.number_arg(frame)?;
                if self.more_args() {
                    let total = self.number_arg(frame)?;
                    fraction /= total;
                }
                self.expect(TokenKind::RParen)?;
                if !(0.0..=1.0).contains(&fraction) {
                    tracing::warn!(fraction, "progress outside 0-1");
                }
                self.host.show_progress(fraction);
            }
            VoidOp::ShowMessage => {
                self.expect(TokenKind::LParen)?;
                let first = self.text_arg(frame)?;
                let (title, message) = if self.more_args() {
                    (first, self.text_arg(frame)?)
                } else {
                    ("Message".to_string(), first)
                };
                self.expect(TokenKind::RParen)?;
                let shown = self.host.show_message(&title, &message);
                self.checked(shown)?;
            }
            VoidOp::SetResult => {
                self.expect(TokenKind::LParen)?;
                let column = self.text_arg(frame)?;
                self.expect(TokenKind::Comma)?;
                let row = self.number_arg(frame)?;
                self.expect(TokenKind::Comma)?;
                let value = self.expression(frame)?;
                self.expect(TokenKind::RParen)?;
                if row < 0.0 || row.is_nan() {
                    return Err(self.error(EvalErrorKind::Invalid("row")));
                }
                let set = self.host.set_result(&column, row as usize, &value);
                self.checked(set)?;
            }
            VoidOp::UpdateResults => {
                self.optional_parens()?;
                self.host.update_results();
            }
            VoidOp::Dump => {
                self.optional_parens()?;
                let dump = format!(
                    "{}{}{}",
                    self.ctx.render_symbols(),
                    self.ctx.render_tokens(),
                    self.ctx.render_stack()
                );
                self.host.log(dump.trim_end());
            }
            VoidOp::FileSaveString => {
                let (text, path) = self.two_texts(frame)?;
                let written = self.host.write_file(&path, &text);
                self.checked(written)?;
            }
        }
        Ok(())
    }

    /// Set a selection on the active image.
    fn select(&mut self, roi: Roi) -> EvalResult<()> {
        let image = self.active_image()?;
        let set = self.host.set_selection(image, roi);
        self.checked(set)
    }
}

/// Clamp a colour component to a byte.
fn channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}
