//! User function calls.
//!
//! Arguments are evaluated in the caller's frame and pushed as unbound
//! cells; the callee's parameter names are then attached to them, so the
//! arguments become the first locals of the callee's frame. Everything the
//! call pushed is released when it returns.

use ijm_ir::{Token, TokenKind};
use smallvec::SmallVec;

use super::{Flow, Interpreter};
use crate::context::{Cell, Frame};
use crate::errors::{EvalErrorKind, EvalResult};
use crate::host::Host;
use crate::stack::ensure_sufficient_stack;
use crate::value::Value;

impl<H: Host> Interpreter<H> {
    /// Call the user function named by `token`, whose `(` comes next.
    ///
    /// Returns the value given to `return`, or `None` when the body ended
    /// without one.
    #[tracing::instrument(level = "debug", skip_all, fields(pc = self.tok_pc))]
    pub(crate) fn call_user(&mut self, token: Token, frame: &Frame) -> EvalResult<Option<Value>> {
        let call_pc = self.tok_pc;
        let name = self.symbol(token)?;
        let Some(function) = self.entries.function(name).cloned() else {
            return Err(self.error(EvalErrorKind::UndefinedFunction));
        };

        self.expect(TokenKind::LParen)?;
        let mut args: SmallVec<[Value; 8]> = SmallVec::new();
        if self.peek().kind != TokenKind::RParen {
            loop {
                if args.len() == self.config.max_args {
                    self.next();
                    return Err(self.error(EvalErrorKind::TooManyArguments));
                }
                args.push(self.expression(frame)?);
                if self.peek().kind != TokenKind::Comma {
                    break;
                }
                self.next();
            }
        }
        self.expect(TokenKind::RParen)?;
        if args.len() != function.params.len() {
            self.tok_pc = call_pc;
            return Err(self.error(EvalErrorKind::ArgumentCount {
                expected: function.params.len(),
            }));
        }

        let saved_len = self.ctx.len();
        let return_pc = self.pc;
        for value in args {
            self.push_cell(Cell::unbound(value))?;
        }
        for (offset, &param) in function.params.iter().enumerate() {
            self.ctx.cell_mut(saved_len + offset).symbol = Some(param);
        }

        let callee = Frame {
            base: saved_len,
            globals_end: self.ctx.globals_end(),
        };
        let saved_depths = (self.loop_depth, self.strict_depth);
        self.loop_depth = 0;
        self.strict_depth = 0;
        self.body_depth += 1;
        self.pc = function.body_pc;
        let flow = ensure_sufficient_stack(|| {
            self.expect(TokenKind::LBrace)?;
            self.block(&callee)
        });
        self.body_depth -= 1;
        (self.loop_depth, self.strict_depth) = saved_depths;
        let flow = flow?;

        self.ctx.trim(saved_len);
        self.pc = return_pc;
        Ok(match flow {
            Flow::Returned(value) => value,
            _ => None,
        })
    }
}
