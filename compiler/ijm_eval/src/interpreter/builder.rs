//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use ijm_ir::Program;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::entries::Entries;
use super::Interpreter;
use crate::cancel::CancelToken;
use crate::config::EvalConfig;
use crate::context::Context;
use crate::debugger::Debugger;
use crate::host::Host;

/// Builder for creating Interpreter instances.
///
/// Only the host is required. Defaults: [`EvalConfig::default`], a fresh
/// cancellation token, no debugger, an entropy-seeded random generator.
pub struct InterpreterBuilder<H: Host> {
    host: H,
    config: EvalConfig,
    cancel: Option<CancelToken>,
    debugger: Option<Box<dyn Debugger>>,
    seed: Option<u64>,
}

impl<H: Host> InterpreterBuilder<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            config: EvalConfig::default(),
            cancel: None,
            debugger: None,
            seed: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Share a cancellation token with another thread.
    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Attach a debugger; it is consulted before every statement.
    #[must_use]
    pub fn debugger(mut self, debugger: Box<dyn Debugger>) -> Self {
        self.debugger = Some(debugger);
        self
    }

    /// Seed the generator behind `random`, making runs reproducible.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Interpreter<H> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let ctx = Context::new(Program::new(), self.config.stack_capacity);
        Interpreter {
            host: self.host,
            config: self.config,
            cancel: self.cancel.unwrap_or_default(),
            debugger: self.debugger,
            ctx,
            pc: 0,
            tok_pc: 0,
            strict_depth: 0,
            loop_depth: 0,
            body_depth: 0,
            entries: Entries::default(),
            image: None,
            rng,
            failed: false,
            macro_ran: false,
        }
    }
}
