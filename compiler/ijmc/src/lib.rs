//! Command-line driver for the ijm macro engine.
//!
//! The `ijm` binary is a thin dispatcher over this library:
//! - `options`: flag parsing for `run`
//! - `cache`: the compiled-program (`.ijmc`) format
//! - `commands`: one handler per subcommand
//!
//! Library crates never install a tracing subscriber; [`init_tracing`] is
//! called once by the binary.

pub mod cache;
pub mod commands;
pub mod options;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG`; without it only warnings are shown, or
/// per-line trace events when `trace` is set. With `IJM_LOG_TREE` set, spans
/// render as an indented tree instead of flat lines.
pub fn init_tracing(trace: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let default = if trace { "warn,ijm_eval=info" } else { "warn" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        if std::env::var_os("IJM_LOG_TREE").is_some() {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}
