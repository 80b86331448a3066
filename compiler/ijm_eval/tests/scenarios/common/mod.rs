//! Shared helpers for scenario tests.

use ijm_eval::{Diagnostic, EvalConfig, HeadlessHost, Interpreter, RunError};

/// Run `source` with `config` on a fresh buffered host.
pub fn run_with(config: EvalConfig, source: &str) -> (Result<(), RunError>, HeadlessHost) {
    run_on(HeadlessHost::buffered(), config, source)
}

/// Run `source` on `host` with `config`.
pub fn run_on(
    host: HeadlessHost,
    config: EvalConfig,
    source: &str,
) -> (Result<(), RunError>, HeadlessHost) {
    let mut interpreter = Interpreter::builder(host).config(config).seed(7).build();
    let result = interpreter.run_source(source);
    (result, interpreter.into_host())
}

/// Log output of a run that must succeed.
pub fn output(source: &str) -> String {
    output_with(EvalConfig::default(), source)
}

pub fn output_with(config: EvalConfig, source: &str) -> String {
    let (result, host) = run_with(config, source);
    if let Err(error) = result {
        panic!("run failed: {error}\nlog:\n{}", host.log_text());
    }
    host.log_text()
}

/// The diagnostic of a run that must fail.
pub fn diagnostic(source: &str) -> Diagnostic {
    diagnostic_with(EvalConfig::default(), source)
}

pub fn diagnostic_with(config: EvalConfig, source: &str) -> Diagnostic {
    let (result, host) = run_with(config, source);
    let error = result.expect_err("run should fail");
    let diagnostic = error
        .diagnostic()
        .cloned()
        .unwrap_or_else(|| panic!("expected a diagnostic, got {error:?}"));
    assert_eq!(
        host.errors(),
        &[diagnostic.to_string()],
        "exactly one diagnostic reaches the host"
    );
    diagnostic
}

/// Message of the diagnostic of a run that must fail.
pub fn error_message(source: &str) -> String {
    diagnostic(source).kind.to_string()
}

pub fn loose() -> EvalConfig {
    EvalConfig {
        loose_syntax: true,
        ..EvalConfig::default()
    }
}
