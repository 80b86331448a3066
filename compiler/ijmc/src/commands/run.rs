//! The `run` command: execute macro files on the headless host.

use ijm_eval::{
    buffer_output, stdout_output, HeadlessHost, Interpreter, LineTracer, RunError, SharedOutput,
};
use rayon::prelude::*;

use super::{exit, load_program};
use crate::options::RunOptions;

/// Result of running one file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileOutcome {
    pub path: String,
    pub code: i32,
    /// Captured log; empty when the log went straight to stdout.
    pub log: String,
    /// Messages for stderr, each prefixed with the path.
    pub errors: Vec<String>,
}

/// Run every file named in `options` and return the process exit code.
///
/// The worst outcome wins: an interrupted run outranks a usage error, which
/// outranks a diagnostic.
#[tracing::instrument(level = "debug", skip_all, fields(files = options.files.len()))]
pub fn run_files(options: &RunOptions) -> i32 {
    if options.parallel && options.files.len() > 1 {
        let outcomes = run_parallel(options);
        let mut code = exit::OK;
        for outcome in &outcomes {
            println!("==> {} <==", outcome.path);
            print!("{}", outcome.log);
            report(outcome);
            code = code.max(outcome.code);
        }
        return code;
    }

    let mut code = exit::OK;
    for path in &options.files {
        let outcome = run_one(path, options, stdout_output());
        report(&outcome);
        code = code.max(outcome.code);
    }
    code
}

/// Run one file with a fresh interpreter logging to `output`.
pub fn run_one(path: &str, options: &RunOptions, output: SharedOutput) -> FileOutcome {
    let _span = tracing::info_span!("file", path).entered();
    let program = match load_program(path) {
        Ok(program) => program,
        Err(error) => {
            return FileOutcome {
                path: path.to_string(),
                code: error.exit_code(),
                log: String::new(),
                errors: vec![error.to_string()],
            };
        }
    };

    let host = HeadlessHost::new(output).with_argument(options.argument.clone());
    let mut builder = Interpreter::builder(host).config(options.config.clone());
    if options.trace {
        builder = builder.debugger(Box::new(LineTracer::default()));
    }
    let mut interpreter = builder.build();
    let result = match &options.macro_name {
        Some(name) => interpreter.run_macro_named(program, name),
        None => interpreter.run(program),
    };

    let code = exit_code(&result);
    let host = interpreter.into_host();
    let mut errors: Vec<String> = host
        .errors()
        .iter()
        .map(|message| format!("{path}: {message}"))
        .collect();
    // Usage failures never reach the host.
    if let Err(error) = &result {
        if code == exit::USAGE {
            errors.push(format!("{path}: {error}"));
        }
    }
    tracing::debug!(code, "file finished");

    FileOutcome {
        path: path.to_string(),
        code,
        log: host.log_text(),
        errors,
    }
}

/// Exit code for the result of one run.
pub fn exit_code(result: &Result<(), RunError>) -> i32 {
    match result {
        Ok(()) => exit::OK,
        Err(RunError::Diagnostic(_) | RunError::Lex(_) | RunError::AlreadyFailed) => {
            exit::DIAGNOSTIC
        }
        Err(RunError::UnknownMacro(_) | RunError::BadEntry(_)) => exit::USAGE,
        Err(RunError::Canceled | RunError::Aborted) => exit::INTERRUPTED,
    }
}

/// Run the files on a scoped pool, one interpreter and log buffer per file.
/// Outcomes come back in command-line order.
fn run_parallel(options: &RunOptions) -> Vec<FileOutcome> {
    let run = |path: &String| run_one(path, options, buffer_output());
    rayon::ThreadPoolBuilder::new()
        .stack_size(16 * 1024 * 1024)
        .build_scoped(rayon::ThreadBuilder::run, |pool| {
            pool.install(|| options.files.par_iter().map(run).collect::<Vec<_>>())
        })
        .unwrap_or_else(|e| {
            tracing::warn!("failed to create thread pool ({e}), running sequentially");
            options.files.iter().map(run).collect()
        })
}

fn report(outcome: &FileOutcome) {
    for error in &outcome.errors {
        eprintln!("{error}");
    }
}
