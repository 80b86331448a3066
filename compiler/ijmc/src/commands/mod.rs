//! Command handlers for the `ijm` CLI.
//!
//! Each submodule implements one subcommand. Loading a program (from source
//! or from a compiled `.ijmc` image) and the exit-code convention live here.

use std::path::Path;

use ijm_ir::Program;
use ijm_lexer::LexError;

use crate::cache::{self, CacheError};

mod compile;
mod debug;
mod run;


pub use compile::compile_file;
pub use debug::{dump_file, lex_file};
pub use run::{run_files, run_one, FileOutcome};

/// Process exit codes.
pub mod exit {
    /// The run finished, or the program called `exit`.
    pub const OK: i32 = 0;
    /// A diagnostic was reported.
    pub const DIAGNOSTIC: i32 = 1;
    /// Bad command line, unreadable file or unknown macro.
    pub const USAGE: i32 = 2;
    /// A dialog was canceled or the run was aborted.
    pub const INTERRUPTED: i32 = 130;
}

/// Failure to produce a program from a path.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Lex {
        path: String,
        #[source]
        source: LexError,
    },
    #[error("{path}: {source}")]
    Cache {
        path: String,
        #[source]
        source: CacheError,
    },
}

impl LoadError {
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::Lex { .. } => exit::DIAGNOSTIC,
            LoadError::Io { .. } | LoadError::Cache { .. } => exit::USAGE,
        }
    }
}

/// Read `path` as macro source, or as a compiled program if it has the
/// `.ijmc` extension.
pub fn load_program(path: &str) -> Result<Program, LoadError> {
    let io = |source| LoadError::Io {
        path: path.to_string(),
        source,
    };
    if cache::is_compiled(Path::new(path)) {
        let bytes = std::fs::read(path).map_err(io)?;
        return cache::decode(&bytes).map_err(|source| LoadError::Cache {
            path: path.to_string(),
            source,
        });
    }
    let source = std::fs::read_to_string(path).map_err(io)?;
    ijm_lexer::tokenize(&source).map_err(|source| LoadError::Lex {
        path: path.to_string(),
        source,
    })
}

/// Load `path`, printing the failure and its exit code instead.
pub(crate) fn load_or_report(path: &str) -> Result<Program, i32> {
    load_program(path).map_err(|error| {
        eprintln!("error: {error}");
        error.exit_code()
    })
}
