//! The `compile` command: tokenize once, save the program for later runs.

use std::path::{Path, PathBuf};

use super::{exit, load_or_report};
use crate::cache;

/// Compile the macro source at `path` into a `.ijmc` file.
///
/// Writes next to the source unless `output` is given. Returns the exit code.
pub fn compile_file(path: &str, output: Option<&str>) -> i32 {
    if cache::is_compiled(Path::new(path)) {
        eprintln!("error: '{path}' is already compiled");
        return exit::USAGE;
    }
    let program = match load_or_report(path) {
        Ok(program) => program,
        Err(code) => return code,
    };
    let target = output.map_or_else(
        || Path::new(path).with_extension(cache::EXTENSION),
        PathBuf::from,
    );

    let bytes = match cache::encode(&program) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: cannot encode '{path}': {e}");
            return exit::USAGE;
        }
    };
    if let Err(e) = std::fs::write(&target, &bytes) {
        eprintln!("error: cannot write '{}': {e}", target.display());
        return exit::USAGE;
    }

    println!(
        "Compiled '{path}' -> '{}' ({} tokens, {} bytes)",
        target.display(),
        program.len(),
        bytes.len()
    );
    exit::OK
}
