//! Compiled programs.
//!
//! A `.ijmc` file is a bincode image of a tokenized [`Program`] behind a
//! four-byte magic and a format version. Loading one skips tokenizing; the
//! evaluator sees exactly the program `ijm compile` produced.

use std::path::Path;

use ijm_ir::Program;
use serde::{Deserialize, Serialize};


/// File extension of compiled programs.
pub const EXTENSION: &str = "ijmc";

const MAGIC: [u8; 4] = *b"IJMC";

/// Bumped whenever `Program`'s serialized shape changes.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct Header {
    magic: [u8; 4],
    version: u32,
}

#[derive(Deserialize)]
struct Image {
    _header: Header,
    program: Program,
}

/// Failure to read a compiled program.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("not a compiled ijm program")]
    NotCompiled,
    #[error("compiled with format version {found}, this build reads version {FORMAT_VERSION}")]
    Version { found: u32 },
    #[error("corrupt compiled program: {0}")]
    Corrupt(#[from] bincode::Error),
}

/// Serialize `program` into the compiled format.
pub fn encode(program: &Program) -> Result<Vec<u8>, bincode::Error> {
    bincode::serialize(&ImageRef {
        magic: MAGIC,
        version: FORMAT_VERSION,
        program,
    })
}

/// Read a program written by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<Program, CacheError> {
    let header: Header = bincode::deserialize(bytes).map_err(|_| CacheError::NotCompiled)?;
    if header.magic != MAGIC {
        return Err(CacheError::NotCompiled);
    }
    if header.version != FORMAT_VERSION {
        return Err(CacheError::Version {
            found: header.version,
        });
    }
    let image: Image = bincode::deserialize(bytes)?;
    Ok(image.program)
}

/// Whether `path` names a compiled program.
pub fn is_compiled(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION))
}

/// Borrowing twin of `Image`; the header fields serialize inline.
#[derive(Serialize)]
struct ImageRef<'a> {
    magic: [u8; 4],
    version: u32,
    program: &'a Program,
}
