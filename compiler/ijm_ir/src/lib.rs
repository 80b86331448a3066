//! IJM IR - the static data contract between a lexer and the evaluator.
//!
//! This crate contains:
//! - `SymbolTable`: keyword/builtin preamble plus identifiers and literals
//! - `Token` / `TokenKind`: the stream the evaluator's program counter walks
//! - The builtin catalogue (`VoidOp`, `NumericOp`, `TextOp`, `ArrayOp`)
//! - `Program`: symbol table and token stream together
//!
//! There is no syntax tree. The evaluator parses and executes the token
//! stream in a single pass.
//!
//! With the `cache` feature every type here is serde-serializable, which is
//! how compiled programs are persisted.

mod builtin;
mod program;
mod symbol;
mod token;

pub use builtin::{ArrayOp, Builtin, NumericOp, TextOp, VoidOp};
pub use program::Program;
pub use symbol::{Symbol, SymbolId, SymbolKind, SymbolTable};
pub use token::{Token, TokenKind};
