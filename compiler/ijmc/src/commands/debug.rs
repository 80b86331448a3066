//! Debug commands: `lex` and `dump` for inspecting what the evaluator sees.

use ijm_eval::{Context, EvalConfig};
use ijm_ir::TokenKind;

use super::{exit, load_or_report};

/// Print the token stream of `path`, one token per row.
pub fn lex_file(path: &str) -> i32 {
    let program = match load_or_report(path) {
        Ok(program) => program,
        Err(code) => return code,
    };

    println!("Tokens for '{}' ({} tokens):", path, program.len());
    let mut line = 1;
    for (pc, &token) in program.tokens().iter().enumerate() {
        if token.kind == TokenKind::Eol {
            line += 1;
            continue;
        }
        println!(
            "{pc:6} {line:5}  {:<10} {}",
            format!("{:?}", token.kind),
            program.token_text(token)
        );
    }
    exit::OK
}

/// Print the symbol table and the token stream rebuilt line by line, the
/// way the `dump` builtin shows them.
pub fn dump_file(path: &str) -> i32 {
    let program = match load_or_report(path) {
        Ok(program) => program,
        Err(code) => return code,
    };
    let context = Context::new(program, EvalConfig::DEFAULT_STACK_CAPACITY);
    print!("{}", context.render_symbols());
    print!("{}", context.render_tokens());
    exit::OK
}
