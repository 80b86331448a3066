//! Reference tokenizer for the ijm macro language.
//!
//! Turns source text into an [`ijm_ir::Program`]: the symbol table preamble
//! plus one entry per distinct identifier and literal, and the token stream
//! the evaluator executes. End-of-line tokens are kept (one per source line
//! break, including those inside block comments) so the evaluator can
//! reconstruct line numbers for diagnostics.
//!
//! Words resolve through the symbol table: keywords become plain keyword
//! tokens, builtins become the token kind of their opcode range, and any
//! identifier that names a `function` declared anywhere in the source is
//! retagged as a user function call.

use ijm_ir::{Program, SymbolId, SymbolKind, Token, TokenKind};
use logos::Logos;
use rustc_hash::FxHashSet;

mod raw_token;

use raw_token::RawToken;


/// Errors the tokenizer reports. Line numbers are 1-based.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("Invalid character '{found}' in line {line}")]
    InvalidCharacter { found: String, line: usize },
    #[error("Unterminated string in line {line}")]
    UnterminatedString { line: usize },
    #[error("Unterminated comment in line {line}")]
    UnterminatedComment { line: usize },
    #[error("Invalid number '{spelling}' in line {line}")]
    InvalidNumber { spelling: String, line: usize },
}

impl LexError {
    /// Line the error was found on.
    pub fn line(&self) -> usize {
        match self {
            LexError::InvalidCharacter { line, .. }
            | LexError::UnterminatedString { line }
            | LexError::UnterminatedComment { line }
            | LexError::InvalidNumber { line, .. } => *line,
        }
    }
}

/// Tokenize `source` into a fresh program.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn tokenize(source: &str) -> Result<Program, LexError> {
    let mut program = Program::new();
    let mut lexer = RawToken::lexer(source);
    let mut line = 1;

    while let Some(result) = lexer.next() {
        let slice = lexer.slice();
        let raw = match result {
            Ok(raw) => raw,
            Err(()) => {
                return Err(if slice.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
                    LexError::InvalidNumber {
                        spelling: slice.to_string(),
                        line,
                    }
                } else {
                    LexError::InvalidCharacter {
                        found: slice.to_string(),
                        line,
                    }
                });
            }
        };
        match raw {
            RawToken::LineComment => {}
            RawToken::BlockComment => {
                for _ in slice.matches('\n') {
                    program.push_token(Token::plain(TokenKind::Eol));
                    line += 1;
                }
            }
            RawToken::OpenComment => return Err(LexError::UnterminatedComment { line }),
            RawToken::OpenStr => return Err(LexError::UnterminatedString { line }),
            RawToken::Newline => {
                program.push_token(Token::plain(TokenKind::Eol));
                line += 1;
            }
            RawToken::Number(value) | RawToken::HexNumber(value) => {
                let id = program.symbols_mut().intern_number(slice, value);
                program.push_token(Token::with_symbol(TokenKind::Number, id));
            }
            RawToken::Str => {
                let text = unescape(&slice[1..slice.len() - 1]);
                let id = program.symbols_mut().intern_text(&text);
                program.push_token(Token::with_symbol(TokenKind::Str, id));
            }
            RawToken::Word => {
                let token = resolve_word(&mut program, slice);
                program.push_token(token);
            }
            RawToken::DottedWord => push_dotted(&mut program, slice),
            other => program.push_token(Token::plain(punctuation(other))),
        }
    }

    program.push_token(Token::EOF);
    mark_user_functions(&mut program);

    tracing::debug!(
        tokens = program.len(),
        symbols = program.symbols().len(),
        lines = line,
        "tokenized"
    );
    Ok(program)
}

/// Resolve a bare word to a keyword, builtin or identifier token.
fn resolve_word(program: &mut Program, word: &str) -> Token {
    let id = program.symbols_mut().intern_identifier(word);
    match program.symbols()[id].kind {
        SymbolKind::Keyword(kind) => Token::plain(kind),
        SymbolKind::Builtin(builtin) => Token::with_symbol(builtin.token_kind(), id),
        _ => Token::with_symbol(TokenKind::Word, id),
    }
}

/// `File.exists` is one builtin; `a.length` is a word, a dot and a word.
fn push_dotted(program: &mut Program, slice: &str) {
    if let Some(id) = program.symbols().lookup_word(slice) {
        if let Some(builtin) = program.symbols()[id].builtin() {
            program.push_token(Token::with_symbol(builtin.token_kind(), id));
            return;
        }
    }
    let (head, tail) = slice.split_once('.').unwrap_or((slice, ""));
    let head = resolve_word(program, head);
    program.push_token(head);
    program.push_token(Token::plain(TokenKind::Dot));
    if !tail.is_empty() {
        let tail = resolve_word(program, tail);
        program.push_token(tail);
    }
}

/// Retag every word naming a declared function as a user function token.
fn mark_user_functions(program: &mut Program) {
    let declared: FxHashSet<SymbolId> = program
        .tokens()
        .windows(2)
        .filter(|pair| pair[0].kind == TokenKind::Function && pair[1].kind == TokenKind::Word)
        .filter_map(|pair| pair[1].symbol)
        .collect();
    if declared.is_empty() {
        return;
    }
    for token in program.tokens_mut() {
        if token.kind == TokenKind::Word && token.symbol.is_some_and(|id| declared.contains(&id)) {
            token.kind = TokenKind::UserFn;
        }
    }
}

/// Process backslash escapes inside a string literal body.
fn unescape(body: &str) -> String {
    let mut text = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => text.push('\n'),
            Some('t') => text.push('\t'),
            Some('r') => text.push('\r'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => text.push(decoded),
                    None => {
                        text.push_str("\\u");
                        text.push_str(&hex);
                    }
                }
            }
            Some(other) => text.push(other),
            None => text.push('\\'),
        }
    }
    text
}

fn punctuation(raw: RawToken) -> TokenKind {
    match raw {
        RawToken::PlusPlus => TokenKind::PlusPlus,
        RawToken::MinusMinus => TokenKind::MinusMinus,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::AndAnd => TokenKind::AndAnd,
        RawToken::OrOr => TokenKind::OrOr,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Eq => TokenKind::Eq,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Dot => TokenKind::Dot,
        // Handled by the caller before conversion.
        RawToken::LineComment
        | RawToken::BlockComment
        | RawToken::OpenComment
        | RawToken::Newline
        | RawToken::HexNumber(_)
        | RawToken::Number(_)
        | RawToken::Str
        | RawToken::OpenStr
        | RawToken::Word
        | RawToken::DottedWord => TokenKind::Eof,
    }
}
