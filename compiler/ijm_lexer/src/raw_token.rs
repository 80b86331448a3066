//! Raw Token Definition
//!
//! The `RawToken` enum is the logos-derived tokenizer output before symbol
//! interning and final token conversion. Keywords are not listed here: they
//! lex as `Word` and resolve through the symbol table preamble.

use logos::Logos;

/// Raw token from logos (before interning).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\f]+")] // Skip horizontal whitespace
pub(crate) enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    /// Start of a block comment that never closes; a closed one lexes longer.
    #[token("/*")]
    OpenComment,

    #[token("\n")]
    Newline,

    // Literals
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| {
        i64::from_str_radix(&lex.slice()[2..], 16).ok().map(|n| n as f64)
    })]
    HexNumber(f64),

    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    Str,

    /// Unclosed string literal; a closed one lexes longer.
    #[regex(r#""([^"\\\n]|\\.)*"#)]
    #[regex(r"'([^'\\\n]|\\.)*")]
    OpenStr,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Word,

    /// Namespaced builtin such as `File.exists`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*\.[a-zA-Z_][a-zA-Z0-9_]*")]
    DottedWord,

    // Multi-character operators
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,

    // Single-character operators and punctuation
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Eq,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
}
