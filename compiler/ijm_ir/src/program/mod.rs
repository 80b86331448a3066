//! A tokenized program: the contract between a lexer and the evaluator.

use std::borrow::Cow;

use crate::{Symbol, SymbolTable, Token, TokenKind};


/// Symbol table plus token stream.
///
/// The stream always ends with an [`TokenKind::Eof`] token once a lexer has
/// finished with it; reading past the end also yields `Eof`.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Program {
    symbols: SymbolTable,
    tokens: Vec<Token>,
}

impl Program {
    /// Empty program with the standard preamble.
    pub fn new() -> Self {
        Program {
            symbols: SymbolTable::new(),
            tokens: Vec::new(),
        }
    }

    /// The symbol table.
    #[inline]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Mutable symbol table, for lexers appending entries.
    #[inline]
    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Append a token to the stream.
    #[inline]
    pub fn push_token(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// The token stream.
    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Mutable token stream, for lexer post-passes that retag tokens.
    #[inline]
    pub fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    /// Token at `pc`, or `Eof` past the end.
    #[inline]
    pub fn token(&self, pc: usize) -> Token {
        self.tokens.get(pc).copied().unwrap_or(Token::EOF)
    }

    /// Number of tokens in the stream.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the stream has no tokens.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Symbol referenced by `token`, if any.
    pub fn symbol_of(&self, token: Token) -> Option<&Symbol> {
        token.symbol.and_then(|id| self.symbols.get(id))
    }

    /// Number of source lines (end-of-line tokens plus one).
    pub fn line_count(&self) -> usize {
        1 + self
            .tokens
            .iter()
            .filter(|token| token.kind == TokenKind::Eol)
            .count()
    }

    /// Source-like spelling of a token, used to rebuild lines for diagnostics.
    pub fn token_text(&self, token: Token) -> Cow<'_, str> {
        match token.kind {
            TokenKind::Str => {
                let text = self.symbol_of(token).map_or("", |s| s.name.as_str());
                Cow::Owned(quote(text))
            }
            kind if kind.has_symbol() => {
                Cow::Borrowed(self.symbol_of(token).map_or("?", |s| s.name.as_str()))
            }
            kind => Cow::Borrowed(kind.spelling()),
        }
    }
}

/// Quote a string literal the way it would be written in source.
fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
