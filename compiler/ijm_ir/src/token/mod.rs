//! Tokens: the unit the evaluator's program counter walks over.
//!
//! A token is the explicit record `{kind, symbol}`. Identifier-like kinds
//! (identifiers, literals, builtin and user function names) carry the index
//! of their symbol table entry; operators, punctuation and keywords carry
//! none.
//!
//! For tools that exchange programs as flat 32-bit cells, [`Token::encode`]
//! and [`Token::decode`] provide the packed form: kind code in the low 16
//! bits, symbol index in the high 16 bits (`0xFFFF` when absent).

use std::fmt;

use crate::SymbolId;


/// Declares `TokenKind` together with its spelling table and the decode table.
macro_rules! token_kinds {
    ($($variant:ident => $spelling:literal,)*) => {
        /// Every kind of token the lexer may produce.
        ///
        /// Discriminants are the wire codes used by [`Token::encode`].
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u8)]
        pub enum TokenKind {
            $($variant,)*
        }

        impl TokenKind {
            /// All kinds, indexed by wire code.
            pub const ALL: &'static [TokenKind] = &[$(TokenKind::$variant,)*];

            /// Source spelling for fixed tokens; empty for symbol-carrying kinds.
            pub const fn spelling(self) -> &'static str {
                match self {
                    $(TokenKind::$variant => $spelling,)*
                }
            }
        }
    };
}

token_kinds! {
    // Structural
    Eof => "",
    Eol => "",
    Word => "",
    Number => "",
    Str => "",
    VoidFn => "",
    NumericFn => "",
    TextFn => "",
    ArrayFn => "",
    UserFn => "",

    // Keywords
    Var => "var",
    Macro => "macro",
    Function => "function",
    Return => "return",
    If => "if",
    Else => "else",
    For => "for",
    While => "while",
    Do => "do",
    Break => "break",
    Continue => "continue",
    True => "true",
    False => "false",

    // Multi-character operators
    PlusPlus => "++",
    MinusMinus => "--",
    EqEq => "==",
    NotEq => "!=",
    LtEq => "<=",
    GtEq => ">=",
    AndAnd => "&&",
    OrOr => "||",
    PlusEq => "+=",
    MinusEq => "-=",
    StarEq => "*=",
    SlashEq => "/=",
    Shl => "<<",
    Shr => ">>",

    // Single-character operators and punctuation
    Plus => "+",
    Minus => "-",
    Star => "*",
    Slash => "/",
    Percent => "%",
    Amp => "&",
    Pipe => "|",
    Caret => "^",
    Tilde => "~",
    Bang => "!",
    Lt => "<",
    Gt => ">",
    Eq => "=",
    LParen => "(",
    RParen => ")",
    LBracket => "[",
    RBracket => "]",
    LBrace => "{",
    RBrace => "}",
    Comma => ",",
    Semicolon => ";",
    Dot => ".",
}

impl TokenKind {
    /// Wire code of this kind.
    #[inline]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Kind for a wire code, if the code is known.
    pub fn from_code(code: u16) -> Option<TokenKind> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Whether tokens of this kind reference a symbol table entry.
    pub const fn has_symbol(self) -> bool {
        matches!(
            self,
            TokenKind::Word
                | TokenKind::Number
                | TokenKind::Str
                | TokenKind::VoidFn
                | TokenKind::NumericFn
                | TokenKind::TextFn
                | TokenKind::ArrayFn
                | TokenKind::UserFn
        )
    }

    /// Whether this kind is a reserved word of the language.
    pub const fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Var
                | TokenKind::Macro
                | TokenKind::Function
                | TokenKind::Return
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::True
                | TokenKind::False
        )
    }

    /// Compound assignment operators (`+=`, `-=`, `*=`, `/=`).
    pub const fn is_compound_assign(self) -> bool {
        matches!(
            self,
            TokenKind::PlusEq | TokenKind::MinusEq | TokenKind::StarEq | TokenKind::SlashEq
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spelling = self.spelling();
        if spelling.is_empty() {
            write!(f, "{self:?}")
        } else {
            f.write_str(spelling)
        }
    }
}

/// One cell of the token stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub symbol: Option<SymbolId>,
}

impl Token {
    /// Sentinel returned when reading past the end of the stream.
    pub const EOF: Token = Token::plain(TokenKind::Eof);

    /// Symbol index value that marks "no symbol" in the packed form.
    const NO_SYMBOL: u32 = 0xFFFF;

    /// A token without a symbol (operators, punctuation, keywords).
    #[inline]
    pub const fn plain(kind: TokenKind) -> Self {
        Token { kind, symbol: None }
    }

    /// A token referring to a symbol table entry.
    #[inline]
    pub const fn with_symbol(kind: TokenKind, symbol: SymbolId) -> Self {
        Token {
            kind,
            symbol: Some(symbol),
        }
    }

    /// Pack into a 32-bit cell.
    ///
    /// Returns `None` when the symbol index does not fit in 16 bits.
    pub fn encode(self) -> Option<u32> {
        let index = match self.symbol {
            Some(symbol) if symbol.raw() < Self::NO_SYMBOL => symbol.raw(),
            Some(_) => return None,
            None => Self::NO_SYMBOL,
        };
        Some((index << 16) | u32::from(self.kind.code()))
    }

    /// Unpack a 32-bit cell produced by [`Token::encode`].
    pub fn decode(cell: u32) -> Option<Token> {
        let kind = TokenKind::from_code((cell & 0xFFFF) as u16)?;
        let index = cell >> 16;
        let symbol = (index != Self::NO_SYMBOL).then(|| SymbolId::from_raw(index));
        if symbol.is_some() != kind.has_symbol() {
            return None;
        }
        Some(Token { kind, symbol })
    }
}
