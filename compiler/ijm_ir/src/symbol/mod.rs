//! The symbol table.
//!
//! Entries are addressed by [`SymbolId`] and never removed. The table opens
//! with a fixed preamble (every keyword, then every builtin), after which the
//! lexer appends one entry per distinct identifier, string literal and number
//! literal it meets.

use std::fmt;
use std::ops::Index;

use rustc_hash::FxHashMap;

use crate::{Builtin, TokenKind};


/// Index of a symbol table entry.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Create from a raw index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        SymbolId(raw)
    }

    /// Raw index value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index usable with slices.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

/// What a symbol table entry denotes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum SymbolKind {
    /// A reserved word; the payload is the token kind it lexes to.
    Keyword(TokenKind),
    /// A host builtin.
    Builtin(Builtin),
    /// A user identifier (variable, parameter or function name).
    Identifier,
    /// A number literal with its parsed value.
    Number(f64),
    /// A string literal; the text is the symbol's name.
    Text,
}

/// One symbol table entry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Symbol {
    /// Identifier spelling, literal text, or number spelling as written.
    pub name: String,
    pub kind: SymbolKind,
}

impl Symbol {
    /// Literal value of a number symbol.
    pub fn number(&self) -> Option<f64> {
        match self.kind {
            SymbolKind::Number(value) => Some(value),
            _ => None,
        }
    }

    /// Opcode of a builtin symbol.
    pub fn builtin(&self) -> Option<Builtin> {
        match self.kind {
            SymbolKind::Builtin(builtin) => Some(builtin),
            _ => None,
        }
    }
}

/// Keyword entries loaded at the start of every table.
const KEYWORDS: &[TokenKind] = &[
    TokenKind::Var,
    TokenKind::Macro,
    TokenKind::Function,
    TokenKind::Return,
    TokenKind::If,
    TokenKind::Else,
    TokenKind::For,
    TokenKind::While,
    TokenKind::Do,
    TokenKind::Break,
    TokenKind::Continue,
    TokenKind::True,
    TokenKind::False,
];

/// The symbol table of one program.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    preamble_len: usize,
    /// Keywords, builtins and identifiers by spelling.
    words: FxHashMap<String, SymbolId>,
    /// String literals by content.
    texts: FxHashMap<String, SymbolId>,
    /// Number literals by spelling.
    numbers: FxHashMap<String, SymbolId>,
}

impl SymbolTable {
    /// Create a table holding only the keyword and builtin preamble.
    pub fn new() -> Self {
        let mut table = SymbolTable {
            symbols: Vec::with_capacity(256),
            preamble_len: 0,
            words: FxHashMap::default(),
            texts: FxHashMap::default(),
            numbers: FxHashMap::default(),
        };
        for &keyword in KEYWORDS {
            table.push(Symbol {
                name: keyword.spelling().to_string(),
                kind: SymbolKind::Keyword(keyword),
            });
        }
        for builtin in Builtin::all() {
            table.push(Symbol {
                name: builtin.name().to_string(),
                kind: SymbolKind::Builtin(builtin),
            });
        }
        table.preamble_len = table.symbols.len();
        table
    }

    /// Number of entries, preamble included.
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the table has no entries (never true for a constructed table).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of preamble entries (keywords and builtins).
    #[inline]
    pub fn preamble_len(&self) -> usize {
        self.preamble_len
    }

    /// Entry by index.
    #[inline]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    /// All entries with their indices, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(index, symbol)| (SymbolId(index as u32), symbol))
    }

    /// Append an entry and index it for lookup.
    ///
    /// Appending a second entry with an already-indexed spelling keeps the
    /// first one reachable by lookup; the new entry is still addressable by id.
    pub fn push(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        let map = match symbol.kind {
            SymbolKind::Text => &mut self.texts,
            SymbolKind::Number(_) => &mut self.numbers,
            SymbolKind::Keyword(_) | SymbolKind::Builtin(_) | SymbolKind::Identifier => {
                &mut self.words
            }
        };
        map.entry(symbol.name.clone()).or_insert(id);
        self.symbols.push(symbol);
        id
    }

    /// Keyword, builtin or identifier entry spelled `name`.
    pub fn lookup_word(&self, name: &str) -> Option<SymbolId> {
        self.words.get(name).copied()
    }

    /// Entry for identifier `name`, appending one if needed.
    pub fn intern_identifier(&mut self, name: &str) -> SymbolId {
        match self.words.get(name) {
            Some(&id) => id,
            None => self.push(Symbol {
                name: name.to_string(),
                kind: SymbolKind::Identifier,
            }),
        }
    }

    /// Entry for string literal `text`, appending one if needed.
    pub fn intern_text(&mut self, text: &str) -> SymbolId {
        match self.texts.get(text) {
            Some(&id) => id,
            None => self.push(Symbol {
                name: text.to_string(),
                kind: SymbolKind::Text,
            }),
        }
    }

    /// Entry for a number literal spelled `spelling`, appending one if needed.
    pub fn intern_number(&mut self, spelling: &str, value: f64) -> SymbolId {
        match self.numbers.get(spelling) {
            Some(&id) => id,
            None => self.push(Symbol {
                name: spelling.to_string(),
                kind: SymbolKind::Number(value),
            }),
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<SymbolId> for SymbolTable {
    type Output = Symbol;

    #[inline]
    fn index(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }
}
