//! Index of macro and function declarations, built once per loaded program.

use ijm_ir::{Program, SymbolId, TokenKind};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::errors::EvalErrorKind;

/// A `macro "name" { ... }` declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct MacroEntry {
    pub name: String,
    /// Index of the `macro` keyword.
    pub keyword_pc: usize,
    /// Index of the body's `{`.
    pub body_pc: usize,
}

/// A `function name(params) { ... }` declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FunctionEntry {
    pub params: SmallVec<[SymbolId; 4]>,
    /// Index of the body's `{`.
    pub body_pc: usize,
}

/// Malformed declaration found while indexing.
#[derive(Debug)]
pub(crate) struct IndexError {
    pub pc: usize,
    pub kind: EvalErrorKind,
}

#[derive(Debug, Default)]
pub(crate) struct Entries {
    macros: Vec<MacroEntry>,
    functions: FxHashMap<SymbolId, FunctionEntry>,
}

impl Entries {
    /// Scan the top level of `program` for declarations.
    ///
    /// When a function name is declared twice the first declaration is used.
    pub fn index(program: &Program) -> Result<Self, IndexError> {
        let mut cursor = Cursor::new(program);
        let mut entries = Entries::default();
        let mut depth = 0usize;

        while let Some((pc, kind)) = cursor.advance() {
            match kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                TokenKind::Macro if depth == 0 => {
                    let name = cursor.expect(TokenKind::Str, EvalErrorKind::StringExpected)?;
                    let name = program
                        .symbol_of(program.token(name))
                        .map(|symbol| symbol.name.clone())
                        .unwrap_or_default();
                    let body_pc = cursor.peek_brace()?;
                    entries.macros.push(MacroEntry {
                        name,
                        keyword_pc: pc,
                        body_pc,
                    });
                }
                TokenKind::Function if depth == 0 => {
                    let (name, function) = cursor.function()?;
                    if entries.functions.contains_key(&name) {
                        tracing::warn!(
                            line = line_of(program, pc),
                            "function declared twice; keeping the first"
                        );
                    } else {
                        entries.functions.insert(name, function);
                    }
                }
                _ => {}
            }
        }

        tracing::debug!(
            macros = entries.macros.len(),
            functions = entries.functions.len(),
            "entries indexed"
        );
        Ok(entries)
    }

    pub fn macros(&self) -> &[MacroEntry] {
        &self.macros
    }

    pub fn macro_named(&self, name: &str) -> Option<&MacroEntry> {
        self.macros.iter().find(|m| m.name == name)
    }

    pub fn function(&self, name: SymbolId) -> Option<&FunctionEntry> {
        self.functions.get(&name)
    }
}

fn line_of(program: &Program, pc: usize) -> usize {
    1 + program.tokens()[..pc.min(program.len())]
        .iter()
        .filter(|token| token.kind == TokenKind::Eol)
        .count()
}

/// Walks significant tokens, skipping line ends.
struct Cursor<'a> {
    program: &'a Program,
    pc: usize,
}

impl<'a> Cursor<'a> {
    fn new(program: &'a Program) -> Self {
        Cursor { program, pc: 0 }
    }

    fn skip_eols(&mut self) {
        while self.program.token(self.pc).kind == TokenKind::Eol {
            self.pc += 1;
        }
    }

    fn advance(&mut self) -> Option<(usize, TokenKind)> {
        self.skip_eols();
        let kind = self.program.token(self.pc).kind;
        if kind == TokenKind::Eof {
            return None;
        }
        self.pc += 1;
        Some((self.pc - 1, kind))
    }

    fn expect(&mut self, kind: TokenKind, error: EvalErrorKind) -> Result<usize, IndexError> {
        self.skip_eols();
        let pc = self.pc;
        if self.program.token(pc).kind == kind {
            self.pc += 1;
            Ok(pc)
        } else {
            Err(IndexError { pc, kind: error })
        }
    }

    /// Position of the `{` that must come next, left unconsumed so the
    /// caller's depth tracking sees it.
    fn peek_brace(&mut self) -> Result<usize, IndexError> {
        self.skip_eols();
        if self.program.token(self.pc).kind == TokenKind::LBrace {
            Ok(self.pc)
        } else {
            Err(IndexError {
                pc: self.pc,
                kind: EvalErrorKind::Expected("{"),
            })
        }
    }

    /// `name ( [param {, param}] )` followed by the body's `{`.
    fn function(&mut self) -> Result<(SymbolId, FunctionEntry), IndexError> {
        self.skip_eols();
        let name_pc = self.pc;
        let token = self.program.token(name_pc);
        let name = match (token.kind, token.symbol) {
            (TokenKind::UserFn | TokenKind::Word, Some(symbol)) => symbol,
            _ => {
                return Err(IndexError {
                    pc: name_pc,
                    kind: EvalErrorKind::Invalid("function name"),
                })
            }
        };
        self.pc += 1;
        self.expect(TokenKind::LParen, EvalErrorKind::Expected("("))?;

        let mut params = SmallVec::new();
        self.skip_eols();
        if self.program.token(self.pc).kind != TokenKind::RParen {
            loop {
                let pc = self.expect(TokenKind::Word, EvalErrorKind::VariableExpected)?;
                if let Some(symbol) = self.program.token(pc).symbol {
                    params.push(symbol);
                }
                self.skip_eols();
                if self.program.token(self.pc).kind != TokenKind::Comma {
                    break;
                }
                self.pc += 1;
            }
        }
        self.expect(TokenKind::RParen, EvalErrorKind::Expected(")"))?;
        let body_pc = self.peek_brace()?;
        Ok((name, FunctionEntry { params, body_pc }))
    }
}
