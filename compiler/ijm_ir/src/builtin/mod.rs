//! The builtin catalogue.
//!
//! Builtins live in four disjoint opcode ranges, one per syntactic position
//! they can appear in: statements (`VoidOp`), numeric expressions
//! (`NumericOp`), text expressions (`TextOp`) and array expressions
//! (`ArrayOp`). The symbol table preamble is generated from these tables, so
//! the spelling listed here is exactly what a program writes.

use crate::TokenKind;


/// Declares one opcode enum together with its spelling table.
macro_rules! builtin_table {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $spelling:literal,)* }) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $($variant,)*
        }

        impl $name {
            /// Every opcode in this range, in preamble order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            /// Name as written in macro source.
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $spelling,)*
                }
            }
        }
    };
}

builtin_table! {
    /// Procedures: only valid in statement position.
    VoidOp {
        Print => "print",
        Wait => "wait",
        Exit => "exit",
        SetPixel => "setPixel",
        MakeRectangle => "makeRectangle",
        MakeOval => "makeOval",
        MakeLine => "makeLine",
        DrawLine => "drawLine",
        SetColor => "setColor",
        Fill => "fill",
        NewImage => "newImage",
        SelectImage => "selectImage",
        Close => "close",
        Run => "run",
        ShowStatus => "showStatus",
        ShowProgress => "showProgress",
        ShowMessage => "showMessage",
        SetResult => "setResult",
        UpdateResults => "updateResults",
        Dump => "dump",
        FileSaveString => "File.saveString",
    }
}

builtin_table! {
    /// Functions producing a number.
    NumericOp {
        GetPixel => "getPixel",
        GetWidth => "getWidth",
        GetHeight => "getHeight",
        GetImageId => "getImageID",
        NImages => "nImages",
        NResults => "nResults",
        GetResult => "getResult",
        GetNumber => "getNumber",
        GetBoolean => "getBoolean",
        Random => "random",
        Sin => "sin",
        Cos => "cos",
        Tan => "tan",
        Sqrt => "sqrt",
        Abs => "abs",
        Floor => "floor",
        Round => "round",
        Log => "log",
        Exp => "exp",
        Atan => "atan",
        IsNaN => "isNaN",
        Pow => "pow",
        Atan2 => "atan2",
        MinOf => "minOf",
        MaxOf => "maxOf",
        ParseInt => "parseInt",
        ParseFloat => "parseFloat",
        LengthOf => "lengthOf",
        IndexOf => "indexOf",
        StartsWith => "startsWith",
        EndsWith => "endsWith",
        GetTime => "getTime",
        Pi => "PI",
        NaN => "NaN",
        FileExists => "File.exists",
    }
}

builtin_table! {
    /// Functions producing text.
    TextOp {
        GetTitle => "getTitle",
        GetString => "getString",
        D2s => "d2s",
        ToString => "toString",
        Substring => "substring",
        ToUpperCase => "toUpperCase",
        ToLowerCase => "toLowerCase",
        FromCharCode => "fromCharCode",
        GetArgument => "getArgument",
        Replace => "replace",
        FileOpenAsString => "File.openAsString",
    }
}

builtin_table! {
    /// Functions producing an array.
    ArrayOp {
        NewArray => "newArray",
        Split => "split",
        Copy => "Array.copy",
        Concat => "Array.concat",
        Sort => "Array.sort",
        GetSequence => "Array.getSequence",
    }
}

/// A builtin of any range.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Builtin {
    Void(VoidOp),
    Numeric(NumericOp),
    Text(TextOp),
    Array(ArrayOp),
}

impl Builtin {
    /// Name as written in macro source.
    pub const fn name(self) -> &'static str {
        match self {
            Builtin::Void(op) => op.name(),
            Builtin::Numeric(op) => op.name(),
            Builtin::Text(op) => op.name(),
            Builtin::Array(op) => op.name(),
        }
    }

    /// Token kind the lexer emits for a reference to this builtin.
    pub const fn token_kind(self) -> TokenKind {
        match self {
            Builtin::Void(_) => TokenKind::VoidFn,
            Builtin::Numeric(_) => TokenKind::NumericFn,
            Builtin::Text(_) => TokenKind::TextFn,
            Builtin::Array(_) => TokenKind::ArrayFn,
        }
    }

    /// Every builtin, grouped by range, in preamble order.
    pub fn all() -> impl Iterator<Item = Builtin> {
        VoidOp::ALL
            .iter()
            .map(|&op| Builtin::Void(op))
            .chain(NumericOp::ALL.iter().map(|&op| Builtin::Numeric(op)))
            .chain(TextOp::ALL.iter().map(|&op| Builtin::Text(op)))
            .chain(ArrayOp::ALL.iter().map(|&op| Builtin::Array(op)))
    }
}
