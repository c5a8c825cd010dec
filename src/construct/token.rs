use std::fmt;

use wave_common::operator::Operator;

use crate::common::span::Spanned;

pub type Tokens = Vec<Spanned<Token>>;

/// These are the different tokens the lexer will output.
/// Tokens with data contain that data: a boolean is a `Bool(…)`, not
/// a string. Operator words and symbols arrive already resolved,
/// which is also what shields them from `Let` substitution — only
/// bare `Word`s are substitutable.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Leafs.
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(u8),
    Str(String),
    Op(Operator),
    Word(String),

    // Preprocessing keywords.
    Let,
    Be,

    // Grouping.
    OpenParen,
    CloseParen,
    OpenSquare,
    CloseSquare,
    CurlySeq,
    CurlyPar,
    CloseCurly,

    // Separators and markers.
    Semicolon,
    Parallel,
    Hash,
    At,
    Dot,
}

impl fmt::Display for Token {
    /// Pretty formatting for error messages; use `Debug` elsewhere.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;
        match self {
            Int(i) => write!(f, "integer `{}`", i),
            Float(x) => write!(f, "float `{:?}`", x),
            Bool(b) => write!(f, "boolean `{}`", b),
            Char(c) => write!(f, "character `'{}'`", *c as char),
            Str(s) => write!(f, "string `\"{}\"`", s),
            Op(op) => write!(f, "operator `{}`", op),
            Word(w) => write!(f, "identifier `{}`", w),
            Let => write!(f, "`Let`"),
            Be => write!(f, "`be`"),
            OpenParen => write!(f, "`(`"),
            CloseParen => write!(f, "`)`"),
            OpenSquare => write!(f, "`[`"),
            CloseSquare => write!(f, "`]`"),
            CurlySeq => write!(f, "`{{;`"),
            CurlyPar => write!(f, "`{{||`"),
            CloseCurly => write!(f, "`}}`"),
            Semicolon => write!(f, "`;`"),
            Parallel => write!(f, "`||`"),
            Hash => write!(f, "`#`"),
            At => write!(f, "`@`"),
            Dot => write!(f, "`.`"),
        }
    }
}
