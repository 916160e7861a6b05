//! Token definitions for the Glich language
//!
//! Tokens are produced on demand by the token stream and consumed
//! immediately by the evaluator; they are never collected. Literal
//! tokens carry their value payload directly.

use std::fmt;

use crate::field::Field;

/// Token types in Glich
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(i64),
    Field(Field),
    Float(f64),
    Str(String),

    // Identifiers, including signature names like "g:dmy"
    Name(String),

    // Reserved operator words
    Or,         // or
    And,        // and
    Not,        // not
    Div,        // div
    Mod,        // mod
    ErrorCast,  // error

    // Operators
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Equal,      // =
    NotEqual,   // <>
    Less,       // <
    LessEq,     // <=
    Greater,    // >
    GreaterEq,  // >=
    DotDot,     // ..
    Vline,      // |  set union
    Ampersand,  // &  set intersection
    Backslash,  // \  set relative complement
    Caret,      // ^  set symmetric difference
    Tilde,      // ~  set complement
    At,         // @  function call prefix
    Dot,        // .  signature / property access

    // Delimiters
    LParen,     // (
    RParen,     // )
    LBrace,     // {
    RBrace,     // }
    LBracket,   // [
    RBracket,   // ]
    Comma,      // ,
    Semicolon,  // ;

    // End of stream
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Field(n) => write!(f, "{}f", n),
            TokenKind::Float(x) => write!(f, "{}", x),
            TokenKind::Str(s) => write!(f, "\"{}\"", s),
            TokenKind::Name(s) => write!(f, "{}", s),
            TokenKind::Or => write!(f, "or"),
            TokenKind::And => write!(f, "and"),
            TokenKind::Not => write!(f, "not"),
            TokenKind::Div => write!(f, "div"),
            TokenKind::Mod => write!(f, "mod"),
            TokenKind::ErrorCast => write!(f, "error"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Equal => write!(f, "="),
            TokenKind::NotEqual => write!(f, "<>"),
            TokenKind::Less => write!(f, "<"),
            TokenKind::LessEq => write!(f, "<="),
            TokenKind::Greater => write!(f, ">"),
            TokenKind::GreaterEq => write!(f, ">="),
            TokenKind::DotDot => write!(f, ".."),
            TokenKind::Vline => write!(f, "|"),
            TokenKind::Ampersand => write!(f, "&"),
            TokenKind::Backslash => write!(f, "\\"),
            TokenKind::Caret => write!(f, "^"),
            TokenKind::Tilde => write!(f, "~"),
            TokenKind::At => write!(f, "@"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::End => write!(f, "end of input"),
        }
    }
}

/// A token with its kind and source line
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize) -> Self {
        Self { kind, line }
    }

    pub fn end(line: usize) -> Self {
        Self { kind: TokenKind::End, line }
    }

    /// The identifier text, if this token is a name.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Name(s) => Some(s),
            _ => None,
        }
    }
}

/// Check for the reserved operator words. All other words, including
/// statement keywords, reach the evaluator as ordinary names.
pub fn lookup_word(ident: &str) -> Option<TokenKind> {
    match ident {
        "or" => Some(TokenKind::Or),
        "and" => Some(TokenKind::And),
        "not" => Some(TokenKind::Not),
        "div" => Some(TokenKind::Div),
        "mod" => Some(TokenKind::Mod),
        "error" => Some(TokenKind::ErrorCast),
        _ => None,
    }
}
