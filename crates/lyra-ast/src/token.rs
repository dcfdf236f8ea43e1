// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Token definitions for the lexer.

use crate::Span;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    String(String),
    Bool(bool),
    Null,

    // Identifier
    Ident(String),

    // Keywords
    Class,
    Interface,
    Extends,
    Implements,
    Constructor,
    Let,
    Return,
    If,
    Else,
    Match,
    Case,
    Default,
    Foreach,
    In,
    Import,
    From,
    New,
    This,
    Super,

    // Modifiers
    Open,
    Public,
    Private,
    Static,
    Readonly,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AmpAmp,
    PipePipe,
    Bang,
    Question,
    Arrow,
    FatArrow,
    At,
    Dot,

    // Delimiters
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Semi,
    Comma,

    Eof,
}

impl TokenKind {
    /// Human-readable name used in "expected X, found Y" messages.
    pub fn display_name(&self) -> String {
        match self {
            TokenKind::Number(n) => format!("number `{}`", n),
            TokenKind::String(s) => format!("string \"{}\"", s),
            TokenKind::Bool(b) => format!("`{}`", b),
            TokenKind::Null => "`null`".to_string(),
            TokenKind::Ident(name) => format!("identifier `{}`", name),
            TokenKind::Eof => "end of file".to_string(),
            other => match other.keyword_text().or_else(|| other.symbol_text()) {
                Some(text) => format!("'{}'", text),
                None => format!("{:?}", other),
            },
        }
    }

    /// Source spelling of a keyword or modifier token.
    pub fn keyword_text(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::Class => "class",
            TokenKind::Interface => "interface",
            TokenKind::Extends => "extends",
            TokenKind::Implements => "implements",
            TokenKind::Constructor => "constructor",
            TokenKind::Let => "let",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::Match => "match",
            TokenKind::Case => "case",
            TokenKind::Default => "default",
            TokenKind::Foreach => "foreach",
            TokenKind::In => "in",
            TokenKind::Import => "import",
            TokenKind::From => "from",
            TokenKind::New => "new",
            TokenKind::This => "this",
            TokenKind::Super => "super",
            TokenKind::Open => "open",
            TokenKind::Public => "public",
            TokenKind::Private => "private",
            TokenKind::Static => "static",
            TokenKind::Readonly => "readonly",
            _ => return None,
        })
    }

    fn symbol_text(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::BangEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Bang => "!",
            TokenKind::Question => "?",
            TokenKind::Arrow => "->",
            TokenKind::FatArrow => "=>",
            TokenKind::At => "@",
            TokenKind::Dot => ".",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Colon => ":",
            TokenKind::Semi => ";",
            TokenKind::Comma => ",",
            _ => return None,
        })
    }
}
