// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer implementation using logos.

use logos::Logos;
use lyra_ast::token::{Token, TokenKind};
use lyra_ast::{FileId, Span};

/// Raw token type for logos - literal values are parsed in a second pass.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    // === Keywords ===
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("constructor")]
    Constructor,
    #[token("let")]
    Let,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("match")]
    Match,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("foreach")]
    Foreach,
    #[token("in")]
    In,
    #[token("import")]
    Import,
    #[token("from")]
    From,
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("super")]
    Super,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // === Modifiers ===
    #[token("open")]
    Open,
    #[token("public")]
    Public,
    #[token("private")]
    Private,
    #[token("static")]
    Static,
    #[token("readonly")]
    Readonly,

    // === Operators (longer first) ===
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
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
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token("?")]
    Question,
    #[token("@")]
    At,
    #[token(".")]
    Dot,

    // === Delimiters ===
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,

    // === Comments (skipped) ===
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    // === Literals ===
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    // === Identifier (after keywords) ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// Skip a block comment. Block comments do not nest.
fn block_comment(lexer: &mut logos::Lexer<RawToken>) -> logos::Skip {
    let consumed = match lexer.remainder().find("*/") {
        Some(end) => end + 2,
        None => lexer.remainder().len(),
    };
    lexer.bump(consumed);
    logos::Skip
}

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// The lexer for Lyra source code.
pub struct Lexer<'a> {
    source: &'a str,
    file: FileId,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self { source, file: FileId::default(), errors: Vec::new() }
    }

    /// Tag every produced span with `file`.
    pub fn with_file(mut self, file: FileId) -> Self {
        self.file = file;
        self
    }

    /// Tokenize the entire source. The token list always ends with `Eof`.
    pub fn tokenize(&mut self) -> LexResult {
        let mut tokens = Vec::new();
        let mut raw = RawToken::lexer(self.source);

        while let Some(result) = raw.next() {
            if self.errors.len() >= MAX_ERRORS {
                break;
            }

            let range = raw.span();
            let span = Span::new(range.start, range.end).in_file(self.file);

            let kind = match result {
                Ok(tok) => match convert_token(tok, raw.slice(), span) {
                    Ok(kind) => kind,
                    Err(e) => {
                        self.errors.push(e);
                        continue;
                    }
                },
                Err(()) => {
                    let ch = self.source[range.start..].chars().next().unwrap_or('?');
                    self.errors.push(LexError::unexpected_char(ch, span));
                    continue;
                }
            };

            tokens.push(Token { kind, span });
        }

        let end = self.source.len();
        tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(end, end).in_file(self.file),
        });

        LexResult { tokens, errors: std::mem::take(&mut self.errors) }
    }
}

/// Convert a raw logos token to a TokenKind, parsing literals.
fn convert_token(raw: RawToken, slice: &str, span: Span) -> Result<TokenKind, LexError> {
    Ok(match raw {
        RawToken::Class => TokenKind::Class,
        RawToken::Interface => TokenKind::Interface,
        RawToken::Extends => TokenKind::Extends,
        RawToken::Implements => TokenKind::Implements,
        RawToken::Constructor => TokenKind::Constructor,
        RawToken::Let => TokenKind::Let,
        RawToken::Return => TokenKind::Return,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::Match => TokenKind::Match,
        RawToken::Case => TokenKind::Case,
        RawToken::Default => TokenKind::Default,
        RawToken::Foreach => TokenKind::Foreach,
        RawToken::In => TokenKind::In,
        RawToken::Import => TokenKind::Import,
        RawToken::From => TokenKind::From,
        RawToken::New => TokenKind::New,
        RawToken::This => TokenKind::This,
        RawToken::Super => TokenKind::Super,
        RawToken::True => TokenKind::Bool(true),
        RawToken::False => TokenKind::Bool(false),
        RawToken::Null => TokenKind::Null,

        RawToken::Open => TokenKind::Open,
        RawToken::Public => TokenKind::Public,
        RawToken::Private => TokenKind::Private,
        RawToken::Static => TokenKind::Static,
        RawToken::Readonly => TokenKind::Readonly,

        RawToken::EqEq => TokenKind::EqEq,
        RawToken::BangEq => TokenKind::BangEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::FatArrow => TokenKind::FatArrow,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Eq => TokenKind::Eq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Question => TokenKind::Question,
        RawToken::At => TokenKind::At,
        RawToken::Dot => TokenKind::Dot,

        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Comma => TokenKind::Comma,

        RawToken::Number => {
            let value = slice.parse::<f64>().map_err(|_| LexError::invalid_number(span))?;
            TokenKind::Number(value)
        }
        RawToken::String => {
            let inner = &slice[1..slice.len() - 1];
            TokenKind::String(parse_string(inner, span)?)
        }
        RawToken::Ident => TokenKind::Ident(slice.to_string()),

        RawToken::LineComment | RawToken::BlockComment => {
            unreachable!("comments are skipped")
        }
    })
}

/// Parse a string literal body, handling escape sequences.
fn parse_string(s: &str, span: Span) -> Result<String, LexError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        result.push(match chars.next() {
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('\\') => '\\',
            Some('0') => '\0',
            Some('"') => '"',
            _ => return Err(LexError::invalid_escape(span)),
        });
    }

    Ok(result)
}

/// Result of lexing: tokens plus any errors found.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl LexResult {
    /// Returns true if lexing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Tokens, or the first error.
    pub fn into_result(self) -> Result<Vec<Token>, LexError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.tokens),
        }
    }
}

/// A lexer error with location and friendly message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct LexError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl LexError {
    fn unexpected_char(ch: char, span: Span) -> Self {
        Self {
            span,
            message: format!("Unexpected character '{}'", ch),
            hint: None,
        }
    }

    fn invalid_escape(span: Span) -> Self {
        Self {
            span,
            message: "Invalid escape sequence".to_string(),
            hint: Some("Valid: \\n \\r \\t \\\\ \\0 \\\"".to_string()),
        }
    }

    fn invalid_number(span: Span) -> Self {
        Self {
            span,
            message: "Invalid number".to_string(),
            hint: None,
        }
    }
}
