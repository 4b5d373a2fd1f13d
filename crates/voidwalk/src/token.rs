//! Tokens produced by the lexer and consumed by the parser

use std::fmt;

use crate::error::Location;

/// Reserved words.
pub const KEYWORDS: &[&str] = &[
    "if", "else", "while", "for", "return", "function", "const", "class", "private", "public",
    "static", "extends", "new", "true", "false", "null", "int", "double", "float", "string",
    "bool", "boolean", "object", "auto", "void", "enum", "switch", "case", "default", "break",
    "continue",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    /// `$name`; the text excludes the sigil
    Variable,
    Integer,
    Decimal,
    /// Quoted string; the text is the unescaped contents
    String,
    Keyword,
    Operator,
    Punctuation,
    EndOfFile,
}

/// One lexical token with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
        }
    }

    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.is(TokenKind::Keyword, word)
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.is(TokenKind::Operator, op)
    }

    pub fn is_punct(&self, p: &str) -> bool {
        self.is(TokenKind::Punctuation, p)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfFile
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Variable => write!(f, "${}", self.text),
            TokenKind::String => write!(f, "{:?}", self.text),
            TokenKind::EndOfFile => f.write_str("end of input"),
            _ => f.write_str(&self.text),
        }
    }
}
