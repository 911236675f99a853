//! Token types for the lispdoc lexer.

use crate::ast::Span;

/// Kind of token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ========== Delimiters ==========
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,

    // ========== Reader prefixes ==========
    Quote,     // 'x
    Function,  // #'x
    Backquote, // `x
    Comma,     // ,x
    CommaAt,   // ,@x

    // ========== Atoms ==========
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(String),

    // ========== Special ==========
    Eof,
}

impl TokenKind {
    /// Symbol a reader prefix expands to, e.g. `quote` for `'`.
    pub fn prefix_symbol(&self) -> Option<&'static str> {
        match self {
            TokenKind::Quote => Some("quote"),
            TokenKind::Function => Some("function"),
            TokenKind::Backquote => Some("`"),
            TokenKind::Comma => Some(","),
            TokenKind::CommaAt => Some(",@"),
            _ => None,
        }
    }
}

/// A token with its kind and source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Construct a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
