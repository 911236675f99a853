//! Reader: turns source text into spanned forms and values.
//!
//! ## Entry points
//!
//! - [`read_all`]: every datum in a source unit (used when loading a file).
//! - [`read_first`]: the first complete datum, ignoring whatever follows (used for test expressions and expected
//!   values, where trailing commentary is allowed).
//! - [`read`]: [`read_first`] converted to a [`Value`].

use crate::ast::{Form, Sexp, Span};
use crate::diagnostics::ReadError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::value::Value;

/// Pull-based reader over a lexer.
pub struct Reader<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Reader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
        }
    }

    /// Byte offset just past the last token consumed.
    pub fn position(&self) -> usize {
        self.lexer.position()
    }

    /// Read the next datum, or `None` at end of input.
    pub fn next_datum(&mut self) -> Result<Option<Sexp>, ReadError> {
        let token = self.lexer.next_token()?;
        if token.kind == TokenKind::Eof {
            return Ok(None);
        }
        self.parse_datum(token).map(Some)
    }

    /// Read a datum that must exist; end of input is an `end-of-file` error anchored at `opener`.
    fn required_datum(&mut self, opener: Span) -> Result<Sexp, ReadError> {
        let token = self.lexer.next_token()?;
        if token.kind == TokenKind::Eof {
            return Err(ReadError::end_of_file(opener));
        }
        self.parse_datum(token)
    }

    fn parse_datum(&mut self, token: Token) -> Result<Sexp, ReadError> {
        let span = token.span;
        if let Some(prefix) = token.kind.prefix_symbol() {
            let inner = self.required_datum(span)?;
            let full = span.merge(inner.span);
            let head = Sexp::new(Form::Symbol(prefix.to_string()), span);
            return Ok(Sexp::new(
                Form::List {
                    items: vec![head, inner],
                    tail: None,
                },
                full,
            ));
        }

        match token.kind {
            TokenKind::Int(n) => Ok(Sexp::new(Form::Int(n), span)),
            TokenKind::Float(f) => Ok(Sexp::new(Form::Float(f), span)),
            TokenKind::Str(s) => Ok(Sexp::new(Form::Str(s), span)),
            TokenKind::Symbol(name) => Ok(Sexp::new(Form::Symbol(name), span)),
            TokenKind::LParen => self.parse_list(span),
            TokenKind::LBracket => self.parse_vector(span),
            TokenKind::RParen => Err(ReadError::invalid_syntax(")", span)),
            TokenKind::RBracket => Err(ReadError::invalid_syntax("]", span)),
            TokenKind::Dot => Err(ReadError::invalid_syntax(".", span)),
            // Prefixes were handled above; Eof never reaches here.
            _ => Err(ReadError::end_of_file(span)),
        }
    }

    fn parse_list(&mut self, open: Span) -> Result<Sexp, ReadError> {
        let mut items = Vec::new();
        loop {
            let token = self.lexer.next_token()?;
            match token.kind {
                TokenKind::RParen => {
                    return Ok(Sexp::new(Form::List { items, tail: None }, open.merge(token.span)));
                }
                TokenKind::Eof => return Err(ReadError::end_of_file(open)),
                TokenKind::Dot => {
                    if items.is_empty() {
                        return Err(ReadError::invalid_syntax(".", token.span));
                    }
                    let tail = self.required_datum(open)?;
                    let close = self.lexer.next_token()?;
                    return match close.kind {
                        TokenKind::RParen => Ok(Sexp::new(
                            Form::List {
                                items,
                                tail: Some(Box::new(tail)),
                            },
                            open.merge(close.span),
                        )),
                        TokenKind::Eof => Err(ReadError::end_of_file(open)),
                        _ => Err(ReadError::invalid_syntax(". in wrong context", token.span)),
                    };
                }
                _ => items.push(self.parse_datum(token)?),
            }
        }
    }

    fn parse_vector(&mut self, open: Span) -> Result<Sexp, ReadError> {
        let mut items = Vec::new();
        loop {
            let token = self.lexer.next_token()?;
            match token.kind {
                TokenKind::RBracket => return Ok(Sexp::new(Form::Vector(items), open.merge(token.span))),
                TokenKind::Eof => return Err(ReadError::end_of_file(open)),
                TokenKind::Dot => items.push(Sexp::new(Form::Symbol(".".to_string()), token.span)),
                _ => items.push(self.parse_datum(token)?),
            }
        }
    }
}

/// Read every datum in `source`.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn read_all(source: &str) -> Result<Vec<Sexp>, ReadError> {
    let mut reader = Reader::new(source);
    let mut forms = Vec::new();
    while let Some(form) = reader.next_datum()? {
        forms.push(form);
    }
    Ok(forms)
}

/// Read the first complete datum in `source`, returning it with the offset just past it.
///
/// Text after the datum is never examined. Empty or whitespace-only input is an `end-of-file` error.
pub fn read_first(source: &str) -> Result<(Sexp, usize), ReadError> {
    let mut reader = Reader::new(source);
    match reader.next_datum()? {
        Some(form) => Ok((form, reader.position())),
        None => Err(ReadError::end_of_file(Span::new(source.len(), source.len()))),
    }
}

/// Read the first complete datum in `source` as a value.
pub fn read(source: &str) -> Result<Value, ReadError> {
    read_first(source).map(|(form, _)| Value::from(&form))
}
