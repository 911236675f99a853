//! Read errors with source context.
//!
//! Read errors are ordinary values: the doctest engine turns them into failure outcomes, the runtime turns them into
//! `end-of-file` / `invalid-read-syntax` signals, and the CLI renders them through `miette` with the offending
//! source line highlighted.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use lispdoc_core::lang::signals::{self, SignalId};

use crate::ast::Span;

/// A failure to read one datum.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ReadError {
    /// Input ended inside a datum (unclosed list, string or prefix).
    #[error("end of file during parsing")]
    #[diagnostic(code(lispdoc::read::end_of_file), help("check for an unbalanced parenthesis or quote"))]
    EndOfFile {
        #[label("datum starts here")]
        at: SourceSpan,
    },

    /// Malformed syntax such as a stray `)` or a misplaced `.`.
    #[error("invalid read syntax: {found}")]
    #[diagnostic(code(lispdoc::read::invalid_syntax))]
    InvalidSyntax {
        found: String,
        #[label("unexpected token")]
        at: SourceSpan,
    },
}

impl ReadError {
    pub fn end_of_file(span: Span) -> Self {
        ReadError::EndOfFile {
            at: (span.start, span.len()).into(),
        }
    }

    pub fn invalid_syntax(found: impl Into<String>, span: Span) -> Self {
        ReadError::InvalidSyntax {
            found: found.into(),
            at: (span.start, span.len()).into(),
        }
    }

    /// Source range the error points at.
    pub fn span(&self) -> Span {
        let at = match self {
            ReadError::EndOfFile { at } | ReadError::InvalidSyntax { at, .. } => at,
        };
        Span::new(at.offset(), at.offset() + at.len())
    }

    /// Signal the runtime raises for this error.
    pub fn signal(&self) -> SignalId {
        match self {
            ReadError::EndOfFile { .. } => SignalId::EndOfFile,
            ReadError::InvalidSyntax { .. } => SignalId::InvalidReadSyntax,
        }
    }

    /// Canonical signal symbol name, e.g. `end-of-file`.
    pub fn signal_name(&self) -> &'static str {
        signals::as_str(self.signal())
    }

    /// Shift the reported span, for errors raised while reading a slice of a larger text.
    pub fn offset_by(self, base: usize) -> Self {
        let span = self.span();
        let shifted = Span::new(span.start + base, span.end + base);
        match self {
            ReadError::EndOfFile { .. } => ReadError::end_of_file(shifted),
            ReadError::InvalidSyntax { found, .. } => ReadError::invalid_syntax(found, shifted),
        }
    }
}

/// Return the 1-based line number and column for a byte offset.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..floor_char_boundary(source, offset)];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let col = before[line_start..].chars().count() + 1;
    (line, col)
}

fn floor_char_boundary(source: &str, mut offset: usize) -> usize {
    while offset > 0 && !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_round_trip() {
        let err = ReadError::invalid_syntax(")", Span::new(4, 5));
        assert_eq!(err.span(), Span::new(4, 5));
        assert_eq!(err.signal_name(), "invalid-read-syntax");
        assert_eq!(err.to_string(), "invalid read syntax: )");
    }

    #[test]
    fn test_offset_by() {
        let err = ReadError::end_of_file(Span::new(0, 1)).offset_by(10);
        assert_eq!(err.span(), Span::new(10, 11));
        assert_eq!(err.signal_name(), "end-of-file");
    }

    #[test]
    fn test_line_col() {
        let src = "ab\ncd\nef";
        assert_eq!(line_col(src, 0), (1, 1));
        assert_eq!(line_col(src, 3), (2, 1));
        assert_eq!(line_col(src, 7), (3, 2));
        assert_eq!(line_col(src, 100), (3, 3));
    }
}
