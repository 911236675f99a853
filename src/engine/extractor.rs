//! Block extractor: delimit the input expression and the expected value of one test block.
//!
//! The input runs from the first `(` at or after the block start to the end of the line before the output-marker
//! line. The end of the expected value is decided by [`BoundaryRule::CHAIN`], tried in order; the first rule that
//! matches at or before the closing quote of the owning documentation string wins.

use lispdoc_core::lang::markers::{self, OUTPUT_MARKER};
use lispdoc_syntax::DocStringIndex;
use thiserror::Error;

use super::locator::{find_output_line, leading_whitespace, line_end};

/// Why a located block has no usable boundaries. The block is skipped, never counted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("offset {offset} is not inside a documentation string")]
    OutsideDocString { offset: usize },

    #[error("no output-marker line before the documentation string closes")]
    MissingOutput { offset: usize },

    #[error("no `(` opens the input expression before the output-marker line")]
    MissingInputForm { offset: usize },

    #[error("no boundary rule matched the expected value")]
    NoBoundary { offset: usize },
}

impl StructuralError {
    pub fn offset(&self) -> usize {
        match self {
            StructuralError::OutsideDocString { offset }
            | StructuralError::MissingOutput { offset }
            | StructuralError::MissingInputForm { offset }
            | StructuralError::NoBoundary { offset } => *offset,
        }
    }
}

/// One way the expected value can end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryRule {
    /// `=> "(...)"` or `=> \"(...)\"`: a printed compound inside a string, ended by the matching `)"`.
    QuotedForm,
    /// Another input-marker line starts the next block.
    NextBlock,
    /// A blank line.
    BlankLine,
    /// A quote followed by a newline and a space: the owner string closing before indented code.
    QuoteNewlineSpace,
    /// Any unescaped quote.
    BareQuote,
}

impl BoundaryRule {
    /// Rules in precedence order.
    pub const CHAIN: [BoundaryRule; 5] = [
        BoundaryRule::QuotedForm,
        BoundaryRule::NextBlock,
        BoundaryRule::BlankLine,
        BoundaryRule::QuoteNewlineSpace,
        BoundaryRule::BareQuote,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BoundaryRule::QuotedForm => "quoted-form",
            BoundaryRule::NextBlock => "next-block",
            BoundaryRule::BlankLine => "blank-line",
            BoundaryRule::QuoteNewlineSpace => "quote-newline-space",
            BoundaryRule::BareQuote => "bare-quote",
        }
    }

    /// End offset (exclusive) of an expected value starting at `start`, if this rule matches.
    ///
    /// `bound` is the offset of the owning string's closing quote; a match must begin at or before it.
    pub fn find(self, source: &str, start: usize, bound: usize) -> Option<usize> {
        let rest = source.get(start..)?;
        let (match_start, end) = match self {
            BoundaryRule::QuotedForm => {
                let (closer, skip) = if rest.starts_with("\\\"(") {
                    (")\\\"", 3)
                } else if rest.starts_with("\"(") {
                    (")\"", 2)
                } else {
                    return None;
                };
                let at = start + skip + rest[skip..].find(closer)?;
                (at, at + closer.len())
            }
            BoundaryRule::NextBlock => {
                let mut line_start = start + rest.find('\n')? + 1;
                loop {
                    if line_start > bound || line_start >= source.len() {
                        return None;
                    }
                    let end = line_end(source, line_start);
                    if markers::is_input_line(&source[line_start..end]) {
                        break (line_start, line_start);
                    }
                    line_start = end + 1;
                }
            }
            BoundaryRule::BlankLine => {
                let at = start + rest.find("\n\n")?;
                (at, at)
            }
            BoundaryRule::QuoteNewlineSpace => {
                let at = start + rest.find("\"\n ")?;
                (at, at)
            }
            BoundaryRule::BareQuote => {
                let at = start + find_unescaped_quote(rest)?;
                (at, at)
            }
        };
        (match_start <= bound).then_some(end)
    }
}

fn find_unescaped_quote(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Raw (still escaped) halves of one test block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub raw_input: String,
    pub raw_expected: String,
    /// Offset just past the expected value.
    pub end: usize,
    /// Rule that ended the expected value.
    pub rule: BoundaryRule,
}

/// Delimit the block whose input-marker line starts at `offset`.
pub fn extract(source: &str, index: &DocStringIndex, offset: usize) -> Result<Extraction, StructuralError> {
    let marker_line_end = line_end(source, offset);
    let marker = offset + leading_whitespace(&source[offset..marker_line_end]);
    let doc = index
        .enclosing(marker)
        .ok_or(StructuralError::OutsideDocString { offset })?;
    let bound = doc.close;

    let output_line =
        find_output_line(source, doc, marker_line_end + 1).ok_or(StructuralError::MissingOutput { offset })?;

    // The input ends before the newline that precedes the output-marker line.
    let input_end = output_line.saturating_sub(1).max(offset);
    let paren = source[offset..input_end]
        .find('(')
        .ok_or(StructuralError::MissingInputForm { offset })?;
    let raw_input = source[offset + paren..input_end].trim_end().to_string();

    let output_line_end = line_end(source, output_line);
    let value_start = output_line + leading_whitespace(&source[output_line..output_line_end]) + OUTPUT_MARKER.len();

    for rule in BoundaryRule::CHAIN {
        if let Some(end) = rule.find(source, value_start, bound) {
            tracing::debug!(offset, rule = rule.name(), "expected value delimited");
            return Ok(Extraction {
                raw_input,
                raw_expected: source[value_start..end].to_string(),
                end,
                rule,
            });
        }
    }
    Err(StructuralError::NoBoundary { offset })
}
