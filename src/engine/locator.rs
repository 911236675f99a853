//! Block locator: find the next input-marker line that starts a real test.

use lispdoc_core::lang::markers;
use lispdoc_syntax::{DocString, DocStringIndex};

/// Scanner over one source text.
///
/// Building the locator indexes the documentation strings once; [`Locator::find_next`] is then a pure query that
/// can be repeated from any position.
pub struct Locator<'a> {
    source: &'a str,
    index: DocStringIndex,
}

impl<'a> Locator<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            index: DocStringIndex::build(source),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn index(&self) -> &DocStringIndex {
        &self.index
    }

    /// Offset of the next test block's input-marker line at or after `from`.
    ///
    /// A candidate is accepted when its marker lies inside a documentation string, the string continues on the
    /// next line, and an output-marker line follows before the string closes. Rejected candidates are skipped one
    /// line at a time; a position in the middle of a line starts the scan at the following line.
    pub fn find_next(&self, from: usize) -> Option<usize> {
        let mut line_start = align_to_line(self.source, from);
        while line_start < self.source.len() {
            let line_end = line_end(self.source, line_start);
            if self.accepts(line_start, line_end) {
                return Some(line_start);
            }
            line_start = line_end + 1;
        }
        None
    }

    fn accepts(&self, line_start: usize, line_end: usize) -> bool {
        let line = &self.source[line_start..line_end];
        if !markers::is_input_line(line) {
            return false;
        }
        let marker = line_start + leading_whitespace(line);
        let Some(doc) = self.index.enclosing(marker) else {
            tracing::trace!(offset = marker, "input marker outside any documentation string");
            return false;
        };
        let next_line = line_end + 1;
        if !doc.contains(next_line) {
            return false;
        }
        find_output_line(self.source, doc, next_line).is_some()
    }
}

/// Convenience wrapper that indexes `source` and returns the next block start at or after `from`.
pub fn find_next(source: &str, from: usize) -> Option<usize> {
    Locator::new(source).find_next(from)
}

/// Start of the first output-marker line in `doc` at or after `from`.
pub(crate) fn find_output_line(source: &str, doc: &DocString, from: usize) -> Option<usize> {
    let mut line_start = from;
    while line_start < doc.close {
        let end = line_end(source, line_start);
        let line = &source[line_start..end];
        if markers::is_output_line(line) && line_start + leading_whitespace(line) < doc.close {
            return Some(line_start);
        }
        line_start = end + 1;
    }
    None
}

/// `offset` if it starts a line, else the start of the following line.
pub(crate) fn align_to_line(source: &str, offset: usize) -> usize {
    if offset == 0 || offset >= source.len() {
        return offset.min(source.len());
    }
    if source.as_bytes()[offset - 1] == b'\n' {
        return offset;
    }
    next_line_start(source, offset)
}

/// Offset of the `\n` ending the line that contains `offset` (or the end of the text).
pub(crate) fn line_end(source: &str, offset: usize) -> usize {
    source.as_bytes()[offset..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(source.len(), |i| offset + i)
}

/// Start of the line after the one containing `offset`.
pub(crate) fn next_line_start(source: &str, offset: usize) -> usize {
    (line_end(source, offset) + 1).min(source.len())
}

pub(crate) fn leading_whitespace(line: &str) -> usize {
    line.len() - line.trim_start().len()
}
