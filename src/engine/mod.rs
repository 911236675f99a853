//! The doctest engine.
//!
//! Pipeline, per block: [`locator`] finds an input-marker line inside a documentation string, [`extractor`] delimits
//! the input expression and the expected value, [`unescape`] strips the string-literal escaping, [`normalize`]
//! evaluates and compares canonical printed forms, and [`session`] folds the outcome into the run's tally.
//!
//! ## Notes
//!
//! - Everything here is single-threaded and strictly sequential, in document order.
//! - Only errors outside the pipeline (unreadable file, unit failing to load) abort a run; the CLI handles those.

#![deny(clippy::unwrap_used)]

pub mod extractor;
pub mod locator;
pub mod normalize;
pub mod session;
pub mod unescape;

use serde::Serialize;

pub use extractor::{BoundaryRule, Extraction, StructuralError, extract};
pub use locator::{Locator, find_next};
pub use normalize::{EvalError, Evaluator, run};
pub use session::Blocks;
pub use unescape::unescape;

/// Where a test block starts in its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Location {
    /// Byte offset of the input-marker line.
    pub offset: usize,
    /// 1-based line number of `offset`.
    pub line: usize,
}

impl Location {
    /// Locate `offset` within `source`.
    pub fn in_source(source: &str, offset: usize) -> Self {
        let (line, _) = lispdoc_syntax::diagnostics::line_col(source, offset);
        Self { offset, line }
    }
}

/// One extracted test, ready for evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestBlock {
    pub location: Location,
    /// Unescaped input expression text.
    pub raw_input: String,
    /// Unescaped expected-output text.
    pub raw_expected: String,
    /// Offset the scan resumes from.
    pub end: usize,
}

impl TestBlock {
    /// Build a block from an extraction, removing string-literal escaping from both halves.
    pub fn from_extraction(source: &str, offset: usize, extraction: &Extraction) -> Self {
        Self {
            location: Location::in_source(source, offset),
            raw_input: unescape(&extraction.raw_input),
            raw_expected: unescape(&extraction.raw_expected),
            end: extraction.end,
        }
    }
}

/// Result class of one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pass,
    /// The canonical forms differ.
    Failure,
    /// Reading or evaluating raised; counts as a failure.
    EvalError,
}

impl Status {
    pub fn is_pass(self) -> bool {
        self == Status::Pass
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pass => "pass",
            Status::Failure => "failure",
            Status::EvalError => "eval-error",
        }
    }
}

/// The outcome of one test, in canonical text form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestOutcome {
    #[serde(rename = "expression")]
    pub expression_text: String,
    #[serde(rename = "expected")]
    pub expected_text: String,
    #[serde(rename = "actual")]
    pub actual_text: String,
    pub status: Status,
}

impl TestOutcome {
    pub fn is_pass(&self) -> bool {
        self.status.is_pass()
    }

    /// The expression on one line, with every whitespace run (newlines included) collapsed to a single space.
    pub fn expression_line(&self) -> String {
        self.expression_text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
