//! Session state, hooks and the scan loop.
//!
//! A run is `start_session` → `record` per evaluated block → `finish_session`. The tally is an explicit
//! [`SessionState`] value; nothing survives between runs.

use std::fmt::Write as _;
use std::ops::Range;

use serde::Serialize;

use super::extractor;
use super::locator::{self, Locator};
use super::normalize::{self, Evaluator};
use super::{Location, TestBlock, TestOutcome};
use crate::config::{RunConfig, Verbosity};

// ============================================================================
// Hooks
// ============================================================================

type TestHook<'h> = Box<dyn FnMut(&TestOutcome) + 'h>;
type FinishHook<'h> = Box<dyn FnMut() + 'h>;

/// Ordered observers of one run. Registration order is invocation order.
#[derive(Default)]
pub struct Hooks<'h> {
    post_test: Vec<TestHook<'h>>,
    end_of_run: Vec<FinishHook<'h>>,
}

impl<'h> Hooks<'h> {
    pub fn new() -> Self {
        Self {
            post_test: Vec::new(),
            end_of_run: Vec::new(),
        }
    }

    /// Call `hook` with every outcome, right after it is recorded.
    pub fn on_test(&mut self, hook: impl FnMut(&TestOutcome) + 'h) -> &mut Self {
        self.post_test.push(Box::new(hook));
        self
    }

    /// Call `hook` once after the scan, before the summary is built.
    pub fn on_finish(&mut self, hook: impl FnMut() + 'h) -> &mut Self {
        self.end_of_run.push(Box::new(hook));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.post_test.is_empty() && self.end_of_run.is_empty()
    }
}

impl std::fmt::Debug for Hooks<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("post_test", &self.post_test.len())
            .field("end_of_run", &self.end_of_run.len())
            .finish()
    }
}

// ============================================================================
// Session state
// ============================================================================

/// One recorded test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub location: Location,
    #[serde(flatten)]
    pub outcome: TestOutcome,
}

impl Record {
    /// `<source-name>#<line>: <expression> => <expected>` followed by `passed` or `but got <actual>`.
    pub fn report_line(&self, source_name: &str) -> String {
        let outcome = &self.outcome;
        let head = format!(
            "{}#{}: {} => {}",
            source_name,
            self.location.line,
            outcome.expression_line(),
            outcome.expected_text
        );
        if outcome.is_pass() {
            format!("{head} passed")
        } else {
            format!("{head} but got {}", outcome.actual_text)
        }
    }
}

/// Running tally of one run.
#[derive(Debug)]
pub struct SessionState<'h> {
    pub pass_count: usize,
    pub fail_count: usize,
    /// Location of the first non-pass outcome; latched once set.
    pub first_failure_location: Option<Location>,
    /// Append-only human-readable log.
    pub report_text: String,
    records: Vec<Record>,
    source_name: String,
    verbosity: Verbosity,
    hooks: Hooks<'h>,
}

impl<'h> SessionState<'h> {
    /// Attach the observers for this run.
    pub fn with_hooks(mut self, hooks: Hooks<'h>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn total(&self) -> usize {
        self.pass_count + self.fail_count
    }
}

/// The result of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub source_name: String,
    pub pass_count: usize,
    pub fail_count: usize,
    pub first_failure_location: Option<Location>,
    pub report_text: String,
    pub records: Vec<Record>,
}

impl SessionSummary {
    pub fn total(&self) -> usize {
        self.pass_count + self.fail_count
    }

    pub fn is_success(&self) -> bool {
        self.fail_count == 0
    }
}

/// Begin a run with zeroed counts.
pub fn start_session<'h>(config: &RunConfig) -> SessionState<'h> {
    SessionState {
        pass_count: 0,
        fail_count: 0,
        first_failure_location: None,
        report_text: String::new(),
        records: Vec::new(),
        source_name: config.source_name.clone(),
        verbosity: config.verbosity,
        hooks: Hooks::new(),
    }
}

/// Fold one outcome into the tally, log it, and notify the post-test hooks.
pub fn record(state: &mut SessionState<'_>, outcome: TestOutcome, location: Location) {
    let record = Record { location, outcome };
    if record.outcome.is_pass() {
        state.pass_count += 1;
        if state.verbosity == Verbosity::Verbose {
            let _ = writeln!(state.report_text, "{}", record.report_line(&state.source_name));
        }
    } else {
        state.fail_count += 1;
        if state.first_failure_location.is_none() {
            state.first_failure_location = Some(location);
        }
        let _ = writeln!(state.report_text, "{}", record.report_line(&state.source_name));
    }

    for hook in &mut state.hooks.post_test {
        hook(&record.outcome);
    }
    state.records.push(record);
}

/// Run the end-of-run hooks and return the tally.
pub fn finish_session(mut state: SessionState<'_>) -> SessionSummary {
    for hook in &mut state.hooks.end_of_run {
        hook();
    }
    SessionSummary {
        source_name: state.source_name,
        pass_count: state.pass_count,
        fail_count: state.fail_count,
        first_failure_location: state.first_failure_location,
        report_text: state.report_text,
        records: state.records,
    }
}

// ============================================================================
// Scan loop
// ============================================================================

/// Located, well-formed test blocks of a source, in document order.
///
/// Input markers without valid boundaries are skipped. The scan always moves forward at least one line per located
/// marker, so iteration terminates on any input.
pub struct Blocks<'a> {
    locator: Locator<'a>,
    from: usize,
    stop: usize,
}

impl<'a> Blocks<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::within(source, 0..source.len())
    }

    /// Only blocks whose input marker lies in `range`.
    pub fn within(source: &'a str, range: Range<usize>) -> Self {
        Self {
            locator: Locator::new(source),
            from: range.start.min(source.len()),
            stop: range.end.min(source.len()),
        }
    }
}

impl Iterator for Blocks<'_> {
    type Item = TestBlock;

    fn next(&mut self) -> Option<TestBlock> {
        let source = self.locator.source();
        while let Some(offset) = self.locator.find_next(self.from) {
            if offset >= self.stop {
                break;
            }
            let next_line = locator::next_line_start(source, offset);
            match extractor::extract(source, self.locator.index(), offset) {
                Ok(extraction) => {
                    let block = TestBlock::from_extraction(source, offset, &extraction);
                    self.from = block.end.max(next_line);
                    if self.from <= offset {
                        self.from = self.stop;
                    }
                    return Some(block);
                }
                Err(err) => {
                    tracing::debug!(offset, %err, "no test here");
                    if next_line <= offset {
                        break;
                    }
                    self.from = next_line;
                }
            }
        }
        self.from = self.stop;
        None
    }
}

/// Scan `source` for test blocks and run each one in document order.
///
/// Blocks without valid boundaries are skipped and counted in neither tally.
#[tracing::instrument(skip_all, fields(source = %config.source_name, source_len = source.len()))]
pub fn run_session<'h>(
    source: &str,
    evaluator: &mut dyn Evaluator,
    config: &RunConfig,
    hooks: Hooks<'h>,
) -> SessionSummary {
    let mut state = start_session(config).with_hooks(hooks);
    let blocks = match &config.scan_range {
        Some(range) => Blocks::within(source, range.clone()),
        None => Blocks::new(source),
    };

    for block in blocks {
        let outcome = normalize::run(evaluator, &block.raw_input, &block.raw_expected);
        tracing::debug!(line = block.location.line, status = outcome.status.as_str(), "test evaluated");
        record(&mut state, outcome, block.location);
    }

    let summary = finish_session(state);
    tracing::debug!(passed = summary.pass_count, failed = summary.fail_count, "doctest run finished");
    summary
}
