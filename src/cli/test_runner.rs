//! Test runner implementation (pytest-style)
//!
//! ## ReportSink Trait
//!
//! The runner hands every finished file to a [`ReportSink`], separating reporting from execution. Two sinks ship:
//! [`ConsoleSink`] for people and [`JsonSink`] for tools.
//!
//! ## I/O Boundaries
//!
//! Source discovery and unit loading are abstracted via traits in `test_interfaces.rs`; evaluation goes through the
//! engine's `Evaluator`.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use lispdoc_core::lang::definers;
use lispdoc_runtime::Interpreter;
use lispdoc_syntax::Sexp;
use lispdoc_syntax::reader::Reader;
use serde::Serialize;

use super::test_interfaces::{DefaultTestDiscovery, DefaultUnitLoader, SkipLoad, TestDiscovery, TestError, UnitLoader};
use super::{CliError, CliResult, ExitCode};
use crate::config::{RunConfig, Verbosity};
use crate::engine::session::{Hooks, SessionSummary, run_session};
use crate::version::LISPDOC_VERSION;

/// Output format of `lispdoc test`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Console,
    Json,
}

/// Settings shared by every file of one `lispdoc test` invocation.
#[derive(Debug, Clone, Default)]
pub struct TestOptions {
    pub verbosity: Verbosity,
    /// Narrow each file to this top-level definition
    pub defun: Option<String>,
    pub format: ReportFormat,
    /// Evaluate each file's top-level forms before its tests
    pub load: bool,
}

// ============================================================================
// Report Sink Trait
// ============================================================================

/// Trait for reporting doctest results.
///
/// Implement this trait to customize the output format.
pub trait ReportSink {
    /// Called once discovery is complete
    fn on_session_start(&mut self, _files: &[PathBuf]) -> io::Result<()> {
        Ok(())
    }

    /// Called when every block of one file has run
    fn on_file_complete(&mut self, _summary: &SessionSummary) -> io::Result<()> {
        Ok(())
    }

    /// Called when all files have run
    fn on_run_complete(&mut self, summaries: &[SessionSummary], duration: Duration) -> io::Result<()>;
}

/// Default console sink (pytest-style).
pub struct ConsoleSink<W: Write> {
    out: W,
    verbosity: Verbosity,
    color: bool,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, verbosity: Verbosity) -> Self {
        Self {
            out,
            verbosity,
            color: false,
        }
    }

    /// Emit ANSI colour codes
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn on_session_start(&mut self, files: &[PathBuf]) -> io::Result<()> {
        if self.verbosity == Verbosity::Silent {
            return Ok(());
        }
        let banner = self.paint("1", "=================== test session starts ===================");
        writeln!(self.out, "{banner}")?;
        writeln!(self.out, "collected {} file(s)", files.len())?;
        writeln!(self.out)
    }

    fn on_file_complete(&mut self, summary: &SessionSummary) -> io::Result<()> {
        match self.verbosity {
            Verbosity::Silent => Ok(()),
            Verbosity::Info => {
                let marks: String = summary
                    .records
                    .iter()
                    .map(|r| if r.outcome.is_pass() { self.paint("32", ".") } else { self.paint("31", "F") })
                    .collect();
                if marks.is_empty() {
                    writeln!(self.out, "{}", summary.source_name)
                } else {
                    writeln!(self.out, "{} {}", summary.source_name, marks)
                }
            }
            Verbosity::Verbose => {
                for record in &summary.records {
                    let status = if record.outcome.is_pass() {
                        self.paint("32", "PASSED")
                    } else {
                        self.paint("31", "FAILED")
                    };
                    writeln!(
                        self.out,
                        "{}#{}: {} {}",
                        summary.source_name,
                        record.location.line,
                        record.outcome.expression_line(),
                        status
                    )?;
                }
                Ok(())
            }
        }
    }

    fn on_run_complete(&mut self, summaries: &[SessionSummary], duration: Duration) -> io::Result<()> {
        let passed: usize = summaries.iter().map(|s| s.pass_count).sum();
        let failed: usize = summaries.iter().map(|s| s.fail_count).sum();

        if self.verbosity != Verbosity::Silent && failed > 0 {
            writeln!(self.out)?;
            let heading = self.paint("1;31", "=================== FAILURES ===================");
            writeln!(self.out, "{heading}")?;
            for summary in summaries.iter().filter(|s| !s.is_success()) {
                writeln!(self.out)?;
                let title = self.paint("1", &format!("___________ {} ___________", summary.source_name));
                writeln!(self.out, "{title}")?;
                for record in summary.records.iter().filter(|r| !r.outcome.is_pass()) {
                    writeln!(self.out, "    {}", record.report_line(&summary.source_name))?;
                }
            }
            let first = summaries
                .iter()
                .find_map(|s| s.first_failure_location.map(|location| (&s.source_name, location)));
            if let Some((source_name, location)) = first {
                writeln!(self.out)?;
                writeln!(self.out, "first failure at {}:{}", source_name, location.line)?;
            }
        }

        let mut parts = Vec::new();
        if passed > 0 {
            parts.push(format!("{passed} passed"));
        }
        if failed > 0 {
            parts.push(format!("{failed} failed"));
        }
        if parts.is_empty() {
            parts.push("no tests ran".to_string());
        }
        let color = if failed > 0 { "1;31" } else { "1;32" };
        let bar = format!("====== {} in {:.2}s ======", parts.join(", "), duration.as_secs_f64());

        writeln!(self.out)?;
        let bar = self.paint(color, &bar);
        writeln!(self.out, "{bar}")
    }
}

/// Machine-readable sink: one JSON document for the whole run.
pub struct JsonSink<W: Write> {
    out: W,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    passed: usize,
    failed: usize,
    duration_secs: f64,
    files: &'a [SessionSummary],
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn on_run_complete(&mut self, summaries: &[SessionSummary], duration: Duration) -> io::Result<()> {
        let report = JsonReport {
            version: LISPDOC_VERSION,
            passed: summaries.iter().map(|s| s.pass_count).sum(),
            failed: summaries.iter().map(|s| s.fail_count).sum(),
            duration_secs: duration.as_secs_f64(),
            files: summaries,
        };
        serde_json::to_writer_pretty(&mut self.out, &report)?;
        writeln!(self.out)
    }
}

// ============================================================================
// Running
// ============================================================================

/// Byte range of the first top-level definition form named `name`, e.g. `(defun name ...)`.
///
/// Reading stops at the first unreadable form.
pub fn definition_range(source: &str, name: &str) -> Option<Range<usize>> {
    let mut reader = Reader::new(source);
    while let Ok(Some(form)) = reader.next_datum() {
        let Some(items) = form.as_list() else {
            continue;
        };
        let is_definition = form.head_symbol().is_some_and(|head| definers::from_str(head).is_some());
        if is_definition && items.get(1).and_then(Sexp::as_symbol) == Some(name) {
            return Some(form.span.start..form.span.end);
        }
    }
    None
}

/// Load one file and run its doctests.
///
/// Returns `None` when the run is narrowed to a definition this file does not contain.
#[tracing::instrument(skip_all, fields(file = %path.display()))]
pub fn run_file(path: &Path, options: &TestOptions, loader: &dyn UnitLoader) -> Result<Option<SessionSummary>, TestError> {
    let name = path.display().to_string();
    let source = fs::read_to_string(path).map_err(|source| TestError::Read {
        path: name.clone(),
        source,
    })?;

    let mut config = RunConfig::new()
        .with_verbosity(options.verbosity)
        .with_source_name(&name);
    if let Some(defun) = &options.defun {
        let Some(range) = definition_range(&source, defun) else {
            tracing::debug!(defun = %defun, "definition not in this file");
            return Ok(None);
        };
        config = config.with_defun(defun.clone()).with_scan_range(range);
    }

    let mut interp = Interpreter::new();
    loader.load_unit(&mut interp, &name, &source)?;
    Ok(Some(run_session(&source, &mut interp, &config, Hooks::new())))
}

/// Run the doctests of every file under `paths`.
pub fn run_tests(paths: &[PathBuf], options: &TestOptions) -> CliResult<ExitCode> {
    let start_time = Instant::now();

    let discovery = DefaultTestDiscovery;
    let mut files = Vec::new();
    for path in paths {
        let found = discovery.discover_source_files(path).map_err(test_error)?;
        if found.is_empty() {
            tracing::warn!(path = %path.display(), "no Lisp source files found");
        }
        files.extend(found);
    }
    if files.is_empty() {
        return Err(test_error(TestError::NoSources(display_paths(paths))));
    }

    let stdout = io::stdout();
    let mut sink: Box<dyn ReportSink> = match options.format {
        ReportFormat::Console => {
            let color = stdout.is_terminal();
            Box::new(ConsoleSink::new(stdout, options.verbosity).with_color(color))
        }
        ReportFormat::Json => Box::new(JsonSink::new(stdout)),
    };

    let loader: &dyn UnitLoader = if options.load { &DefaultUnitLoader } else { &SkipLoad };

    sink.on_session_start(&files).map_err(write_error)?;
    let mut summaries = Vec::new();
    for file in &files {
        if let Some(summary) = run_file(file, options, loader).map_err(test_error)? {
            sink.on_file_complete(&summary).map_err(write_error)?;
            summaries.push(summary);
        }
    }

    if let Some(defun) = &options.defun {
        if summaries.is_empty() {
            return Err(test_error(TestError::UnknownDefinition {
                name: defun.clone(),
                path: display_paths(paths),
            }));
        }
    }

    sink.on_run_complete(&summaries, start_time.elapsed()).map_err(write_error)?;

    if summaries.iter().all(SessionSummary::is_success) {
        Ok(ExitCode::SUCCESS)
    } else {
        // Summary already printed
        Err(CliError::new("", ExitCode::FAILURE))
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}

fn test_error(err: TestError) -> CliError {
    CliError::error(format!("Error: {err}"))
}

fn write_error(err: io::Error) -> CliError {
    CliError::error(format!("Error writing report: {err}"))
}
