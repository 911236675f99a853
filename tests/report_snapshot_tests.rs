//! Snapshot tests for the console report.
//!
//! Each test runs a fixture through the engine and renders it with a colour-free [`ConsoleSink`] and a zero
//! duration, so the output is stable.

use std::path::PathBuf;
use std::time::Duration;

use lispdoc::cli::test_runner::{ConsoleSink, ReportSink};
use lispdoc::{Hooks, RunConfig, SessionSummary, Verbosity, run_session};
use lispdoc_runtime::Interpreter;

const MIXED: &str = include_str!("fixtures/mixed.el");
const ARITH: &str = include_str!("fixtures/arith.el");

/// A passing test with a two-line expression, then a failure whose actual value prints as `passed`.
const MULTILINE: &str = r#"(defun f ()
  "Doc.

>> (list 1
         2)
=> (1 2)

>> (quote passed)
=> failed"
  nil)
"#;

fn summarize(name: &str, source: &str, verbosity: Verbosity) -> SessionSummary {
    let mut interp = Interpreter::new();
    lispdoc_runtime::load(&mut interp, source).unwrap();
    let config = RunConfig::new().with_source_name(name).with_verbosity(verbosity);
    run_session(source, &mut interp, &config, Hooks::new())
}

fn render(verbosity: Verbosity, summaries: &[SessionSummary]) -> String {
    let files: Vec<PathBuf> = summaries.iter().map(|s| PathBuf::from(&s.source_name)).collect();
    let mut sink = ConsoleSink::new(Vec::new(), verbosity);
    sink.on_session_start(&files).unwrap();
    for summary in summaries {
        sink.on_file_complete(summary).unwrap();
    }
    sink.on_run_complete(summaries, Duration::ZERO).unwrap();
    String::from_utf8(sink.into_inner()).unwrap()
}

#[test]
fn test_console_report_info() {
    let summaries = [
        summarize("arith.el", ARITH, Verbosity::Info),
        summarize("mixed.el", MIXED, Verbosity::Info),
    ];
    insta::assert_snapshot!(render(Verbosity::Info, &summaries), @r#"
    =================== test session starts ===================
    collected 2 file(s)

    arith.el .....
    mixed.el .FF.

    =================== FAILURES ===================

    ___________ mixed.el ___________
        mixed.el#9: (add-one 1) => 3 but got 2
        mixed.el#16: (explode) => nil but got (error "Boom")

    first failure at mixed.el:9

    ====== 7 passed, 2 failed in 0.00s ======
    "#);
}

#[test]
fn test_console_report_verbose() {
    let summaries = [summarize("mixed.el", MIXED, Verbosity::Verbose)];
    insta::assert_snapshot!(render(Verbosity::Verbose, &summaries), @r#"
    =================== test session starts ===================
    collected 1 file(s)

    mixed.el#6: (add-one 1) PASSED
    mixed.el#9: (add-one 1) FAILED
    mixed.el#16: (explode) FAILED
    mixed.el#29: (greet "Ada") PASSED

    =================== FAILURES ===================

    ___________ mixed.el ___________
        mixed.el#9: (add-one 1) => 3 but got 2
        mixed.el#16: (explode) => nil but got (error "Boom")

    first failure at mixed.el:9

    ====== 2 passed, 2 failed in 0.00s ======
    "#);
}

#[test]
fn test_console_report_all_passing() {
    let summaries = [summarize("arith.el", ARITH, Verbosity::Info)];
    insta::assert_snapshot!(render(Verbosity::Info, &summaries), @r"
    =================== test session starts ===================
    collected 1 file(s)

    arith.el .....

    ====== 5 passed in 0.00s ======
    ");
}

#[test]
fn test_console_failures_list_failed_records_only() {
    let summaries = [summarize("b.el", MULTILINE, Verbosity::Info)];
    insta::assert_snapshot!(render(Verbosity::Info, &summaries), @r"
    =================== test session starts ===================
    collected 1 file(s)

    b.el .F

    =================== FAILURES ===================

    ___________ b.el ___________
        b.el#8: (quote passed) => failed but got passed

    first failure at b.el:8

    ====== 1 passed, 1 failed in 0.00s ======
    ");
}

#[test]
fn test_console_verbose_multiline_expression() {
    let summaries = [summarize("b.el", MULTILINE, Verbosity::Verbose)];
    insta::assert_snapshot!(render(Verbosity::Verbose, &summaries), @r"
    =================== test session starts ===================
    collected 1 file(s)

    b.el#4: (list 1 2) PASSED
    b.el#8: (quote passed) FAILED

    =================== FAILURES ===================

    ___________ b.el ___________
        b.el#8: (quote passed) => failed but got passed

    first failure at b.el:8

    ====== 1 passed, 1 failed in 0.00s ======
    ");
}
