//! Whole-file doctest runs through the library API.

use std::cell::RefCell;

use lispdoc::cli::test_runner::definition_range;
use lispdoc::engine::{EvalError, Evaluator};
use lispdoc::{Blocks, Hooks, Location, RunConfig, Status, TestOutcome, Verbosity, run_session};
use lispdoc_runtime::Interpreter;
use lispdoc_syntax::Value;

const MIXED: &str = include_str!("fixtures/mixed.el");
const ARITH: &str = include_str!("fixtures/arith.el");

fn loaded(source: &str) -> Interpreter {
    let mut interp = Interpreter::new();
    lispdoc_runtime::load(&mut interp, source).unwrap();
    interp
}

fn config(name: &str) -> RunConfig {
    RunConfig::new().with_source_name(name)
}

// ============================================================================
// Tallies and report
// ============================================================================

#[test]
fn test_all_passing_file() {
    let mut interp = loaded(ARITH);
    let summary = run_session(ARITH, &mut interp, &config("arith.el"), Hooks::new());
    assert_eq!(summary.pass_count, 5, "{}", summary.report_text);
    assert_eq!(summary.fail_count, 0);
    assert!(summary.first_failure_location.is_none());
    assert!(summary.report_text.is_empty());
    assert!(summary.is_success());
}

#[test]
fn test_mixed_file_counts_and_report() {
    let mut interp = loaded(MIXED);
    let summary = run_session(MIXED, &mut interp, &config("mixed.el"), Hooks::new());

    assert_eq!(summary.pass_count, 2);
    assert_eq!(summary.fail_count, 2);
    assert_eq!(summary.first_failure_location.map(|l| l.line), Some(9));
    assert_eq!(
        summary.report_text,
        "mixed.el#9: (add-one 1) => 3 but got 2\nmixed.el#16: (explode) => nil but got (error \"Boom\")\n"
    );
}

#[test]
fn test_records_are_in_document_order() {
    let mut interp = loaded(MIXED);
    let summary = run_session(MIXED, &mut interp, &config("mixed.el"), Hooks::new());

    let lines: Vec<usize> = summary.records.iter().map(|r| r.location.line).collect();
    assert_eq!(lines, vec![6, 9, 16, 29]);
    let statuses: Vec<Status> = summary.records.iter().map(|r| r.outcome.status).collect();
    assert_eq!(statuses, vec![Status::Pass, Status::Failure, Status::EvalError, Status::Pass]);

    let locations: Vec<Location> = summary.records.iter().map(|r| r.location).collect();
    let mut sorted = locations.clone();
    sorted.sort();
    assert_eq!(locations, sorted);
}

#[test]
fn test_verbose_narrates_passes() {
    let mut interp = loaded(MIXED);
    let config = config("mixed.el").with_verbosity(Verbosity::Verbose);
    let summary = run_session(MIXED, &mut interp, &config, Hooks::new());
    let lines: Vec<&str> = summary.report_text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "mixed.el#6: (add-one 1) => 2 passed",
            "mixed.el#9: (add-one 1) => 3 but got 2",
            "mixed.el#16: (explode) => nil but got (error \"Boom\")",
            "mixed.el#29: (greet \"Ada\") => \"Hello, Ada\" passed",
        ]
    );
}

#[test]
fn test_unloaded_unit_fails_each_block_once() {
    let mut interp = Interpreter::new();
    let summary = run_session(MIXED, &mut interp, &config("mixed.el"), Hooks::new());
    assert_eq!(summary.pass_count, 0);
    assert_eq!(summary.fail_count, 4);
    assert_eq!(summary.total(), 4);
    assert!(summary.records.iter().all(|r| r.outcome.status == Status::EvalError));
    assert_eq!(summary.records[0].outcome.actual_text, "(void-function add-one)");
}

#[test]
fn test_each_run_starts_from_zero() {
    let mut interp = loaded(MIXED);
    let first = run_session(MIXED, &mut interp, &config("mixed.el"), Hooks::new());
    let second = run_session(MIXED, &mut interp, &config("mixed.el"), Hooks::new());
    assert_eq!(first, second);
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_marker_without_output_is_skipped() {
    let source = "(defun f ()\n  \"Doc.\n\n>> (f)\nNo output marker follows.\")\n";
    let summary = run_session(source, &mut Interpreter::new(), &RunConfig::new(), Hooks::new());
    assert_eq!(summary.total(), 0);
    assert!(summary.report_text.is_empty());
}

#[test]
fn test_markers_outside_documentation_strings_are_ignored() {
    let source = ";; >> (car nil)\n;; => 1\n(defvar plain (list \"x\n>> (car nil)\n=> 1\"))\n";
    assert_eq!(Blocks::new(source).count(), 0);
}

#[test]
fn test_quoted_compound_expected_value() {
    let source = "(defun f ()\n  \"Doc.\n\n>> (format \\\"%S\\\" (list 1 2))\n=> \\\"(1 2)\\\" is the printed list.\")\n";
    let blocks: Vec<_> = Blocks::new(source).collect();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].raw_input, "(format \"%S\" (list 1 2))");
    assert_eq!(blocks[0].raw_expected, "\"(1 2)\"");
    let summary = run_session(source, &mut Interpreter::new(), &RunConfig::new(), Hooks::new());
    assert_eq!(summary.pass_count, 1, "{}", summary.report_text);
}

#[test]
fn test_narrowing_to_one_definition() {
    let mut interp = loaded(MIXED);
    let range = definition_range(MIXED, "add-one").unwrap();
    let config = config("mixed.el").with_defun("add-one").with_scan_range(range);
    let summary = run_session(MIXED, &mut interp, &config, Hooks::new());
    assert_eq!(summary.pass_count, 1);
    assert_eq!(summary.fail_count, 1);

    let range = definition_range(MIXED, "greet").unwrap();
    let config = RunConfig::new().with_scan_range(range);
    let summary = run_session(MIXED, &mut interp, &config, Hooks::new());
    assert_eq!((summary.pass_count, summary.fail_count), (1, 0));
}

// ============================================================================
// Hooks and evaluators
// ============================================================================

#[test]
fn test_hooks_observe_every_outcome() {
    let mut interp = loaded(MIXED);
    let seen: RefCell<Vec<String>> = RefCell::new(Vec::new());
    let mut finished = 0;
    {
        let mut hooks = Hooks::new();
        hooks
            .on_test(|outcome: &TestOutcome| {
                let line = format!("{} {}", outcome.status.as_str(), outcome.actual_text);
                seen.borrow_mut().push(line);
            })
            .on_finish(|| finished += 1);
        run_session(MIXED, &mut interp, &config("mixed.el"), hooks);
    }
    assert_eq!(
        seen.into_inner(),
        vec!["pass 2", "failure 2", "eval-error (error \"Boom\")", "pass \"Hello, Ada\""]
    );
    assert_eq!(finished, 1);
}

/// Answers every expression with the same value, counting calls.
struct Constant {
    value: Value,
    calls: usize,
}

impl Evaluator for Constant {
    fn evaluate(&mut self, _form: &Value) -> Result<Value, EvalError> {
        self.calls += 1;
        Ok(self.value.clone())
    }
}

#[test]
fn test_custom_evaluator() {
    let mut evaluator = Constant {
        value: Value::Int(2),
        calls: 0,
    };
    let summary = run_session(MIXED, &mut evaluator, &RunConfig::new(), Hooks::new());
    assert_eq!(evaluator.calls, 4);
    // Only `(add-one 1) => 2` expects 2.
    assert_eq!(summary.pass_count, 1);
    assert_eq!(summary.fail_count, 3);
}
