//! Evaluation and canonical comparison.
//!
//! Both sides of a test are reduced to the text the canonical printer produces: the input is read, evaluated and
//! printed; the expected text is read as a literal and printed. Equal strings pass. Incidental formatting in the
//! expected text (spacing inside a list, `(a . (b))` for `(a b)`) therefore never matters.

use lispdoc_runtime::{Interpreter, Signal};
use lispdoc_syntax::{ReadError, Value, printer, reader};
use thiserror::Error;

use super::{Status, TestOutcome};

/// An evaluation failure, already rendered for the report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{description}")]
pub struct EvalError {
    pub description: String,
}

impl EvalError {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

impl From<Signal> for EvalError {
    fn from(signal: Signal) -> Self {
        EvalError::new(signal.to_string())
    }
}

/// Something that can evaluate a read form in a live environment.
pub trait Evaluator {
    fn evaluate(&mut self, form: &Value) -> Result<Value, EvalError>;
}

impl Evaluator for Interpreter {
    fn evaluate(&mut self, form: &Value) -> Result<Value, EvalError> {
        self.eval(form).map_err(EvalError::from)
    }
}

/// Read errors print like the signals the runtime raises for them.
fn describe_read_error(err: &ReadError) -> String {
    match err {
        ReadError::EndOfFile { .. } => format!("({})", err.signal_name()),
        ReadError::InvalidSyntax { found, .. } => {
            format!("({} {})", err.signal_name(), printer::prin1_to_string(&Value::string(found)))
        }
    }
}

/// Read the first datum of `text`, ignoring anything after it.
fn read_datum(text: &str) -> Result<Value, ReadError> {
    reader::read_first(text).map(|(form, _)| Value::from(&form))
}

fn canonical(value: &Value) -> String {
    printer::prin1_to_string(value).trim().to_string()
}

/// Evaluate `input_text` and compare it with `expected_text`.
///
/// Never fails: read and evaluation errors become [`Status::EvalError`] outcomes.
pub fn run(evaluator: &mut dyn Evaluator, input_text: &str, expected_text: &str) -> TestOutcome {
    let expression_text = input_text.trim().to_string();

    let actual = read_datum(input_text)
        .map_err(|err| describe_read_error(&err))
        .and_then(|form| evaluator.evaluate(&form).map_err(|err| err.description));
    let expected = read_datum(expected_text).map(|value| canonical(&value));

    let (expected_text, actual_text, status) = match (expected, actual) {
        (Err(err), _) => (
            expected_text.trim().to_string(),
            format!("unreadable expected value {}", describe_read_error(&err)),
            Status::EvalError,
        ),
        (Ok(expected), Err(description)) => (expected, description, Status::EvalError),
        (Ok(expected), Ok(value)) => {
            let actual = canonical(&value);
            let status = if actual == expected { Status::Pass } else { Status::Failure };
            (expected, actual, status)
        }
    };

    TestOutcome {
        expression_text,
        expected_text,
        actual_text,
        status,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn check(input: &str, expected: &str) -> TestOutcome {
        run(&mut Interpreter::new(), input, expected)
    }

    #[test]
    fn test_equal_forms_pass() {
        let outcome = check("(+ 1 1)", "2");
        assert_eq!(outcome.status, Status::Pass);
        assert_eq!(outcome.actual_text, "2");
    }

    #[test]
    fn test_differing_forms_fail() {
        let outcome = check("(+ 1 1)", "3");
        assert_eq!(outcome.status, Status::Failure);
        assert_eq!(outcome.expected_text, "3");
        assert_eq!(outcome.actual_text, "2");
    }

    #[test]
    fn test_expected_formatting_is_normalized() {
        let outcome = check("(list 1 2)", "(1   2)  ; trailing commentary");
        assert_eq!(outcome.status, Status::Pass);
        assert_eq!(outcome.expected_text, "(1 2)");
    }

    #[test]
    fn test_compound_value() {
        let outcome = check(
            "(cons (list 6 'quoted :symbol 12345 \"A string\") (+ 0 8310247))",
            "((6 quoted :symbol 12345 \"A string\") . 8310247)",
        );
        assert_eq!(outcome.status, Status::Pass);
        assert_eq!(outcome.actual_text, "((6 quoted :symbol 12345 \"A string\") . 8310247)");
    }

    #[test]
    fn test_eval_error_is_captured() {
        let outcome = check("(frobnicate)", "1");
        assert_eq!(outcome.status, Status::EvalError);
        assert_eq!(outcome.actual_text, "(void-function frobnicate)");
        assert_eq!(outcome.expected_text, "1");
    }

    #[test]
    fn test_unreadable_input() {
        let outcome = check("(car '(1 2)", "1");
        assert_eq!(outcome.status, Status::EvalError);
        assert_eq!(outcome.actual_text, "(end-of-file)");
    }

    #[test]
    fn test_unreadable_expected() {
        let outcome = check("(+ 1 1)", "  (2 ");
        assert_eq!(outcome.status, Status::EvalError);
        assert_eq!(outcome.expected_text, "(2");
        assert_eq!(outcome.actual_text, "unreadable expected value (end-of-file)");
    }

    #[test]
    fn test_scripted_evaluator() {
        struct Always(Value);
        impl Evaluator for Always {
            fn evaluate(&mut self, _form: &Value) -> Result<Value, EvalError> {
                Ok(self.0.clone())
            }
        }
        let outcome = run(&mut Always(Value::string("Hello world")), "(anything)", "\"Hello world\"");
        assert_eq!(outcome.status, Status::Pass);
        assert_eq!(outcome.expected_text, "\"Hello world\"");
    }
}
