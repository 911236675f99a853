//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::Path;

use lispdoc_runtime::Interpreter;
use lispdoc_syntax::{printer, reader};

use super::test_interfaces::{self, DefaultUnitLoader, UnitLoader};
use super::{CliError, CliResult, ExitCode};
use crate::engine::session::Blocks;

fn read_source(path: &Path) -> CliResult<String> {
    fs::read_to_string(path).map_err(|e| CliError::error(format!("Error reading {}: {}", path.display(), e)))
}

// ============================================================================
// eval
// ============================================================================

/// Read and evaluate one expression, returning its canonical printed form.
///
/// Read errors come back rendered against the expression text; signals in their `(symbol . data)` form.
pub fn evaluate_to_string(interp: &mut Interpreter, expr: &str) -> Result<String, String> {
    let form = reader::read(expr).map_err(|err| test_interfaces::render(err, "<expr>", expr))?;
    interp
        .eval(&form)
        .map(|value| printer::prin1_to_string(&value))
        .map_err(|signal| signal.to_string())
}

/// `lispdoc eval EXPR [--load FILE]`
pub fn eval_expression(expr: &str, load: Option<&Path>) -> CliResult<ExitCode> {
    let mut interp = Interpreter::new();
    if let Some(path) = load {
        let source = read_source(path)?;
        DefaultUnitLoader
            .load_unit(&mut interp, &path.display().to_string(), &source)
            .map_err(|e| CliError::error(format!("Error: {e}")))?;
    }

    match evaluate_to_string(&mut interp, expr) {
        Ok(printed) => {
            println!("{printed}");
            Ok(ExitCode::SUCCESS)
        }
        Err(message) => Err(CliError::failure(message)),
    }
}

// ============================================================================
// list
// ============================================================================

/// One `<name>#<line>: <input>` line per located test block.
pub fn block_listing(name: &str, source: &str) -> Vec<String> {
    Blocks::new(source)
        .map(|block| format!("{}#{}: {}", name, block.location.line, block.raw_input.trim()))
        .collect()
}

/// `lispdoc list FILE`
pub fn list_blocks(path: &Path) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    let lines = block_listing(&path.display().to_string(), &source);
    if lines.is_empty() {
        tracing::warn!(file = %path.display(), "no test blocks found");
    }
    for line in lines {
        println!("{line}");
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_to_string() {
        let mut interp = Interpreter::new();
        assert_eq!(evaluate_to_string(&mut interp, "(list 1 \"two\" 'three)").unwrap(), "(1 \"two\" three)");
        assert_eq!(
            evaluate_to_string(&mut interp, "(car 1)").unwrap_err(),
            "(wrong-type-argument listp 1)"
        );
    }

    #[test]
    fn test_evaluate_unreadable_expression() {
        let mut interp = Interpreter::new();
        let message = evaluate_to_string(&mut interp, "(+ 1").unwrap_err();
        assert!(message.contains("end of file during parsing"), "{message}");
    }

    #[test]
    fn test_block_listing() {
        let source = "(defun f (x)\n  \"Doc.\n\n>> (f 1)\n=> 1\n\n>> (f\n    2)\n=> 2\"\n  x)\n";
        assert_eq!(block_listing("f.el", source), vec!["f.el#4: (f 1)", "f.el#7: (f\n    2)"]);
    }
}
