//! CLI module for lispdoc
//!
//! This module provides the command-line interface around the doctest engine.
//!
//! ## Commands
//!
//! - `test <path>...` - Load Lisp files and run the tests in their documentation strings
//! - `eval <expr>` - Read, evaluate and print one expression
//! - `list <file>` - List the test blocks of a file without running them
//!
//! ## Modules
//!
//! - `commands` - `eval` and `list`
//! - `test_runner` - Running files and reporting results
//! - `test_interfaces` - Discovery and loading boundaries
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;
pub mod test_interfaces;
pub mod test_runner;

use std::fmt;
use std::path::PathBuf;
use std::process;
use std::thread;

use clap::{Parser, Subcommand};

use crate::config::Verbosity;
use crate::version::LISPDOC_VERSION;
use test_runner::{ReportFormat, TestOptions};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// At least one test failed.
    pub const FAILURE: ExitCode = ExitCode(1);
    /// The run could not happen: unreadable file, unit failing to load, bad arguments.
    pub const ERROR: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Create an error for a run that could not happen (exit code 2).
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::ERROR)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Stack for the thread that evaluates Lisp; deep recursion in a doctest must hit the evaluator's nesting limit
/// before the native stack runs out.
const EVAL_STACK_SIZE: usize = 64 * 1024 * 1024;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run the examples in Lisp documentation strings as tests
#[derive(Parser, Debug)]
#[command(name = "lispdoc")]
#[command(version = LISPDOC_VERSION)]
#[command(about = "Run the examples in Lisp documentation strings as tests", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load Lisp files and run the tests in their documentation strings
    Test {
        /// Lisp files, or directories searched for `.el` files
        #[arg(value_name = "PATH", default_value = ".")]
        paths: Vec<PathBuf>,
        /// Narrate passing tests too
        #[arg(short, long, conflicts_with = "quiet")]
        verbose: bool,
        /// Print only the final tally
        #[arg(short, long)]
        quiet: bool,
        /// Reporting level (overridden by -v/-q)
        #[arg(long, value_enum, env = "LISPDOC_VERBOSITY", value_name = "LEVEL")]
        verbosity: Option<Verbosity>,
        /// Only run the tests of the top-level definition NAME
        #[arg(long, value_name = "NAME")]
        defun: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
        format: ReportFormat,
        /// Do not evaluate the file before running its tests
        #[arg(long)]
        no_load: bool,
    },

    /// Read, evaluate and print one expression
    Eval {
        /// Expression to evaluate
        #[arg(value_name = "EXPR")]
        expr: String,
        /// Load this file first
        #[arg(long, value_name = "FILE")]
        load: Option<PathBuf>,
    },

    /// List the test blocks of a file without running them
    List {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Command {
    /// Options for a `test` command; `None` for other commands.
    pub fn test_options(&self) -> Option<TestOptions> {
        let Command::Test {
            verbose,
            quiet,
            verbosity,
            defun,
            format,
            no_load,
            ..
        } = self
        else {
            return None;
        };
        let verbosity = if *verbose {
            Verbosity::Verbose
        } else if *quiet {
            Verbosity::Silent
        } else {
            verbosity.unwrap_or_default()
        };
        Some(TestOptions {
            verbosity,
            defun: defun.clone(),
            format: *format,
            load: !*no_load,
        })
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute_on_eval_stack(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

fn execute_on_eval_stack(cli: Cli) -> CliResult<ExitCode> {
    let handle = thread::Builder::new()
        .name("lispdoc".to_string())
        .stack_size(EVAL_STACK_SIZE)
        .spawn(move || execute(cli))
        .map_err(|e| CliError::error(format!("Error: could not start the evaluator thread: {e}")))?;
    handle
        .join()
        .map_err(|_| CliError::error("Error: the evaluator thread panicked"))?
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match &cli.command {
        Command::Test { paths, .. } => {
            let options = cli
                .command
                .test_options()
                .ok_or_else(|| CliError::error("Error: not a test command"))?;
            tracing::debug!(?options, "test options resolved");
            test_runner::run_tests(paths, &options)
        }
        Command::Eval { expr, load } => commands::eval_expression(expr, load.as_deref()),
        Command::List { file } => commands::list_blocks(file),
    }
}

// ============================================================================
// Tests
// ============================================================================
