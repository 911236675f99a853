#![forbid(unsafe_code)]
//! lispdoc: run the examples embedded in Lisp documentation strings as tests.
//!
//! A documentation string may carry test blocks:
//!
//! ```text
//! (defun double (x)
//!   "Return X doubled.
//!
//! >> (double 21)
//! => 42"
//!   (* 2 x))
//! ```
//!
//! The [`engine`] scans a source text for such blocks, evaluates each input expression, and compares the canonical
//! printed result against the expected value. The [`cli`] wraps the engine in the `lispdoc` binary.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `engine` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod engine;
pub mod version;

pub use config::{RunConfig, Verbosity};
pub use engine::{Location, Status, TestBlock, TestOutcome};
pub use engine::session::{Blocks, Hooks, SessionState, SessionSummary, finish_session, record, run_session, start_session};
