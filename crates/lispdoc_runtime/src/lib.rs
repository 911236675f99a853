//! Runtime for the lispdoc Lisp dialect.
//!
//! This crate provides the evaluator that doctest expressions run against: a global, dynamically scoped environment,
//! the special forms, a builtin function library, and [`load`] for evaluating a whole source unit before its tests
//! run.
//!
//! ## Example
//! ```rust
//! use lispdoc_runtime::Interpreter;
//! use lispdoc_syntax::{printer, reader};
//!
//! let mut interp = Interpreter::new();
//! lispdoc_runtime::load(&mut interp, "(defun twice (x) (* 2 x))").unwrap();
//! let value = interp.eval(&reader::read("(twice 21)").unwrap()).unwrap();
//! assert_eq!(printer::prin1_to_string(&value), "42");
//! ```

#![deny(clippy::unwrap_used)]

pub mod builtins;
pub mod env;
pub mod eval;
pub mod load;
pub mod signal;

mod backquote;
mod special_forms;

pub use env::Environment;
pub use eval::{EvalResult, Interpreter};
pub use load::{LoadError, load};
pub use signal::Signal;
