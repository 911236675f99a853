//! Shared syntax layer for lispdoc: lexer, reader, runtime datum, canonical printer and documentation-string index.
//!
//! This crate is dependency-light and reused by the runtime (which evaluates [`value::Value`]s) and by the doctest
//! engine (which needs to know where documentation strings are and how values print).
//!
//! ## Notes
//! - This crate is "syntax-only": it never evaluates anything.
//! - Definition-form vocabulary (which element of a `defun` is its docstring) comes from
//!   `lispdoc_core::lang::definers`.
//!
//! ## Examples
//! ```rust
//! use lispdoc_syntax::{printer, reader};
//!
//! let value = reader::read("( 1  2 .  (3) )").unwrap();
//! assert_eq!(printer::prin1_to_string(&value), "(1 2 3)");
//! ```

pub mod ast;
pub mod diagnostics;
pub mod doc_strings;
pub mod lexer;
pub mod printer;
pub mod reader;
pub mod value;

pub use ast::{Form, Sexp, Span, Spanned};
pub use diagnostics::ReadError;
pub use doc_strings::{DocString, DocStringIndex};
pub use value::Value;
