//! Provide the canonical, pure vocabulary shared by the lispdoc reader, runtime and doctest engine.
//!
//! This crate is intentionally small and dependency-free. It answers questions such as "which spelling marks a test
//! input line?", "which element of a `defvar` form holds its documentation?" or "what is the canonical symbol for a
//! division-by-zero signal?" so that the syntax crate, the evaluator and the engine never disagree.
//!
//! ## Notes
//!
//! - This is a "vocabulary core" crate: **no IO**, no global state, no syntax or runtime types.

pub mod lang;
