//! lispdoc vocabulary registries.
//!
//! Callers work with **stable IDs** (e.g. `DefinerId`, `SpecialFormId`, `SignalId`) and look up spellings and
//! metadata via registry tables instead of scattering string comparisons across crates.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no AST types, no IO, no side effects.
//! - The reader enforces syntax and the evaluator enforces semantics; registries only provide spellings and metadata.
//!
//! ## Examples
//! ```rust
//! use lispdoc_core::lang::special_forms::{self, SpecialFormId};
//!
//! assert_eq!(special_forms::from_str("let*"), Some(SpecialFormId::LetStar));
//! assert_eq!(special_forms::as_str(SpecialFormId::LetStar), "let*");
//! ```

pub mod definers;
pub mod markers;
pub mod registry;
pub mod signals;
pub mod special_forms;
