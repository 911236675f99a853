//! Definition forms that carry a documentation string.
//!
//! A documentation string is recognized purely by position: it is the string literal occupying the *doc slot* of a
//! known definition form. The slot is the 0-based element index inside the form, counting the head symbol.
//!
//! ## Examples
//! ```rust
//! use lispdoc_core::lang::definers::{self, DefinerId};
//!
//! // (defun NAME ARGS "doc" BODY...)
//! assert_eq!(definers::doc_slot_for("defun"), Some(3));
//! // (lambda ARGS "doc" BODY...)
//! assert_eq!(definers::doc_slot(DefinerId::Lambda), 2);
//! assert_eq!(definers::doc_slot_for("progn"), None);
//! ```

use super::registry::LangItemInfo;

/// Stable identifier for every documentation-carrying definition form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinerId {
    // Functions
    Defun,
    Defmacro,
    Defsubst,
    DefineInline,
    Defalias,
    Lambda,

    // Variables
    Defvar,
    DefvarLocal,
    Defconst,
    Defcustom,
    Defface,
    Defgroup,

    // Modes
    DefineMinorMode,
    DefineDerivedMode,
}

/// Registry entry: vocabulary metadata plus the element index of the doc slot.
#[derive(Debug, Clone, Copy)]
pub struct DefinerInfo {
    pub item: LangItemInfo<DefinerId>,
    pub doc_slot: usize,
}

const fn info(
    id: DefinerId,
    canonical: &'static str,
    aliases: &'static [&'static str],
    doc_slot: usize,
    description: &'static str,
) -> DefinerInfo {
    DefinerInfo {
        item: LangItemInfo {
            id,
            canonical,
            aliases,
            description,
        },
        doc_slot,
    }
}

/// Registry of documentation-carrying forms.
pub const DEFINERS: &[DefinerInfo] = &[
    info(DefinerId::Defun, "defun", &["cl-defun"], 3, "Define a function."),
    info(DefinerId::Defmacro, "defmacro", &["cl-defmacro"], 3, "Define a macro."),
    info(DefinerId::Defsubst, "defsubst", &["cl-defsubst"], 3, "Define an inline function."),
    info(DefinerId::DefineInline, "define-inline", &[], 3, "Define an inline function with a compiler macro."),
    info(DefinerId::Defalias, "defalias", &[], 3, "Define a function alias."),
    info(DefinerId::Lambda, "lambda", &[], 2, "Anonymous function."),
    info(DefinerId::Defvar, "defvar", &[], 3, "Define a dynamic variable."),
    info(DefinerId::DefvarLocal, "defvar-local", &[], 3, "Define a buffer-local variable."),
    info(DefinerId::Defconst, "defconst", &[], 3, "Define a constant."),
    info(DefinerId::Defcustom, "defcustom", &[], 3, "Define a user option."),
    info(DefinerId::Defface, "defface", &[], 3, "Define a face."),
    info(DefinerId::Defgroup, "defgroup", &[], 3, "Define a customization group."),
    info(DefinerId::DefineMinorMode, "define-minor-mode", &[], 2, "Define a minor mode."),
    info(DefinerId::DefineDerivedMode, "define-derived-mode", &[], 4, "Define a derived major mode."),
];

/// Resolve a head-symbol spelling (canonical or alias) to a definer id.
pub fn from_str(name: &str) -> Option<DefinerId> {
    DEFINERS.iter().find(|d| d.item.matches(name)).map(|d| d.item.id)
}

/// Return the canonical spelling of a definer.
pub fn as_str(id: DefinerId) -> &'static str {
    info_for(id).item.canonical
}

/// Return the doc slot of a definer.
pub fn doc_slot(id: DefinerId) -> usize {
    info_for(id).doc_slot
}

/// Return the doc slot for a head-symbol spelling, if it names a definer.
pub fn doc_slot_for(name: &str) -> Option<usize> {
    from_str(name).map(doc_slot)
}

/// Return the full registry entry for a definer.
pub fn info_for(id: DefinerId) -> &'static DefinerInfo {
    // Every id has exactly one table row (checked by the tests below).
    match DEFINERS.iter().find(|d| d.item.id == id) {
        Some(info) => info,
        None => &DEFINERS[0],
    }
}
