//! Special forms understood by the evaluator.
//!
//! Special forms receive their arguments unevaluated. Everything else in head position is a function or macro call.

use super::registry::LangItemInfo;

/// Stable identifier for every special form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialFormId {
    // Quoting
    Quote,
    Function,
    Backquote,

    // Control flow
    If,
    Cond,
    And,
    Or,
    When,
    Unless,
    Progn,
    Prog1,
    While,
    Dolist,
    Dotimes,
    ConditionCase,

    // Bindings
    Let,
    LetStar,
    Setq,
    Lambda,

    // Definitions
    Defun,
    Defmacro,
    Defvar,
    Defconst,
    Defcustom,
}

/// Metadata for a special form.
pub type SpecialFormInfo = LangItemInfo<SpecialFormId>;

const fn info(
    id: SpecialFormId,
    canonical: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
) -> SpecialFormInfo {
    LangItemInfo {
        id,
        canonical,
        aliases,
        description,
    }
}

/// Registry of special forms.
pub const SPECIAL_FORMS: &[SpecialFormInfo] = &[
    info(SpecialFormId::Quote, "quote", &[], "Return the argument unevaluated."),
    info(SpecialFormId::Function, "function", &[], "Return the argument as a function object."),
    info(SpecialFormId::Backquote, "`", &[], "Quasi-quote with `,` and `,@` substitution."),
    info(SpecialFormId::If, "if", &[], "Evaluate THEN or the ELSE forms depending on COND."),
    info(SpecialFormId::Cond, "cond", &[], "Evaluate the first clause whose condition is non-nil."),
    info(SpecialFormId::And, "and", &[], "Short-circuit conjunction."),
    info(SpecialFormId::Or, "or", &[], "Short-circuit disjunction."),
    info(SpecialFormId::When, "when", &[], "Evaluate BODY when COND is non-nil."),
    info(SpecialFormId::Unless, "unless", &[], "Evaluate BODY when COND is nil."),
    info(SpecialFormId::Progn, "progn", &[], "Evaluate forms in order, return the last value."),
    info(SpecialFormId::Prog1, "prog1", &[], "Evaluate forms in order, return the first value."),
    info(SpecialFormId::While, "while", &[], "Loop while TEST is non-nil."),
    info(SpecialFormId::Dolist, "dolist", &[], "Iterate over the elements of a list."),
    info(SpecialFormId::Dotimes, "dotimes", &[], "Iterate COUNT times."),
    info(SpecialFormId::ConditionCase, "condition-case", &[], "Evaluate BODYFORM, handling signals."),
    info(SpecialFormId::Let, "let", &[], "Bind variables in parallel (dynamic scope)."),
    info(SpecialFormId::LetStar, "let*", &[], "Bind variables sequentially (dynamic scope)."),
    info(SpecialFormId::Setq, "setq", &[], "Assign variables."),
    info(SpecialFormId::Lambda, "lambda", &[], "Self-quoting anonymous function."),
    info(SpecialFormId::Defun, "defun", &["cl-defun", "defsubst"], "Define a global function."),
    info(SpecialFormId::Defmacro, "defmacro", &["cl-defmacro"], "Define a global macro."),
    info(SpecialFormId::Defvar, "defvar", &["defvar-local"], "Define a variable unless already bound."),
    info(SpecialFormId::Defconst, "defconst", &[], "Define a variable unconditionally."),
    info(SpecialFormId::Defcustom, "defcustom", &[], "Define a user option (treated like `defvar`)."),
];

/// Resolve a head-symbol spelling to a special form id.
pub fn from_str(name: &str) -> Option<SpecialFormId> {
    SPECIAL_FORMS.iter().find(|s| s.matches(name)).map(|s| s.id)
}

/// Return the canonical spelling of a special form.
pub fn as_str(id: SpecialFormId) -> &'static str {
    SPECIAL_FORMS
        .iter()
        .find(|s| s.id == id)
        .map(|s| s.canonical)
        .unwrap_or("")
}
