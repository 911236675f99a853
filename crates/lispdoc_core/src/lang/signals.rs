//! Canonical signal (error condition) vocabulary.
//!
//! The runtime raises errors as `(SYMBOL . DATA)` signals. The symbols here are the only ones the runtime raises on
//! its own; user code may signal anything via `signal`.

use super::registry::LangItemInfo;

/// Stable identifier for every builtin signal symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalId {
    Error,
    VoidFunction,
    VoidVariable,
    InvalidFunction,
    WrongTypeArgument,
    WrongNumberOfArguments,
    ArgsOutOfRange,
    ArithError,
    OverflowError,
    SettingConstant,
    EndOfFile,
    InvalidReadSyntax,
    ExcessiveLispNesting,
}

/// Metadata for a builtin signal.
pub type SignalInfo = LangItemInfo<SignalId>;

const fn info(id: SignalId, canonical: &'static str, description: &'static str) -> SignalInfo {
    LangItemInfo {
        id,
        canonical,
        aliases: &[],
        description,
    }
}

/// Registry of builtin signals.
pub const SIGNALS: &[SignalInfo] = &[
    info(SignalId::Error, "error", "Generic error raised by `error`."),
    info(SignalId::VoidFunction, "void-function", "Symbol has no function definition."),
    info(SignalId::VoidVariable, "void-variable", "Symbol has no value."),
    info(SignalId::InvalidFunction, "invalid-function", "Object in head position is not callable."),
    info(SignalId::WrongTypeArgument, "wrong-type-argument", "Argument failed a type predicate."),
    info(
        SignalId::WrongNumberOfArguments,
        "wrong-number-of-arguments",
        "Function called with the wrong arity.",
    ),
    info(SignalId::ArgsOutOfRange, "args-out-of-range", "Index outside the bounds of a sequence."),
    info(SignalId::ArithError, "arith-error", "Division by zero."),
    info(SignalId::OverflowError, "overflow-error", "Integer arithmetic overflowed."),
    info(SignalId::SettingConstant, "setting-constant", "Attempt to set `nil`, `t` or a keyword."),
    info(SignalId::EndOfFile, "end-of-file", "Reader reached the end of input inside a datum."),
    info(SignalId::InvalidReadSyntax, "invalid-read-syntax", "Reader found malformed syntax."),
    info(
        SignalId::ExcessiveLispNesting,
        "excessive-lisp-nesting",
        "Evaluation nested deeper than the configured limit.",
    ),
];

/// Return the canonical symbol name of a signal.
pub fn as_str(id: SignalId) -> &'static str {
    SIGNALS.iter().find(|s| s.id == id).map(|s| s.canonical).unwrap_or("error")
}

/// Resolve a symbol name to a builtin signal id.
pub fn from_str(name: &str) -> Option<SignalId> {
    SIGNALS.iter().find(|s| s.matches(name)).map(|s| s.id)
}
