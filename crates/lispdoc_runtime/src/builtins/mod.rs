//! Builtin function library.
//!
//! Builtins receive evaluated arguments. Arity is checked by the interpreter before the call, so each
//! implementation may index `args` up to `min_args` freely.

mod arith;
mod lists;
mod predicates;
mod strings;

use lispdoc_syntax::Value;

use crate::eval::{EvalResult, Interpreter};
use crate::signal::Signal;

/// Native implementation of a builtin.
pub type BuiltinFn = fn(&mut Interpreter, Vec<Value>) -> EvalResult;

/// A builtin function and its arity.
pub struct Builtin {
    pub name: &'static str,
    pub min_args: usize,
    /// `None` for `&rest` builtins.
    pub max_args: Option<usize>,
    pub func: BuiltinFn,
}

impl Builtin {
    pub const fn new(name: &'static str, min_args: usize, max_args: Option<usize>, func: BuiltinFn) -> Self {
        Self {
            name,
            min_args,
            max_args,
            func,
        }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.is_none_or(|max| count <= max)
    }
}

const TABLES: &[&[Builtin]] = &[arith::BUILTINS, lists::BUILTINS, strings::BUILTINS, predicates::BUILTINS];

/// Every builtin, grouped by area.
pub fn all() -> impl Iterator<Item = &'static Builtin> {
    TABLES.iter().flat_map(|table| table.iter())
}

/// Look up a builtin by name.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    all().find(|builtin| builtin.name == name)
}

// ============================================================================
// Argument helpers
// ============================================================================

pub(crate) fn int_arg(value: &Value) -> Result<i64, Signal> {
    value.as_int().ok_or_else(|| Signal::wrong_type("integerp", value))
}

pub(crate) fn string_arg(value: &Value) -> Result<&str, Signal> {
    value.as_str().ok_or_else(|| Signal::wrong_type("stringp", value))
}

pub(crate) fn symbol_arg(value: &Value) -> Result<&str, Signal> {
    value.as_symbol().ok_or_else(|| Signal::wrong_type("symbolp", value))
}

/// Elements of a proper list.
pub(crate) fn list_arg(value: &Value) -> Result<Vec<Value>, Signal> {
    value.to_vec().ok_or_else(|| Signal::wrong_type("listp", value))
}

/// Elements of a list, vector or string (characters as integers).
pub(crate) fn sequence_arg(value: &Value) -> Result<Vec<Value>, Signal> {
    match value {
        Value::Vector(items) => Ok(items.as_ref().clone()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::Int(c as i64)).collect()),
        other => other.to_vec().ok_or_else(|| Signal::wrong_type("sequencep", other)),
    }
}
