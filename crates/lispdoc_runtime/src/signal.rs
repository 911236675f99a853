//! Signals: the runtime's error values.
//!
//! A signal is the pair `(SYMBOL . DATA)`. It prints through the canonical printer, so an evaluation error shows up in
//! a doctest report as e.g. `(void-function frob)` or `(wrong-type-argument number-or-marker-p "a")`.

use std::fmt;

use lispdoc_core::lang::signals::{self, SignalId};
use lispdoc_syntax::{ReadError, Value, printer};

/// A raised error condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub symbol: String,
    pub data: Vec<Value>,
}

impl Signal {
    /// Raise a builtin signal.
    pub fn new(id: SignalId, data: Vec<Value>) -> Self {
        Self {
            symbol: signals::as_str(id).to_string(),
            data,
        }
    }

    /// Raise an arbitrary, user-named signal.
    pub fn custom(symbol: &str, data: Vec<Value>) -> Self {
        Self {
            symbol: symbol.to_string(),
            data,
        }
    }

    pub fn symbol_name(&self) -> &str {
        &self.symbol
    }

    /// The signal as the Lisp value `(SYMBOL . DATA)`, as bound by `condition-case`.
    pub fn to_value(&self) -> Value {
        Value::list_with_tail(std::iter::once(Value::symbol(&self.symbol)), Value::list(self.data.clone()))
    }

    /// Rebuild a signal from a `condition-case` style value.
    pub fn from_value(value: &Value) -> Self {
        let generic = signals::as_str(SignalId::Error);
        match value {
            Value::Cons(cell) => Self {
                symbol: cell.car.as_symbol().unwrap_or(generic).to_string(),
                data: cell.cdr.iter().collect(),
            },
            other => Self::custom(other.as_symbol().unwrap_or(generic), Vec::new()),
        }
    }

    // ========================================================================
    // Common constructors
    // ========================================================================

    /// `(error "MESSAGE")`
    pub fn error(message: impl AsRef<str>) -> Self {
        Self::new(SignalId::Error, vec![Value::string(message.as_ref())])
    }

    /// `(wrong-type-argument PREDICATE VALUE)`
    pub fn wrong_type(predicate: &str, value: &Value) -> Self {
        Self::new(SignalId::WrongTypeArgument, vec![Value::symbol(predicate), value.clone()])
    }

    /// `(wrong-number-of-arguments FUNCTION COUNT)`
    pub fn wrong_arity(function: &Value, count: usize) -> Self {
        Self::new(
            SignalId::WrongNumberOfArguments,
            vec![function.clone(), Value::Int(count as i64)],
        )
    }

    pub fn void_function(name: &str) -> Self {
        Self::new(SignalId::VoidFunction, vec![Value::symbol(name)])
    }

    pub fn void_variable(name: &str) -> Self {
        Self::new(SignalId::VoidVariable, vec![Value::symbol(name)])
    }

    pub fn invalid_function(value: &Value) -> Self {
        Self::new(SignalId::InvalidFunction, vec![value.clone()])
    }

    pub fn setting_constant(name: &str) -> Self {
        Self::new(SignalId::SettingConstant, vec![Value::symbol(name)])
    }

    pub fn args_out_of_range(data: Vec<Value>) -> Self {
        Self::new(SignalId::ArgsOutOfRange, data)
    }

    pub fn arith_error() -> Self {
        Self::new(SignalId::ArithError, Vec::new())
    }

    pub fn overflow_error() -> Self {
        Self::new(SignalId::OverflowError, Vec::new())
    }

    /// `true` if a `condition-case` handler for `condition` catches this signal.
    ///
    /// `error` and `t` catch everything; any other symbol must match exactly.
    pub fn is_caught_by(&self, condition: &str) -> bool {
        signals::from_str(condition) == Some(SignalId::Error) || condition == "t" || condition == self.symbol
    }
}

impl From<ReadError> for Signal {
    fn from(err: ReadError) -> Self {
        let data = match &err {
            ReadError::EndOfFile { .. } => Vec::new(),
            ReadError::InvalidSyntax { found, .. } => vec![Value::string(found)],
        };
        Signal::new(err.signal(), data)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&printer::prin1_to_string(&self.to_value()))
    }
}

impl std::error::Error for Signal {}
