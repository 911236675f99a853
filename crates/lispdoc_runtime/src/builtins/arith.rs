//! Numbers: arithmetic and comparison.
//!
//! Integer arithmetic is checked (`overflow-error`); any float argument makes the whole operation float.

use lispdoc_syntax::Value;

use super::Builtin;
use crate::eval::{EvalResult, Interpreter};
use crate::signal::Signal;

pub(super) const BUILTINS: &[Builtin] = &[
    Builtin::new("+", 0, None, add),
    Builtin::new("-", 0, None, sub),
    Builtin::new("*", 0, None, mul),
    Builtin::new("/", 1, None, div),
    Builtin::new("%", 2, Some(2), rem),
    Builtin::new("mod", 2, Some(2), modulo),
    Builtin::new("1+", 1, Some(1), inc),
    Builtin::new("1-", 1, Some(1), dec),
    Builtin::new("abs", 1, Some(1), abs),
    Builtin::new("max", 1, None, max),
    Builtin::new("min", 1, None, min),
    Builtin::new("=", 1, None, num_eq),
    Builtin::new("/=", 2, Some(2), num_ne),
    Builtin::new("<", 1, None, lt),
    Builtin::new(">", 1, None, gt),
    Builtin::new("<=", 1, None, le),
    Builtin::new(">=", 1, None, ge),
];

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn from_value(value: &Value) -> Result<Num, Signal> {
        match value {
            Value::Int(n) => Ok(Num::Int(*n)),
            Value::Float(f) => Ok(Num::Float(*f)),
            other => Err(Signal::wrong_type("number-or-marker-p", other)),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(f) => f,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Num::Int(n) => Value::Int(n),
            Num::Float(f) => Value::Float(f),
        }
    }
}

fn numbers(args: &[Value]) -> Result<Vec<Num>, Signal> {
    args.iter().map(Num::from_value).collect()
}

/// Left fold with separate integer and float operators.
fn fold(
    init: Num,
    rest: &[Num],
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Num, Signal> {
    rest.iter().try_fold(init, |acc, &n| match (acc, n) {
        (Num::Int(a), Num::Int(b)) => int_op(a, b).map(Num::Int).ok_or_else(Signal::overflow_error),
        (a, b) => Ok(Num::Float(float_op(a.as_f64(), b.as_f64()))),
    })
}

fn add(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(fold(Num::Int(0), &numbers(&args)?, i64::checked_add, |a, b| a + b)?.into_value())
}

fn mul(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(fold(Num::Int(1), &numbers(&args)?, i64::checked_mul, |a, b| a * b)?.into_value())
}

fn sub(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let nums = numbers(&args)?;
    let result = match nums.as_slice() {
        [] => Num::Int(0),
        [Num::Int(n)] => Num::Int(n.checked_neg().ok_or_else(Signal::overflow_error)?),
        [Num::Float(f)] => Num::Float(-f),
        [first, rest @ ..] => fold(*first, rest, i64::checked_sub, |a, b| a - b)?,
    };
    Ok(result.into_value())
}

fn div(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let nums = numbers(&args)?;
    let (first, rest): (Num, &[Num]) = match nums.as_slice() {
        [only] => (Num::Int(1), std::slice::from_ref(only)),
        [first, rest @ ..] => (*first, rest),
        [] => return Err(Signal::wrong_arity(&Value::Subr("/"), 0)),
    };
    // Integer division only while every operand is an integer.
    if rest.iter().chain(std::iter::once(&first)).any(|n| matches!(n, Num::Float(_))) {
        let value = rest.iter().fold(first.as_f64(), |acc, n| acc / n.as_f64());
        return Ok(Value::Float(value));
    }
    let result = rest.iter().try_fold(first, |acc, &n| match (acc, n) {
        (Num::Int(_), Num::Int(0)) => Err(Signal::arith_error()),
        (Num::Int(a), Num::Int(b)) => a.checked_div(b).map(Num::Int).ok_or_else(Signal::overflow_error),
        (a, b) => Ok(Num::Float(a.as_f64() / b.as_f64())),
    })?;
    Ok(result.into_value())
}

fn rem(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let a = super::int_arg(&args[0])?;
    let b = super::int_arg(&args[1])?;
    if b == 0 {
        return Err(Signal::arith_error());
    }
    a.checked_rem(b).map(Value::Int).ok_or_else(Signal::overflow_error)
}

fn modulo(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    match (Num::from_value(&args[0])?, Num::from_value(&args[1])?) {
        (Num::Int(_), Num::Int(0)) => Err(Signal::arith_error()),
        (Num::Int(a), Num::Int(b)) => {
            let r = a.checked_rem(b).ok_or_else(Signal::overflow_error)?;
            // Result takes the sign of the divisor.
            Ok(Value::Int(if r != 0 && (r < 0) != (b < 0) { r + b } else { r }))
        }
        (a, b) => {
            let (a, b) = (a.as_f64(), b.as_f64());
            let r = a % b;
            Ok(Value::Float(if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r }))
        }
    }
}

fn inc(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(fold(Num::from_value(&args[0])?, &[Num::Int(1)], i64::checked_add, |a, b| a + b)?.into_value())
}

fn dec(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(fold(Num::from_value(&args[0])?, &[Num::Int(1)], i64::checked_sub, |a, b| a - b)?.into_value())
}

fn abs(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    match Num::from_value(&args[0])? {
        Num::Int(n) => n.checked_abs().map(Value::Int).ok_or_else(Signal::overflow_error),
        Num::Float(f) => Ok(Value::Float(f.abs())),
    }
}

fn extremum(args: &[Value], pick_second: fn(f64, f64) -> bool) -> EvalResult {
    let nums = numbers(args)?;
    let any_float = nums.iter().any(|n| matches!(n, Num::Float(_)));
    let mut best = nums[0];
    for &n in &nums[1..] {
        if pick_second(best.as_f64(), n.as_f64()) {
            best = n;
        }
    }
    Ok(if any_float { Value::Float(best.as_f64()) } else { best.into_value() })
}

fn max(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    extremum(&args, |best, n| n > best)
}

fn min(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    extremum(&args, |best, n| n < best)
}

/// `true` when `ok(a, b)` holds for every adjacent pair.
fn chain(args: &[Value], ok: fn(&Num, &Num) -> bool) -> EvalResult {
    let nums = numbers(args)?;
    Ok(Value::bool(nums.windows(2).all(|pair| ok(&pair[0], &pair[1]))))
}

fn compare(a: &Num, b: &Num) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Num::Int(a), Num::Int(b)) => Some(a.cmp(b)),
        _ => a.as_f64().partial_cmp(&b.as_f64()),
    }
}

fn num_eq(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    chain(&args, |a, b| compare(a, b).is_some_and(|o| o.is_eq()))
}

fn num_ne(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    chain(&args, |a, b| !compare(a, b).is_some_and(|o| o.is_eq()))
}

fn lt(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    chain(&args, |a, b| compare(a, b).is_some_and(|o| o.is_lt()))
}

fn gt(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    chain(&args, |a, b| compare(a, b).is_some_and(|o| o.is_gt()))
}

fn le(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    chain(&args, |a, b| compare(a, b).is_some_and(|o| o.is_le()))
}

fn ge(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    chain(&args, |a, b| compare(a, b).is_some_and(|o| o.is_ge()))
}
