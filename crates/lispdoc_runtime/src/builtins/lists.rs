//! Conses, lists and higher-order functions.

use lispdoc_syntax::Value;

use super::{Builtin, int_arg, list_arg, sequence_arg};
use crate::eval::{EvalResult, Interpreter};
use crate::signal::Signal;

pub(super) const BUILTINS: &[Builtin] = &[
    Builtin::new("cons", 2, Some(2), cons),
    Builtin::new("car", 1, Some(1), car),
    Builtin::new("cdr", 1, Some(1), cdr),
    Builtin::new("car-safe", 1, Some(1), car_safe),
    Builtin::new("cdr-safe", 1, Some(1), cdr_safe),
    Builtin::new("list", 0, None, list),
    Builtin::new("length", 1, Some(1), length),
    Builtin::new("nth", 2, Some(2), nth),
    Builtin::new("nthcdr", 2, Some(2), nthcdr),
    Builtin::new("append", 0, None, append),
    Builtin::new("reverse", 1, Some(1), reverse),
    Builtin::new("nreverse", 1, Some(1), reverse),
    Builtin::new("last", 1, Some(1), last),
    Builtin::new("member", 2, Some(2), member),
    Builtin::new("memq", 2, Some(2), memq),
    Builtin::new("assoc", 2, Some(2), assoc),
    Builtin::new("assq", 2, Some(2), assq),
    Builtin::new("number-sequence", 1, Some(3), number_sequence),
    Builtin::new("mapcar", 2, Some(2), mapcar),
    Builtin::new("mapc", 2, Some(2), mapc),
    Builtin::new("funcall", 1, None, funcall),
    Builtin::new("apply", 1, None, apply),
];

fn cons(_: &mut Interpreter, mut args: Vec<Value>) -> EvalResult {
    let cdr = args.pop().unwrap_or(Value::Nil);
    let car = args.pop().unwrap_or(Value::Nil);
    Ok(Value::cons(car, cdr))
}

fn car(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    match &args[0] {
        Value::Nil => Ok(Value::Nil),
        Value::Cons(cell) => Ok(cell.car.clone()),
        other => Err(Signal::wrong_type("listp", other)),
    }
}

fn cdr(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    match &args[0] {
        Value::Nil => Ok(Value::Nil),
        Value::Cons(cell) => Ok(cell.cdr.clone()),
        other => Err(Signal::wrong_type("listp", other)),
    }
}

fn car_safe(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(args[0].car().cloned().unwrap_or(Value::Nil))
}

fn cdr_safe(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(args[0].cdr().cloned().unwrap_or(Value::Nil))
}

fn list(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::list(args))
}

fn length(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let len = match &args[0] {
        Value::Str(s) => s.chars().count(),
        Value::Vector(items) => items.len(),
        other => list_arg(other)?.len(),
    };
    Ok(Value::Int(len as i64))
}

/// Walk `n` cdrs, stopping early at `nil`.
fn drop_n(list: &Value, n: i64) -> Result<Value, Signal> {
    let mut rest = list.clone();
    for _ in 0..n.max(0) {
        rest = match &rest {
            Value::Nil => return Ok(Value::Nil),
            Value::Cons(cell) => cell.cdr.clone(),
            other => return Err(Signal::wrong_type("listp", other)),
        };
    }
    Ok(rest)
}

fn nth(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let rest = drop_n(&args[1], int_arg(&args[0])?)?;
    match &rest {
        Value::Nil => Ok(Value::Nil),
        Value::Cons(cell) => Ok(cell.car.clone()),
        other => Err(Signal::wrong_type("listp", other)),
    }
}

fn nthcdr(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    drop_n(&args[1], int_arg(&args[0])?)
}

/// All arguments but the last are copied; the last becomes the shared tail.
fn append(_: &mut Interpreter, mut args: Vec<Value>) -> EvalResult {
    let Some(tail) = args.pop() else {
        return Ok(Value::Nil);
    };
    let mut items = Vec::new();
    for arg in &args {
        items.extend(sequence_arg(arg)?);
    }
    Ok(Value::list_with_tail(items, tail))
}

fn reverse(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    match &args[0] {
        Value::Vector(items) => Ok(Value::vector(items.iter().rev().cloned().collect())),
        Value::Str(s) => Ok(Value::string(&s.chars().rev().collect::<String>())),
        other => Ok(Value::list(list_arg(other)?.into_iter().rev())),
    }
}

fn last(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let mut rest = args[0].clone();
    loop {
        let next = match &rest {
            Value::Cons(cell) if matches!(cell.cdr, Value::Cons(_)) => cell.cdr.clone(),
            Value::Cons(_) | Value::Nil => return Ok(rest),
            other => return Err(Signal::wrong_type("listp", other)),
        };
        rest = next;
    }
}

/// The first tail of `list` whose car satisfies `matches`.
fn find_tail(list: &Value, matches: impl Fn(&Value) -> bool) -> EvalResult {
    let mut rest = list.clone();
    loop {
        let next = match &rest {
            Value::Nil => return Ok(Value::Nil),
            Value::Cons(cell) if matches(&cell.car) => return Ok(rest.clone()),
            Value::Cons(cell) => cell.cdr.clone(),
            other => return Err(Signal::wrong_type("listp", other)),
        };
        rest = next;
    }
}

fn member(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    find_tail(&args[1], |item| item.equal(&args[0]))
}

fn memq(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    find_tail(&args[1], |item| item.is_eq(&args[0]))
}

/// The first element of an alist whose car satisfies `matches`; non-cons elements are skipped.
fn find_entry(alist: &Value, matches: impl Fn(&Value) -> bool) -> EvalResult {
    for entry in list_arg(alist)? {
        if entry.car().is_some_and(&matches) {
            return Ok(entry);
        }
    }
    Ok(Value::Nil)
}

fn assoc(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    find_entry(&args[1], |key| key.equal(&args[0]))
}

fn assq(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    find_entry(&args[1], |key| key.is_eq(&args[0]))
}

/// `(number-sequence FROM &optional TO STEP)`
fn number_sequence(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let from = int_arg(&args[0])?;
    let to = match args.get(1) {
        None | Some(Value::Nil) => return Ok(Value::list([Value::Int(from)])),
        Some(to) => int_arg(to)?,
    };
    let step = match args.get(2) {
        None | Some(Value::Nil) => 1,
        Some(step) => int_arg(step)?,
    };
    if step == 0 {
        return Err(Signal::error("The increment can not be zero"));
    }
    let mut items = Vec::new();
    let mut n = from;
    while (step > 0 && n <= to) || (step < 0 && n >= to) {
        items.push(Value::Int(n));
        n = match n.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(Value::list(items))
}

fn mapcar(interp: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let mut out = Vec::new();
    for item in sequence_arg(&args[1])? {
        out.push(interp.apply(&args[0], vec![item])?);
    }
    Ok(Value::list(out))
}

fn mapc(interp: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    for item in sequence_arg(&args[1])? {
        interp.apply(&args[0], vec![item])?;
    }
    Ok(args[1].clone())
}

fn funcall(interp: &mut Interpreter, mut args: Vec<Value>) -> EvalResult {
    let function = args.remove(0);
    interp.apply(&function, args)
}

/// `(apply FUNCTION ARG... LIST)`: the last argument is spread.
fn apply(interp: &mut Interpreter, mut args: Vec<Value>) -> EvalResult {
    let function = args.remove(0);
    if let Some(spread) = args.pop() {
        args.extend(list_arg(&spread)?);
    }
    interp.apply(&function, args)
}
