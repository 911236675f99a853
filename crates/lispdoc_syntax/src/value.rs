//! Runtime datum.
//!
//! `Value` is what the reader produces, what the evaluator computes and what the printer renders. Conses and
//! vectors are immutable and reference-counted; cloning a `Value` is cheap.
//!
//! Functions follow the dynamic-binding convention: a lambda is just the list `(lambda ARGS . BODY)` and a macro is
//! `(macro . FUNCTION)`. Only builtins need a dedicated variant ([`Value::Subr`]).

use std::fmt;
use std::rc::Rc;

use crate::ast::{Form, Sexp};

/// A Lisp object.
#[derive(Debug, Clone)]
pub enum Value {
    /// The symbol `nil`, also the empty list.
    Nil,
    /// The symbol `t`.
    T,
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Symbol(Rc<str>),
    Cons(Rc<Cons>),
    Vector(Rc<Vec<Value>>),
    /// Builtin function, named by its registry spelling.
    Subr(&'static str),
}

/// A cons cell.
#[derive(Debug, Clone)]
pub struct Cons {
    pub car: Value,
    pub cdr: Value,
}

impl Value {
    /// Intern a symbol by name; `nil` and `t` map to their dedicated variants.
    pub fn symbol(name: &str) -> Value {
        match name {
            "nil" => Value::Nil,
            "t" => Value::T,
            _ => Value::Symbol(Rc::from(name)),
        }
    }

    pub fn string(text: &str) -> Value {
        Value::Str(Rc::from(text))
    }

    pub fn cons(car: Value, cdr: Value) -> Value {
        Value::Cons(Rc::new(Cons { car, cdr }))
    }

    pub fn bool(b: bool) -> Value {
        if b { Value::T } else { Value::Nil }
    }

    pub fn vector(items: Vec<Value>) -> Value {
        Value::Vector(Rc::new(items))
    }

    /// Build a proper list.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Value {
        Value::list_with_tail(items, Value::Nil)
    }

    /// Build a list ending in `tail` (a dotted list unless `tail` is `nil`).
    pub fn list_with_tail(items: impl IntoIterator<Item = Value>, tail: Value) -> Value {
        let items: Vec<Value> = items.into_iter().collect();
        items.into_iter().rev().fold(tail, |acc, item| Value::cons(item, acc))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Anything but `nil` is true.
    pub fn is_truthy(&self) -> bool {
        !self.is_nil()
    }

    /// Symbol name, including `nil` and `t`.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Nil => Some("nil"),
            Value::T => Some("t"),
            Value::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_symbol(&self) -> bool {
        self.as_symbol().is_some()
    }

    /// Keywords (`:foo`) evaluate to themselves.
    pub fn is_keyword(&self) -> bool {
        matches!(self, Value::Symbol(name) if name.starts_with(':'))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::Nil | Value::Cons(_))
    }

    pub fn car(&self) -> Option<&Value> {
        match self {
            Value::Cons(cell) => Some(&cell.car),
            _ => None,
        }
    }

    pub fn cdr(&self) -> Option<&Value> {
        match self {
            Value::Cons(cell) => Some(&cell.cdr),
            _ => None,
        }
    }

    /// Iterate over the cars of a list, stopping at the first non-cons tail.
    pub fn iter(&self) -> ListIter {
        ListIter { rest: self.clone() }
    }

    /// Elements of a proper list; `None` for dotted lists and non-lists.
    pub fn to_vec(&self) -> Option<Vec<Value>> {
        let mut items = Vec::new();
        let mut rest = self;
        loop {
            match rest {
                Value::Nil => return Some(items),
                Value::Cons(cell) => {
                    items.push(cell.car.clone());
                    rest = &cell.cdr;
                }
                _ => return None,
            }
        }
    }

    /// `eq`: identity for heap objects, value equality for numbers and symbols.
    pub fn is_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) | (Value::T, Value::T) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b),
            (Value::Cons(a), Value::Cons(b)) => Rc::ptr_eq(a, b),
            (Value::Vector(a), Value::Vector(b)) => Rc::ptr_eq(a, b),
            (Value::Subr(a), Value::Subr(b)) => a == b,
            _ => false,
        }
    }

    /// `equal`: structural equality.
    pub fn equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Cons(a), Value::Cons(b)) => {
                // Walk the spine iteratively so long lists do not recurse per element.
                let (mut a, mut b) = (a.clone(), b.clone());
                loop {
                    if !a.car.equal(&b.car) {
                        return false;
                    }
                    match (&a.cdr, &b.cdr) {
                        (Value::Cons(x), Value::Cons(y)) => {
                            let (x, y) = (x.clone(), y.clone());
                            a = x;
                            b = y;
                        }
                        (x, y) => return x.equal(y),
                    }
                }
            }
            (Value::Vector(a), Value::Vector(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equal(y))
            }
            _ => self.is_eq(other),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::printer::prin1_to_string(self))
    }
}

/// Iterator over list elements.
pub struct ListIter {
    rest: Value,
}

impl Iterator for ListIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let (car, cdr) = match &self.rest {
            Value::Cons(cell) => (cell.car.clone(), cell.cdr.clone()),
            _ => return None,
        };
        self.rest = cdr;
        Some(car)
    }
}

impl From<&Sexp> for Value {
    fn from(sexp: &Sexp) -> Value {
        match &sexp.node {
            Form::Int(n) => Value::Int(*n),
            Form::Float(f) => Value::Float(*f),
            Form::Str(s) => Value::string(s),
            Form::Symbol(name) => Value::symbol(name),
            Form::List { items, tail } => {
                let tail = tail.as_deref().map(Value::from).unwrap_or(Value::Nil);
                Value::list_with_tail(items.iter().map(Value::from), tail)
            }
            Form::Vector(items) => Value::vector(items.iter().map(Value::from).collect()),
        }
    }
}
