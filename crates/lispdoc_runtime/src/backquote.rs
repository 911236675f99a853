//! Backquote expansion.
//!
//! The template is walked directly rather than macro-expanded: `,x` is replaced by the value of `x`, `,@x` splices
//! the elements of `x` into the enclosing list or vector, and `(a . ,b)` substitutes the tail. Nested backquotes are
//! not tracked; inner unquotes are evaluated at the outermost level.

use lispdoc_syntax::Value;

use crate::eval::{EvalResult, Interpreter};
use crate::signal::Signal;

const UNQUOTE: &str = ",";
const SPLICE: &str = ",@";

pub(crate) fn expand(interp: &mut Interpreter, template: &Value) -> EvalResult {
    match template {
        Value::Cons(_) => {
            if let Some(form) = marked(template, UNQUOTE) {
                return interp.eval(&form);
            }
            if marked(template, SPLICE).is_some() {
                return Err(Signal::error("`,@' outside of a list"));
            }
            expand_list(interp, template)
        }
        Value::Vector(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items.iter() {
                expand_element(interp, item, &mut out)?;
            }
            Ok(Value::vector(out))
        }
        other => Ok(other.clone()),
    }
}

fn expand_list(interp: &mut Interpreter, list: &Value) -> EvalResult {
    let mut items = Vec::new();
    let mut rest = list.clone();
    let tail = loop {
        match &rest {
            Value::Cons(cell) => {
                if let Some(form) = marked(&rest, UNQUOTE) {
                    break interp.eval(&form)?;
                }
                expand_element(interp, &cell.car, &mut items)?;
                let next = cell.cdr.clone();
                rest = next;
            }
            atom => break atom.clone(),
        }
    };
    Ok(Value::list_with_tail(items, tail))
}

fn expand_element(interp: &mut Interpreter, item: &Value, out: &mut Vec<Value>) -> Result<(), Signal> {
    if let Some(form) = marked(item, SPLICE) {
        let spliced = interp.eval(&form)?;
        match spliced.to_vec() {
            Some(values) => out.extend(values),
            None => return Err(Signal::wrong_type("listp", &spliced)),
        }
    } else {
        out.push(expand(interp, item)?);
    }
    Ok(())
}

/// The operand of a two-element `(MARKER X)` list.
fn marked(value: &Value, marker: &str) -> Option<Value> {
    if value.car()?.as_symbol()? != marker {
        return None;
    }
    let rest = value.cdr()?;
    match rest.cdr() {
        Some(Value::Nil) => rest.car().cloned(),
        _ => None,
    }
}
