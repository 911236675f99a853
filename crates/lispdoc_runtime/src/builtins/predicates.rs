//! Type predicates, equality, vectors, symbol cells and signalling.

use lispdoc_core::lang::special_forms;
use lispdoc_syntax::Value;

use super::strings::format_string;
use super::{Builtin, int_arg, list_arg, symbol_arg};
use crate::eval::{self, EvalResult, Interpreter};
use crate::signal::Signal;

pub(super) const BUILTINS: &[Builtin] = &[
    Builtin::new("null", 1, Some(1), null),
    Builtin::new("not", 1, Some(1), null),
    Builtin::new("consp", 1, Some(1), consp),
    Builtin::new("listp", 1, Some(1), listp),
    Builtin::new("atom", 1, Some(1), atom),
    Builtin::new("stringp", 1, Some(1), stringp),
    Builtin::new("numberp", 1, Some(1), numberp),
    Builtin::new("integerp", 1, Some(1), integerp),
    Builtin::new("floatp", 1, Some(1), floatp),
    Builtin::new("symbolp", 1, Some(1), symbolp),
    Builtin::new("keywordp", 1, Some(1), keywordp),
    Builtin::new("vectorp", 1, Some(1), vectorp),
    Builtin::new("functionp", 1, Some(1), functionp),
    Builtin::new("zerop", 1, Some(1), zerop),
    Builtin::new("eq", 2, Some(2), eq),
    Builtin::new("eql", 2, Some(2), eq),
    Builtin::new("equal", 2, Some(2), equal),
    Builtin::new("vector", 0, None, vector),
    Builtin::new("aref", 2, Some(2), aref),
    Builtin::new("boundp", 1, Some(1), boundp),
    Builtin::new("fboundp", 1, Some(1), fboundp),
    Builtin::new("symbol-value", 1, Some(1), symbol_value),
    Builtin::new("symbol-function", 1, Some(1), symbol_function),
    Builtin::new("set", 2, Some(2), set),
    Builtin::new("fset", 2, Some(2), fset),
    Builtin::new("identity", 1, Some(1), identity),
    Builtin::new("error", 1, None, error),
    Builtin::new("signal", 2, Some(2), signal),
];

fn null(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(args[0].is_nil()))
}

fn consp(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(matches!(args[0], Value::Cons(_))))
}

fn listp(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(args[0].is_list()))
}

fn atom(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(!matches!(args[0], Value::Cons(_))))
}

fn stringp(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(matches!(args[0], Value::Str(_))))
}

fn numberp(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(matches!(args[0], Value::Int(_) | Value::Float(_))))
}

fn integerp(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(matches!(args[0], Value::Int(_))))
}

fn floatp(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(matches!(args[0], Value::Float(_))))
}

fn symbolp(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(args[0].is_symbol()))
}

fn keywordp(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(args[0].is_keyword()))
}

fn vectorp(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(matches!(args[0], Value::Vector(_))))
}

/// Builtins, lambdas, and symbols whose function cell holds one of those.
fn functionp(interp: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let callable = match &args[0] {
        Value::Subr(_) => true,
        Value::Symbol(name) => {
            special_forms::from_str(name).is_none()
                && interp
                    .env()
                    .function(name)
                    .is_some_and(|f| eval::macro_function(f).is_none())
        }
        other => eval::is_lambda(other),
    };
    Ok(Value::bool(callable))
}

fn zerop(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    match &args[0] {
        Value::Int(n) => Ok(Value::bool(*n == 0)),
        Value::Float(f) => Ok(Value::bool(*f == 0.0)),
        other => Err(Signal::wrong_type("numberp", other)),
    }
}

fn eq(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(args[0].is_eq(&args[1])))
}

fn equal(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(args[0].equal(&args[1])))
}

fn vector(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::vector(args))
}

/// `(aref ARRAY INDEX)` for vectors and strings.
fn aref(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let index = int_arg(&args[1])?;
    let out_of_range = || Signal::args_out_of_range(args.clone());
    let index = usize::try_from(index).map_err(|_| out_of_range())?;
    match &args[0] {
        Value::Vector(items) => items.get(index).cloned().ok_or_else(out_of_range),
        Value::Str(s) => s.chars().nth(index).map(|c| Value::Int(c as i64)).ok_or_else(out_of_range),
        other => Err(Signal::wrong_type("arrayp", other)),
    }
}

fn boundp(interp: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let name = symbol_arg(&args[0])?;
    let bound = matches!(name, "nil" | "t") || args[0].is_keyword() || interp.env().is_bound(name);
    Ok(Value::bool(bound))
}

fn fboundp(interp: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let name = symbol_arg(&args[0])?;
    Ok(Value::bool(
        special_forms::from_str(name).is_some() || interp.env().function(name).is_some(),
    ))
}

fn symbol_value(interp: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    symbol_arg(&args[0])?;
    interp.eval(&args[0])
}

fn symbol_function(interp: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let name = symbol_arg(&args[0])?;
    Ok(interp.env().function(name).cloned().unwrap_or(Value::Nil))
}

fn set(interp: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let name = symbol_arg(&args[0])?;
    if matches!(name, "nil" | "t") || args[0].is_keyword() {
        return Err(Signal::setting_constant(name));
    }
    interp.env_mut().set_value(name, args[1].clone());
    Ok(args[1].clone())
}

fn fset(interp: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let name = symbol_arg(&args[0])?;
    if name == "nil" {
        return Err(Signal::setting_constant(name));
    }
    interp.env_mut().set_function(name, args[1].clone());
    Ok(args[1].clone())
}

fn identity(_: &mut Interpreter, mut args: Vec<Value>) -> EvalResult {
    Ok(args.swap_remove(0))
}

/// `(error FORMAT &rest ARGS)`
fn error(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let template = super::string_arg(&args[0])?;
    Err(Signal::error(format_string(template, &args[1..])?))
}

/// `(signal ERROR-SYMBOL DATA)`
fn signal(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let symbol = symbol_arg(&args[0])?;
    Err(Signal::custom(symbol, list_arg(&args[1])?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lispdoc_syntax::{Value, printer, reader};

    use crate::Interpreter;

    fn eval(source: &str) -> String {
        let mut interp = Interpreter::new();
        let mut last = String::new();
        for form in reader::read_all(source).unwrap() {
            last = match interp.eval(&Value::from(&form)) {
                Ok(value) => printer::prin1_to_string(&value),
                Err(signal) => signal.to_string(),
            };
        }
        last
    }

    #[test]
    fn test_type_predicates() {
        assert_eq!(eval("(null nil)"), "t");
        assert_eq!(eval("(not 1)"), "nil");
        assert_eq!(eval("(consp '(1))"), "t");
        assert_eq!(eval("(listp nil)"), "t");
        assert_eq!(eval("(atom [1])"), "t");
        assert_eq!(eval("(stringp \"s\")"), "t");
        assert_eq!(eval("(integerp 1.0)"), "nil");
        assert_eq!(eval("(floatp 1.0)"), "t");
        assert_eq!(eval("(symbolp nil)"), "t");
        assert_eq!(eval("(keywordp :k)"), "t");
        assert_eq!(eval("(zerop 0.0)"), "t");
    }

    #[test]
    fn test_functionp() {
        assert_eq!(eval("(functionp #'car)"), "t");
        assert_eq!(eval("(functionp (lambda () 1))"), "t");
        assert_eq!(eval("(functionp 'if)"), "nil");
        assert_eq!(eval("(defmacro m () 1) (functionp 'm)"), "nil");
        assert_eq!(eval("(functionp 'undefined-thing)"), "nil");
    }

    #[test]
    fn test_equality() {
        assert_eq!(eval("(eq 'a 'a)"), "t");
        assert_eq!(eval("(eq \"a\" \"a\")"), "nil");
        assert_eq!(eval("(equal \"a\" \"a\")"), "t");
        assert_eq!(eval("(equal '(1 (2)) '(1 (2)))"), "t");
        assert_eq!(eval("(eql 1.0 1.0)"), "t");
    }

    #[test]
    fn test_vectors() {
        assert_eq!(eval("(vector 1 'a)"), "[1 a]");
        assert_eq!(eval("(aref [1 2 3] 1)"), "2");
        assert_eq!(eval("(aref \"abc\" 0)"), "97");
        assert_eq!(eval("(aref [1] 4)"), "(args-out-of-range [1] 4)");
    }

    #[test]
    fn test_symbol_cells() {
        assert_eq!(eval("(boundp 'nope)"), "nil");
        assert_eq!(eval("(defvar yes 1) (boundp 'yes)"), "t");
        assert_eq!(eval("(fboundp 'car)"), "t");
        assert_eq!(eval("(set 'x 3) (symbol-value 'x)"), "3");
        assert_eq!(eval("(fset 'kar #'car) (kar '(1))"), "1");
        assert_eq!(eval("(symbol-function 'car)"), "#<subr car>");
        assert_eq!(eval("(set t 1)"), "(setting-constant t)");
    }

    #[test]
    fn test_signalling() {
        assert_eq!(eval("(error \"Bad %s\" 'thing)"), "(error \"Bad thing\")");
        assert_eq!(eval("(signal 'my-error '(1 2))"), "(my-error 1 2)");
        assert_eq!(eval("(identity 5)"), "5");
    }
}
