//! Special-form evaluation.
//!
//! Each form receives its argument list unevaluated, as the `cdr` of the calling form.

use lispdoc_core::lang::special_forms::{self, SpecialFormId};
use lispdoc_syntax::Value;

use crate::backquote;
use crate::eval::{EvalResult, Interpreter};
use crate::signal::Signal;

impl Interpreter {
    pub(crate) fn eval_special(&mut self, id: SpecialFormId, args: &Value) -> EvalResult {
        let argv: Vec<Value> = args.iter().collect();
        match id {
            SpecialFormId::Quote | SpecialFormId::Function => {
                expect_args(id, &argv, 1, Some(1))?;
                Ok(argv[0].clone())
            }
            SpecialFormId::Backquote => {
                expect_args(id, &argv, 1, Some(1))?;
                backquote::expand(self, &argv[0])
            }
            SpecialFormId::If => {
                expect_args(id, &argv, 2, None)?;
                if self.eval(&argv[0])?.is_truthy() {
                    self.eval(&argv[1])
                } else {
                    self.progn(&nthcdr(args, 2))
                }
            }
            SpecialFormId::Cond => self.eval_cond(&argv),
            SpecialFormId::And => {
                let mut last = Value::T;
                for form in &argv {
                    last = self.eval(form)?;
                    if last.is_nil() {
                        break;
                    }
                }
                Ok(last)
            }
            SpecialFormId::Or => {
                for form in &argv {
                    let value = self.eval(form)?;
                    if value.is_truthy() {
                        return Ok(value);
                    }
                }
                Ok(Value::Nil)
            }
            SpecialFormId::When | SpecialFormId::Unless => {
                expect_args(id, &argv, 1, None)?;
                let test = self.eval(&argv[0])?.is_truthy();
                if test == (id == SpecialFormId::When) {
                    self.progn(&nthcdr(args, 1))
                } else {
                    Ok(Value::Nil)
                }
            }
            SpecialFormId::Progn => self.progn(args),
            SpecialFormId::Prog1 => {
                expect_args(id, &argv, 1, None)?;
                let first = self.eval(&argv[0])?;
                self.progn(&nthcdr(args, 1))?;
                Ok(first)
            }
            SpecialFormId::While => {
                expect_args(id, &argv, 1, None)?;
                let body = nthcdr(args, 1);
                while self.eval(&argv[0])?.is_truthy() {
                    self.progn(&body)?;
                }
                Ok(Value::Nil)
            }
            SpecialFormId::Dolist => self.eval_dolist(&argv, &nthcdr(args, 1)),
            SpecialFormId::Dotimes => self.eval_dotimes(&argv, &nthcdr(args, 1)),
            SpecialFormId::ConditionCase => self.eval_condition_case(&argv),
            SpecialFormId::Let => self.eval_let(&argv, &nthcdr(args, 1), false),
            SpecialFormId::LetStar => self.eval_let(&argv, &nthcdr(args, 1), true),
            SpecialFormId::Setq => self.eval_setq(&argv),
            SpecialFormId::Lambda => Ok(Value::cons(Value::symbol("lambda"), args.clone())),
            SpecialFormId::Defun | SpecialFormId::Defmacro => {
                expect_args(id, &argv, 2, None)?;
                let name = symbol_arg(&argv[0])?;
                let body = strip_declarations(&nthcdr(args, 2));
                let lambda = Value::cons(Value::symbol("lambda"), Value::cons(argv[1].clone(), body));
                let function = if id == SpecialFormId::Defmacro {
                    Value::cons(Value::symbol("macro"), lambda)
                } else {
                    lambda
                };
                self.env.set_function(name, function);
                Ok(argv[0].clone())
            }
            SpecialFormId::Defvar | SpecialFormId::Defcustom | SpecialFormId::Defconst => {
                expect_args(id, &argv, 1, None)?;
                let name = symbol_arg(&argv[0])?;
                check_settable(name)?;
                let always = id == SpecialFormId::Defconst;
                if argv.len() > 1 && (always || !self.env.is_bound(name)) {
                    let value = self.eval(&argv[1])?;
                    self.env.set_value(name, value);
                }
                Ok(argv[0].clone())
            }
        }
    }

    fn eval_cond(&mut self, clauses: &[Value]) -> EvalResult {
        for clause in clauses {
            let Some(test) = clause.car() else {
                return Err(Signal::wrong_type("listp", clause));
            };
            let value = self.eval(test)?;
            if value.is_truthy() {
                let body = clause.cdr().cloned().unwrap_or(Value::Nil);
                return if body.is_nil() { Ok(value) } else { self.progn(&body) };
            }
        }
        Ok(Value::Nil)
    }

    /// `(dolist (VAR LIST [RESULT]) BODY...)`
    fn eval_dolist(&mut self, argv: &[Value], body: &Value) -> EvalResult {
        let spec = loop_spec(SpecialFormId::Dolist, argv)?;
        let var = symbol_arg(&spec[0])?.to_string();
        let list = self.eval(&spec[1])?;
        if !list.is_list() {
            return Err(Signal::wrong_type("listp", &list));
        }
        let items: Vec<Value> = list.iter().collect();
        self.with_binding(vec![(var.clone(), Value::Nil)], |interp| {
            for item in items {
                interp.env.set_value(&var, item);
                interp.progn(body)?;
            }
            interp.env.set_value(&var, Value::Nil);
            match spec.get(2) {
                Some(result) => interp.eval(result),
                None => Ok(Value::Nil),
            }
        })
    }

    /// `(dotimes (VAR COUNT [RESULT]) BODY...)`
    fn eval_dotimes(&mut self, argv: &[Value], body: &Value) -> EvalResult {
        let spec = loop_spec(SpecialFormId::Dotimes, argv)?;
        let var = symbol_arg(&spec[0])?.to_string();
        let count_value = self.eval(&spec[1])?;
        let count = count_value
            .as_int()
            .ok_or_else(|| Signal::wrong_type("integerp", &count_value))?;
        self.with_binding(vec![(var.clone(), Value::Int(0))], |interp| {
            for i in 0..count.max(0) {
                interp.env.set_value(&var, Value::Int(i));
                interp.progn(body)?;
            }
            interp.env.set_value(&var, Value::Int(count.max(0)));
            match spec.get(2) {
                Some(result) => interp.eval(result),
                None => Ok(Value::Nil),
            }
        })
    }

    /// `(condition-case VAR BODYFORM (CONDITION HANDLER...)...)`
    fn eval_condition_case(&mut self, argv: &[Value]) -> EvalResult {
        expect_args(SpecialFormId::ConditionCase, argv, 2, None)?;
        let var = symbol_arg(&argv[0])?.to_string();
        let handlers = &argv[2..];

        let (outcome, bound) = match self.eval(&argv[1]) {
            Ok(value) => match handlers.iter().find(|h| h.car().and_then(Value::as_symbol) == Some(":success")) {
                Some(handler) => (handler.clone(), value),
                None => return Ok(value),
            },
            Err(signal) => {
                let handler = handlers.iter().find(|handler| {
                    let Some(conditions) = handler.car() else {
                        return false;
                    };
                    match conditions {
                        Value::Cons(_) => conditions
                            .iter()
                            .any(|c| c.as_symbol().is_some_and(|name| signal.is_caught_by(name))),
                        other => other.as_symbol().is_some_and(|name| name != "nil" && signal.is_caught_by(name)),
                    }
                });
                match handler {
                    Some(handler) => (handler.clone(), signal.to_value()),
                    None => return Err(signal),
                }
            }
        };

        let body = outcome.cdr().cloned().unwrap_or(Value::Nil);
        if var == "nil" {
            self.progn(&body)
        } else {
            self.with_binding(vec![(var, bound)], |interp| interp.progn(&body))
        }
    }

    fn eval_let(&mut self, argv: &[Value], body: &Value, sequential: bool) -> EvalResult {
        let id = if sequential { SpecialFormId::LetStar } else { SpecialFormId::Let };
        expect_args(id, argv, 1, None)?;
        let Some(specs) = argv[0].to_vec() else {
            return Err(Signal::wrong_type("listp", &argv[0]));
        };

        let depth = self.env.binding_depth();
        let mut pending = Vec::with_capacity(specs.len());
        for spec in &specs {
            let bound = self.let_binding(spec);
            let (name, value) = match bound {
                Ok(pair) => pair,
                Err(signal) => {
                    self.env.unbind_to(depth);
                    return Err(signal);
                }
            };
            if sequential {
                self.env.bind(&name, value);
            } else {
                pending.push((name, value));
            }
        }
        for (name, value) in pending {
            self.env.bind(&name, value);
        }

        let result = self.progn(body);
        self.env.unbind_to(depth);
        result
    }

    /// One `let` binding spec: `VAR`, `(VAR)` or `(VAR VALUE)`.
    fn let_binding(&mut self, spec: &Value) -> Result<(String, Value), Signal> {
        let (name, value) = match spec {
            Value::Cons(cell) => {
                let name = symbol_arg(&cell.car)?.to_string();
                let value = match cell.cdr.car() {
                    Some(form) => self.eval(form)?,
                    None => Value::Nil,
                };
                (name, value)
            }
            other => (symbol_arg(other)?.to_string(), Value::Nil),
        };
        check_settable(&name)?;
        Ok((name, value))
    }

    fn eval_setq(&mut self, argv: &[Value]) -> EvalResult {
        if argv.len() % 2 != 0 {
            return Err(Signal::wrong_arity(&Value::symbol("setq"), argv.len()));
        }
        let mut last = Value::Nil;
        for pair in argv.chunks(2) {
            let name = symbol_arg(&pair[0])?;
            check_settable(name)?;
            last = self.eval(&pair[1])?;
            self.env.set_value(name, last.clone());
        }
        Ok(last)
    }
}

fn expect_args(id: SpecialFormId, argv: &[Value], min: usize, max: Option<usize>) -> Result<(), Signal> {
    if argv.len() < min || max.is_some_and(|max| argv.len() > max) {
        return Err(Signal::wrong_arity(&Value::symbol(special_forms::as_str(id)), argv.len()));
    }
    Ok(())
}

fn symbol_arg(value: &Value) -> Result<&str, Signal> {
    value.as_symbol().ok_or_else(|| Signal::wrong_type("symbolp", value))
}

/// `nil`, `t` and keywords cannot be bound or assigned.
fn check_settable(name: &str) -> Result<(), Signal> {
    if name == "nil" || name == "t" || name.starts_with(':') {
        return Err(Signal::setting_constant(name));
    }
    Ok(())
}

fn nthcdr(list: &Value, n: usize) -> Value {
    let mut rest = list.clone();
    for _ in 0..n {
        rest = rest.cdr().cloned().unwrap_or(Value::Nil);
    }
    rest
}

/// The `(VAR EXPR [RESULT])` header shared by `dolist` and `dotimes`.
fn loop_spec(id: SpecialFormId, argv: &[Value]) -> Result<Vec<Value>, Signal> {
    expect_args(id, argv, 1, None)?;
    match argv[0].to_vec() {
        Some(spec) if (2..=3).contains(&spec.len()) => Ok(spec),
        _ => Err(Signal::wrong_type("listp", &argv[0])),
    }
}

/// Drop leading `(declare ...)` and `(interactive ...)` forms, keeping a docstring in place.
fn strip_declarations(body: &Value) -> Value {
    let items: Vec<Value> = body.iter().collect();
    let doc = usize::from(items.len() > 1 && matches!(items.first(), Some(Value::Str(_))));
    let is_declaration = |form: &Value| matches!(form.car().and_then(Value::as_symbol), Some("declare" | "interactive"));
    let mut kept: Vec<Value> = items[..doc].to_vec();
    kept.extend(items[doc..].iter().skip_while(|form| is_declaration(*form)).cloned());
    Value::list(kept)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use lispdoc_syntax::{printer, reader};

    fn run(source: &str) -> Result<String, String> {
        let mut interp = Interpreter::new();
        let mut last = String::new();
        for form in reader::read_all(source).unwrap() {
            let value = interp.eval(&Value::from(&form)).map_err(|s| s.to_string())?;
            last = printer::prin1_to_string(&value);
        }
        Ok(last)
    }

    #[test]
    fn test_quote_and_function() {
        assert_eq!(run("'(a b)").unwrap(), "(a b)");
        assert_eq!(run("#'car").unwrap(), "car");
        assert_eq!(run("(quote)").unwrap_err(), "(wrong-number-of-arguments quote 0)");
    }

    #[test]
    fn test_conditionals() {
        assert_eq!(run("(if nil 1 2 3)").unwrap(), "3");
        assert_eq!(run("(if t 1 2)").unwrap(), "1");
        assert_eq!(run("(cond ((= 1 2) 'a) ((+ 1 1)))").unwrap(), "2");
        assert_eq!(run("(cond (nil 1))").unwrap(), "nil");
        assert_eq!(run("(and 1 2 3)").unwrap(), "3");
        assert_eq!(run("(and)").unwrap(), "t");
        assert_eq!(run("(or nil 2)").unwrap(), "2");
        assert_eq!(run("(when t 1 2)").unwrap(), "2");
        assert_eq!(run("(unless t 1)").unwrap(), "nil");
    }

    #[test]
    fn test_sequencing_and_loops() {
        assert_eq!(run("(prog1 1 2 3)").unwrap(), "1");
        assert_eq!(run("(defvar n 0) (while (< n 5) (setq n (1+ n))) n").unwrap(), "5");
        assert_eq!(run("(defvar acc nil) (dolist (x '(1 2 3) acc) (setq acc (cons x acc)))").unwrap(), "(3 2 1)");
        assert_eq!(run("(defvar sum 0) (dotimes (i 4 sum) (setq sum (+ sum i)))").unwrap(), "6");
    }

    #[test]
    fn test_let_forms() {
        assert_eq!(run("(let ((x 1) (y 2)) (+ x y))").unwrap(), "3");
        assert_eq!(run("(let* ((x 1) (y (+ x 1))) y)").unwrap(), "2");
        assert_eq!(run("(let ((x 1)) (let ((x 2) (y x)) y))").unwrap(), "1");
        assert_eq!(run("(let (x (y)) (list x y))").unwrap(), "(nil nil)");
        assert_eq!(run("(let ((t 1)) t)").unwrap_err(), "(setting-constant t)");
    }

    #[test]
    fn test_setq() {
        assert_eq!(run("(setq a 1 b 2) (list a b)").unwrap(), "(1 2)");
        assert_eq!(run("(setq :k 1)").unwrap_err(), "(setting-constant :k)");
        assert_eq!(run("(setq a)").unwrap_err(), "(wrong-number-of-arguments setq 1)");
    }

    #[test]
    fn test_definitions() {
        assert_eq!(run("(defun f () \"Doc.\" (interactive) 7) (f)").unwrap(), "7");
        assert_eq!(run("(defun f () \"Only a docstring.\") (f)").unwrap(), "\"Only a docstring.\"");
        assert_eq!(run("(defvar v 1) (defvar v 2) v").unwrap(), "1");
        assert_eq!(run("(defconst c 1) (defconst c 2) c").unwrap(), "2");
        assert_eq!(run("(defcustom opt 'a \"Doc.\" :type 'symbol) opt").unwrap(), "a");
        assert_eq!(run("(lambda (x) x)").unwrap(), "(lambda (x) x)");
    }

    #[test]
    fn test_condition_case() {
        assert_eq!(run("(condition-case err (car 1) (error err))").unwrap(), "(wrong-type-argument listp 1)");
        assert_eq!(run("(condition-case nil (/ 1 0) (arith-error 'div))").unwrap(), "div");
        assert_eq!(run("(condition-case nil (/ 1 0) ((void-variable arith-error) 'caught))").unwrap(), "caught");
        assert_eq!(run("(condition-case nil (car 1) (arith-error 'no))").unwrap_err(), "(wrong-type-argument listp 1)");
        assert_eq!(run("(condition-case v (+ 1 2) (:success (* v 10)))").unwrap(), "30");
        assert_eq!(run("(condition-case nil (signal 'my-error '(1)) (my-error 'mine))").unwrap(), "mine");
    }
}
