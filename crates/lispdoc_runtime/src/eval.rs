//! The evaluator.
//!
//! `Interpreter::eval` walks a [`Value`] directly. Symbols evaluate to their variable value, keywords and atoms to
//! themselves, and lists dispatch on their head: special forms first, then macros (expanded, then evaluated), then
//! functions (arguments evaluated left to right, then applied).

use std::collections::HashMap;

use lispdoc_core::lang::signals::SignalId;
use lispdoc_core::lang::special_forms::{self, SpecialFormId};
use lispdoc_syntax::Value;

use crate::builtins::{self, Builtin};
use crate::env::Environment;
use crate::signal::Signal;

/// Result of evaluating one form.
pub type EvalResult = Result<Value, Signal>;

/// Default limit on nested `eval` calls.
///
/// Each level costs several native frames; at this depth the evaluator needs more than a default 2 MiB thread stack,
/// so callers evaluating untrusted recursion should run on a larger stack or lower the limit.
pub const DEFAULT_MAX_DEPTH: usize = 800;

/// A Lisp evaluator with its global environment.
pub struct Interpreter {
    pub(crate) env: Environment,
    builtins: HashMap<&'static str, &'static Builtin>,
    depth: usize,
    max_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create an interpreter with every builtin installed in its function cell.
    pub fn new() -> Self {
        let mut env = Environment::new();
        let mut table = HashMap::new();
        for builtin in builtins::all() {
            env.set_function(builtin.name, Value::Subr(builtin.name));
            table.insert(builtin.name, builtin);
        }
        Self {
            env,
            builtins: table,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the nesting limit after which `excessive-lisp-nesting` is signalled.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Evaluate one form.
    pub fn eval(&mut self, form: &Value) -> EvalResult {
        match form {
            Value::Symbol(name) => {
                if form.is_keyword() {
                    return Ok(form.clone());
                }
                self.env.value(name).cloned().ok_or_else(|| Signal::void_variable(name))
            }
            Value::Cons(cell) => {
                self.depth += 1;
                let result = if self.depth > self.max_depth {
                    Err(Signal::new(SignalId::ExcessiveLispNesting, vec![Value::Int(self.max_depth as i64)]))
                } else {
                    self.eval_call(&cell.car, &cell.cdr)
                };
                self.depth -= 1;
                result
            }
            _ => Ok(form.clone()),
        }
    }

    /// Evaluate forms in order, returning the last value (`nil` for none).
    pub fn progn(&mut self, body: &Value) -> EvalResult {
        let mut last = Value::Nil;
        for form in body.iter() {
            last = self.eval(&form)?;
        }
        Ok(last)
    }

    fn eval_call(&mut self, head: &Value, args: &Value) -> EvalResult {
        if let Some(name) = head.as_symbol() {
            if let Some(id) = special_forms::from_str(name) {
                return self.eval_special(id, args);
            }
            let function = self.env.function(name).cloned().ok_or_else(|| Signal::void_function(name))?;
            if let Some(expander) = macro_function(&function) {
                let expansion = self.apply(&expander, args.iter().collect())?;
                return self.eval(&expansion);
            }
            let args = self.eval_args(args)?;
            return self.apply(&function, args);
        }

        if is_lambda(head) {
            let args = self.eval_args(args)?;
            return self.apply(head, args);
        }
        Err(Signal::invalid_function(head))
    }

    fn eval_args(&mut self, args: &Value) -> Result<Vec<Value>, Signal> {
        args.iter().map(|arg| self.eval(&arg)).collect()
    }

    /// Call a function object with already-evaluated arguments (`funcall`).
    pub fn apply(&mut self, function: &Value, args: Vec<Value>) -> EvalResult {
        match function {
            Value::Subr(name) => {
                let builtin = *self.builtins.get(name).ok_or_else(|| Signal::void_function(name))?;
                if !builtin.accepts(args.len()) {
                    return Err(Signal::wrong_arity(function, args.len()));
                }
                (builtin.func)(self, args)
            }
            Value::Symbol(_) | Value::T => {
                let name = function.as_symbol().unwrap_or_default();
                if special_forms::from_str(name).is_some() {
                    return Err(Signal::invalid_function(function));
                }
                let resolved = self.env.function(name).cloned().ok_or_else(|| Signal::void_function(name))?;
                if macro_function(&resolved).is_some() {
                    return Err(Signal::invalid_function(function));
                }
                self.apply(&resolved, args)
            }
            _ if is_lambda(function) => self.apply_lambda(function, args),
            _ => Err(Signal::invalid_function(function)),
        }
    }

    /// Bind parameters dynamically and run the body of `(lambda ARGS . BODY)`.
    fn apply_lambda(&mut self, lambda: &Value, args: Vec<Value>) -> EvalResult {
        let rest = lambda.cdr().cloned().unwrap_or(Value::Nil);
        let params = rest.car().cloned().unwrap_or(Value::Nil);
        let body = rest.cdr().cloned().unwrap_or(Value::Nil);

        let spec = ParamSpec::parse(&params)?;
        if args.len() < spec.required.len() || (spec.rest.is_none() && args.len() > spec.required.len() + spec.optional.len())
        {
            return Err(Signal::wrong_arity(lambda, args.len()));
        }

        let depth = self.env.binding_depth();
        let mut args = args.into_iter();
        for name in &spec.required {
            self.env.bind(name, args.next().unwrap_or(Value::Nil));
        }
        for name in &spec.optional {
            self.env.bind(name, args.next().unwrap_or(Value::Nil));
        }
        if let Some(name) = &spec.rest {
            self.env.bind(name, Value::list(args));
        }

        let result = self.progn(&body);
        self.env.unbind_to(depth);
        result
    }

    /// Bind `name` for the duration of `body`, restoring the previous binding afterwards.
    pub(crate) fn with_binding<F>(&mut self, bindings: Vec<(String, Value)>, body: F) -> EvalResult
    where
        F: FnOnce(&mut Self) -> EvalResult,
    {
        let depth = self.env.binding_depth();
        for (name, value) in bindings {
            self.env.bind(&name, value);
        }
        let result = body(self);
        self.env.unbind_to(depth);
        result
    }
}

/// Parsed lambda list: `(a b &optional c &rest d)`.
struct ParamSpec {
    required: Vec<String>,
    optional: Vec<String>,
    rest: Option<String>,
}

impl ParamSpec {
    fn parse(params: &Value) -> Result<Self, Signal> {
        let mut spec = ParamSpec {
            required: Vec::new(),
            optional: Vec::new(),
            rest: None,
        };
        #[derive(PartialEq)]
        enum Mode {
            Required,
            Optional,
            Rest,
        }
        let mut mode = Mode::Required;
        let Some(items) = params.to_vec() else {
            return Err(Signal::invalid_function(params));
        };
        for item in items {
            let name = item.as_symbol().ok_or_else(|| Signal::invalid_function(params))?;
            match name {
                "&optional" => mode = Mode::Optional,
                "&rest" => mode = Mode::Rest,
                _ => match mode {
                    Mode::Required => spec.required.push(name.to_string()),
                    Mode::Optional => spec.optional.push(name.to_string()),
                    Mode::Rest => spec.rest = Some(name.to_string()),
                },
            }
        }
        Ok(spec)
    }
}

/// `true` for `(lambda ARGS . BODY)`.
pub fn is_lambda(value: &Value) -> bool {
    value.car().and_then(Value::as_symbol).and_then(special_forms::from_str) == Some(SpecialFormId::Lambda)
}

/// The expander of a `(macro . FUNCTION)` cell.
pub fn macro_function(value: &Value) -> Option<Value> {
    if value.car().and_then(Value::as_symbol) == Some("macro") {
        value.cdr().cloned()
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use lispdoc_syntax::{printer, reader};

    fn eval_str(interp: &mut Interpreter, source: &str) -> Result<String, String> {
        let mut last = String::new();
        for form in reader::read_all(source).unwrap() {
            let value = interp.eval(&Value::from(&form)).map_err(|s| s.to_string())?;
            last = printer::prin1_to_string(&value);
        }
        Ok(last)
    }

    fn run(source: &str) -> Result<String, String> {
        eval_str(&mut Interpreter::new(), source)
    }

    #[test]
    fn test_self_evaluating() {
        assert_eq!(run("42").unwrap(), "42");
        assert_eq!(run(":kw").unwrap(), ":kw");
        assert_eq!(run("\"s\"").unwrap(), "\"s\"");
        assert_eq!(run("[1 a]").unwrap(), "[1 a]");
    }

    #[test]
    fn test_void_variable_and_function() {
        assert_eq!(run("undefined-var").unwrap_err(), "(void-variable undefined-var)");
        assert_eq!(run("(frobnicate 1)").unwrap_err(), "(void-function frobnicate)");
        assert_eq!(run("(1 2)").unwrap_err(), "(invalid-function 1)");
    }

    #[test]
    fn test_defun_and_call() {
        assert_eq!(run("(defun sq (x) \"Square X.\" (* x x)) (sq 7)").unwrap(), "49");
        assert_eq!(run("(defun f (a &optional b &rest c) (list a b c)) (f 1)").unwrap(), "(1 nil nil)");
        assert_eq!(run("(defun f (a &optional b &rest c) (list a b c)) (f 1 2 3 4)").unwrap(), "(1 2 (3 4))");
        assert_eq!(
            run("(defun f (a) a) (f)").unwrap_err(),
            "(wrong-number-of-arguments (lambda (a) a) 0)"
        );
    }

    #[test]
    fn test_lambda_in_head_position() {
        assert_eq!(run("((lambda (x) (+ x 1)) 2)").unwrap(), "3");
    }

    #[test]
    fn test_dynamic_scope() {
        let source = "(defvar depth 0) (defun get-depth () depth) (let ((depth 5)) (get-depth))";
        assert_eq!(run(source).unwrap(), "5");
        let mut interp = Interpreter::new();
        eval_str(&mut interp, source).unwrap();
        assert_eq!(eval_str(&mut interp, "depth").unwrap(), "0");
    }

    #[test]
    fn test_bindings_restored_after_signal() {
        let mut interp = Interpreter::new();
        eval_str(&mut interp, "(defvar x 1)").unwrap();
        assert!(eval_str(&mut interp, "(let ((x 2)) (car x))").is_err());
        assert_eq!(eval_str(&mut interp, "x").unwrap(), "1");
    }

    #[test]
    fn test_macros() {
        let source = "(defmacro my-inc (var) (list 'setq var (list '1+ var))) (defvar n 1) (my-inc n) n";
        assert_eq!(run(source).unwrap(), "2");
    }

    #[test]
    fn test_recursion_limit() {
        let mut interp = Interpreter::new().with_max_depth(50);
        let err = eval_str(&mut interp, "(defun loop-forever (n) (loop-forever (1+ n))) (loop-forever 0)").unwrap_err();
        assert_eq!(err, "(excessive-lisp-nesting 50)");
        // The depth counter unwinds with the signal.
        assert_eq!(eval_str(&mut interp, "(+ 1 1)").unwrap(), "2");
    }

    #[test]
    fn test_funcall_symbol_and_subr() {
        assert_eq!(run("(funcall 'car '(1 2))").unwrap(), "1");
        assert_eq!(run("(funcall #'+ 1 2)").unwrap(), "3");
        assert_eq!(run("(funcall 'if t 1)").unwrap_err(), "(invalid-function if)");
    }
}
