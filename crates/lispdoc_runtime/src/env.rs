//! Global, dynamically scoped environment.
//!
//! Variables use shallow binding: each symbol has one value slot; `let` and lambda parameters save the old slot on
//! a binding stack and restore it when the binding form exits, normally or through a signal. Functions live in a
//! separate namespace (a Lisp-2).

use std::collections::HashMap;

use lispdoc_syntax::Value;

/// Variable and function cells plus the binding stack.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    functions: HashMap<String, Value>,
    /// Saved slots, innermost last: `(name, previous value or unbound)`.
    bindings: Vec<(String, Option<Value>)>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a variable.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Assign the innermost binding (or the global slot).
    pub fn set_value(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn function(&self, name: &str) -> Option<&Value> {
        self.functions.get(name)
    }

    pub fn set_function(&mut self, name: &str, function: Value) {
        self.functions.insert(name.to_string(), function);
    }

    /// Depth of the binding stack, for use with [`Environment::unbind_to`].
    pub fn binding_depth(&self) -> usize {
        self.bindings.len()
    }

    /// Dynamically bind `name` to `value` until the matching `unbind_to`.
    pub fn bind(&mut self, name: &str, value: Value) {
        let previous = self.values.insert(name.to_string(), value);
        self.bindings.push((name.to_string(), previous));
    }

    /// Undo every binding made since the stack had `depth` entries.
    pub fn unbind_to(&mut self, depth: usize) {
        while self.bindings.len() > depth {
            let Some((name, previous)) = self.bindings.pop() else {
                break;
            };
            match previous {
                Some(value) => {
                    self.values.insert(name, value);
                }
                None => {
                    self.values.remove(&name);
                }
            }
        }
    }
}
