//! Canonical printer.
//!
//! [`prin1_to_string`] produces the machine-readable form: reading it back yields an `equal` value (for everything
//! except builtin function objects). It is the basis of doctest comparison, so its output must be deterministic and
//! insensitive to how the value was originally written.
//!
//! [`princ_to_string`] is the human form: strings and symbols print without quotes or escapes.

use lispdoc_core::lang::special_forms::{self, SpecialFormId};

use crate::lexer::parse_number;
use crate::value::Value;

/// Print `value` in canonical machine-readable form.
pub fn prin1_to_string(value: &Value) -> String {
    let mut printer = Printer::new(true);
    printer.print(value);
    printer.out
}

/// Print `value` in human-readable form.
pub fn princ_to_string(value: &Value) -> String {
    let mut printer = Printer::new(false);
    printer.print(value);
    printer.out
}

struct Printer {
    escape: bool,
    out: String,
}

impl Printer {
    fn new(escape: bool) -> Self {
        Self {
            escape,
            out: String::new(),
        }
    }

    fn print(&mut self, value: &Value) {
        match value {
            Value::Nil => self.out.push_str("nil"),
            Value::T => self.out.push('t'),
            Value::Int(n) => self.out.push_str(&n.to_string()),
            Value::Float(f) => self.out.push_str(&format_float(*f)),
            Value::Str(s) => self.print_string(s),
            Value::Symbol(name) => self.print_symbol(name),
            Value::Subr(name) => {
                self.out.push_str("#<subr ");
                self.out.push_str(name);
                self.out.push('>');
            }
            Value::Vector(items) => {
                self.out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push(' ');
                    }
                    self.print(item);
                }
                self.out.push(']');
            }
            Value::Cons(_) => self.print_list(value),
        }
    }

    fn print_list(&mut self, value: &Value) {
        if let Some((prefix, quoted)) = reader_abbreviation(value) {
            self.out.push_str(prefix);
            self.print(&quoted);
            return;
        }

        self.out.push('(');
        let mut first = true;
        let mut rest = value.clone();
        loop {
            match rest {
                Value::Cons(cell) => {
                    if !first {
                        self.out.push(' ');
                    }
                    first = false;
                    self.print(&cell.car);
                    rest = cell.cdr.clone();
                }
                Value::Nil => break,
                tail => {
                    self.out.push_str(" . ");
                    self.print(&tail);
                    break;
                }
            }
        }
        self.out.push(')');
    }

    fn print_string(&mut self, s: &str) {
        if !self.escape {
            self.out.push_str(s);
            return;
        }
        self.out.push('"');
        for c in s.chars() {
            if c == '"' || c == '\\' {
                self.out.push('\\');
            }
            self.out.push(c);
        }
        self.out.push('"');
    }

    fn print_symbol(&mut self, name: &str) {
        if !self.escape {
            self.out.push_str(name);
            return;
        }
        if name.is_empty() {
            self.out.push_str("##");
            return;
        }
        if name == "." || parse_number(name).is_some() {
            self.out.push('\\');
        }
        for (i, c) in name.chars().enumerate() {
            let needs_escape = c.is_whitespace()
                || matches!(c, '(' | ')' | '[' | ']' | '"' | '\'' | '`' | ',' | ';' | '\\')
                || (i == 0 && matches!(c, '#' | '?'));
            if needs_escape {
                self.out.push('\\');
            }
            self.out.push(c);
        }
    }
}

/// `(quote x)` prints as `'x`, `(function f)` as `#'f`, and so on.
fn reader_abbreviation(value: &Value) -> Option<(&'static str, Value)> {
    let items = value.to_vec()?;
    if items.len() != 2 {
        return None;
    }
    let head = items[0].as_symbol()?;
    let prefix = match (special_forms::from_str(head), head) {
        (Some(SpecialFormId::Quote), _) => "'",
        (Some(SpecialFormId::Function), _) => "#'",
        (Some(SpecialFormId::Backquote), _) => "`",
        (_, ",") => ",",
        (_, ",@") => ",@",
        _ => return None,
    };
    Some((prefix, items[1].clone()))
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        return if f.is_sign_negative() { "-0.0e+NaN" } else { "0.0e+NaN" }.to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "1.0e+INF" } else { "-1.0e+INF" }.to_string();
    }
    // Debug formatting always keeps a fractional part or an exponent (`1.0`, `1e20`, `1e-7`).
    let text = format!("{f:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{mantissa}e+{exponent}"),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read;

    fn canon(source: &str) -> String {
        prin1_to_string(&read(source).unwrap())
    }

    #[test]
    fn test_print_atoms() {
        assert_eq!(canon("12345"), "12345");
        assert_eq!(canon("-3"), "-3");
        assert_eq!(canon(":symbol"), ":symbol");
        assert_eq!(canon("t"), "t");
        assert_eq!(canon("\"A string\""), "\"A string\"");
    }

    #[test]
    fn test_print_floats() {
        assert_eq!(canon("1.0"), "1.0");
        assert_eq!(canon("0.5"), "0.5");
        assert_eq!(canon("1e20"), "1e+20");
        assert_eq!(canon("1e-7"), "1e-7");
        assert_eq!(canon("1.0e+INF"), "1.0e+INF");
        assert_eq!(canon("0.0e+NaN"), "0.0e+NaN");
    }

    #[test]
    fn test_print_string_escapes() {
        assert_eq!(canon(r#""say \"hi\" \\ now""#), r#""say \"hi\" \\ now""#);
        assert_eq!(princ_to_string(&read(r#""say \"hi\"""#).unwrap()), "say \"hi\"");
    }

    #[test]
    fn test_print_symbol_escapes() {
        assert_eq!(prin1_to_string(&Value::symbol("a b")), "a\\ b");
        assert_eq!(prin1_to_string(&Value::symbol("1")), "\\1");
        assert_eq!(prin1_to_string(&Value::symbol("")), "##");
        assert_eq!(prin1_to_string(&Value::symbol("foo?")), "foo?");
        assert_eq!(princ_to_string(&Value::symbol("a b")), "a b");
    }

    #[test]
    fn test_whitespace_is_normalized() {
        assert_eq!(canon("(  1\n   2  .  3 )"), "(1 2 . 3)");
        assert_eq!(canon("((6 quoted :symbol 12345 \"A string\") . 8310247)"), "((6 quoted :symbol 12345 \"A string\") . 8310247)");
    }

    #[test]
    fn test_quote_abbreviation_only_for_two_element_lists() {
        assert_eq!(canon("(quote a b)"), "(quote a b)");
        assert_eq!(canon("(quote)"), "(quote)");
    }

    #[test]
    fn test_subr() {
        assert_eq!(prin1_to_string(&Value::Subr("car")), "#<subr car>");
    }

    #[test]
    fn test_reader_abbreviations_survive_printing() {
        let rendered: Vec<String> = ["'x", "#'car", "`(a ,b ,@c)", "[1 (2 . 3) \"s\"]", "(a . (b . (c)))"]
            .iter()
            .map(|src| format!("{src} => {}", canon(src)))
            .collect();
        insta::assert_snapshot!(rendered.join("\n"), @r#"
        'x => 'x
        #'car => #'car
        `(a ,b ,@c) => `(a ,b ,@c)
        [1 (2 . 3) "s"] => [1 (2 . 3) "s"]
        (a . (b . (c))) => (a b c)
        "#);
    }
}
