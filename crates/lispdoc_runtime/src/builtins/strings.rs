//! Strings, characters and symbol names.

use lispdoc_syntax::{Value, printer};

use super::{Builtin, int_arg, list_arg, sequence_arg, string_arg, symbol_arg};
use crate::eval::{EvalResult, Interpreter};
use crate::signal::Signal;

pub(super) const BUILTINS: &[Builtin] = &[
    Builtin::new("concat", 0, None, concat),
    Builtin::new("substring", 1, Some(3), substring),
    Builtin::new("upcase", 1, Some(1), upcase),
    Builtin::new("downcase", 1, Some(1), downcase),
    Builtin::new("string=", 2, Some(2), string_eq),
    Builtin::new("string-equal", 2, Some(2), string_eq),
    Builtin::new("string<", 2, Some(2), string_lt),
    Builtin::new("string-lessp", 2, Some(2), string_lt),
    Builtin::new("string-prefix-p", 2, Some(2), string_prefix_p),
    Builtin::new("string-suffix-p", 2, Some(2), string_suffix_p),
    Builtin::new("string-trim", 1, Some(1), string_trim),
    Builtin::new("string-to-number", 1, Some(1), string_to_number),
    Builtin::new("number-to-string", 1, Some(1), number_to_string),
    Builtin::new("string-join", 1, Some(2), string_join),
    Builtin::new("split-string", 1, Some(3), split_string),
    Builtin::new("format", 1, None, format),
    Builtin::new("symbol-name", 1, Some(1), symbol_name),
    Builtin::new("intern", 1, Some(1), intern),
    Builtin::new("prin1-to-string", 1, Some(2), prin1_to_string),
];

/// Text of a string or symbol argument, as accepted by the comparison functions.
fn text_arg(value: &Value) -> Result<String, Signal> {
    match value {
        Value::Str(s) => Ok(s.to_string()),
        other => other
            .as_symbol()
            .map(str::to_string)
            .ok_or_else(|| Signal::wrong_type("stringp", other)),
    }
}

fn char_arg(value: &Value) -> Result<char, Signal> {
    let code = int_arg(value)?;
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| Signal::wrong_type("characterp", value))
}

fn concat(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let mut out = String::new();
    for arg in &args {
        match arg {
            Value::Str(s) => out.push_str(s),
            other => {
                for item in sequence_arg(other)? {
                    out.push(char_arg(&item)?);
                }
            }
        }
    }
    Ok(Value::string(&out))
}

/// Resolve a possibly negative index against `len`.
fn resolve_index(index: &Value, default: usize, len: usize, args: &[Value]) -> Result<usize, Signal> {
    let index = match index {
        Value::Nil => return Ok(default),
        other => int_arg(other)?,
    };
    let resolved = if index < 0 { len as i64 + index } else { index };
    if resolved < 0 || resolved > len as i64 {
        return Err(Signal::args_out_of_range(args.to_vec()));
    }
    Ok(resolved as usize)
}

/// `(substring STRING &optional FROM TO)` in characters.
fn substring(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let chars: Vec<char> = string_arg(&args[0])?.chars().collect();
    let from = resolve_index(args.get(1).unwrap_or(&Value::Nil), 0, chars.len(), &args)?;
    let to = resolve_index(args.get(2).unwrap_or(&Value::Nil), chars.len(), chars.len(), &args)?;
    if from > to {
        return Err(Signal::args_out_of_range(args.to_vec()));
    }
    Ok(Value::string(&chars[from..to].iter().collect::<String>()))
}

fn map_case(value: &Value, upper: bool) -> EvalResult {
    match value {
        Value::Str(s) => Ok(Value::string(&if upper { s.to_uppercase() } else { s.to_lowercase() })),
        Value::Int(_) => {
            let c = char_arg(value)?;
            let mapped = if upper {
                c.to_uppercase().next()
            } else {
                c.to_lowercase().next()
            };
            Ok(Value::Int(mapped.unwrap_or(c) as i64))
        }
        other => Err(Signal::wrong_type("char-or-string-p", other)),
    }
}

fn upcase(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    map_case(&args[0], true)
}

fn downcase(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    map_case(&args[0], false)
}

fn string_eq(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(text_arg(&args[0])? == text_arg(&args[1])?))
}

fn string_lt(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(text_arg(&args[0])? < text_arg(&args[1])?))
}

fn string_prefix_p(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(string_arg(&args[1])?.starts_with(string_arg(&args[0])?)))
}

fn string_suffix_p(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::bool(string_arg(&args[1])?.ends_with(string_arg(&args[0])?)))
}

fn string_trim(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::string(string_arg(&args[0])?.trim()))
}

/// Parse the longest numeric prefix after leading whitespace; `0` when there is none.
fn string_to_number(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let text = string_arg(&args[0])?.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let int_end = end;
    if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
        end += 1;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
    }
    if end > digits_start && matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            while bytes.get(exp).is_some_and(u8::is_ascii_digit) {
                exp += 1;
            }
            end = exp;
        }
    }

    if end == int_end {
        if int_end == digits_start {
            return Ok(Value::Int(0));
        }
        return match text[..int_end].parse::<i64>() {
            Ok(n) => Ok(Value::Int(n)),
            Err(_) => Ok(Value::Float(text[..int_end].parse::<f64>().unwrap_or(0.0))),
        };
    }
    Ok(Value::Float(text[..end].parse::<f64>().unwrap_or(0.0)))
}

fn number_to_string(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    match &args[0] {
        number @ (Value::Int(_) | Value::Float(_)) => Ok(Value::string(&printer::prin1_to_string(number))),
        other => Err(Signal::wrong_type("numberp", other)),
    }
}

fn string_join(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let separator = match args.get(1) {
        None | Some(Value::Nil) => "",
        Some(sep) => string_arg(sep)?,
    };
    let parts = list_arg(&args[0])?
        .iter()
        .map(|part| string_arg(part).map(str::to_string))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::string(&parts.join(separator)))
}

/// `(split-string STRING &optional SEPARATOR OMIT-NULLS)`.
///
/// Without SEPARATOR, splits on runs of whitespace and drops empty parts. SEPARATOR is matched literally.
fn split_string(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let text = string_arg(&args[0])?;
    let parts: Vec<Value> = match args.get(1) {
        None | Some(Value::Nil) => text.split_whitespace().map(Value::string).collect(),
        Some(sep) => {
            let omit_nulls = args.get(2).is_some_and(Value::is_truthy);
            text.split(string_arg(sep)?)
                .filter(|part| !(omit_nulls && part.is_empty()))
                .map(Value::string)
                .collect()
        }
    };
    Ok(Value::list(parts))
}

fn symbol_name(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::string(symbol_arg(&args[0])?))
}

fn intern(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::symbol(string_arg(&args[0])?))
}

/// `(prin1-to-string OBJECT &optional NOESCAPE)`
fn prin1_to_string(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let noescape = args.get(1).is_some_and(Value::is_truthy);
    let text = if noescape {
        printer::princ_to_string(&args[0])
    } else {
        printer::prin1_to_string(&args[0])
    };
    Ok(Value::string(&text))
}

// ============================================================================
// format
// ============================================================================

fn format(_: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    let template = string_arg(&args[0])?;
    format_string(template, &args[1..]).map(|s| Value::string(&s))
}

/// Expand `%s %S %d %f %x %X %c %%` directives, with optional `-`/`0` flags, width and precision.
pub(crate) fn format_string(template: &str, args: &[Value]) -> Result<String, Signal> {
    let mut out = String::new();
    let mut args = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut left_align = false;
        let mut zero_pad = false;
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => left_align = true,
                '0' => zero_pad = true,
                _ => break,
            }
            chars.next();
        }
        let mut width = 0usize;
        while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
            width = width * 10 + digit as usize;
            chars.next();
        }
        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut p = 0usize;
            while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
                p = p * 10 + digit as usize;
                chars.next();
            }
            precision = Some(p);
        }

        let Some(directive) = chars.next() else {
            return Err(Signal::error("Format string ends in middle of format specifier"));
        };
        if directive == '%' {
            out.push('%');
            continue;
        }
        let arg = args
            .next()
            .ok_or_else(|| Signal::error("Not enough arguments for format string"))?;

        let numeric = matches!(directive, 'd' | 'f' | 'x' | 'X');
        let text = match directive {
            's' => {
                let text = printer::princ_to_string(arg);
                match precision {
                    Some(p) => text.chars().take(p).collect(),
                    None => text,
                }
            }
            'S' => printer::prin1_to_string(arg),
            'd' => match arg {
                Value::Int(n) => n.to_string(),
                Value::Float(f) => (f.trunc() as i64).to_string(),
                other => return Err(Signal::wrong_type("numberp", other)),
            },
            'f' => match arg {
                Value::Int(n) => format!("{:.*}", precision.unwrap_or(6), *n as f64),
                Value::Float(f) => format!("{:.*}", precision.unwrap_or(6), f),
                other => return Err(Signal::wrong_type("numberp", other)),
            },
            'x' => format!("{:x}", int_arg(arg)?),
            'X' => format!("{:X}", int_arg(arg)?),
            'c' => char_arg(arg)?.to_string(),
            other => return Err(Signal::error(format!("Invalid format operation %{other}"))),
        };

        let len = text.chars().count();
        if len >= width {
            out.push_str(&text);
        } else if left_align {
            out.push_str(&text);
            out.extend(std::iter::repeat_n(' ', width - len));
        } else if zero_pad && numeric {
            let (sign, digits) = match text.strip_prefix('-') {
                Some(rest) => ("-", rest),
                None => ("", text.as_str()),
            };
            out.push_str(sign);
            out.extend(std::iter::repeat_n('0', width - len));
            out.push_str(digits);
        } else {
            out.extend(std::iter::repeat_n(' ', width - len));
            out.push_str(&text);
        }
    }
    Ok(out)
}
