//! Removal of string-literal escaping from extracted test text.
//!
//! Test blocks live inside string literals, so a quote in an expression is written `\"` in the source. Every
//! backslash followed by any character (a newline included) is replaced by that character. Nested escaping is not
//! understood: `\\\"` becomes `\"`, never `"`.

/// Remove one level of backslash escaping.
///
/// A lone trailing backslash is kept.
///
/// ## Examples
/// ```rust
/// use lispdoc::engine::unescape;
///
/// assert_eq!(unescape(r#"(concat \"a\" \"b\")"#), r#"(concat "a" "b")"#);
/// assert_eq!(unescape(r"back\slash"), "backslash");
/// ```
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
