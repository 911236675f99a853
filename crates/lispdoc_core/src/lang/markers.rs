//! Line markers of the embedded-test format.
//!
//! A test block is an input line and an output line living inside a documentation string:
//!
//! ```text
//! >> (+ 1 1)
//! => 2
//! ```
//!
//! Both markers may be preceded by whitespace. The trailing space is part of the marker.

/// Prefix of an input-expression line.
pub const INPUT_MARKER: &str = ">> ";

/// Prefix of an expected-output line.
pub const OUTPUT_MARKER: &str = "=> ";

/// Return the line content after the input marker, if `line` is an input-marker line.
///
/// ## Examples
/// ```rust
/// use lispdoc_core::lang::markers;
///
/// assert_eq!(markers::strip_input("  >> (car x)"), Some("(car x)"));
/// assert_eq!(markers::strip_input("=> 1"), None);
/// ```
pub fn strip_input(line: &str) -> Option<&str> {
    line.trim_start().strip_prefix(INPUT_MARKER)
}

/// Return the line content after the output marker, if `line` is an output-marker line.
pub fn strip_output(line: &str) -> Option<&str> {
    line.trim_start().strip_prefix(OUTPUT_MARKER)
}

/// Return `true` if `line` starts (after leading whitespace) with the input marker.
#[inline]
pub fn is_input_line(line: &str) -> bool {
    strip_input(line).is_some()
}

/// Return `true` if `line` starts (after leading whitespace) with the output marker.
#[inline]
pub fn is_output_line(line: &str) -> bool {
    strip_output(line).is_some()
}
