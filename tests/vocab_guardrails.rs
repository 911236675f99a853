//! Vocabulary guardrails.
//!
//! Test markers, signal names and the definition/special-form heads are spelled once, in `lispdoc_core::lang`. These
//! tests tokenize the string literals of every production Rust file under `src/` and `crates/` and fail when one
//! spells registry vocabulary that should come from the registry.
//!
//! - Marker literals are flagged wherever they appear: a second copy of `">> "` silently forks the test format.
//! - Signal names are flagged wherever they appear, except where a builtin function of the same name is registered.
//! - Definition and special-form heads are flagged only when compared (`== "defun"`, `"let" =>`); building a symbol
//!   with that name is fine.
//!
//! `#[cfg(test)]` modules and the `tests/` tree may spell anything.

use std::fs;
use std::path::{Path, PathBuf};

use lispdoc_core::lang::{definers, markers, signals, special_forms};

/// Which uses of a spelling count as a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flagged {
    Anywhere,
    WhenCompared,
}

struct Vocabulary {
    registry: &'static str,
    spellings: Vec<&'static str>,
    flagged: Flagged,
    /// Lines containing one of these are exempt.
    exempt_lines: &'static [&'static str],
}

fn vocabularies() -> Vec<Vocabulary> {
    let definer_heads = definers::DEFINERS
        .iter()
        .flat_map(|d| std::iter::once(d.item.canonical).chain(d.item.aliases.iter().copied()));
    let special_form_heads = special_forms::SPECIAL_FORMS
        .iter()
        .flat_map(|f| std::iter::once(f.canonical).chain(f.aliases.iter().copied()));
    let heads = definer_heads.chain(special_form_heads).collect();

    vec![
        Vocabulary {
            registry: "lang::markers",
            spellings: vec![
                markers::INPUT_MARKER,
                markers::OUTPUT_MARKER,
                markers::INPUT_MARKER.trim_end(),
                markers::OUTPUT_MARKER.trim_end(),
            ],
            flagged: Flagged::Anywhere,
            exempt_lines: &[],
        },
        Vocabulary {
            registry: "lang::signals",
            spellings: signals::SIGNALS.iter().map(|s| s.canonical).collect(),
            flagged: Flagged::Anywhere,
            // `error` is also a builtin function.
            exempt_lines: &["Builtin::new("],
        },
        Vocabulary {
            registry: "lang::definers / lang::special_forms",
            spellings: heads,
            flagged: Flagged::WhenCompared,
            exempt_lines: &[],
        },
    ]
}

// ============================================================================
// String literal scanner
// ============================================================================

/// A string literal in Rust source: its unescaped-as-written content and byte range (quotes included).
#[derive(Debug, PartialEq, Eq)]
struct Literal<'a> {
    content: &'a str,
    start: usize,
    end: usize,
}

/// String literals of `code`, skipping `//` comments and char literals. Raw strings are included.
fn string_literals(code: &str) -> Vec<Literal<'_>> {
    let bytes = code.as_bytes();
    let mut literals = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = code[i..].find('\n').map_or(bytes.len(), |n| i + n);
            }
            b'\'' => {
                // '\n', '\'', '"' are char literals; anything else is a lifetime.
                if bytes.get(i + 1) == Some(&b'\\') {
                    i = code.get(i + 3..).and_then(|rest| rest.find('\'')).map_or(bytes.len(), |n| i + 3 + n + 1);
                } else if bytes.get(i + 2) == Some(&b'\'') {
                    i += 3;
                } else {
                    i += 1;
                }
            }
            b'r' if is_raw_string_start(code, i) => {
                let hashes = bytes[i + 1..].iter().take_while(|&&b| b == b'#').count();
                let open = i + 1 + hashes;
                let closing = format!("\"{}", "#".repeat(hashes));
                let end = code[open + 1..].find(&closing).map_or(bytes.len(), |n| open + 1 + n);
                literals.push(Literal {
                    content: &code[open + 1..end],
                    start: i,
                    end: (end + closing.len()).min(bytes.len()),
                });
                i = end + closing.len();
            }
            b'"' => {
                let mut j = i + 1;
                while j < bytes.len() && bytes[j] != b'"' {
                    j += if bytes[j] == b'\\' { 2 } else { 1 };
                }
                let end = j.min(bytes.len());
                literals.push(Literal {
                    content: &code[i + 1..end],
                    start: i,
                    end: (end + 1).min(bytes.len()),
                });
                i = end + 1;
            }
            _ => i += 1,
        }
    }
    literals
}

fn is_raw_string_start(code: &str, i: usize) -> bool {
    let bytes = code.as_bytes();
    let after_ident = i > 0 && (bytes[i - 1].is_ascii_alphanumeric() || bytes[i - 1] == b'_');
    let rest = &code[i + 1..];
    !after_ident && rest.trim_start_matches('#').starts_with('"') && (rest.starts_with('"') || rest.starts_with('#'))
}

/// `true` if the literal between `before` and `after` is compared against: `== "x"`, `== Some("x")`, `"x" =>`,
/// `"x" | "y" =>`.
fn is_compared(before: &str, after: &str) -> bool {
    let before = before.trim_end();
    let before = before.strip_suffix("Some(").map_or(before, str::trim_end);
    let after = after.trim_start();
    before.ends_with("==") || before.ends_with("!=") || after.starts_with("=>") || after.starts_with('|')
}

/// Production part of a source file: everything before its first `#[cfg(test)]`.
fn production_code(contents: &str) -> &str {
    contents.find("#[cfg(test)]").map_or(contents, |at| &contents[..at])
}

fn line_at(code: &str, offset: usize) -> (usize, &str) {
    let line_no = code[..offset].matches('\n').count() + 1;
    let start = code[..offset].rfind('\n').map_or(0, |n| n + 1);
    let end = code[offset..].find('\n').map_or(code.len(), |n| offset + n);
    (line_no, &code[start..end])
}

#[derive(Debug)]
struct Violation {
    path: PathBuf,
    line: usize,
    text: String,
    registry: &'static str,
}

fn violations_in(path: &Path, contents: &str, vocabularies: &[Vocabulary]) -> Vec<Violation> {
    let code = production_code(contents);
    let mut found = Vec::new();
    for literal in string_literals(code) {
        for vocabulary in vocabularies {
            if !vocabulary.spellings.iter().any(|&s| s == literal.content) {
                continue;
            }
            let (line, text) = line_at(code, literal.start);
            if vocabulary.exempt_lines.iter().any(|marker| text.contains(marker)) {
                continue;
            }
            let flagged = match vocabulary.flagged {
                Flagged::Anywhere => true,
                Flagged::WhenCompared => is_compared(&code[..literal.start], &code[literal.end..]),
            };
            if flagged {
                found.push(Violation {
                    path: path.to_path_buf(),
                    line,
                    text: text.trim().to_string(),
                    registry: vocabulary.registry,
                });
            }
        }
    }
    found
}

fn rust_sources(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            if !path.ends_with("tests") {
                rust_sources(&path, out);
            }
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn vocabulary_is_spelled_only_in_the_registries() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let registries = root.join("crates/lispdoc_core/src/lang");
    let vocabularies = vocabularies();

    let mut files = Vec::new();
    rust_sources(&root.join("src"), &mut files);
    rust_sources(&root.join("crates"), &mut files);
    files.sort();

    let violations: Vec<Violation> = files
        .iter()
        .filter(|path| !path.starts_with(&registries))
        .filter_map(|path| fs::read_to_string(path).ok().map(|contents| (path, contents)))
        .flat_map(|(path, contents)| violations_in(path.strip_prefix(&root).unwrap_or(path), &contents, &vocabularies))
        .collect();

    let listing: Vec<String> = violations
        .iter()
        .map(|v| format!("{}:{}: {} (use {})", v.path.display(), v.line, v.text, v.registry))
        .collect();
    assert!(listing.is_empty(), "hard-coded vocabulary outside lispdoc_core::lang:\n{}", listing.join("\n"));
}

#[test]
fn registries_cover_the_guarded_spellings() {
    let vocabularies = vocabularies();
    let all: Vec<&str> = vocabularies.iter().flat_map(|v| v.spellings.iter().copied()).collect();
    for spelling in [">> ", "=>", "void-function", "excessive-lisp-nesting", "defun", "cl-defun", "let*", "lambda"] {
        assert!(all.contains(&spelling), "{spelling} is not guarded");
    }
}

#[test]
fn scanner_reads_plain_and_raw_literals() {
    let code = r###"let a = "x\"y"; let b = r#"q"w"#; let c = "";"###;
    let contents: Vec<&str> = string_literals(code).iter().map(|l| l.content).collect();
    assert_eq!(contents, vec![r#"x\"y"#, r#"q"w"#, ""]);
}

#[test]
fn scanner_skips_comments_and_char_literals() {
    let code = "// \"=> \" in a comment\nlet q = '\"'; let e = '\\''; fn f<'a>(s: &'a str) -> &'a str { \"ok\" }\n";
    let contents: Vec<&str> = string_literals(code).iter().map(|l| l.content).collect();
    assert_eq!(contents, vec!["ok"]);
}

#[test]
fn comparisons_are_told_apart_from_constructions() {
    assert!(is_compared("if head == ", " {"));
    assert!(is_compared("head.as_symbol() == Some(", ")"));
    assert!(is_compared("        ", " => 3,"));
    assert!(is_compared("        ", " | \"defmacro\" => 3,"));
    assert!(!is_compared("Value::symbol(", ")"));
    assert!(!is_compared("let name = ", ";"));
}

#[test]
fn violations_respect_each_vocabulary_rule() {
    let vocabularies = vocabularies();
    let source = r#"
fn scan(line: &str) -> bool {
    line.starts_with(">> ")
}
fn head(name: &str) -> usize {
    match name {
        "defun" => 3,
        _ => 0,
    }
}
fn quoted() -> Value {
    Value::symbol("lambda")
}
const ERROR: Builtin = Builtin::new("error", 1, None, error);
fn raise() -> Signal {
    Signal::custom("void-function", Vec::new())
}
#[cfg(test)]
mod tests {
    const SAMPLE: &str = "=> 1";
    fn check(name: &str) -> bool { name == "defun" }
}
"#;
    let found = violations_in(Path::new("unit.rs"), source, &vocabularies);
    let lines: Vec<usize> = found.iter().map(|v| v.line).collect();
    assert_eq!(lines, vec![3, 7, 16], "{found:?}");
    assert_eq!(found[0].registry, "lang::markers");
    assert_eq!(found[2].registry, "lang::signals");
}
