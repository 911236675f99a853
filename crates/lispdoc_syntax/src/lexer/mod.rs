//! Lexer for the lispdoc Lisp dialect
//!
//! Handles tokenization including:
//! - Delimiters `( ) [ ] .` and reader prefixes `' #' \` , ,@`
//! - Integers, floats (including `1.0e+INF` and `0.0e+NaN`) and character literals (`?a`, `?\n`)
//! - Strings with backslash escapes
//! - Symbols with backslash escapes, keywords, the empty symbol `##`
//! - `;` line comments
//!
//! The lexer is pull-based: [`Lexer::next_token`] scans exactly one token, so the reader can stop after the first
//! complete datum without looking at (or failing on) whatever text follows it.

pub mod tokens;

pub use tokens::{Token, TokenKind};

use crate::ast::Span;
use crate::diagnostics::ReadError;

/// Lexer for lispdoc source code.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Tokenize the entire source code.
    ///
    /// The token stream always ends with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, ReadError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Tokenize the entire source, collecting errors instead of stopping at the first one.
    ///
    /// Every error consumes at least one character, so this always terminates. Unterminated strings produce an error
    /// and no `Str` token.
    pub fn tokenize_lossy(mut self) -> (Vec<Token>, Vec<ReadError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();
        loop {
            match self.next_token() {
                Ok(token) => {
                    let done = token.kind == TokenKind::Eof;
                    tokens.push(token);
                    if done {
                        return (tokens, errors);
                    }
                }
                Err(e) => errors.push(e),
            }
        }
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else if c == ';' {
                while let Some(c) = self.advance() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.pos)
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    /// Scan the next token.
    pub fn next_token(&mut self) -> Result<Token, ReadError> {
        self.skip_trivia();
        let start = self.pos;
        let Some(c) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, self.span_from(start)));
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '\'' => TokenKind::Quote,
            '`' => TokenKind::Backquote,
            ',' => {
                if self.peek() == Some('@') {
                    self.advance();
                    TokenKind::CommaAt
                } else {
                    TokenKind::Comma
                }
            }
            '"' => self.scan_string(start)?,
            '?' => self.scan_char(start)?,
            '#' => match self.peek() {
                Some('\'') => {
                    self.advance();
                    TokenKind::Function
                }
                Some('#') => {
                    self.advance();
                    TokenKind::Symbol(String::new())
                }
                _ => return Err(ReadError::invalid_syntax("#", self.span_from(start))),
            },
            _ => self.scan_atom(start, c)?,
        };

        Ok(Token::new(kind, self.span_from(start)))
    }

    // ========================================================================
    // Strings and characters
    // ========================================================================

    fn scan_string(&mut self, start: usize) -> Result<TokenKind, ReadError> {
        let mut text = String::new();
        loop {
            match self.advance() {
                None => return Err(ReadError::end_of_file(self.span_from(start))),
                Some('"') => return Ok(TokenKind::Str(text)),
                Some('\\') => {
                    let Some(escaped) = self.advance() else {
                        return Err(ReadError::end_of_file(self.span_from(start)));
                    };
                    // `\<newline>` and `\<space>` are line continuations and vanish.
                    if escaped == '\n' || escaped == ' ' {
                        continue;
                    }
                    text.push(escape_char(escaped));
                }
                Some(c) => text.push(c),
            }
        }
    }

    fn scan_char(&mut self, start: usize) -> Result<TokenKind, ReadError> {
        let c = match self.advance() {
            None => return Err(ReadError::end_of_file(self.span_from(start))),
            Some('\\') => match self.advance() {
                None => return Err(ReadError::end_of_file(self.span_from(start))),
                Some(escaped) => escape_char(escaped),
            },
            Some(c) => c,
        };
        Ok(TokenKind::Int(i64::from(u32::from(c))))
    }

    // ========================================================================
    // Symbols and numbers
    // ========================================================================

    fn scan_atom(&mut self, start: usize, first: char) -> Result<TokenKind, ReadError> {
        let mut text = String::new();
        let mut escaped = false;

        let mut current = Some(first);
        while let Some(c) = current {
            if c == '\\' {
                let Some(next) = self.advance() else {
                    return Err(ReadError::end_of_file(self.span_from(start)));
                };
                text.push(next);
                escaped = true;
            } else {
                text.push(c);
            }
            current = match self.peek() {
                Some(c) if !is_delimiter(c) => self.advance(),
                _ => None,
            };
        }

        if escaped {
            return Ok(TokenKind::Symbol(text));
        }
        if text == "." {
            return Ok(TokenKind::Dot);
        }
        match parse_number(&text) {
            Some(Ok(kind)) => Ok(kind),
            Some(Err(())) => Err(ReadError::invalid_syntax(text, self.span_from(start))),
            None => Ok(TokenKind::Symbol(text)),
        }
    }
}

/// Characters that end a symbol or number.
fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '"' | '\'' | '`' | ',' | ';')
}

fn escape_char(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'f' => '\x0c',
        'e' => '\x1b',
        'a' => '\x07',
        's' => ' ',
        other => other,
    }
}

/// Classify an unescaped atom as a number.
///
/// Returns `None` for symbols, `Some(Err(()))` for integers that do not fit in `i64`.
pub(crate) fn parse_number(text: &str) -> Option<Result<TokenKind, ()>> {
    let (sign, body) = match text.as_bytes().first() {
        Some(b'+') => ("", &text[1..]),
        Some(b'-') => ("-", &text[1..]),
        _ => ("", text),
    };

    let int_len = body.bytes().take_while(u8::is_ascii_digit).count();
    let int_part = &body[..int_len];
    let mut rest = &body[int_len..];

    let mut frac_part = "";
    if let Some(after_dot) = rest.strip_prefix('.') {
        let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
        frac_part = &after_dot[..frac_len];
        rest = &after_dot[frac_len..];
    }

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    if rest.is_empty() {
        if frac_part.is_empty() {
            // `12` or `12.` are integers.
            return Some(
                format!("{sign}{int_part}")
                    .parse::<i64>()
                    .map(TokenKind::Int)
                    .map_err(|_| ()),
            );
        }
        let normalized = format!("{sign}{}.{frac_part}", if int_part.is_empty() { "0" } else { int_part });
        return normalized.parse::<f64>().ok().map(|f| Ok(TokenKind::Float(f)));
    }

    let exponent = rest.strip_prefix('e').or_else(|| rest.strip_prefix('E'))?;
    let negative = sign == "-";
    match exponent {
        "+INF" | "INF" => {
            return Some(Ok(TokenKind::Float(if negative {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            })));
        }
        "+NaN" | "NaN" => return Some(Ok(TokenKind::Float(f64::NAN))),
        _ => {}
    }

    let (exp_sign, exp_digits) = match exponent.as_bytes().first() {
        Some(b'+') => ("", &exponent[1..]),
        Some(b'-') => ("-", &exponent[1..]),
        _ => ("", exponent),
    };
    if exp_digits.is_empty() || !exp_digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let normalized = format!(
        "{sign}{}.{}e{exp_sign}{exp_digits}",
        if int_part.is_empty() { "0" } else { int_part },
        if frac_part.is_empty() { "0" } else { frac_part },
    );
    normalized.parse::<f64>().ok().map(|f| Ok(TokenKind::Float(f)))
}

/// Tokenize source code (convenience wrapper around [`Lexer::tokenize`]).
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Result<Vec<Token>, ReadError> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_delimiters_and_prefixes() {
        assert_eq!(
            kinds("('a #'b `(,c ,@d))"),
            vec![
                TokenKind::LParen,
                TokenKind::Quote,
                TokenKind::Symbol("a".into()),
                TokenKind::Function,
                TokenKind::Symbol("b".into()),
                TokenKind::Backquote,
                TokenKind::LParen,
                TokenKind::Comma,
                TokenKind::Symbol("c".into()),
                TokenKind::CommaAt,
                TokenKind::Symbol("d".into()),
                TokenKind::RParen,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("42")[0], TokenKind::Int(42));
        assert_eq!(kinds("-7")[0], TokenKind::Int(-7));
        assert_eq!(kinds("+3")[0], TokenKind::Int(3));
        assert_eq!(kinds("12.")[0], TokenKind::Int(12));
        assert_eq!(kinds("1.5")[0], TokenKind::Float(1.5));
        assert_eq!(kinds(".5")[0], TokenKind::Float(0.5));
        assert_eq!(kinds("1e3")[0], TokenKind::Float(1000.0));
        assert_eq!(kinds("-1.0e+INF")[0], TokenKind::Float(f64::NEG_INFINITY));
        assert!(matches!(kinds("0.0e+NaN")[0], TokenKind::Float(f) if f.is_nan()));
    }

    #[test]
    fn test_number_like_symbols() {
        assert_eq!(kinds("1+")[0], TokenKind::Symbol("1+".into()));
        assert_eq!(kinds("-")[0], TokenKind::Symbol("-".into()));
        assert_eq!(kinds("1e")[0], TokenKind::Symbol("1e".into()));
        assert_eq!(kinds("\\1")[0], TokenKind::Symbol("1".into()));
    }

    #[test]
    fn test_integer_overflow_is_an_error() {
        assert!(lex("99999999999999999999").is_err());
    }

    #[test]
    fn test_strings() {
        assert_eq!(kinds(r#""a\"b\\c\nd""#)[0], TokenKind::Str("a\"b\\c\nd".into()));
        assert_eq!(kinds("\"x\\\ny\"")[0], TokenKind::Str("xy".into()));
    }

    #[test]
    fn test_unterminated_string() {
        let err = lex("\"abc").unwrap_err();
        assert_eq!(err.signal_name(), "end-of-file");
    }

    #[test]
    fn test_characters() {
        assert_eq!(kinds("?a")[0], TokenKind::Int(97));
        assert_eq!(kinds("?\\n")[0], TokenKind::Int(10));
        assert_eq!(kinds("?\\(")[0], TokenKind::Int(40));
    }

    #[test]
    fn test_comments_and_keywords() {
        assert_eq!(
            kinds("; note\n:key ##"),
            vec![
                TokenKind::Symbol(":key".into()),
                TokenKind::Symbol(String::new()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_dot() {
        assert_eq!(
            kinds("(a . b)"),
            vec![
                TokenKind::LParen,
                TokenKind::Symbol("a".into()),
                TokenKind::Dot,
                TokenKind::Symbol("b".into()),
                TokenKind::RParen,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_lossy_recovers_after_errors() {
        let (tokens, errors) = Lexer::new("# a").tokenize_lossy();
        assert_eq!(errors.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Symbol("a".into()));
    }
}
