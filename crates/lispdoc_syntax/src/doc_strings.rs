//! Documentation-string index.
//!
//! Decides, for every byte offset of a source text, whether it lies inside a documentation string. A documentation
//! string is a string literal sitting in the doc slot of a definition form registered in
//! `lispdoc_core::lang::definers` (e.g. the fourth element of `(defun NAME ARGS "doc" ...)`).
//!
//! The index is built from a lossy token stream, so a syntax error elsewhere in the file (an unbalanced paren in some
//! unrelated function) does not hide every docstring after it.

use lispdoc_core::lang::definers;

use crate::ast::Span;
use crate::lexer::{Lexer, TokenKind};

/// One documentation string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocString {
    /// Offset of the opening quote.
    pub open: usize,
    /// Offset of the closing quote.
    pub close: usize,
    /// Head symbol of the owning definition, e.g. `defun`.
    pub definer: String,
    /// Name of the defined thing, when the form has one.
    pub name: Option<String>,
}

impl DocString {
    /// Byte range of the string contents (between the quotes).
    pub fn content(&self) -> Span {
        Span::new(self.open + 1, self.close)
    }

    /// `true` if `offset` lies strictly between the quotes.
    pub fn contains(&self, offset: usize) -> bool {
        self.open < offset && offset < self.close
    }
}

/// All documentation strings of one source text, in document order.
#[derive(Debug, Clone, Default)]
pub struct DocStringIndex {
    docs: Vec<DocString>,
}

/// Nesting frame of a list or vector being scanned.
struct Frame {
    is_vector: bool,
    /// Inside quoted data (`'(...)`, `` `(...) ``): nothing here is a definition.
    quoted: bool,
    head: Option<String>,
    name: Option<String>,
    count: usize,
    /// A reader prefix was seen; the next datum belongs to it. `true` for data prefixes (`'`, `` ` ``).
    prefix: Option<bool>,
}

/// Position of a datum inside its enclosing frame.
struct Element {
    /// Element index, or `None` when the datum completes a prefixed element.
    index: Option<usize>,
    /// The datum follows a data prefix.
    quoted: bool,
}

impl Frame {
    fn new(is_vector: bool, quoted: bool) -> Self {
        Self {
            is_vector,
            quoted,
            head: None,
            name: None,
            count: 0,
            prefix: None,
        }
    }

    fn begin_element(&mut self) -> Element {
        if let Some(quoted) = self.prefix.take() {
            return Element { index: None, quoted };
        }
        let index = self.count;
        self.count += 1;
        Element {
            index: Some(index),
            quoted: false,
        }
    }
}

impl DocStringIndex {
    /// Scan `source` and record every documentation string.
    #[tracing::instrument(skip_all, fields(source_len = source.len()))]
    pub fn build(source: &str) -> Self {
        let (tokens, errors) = Lexer::new(source).tokenize_lossy();
        if !errors.is_empty() {
            tracing::debug!(errors = errors.len(), "lexical errors while indexing documentation strings");
        }

        let mut docs = Vec::new();
        // The root frame stands for the top level; it is never popped.
        let mut stack: Vec<Frame> = vec![Frame::new(true, false)];

        for token in tokens {
            let Some(top) = stack.last_mut() else {
                break;
            };
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket => {
                    let element = top.begin_element();
                    let quoted = top.quoted || element.quoted;
                    stack.push(Frame::new(token.kind == TokenKind::LBracket, quoted));
                }
                TokenKind::RParen | TokenKind::RBracket => {
                    if stack.len() > 1 {
                        stack.pop();
                    }
                }
                TokenKind::Quote | TokenKind::Backquote => {
                    // A prefix after a prefix (`''x`) still yields one element.
                    top.begin_element();
                    top.prefix = Some(true);
                }
                TokenKind::Function | TokenKind::Comma | TokenKind::CommaAt => {
                    let element = top.begin_element();
                    top.prefix = Some(element.quoted);
                }
                TokenKind::Str(_) => {
                    let element = top.begin_element();
                    let Some(index) = element.index else {
                        continue;
                    };
                    if top.quoted {
                        continue;
                    }
                    let slot = top.head.as_deref().and_then(definers::doc_slot_for);
                    if slot == Some(index) {
                        docs.push(DocString {
                            open: token.span.start,
                            close: token.span.end.saturating_sub(1),
                            definer: top.head.clone().unwrap_or_default(),
                            name: top.name.clone(),
                        });
                    }
                }
                TokenKind::Symbol(name) => match top.begin_element().index {
                    Some(0) if !top.is_vector => top.head = Some(name),
                    Some(1) => top.name = Some(name),
                    _ => {}
                },
                TokenKind::Int(_) | TokenKind::Float(_) | TokenKind::Dot => {
                    top.begin_element();
                }
                TokenKind::Eof => break,
            }
        }

        Self { docs }
    }

    /// The documentation string containing `offset`, if any.
    pub fn enclosing(&self, offset: usize) -> Option<&DocString> {
        // Docstrings never overlap, so the candidate is the last one opening before `offset`.
        let idx = self.docs.partition_point(|d| d.open < offset);
        let candidate = self.docs.get(idx.checked_sub(1)?)?;
        candidate.contains(offset).then_some(candidate)
    }

    /// `true` if `offset` lies inside a documentation string.
    pub fn is_inside(&self, offset: usize) -> bool {
        self.enclosing(offset).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocString> {
        self.docs.iter()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
