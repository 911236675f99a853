//! Spanned form tree produced by the reader.
//!
//! The runtime works on [`crate::value::Value`]; this tree exists for tooling that needs source positions (locating
//! a top-level definition, pointing diagnostics at a datum).

/// Byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// One datum as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    /// `(a b c)` or the dotted `(a b . tail)`.
    List {
        items: Vec<Sexp>,
        tail: Option<Box<Sexp>>,
    },
    Vector(Vec<Sexp>),
}

/// A spanned datum.
pub type Sexp = Spanned<Form>;

impl Sexp {
    /// Symbol name if this datum is a symbol.
    pub fn as_symbol(&self) -> Option<&str> {
        match &self.node {
            Form::Symbol(name) => Some(name),
            _ => None,
        }
    }

    /// Proper-list elements if this datum is a list without a dotted tail.
    pub fn as_list(&self) -> Option<&[Sexp]> {
        match &self.node {
            Form::List { items, tail: None } => Some(items),
            _ => None,
        }
    }

    /// Head symbol of a list form, e.g. `defun` for `(defun f ...)`.
    pub fn head_symbol(&self) -> Option<&str> {
        self.as_list()?.first()?.as_symbol()
    }
}
