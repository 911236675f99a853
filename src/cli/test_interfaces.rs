//! Test runner I/O boundary interfaces
//!
//! This module defines trait-based abstractions for the two operations of a run that touch the outside world:
//! - Source discovery (filesystem scan)
//! - Unit loading (evaluating a file's top-level forms before its tests run)
//!
//! Evaluation of the tests themselves sits behind [`crate::engine::Evaluator`].

use std::fs;
use std::path::{Path, PathBuf};

use lispdoc_runtime::{Interpreter, LoadError};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors that abort a run before or around the engine
#[derive(Debug, Error)]
pub enum TestError {
    #[error("no Lisp source files found in '{0}'")]
    NoSources(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load {path}\n{rendered}")]
    Load { path: String, rendered: String },

    #[error("no top-level definition named `{name}` in {path}")]
    UnknownDefinition { name: String, path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Source Discovery Interface
// ============================================================================

/// Find the source files a run covers.
pub trait TestDiscovery {
    /// `path` itself when it is a file, otherwise every `.el` file below it, sorted.
    fn discover_source_files(&self, path: &Path) -> Result<Vec<PathBuf>, TestError>;
}

/// Filesystem-based discovery.
pub struct DefaultTestDiscovery;

impl TestDiscovery for DefaultTestDiscovery {
    fn discover_source_files(&self, path: &Path) -> Result<Vec<PathBuf>, TestError> {
        if path.is_file() {
            return Ok(vec![path.to_path_buf()]);
        }
        if !path.is_dir() {
            return Err(TestError::NoSources(path.display().to_string()));
        }
        let mut files = Vec::new();
        walk(path, &mut files)?;
        files.sort();
        Ok(files)
    }
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), TestError> {
    for entry in fs::read_dir(dir)? {
        let entry_path = entry?.path();
        let name = entry_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if name.starts_with('.') {
            continue;
        }
        if entry_path.is_dir() {
            if name != "target" {
                walk(&entry_path, files)?;
            }
        } else if entry_path.extension().is_some_and(|ext| ext == "el") {
            files.push(entry_path);
        }
    }
    Ok(())
}

// ============================================================================
// Unit Loader Interface
// ============================================================================

/// Prepare the environment a file's tests run in.
pub trait UnitLoader {
    fn load_unit(&self, interp: &mut Interpreter, name: &str, source: &str) -> Result<(), TestError>;
}

/// Evaluate every top-level form of the file.
pub struct DefaultUnitLoader;

impl UnitLoader for DefaultUnitLoader {
    fn load_unit(&self, interp: &mut Interpreter, name: &str, source: &str) -> Result<(), TestError> {
        match lispdoc_runtime::load(interp, source) {
            Ok(forms) => {
                tracing::debug!(file = name, forms, "unit loaded");
                Ok(())
            }
            Err(err) => Err(TestError::Load {
                path: name.to_string(),
                rendered: render_load_error(&err, name, source),
            }),
        }
    }
}

/// Leave the environment as is (`--no-load`).
pub struct SkipLoad;

impl UnitLoader for SkipLoad {
    fn load_unit(&self, _interp: &mut Interpreter, name: &str, _source: &str) -> Result<(), TestError> {
        tracing::debug!(file = name, "load skipped");
        Ok(())
    }
}

#[derive(Debug, Error, Diagnostic)]
#[error("top-level form {index} signalled {signal}")]
#[diagnostic(code(lispdoc::load::signal))]
struct SignalledForm {
    index: usize,
    signal: String,
    #[label("while evaluating this form")]
    at: SourceSpan,
}

/// Render a load failure with the offending source highlighted.
pub fn render_load_error(err: &LoadError, name: &str, source: &str) -> String {
    match err {
        LoadError::Read(read) => render(read.clone(), name, source),
        LoadError::Signal { index, span, signal } => render(
            SignalledForm {
                index: *index,
                signal: signal.to_string(),
                at: (span.start, span.len()).into(),
            },
            name,
            source,
        ),
    }
}

/// Render any diagnostic against the named source text.
pub(crate) fn render(diagnostic: impl Diagnostic + Send + Sync + 'static, name: &str, source: &str) -> String {
    let report = miette::Report::new(diagnostic).with_source_code(NamedSource::new(name, source.to_string()));
    format!("{report:?}")
}
