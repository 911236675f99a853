//! Loading a whole source unit.

use lispdoc_syntax::{ReadError, Span, Value, reader};
use thiserror::Error;

use crate::eval::Interpreter;
use crate::signal::Signal;

/// Why a unit failed to load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read error: {0}")]
    Read(#[from] ReadError),

    #[error("top-level form {index} signalled {signal}")]
    Signal {
        /// 0-based position of the failing form.
        index: usize,
        span: Span,
        #[source]
        signal: Signal,
    },
}

/// Read every top-level form of `source` and evaluate it in order.
///
/// The whole unit is read before anything is evaluated, so a syntax error leaves the environment untouched. Returns
/// the number of forms evaluated.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn load(interp: &mut Interpreter, source: &str) -> Result<usize, LoadError> {
    let forms = reader::read_all(source)?;
    for (index, form) in forms.iter().enumerate() {
        if let Err(signal) = interp.eval(&Value::from(form)) {
            tracing::debug!(index, %signal, "top-level form failed");
            return Err(LoadError::Signal {
                index,
                span: form.span,
                signal,
            });
        }
    }
    tracing::debug!(forms = forms.len(), "unit loaded");
    Ok(forms.len())
}
