//! Run configuration.
//!
//! A [`RunConfig`] is a pure parameter of one doctest run: it is built by the caller (usually from CLI flags) and
//! read by the session, never stored beyond the run.

use std::ops::Range;

use serde::Serialize;

/// How much the report narrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Only the final tally.
    Silent,
    /// Failures and the tally.
    #[default]
    Info,
    /// Passing tests are narrated too.
    Verbose,
}

/// Settings for one doctest run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Reporting level
    pub verbosity: Verbosity,
    /// Name used in report lines (`<source-name>#<line>`)
    pub source_name: String,
    /// Top-level definition the run was narrowed to, if any
    pub defun: Option<String>,
    /// Byte range of the source to scan; the whole text when unset
    pub scan_range: Option<Range<usize>>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Info,
            source_name: "<source>".to_string(),
            defun: None,
            scan_range: None,
        }
    }
}

impl RunConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reporting level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set the name shown in report lines
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// Narrow the run to one top-level definition
    pub fn with_defun(mut self, name: impl Into<String>) -> Self {
        self.defun = Some(name.into());
        self
    }

    /// Restrict scanning to a byte range of the source
    pub fn with_scan_range(mut self, range: Range<usize>) -> Self {
        self.scan_range = Some(range);
        self
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.verbosity, Verbosity::Info);
        assert_eq!(config.source_name, "<source>");
        assert!(config.defun.is_none());
        assert!(config.scan_range.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let config = RunConfig::new()
            .with_verbosity(Verbosity::Verbose)
            .with_source_name("lib.el")
            .with_defun("my-fn")
            .with_scan_range(10..20);
        assert!(config.is_verbose());
        assert_eq!(config.source_name, "lib.el");
        assert_eq!(config.defun.as_deref(), Some("my-fn"));
        assert_eq!(config.scan_range, Some(10..20));
    }

    #[test]
    fn test_verbosity_parses_from_cli_spelling() {
        use clap::ValueEnum;
        assert_eq!(Verbosity::from_str("silent", true), Ok(Verbosity::Silent));
        assert_eq!(Verbosity::from_str("VERBOSE", true), Ok(Verbosity::Verbose));
        assert!(Verbosity::from_str("loud", true).is_err());
    }
}
