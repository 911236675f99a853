//! Shareable metadata for `lispdoc_core::lang` registries.
//!
//! ## Notes
//! - These types are `Copy` so registries can live in `const` tables.
//! - Metadata is meant for tooling, diagnostics and docs; the reader and evaluator remain the source of truth for
//!   what is legal.

/// Shared metadata shape for "registry-first" vocabulary items.
///
/// Registries that need extra per-item data (e.g. the documentation slot of a definer) wrap this struct in an
/// extension info type.
#[derive(Debug, Clone, Copy)]
pub struct LangItemInfo<Id> {
    pub id: Id,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
}

impl<Id: Copy> LangItemInfo<Id> {
    /// Return `true` if `spelling` is the canonical spelling or one of the aliases.
    pub fn matches(&self, spelling: &str) -> bool {
        self.canonical == spelling || self.aliases.contains(&spelling)
    }
}
