//! Name-to-definition lookup table built from a completed `RepoModel`.
//!
//! Built in a single pass and immutable afterwards; a fresh model always
//! gets a full rebuild, never an incremental patch. Lookup is exact on the
//! bare identifier — adapters strip call qualifiers before anything reaches
//! this table, and no fuzzy matching happens here. Resolution is scoped to
//! one language: a callee in a Python file never matches a Go definition,
//! even when the names collide.

use std::collections::HashMap;

use crate::extract::language::Language;
use crate::model::{Definition, RepoModel};

/// Immutable symbol index over a borrowed `RepoModel`.
///
/// Multiple definitions may share a name (overloads, same-named methods on
/// different classes); all are kept and none is preferred a priori.
pub struct SymbolIndex<'a> {
    by_name: HashMap<(Language, &'a str), Vec<&'a Definition>>,
}

impl<'a> SymbolIndex<'a> {
    /// Build the index from a completed model.
    ///
    /// Synthetic module scopes are not callable and are not indexed.
    pub fn build(model: &'a RepoModel) -> Self {
        let mut by_name: HashMap<(Language, &str), Vec<&Definition>> = HashMap::new();
        for analysis in model.files.values() {
            for def in &analysis.definitions {
                if def.kind.is_callable() {
                    by_name
                        .entry((analysis.language, def.name.as_str()))
                        .or_default()
                        .push(def);
                }
            }
        }
        tracing::debug!("Indexed {} distinct symbol names", by_name.len());
        Self { by_name }
    }

    /// All candidate definitions for a bare callable name in one language.
    ///
    /// Returns an empty slice when nothing matches.
    pub fn resolve<'b>(&'b self, language: Language, name: &'b str) -> &'b [&'a Definition] {
        self.by_name
            .get(&(language, name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct (language, name) keys in the index
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Lookup by name across the whole model, regardless of language.
pub fn lookup_definitions_by_name<'a>(model: &'a RepoModel, name: &str) -> Vec<&'a Definition> {
    model
        .definitions()
        .filter(|d| d.kind.is_callable() && d.name == name)
        .collect()
}
