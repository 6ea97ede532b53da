use crate::types::*;
use crate::vocabulary::{normalize, AliasResolver, VocabularyStore};
use indexmap::IndexSet;
use log::debug;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Prefix autocomplete over the vocabulary, scoped to one axis.
///
/// Ranking: direct tag matches in store order, then tags reached through a
/// matching alias. Output is always the tag's display string, never the
/// alias text, and contains no duplicates.
pub struct SuggestionEngine<'a> {
    store: &'a VocabularyStore,
    limit: usize,
}

impl<'a> SuggestionEngine<'a> {
    pub fn new(store: &'a VocabularyStore) -> Self {
        Self::with_limit(store, DEFAULT_SUGGESTION_LIMIT)
    }

    pub fn with_limit(store: &'a VocabularyStore, limit: usize) -> Self {
        Self { store, limit }
    }

    pub fn suggest(&self, input: &str, axis: Axis) -> Vec<String> {
        let query = normalize(input);
        if query.is_empty() {
            return Vec::new();
        }

        let direct = self
            .store
            .tags()
            .iter()
            .filter(|t| axis.contains(t.category))
            .filter(|t| t.string.to_lowercase().starts_with(&query))
            .map(|t| t.string.as_str());

        // Aliases only surface canonical targets; an alias onto a custom tag
        // is never offered.
        let resolver = AliasResolver::new(self.store);
        let via_alias = self
            .store
            .aliases()
            .iter()
            .filter(|a| a.alias.to_lowercase().starts_with(&query))
            .filter_map(|a| resolver.target(a))
            .filter(|t| t.category == axis.canonical_category())
            .map(|t| t.string.as_str());

        let matches: IndexSet<&str> = direct.chain(via_alias).collect();
        let suggestions: Vec<String> = matches
            .into_iter()
            .take(self.limit)
            .map(str::to_string)
            .collect();
        debug!(
            "Suggest [{}] '{}' -> {} match(es)",
            axis,
            query,
            suggestions.len()
        );
        suggestions
    }
}
