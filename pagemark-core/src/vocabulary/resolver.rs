use crate::types::*;
use log::warn;

use super::{normalize, VocabularyStore};

/// Maps typed text (a literal tag string or an alias) to its canonical string.
///
/// Resolution is single-hop: an alias whose target is itself reachable only
/// through another alias is not followed further.
pub struct AliasResolver<'a> {
    store: &'a VocabularyStore,
}

impl<'a> AliasResolver<'a> {
    pub fn new(store: &'a VocabularyStore) -> Self {
        Self { store }
    }

    /// The first alias whose normalized text equals the normalized input.
    pub fn find_alias(&self, text: &str) -> Option<&'a Alias> {
        let needle = normalize(text);
        if needle.is_empty() {
            return None;
        }
        self.store
            .aliases()
            .iter()
            .find(|a| normalize(&a.alias) == needle)
    }

    /// The tag an alias points at, if it still exists.
    pub fn target(&self, alias: &Alias) -> Option<&'a Tag> {
        self.store.find_tag(alias.id)
    }

    /// Canonical string for `text`, or `text` unchanged when no alias matches
    /// or the matching alias is dangling.
    pub fn resolve(&self, text: &str) -> String {
        self.resolve_tag(text)
            .map(|tag| tag.string.clone())
            .unwrap_or_else(|| text.to_string())
    }

    /// The canonical tag an alias spelling resolves to.
    pub fn resolve_tag(&self, text: &str) -> Option<&'a Tag> {
        let alias = self.find_alias(text)?;
        let tag = self.target(alias);
        if tag.is_none() {
            warn!("Alias '{}' points at missing tag {}", alias.alias, alias.id);
        }
        tag
    }

    /// Resolve an exported tag key, keeping the vocab-axis prefix in place.
    pub fn resolve_key(&self, key: &str) -> String {
        match strip_vocab_prefix(key) {
            Some(body) => format!("{VOCAB_PREFIX}{}", self.resolve(body)),
            None => self.resolve(key),
        }
    }

    /// Display label for an alias target; dangling targets render as `(ID n)`.
    pub fn target_label(&self, alias: &Alias) -> String {
        self.target(alias)
            .map(|t| t.string.clone())
            .unwrap_or_else(|| format!("(ID {})", alias.id))
    }
}

/// Body of a `vocab: ` key, matched case-insensitively like persisted records.
pub fn strip_vocab_prefix(key: &str) -> Option<&str> {
    let head = key.get(..VOCAB_PREFIX.len())?;
    if head.eq_ignore_ascii_case(VOCAB_PREFIX) {
        Some(key[VOCAB_PREFIX.len()..].trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VocabularyStore {
        VocabularyStore::from_parts(
            vec![
                Tag::new(TagId::Canonical(1), "Algebra", Category::Predefined),
                Tag::new(TagId::Canonical(2), "Perimeter", Category::Vocab),
            ],
            vec![
                Alias::new("Alg", TagId::Canonical(1)),
                Alias::new("Algy", TagId::Canonical(99)),
                Alias::new("border", TagId::Canonical(2)),
            ],
        )
    }

    #[test]
    fn test_resolve_is_case_insensitive_and_keeps_tag_casing() {
        let store = store();
        let resolver = AliasResolver::new(&store);
        assert_eq!(resolver.resolve("alg"), "Algebra");
        assert_eq!(resolver.resolve("  ALG "), "Algebra");
    }

    #[test]
    fn test_unknown_text_returned_verbatim() {
        let store = store();
        let resolver = AliasResolver::new(&store);
        assert_eq!(resolver.resolve(" Geometry "), " Geometry ");
        assert_eq!(resolver.resolve(""), "");
    }

    #[test]
    fn test_dangling_alias_falls_back_to_input() {
        let store = store();
        let resolver = AliasResolver::new(&store);
        assert_eq!(resolver.resolve("algy"), "algy");
        let dangling = &store.aliases()[1];
        assert_eq!(resolver.target_label(dangling), "(ID 99)");
    }

    #[test]
    fn test_resolve_key_preserves_vocab_prefix() {
        let store = store();
        let resolver = AliasResolver::new(&store);
        assert_eq!(resolver.resolve_key("vocab: Border"), "vocab: Perimeter");
        assert_eq!(resolver.resolve_key("Vocab: border"), "vocab: Perimeter");
        assert_eq!(resolver.resolve_key("Alg"), "Algebra");
    }
}
