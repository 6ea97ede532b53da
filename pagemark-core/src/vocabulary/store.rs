use crate::error::{PagemarkError, Result};
use crate::types::*;
use log::{debug, info};

use super::normalize;

/// In-memory tag and alias collections for one session.
///
/// Tags keep their load order; suggestion ranking and admin listings
/// depend on it. Tag strings are not required to be unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VocabularyStore {
    tags: Vec<Tag>,
    aliases: Vec<Alias>,
}

impl VocabularyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from the two persisted collections.
    pub fn from_parts(tags: Vec<Tag>, aliases: Vec<Alias>) -> Self {
        info!(
            "📚 Vocabulary loaded: {} tags, {} aliases",
            tags.len(),
            aliases.len()
        );
        Self { tags, aliases }
    }

    /// Working copy over an already loaded tag list, without the load log.
    pub(crate) fn from_tags(tags: Vec<Tag>) -> Self {
        Self {
            tags,
            aliases: Vec::new(),
        }
    }

    /// Replace both collections, e.g. after re-reading the server copy.
    pub fn replace(&mut self, tags: Vec<Tag>, aliases: Vec<Alias>) {
        *self = Self::from_parts(tags, aliases);
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    pub fn list_tags(&self, category: Option<Category>) -> Vec<&Tag> {
        self.tags
            .iter()
            .filter(|t| category.map_or(true, |c| t.category == c))
            .collect()
    }

    pub fn list_aliases(&self) -> &[Alias] {
        &self.aliases
    }

    pub fn find_tag(&self, id: TagId) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    pub fn alias(&self, index: usize) -> Option<&Alias> {
        self.aliases.get(index)
    }

    pub fn contains_string(&self, text: &str) -> bool {
        let needle = normalize(text);
        self.tags.iter().any(|t| normalize(&t.string) == needle)
    }

    fn position(&self, id: TagId) -> Result<usize> {
        self.tags
            .iter()
            .position(|t| t.id == id)
            .ok_or(PagemarkError::TagNotFound(id))
    }

    pub fn add_tag(&mut self, tag: Tag) -> Result<()> {
        if self.find_tag(tag.id).is_some() {
            return Err(PagemarkError::IdCollision(tag.id));
        }
        debug!("Adding tag {} '{}' ({})", tag.id, tag.string, tag.category);
        self.tags.push(tag);
        Ok(())
    }

    pub fn remove_tag(&mut self, id: TagId) -> Result<Tag> {
        let idx = self.position(id)?;
        Ok(self.tags.remove(idx))
    }

    pub fn update_tag_string(&mut self, id: TagId, new_string: &str) -> Result<()> {
        let idx = self.position(id)?;
        self.tags[idx].string = new_string.to_string();
        Ok(())
    }

    /// Move a tag to another category under a new id. The new id must be free
    /// (re-using the tag's own id is allowed).
    pub fn update_tag_category(&mut self, id: TagId, category: Category, new_id: TagId) -> Result<()> {
        let idx = self.position(id)?;
        if new_id != id && self.find_tag(new_id).is_some() {
            return Err(PagemarkError::IdCollision(new_id));
        }
        let tag = &mut self.tags[idx];
        tag.category = category;
        tag.id = new_id;
        Ok(())
    }

    pub(crate) fn push_alias(&mut self, alias: Alias) {
        self.aliases.push(alias);
    }

    pub(crate) fn alias_mut(&mut self, index: usize) -> Result<&mut Alias> {
        self.aliases
            .get_mut(index)
            .ok_or(PagemarkError::AliasNotFound(index))
    }

    pub(crate) fn remove_alias(&mut self, index: usize) -> Result<Alias> {
        if index >= self.aliases.len() {
            return Err(PagemarkError::AliasNotFound(index));
        }
        Ok(self.aliases.remove(index))
    }

    // ===== ID ALLOCATION =====

    /// Next permanent id: one past the largest integer id in use.
    pub fn next_canonical_id(&self) -> TagId {
        let max = self
            .tags
            .iter()
            .filter_map(|t| match t.id {
                TagId::Canonical(n) => Some(n),
                TagId::Provisional(_) => None,
            })
            .max()
            .unwrap_or(0);
        TagId::Canonical(max + 1)
    }

    /// Next custom id: one past the largest `x<N>` in use.
    pub fn next_provisional_id(&self) -> TagId {
        let max = self
            .tags
            .iter()
            .filter_map(|t| match t.id {
                TagId::Provisional(n) => Some(n),
                TagId::Canonical(_) => None,
            })
            .max()
            .unwrap_or(0);
        TagId::Provisional(max + 1)
    }

    /// Fold in tags the persistence sink reports as newly added. Entries whose
    /// id is already present locally are skipped.
    pub fn absorb_added(&mut self, added: Vec<Tag>) -> usize {
        let mut absorbed = 0;
        for tag in added {
            if self.find_tag(tag.id).is_none() {
                self.tags.push(tag);
                absorbed += 1;
            }
        }
        absorbed
    }

    // ===== ADMIN VIEWS =====

    /// Custom tags whose string contains `filter` (case-insensitive substring).
    pub fn custom_tags(&self, filter: &str) -> Vec<&Tag> {
        let filter = normalize(filter);
        self.tags
            .iter()
            .filter(|t| t.category.is_provisional())
            .filter(|t| filter.is_empty() || t.string.to_lowercase().contains(&filter))
            .collect()
    }

    /// Canonical tags a custom tag may be merged into.
    pub fn alias_targets(&self, filter: &str) -> Vec<&Tag> {
        let filter = normalize(filter);
        self.tags
            .iter()
            .filter(|t| !t.category.is_provisional())
            .filter(|t| filter.is_empty() || t.string.to_lowercase().contains(&filter))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VocabularyStore {
        VocabularyStore::from_parts(
            vec![
                Tag::new(TagId::Canonical(1), "Algebra", Category::Predefined),
                Tag::new(TagId::Canonical(7), "angle", Category::Vocab),
                Tag::new(TagId::Provisional(3), "Fractals", Category::Custom),
                Tag::new(TagId::Provisional(4), "ratio", Category::CustomVocab),
            ],
            vec![Alias::new("Alg", TagId::Canonical(1))],
        )
    }

    #[test]
    fn test_id_allocation_uses_disjoint_namespaces() {
        let store = store();
        assert_eq!(store.next_canonical_id(), TagId::Canonical(8));
        assert_eq!(store.next_provisional_id(), TagId::Provisional(5));
        assert_eq!(VocabularyStore::new().next_canonical_id(), TagId::Canonical(1));
        assert_eq!(VocabularyStore::new().next_provisional_id(), TagId::Provisional(1));
    }

    #[test]
    fn test_add_tag_rejects_duplicate_id() {
        let mut store = store();
        let err = store
            .add_tag(Tag::new(TagId::Canonical(7), "other", Category::Vocab))
            .unwrap_err();
        assert!(matches!(err, PagemarkError::IdCollision(TagId::Canonical(7))));
        assert_eq!(store.tags().len(), 4);
    }

    #[test]
    fn test_update_category_refuses_taken_id() {
        let mut store = store();
        let before = store.clone();
        assert!(store
            .update_tag_category(TagId::Provisional(3), Category::Predefined, TagId::Canonical(1))
            .is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn test_admin_filters() {
        let store = store();
        let custom: Vec<_> = store.custom_tags("").iter().map(|t| t.string.clone()).collect();
        assert_eq!(custom, vec!["Fractals", "ratio"]);
        assert_eq!(store.custom_tags("RAC").len(), 1);
        let targets: Vec<_> = store.alias_targets("g").iter().map(|t| t.string.clone()).collect();
        assert_eq!(targets, vec!["Algebra", "angle"]);
    }

    #[test]
    fn test_list_tags_by_category() {
        let store = store();
        assert_eq!(store.list_tags(None).len(), 4);
        assert_eq!(store.list_tags(Some(Category::Vocab))[0].string, "angle");
    }

    #[test]
    fn test_absorb_added_skips_known_ids() {
        let mut store = store();
        let absorbed = store.absorb_added(vec![
            Tag::new(TagId::Provisional(3), "Fractals", Category::Custom),
            Tag::new(TagId::Provisional(5), "Tessellation", Category::Custom),
        ]);
        assert_eq!(absorbed, 1);
        assert!(store.contains_string("tessellation"));
    }
}
