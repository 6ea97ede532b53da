// Administrative transitions on the vocabulary.
//
// A custom tag ends in exactly one of three ways: promoted to a canonical
// category under a fresh integer id, merged into an alias of a canonical tag,
// or deleted. Promoted tags afterwards only support rename and delete.
//
// Every operation validates before mutating, so a returned error means the
// store is unchanged.

use crate::error::{PagemarkError, Result};
use crate::types::*;
use log::info;

use super::VocabularyStore;

fn non_empty<'a>(text: &'a str, what: &'static str) -> Result<&'a str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(PagemarkError::EmptyText(what))
    } else {
        Ok(trimmed)
    }
}

impl VocabularyStore {
    /// Promote a custom tag (`custom` -> `predefined`, `custom vocab` -> `vocab`)
    /// and give it the next free integer id. Returns the new id.
    pub fn promote(&mut self, id: TagId) -> Result<TagId> {
        let tag = self.find_tag(id).ok_or(PagemarkError::TagNotFound(id))?;
        if !tag.category.is_provisional() {
            return Err(PagemarkError::NotProvisional(id));
        }
        let category = tag.category.promoted();
        let new_id = self.next_canonical_id();
        self.update_tag_category(id, category, new_id)?;
        info!("Promoted tag {id} to {category} as {new_id}");
        Ok(new_id)
    }

    /// Fold a custom tag into an alias of a canonical tag: the custom tag is
    /// removed and its string now redirects to `target`.
    pub fn merge_into_alias(&mut self, id: TagId, target: TagId) -> Result<Alias> {
        let source = self.find_tag(id).ok_or(PagemarkError::TagNotFound(id))?;
        if !source.category.is_provisional() {
            return Err(PagemarkError::NotProvisional(id));
        }
        let target_tag = self
            .find_tag(target)
            .ok_or(PagemarkError::TagNotFound(target))?;
        if target_tag.category.is_provisional() {
            return Err(PagemarkError::NotCanonical(target));
        }

        let removed = self.remove_tag(id)?;
        let alias = Alias::new(&removed.string, target);
        self.push_alias(alias.clone());
        info!("Merged '{}' into alias of {}", removed.string, target);
        Ok(alias)
    }

    /// Rename a tag in place. Aliases reference ids, so they follow the rename.
    pub fn rename_tag(&mut self, id: TagId, new_string: &str) -> Result<()> {
        let new_string = non_empty(new_string, "Tag")?;
        self.update_tag_string(id, new_string)?;
        info!("Renamed tag {id} to '{new_string}'");
        Ok(())
    }

    /// Delete a tag. Aliases still pointing at it are left dangling.
    pub fn delete_tag(&mut self, id: TagId) -> Result<Tag> {
        let removed = self.remove_tag(id)?;
        let dangling = self.aliases().iter().filter(|a| a.id == id).count();
        info!(
            "Deleted tag {} '{}' ({} alias(es) now dangling)",
            id, removed.string, dangling
        );
        Ok(removed)
    }

    pub fn edit_alias(&mut self, index: usize, new_alias: &str) -> Result<()> {
        let new_alias = non_empty(new_alias, "Alias")?;
        self.alias_mut(index)?.alias = new_alias.to_string();
        Ok(())
    }

    pub fn delete_alias(&mut self, index: usize) -> Result<Alias> {
        let removed = self.remove_alias(index)?;
        info!("Deleted alias '{}'", removed.alias);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::AliasResolver;

    fn store() -> VocabularyStore {
        VocabularyStore::from_parts(
            vec![
                Tag::new(TagId::Canonical(1), "Algebra", Category::Predefined),
                Tag::new(TagId::Canonical(5), "angle", Category::Vocab),
                Tag::new(TagId::Provisional(1), "Fractals", Category::Custom),
                Tag::new(TagId::Provisional(2), "Alg.", Category::Custom),
                Tag::new(TagId::Provisional(3), "ratio", Category::CustomVocab),
            ],
            vec![Alias::new("Alg", TagId::Canonical(1))],
        )
    }

    #[test]
    fn test_promote_assigns_fresh_ids_in_sequence() {
        let mut store = store();
        let first = store.promote(TagId::Provisional(1)).unwrap();
        let second = store.promote(TagId::Provisional(3)).unwrap();
        assert_eq!(first, TagId::Canonical(6));
        assert_eq!(second, TagId::Canonical(7));
        assert_eq!(store.find_tag(first).unwrap().category, Category::Predefined);
        assert_eq!(store.find_tag(second).unwrap().category, Category::Vocab);
        assert!(store.find_tag(TagId::Provisional(1)).is_none());
    }

    #[test]
    fn test_promote_rejects_canonical_tag() {
        let mut store = store();
        assert!(matches!(
            store.promote(TagId::Canonical(1)),
            Err(PagemarkError::NotProvisional(_))
        ));
    }

    #[test]
    fn test_merge_creates_alias_and_removes_tag() {
        let mut store = store();
        let alias = store
            .merge_into_alias(TagId::Provisional(2), TagId::Canonical(1))
            .unwrap();
        assert_eq!(alias.alias, "Alg.");
        assert!(store.find_tag(TagId::Provisional(2)).is_none());
        assert_eq!(AliasResolver::new(&store).resolve("alg."), "Algebra");
    }

    #[test]
    fn test_merge_into_missing_or_custom_target_is_rejected() {
        let mut store = store();
        let before = store.clone();
        assert!(store
            .merge_into_alias(TagId::Provisional(2), TagId::Canonical(42))
            .is_err());
        assert!(matches!(
            store.merge_into_alias(TagId::Provisional(2), TagId::Provisional(1)),
            Err(PagemarkError::NotCanonical(_))
        ));
        assert_eq!(store, before);
    }

    #[test]
    fn test_rename_is_transparent_to_aliases() {
        let mut store = store();
        store.rename_tag(TagId::Canonical(1), "  Algebra I ").unwrap();
        assert_eq!(AliasResolver::new(&store).resolve("ALG"), "Algebra I");
        assert!(matches!(
            store.rename_tag(TagId::Canonical(1), "   "),
            Err(PagemarkError::EmptyText(_))
        ));
    }

    #[test]
    fn test_delete_leaves_dangling_alias() {
        let mut store = store();
        store.delete_tag(TagId::Canonical(1)).unwrap();
        let resolver = AliasResolver::new(&store);
        assert_eq!(resolver.resolve("Alg"), "Alg");
        assert_eq!(resolver.target_label(&store.aliases()[0]), "(ID 1)");
    }

    #[test]
    fn test_alias_edit_and_delete() {
        let mut store = store();
        store.edit_alias(0, "Algeb").unwrap();
        assert_eq!(store.aliases()[0].alias, "Algeb");
        assert!(store.edit_alias(0, "").is_err());
        assert!(store.edit_alias(3, "x").is_err());
        store.delete_alias(0).unwrap();
        assert!(store.aliases().is_empty());
        assert!(matches!(store.delete_alias(0), Err(PagemarkError::AliasNotFound(0))));
    }
}
