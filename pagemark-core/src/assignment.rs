use crate::error::{PagemarkError, Result};
use crate::types::Axis;
use serde::{Deserialize, Serialize};

/// Topic and vocab tags chosen for one page, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTags {
    pub topic: Vec<String>,
    pub vocab: Vec<String>,
}

impl PageTags {
    pub fn axis(&self, axis: Axis) -> &[String] {
        match axis {
            Axis::Topic => &self.topic,
            Axis::Vocab => &self.vocab,
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut Vec<String> {
        match axis {
            Axis::Topic => &mut self.topic,
            Axis::Vocab => &mut self.vocab,
        }
    }
}

/// Per-page tag assignments for the loaded document. Pages are 1-based.
///
/// Tags are stored as typed; alias canonicalization happens only at export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTagSets {
    pages: Vec<PageTags>,
}

impl PageTagSets {
    pub fn new(page_count: usize) -> Self {
        Self {
            pages: vec![PageTags::default(); page_count],
        }
    }

    /// Drop every assignment and start over with `page_count` empty pages.
    pub fn reset_for_page_count(&mut self, page_count: usize) {
        self.pages = vec![PageTags::default(); page_count];
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[PageTags] {
        &self.pages
    }

    pub fn page(&self, page: usize) -> Result<&PageTags> {
        let idx = self.index(page)?;
        Ok(&self.pages[idx])
    }

    fn index(&self, page: usize) -> Result<usize> {
        if page == 0 || page > self.pages.len() {
            return Err(PagemarkError::PageOutOfRange {
                page,
                count: self.pages.len(),
            });
        }
        Ok(page - 1)
    }

    /// Append the trimmed `text` unless the exact string is already on that
    /// page/axis. Returns whether anything was added.
    pub fn add_tag(&mut self, page: usize, axis: Axis, text: &str) -> Result<bool> {
        let idx = self.index(page)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(PagemarkError::EmptyText("Tag"));
        }
        let tags = self.pages[idx].axis_mut(axis);
        if tags.iter().any(|t| t == text) {
            return Ok(false);
        }
        tags.push(text.to_string());
        Ok(true)
    }

    pub fn remove_tag(&mut self, page: usize, axis: Axis, index: usize) -> Result<String> {
        let idx = self.index(page)?;
        let tags = self.pages[idx].axis_mut(axis);
        if index >= tags.len() {
            return Err(PagemarkError::TagIndexOutOfRange { page, index });
        }
        Ok(tags.remove(index))
    }

    /// Overwrite every page with a copy of `page`'s tags as they are now.
    pub fn copy_current_to_all(&mut self, page: usize) -> Result<()> {
        let idx = self.index(page)?;
        let snapshot = self.pages[idx].clone();
        for tags in self.pages.iter_mut() {
            *tags = snapshot.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_exact_match_dedup() {
        let mut sets = PageTagSets::new(2);
        assert!(sets.add_tag(1, Axis::Topic, "x").unwrap());
        assert!(!sets.add_tag(1, Axis::Topic, "x").unwrap());
        assert!(sets.add_tag(1, Axis::Topic, "X").unwrap());
        assert!(sets.add_tag(1, Axis::Vocab, "x").unwrap());
        assert_eq!(sets.page(1).unwrap().topic, vec!["x", "X"]);
        assert!(sets.page(2).unwrap().topic.is_empty());
    }

    #[test]
    fn test_blank_tag_rejected() {
        let mut sets = PageTagSets::new(1);
        assert!(matches!(
            sets.add_tag(1, Axis::Topic, "   "),
            Err(PagemarkError::EmptyText("Tag"))
        ));
        assert!(sets.add_tag(1, Axis::Vocab, " apex ").unwrap());
        assert!(!sets.add_tag(1, Axis::Vocab, "apex").unwrap());
        assert!(sets.page(1).unwrap().topic.is_empty());
        assert_eq!(sets.page(1).unwrap().vocab, vec!["apex"]);
    }

    #[test]
    fn test_remove_by_position() {
        let mut sets = PageTagSets::new(1);
        sets.add_tag(1, Axis::Vocab, "a").unwrap();
        sets.add_tag(1, Axis::Vocab, "b").unwrap();
        assert_eq!(sets.remove_tag(1, Axis::Vocab, 0).unwrap(), "a");
        assert_eq!(sets.page(1).unwrap().vocab, vec!["b"]);
        assert!(matches!(
            sets.remove_tag(1, Axis::Vocab, 5),
            Err(PagemarkError::TagIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_copy_to_all_is_a_snapshot() {
        let mut sets = PageTagSets::new(3);
        sets.add_tag(3, Axis::Topic, "stale").unwrap();
        sets.add_tag(2, Axis::Topic, "Geometry").unwrap();
        sets.add_tag(2, Axis::Vocab, "angle").unwrap();
        sets.copy_current_to_all(2).unwrap();
        for tags in sets.pages() {
            assert_eq!(tags.topic, vec!["Geometry"]);
            assert_eq!(tags.vocab, vec!["angle"]);
        }

        sets.add_tag(2, Axis::Topic, "Later").unwrap();
        assert_eq!(sets.page(1).unwrap().topic, vec!["Geometry"]);
    }

    #[test]
    fn test_page_bounds() {
        let mut sets = PageTagSets::new(2);
        assert!(sets.add_tag(0, Axis::Topic, "a").is_err());
        assert!(sets.add_tag(3, Axis::Topic, "a").is_err());
        sets.reset_for_page_count(4);
        assert_eq!(sets.page_count(), 4);
        assert!(sets.add_tag(4, Axis::Topic, "a").is_ok());
    }
}
