//! Export aggregation: page tag assignments -> canonical tag/page index.
//!
//! Topic tags are keyed by their literal text, vocab tags by
//! `"vocab: " + text` so the two axes never collide. Keys are then passed
//! through the alias resolver and page sets of keys that land on the same
//! canonical string are merged.

use crate::assignment::PageTagSets;
use crate::types::*;
use crate::vocabulary::resolver::strip_vocab_prefix;
use crate::vocabulary::{normalize, AliasResolver, VocabularyStore};
use chrono::Utc;
use indexmap::{IndexMap, IndexSet};
use log::info;
use std::collections::{BTreeSet, HashSet};

pub type TagPageIndex = IndexMap<String, BTreeSet<u32>>;

/// Literal (uncanonicalized) tag key -> pages carrying it, in first-use order.
pub fn literal_tag_pages(assignments: &PageTagSets) -> TagPageIndex {
    let mut index = TagPageIndex::new();
    for (i, tags) in assignments.pages().iter().enumerate() {
        let page = (i + 1) as u32;
        for topic in &tags.topic {
            index.entry(topic.clone()).or_default().insert(page);
        }
        for vocab in &tags.vocab {
            index
                .entry(format!("{VOCAB_PREFIX}{vocab}"))
                .or_default()
                .insert(page);
        }
    }
    index
}

/// Re-key a literal index by canonical string, merging page sets.
pub fn canonicalize(literal: TagPageIndex, resolver: &AliasResolver) -> TagPageIndex {
    let mut canonical = TagPageIndex::new();
    for (key, pages) in literal {
        canonical
            .entry(resolver.resolve_key(&key))
            .or_default()
            .extend(pages);
    }
    canonical
}

pub fn page_text_entries(page_texts: &[String], ocr_texts: &[String]) -> Vec<PageTextEntry> {
    page_texts
        .iter()
        .enumerate()
        .map(|(i, text)| PageTextEntry {
            page: (i + 1) as u32,
            scraped_text: text.clone(),
            ocr: ocr_texts
                .get(i)
                .filter(|ocr| !ocr.trim().is_empty())
                .cloned(),
        })
        .collect()
}

pub fn build_export(
    store: &VocabularyStore,
    page_texts: &[String],
    ocr_texts: &[String],
    assignments: &PageTagSets,
    level: &str,
    filename: &str,
) -> ExportRecord {
    let resolver = AliasResolver::new(store);
    let canonical = canonicalize(literal_tag_pages(assignments), &resolver);

    let tags: Vec<TagPages> = canonical
        .into_iter()
        .map(|(string, pages)| TagPages {
            string,
            pages: pages.into_iter().collect(),
        })
        .collect();

    info!(
        "📦 Export '{}': {} page(s), {} canonical tag(s)",
        filename,
        page_texts.len(),
        tags.len()
    );

    ExportRecord {
        filename: filename.to_string(),
        pages: page_text_entries(page_texts, ocr_texts),
        tags,
        level: level.to_string(),
        exported_at: Some(Utc::now()),
    }
}

/// Tag strings used in the document that the vocabulary does not know yet,
/// proposed as `custom` (topic) or `custom vocab` (vocab) entries.
///
/// Comparison against existing tags is case-insensitive; the proposed string
/// keeps the casing of its first use.
pub fn compute_new_tags(assignments: &PageTagSets, store: &VocabularyStore) -> Vec<NewTagCandidate> {
    let known: HashSet<String> = store.tags().iter().map(|t| normalize(&t.string)).collect();

    let mut candidates = Vec::new();
    for axis in Axis::ALL {
        let used: IndexSet<&str> = assignments
            .pages()
            .iter()
            .flat_map(|p| p.axis(axis).iter().map(String::as_str))
            .collect();
        candidates.extend(
            used.into_iter()
                .filter(|s| !known.contains(&normalize(s)))
                .map(|s| NewTagCandidate {
                    string: s.to_string(),
                    category: axis.provisional_category(),
                }),
        );
    }
    candidates
}

/// Rewrite already-exported records so tags spelled as an alias carry the
/// alias target's string. Returns the number of tag entries changed.
pub fn canonicalize_records(records: &mut [ExportRecord], store: &VocabularyStore) -> usize {
    let resolver = AliasResolver::new(store);
    let mut changed = 0;
    for record in records.iter_mut() {
        for tag in record.tags.iter_mut() {
            let (body, is_vocab) = match strip_vocab_prefix(&tag.string) {
                Some(body) => (body, true),
                None => (tag.string.as_str(), false),
            };
            let Some(target) = resolver.resolve_tag(body) else {
                continue;
            };
            let replacement = if is_vocab {
                format!("{VOCAB_PREFIX}{}", target.string)
            } else {
                target.string.clone()
            };
            if replacement != tag.string {
                tag.string = replacement;
                changed += 1;
            }
        }
    }
    changed
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
                Alias::new("border", TagId::Canonical(2)),
            ],
        )
    }

    #[test]
    fn test_alias_and_literal_merge_into_one_entry() {
        let store = store();
        let mut sets = PageTagSets::new(2);
        sets.add_tag(1, Axis::Topic, "Algebra").unwrap();
        sets.add_tag(2, Axis::Topic, "Alg").unwrap();
        let record = build_export(&store, &["p1".into(), "p2".into()], &[], &sets, "5", "a.pdf");
        assert_eq!(
            record.tags,
            vec![TagPages {
                string: "Algebra".to_string(),
                pages: vec![1, 2]
            }]
        );
    }

    #[test]
    fn test_axes_kept_apart() {
        let store = store();
        let mut sets = PageTagSets::new(2);
        sets.add_tag(2, Axis::Topic, "Shapes").unwrap();
        sets.add_tag(1, Axis::Vocab, "Shapes").unwrap();
        sets.add_tag(2, Axis::Vocab, "Border").unwrap();
        let index = canonicalize(literal_tag_pages(&sets), &AliasResolver::new(&store));
        let keys: Vec<_> = index.keys().cloned().collect();
        assert_eq!(keys, vec!["vocab: Shapes", "Shapes", "vocab: Perimeter"]);
        assert_eq!(index["Shapes"], BTreeSet::from([2]));
    }

    #[test]
    fn test_ocr_only_when_non_blank() {
        let entries = page_text_entries(
            &["a".into(), "b".into(), "c".into()],
            &["".into(), "  recognised ".into()],
        );
        assert_eq!(entries[0].ocr, None);
        assert_eq!(entries[1].ocr.as_deref(), Some("  recognised "));
        assert_eq!(entries[2].ocr, None);
        assert_eq!(entries[2].page, 3);
    }

    #[test]
    fn test_new_tags_exclude_known_strings_case_insensitively() {
        let store = store();
        let mut sets = PageTagSets::new(2);
        sets.add_tag(1, Axis::Topic, "algebra").unwrap();
        sets.add_tag(1, Axis::Topic, "Tessellation").unwrap();
        sets.add_tag(2, Axis::Topic, "Tessellation").unwrap();
        sets.add_tag(2, Axis::Vocab, "vertex").unwrap();
        assert_eq!(
            compute_new_tags(&sets, &store),
            vec![
                NewTagCandidate {
                    string: "Tessellation".into(),
                    category: Category::Custom
                },
                NewTagCandidate {
                    string: "vertex".into(),
                    category: Category::CustomVocab
                },
            ]
        );
    }

    #[test]
    fn test_canonicalize_records_rewrites_alias_spellings() {
        let store = store();
        let mut records = vec![ExportRecord {
            filename: "old.pdf".into(),
            pages: Vec::new(),
            tags: vec![
                TagPages { string: "alg".into(), pages: vec![1] },
                TagPages { string: "vocab: BORDER".into(), pages: vec![2] },
                TagPages { string: "Algebra".into(), pages: vec![3] },
                TagPages { string: "Unrelated".into(), pages: vec![4] },
            ],
            level: String::new(),
            exported_at: None,
        }];
        assert_eq!(canonicalize_records(&mut records, &store), 2);
        let strings: Vec<_> = records[0].tags.iter().map(|t| t.string.as_str()).collect();
        assert_eq!(strings, vec!["Algebra", "vocab: Perimeter", "Algebra", "Unrelated"]);
    }
}
