use crate::assignment::{PageTagSets, PageTags};
use crate::config::PagemarkConfig;
use crate::error::{PagemarkError, Result};
use crate::export::{build_export, compute_new_tags};
use crate::preprocessors::{extract_pages, ExtractedDocument, OcrEngine, PageSource};
use crate::storage::VocabularyStorage;
use crate::suggest::{InputEffect, Key, SuggestionEngine, SuggestionInput};
use crate::types::*;
use crate::vocabulary::VocabularyStore;
use log::info;

/// Outcome of sending an export to the persistence sink.
#[derive(Debug, Clone)]
pub struct SubmitReport {
    pub record: ExportRecord,
    pub candidates: Vec<NewTagCandidate>,
    /// Candidates the sink actually added, with their assigned ids
    pub added: Vec<Tag>,
}

/// State of one tagging session: the vocabulary snapshot, the loaded
/// document, its page tag assignments and the two tag inputs.
///
/// Every method runs to completion synchronously; a rendering surface calls
/// them from its event handlers and applies the returned `InputEffect`s.
pub struct AnnotationSession {
    config: PagemarkConfig,
    store: VocabularyStore,
    document: Option<ExtractedDocument>,
    assignments: PageTagSets,
    current_page: usize,
    topic_input: SuggestionInput,
    vocab_input: SuggestionInput,
}

impl AnnotationSession {
    pub fn new(store: VocabularyStore, config: PagemarkConfig) -> Self {
        let grace = config.suggestions.blur_grace_ms;
        Self {
            config,
            store,
            document: None,
            assignments: PageTagSets::default(),
            current_page: 0,
            topic_input: SuggestionInput::with_grace(Axis::Topic, grace),
            vocab_input: SuggestionInput::with_grace(Axis::Vocab, grace),
        }
    }

    pub fn config(&self) -> &PagemarkConfig {
        &self.config
    }

    pub fn store(&self) -> &VocabularyStore {
        &self.store
    }

    /// Administrative access; the inputs are reset so no suggestion list
    /// computed against the old vocabulary stays on screen.
    pub fn store_mut(&mut self) -> &mut VocabularyStore {
        self.topic_input.reset();
        self.vocab_input.reset();
        &mut self.store
    }

    pub fn replace_vocabulary(&mut self, store: VocabularyStore) {
        self.store = store;
        self.topic_input.reset();
        self.vocab_input.reset();
    }

    // ===== DOCUMENT =====

    /// Extract a document and start tagging it from page 1.
    pub fn load_document(
        &mut self,
        filename: &str,
        source: &dyn PageSource,
        ocr: &dyn OcrEngine,
    ) -> anyhow::Result<usize> {
        let document = extract_pages(
            filename,
            source,
            ocr,
            self.config.extraction.ocr_word_threshold,
        )?;
        Ok(self.open(document))
    }

    /// Start tagging an already extracted document. All previous assignments
    /// are discarded.
    pub fn open(&mut self, document: ExtractedDocument) -> usize {
        let page_count = document.page_count();
        self.assignments.reset_for_page_count(page_count);
        self.current_page = if page_count > 0 { 1 } else { 0 };
        self.topic_input.reset();
        self.vocab_input.reset();
        info!("📄 Opened {} ({} pages)", document.filename, page_count);
        self.document = Some(document);
        page_count
    }

    pub fn document(&self) -> Option<&ExtractedDocument> {
        self.document.as_ref()
    }

    pub fn page_count(&self) -> usize {
        self.assignments.page_count()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Scraped and OCR text of the current page.
    pub fn current_text(&self) -> Option<(&str, &str)> {
        let doc = self.document.as_ref()?;
        let idx = self.current_page.checked_sub(1)?;
        let text = doc.page_texts.get(idx)?;
        let ocr = doc.ocr_texts.get(idx).map(String::as_str).unwrap_or("");
        Some((text.as_str(), ocr))
    }

    pub fn go_to(&mut self, page: usize) -> Result<()> {
        self.assignments.page(page)?;
        self.current_page = page;
        Ok(())
    }

    /// Returns false when already on the last page.
    pub fn next_page(&mut self) -> bool {
        if self.current_page < self.page_count() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Returns false when already on the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    // ===== TAGGING =====

    pub fn page_tags(&self, page: usize) -> Result<&PageTags> {
        self.assignments.page(page)
    }

    pub fn assignments(&self) -> &PageTagSets {
        &self.assignments
    }

    fn require_document(&self) -> Result<()> {
        if self.document.is_none() || self.current_page == 0 {
            return Err(PagemarkError::NoDocument);
        }
        Ok(())
    }

    pub fn add_tag(&mut self, axis: Axis, text: &str) -> Result<bool> {
        self.require_document()?;
        self.assignments.add_tag(self.current_page, axis, text)
    }

    pub fn remove_tag(&mut self, axis: Axis, index: usize) -> Result<String> {
        self.require_document()?;
        self.assignments.remove_tag(self.current_page, axis, index)
    }

    pub fn copy_to_all(&mut self) -> Result<()> {
        self.require_document()?;
        self.assignments.copy_current_to_all(self.current_page)?;
        info!("Copied tags of page {} to all pages", self.current_page);
        Ok(())
    }

    // ===== INPUT EVENTS =====

    pub fn input_state(&self, axis: Axis) -> &SuggestionInput {
        match axis {
            Axis::Topic => &self.topic_input,
            Axis::Vocab => &self.vocab_input,
        }
    }

    /// The text of an input changed.
    pub fn input(&mut self, axis: Axis, text: &str) -> InputEffect {
        let engine = SuggestionEngine::with_limit(&self.store, self.config.suggestions.limit);
        let input = match axis {
            Axis::Topic => &mut self.topic_input,
            Axis::Vocab => &mut self.vocab_input,
        };
        input.set_text(text, &engine)
    }

    pub fn key(&mut self, axis: Axis, key: Key) -> Result<InputEffect> {
        if key == Key::Enter {
            self.require_document()?;
        }
        let engine = SuggestionEngine::with_limit(&self.store, self.config.suggestions.limit);
        let input = match axis {
            Axis::Topic => &mut self.topic_input,
            Axis::Vocab => &mut self.vocab_input,
        };
        let effect = input.key(key, &engine);
        self.apply(axis, effect)
    }

    /// Pointer selection of a displayed suggestion.
    pub fn select(&mut self, axis: Axis, choice: &str) -> Result<InputEffect> {
        self.require_document()?;
        let effect = match axis {
            Axis::Topic => self.topic_input.select(choice),
            Axis::Vocab => self.vocab_input.select(choice),
        };
        self.apply(axis, effect)
    }

    pub fn blur(&mut self, axis: Axis) -> InputEffect {
        match axis {
            Axis::Topic => self.topic_input.blur(),
            Axis::Vocab => self.vocab_input.blur(),
        }
    }

    fn apply(&mut self, axis: Axis, effect: InputEffect) -> Result<InputEffect> {
        if let InputEffect::Committed(tag) = &effect {
            self.assignments.add_tag(self.current_page, axis, tag)?;
        }
        Ok(effect)
    }

    // ===== EXPORT =====

    /// The export record for the current document and the tags it would add
    /// to the vocabulary.
    pub fn export(&self, level: &str) -> Result<(ExportRecord, Vec<NewTagCandidate>)> {
        let document = self.document.as_ref().ok_or(PagemarkError::NoDocument)?;
        let record = build_export(
            &self.store,
            &document.page_texts,
            &document.ocr_texts,
            &self.assignments,
            level,
            &document.filename,
        );
        let candidates = compute_new_tags(&self.assignments, &self.store);
        Ok((record, candidates))
    }

    /// Append the export to the sink, then offer the new-tag delta. Tags the
    /// sink accepts are folded into the local vocabulary.
    pub fn submit(&mut self, storage: &dyn VocabularyStorage, level: &str) -> anyhow::Result<SubmitReport> {
        let (record, candidates) = self.export(level)?;
        storage.append_export(&record)?;

        let added = if candidates.is_empty() {
            Vec::new()
        } else {
            storage.append_new_tags(&candidates)?
        };
        let absorbed = self.store.absorb_added(added.clone());
        info!(
            "✅ Submitted {} ({} new tag candidate(s), {} added)",
            record.filename,
            candidates.len(),
            absorbed
        );

        Ok(SubmitReport {
            record,
            candidates,
            added,
        })
    }
}
