// Preprocessor abstraction for page text extraction
//
// This module defines the boundary between document decoding (PDF -> text
// runs, page images -> OCR text) and tagging. Everything after this point
// only sees per-page strings.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Source of per-page text runs (the embedded text layer of a PDF, or an
/// already-exported text file).
///
/// Pages are 1-based.
pub trait PageSource {
    /// Name for debugging/logging
    fn name(&self) -> &str;

    fn page_count(&self) -> usize;

    /// Text runs of one page in reading order.
    fn page_items(&self, page: usize) -> Result<Vec<String>>;
}

/// Optical character recognition for a single page.
pub trait OcrEngine {
    fn name(&self) -> &str;

    fn recognize(&self, page: usize) -> Result<String>;
}

/// Per-page text of a loaded document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub filename: String,
    pub page_texts: Vec<String>,
    pub ocr_texts: Vec<String>,
}

impl ExtractedDocument {
    pub fn page_count(&self) -> usize {
        self.page_texts.len()
    }
}

/// Scraped text of a page: runs joined with single spaces, trimmed.
pub fn scrape(items: &[String]) -> String {
    items.join(" ").trim().to_string()
}

/// Extract every page in order, falling back to OCR for pages whose text
/// layer has fewer than `ocr_word_threshold` words. Any page failure aborts
/// the whole load.
pub fn extract_pages(
    filename: &str,
    source: &dyn PageSource,
    ocr: &dyn OcrEngine,
    ocr_word_threshold: usize,
) -> Result<ExtractedDocument> {
    let page_count = source.page_count();
    info!(
        "📄 Extracting {} page(s) from {} via {}",
        page_count,
        filename,
        source.name()
    );

    let mut page_texts = Vec::with_capacity(page_count);
    let mut ocr_texts = Vec::with_capacity(page_count);

    for page in 1..=page_count {
        let items = source
            .page_items(page)
            .with_context(|| format!("Failed to read text of page {page}"))?;
        let scraped = scrape(&items);

        let words = scraped.split_whitespace().count();
        let ocr_text = if words < ocr_word_threshold {
            debug!("Page {page}: {words} word(s), running OCR ({})", ocr.name());
            ocr.recognize(page)
                .with_context(|| format!("OCR failed on page {page}"))?
        } else {
            String::new()
        };

        page_texts.push(scraped);
        ocr_texts.push(ocr_text);
    }

    Ok(ExtractedDocument {
        filename: filename.to_string(),
        page_texts,
        ocr_texts,
    })
}
