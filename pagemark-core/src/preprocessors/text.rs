//! Plain-text page sources.
//!
//! Text exports (e.g. `pdftotext` output) separate pages with a form feed.
//! Each non-blank line of a page becomes one text run.

use super::preprocessor::{OcrEngine, PageSource};
use anyhow::{anyhow, Context, Result};
use std::path::Path;

pub const FORM_FEED: &str = "\u{c}";

fn split_pages(content: &str, separator: &str) -> Vec<String> {
    let mut pages: Vec<String> = content.split(separator).map(str::to_string).collect();
    // A trailing separator closes the last page rather than opening a new one.
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
}

pub struct TextFilePreprocessor {
    name: String,
    pages: Vec<String>,
}

impl TextFilePreprocessor {
    pub fn from_text(content: &str, separator: &str) -> Self {
        Self {
            name: "text".to_string(),
            pages: split_pages(content, separator),
        }
    }

    pub fn from_file(path: &Path, separator: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut preprocessor = Self::from_text(&content, separator);
        preprocessor.name = format!("text:{}", path.display());
        Ok(preprocessor)
    }
}

impl PageSource for TextFilePreprocessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_items(&self, page: usize) -> Result<Vec<String>> {
        let text = page
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx))
            .ok_or_else(|| anyhow!("Page {} out of range (1..={})", page, self.pages.len()))?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// OCR disabled: every page recognises as empty.
pub struct NoOcr;

impl OcrEngine for NoOcr {
    fn name(&self) -> &str {
        "none"
    }

    fn recognize(&self, _page: usize) -> Result<String> {
        Ok(String::new())
    }
}

/// OCR text produced ahead of time, one page per separator-delimited block.
/// Pages past the end recognise as empty.
pub struct SidecarOcr {
    pages: Vec<String>,
}

impl SidecarOcr {
    pub fn from_text(content: &str, separator: &str) -> Self {
        Self {
            pages: split_pages(content, separator),
        }
    }

    pub fn from_file(path: &Path, separator: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read OCR sidecar {}", path.display()))?;
        Ok(Self::from_text(&content, separator))
    }
}

impl OcrEngine for SidecarOcr {
    fn name(&self) -> &str {
        "sidecar"
    }

    fn recognize(&self, page: usize) -> Result<String> {
        Ok(page
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx))
            .map(|p| p.trim().to_string())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_split_on_form_feed() {
        let source = TextFilePreprocessor::from_text("Title\n\n  body line \n\u{c}second\u{c}", FORM_FEED);
        assert_eq!(source.page_count(), 2);
        assert_eq!(source.page_items(1).unwrap(), vec!["Title", "body line"]);
        assert_eq!(source.page_items(2).unwrap(), vec!["second"]);
        assert!(source.page_items(3).is_err());
        assert!(source.page_items(0).is_err());
    }

    #[test]
    fn test_sidecar_missing_pages_are_empty() {
        let ocr = SidecarOcr::from_text(" scanned words \u{c}", FORM_FEED);
        assert_eq!(ocr.recognize(1).unwrap(), "scanned words");
        assert_eq!(ocr.recognize(4).unwrap(), "");
    }
}
