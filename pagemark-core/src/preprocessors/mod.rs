//! Document Preprocessors
//!
//! This module turns a document into per-page text for tagging. PDF parsing
//! and OCR are external collaborators behind two traits:
//!
//! ```text
//! Document
//!     ↓
//! [PageSource]  page count + text runs per page
//!     ↓
//! scraped text (runs joined, trimmed)
//!     ↓ fewer than N words?
//! [OcrEngine]   recognised text for that page
//!     ↓
//! ExtractedDocument
//! ```
//!
//! ## Available Preprocessors
//!
//! - `TextFilePreprocessor` - plain-text exports, pages split on form feed
//! - `SidecarOcr` - pre-recognised OCR text in the same layout
//! - `NoOcr` - OCR disabled

pub mod preprocessor;
pub mod text;

pub use preprocessor::{extract_pages, ExtractedDocument, OcrEngine, PageSource};
pub use text::{NoOcr, SidecarOcr, TextFilePreprocessor};
