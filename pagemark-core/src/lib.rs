// Pagemark Core Library
//
// Page-level tagging of documents against a curated two-tier vocabulary
// (canonical tags + aliases). Main interface for resolving, suggesting,
// assigning and exporting tags.

pub mod types;
pub mod error;
pub mod vocabulary;
pub mod suggest;
pub mod assignment;
pub mod export;
pub mod preprocessors;
pub mod session;
pub mod config;
pub mod storage;

// Re-export main types and functions for easy use
pub use types::*;
pub use error::{PagemarkError, Result};
pub use vocabulary::{AliasResolver, VocabularyStore};
pub use suggest::{InputEffect, Key, SuggestionEngine, SuggestionInput};
pub use assignment::{PageTagSets, PageTags};
pub use export::{build_export, compute_new_tags};
pub use preprocessors::{NoOcr, OcrEngine, PageSource, SidecarOcr, TextFilePreprocessor};
pub use session::{AnnotationSession, SubmitReport};
pub use config::PagemarkConfig;
pub use storage::{FileStorage, HttpStorage, MemoryStorage, VocabularyStorage};
