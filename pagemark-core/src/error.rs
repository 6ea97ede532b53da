//! Domain errors for vocabulary, assignment and session operations.
//!
//! Every operation that returns one of these has left its state untouched.
//! I/O layers (storage, extraction, config) use `anyhow` instead.

use crate::types::TagId;

pub type Result<T> = std::result::Result<T, PagemarkError>;

#[derive(Debug, thiserror::Error)]
pub enum PagemarkError {
    /// Tag or alias text was blank after trimming
    #[error("{0} cannot be empty")]
    EmptyText(&'static str),

    #[error("Tag not found: {0}")]
    TagNotFound(TagId),

    #[error("Alias not found at index {0}")]
    AliasNotFound(usize),

    #[error("Page {page} is out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },

    #[error("No tag at position {index} on page {page}")]
    TagIndexOutOfRange { page: usize, index: usize },

    /// Only custom tags can be promoted or merged
    #[error("Tag {0} is not a custom tag")]
    NotProvisional(TagId),

    /// Merge targets must be canonical
    #[error("Tag {0} is not a canonical tag")]
    NotCanonical(TagId),

    #[error("Tag id {0} is already in use")]
    IdCollision(TagId),

    #[error("Invalid tag id: '{0}'")]
    InvalidTagId(String),

    #[error("Invalid category: '{0}'")]
    InvalidCategory(String),

    #[error("Invalid axis: '{0}' (expected topic or vocab)")]
    InvalidAxis(String),

    #[error("No document loaded")]
    NoDocument,
}
