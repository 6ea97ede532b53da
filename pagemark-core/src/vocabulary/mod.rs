//! Vocabulary: canonical tags, aliases, and the operations over them.
//!
//! ## Layout
//!
//! ```text
//! store.rs      VocabularyStore: the two flat collections + id allocation
//! resolver.rs   AliasResolver: literal/alias text -> canonical string
//! mutations.rs  promote / merge / rename / delete / alias edits
//! ```
//!
//! The store is the single writable source. Resolver and suggestion engine
//! borrow it, so they always observe the latest load or mutation.

pub mod mutations;
pub mod resolver;
pub mod store;

pub use resolver::AliasResolver;
pub use store::VocabularyStore;

/// Case-folded, trimmed form used for every vocabulary comparison.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
