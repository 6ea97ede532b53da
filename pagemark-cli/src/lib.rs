// All tagging logic is in pagemark-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod data_dir;
pub mod page_args;

// Re-export core types for convenience
pub use pagemark_core::*;

// Re-export CLI utilities
pub use data_dir::{resolve_data_dir, user_data_dir};
pub use page_args::{parse_page_tag, PageTagArg};
