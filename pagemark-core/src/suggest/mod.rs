//! Autocomplete for the per-page tag inputs.
//!
//! `engine` computes the ranked suggestion list for a query on one axis.
//! `navigation` holds the keyboard state of a single input box and turns
//! keystrokes into `InputEffect`s the rendering surface applies.

pub mod engine;
pub mod navigation;

pub use engine::{SuggestionEngine, DEFAULT_SUGGESTION_LIMIT};
pub use navigation::{Highlight, InputEffect, Key, SuggestionInput};
