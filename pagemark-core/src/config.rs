use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::preprocessors::text::FORM_FEED;
use crate::suggest::navigation::DEFAULT_BLUR_GRACE_MS;
use crate::suggest::DEFAULT_SUGGESTION_LIMIT;

// Default value functions for serde
fn default_suggestion_limit() -> usize {
    DEFAULT_SUGGESTION_LIMIT
}

fn default_blur_grace_ms() -> u64 {
    DEFAULT_BLUR_GRACE_MS
}

fn default_ocr_word_threshold() -> usize {
    10 // pages with fewer words than this in their text layer get OCR'd
}

fn default_page_separator() -> String {
    FORM_FEED.to_string()
}

fn default_data_dir() -> String {
    "assets".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagemarkConfig {
    #[serde(default)]
    pub suggestions: SuggestionConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Maximum number of suggestions shown per input
    #[serde(default = "default_suggestion_limit")]
    pub limit: usize,
    /// Delay before hiding the list on blur, so a pointer selection lands first
    #[serde(default = "default_blur_grace_ms")]
    pub blur_grace_ms: u64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            limit: default_suggestion_limit(),
            blur_grace_ms: default_blur_grace_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_ocr_word_threshold")]
    pub ocr_word_threshold: usize,
    /// Page separator for plain-text sources
    #[serde(default = "default_page_separator")]
    pub page_separator: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ocr_word_threshold: default_ocr_word_threshold(),
            page_separator: default_page_separator(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Directory holding tags.json, aliases.json and output.json
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Base URL of the annotation server (http backend)
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
            base_url: None,
        }
    }
}

impl PagemarkConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {path}"))?;
        let config: PagemarkConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config {path}"))?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                warn!("⚠️  Failed to load config from {}: {:#}, using defaults", p, e);
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: PagemarkConfig = serde_yaml::from_str(
            "suggestions:\n  limit: 5\nstorage:\n  backend: http\n  base_url: http://localhost:8000\n",
        )
        .unwrap();
        assert_eq!(config.suggestions.limit, 5);
        assert_eq!(config.suggestions.blur_grace_ms, 120);
        assert_eq!(config.extraction.ocr_word_threshold, 10);
        assert_eq!(config.storage.backend, StorageBackend::Http);
        assert_eq!(config.storage.data_dir, "assets");
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = PagemarkConfig::load_with_fallback(Some("/nonexistent/pagemark.yaml"));
        assert_eq!(config.suggestions.limit, 10);
        assert_eq!(config.extraction.page_separator, "\u{c}");
    }
}
