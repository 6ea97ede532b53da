use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::PagemarkError;

// ===== IDENTIFIERS =====
// Canonical tags carry a permanent integer id. Custom tags awaiting
// promotion live in a separate "x"-prefixed namespace. On the wire the two
// stay in the flat JSON shape: `3` vs `"x3"`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagId {
    Canonical(u64),
    Provisional(u64),
}

impl TagId {
    pub fn is_provisional(&self) -> bool {
        matches!(self, TagId::Provisional(_))
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagId::Canonical(n) => write!(f, "{n}"),
            TagId::Provisional(n) => write!(f, "x{n}"),
        }
    }
}

impl FromStr for TagId {
    type Err = PagemarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || PagemarkError::InvalidTagId(s.to_string());
        match s.strip_prefix('x') {
            Some(rest) => rest.parse().map(TagId::Provisional).map_err(|_| invalid()),
            None => s.parse().map(TagId::Canonical).map_err(|_| invalid()),
        }
    }
}

impl Serialize for TagId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TagId::Canonical(n) => serializer.serialize_u64(*n),
            TagId::Provisional(_) => serializer.collect_str(self),
        }
    }
}

struct TagIdVisitor;

impl<'de> Visitor<'de> for TagIdVisitor {
    type Value = TagId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer id or a string like \"x3\"")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<TagId, E> {
        Ok(TagId::Canonical(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<TagId, E> {
        u64::try_from(v)
            .map(TagId::Canonical)
            .map_err(|_| E::custom(format!("negative tag id {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TagId, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for TagId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TagIdVisitor)
    }
}

// ===== CATEGORIES & AXES =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "predefined")]
    Predefined,
    #[serde(rename = "vocab")]
    Vocab,
    #[serde(rename = "custom")]
    Custom,
    #[serde(rename = "custom vocab")]
    CustomVocab,
}

impl Category {
    pub fn axis(&self) -> Axis {
        match self {
            Category::Predefined | Category::Custom => Axis::Topic,
            Category::Vocab | Category::CustomVocab => Axis::Vocab,
        }
    }

    pub fn is_provisional(&self) -> bool {
        matches!(self, Category::Custom | Category::CustomVocab)
    }

    /// The stable category a provisional one is promoted into.
    /// Canonical categories map to themselves.
    pub fn promoted(&self) -> Category {
        match self {
            Category::Custom => Category::Predefined,
            Category::CustomVocab => Category::Vocab,
            other => *other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Predefined => "predefined",
            Category::Vocab => "vocab",
            Category::Custom => "custom",
            Category::CustomVocab => "custom vocab",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = PagemarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "predefined" => Ok(Category::Predefined),
            "vocab" => Ok(Category::Vocab),
            "custom" => Ok(Category::Custom),
            "custom vocab" | "custom-vocab" => Ok(Category::CustomVocab),
            other => Err(PagemarkError::InvalidCategory(other.to_string())),
        }
    }
}

/// The topic/vocab dimension a tag input draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Topic,
    Vocab,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Topic, Axis::Vocab];

    pub fn canonical_category(&self) -> Category {
        match self {
            Axis::Topic => Category::Predefined,
            Axis::Vocab => Category::Vocab,
        }
    }

    pub fn provisional_category(&self) -> Category {
        match self {
            Axis::Topic => Category::Custom,
            Axis::Vocab => Category::CustomVocab,
        }
    }

    /// Canonical category first, then its provisional counterpart.
    pub fn categories(&self) -> [Category; 2] {
        [self.canonical_category(), self.provisional_category()]
    }

    pub fn contains(&self, category: Category) -> bool {
        category.axis() == *self
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Topic => f.write_str("topic"),
            Axis::Vocab => f.write_str("vocab"),
        }
    }
}

impl FromStr for Axis {
    type Err = PagemarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "topic" => Ok(Axis::Topic),
            "vocab" => Ok(Axis::Vocab),
            other => Err(PagemarkError::InvalidAxis(other.to_string())),
        }
    }
}

// ===== VOCABULARY RECORDS =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub string: String,
    pub category: Category,
}

impl Tag {
    pub fn new(id: TagId, string: &str, category: Category) -> Self {
        Self {
            id,
            string: string.to_string(),
            category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub alias: String,
    pub id: TagId,
}

impl Alias {
    pub fn new(alias: &str, id: TagId) -> Self {
        Self {
            alias: alias.to_string(),
            id,
        }
    }
}

/// A tag string proposed for dictionary growth, before the sink assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTagCandidate {
    pub string: String,
    pub category: Category,
}

// ===== EXPORT RECORD =====

/// Marks vocab-axis tags in exported records so both axes can share a literal.
pub const VOCAB_PREFIX: &str = "vocab: ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageTextEntry {
    pub page: u32,
    #[serde(rename = "scrapedText")]
    pub scraped_text: String,
    #[serde(rename = "OCR", default, skip_serializing_if = "Option::is_none")]
    pub ocr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPages {
    pub string: String,
    pub pages: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub filename: String,
    #[serde(rename = "Pages")]
    pub pages: Vec<PageTextEntry>,
    #[serde(rename = "Tags")]
    pub tags: Vec<TagPages>,
    #[serde(rename = "Level")]
    pub level: String,
    #[serde(rename = "exportedAt", default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<chrono::DateTime<chrono::Utc>>,
}
