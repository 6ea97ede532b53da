use crate::export::canonicalize_records;
use crate::types::*;
use crate::vocabulary::{normalize, VocabularyStore};
use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Persistence sink for the vocabulary and exported records.
///
/// Callers mutate local state first and then persist; a failed call leaves
/// local state ahead of the sink until the user retries.
pub trait VocabularyStorage {
    fn load_tags(&self) -> Result<Vec<Tag>>;
    fn load_aliases(&self) -> Result<Vec<Alias>>;

    /// Replace the full tag collection.
    fn save_tags(&self, tags: &[Tag]) -> Result<()>;

    /// Replace the full alias collection and re-canonicalize previously
    /// exported records. Returns how many exported tag entries changed.
    fn save_aliases(&self, aliases: &[Alias]) -> Result<usize>;

    fn append_export(&self, record: &ExportRecord) -> Result<()>;

    /// Offer new tag candidates; returns the entries actually added, with
    /// their assigned ids. Strings already present are skipped.
    fn append_new_tags(&self, candidates: &[NewTagCandidate]) -> Result<Vec<Tag>>;

    fn load_exports(&self) -> Result<Vec<ExportRecord>>;

    /// Both collections as a fresh store.
    fn load_vocabulary(&self) -> Result<VocabularyStore> {
        Ok(VocabularyStore::from_parts(self.load_tags()?, self.load_aliases()?))
    }
}

/// Persist the whole vocabulary: tags first, then aliases. Returns how many
/// exported tag entries the alias save re-canonicalized.
pub fn save_all(store: &VocabularyStore, storage: &dyn VocabularyStorage) -> Result<usize> {
    storage
        .save_tags(store.tags())
        .context("Failed to save tags")?;
    storage
        .save_aliases(store.aliases())
        .context("Failed to save aliases")
}

/// Add candidates whose (trimmed, case-folded) string is not yet present.
/// Custom categories get the next `x<N>` id, canonical ones the next integer.
pub fn merge_new_tags(tags: &mut Vec<Tag>, candidates: &[NewTagCandidate]) -> Vec<Tag> {
    let mut store = VocabularyStore::from_tags(std::mem::take(tags));
    let mut seen: HashSet<String> = store.tags().iter().map(|t| normalize(&t.string)).collect();
    let mut added = Vec::new();

    for candidate in candidates {
        if !seen.insert(normalize(&candidate.string)) {
            continue;
        }
        let id = if candidate.category.is_provisional() {
            store.next_provisional_id()
        } else {
            store.next_canonical_id()
        };
        let tag = Tag::new(id, &candidate.string, candidate.category);
        // Fresh ids never collide.
        if store.add_tag(tag.clone()).is_ok() {
            added.push(tag);
        }
    }

    *tags = store.tags().to_vec();
    added
}

// ===== FILE STORAGE =====

/// File-based storage: `tags.json`, `aliases.json` and `output.json` in one
/// directory.
pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: &str) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {data_dir}"))?;
        Ok(Self {
            data_dir: PathBuf::from(data_dir),
        })
    }

    fn tags_path(&self) -> PathBuf {
        self.data_dir.join("tags.json")
    }

    fn aliases_path(&self) -> PathBuf {
        self.data_dir.join("aliases.json")
    }

    fn output_path(&self) -> PathBuf {
        self.data_dir.join("output.json")
    }

    fn read_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json_str = fs::read_to_string(path)?;
        serde_json::from_str(&json_str)
            .map_err(|e| anyhow!("Failed to deserialize {}: {}", path.display(), e))
    }

    fn write_list<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
        let json_str = serde_json::to_string_pretty(items)
            .map_err(|e| anyhow!("Failed to serialize {}: {}", path.display(), e))?;
        fs::write(path, json_str)?;
        Ok(())
    }
}

impl VocabularyStorage for FileStorage {
    fn load_tags(&self) -> Result<Vec<Tag>> {
        Self::read_list(&self.tags_path())
    }

    fn load_aliases(&self) -> Result<Vec<Alias>> {
        Self::read_list(&self.aliases_path())
    }

    fn save_tags(&self, tags: &[Tag]) -> Result<()> {
        Self::write_list(&self.tags_path(), tags)?;
        info!("💾 Saved {} tags", tags.len());
        Ok(())
    }

    fn save_aliases(&self, aliases: &[Alias]) -> Result<usize> {
        Self::write_list(&self.aliases_path(), aliases)?;

        let store = VocabularyStore::from_parts(self.load_tags()?, aliases.to_vec());
        let mut outputs = self.load_exports()?;
        let changed = canonicalize_records(&mut outputs, &store);
        if changed > 0 {
            Self::write_list(&self.output_path(), &outputs)?;
        }
        info!("💾 Saved {} aliases ({} exported tag(s) updated)", aliases.len(), changed);
        Ok(changed)
    }

    fn append_export(&self, record: &ExportRecord) -> Result<()> {
        // An unreadable output file starts a fresh list.
        let mut outputs = self.load_exports().unwrap_or_default();
        outputs.push(record.clone());
        Self::write_list(&self.output_path(), &outputs)
    }

    fn append_new_tags(&self, candidates: &[NewTagCandidate]) -> Result<Vec<Tag>> {
        let mut tags = self.load_tags()?;
        let added = merge_new_tags(&mut tags, candidates);
        Self::write_list(&self.tags_path(), &tags)?;
        debug!("Appended {} of {} candidate tag(s)", added.len(), candidates.len());
        Ok(added)
    }

    fn load_exports(&self) -> Result<Vec<ExportRecord>> {
        Self::read_list(&self.output_path())
    }
}

// ===== HTTP STORAGE =====

#[derive(Debug, Deserialize)]
struct ServerReply {
    status: String,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    added: Vec<Tag>,
    #[serde(default)]
    updated_tags: usize,
}

/// Storage backed by the annotation server's JSON endpoints.
pub struct HttpStorage {
    base_url: String,
}

impl HttpStorage {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let body = ureq::get(&url)
            .call()
            .with_context(|| format!("GET {url} failed"))?
            .into_string()?;
        serde_json::from_str(&body).map_err(|e| anyhow!("Invalid JSON from {}: {}", url, e))
    }

    fn post<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<ServerReply> {
        let url = self.url(path);
        let body = serde_json::to_string(payload)?;
        let text = match ureq::post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body)
        {
            Ok(response) => response.into_string()?,
            Err(ureq::Error::Status(code, response)) => {
                let detail = response.into_string().unwrap_or_default();
                bail!("POST {} returned {}: {}", url, code, detail.trim());
            }
            Err(e) => return Err(anyhow::Error::new(e).context(format!("POST {url} failed"))),
        };
        parse_reply(&url, &text)
    }
}

/// Decode a POST reply; anything but `"status": "success"` is an error.
fn parse_reply(url: &str, text: &str) -> Result<ServerReply> {
    let reply: ServerReply =
        serde_json::from_str(text).map_err(|e| anyhow!("Invalid reply from {}: {}", url, e))?;
    if reply.status != "success" {
        bail!(
            "POST {} rejected: {}",
            url,
            reply.reason.as_deref().unwrap_or("no reason given")
        );
    }
    Ok(reply)
}

impl VocabularyStorage for HttpStorage {
    fn load_tags(&self) -> Result<Vec<Tag>> {
        self.get("assets/tags.json")
    }

    fn load_aliases(&self) -> Result<Vec<Alias>> {
        self.get("assets/aliases.json")
    }

    fn save_tags(&self, tags: &[Tag]) -> Result<()> {
        self.post("save_tags", tags).map(|_| ())
    }

    fn save_aliases(&self, aliases: &[Alias]) -> Result<usize> {
        Ok(self.post("save_aliases", aliases)?.updated_tags)
    }

    fn append_export(&self, record: &ExportRecord) -> Result<()> {
        self.post("append_output", record).map(|_| ())
    }

    fn append_new_tags(&self, candidates: &[NewTagCandidate]) -> Result<Vec<Tag>> {
        Ok(self.post("append_tags", candidates)?.added)
    }

    fn load_exports(&self) -> Result<Vec<ExportRecord>> {
        self.get("assets/output.json")
    }
}

// ===== MEMORY STORAGE =====

/// In-process storage for tests and dry runs.
#[derive(Default)]
pub struct MemoryStorage {
    tags: RefCell<Vec<Tag>>,
    aliases: RefCell<Vec<Alias>>,
    exports: RefCell<Vec<ExportRecord>>,
}

impl MemoryStorage {
    pub fn new(tags: Vec<Tag>, aliases: Vec<Alias>) -> Self {
        Self {
            tags: RefCell::new(tags),
            aliases: RefCell::new(aliases),
            exports: RefCell::new(Vec::new()),
        }
    }

    pub fn exports(&self) -> Vec<ExportRecord> {
        self.exports.borrow().clone()
    }
}

impl VocabularyStorage for MemoryStorage {
    fn load_tags(&self) -> Result<Vec<Tag>> {
        Ok(self.tags.borrow().clone())
    }

    fn load_aliases(&self) -> Result<Vec<Alias>> {
        Ok(self.aliases.borrow().clone())
    }

    fn save_tags(&self, tags: &[Tag]) -> Result<()> {
        *self.tags.borrow_mut() = tags.to_vec();
        Ok(())
    }

    fn save_aliases(&self, aliases: &[Alias]) -> Result<usize> {
        *self.aliases.borrow_mut() = aliases.to_vec();
        let store = VocabularyStore::from_parts(self.load_tags()?, aliases.to_vec());
        Ok(canonicalize_records(&mut self.exports.borrow_mut(), &store))
    }

    fn append_export(&self, record: &ExportRecord) -> Result<()> {
        self.exports.borrow_mut().push(record.clone());
        Ok(())
    }

    fn append_new_tags(&self, candidates: &[NewTagCandidate]) -> Result<Vec<Tag>> {
        Ok(merge_new_tags(&mut self.tags.borrow_mut(), candidates))
    }

    fn load_exports(&self) -> Result<Vec<ExportRecord>> {
        Ok(self.exports())
    }
}
