//! The published catalog (`index.json`).
//!
//! # Format
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "apps": [
//!     {
//!       "id": "com.bob.notes",
//!       "bundleId": "com.bob.notes",
//!       "category": "Notes",
//!       "version": "3.1.0",
//!       "sizeBytes": 48213,
//!       "downloadUrl": "https://.../apps/Notes/com.bob.notes/3.1.0.rly"
//!     }
//!   ]
//! }
//! ```
//!
//! Entries are kept as ordered JSON objects. Historical entries may carry
//! fields the current manifest format no longer emits, or identify themselves
//! only through the legacy `id` key; both survive a merge.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// Index schema version written on every save.
pub const INDEX_VERSION: &str = "1.0";

/// One published app.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppEntry(Map<String, Value>);

impl AppEntry {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Set a field. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Canonical `bundleId` field.
    pub fn bundle_id(&self) -> Option<&str> {
        self.get_str("bundleId")
    }

    /// Legacy `id` field.
    pub fn legacy_id(&self) -> Option<&str> {
        self.get_str("id")
    }

    /// Whether this entry is the record for `bundle_id`.
    pub fn matches(&self, bundle_id: &str) -> bool {
        self.bundle_id() == Some(bundle_id) || self.legacy_id() == Some(bundle_id)
    }

    /// Overwrite every field present in `update`; other fields are untouched.
    pub fn overlay(&mut self, update: AppEntry) {
        for (key, value) in update.0 {
            self.0.insert(key, value);
        }
    }
}

/// How an entry landed in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeAction {
    /// New entry appended.
    Added,

    /// Existing entry overlaid in place.
    Updated,
}

/// The index document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreIndex {
    /// Schema version. Any value is accepted on load; saves always write [`INDEX_VERSION`].
    #[serde(
        default = "default_index_version",
        deserialize_with = "deserialize_index_version"
    )]
    pub version: String,

    /// Published apps, in insertion order.
    #[serde(default)]
    pub apps: Vec<AppEntry>,
}

fn default_index_version() -> String {
    INDEX_VERSION.to_string()
}

fn deserialize_index_version<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(version) => version,
        _ => default_index_version(),
    })
}

impl Default for StoreIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            version: default_index_version(),
            apps: Vec::new(),
        }
    }

    /// Load the index, or an empty one if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no index yet, starting empty");
                return Ok(Self::new());
            }
            Err(e) => {
                return Err(StoreError::Index {
                    message: format!("failed to read index {}: {}", path.display(), e),
                })
            }
        };

        Self::parse(&content).map_err(|e| StoreError::Index {
            message: format!("{} ({})", e, path.display()),
        })
    }

    /// Parse an index document.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Write the index, replacing the file atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        let content = self.to_json()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Index {
                message: format!("failed to create index directory: {}", e),
            })?;
        }

        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).map_err(|e| StoreError::Index {
            message: format!("failed to write temp index: {}", e),
        })?;
        std::fs::rename(&temp_path, path).map_err(|e| StoreError::Index {
            message: format!("failed to rename temp index: {}", e),
        })?;

        info!(path = %path.display(), apps = self.apps.len(), "saved index");
        Ok(())
    }

    /// Serialize as `{"version": "1.0", "apps": [...]}`, two-space indented.
    pub fn to_json(&self) -> StoreResult<String> {
        let document = StoreIndex {
            version: default_index_version(),
            apps: self.apps.clone(),
        };
        serde_json::to_string_pretty(&document).map_err(|e| StoreError::Index {
            message: format!("failed to serialize index: {}", e),
        })
    }

    /// Position of the entry for `bundle_id`.
    pub fn position(&self, bundle_id: &str) -> Option<usize> {
        self.apps.iter().position(|entry| entry.matches(bundle_id))
    }

    /// Entry for `bundle_id`, matched on `bundleId` or legacy `id`.
    pub fn find(&self, bundle_id: &str) -> Option<&AppEntry> {
        self.position(bundle_id).map(|i| &self.apps[i])
    }

    /// Merge an entry: overlay the existing record, or append a new one.
    pub fn merge(&mut self, bundle_id: &str, entry: AppEntry) -> MergeAction {
        match self.position(bundle_id) {
            Some(i) => {
                self.apps[i].overlay(entry);
                MergeAction::Updated
            }
            None => {
                self.apps.push(entry);
                MergeAction::Added
            }
        }
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}
