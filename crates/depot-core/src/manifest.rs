//! Submission manifest (`manifest.json`).
//!
//! Four fields are recognized; everything else is carried through verbatim
//! into the published index entry.
//!
//! ```json
//! {
//!   "id": "com.bob.notes",
//!   "name": "Notes",
//!   "category": "Productivity",
//!   "version": "3.1.0",
//!   "description": "Plain text notes"
//! }
//! ```

use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Denial;
use crate::index::AppEntry;

/// Manifest file name inside a submission directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Category used when the manifest has none.
pub const DEFAULT_CATEGORY: &str = "Utilities";

/// Version used when the manifest has none.
pub const DEFAULT_VERSION: &str = "1.0.0";

const RECOGNIZED: [&str; 4] = ["id", "bundleId", "category", "version"];

/// A parsed submission manifest.
///
/// The whole document is kept in its original key order. `id` and `bundleId`
/// are read leniently: a non-string value never matches a folder name but is
/// still passed through. `category` and `version` become path components and
/// must be strings when present.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Manifest {
    /// Declared identifier, if it is a string.
    pub id: Option<String>,

    /// Alternate declared identifier, used by older submissions.
    pub bundle_id: Option<String>,

    pub category: Option<String>,

    pub version: Option<String>,

    document: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for Manifest {
    type Error = String;

    fn try_from(document: Map<String, Value>) -> Result<Self, Self::Error> {
        let identity = |key: &str| document.get(key).and_then(Value::as_str).map(String::from);
        let path_field = |key: &str| match document.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(format!("field `{}` must be a string, got {}", key, other)),
        };

        Ok(Self {
            id: identity("id"),
            bundle_id: identity("bundleId"),
            category: path_field("category")?,
            version: path_field("version")?,
            document,
        })
    }
}

impl Manifest {
    /// Load `manifest.json` from a submission directory.
    pub fn load(submission_dir: &Path, bundle_id: &str) -> Result<Self, Denial> {
        let path = submission_dir.join(MANIFEST_FILE);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Denial::MissingManifest {
                    bundle_id: bundle_id.to_string(),
                })
            }
            Err(e) => {
                return Err(Denial::MalformedManifest {
                    bundle_id: bundle_id.to_string(),
                    message: format!("failed to read manifest: {}", e),
                })
            }
        };

        Self::parse(&content, bundle_id)
    }

    /// Parse manifest JSON.
    pub fn parse(content: &str, bundle_id: &str) -> Result<Self, Denial> {
        serde_json::from_str(content).map_err(|e| Denial::MalformedManifest {
            bundle_id: bundle_id.to_string(),
            message: e.to_string(),
        })
    }

    /// The raw document, in original key order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Pass-through fields (everything but the four recognized ones).
    pub fn extra(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.document
            .iter()
            .filter(|(key, _)| !RECOGNIZED.contains(&key.as_str()))
    }

    /// Whether `id` or `bundleId` names the given identifier.
    pub fn declares(&self, bundle_id: &str) -> bool {
        self.id.as_deref() == Some(bundle_id) || self.bundle_id.as_deref() == Some(bundle_id)
    }

    /// The identifier the manifest claims, `id` first.
    pub fn declared_id(&self) -> Option<&str> {
        self.id.as_deref().or(self.bundle_id.as_deref())
    }

    /// Category, falling back to [`DEFAULT_CATEGORY`] when absent or empty.
    pub fn effective_category(&self) -> &str {
        non_empty(self.category.as_deref()).unwrap_or(DEFAULT_CATEGORY)
    }

    /// Version, falling back to [`DEFAULT_VERSION`] when absent or empty.
    pub fn effective_version(&self) -> &str {
        non_empty(self.version.as_deref()).unwrap_or(DEFAULT_VERSION)
    }

    /// Build the index entry for this manifest with defaults applied.
    ///
    /// Keys keep their manifest order; `category`, `version` and `bundleId`
    /// are appended when the manifest lacks them. `bundleId` is always the
    /// folder-derived identifier, even when the manifest matched through `id`
    /// and carries a different `bundleId`.
    pub fn to_entry(&self, bundle_id: &str) -> AppEntry {
        let mut entry = AppEntry::from_fields(self.document.clone());
        entry.insert("category", self.effective_category());
        entry.insert("version", self.effective_version());
        entry.insert("bundleId", bundle_id);
        entry
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Reject values that cannot serve as a single path component.
pub fn check_path_component(bundle_id: &str, field: &str, value: &str) -> Result<(), Denial> {
    let unsafe_component = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);

    if unsafe_component {
        return Err(Denial::UnsafePathComponent {
            bundle_id: bundle_id.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}
