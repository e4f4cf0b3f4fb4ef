//! Store layout and publishing configuration.
//!
//! A [`StoreConfig`] is built once per run from a store root and handed to the
//! processor. All paths of the published tree derive from it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Staging directory name under the store root.
pub const STAGING_DIR: &str = "publish";

/// Published payload tree under the store root.
pub const APPS_DIR: &str = "apps";

/// Published asset tree under the store root.
pub const ASSETS_DIR: &str = "assets";

/// Index document under the store root.
pub const INDEX_FILE: &str = "index.json";

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding pending submissions, one subdirectory each.
    pub staging_root: PathBuf,

    /// Root of `apps/<category>/<bundleId>/`.
    pub apps_root: PathBuf,

    /// Root of `assets/<bundleId>/`.
    pub assets_root: PathBuf,

    /// Location of the index document.
    pub index_path: PathBuf,

    /// Public base URL the published tree is served from.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Extension of the primary payload (`app.<ext>`).
    #[serde(default = "default_payload_extension")]
    pub payload_extension: String,

    /// Platform-owned namespaces. Matching identifiers are still admitted.
    #[serde(default = "default_reserved_prefixes")]
    pub reserved_prefixes: Vec<String>,
}

fn default_base_url() -> String {
    "https://raw.githubusercontent.com/dotrly/store/main".to_string()
}

fn default_payload_extension() -> String {
    "rly".to_string()
}

fn default_reserved_prefixes() -> Vec<String> {
    vec!["com.relay".to_string(), "com.dotrly".to_string()]
}

impl StoreConfig {
    /// Derive every path from a single store root.
    pub fn for_store_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            staging_root: root.join(STAGING_DIR),
            apps_root: root.join(APPS_DIR),
            assets_root: root.join(ASSETS_DIR),
            index_path: root.join(INDEX_FILE),
            base_url: default_base_url(),
            payload_extension: default_payload_extension(),
            reserved_prefixes: default_reserved_prefixes(),
        }
    }

    /// Create config for a store root, then apply environment overrides.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `DEPOT_BASE_URL` | Public base URL for download/icon links |
    /// | `DEPOT_PAYLOAD_EXT` | Payload file extension |
    /// | `DEPOT_RESERVED_PREFIXES` | Comma-separated reserved namespaces |
    pub fn from_env(root: impl AsRef<Path>) -> Self {
        let mut config = Self::for_store_root(root);

        if let Ok(url) = std::env::var("DEPOT_BASE_URL") {
            config = config.with_base_url(url);
        }
        if let Ok(ext) = std::env::var("DEPOT_PAYLOAD_EXT") {
            config = config.with_payload_extension(ext);
        }
        if let Ok(prefixes) = std::env::var("DEPOT_RESERVED_PREFIXES") {
            config = config.with_reserved_prefixes(
                prefixes
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from),
            );
        }

        config
    }

    /// Set the public base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the payload extension (a leading dot is dropped).
    pub fn with_payload_extension(mut self, ext: impl Into<String>) -> Self {
        self.payload_extension = ext.into().trim_start_matches('.').to_string();
        self
    }

    /// Replace the reserved namespace list.
    pub fn with_reserved_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// File name of the primary payload inside a submission.
    pub fn payload_file_name(&self) -> String {
        format!("app.{}", self.payload_extension)
    }

    /// `apps/<category>/<bundleId>`
    pub fn app_dir(&self, category: &str, bundle_id: &str) -> PathBuf {
        self.apps_root.join(category).join(bundle_id)
    }

    /// `assets/<bundleId>`
    pub fn asset_dir(&self, bundle_id: &str) -> PathBuf {
        self.assets_root.join(bundle_id)
    }

    /// Canonical download URL of a published payload version.
    pub fn download_url(&self, category: &str, bundle_id: &str, version: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}.{}",
            self.base_url, APPS_DIR, category, bundle_id, version, self.payload_extension
        )
    }

    /// Canonical URL of a published icon.
    pub fn icon_url(&self, bundle_id: &str, file_name: &str) -> String {
        format!("{}/{}/{}/{}", self.base_url, ASSETS_DIR, bundle_id, file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("DEPOT_BASE_URL");
        std::env::remove_var("DEPOT_PAYLOAD_EXT");
        std::env::remove_var("DEPOT_RESERVED_PREFIXES");
    }

    #[test]
    fn test_for_store_root_layout() {
        let config = StoreConfig::for_store_root("/srv/store");
        assert_eq!(config.staging_root, PathBuf::from("/srv/store/publish"));
        assert_eq!(config.apps_root, PathBuf::from("/srv/store/apps"));
        assert_eq!(config.assets_root, PathBuf::from("/srv/store/assets"));
        assert_eq!(config.index_path, PathBuf::from("/srv/store/index.json"));
        assert_eq!(config.payload_file_name(), "app.rly");
        assert_eq!(config.reserved_prefixes, vec!["com.relay", "com.dotrly"]);
    }

    #[test]
    fn test_urls() {
        let config = StoreConfig::for_store_root("/srv/store").with_base_url("https://cdn.test/");
        assert_eq!(
            config.download_url("Notes", "com.bob.notes", "3.1.0"),
            "https://cdn.test/apps/Notes/com.bob.notes/3.1.0.rly"
        );
        assert_eq!(
            config.icon_url("com.bob.notes", "icon.png"),
            "https://cdn.test/assets/com.bob.notes/icon.png"
        );
    }

    #[test]
    fn test_payload_extension_strips_dot() {
        let config = StoreConfig::for_store_root("/srv").with_payload_extension(".zip");
        assert_eq!(config.payload_file_name(), "app.zip");
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = StoreConfig::from_env("/srv/store");
        assert_eq!(config, StoreConfig::for_store_root("/srv/store"));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("DEPOT_BASE_URL", "https://mirror.test/store/");
        std::env::set_var("DEPOT_PAYLOAD_EXT", "pkg");
        std::env::set_var("DEPOT_RESERVED_PREFIXES", "com.acme, ,com.corp");

        let config = StoreConfig::from_env("/srv/store");
        clear_env();

        assert_eq!(config.base_url, "https://mirror.test/store");
        assert_eq!(config.payload_extension, "pkg");
        assert_eq!(config.reserved_prefixes, vec!["com.acme", "com.corp"]);
    }
}
