//! Submission processing.
//!
//! Each pending submission goes through, in order:
//!
//! 1. identifier validation
//! 2. manifest load
//! 3. identity cross-check (`id` or `bundleId` must equal the folder name)
//! 4. category/version defaulting
//! 5. payload relocation (`apps/<category>/<bundleId>/<version>.<ext>` and `latest.<ext>`)
//! 6. icon relocation (`assets/<bundleId>/icon.*`)
//! 7. index merge
//! 8. staging cleanup
//!
//! Steps 1-4 deny; a denied submission is left untouched in staging. Steps 5-6
//! can fail on I/O; already copied files are not rolled back and the submission
//! stays in staging. The index is read once before the batch and written once
//! after it, so an interrupted run leaves the previous index in place.

use chrono::Utc;
use tracing::{info, warn};

use crate::bundle_id::{namespace_check, BundleId, NamespaceCheck};
use crate::config::StoreConfig;
use crate::error::{Denial, StoreError, StoreResult};
use crate::index::{AppEntry, StoreIndex};
use crate::manifest::{check_path_component, Manifest};
use crate::publish::{publish_icon, publish_payload};
use crate::report::{RunReport, SubmissionOutcome};
use crate::staging::{icon_files, list_pending, remove_submission, PendingSubmission};

/// A submission that passed validation.
#[derive(Debug, Clone)]
struct Admitted {
    bundle_id: BundleId,
    manifest: Manifest,
    category: String,
    version: String,
}

/// Entry produced by relocation, plus what the report needs.
struct Relocated {
    entry: AppEntry,
    size_bytes: Option<u64>,
    icon: Option<String>,
}

/// Processes the staging area into the published tree and index.
#[derive(Debug, Clone)]
pub struct SubmissionProcessor {
    config: StoreConfig,
}

impl SubmissionProcessor {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Process every pending submission and persist the index once.
    ///
    /// An empty or missing staging area is a no-op: the index is neither read
    /// nor written.
    pub fn run(&self) -> StoreResult<RunReport> {
        let started_at = Utc::now();

        let pending = list_pending(&self.config.staging_root)?;
        if pending.is_empty() {
            info!("no new submissions to process");
            return Ok(RunReport::new(started_at, Vec::new(), false));
        }

        let mut index = StoreIndex::load(&self.config.index_path)?;
        info!(
            submissions = pending.len(),
            apps = index.len(),
            "processing store submissions"
        );

        let outcomes: Vec<SubmissionOutcome> = pending
            .iter()
            .map(|submission| self.process_submission(submission, &mut index))
            .collect();

        index.save(&self.config.index_path)?;

        Ok(RunReport::new(started_at, outcomes, true))
    }

    /// Run one submission through all phases against the in-memory index.
    pub fn process_submission(
        &self,
        submission: &PendingSubmission,
        index: &mut StoreIndex,
    ) -> SubmissionOutcome {
        info!(bundle_id = %submission.name, "checking submission");

        let admitted = match self.admit(submission) {
            Ok(admitted) => admitted,
            Err(denial) => {
                warn!(bundle_id = %submission.name, reason = denial.reason_code(), "denied: {}", denial);
                return SubmissionOutcome::Denied {
                    bundle_id: submission.name.clone(),
                    denial,
                };
            }
        };

        let relocated = match self.relocate(submission, &admitted) {
            Ok(relocated) => relocated,
            Err(e) => {
                warn!(bundle_id = %submission.name, error = %e, "artifact relocation failed");
                return SubmissionOutcome::Failed {
                    bundle_id: submission.name.clone(),
                    message: e.to_string(),
                };
            }
        };

        let bundle_id = admitted.bundle_id.as_str();
        let action = index.merge(bundle_id, relocated.entry);
        info!(bundle_id, ?action, version = %admitted.version, "index entry merged");

        if let Err(e) = remove_submission(&submission.path) {
            warn!(bundle_id, error = %e, "failed to remove staging directory");
        }

        SubmissionOutcome::Published {
            bundle_id: bundle_id.to_string(),
            action,
            category: admitted.category,
            version: admitted.version,
            size_bytes: relocated.size_bytes,
            icon: relocated.icon,
        }
    }

    /// Phases 1-4. Nothing on disk is touched.
    fn admit(&self, submission: &PendingSubmission) -> Result<Admitted, Denial> {
        let bundle_id = BundleId::parse(&submission.name)?;

        if let NamespaceCheck::Reserved { prefix } =
            namespace_check(bundle_id.as_str(), &self.config.reserved_prefixes)
        {
            warn!(bundle_id = %bundle_id, %prefix, "submission uses a reserved namespace, allowing");
        }

        let manifest = Manifest::load(&submission.path, bundle_id.as_str())?;

        if !manifest.declares(bundle_id.as_str()) {
            return Err(Denial::IdentityMismatch {
                bundle_id: bundle_id.to_string(),
                declared: manifest.declared_id().map(String::from),
            });
        }

        let category = manifest.effective_category().to_string();
        let version = manifest.effective_version().to_string();
        check_path_component(bundle_id.as_str(), "category", &category)?;
        check_path_component(bundle_id.as_str(), "version", &version)?;

        Ok(Admitted {
            bundle_id,
            manifest,
            category,
            version,
        })
    }

    /// Phases 5-6.
    fn relocate(
        &self,
        submission: &PendingSubmission,
        admitted: &Admitted,
    ) -> StoreResult<Relocated> {
        let bundle_id = admitted.bundle_id.as_str();
        let mut entry = admitted.manifest.to_entry(bundle_id);
        let mut size_bytes = None;
        let mut icon = None;

        let payload = submission.path.join(self.config.payload_file_name());
        if payload.is_file() {
            let app_dir = self.config.app_dir(&admitted.category, bundle_id);
            let published = publish_payload(
                &payload,
                &app_dir,
                &admitted.version,
                &self.config.payload_extension,
            )?;
            entry.insert("sizeBytes", published.size_bytes);
            entry.insert(
                "downloadUrl",
                self.config
                    .download_url(&admitted.category, bundle_id, &admitted.version),
            );
            size_bytes = Some(published.size_bytes);
        }

        let icons = icon_files(&submission.path).map_err(|e| StoreError::Publish {
            message: format!("failed to list icons for {}: {}", bundle_id, e),
        })?;
        let asset_dir = self.config.asset_dir(bundle_id);
        for (file_name, path) in icons {
            publish_icon(&path, &file_name, &asset_dir)?;
            entry.insert("iconUrl", self.config.icon_url(bundle_id, &file_name));
            icon = Some(file_name);
        }

        Ok(Relocated {
            entry,
            size_bytes,
            icon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MergeAction;
    use serde_json::json;
    use std::path::Path;
    use tempfile::TempDir;

    fn stage(root: &Path, name: &str, manifest: Option<&str>, payload: Option<&[u8]>) -> PendingSubmission {
        let path = root.join("publish").join(name);
        std::fs::create_dir_all(&path).unwrap();
        if let Some(manifest) = manifest {
            std::fs::write(path.join("manifest.json"), manifest).unwrap();
        }
        if let Some(payload) = payload {
            std::fs::write(path.join("app.rly"), payload).unwrap();
        }
        PendingSubmission {
            name: name.to_string(),
            path,
        }
    }

    fn processor(root: &Path) -> SubmissionProcessor {
        SubmissionProcessor::new(StoreConfig::for_store_root(root).with_base_url("https://cdn.test"))
    }

    #[test]
    fn test_invalid_id_denied_untouched() {
        let dir = TempDir::new().unwrap();
        let sub = stage(dir.path(), "org.alice.todo", Some(r#"{"id":"org.alice.todo"}"#), None);
        let mut index = StoreIndex::new();

        let outcome = processor(dir.path()).process_submission(&sub, &mut index);

        assert!(matches!(
            outcome,
            SubmissionOutcome::Denied {
                denial: Denial::InvalidBundleId { .. },
                ..
            }
        ));
        assert!(sub.path.join("manifest.json").exists());
        assert!(index.is_empty());
    }

    #[test]
    fn test_missing_manifest_denied() {
        let dir = TempDir::new().unwrap();
        let sub = stage(dir.path(), "com.a.b", None, Some(b"x"));
        let mut index = StoreIndex::new();

        let outcome = processor(dir.path()).process_submission(&sub, &mut index);

        assert!(matches!(
            outcome,
            SubmissionOutcome::Denied {
                denial: Denial::MissingManifest { .. },
                ..
            }
        ));
        assert!(sub.path.exists());
        assert!(!dir.path().join("apps").exists());
    }

    #[test]
    fn test_identity_mismatch_denied() {
        let dir = TempDir::new().unwrap();
        let sub = stage(dir.path(), "com.a.b", Some(r#"{"id":"com.a.c"}"#), Some(b"x"));
        let mut index = StoreIndex::new();

        let outcome = processor(dir.path()).process_submission(&sub, &mut index);

        match outcome {
            SubmissionOutcome::Denied {
                denial: Denial::IdentityMismatch { declared, .. },
                ..
            } => assert_eq!(declared.as_deref(), Some("com.a.c")),
            other => panic!("expected identity mismatch, got {other:?}"),
        }
        assert!(sub.path.exists());
        assert!(index.is_empty());
    }

    #[test]
    fn test_traversal_category_denied() {
        let dir = TempDir::new().unwrap();
        let sub = stage(
            dir.path(),
            "com.a.b",
            Some(r#"{"id":"com.a.b","category":"../../etc"}"#),
            Some(b"x"),
        );
        let mut index = StoreIndex::new();

        let outcome = processor(dir.path()).process_submission(&sub, &mut index);

        assert!(matches!(
            outcome,
            SubmissionOutcome::Denied {
                denial: Denial::UnsafePathComponent { .. },
                ..
            }
        ));
        assert!(sub.path.exists());
    }

    #[test]
    fn test_defaults_applied() {
        let dir = TempDir::new().unwrap();
        let sub = stage(dir.path(), "com.a.b", Some(r#"{"id":"com.a.b"}"#), Some(b"12345"));
        let mut index = StoreIndex::new();

        let outcome = processor(dir.path()).process_submission(&sub, &mut index);

        assert!(matches!(
            outcome,
            SubmissionOutcome::Published {
                action: MergeAction::Added,
                size_bytes: Some(5),
                ..
            }
        ));
        let entry = index.find("com.a.b").unwrap();
        assert_eq!(entry.get_str("category"), Some("Utilities"));
        assert_eq!(entry.get_str("version"), Some("1.0.0"));
        assert_eq!(
            entry.get_str("downloadUrl"),
            Some("https://cdn.test/apps/Utilities/com.a.b/1.0.0.rly")
        );
        assert!(dir
            .path()
            .join("apps/Utilities/com.a.b/1.0.0.rly")
            .exists());
        assert!(!sub.path.exists());
    }

    #[test]
    fn test_no_payload_no_size_or_download() {
        let dir = TempDir::new().unwrap();
        let sub = stage(dir.path(), "com.a.b", Some(r#"{"bundleId":"com.a.b"}"#), None);
        let mut index = StoreIndex::new();

        processor(dir.path()).process_submission(&sub, &mut index);

        let entry = index.find("com.a.b").unwrap();
        assert!(entry.get("sizeBytes").is_none());
        assert!(entry.get("downloadUrl").is_none());
        assert!(!sub.path.exists());
    }

    #[test]
    fn test_icon_published() {
        let dir = TempDir::new().unwrap();
        let sub = stage(dir.path(), "com.a.b", Some(r#"{"id":"com.a.b"}"#), None);
        std::fs::write(sub.path.join("icon.png"), b"png").unwrap();
        let mut index = StoreIndex::new();

        let outcome = processor(dir.path()).process_submission(&sub, &mut index);

        assert!(matches!(
            outcome,
            SubmissionOutcome::Published { icon: Some(ref name), .. } if name == "icon.png"
        ));
        assert_eq!(
            index.find("com.a.b").unwrap().get_str("iconUrl"),
            Some("https://cdn.test/assets/com.a.b/icon.png")
        );
        assert_eq!(
            std::fs::read(dir.path().join("assets/com.a.b/icon.png")).unwrap(),
            b"png"
        );
    }

    #[test]
    fn test_merge_non_destructive() {
        let dir = TempDir::new().unwrap();
        let sub = stage(
            dir.path(),
            "com.a.b",
            Some(r#"{"id":"com.a.b","version":"2.0.0"}"#),
            None,
        );
        let mut index = StoreIndex::new();
        index.apps.push(
            serde_json::from_value(json!({
                "bundleId": "com.a.b",
                "custom": "keepme",
                "version": "1.0.0"
            }))
            .unwrap(),
        );

        let outcome = processor(dir.path()).process_submission(&sub, &mut index);

        assert!(matches!(
            outcome,
            SubmissionOutcome::Published {
                action: MergeAction::Updated,
                ..
            }
        ));
        assert_eq!(index.len(), 1);
        let entry = &index.apps[0];
        assert_eq!(entry.get_str("custom"), Some("keepme"));
        assert_eq!(entry.get_str("version"), Some("2.0.0"));
    }

    #[test]
    fn test_reserved_namespace_published() {
        let dir = TempDir::new().unwrap();
        let sub = stage(dir.path(), "com.relay.core", Some(r#"{"id":"com.relay.core"}"#), None);
        let mut index = StoreIndex::new();

        let outcome = processor(dir.path()).process_submission(&sub, &mut index);

        assert!(outcome.is_published());
        assert!(index.find("com.relay.core").is_some());
    }

    #[test]
    fn test_run_without_staging_is_noop() {
        let dir = TempDir::new().unwrap();
        let report = processor(dir.path()).run().unwrap();

        assert!(!report.index_written);
        assert!(report.outcomes.is_empty());
        assert!(!dir.path().join("index.json").exists());
    }

    #[test]
    fn test_run_malformed_index_aborts_before_mutation() {
        let dir = TempDir::new().unwrap();
        let sub = stage(dir.path(), "com.a.b", Some(r#"{"id":"com.a.b"}"#), Some(b"x"));
        std::fs::write(dir.path().join("index.json"), "not json").unwrap();

        let result = processor(dir.path()).run();

        assert!(matches!(result, Err(StoreError::Index { .. })));
        assert!(sub.path.exists());
        assert!(!dir.path().join("apps").exists());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("index.json")).unwrap(),
            "not json"
        );
    }
}
