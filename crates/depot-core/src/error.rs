//! Error types for the submission processor.
//!
//! Two families:
//!
//! - [`StoreError`] is a fault. During setup (staging listing, index load) and
//!   at persist time it aborts the run; during artifact relocation it fails only
//!   the submission being processed.
//! - [`Denial`] is a non-fatal rejection of one submission. The submission's
//!   staging directory is left in place and the batch continues.

use serde::Serialize;

/// Store faults.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Staging root exists but cannot be listed.
    #[error("staging error: {message}")]
    Staging { message: String },

    /// Index document could not be read, parsed or written.
    #[error("index error: {message}")]
    Index { message: String },

    /// Artifact copy into the published tree failed.
    #[error("publish error: {message}")]
    Publish { message: String },
}

impl StoreError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Run aborted before or while persisting the index
            Self::Staging { .. } => 2,
            Self::Index { .. } => 2,

            // Single submission left unpublished
            Self::Publish { .. } => 1,
        }
    }

    /// Whether the fault aborts the whole run rather than a single submission.
    pub fn is_setup_fault(&self) -> bool {
        matches!(self, Self::Staging { .. } | Self::Index { .. })
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Reasons a submission is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Denial {
    /// Directory name does not have the `com.<owner>.<app>` shape.
    #[error("bundle id \"{bundle_id}\" does not follow the required pattern com.[owner].[app]")]
    InvalidBundleId { bundle_id: String },

    /// No `manifest.json` in the submission directory.
    #[error("missing manifest.json for {bundle_id}")]
    MissingManifest { bundle_id: String },

    /// The manifest exists but is not a usable document.
    #[error("malformed manifest.json for {bundle_id}: {message}")]
    MalformedManifest { bundle_id: String, message: String },

    /// Neither `id` nor `bundleId` in the manifest names the submission folder.
    #[error("manifest id does not match submission folder name \"{bundle_id}\"")]
    IdentityMismatch {
        bundle_id: String,
        declared: Option<String>,
    },

    /// A manifest value used as a path component would escape the published tree.
    #[error("manifest {field} \"{value}\" for {bundle_id} is not a valid path component")]
    UnsafePathComponent {
        bundle_id: String,
        field: String,
        value: String,
    },
}

impl Denial {
    /// Stable machine-readable reason code.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::InvalidBundleId { .. } => "invalid_bundle_id",
            Self::MissingManifest { .. } => "missing_manifest",
            Self::MalformedManifest { .. } => "malformed_manifest",
            Self::IdentityMismatch { .. } => "identity_mismatch",
            Self::UnsafePathComponent { .. } => "unsafe_path_component",
        }
    }

    /// Submission the denial applies to.
    pub fn bundle_id(&self) -> &str {
        match self {
            Self::InvalidBundleId { bundle_id }
            | Self::MissingManifest { bundle_id }
            | Self::MalformedManifest { bundle_id, .. }
            | Self::IdentityMismatch { bundle_id, .. }
            | Self::UnsafePathComponent { bundle_id, .. } => bundle_id,
        }
    }
}
