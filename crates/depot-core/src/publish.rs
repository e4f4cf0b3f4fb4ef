//! Artifact relocation into the published tree.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::digest::sha256_file;
use crate::error::{StoreError, StoreResult};

/// Base name of the always-current payload copy.
pub const LATEST: &str = "latest";

/// A payload copied into `apps/<category>/<bundleId>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPayload {
    /// `<version>.<ext>`
    pub versioned_path: PathBuf,

    /// `latest.<ext>`
    pub latest_path: PathBuf,

    /// Byte size of the source payload.
    pub size_bytes: u64,

    /// Content digest (sha256:...).
    pub digest: String,
}

fn publish_error(action: &str, path: &Path, e: impl std::fmt::Display) -> StoreError {
    StoreError::Publish {
        message: format!("failed to {} {}: {}", action, path.display(), e),
    }
}

/// Copy the payload to both the version-tagged and `latest` paths.
///
/// The staging copy is left alone. `latest` is overwritten unconditionally,
/// so the last processed version wins regardless of version ordering.
pub fn publish_payload(
    source: &Path,
    app_dir: &Path,
    version: &str,
    extension: &str,
) -> StoreResult<PublishedPayload> {
    std::fs::create_dir_all(app_dir).map_err(|e| publish_error("create", app_dir, e))?;

    let versioned_path = app_dir.join(format!("{}.{}", version, extension));
    let latest_path = app_dir.join(format!("{}.{}", LATEST, extension));

    std::fs::copy(source, &versioned_path).map_err(|e| publish_error("copy to", &versioned_path, e))?;
    std::fs::copy(source, &latest_path).map_err(|e| publish_error("copy to", &latest_path, e))?;

    let size_bytes = std::fs::metadata(source)
        .map_err(|e| publish_error("stat", source, e))?
        .len();
    let digest = sha256_file(source).map_err(|e| publish_error("hash", source, e))?;
    let latest_digest =
        sha256_file(&latest_path).map_err(|e| publish_error("hash", &latest_path, e))?;

    if digest != latest_digest {
        return Err(StoreError::Publish {
            message: format!(
                "digest mismatch for {}: expected {}, got {}",
                latest_path.display(),
                digest,
                latest_digest
            ),
        });
    }

    debug!(path = %versioned_path.display(), size_bytes, %digest, "published payload");

    Ok(PublishedPayload {
        versioned_path,
        latest_path,
        size_bytes,
        digest,
    })
}

/// Copy an icon into the asset directory, keeping its file name.
pub fn publish_icon(source: &Path, file_name: &str, asset_dir: &Path) -> StoreResult<PathBuf> {
    std::fs::create_dir_all(asset_dir).map_err(|e| publish_error("create", asset_dir, e))?;

    let target = asset_dir.join(file_name);
    std::fs::copy(source, &target).map_err(|e| publish_error("copy to", &target, e))?;

    debug!(path = %target.display(), "published icon");
    Ok(target)
}
