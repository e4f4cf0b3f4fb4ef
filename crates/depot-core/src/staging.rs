//! Staging area access.
//!
//! The staging root holds one directory per pending submission, named after
//! its bundle identifier.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Prefix of icon asset file names.
pub const ICON_PREFIX: &str = "icon.";

/// A submission directory waiting in the staging area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    /// Directory name; the claimed bundle identifier.
    pub name: String,

    /// Full path of the submission directory.
    pub path: PathBuf,
}

/// List pending submissions.
///
/// Only immediate subdirectories count. Listing order is whatever the
/// filesystem yields. A missing staging root is an empty batch.
pub fn list_pending(staging_root: &Path) -> StoreResult<Vec<PendingSubmission>> {
    if !staging_root.exists() {
        debug!(path = %staging_root.display(), "no staging directory");
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(staging_root).map_err(|e| StoreError::Staging {
        message: format!(
            "failed to read staging directory {}: {}",
            staging_root.display(),
            e
        ),
    })?;

    let mut pending = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::Staging {
            message: format!("failed to read staging entry: {}", e),
        })?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        pending.push(PendingSubmission {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
        });
    }

    Ok(pending)
}

/// Icon files in a submission directory, in listing order.
pub fn icon_files(submission_dir: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let mut icons = Vec::new();
    for entry in std::fs::read_dir(submission_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        if name.starts_with(ICON_PREFIX) && path.is_file() {
            icons.push((name, path));
        }
    }
    Ok(icons)
}

/// Delete a processed submission directory.
pub fn remove_submission(submission_dir: &Path) -> io::Result<()> {
    std::fs::remove_dir_all(submission_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let pending = list_pending(&dir.path().join("publish")).unwrap();
        assert!(pending.is_empty());
    }

    #[test]
    fn test_lists_only_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("com.a.b")).unwrap();
        std::fs::create_dir(dir.path().join("com.a.c")).unwrap();
        std::fs::write(dir.path().join("README.md"), "stray").unwrap();

        let mut names: Vec<String> = list_pending(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["com.a.b", "com.a.c"]);
    }

    #[test]
    fn test_root_is_file_is_staging_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("publish");
        std::fs::write(&file, "not a dir").unwrap();

        let result = list_pending(&file);
        assert!(matches!(result, Err(StoreError::Staging { .. })));
    }

    #[test]
    fn test_icon_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("icon.png"), b"png").unwrap();
        std::fs::write(dir.path().join("icon.svg"), b"svg").unwrap();
        std::fs::write(dir.path().join("myicon.png"), b"no").unwrap();
        std::fs::write(dir.path().join("app.rly"), b"payload").unwrap();
        std::fs::create_dir(dir.path().join("icon.d")).unwrap();

        let mut names: Vec<String> = icon_files(dir.path())
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["icon.png", "icon.svg"]);
    }

    #[test]
    fn test_remove_submission() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("com.a.b");
        std::fs::create_dir_all(sub.join("nested")).unwrap();
        std::fs::write(sub.join("nested").join("f"), b"x").unwrap();

        remove_submission(&sub).unwrap();
        assert!(!sub.exists());
    }
}
