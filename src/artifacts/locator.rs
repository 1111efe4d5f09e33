use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::constants::{ASSET_BUNDLE_DIR, BUNDLE_SUFFIX, META_SUFFIX};
use crate::error::UploadError;

/// The bundle and its metadata file, found together in one directory scan.
///
/// Never cached: the directory is rescanned for every session because a
/// new build may have replaced its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPair {
    pub bundle_path: PathBuf,
    pub meta_path: PathBuf,
}

impl ArtifactPair {
    /// Both members in upload order: bundle first, then metadata
    pub fn in_upload_order(&self) -> [&Path; 2] {
        [&self.bundle_path, &self.meta_path]
    }
}

/// `AssetBundles` under the current working directory, as an absolute path.
pub fn working_directory_artifacts() -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to get current working directory")?;
    Ok(cwd.join(ASSET_BUNDLE_DIR))
}

/// Scan `directory` (non-recursively) for one bundle and one metadata file.
///
/// Each suffix is matched independently against the same listing and the
/// first hit wins. When several files share a suffix the choice follows
/// the platform's directory listing order, which is not stable.
pub fn find(directory: &Path) -> std::result::Result<ArtifactPair, UploadError> {
    let not_found = || UploadError::NotFound(directory.to_path_buf());

    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot list {}: {}", directory.display(), e);
            return Err(not_found());
        }
    };

    // is_file follows symlinks, so a linked artifact counts as a file
    let files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();

    let bundle_path = first_with_suffix(&files, BUNDLE_SUFFIX);
    let meta_path = first_with_suffix(&files, META_SUFFIX);

    match (bundle_path, meta_path) {
        (Some(bundle_path), Some(meta_path)) => {
            debug!(
                "Found artifact pair {} / {}",
                bundle_path.display(),
                meta_path.display()
            );
            Ok(ArtifactPair {
                bundle_path,
                meta_path,
            })
        }
        _ => Err(not_found()),
    }
}

fn first_with_suffix(files: &[PathBuf], suffix: &str) -> Option<PathBuf> {
    files
        .iter()
        .find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().ends_with(suffix))
                .unwrap_or(false)
        })
        .cloned()
}
