use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tempfile::NamedTempFile;

use crate::config::ConfigProfile;
use crate::constants::{PROFILE_DIR_NAME, PROFILE_FILE_NAME};
use crate::error::UploadError;

/// Well-known profile location under the per-user data directory.
pub fn default_profile_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("Failed to get user data directory")?;
    Ok(data_dir.join(PROFILE_DIR_NAME).join(PROFILE_FILE_NAME))
}

/// Loads, saves and deletes the single persisted [`ConfigProfile`].
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store backed by [`default_profile_path`].
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(default_profile_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the profile, treating a missing or unreadable file as an empty profile.
    ///
    /// A corrupt file is logged and otherwise ignored; it is left on disk
    /// until the next save replaces it.
    pub fn load(&self) -> ConfigProfile {
        match self.load_strict() {
            Ok(profile) => profile,
            Err(e) => {
                warn!("{}; using an empty profile", e);
                ConfigProfile::default()
            }
        }
    }

    /// Load the profile, surfacing a corrupt or unreadable file as an error.
    ///
    /// A missing file is still not an error and yields an empty profile.
    pub fn load_strict(&self) -> std::result::Result<ConfigProfile, UploadError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No profile at {}, starting empty", self.path.display());
                return Ok(ConfigProfile::default());
            }
            Err(source) => {
                return Err(UploadError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let profile = serde_json::from_str(&content).map_err(|source| UploadError::Config {
            path: self.path.clone(),
            source,
        })?;

        debug!("Loaded profile from {}", self.path.display());
        Ok(profile)
    }

    /// Write the whole profile, replacing any previous file.
    ///
    /// The JSON goes to a temporary file in the same directory which is then
    /// renamed over the target, so a reader sees either the old or the new
    /// document and never a torn one.
    pub fn save(&self, profile: &ConfigProfile) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create profile directory {}", dir.display()))?;

        let json = serde_json::to_string_pretty(profile).context("Failed to serialize profile")?;

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())
            .context("Failed to write profile")?;
        tmp.as_file()
            .sync_all()
            .context("Failed to flush profile to disk")?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write profile to {}", self.path.display()))?;

        info!("Saved profile to {}", self.path.display());
        Ok(())
    }

    /// Remove the persisted profile. Deleting a missing profile is not an error.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Deleted profile at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No profile to delete at {}", self.path.display());
                Ok(())
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to delete profile at {}", self.path.display())),
        }
    }
}
