use std::fmt;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::constants::{ERROR_ARTIFACTS_NOT_FOUND, ERROR_UPLOAD_CANCELLED, ERROR_UPLOAD_FAILED};

/// Terminal outcome of one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Succeeded,
    Failed,
    Cancelled,
}

/// Result of one transfer, produced once and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub file_path: PathBuf,
    pub outcome: UploadOutcome,
    /// HTTP status, when the endpoint answered
    pub status: Option<u16>,
    /// Human-readable cause; present for every outcome except `Succeeded`
    pub detail: Option<String>,
}

impl UploadResult {
    /// `status` is `None` when the client reported success without a code
    pub fn succeeded(file_path: &Path, status: Option<u16>) -> Self {
        Self {
            file_path: file_path.to_path_buf(),
            outcome: UploadOutcome::Succeeded,
            status,
            detail: None,
        }
    }

    pub fn rejected(file_path: &Path, status: u16) -> Self {
        Self {
            file_path: file_path.to_path_buf(),
            outcome: UploadOutcome::Failed,
            status: Some(status),
            detail: Some(format!("status code {}", status)),
        }
    }

    pub fn failed(file_path: &Path, detail: impl Into<String>) -> Self {
        Self {
            file_path: file_path.to_path_buf(),
            outcome: UploadOutcome::Failed,
            status: None,
            detail: Some(detail.into()),
        }
    }

    pub fn cancelled(file_path: &Path) -> Self {
        Self {
            file_path: file_path.to_path_buf(),
            outcome: UploadOutcome::Cancelled,
            status: None,
            detail: Some("cancelled by user".to_string()),
        }
    }
}

impl fmt::Display for UploadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.file_path.display();
        let detail = self.detail.as_deref().unwrap_or_default();
        match self.outcome {
            UploadOutcome::Succeeded => match self.status {
                Some(status) => {
                    write!(f, "Upload completed with status code {} for {}", status, path)
                }
                None => write!(f, "Upload completed for {}", path),
            },
            UploadOutcome::Failed => write!(f, "{} for {}: {}", ERROR_UPLOAD_FAILED, path, detail),
            UploadOutcome::Cancelled => write!(f, "{} for {}", ERROR_UPLOAD_CANCELLED, path),
        }
    }
}

/// Where a session sends its user-facing messages.
pub trait UploadReporter: Send + Sync {
    /// The artifact pair could not be located; the session ends here
    fn artifacts_not_found(&self, directory: &Path);

    /// One transfer reached a terminal outcome
    fn transfer_finished(&self, result: &UploadResult);
}

/// Reports through the `log` facade: one line per terminal outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl UploadReporter for LogReporter {
    fn artifacts_not_found(&self, directory: &Path) {
        error!("{} {}", ERROR_ARTIFACTS_NOT_FOUND, directory.display());
    }

    fn transfer_finished(&self, result: &UploadResult) {
        match result.outcome {
            UploadOutcome::Succeeded => info!("{}", result),
            UploadOutcome::Failed => error!("{}", result),
            UploadOutcome::Cancelled => warn!("{}", result),
        }
    }
}
