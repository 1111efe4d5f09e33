//! Error taxonomy shared by the locator, the storage client and the orchestrator.

use std::path::PathBuf;

use thiserror::Error;

/// Every failure a session can run into.
///
/// The orchestrator never lets one of these escape to the host surface:
/// each is converted into an [`UploadResult`](crate::upload::UploadResult)
/// or a log entry at the transfer boundary.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The persisted profile exists but is not a valid profile document
    #[error("failed to parse profile at {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The artifact directory is missing or does not hold a complete pair
    #[error("Could not find avatar to upload in {}", .0.display())]
    NotFound(PathBuf),

    /// The endpoint rejected the credentials
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// Network or protocol failure during a transfer
    #[error("transport failure: {0}")]
    Transport(String),

    /// The transfer was aborted through its cancellation token
    #[error("upload cancelled")]
    Cancelled,

    /// A local file could not be read for upload
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UploadError {
    /// Whether this error is the cooperative-cancellation outcome rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, UploadError::Cancelled)
    }
}
