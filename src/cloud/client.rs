use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::UploadError;

/// Receives the completion fraction of a transfer, in `[0, 1]`.
///
/// May be called from whichever task is driving the request body, so it
/// must be cheap and must not block.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// A credentialed "put object" against an S3-compatible endpoint.
#[async_trait]
pub trait ObjectStorageClient: Send + Sync {
    /// Stream `file_path` into `bucket` under the file's base name.
    ///
    /// Returns the HTTP status of the response when the client can see it.
    /// `Ok(None)` means the request succeeded but the underlying library did
    /// not expose the exact code. A response outside the success range is
    /// still `Ok`; classification is up to the caller.
    /// Fires `on_progress` with non-decreasing fractions while the body is
    /// sent. Completes with [`UploadError::Cancelled`] as soon as `cancel`
    /// is triggered.
    async fn put(
        &self,
        bucket: &str,
        file_path: &Path,
        on_progress: ProgressCallback,
        cancel: &CancellationToken,
    ) -> Result<Option<u16>, UploadError>;
}

/// Object key for a local file: its base name.
pub fn object_key(file_path: &Path) -> Result<String, UploadError> {
    file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| UploadError::Io {
            path: file_path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path has no file name component",
            ),
        })
}

/// Fraction of `total` covered by `sent`, clamped to `[0, 1]`.
///
/// An empty file counts as complete.
pub fn completion_fraction(sent: u64, total: u64) -> f64 {
    if total == 0 {
        1.0
    } else {
        (sent as f64 / total as f64).min(1.0)
    }
}
