use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::BytesMut;
use futures::TryStreamExt;
use log::{debug, warn};
use rusoto_core::{ByteStream, HttpClient, Region, RusotoError};
use rusoto_credential::StaticProvider;
use rusoto_s3::{PutObjectError, PutObjectRequest, S3Client, S3};
use tokio::fs::File as AsyncFile;
use tokio_util::codec::{BytesCodec, FramedRead};
use tokio_util::sync::CancellationToken;

use crate::cloud::client::{completion_fraction, object_key, ObjectStorageClient, ProgressCallback};
use crate::config::ConfigProfile;
use crate::constants::{ERROR_FAILED_TO_CREATE_CLIENT, SIGNING_REGION, STREAMING_BUFFER_SIZE};
use crate::error::UploadError;

/// S3 client bound to one profile's endpoint and credentials.
///
/// Requests are path-style against the profile's endpoint, carry an
/// unsigned streaming payload and no flexible-checksum headers, which keeps
/// self-hosted S3 implementations happy. Empty credentials are passed through
/// as-is and fail at the endpoint rather than being caught here.
///
/// rusoto does not expose the status of a successful put, so a success is
/// reported as `Ok(None)`. Error responses carry their real status.
///
/// Owned by a single upload session and dropped when it ends, which closes
/// the underlying connection pool.
pub struct S3ObjectClient {
    client: S3Client,
    endpoint: String,
}

impl S3ObjectClient {
    /// Build a client from the profile's keys and endpoint URL.
    pub fn from_profile(profile: &ConfigProfile) -> Result<Self> {
        let region = Region::Custom {
            name: SIGNING_REGION.to_string(),
            endpoint: profile.endpoint_url.clone(),
        };
        let credentials =
            StaticProvider::new_minimal(profile.access_key.clone(), profile.secret_key.clone());
        let http_client = HttpClient::new().context(ERROR_FAILED_TO_CREATE_CLIENT)?;

        debug!("Created S3 client for endpoint '{}'", profile.endpoint_url);

        Ok(Self {
            client: S3Client::new_with(http_client, credentials, region),
            endpoint: profile.endpoint_url.clone(),
        })
    }
}

#[async_trait]
impl ObjectStorageClient for S3ObjectClient {
    async fn put(
        &self,
        bucket: &str,
        file_path: &Path,
        on_progress: ProgressCallback,
        cancel: &CancellationToken,
    ) -> Result<Option<u16>, UploadError> {
        let key = object_key(file_path)?;
        let io_error = |source| UploadError::Io {
            path: file_path.to_path_buf(),
            source,
        };

        let file = AsyncFile::open(file_path).await.map_err(io_error)?;
        let file_size = file.metadata().await.map_err(io_error)?.len();

        debug!(
            "Starting upload of {} ({} bytes) to {}/{}/{}",
            file_path.display(),
            file_size,
            self.endpoint,
            bucket,
            key
        );

        let request = PutObjectRequest {
            bucket: bucket.to_string(),
            key,
            content_length: Some(file_size as i64),
            body: Some(progress_body(file, file_size, on_progress.clone())),
            ..Default::default()
        };

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("Upload of {} cancelled", file_path.display());
                Err(UploadError::Cancelled)
            }
            result = self.client.put_object(request) => match result {
                Ok(_) => {
                    on_progress(1.0);
                    Ok(None)
                }
                Err(e) => classify_put_error(e),
            },
        }
    }
}

/// Request body that streams the file from disk and reports how much of it
/// has been pulled by the HTTP layer.
fn progress_body(file: AsyncFile, file_size: u64, on_progress: ProgressCallback) -> ByteStream {
    let mut sent = 0u64;
    let stream = FramedRead::with_capacity(file, BytesCodec::new(), STREAMING_BUFFER_SIZE)
        .map_ok(BytesMut::freeze)
        .inspect_ok(move |chunk| {
            sent += chunk.len() as u64;
            on_progress(completion_fraction(sent, file_size));
        });

    ByteStream::new_with_size(stream, file_size as usize)
}

/// Turn a rusoto failure into either a response status or a typed error.
///
/// Non-success HTTP responses come back as their status so the caller can
/// classify them; credential rejections become [`UploadError::Auth`].
fn classify_put_error(err: RusotoError<PutObjectError>) -> Result<Option<u16>, UploadError> {
    match err {
        RusotoError::Credentials(e) => Err(UploadError::Auth(e.to_string())),
        RusotoError::Unknown(response) => {
            let status = response.status.as_u16();
            let body = String::from_utf8_lossy(&response.body);
            debug!("S3 responded with status {}: {}", status, body);

            if status == 401 || status == 403 {
                Err(UploadError::Auth(format!("status {}", status)))
            } else {
                Ok(Some(status))
            }
        }
        RusotoError::HttpDispatch(e) => Err(UploadError::Transport(e.to_string())),
        other => {
            warn!("Unexpected S3 error: {}", other);
            Err(UploadError::Transport(other.to_string()))
        }
    }
}
