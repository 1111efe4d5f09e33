//! Object storage integration for artifact uploads.
//!
//! The rest of the crate only talks to storage through the
//! [`ObjectStorageClient`](client::ObjectStorageClient) trait: a single,
//! credentialed, cancellable, progress-reporting put of one local file.
//! [`S3ObjectClient`](s3::S3ObjectClient) implements it on top of rusoto for
//! any S3-compatible endpoint, including self-hosted ones.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐  put(bucket, file)  ┌─────────────────────┐
//! │ UploadOrchestrator │────────────────────▶│ ObjectStorageClient │
//! └────────────────────┘                     └──────────┬──────────┘
//!           ▲     progress fraction / cancel            │
//!           └───────────────────────────────────────────┤
//!                                            ┌──────────▼──────────┐
//!                                            │    S3-compatible    │
//!                                            │      endpoint       │
//!                                            └─────────────────────┘
//! ```
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use avatar_uploader::cloud::client::ObjectStorageClient;
//! use avatar_uploader::cloud::s3::S3ObjectClient;
//! use avatar_uploader::config::ConfigProfile;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let profile = ConfigProfile::new("KEY", "SECRET", "https://s3.example.com", "avatars");
//! let client = S3ObjectClient::from_profile(&profile)?;
//!
//! let status = client.put(
//!     &profile.bucket_name,
//!     Path::new("/work/AssetBundles/x.BasisEncyptedBundle"),
//!     Arc::new(|fraction| println!("{:.0}%", fraction * 100.0)),
//!     &CancellationToken::new(),
//! ).await?;
//! println!("status {:?}", status);
//! # Ok(())
//! # }
//! ```

/// Storage client trait and shared helpers
pub mod client;

/// rusoto-backed S3 implementation
pub mod s3;
