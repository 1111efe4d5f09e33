//! # avatar-uploader
//!
//! Publishes a built avatar to an S3-compatible bucket: the packaged bundle
//! and its companion metadata file, uploaded as one logical unit.
//!
//! ## Overview
//!
//! A build leaves exactly one artifact pair in the `AssetBundles` directory
//! of the working directory. An upload session finds that pair, connects to
//! the endpoint described by the operator's connection profile and uploads
//! the bundle, then the metadata file, with a cancellable progress display.
//!
//! ## Features
//!
//! - **Single-slot artifact discovery**: suffix matching on one directory listing
//! - **Ordered publish**: metadata is only uploaded after the bundle succeeds
//! - **Cooperative cancellation**: from the progress surface or from Ctrl-C
//! - **Persistent profile**: credentials, endpoint and bucket saved per user
//! - **Self-hosted endpoints**: path-style requests with unsigned payloads
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use avatar_uploader::artifacts::working_directory_artifacts;
//! use avatar_uploader::config::ProfileStore;
//! use avatar_uploader::upload::{LogReporter, TerminalProgress, UploadOrchestrator};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = ProfileStore::default_location()?;
//! let profile = store.load();
//!
//! let orchestrator = UploadOrchestrator::new(
//!     working_directory_artifacts()?,
//!     Arc::new(TerminalProgress::new()),
//!     Arc::new(LogReporter),
//!     CancellationToken::new(),
//! );
//! let report = orchestrator.upload(&profile).await;
//! println!("session ended in {:?}", report.state);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions and argument parsing
//! - [`config`]: Connection profile and its persistence
//! - [`artifacts`]: Locating the bundle and metadata pair on disk
//! - [`cloud`]: Object storage client trait and the S3 implementation
//! - [`upload`]: Upload sessions, progress and result reporting
//! - [`security`]: Credential scrubbing for logs and messages
//! - [`error`]: Error taxonomy
//! - [`constants`]: Application constants

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Connection profile and its persistence
pub mod config;

/// Artifact pair discovery
pub mod artifacts;

/// Object storage integration (S3)
pub mod cloud;

/// Upload sessions, progress surfaces and result reporting
pub mod upload;

/// Security utilities for credential protection
pub mod security;

/// Error taxonomy shared across the crate
pub mod error;

/// Application constants and configuration values
pub mod constants;
