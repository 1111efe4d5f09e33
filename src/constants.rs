//! Global constants for the avatar uploader.
//!
//! This module centralizes all hardcoded values to improve maintainability
//! and make configuration changes easier.

// Artifact layout
/// Directory, relative to the working directory, that a build drops its artifact pair into
pub const ASSET_BUNDLE_DIR: &str = "AssetBundles";

/// File name suffix identifying the packaged bundle
pub const BUNDLE_SUFFIX: &str = "BasisEncyptedBundle";

/// File name suffix identifying the companion metadata file
pub const META_SUFFIX: &str = "BasisEncyptedMeta";

// Profile persistence
/// Directory under the platform data root that holds the profile
pub const PROFILE_DIR_NAME: &str = "BasisVr";

/// File name of the persisted connection profile
pub const PROFILE_FILE_NAME: &str = "BasisVrS3UploadConfig.json";

// Cloud storage constants
/// Signing region used for S3-compatible endpoints addressed by URL
pub const SIGNING_REGION: &str = "us-east-1";

/// Read chunk size when streaming a file body (64KB)
pub const STREAMING_BUFFER_SIZE: usize = 64 * 1024;

/// Lowest HTTP status treated as a successful transfer
pub const SUCCESS_STATUS_MIN: u16 = 200;

/// Highest HTTP status treated as a successful transfer
pub const SUCCESS_STATUS_MAX: u16 = 299;

// Progress surface
/// Title shown on the progress surface during a transfer
pub const PROGRESS_TITLE: &str = "Upload";

/// Placeholder used when masking secrets for display
pub const REDACTED: &str = "<REDACTED>";

// Process exit codes
/// A transfer failed or the client could not be built
pub const EXIT_SESSION_FAILED: u8 = 1;

/// No artifact pair in the AssetBundles directory
pub const EXIT_ARTIFACTS_NOT_FOUND: u8 = 2;

/// The session was cancelled (128 + SIGINT)
pub const EXIT_SESSION_CANCELLED: u8 = 130;

// Error messages
pub const ERROR_ARTIFACTS_NOT_FOUND: &str = "Could not find avatar to upload in";
pub const ERROR_UPLOAD_FAILED: &str = "Upload failed";
pub const ERROR_UPLOAD_CANCELLED: &str = "Upload cancelled";
pub const ERROR_FAILED_TO_CREATE_CLIENT: &str = "Failed to create S3 client";
