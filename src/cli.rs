use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ProfileOverrides;

/// Command-line arguments for the avatar uploader.
///
/// Every command works against one persisted connection profile; the
/// global `--profile-path` moves it away from the per-user default.
#[derive(Parser, Debug)]
#[clap(
    name = "avatar-uploader",
    about = "Upload a built avatar bundle and its metadata to an S3-compatible bucket"
)]
pub struct Args {
    /// Verbose logging
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Use this profile file instead of the per-user default
    #[clap(long, global = true)]
    pub profile_path: Option<PathBuf>,

    /// Subcommands
    #[clap(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload the artifact pair from the AssetBundles directory
    Upload(UploadOpts),

    /// Inspect or edit the persisted connection profile
    Profile {
        #[clap(subcommand)]
        action: ProfileCommand,
    },
}

/// Options for the upload subcommand.
#[derive(ClapArgs, Debug)]
pub struct UploadOpts {
    /// Directory holding the artifact pair (default: ./AssetBundles)
    #[clap(short, long)]
    pub dir: Option<PathBuf>,

    /// Field overrides applied to the loaded profile for this upload
    #[clap(flatten)]
    pub fields: ProfileFields,

    /// Persist the profile, overrides included, before uploading
    #[clap(long)]
    pub save: bool,
}

/// Profile management actions.
#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Print the profile with secrets masked
    Show,

    /// Set one or more fields and save the profile
    Set(ProfileFields),

    /// Delete the persisted profile
    Delete,

    /// Print where the profile is stored
    Path,
}

/// The four profile fields as optional flags.
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct ProfileFields {
    /// Access key for the storage endpoint
    #[clap(long)]
    pub access_key: Option<String>,

    /// Secret key for the storage endpoint
    #[clap(long)]
    pub secret_key: Option<String>,

    /// Base URL of the S3-compatible service
    #[clap(long)]
    pub endpoint: Option<String>,

    /// Bucket that receives the artifacts
    #[clap(long)]
    pub bucket: Option<String>,
}

impl ProfileFields {
    pub fn to_overrides(&self) -> ProfileOverrides {
        ProfileOverrides {
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            endpoint_url: self.endpoint.clone(),
            bucket_name: self.bucket.clone(),
        }
    }
}
