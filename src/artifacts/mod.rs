//! Discovery of the artifact pair a build leaves on disk.
//!
//! A build writes exactly one bundle and one metadata file into the
//! `AssetBundles` directory, replacing whatever was there before. The
//! locator recognises the two files purely by their name suffix.
//!
//! ```no_run
//! use avatar_uploader::artifacts::{find, working_directory_artifacts};
//!
//! # fn example() -> anyhow::Result<()> {
//! let dir = working_directory_artifacts()?;
//! let pair = find(&dir)?;
//! println!("bundle: {}", pair.bundle_path.display());
//! println!("meta:   {}", pair.meta_path.display());
//! # Ok(())
//! # }
//! ```

mod locator;

pub use locator::{find, working_directory_artifacts, ArtifactPair};
