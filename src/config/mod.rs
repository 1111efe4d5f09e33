//! Connection profile and its persistence.
//!
//! A profile is the four values needed to reach a bucket: the access key,
//! the secret key, the endpoint URL and the bucket name. It lives in a single
//! JSON file under the per-user data directory and is always read and written
//! as a whole.
//!
//! ## Usage Example
//!
//! ```no_run
//! use avatar_uploader::config::{ConfigProfile, ProfileStore};
//!
//! # fn example() -> anyhow::Result<()> {
//! let store = ProfileStore::default_location()?;
//!
//! let mut profile = store.load();
//! profile.bucket_name = "avatars".to_string();
//! store.save(&profile)?;
//!
//! store.delete()?;
//! assert_eq!(store.load(), ConfigProfile::default());
//! # Ok(())
//! # }
//! ```

mod profile;
mod store;

pub use profile::{ConfigProfile, ProfileOverrides};
pub use store::{default_profile_path, ProfileStore};
