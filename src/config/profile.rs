use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::REDACTED;

/// Credentials, endpoint and bucket used to build a storage client.
///
/// All four fields may be empty at rest; nothing is validated until an
/// upload actually uses them. The serialized field names are fixed so the
/// file stays compatible with profiles written by other tools.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigProfile {
    #[serde(rename = "AccessKey")]
    pub access_key: String,

    #[serde(rename = "SecretKey")]
    pub secret_key: String,

    /// Base URL of the S3-compatible service
    #[serde(rename = "ServiceUrl")]
    pub endpoint_url: String,

    #[serde(rename = "AvatarBucket")]
    pub bucket_name: String,
}

impl ConfigProfile {
    pub fn new(access_key: &str, secret_key: &str, endpoint_url: &str, bucket_name: &str) -> Self {
        Self {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
            endpoint_url: endpoint_url.to_string(),
            bucket_name: bucket_name.to_string(),
        }
    }

    /// True when every field is empty
    pub fn is_empty(&self) -> bool {
        self.access_key.is_empty()
            && self.secret_key.is_empty()
            && self.endpoint_url.is_empty()
            && self.bucket_name.is_empty()
    }

    /// Overwrite the fields that were given, leaving the rest untouched.
    pub fn apply(&mut self, overrides: &ProfileOverrides) {
        if let Some(access_key) = &overrides.access_key {
            self.access_key = access_key.clone();
        }
        if let Some(secret_key) = &overrides.secret_key {
            self.secret_key = secret_key.clone();
        }
        if let Some(endpoint_url) = &overrides.endpoint_url {
            self.endpoint_url = endpoint_url.clone();
        }
        if let Some(bucket_name) = &overrides.bucket_name {
            self.bucket_name = bucket_name.clone();
        }
    }

    /// The secrets this profile carries, for scrubbing messages before they are shown
    pub fn secrets(&self) -> Vec<&str> {
        [self.access_key.as_str(), self.secret_key.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn mask(value: &str) -> &str {
    if value.is_empty() {
        ""
    } else {
        REDACTED
    }
}

impl fmt::Debug for ConfigProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigProfile")
            .field("access_key", &mask(&self.access_key))
            .field("secret_key", &mask(&self.secret_key))
            .field("endpoint_url", &self.endpoint_url)
            .field("bucket_name", &self.bucket_name)
            .finish()
    }
}

impl fmt::Display for ConfigProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Access key:  {}", mask(&self.access_key))?;
        writeln!(f, "Secret key:  {}", mask(&self.secret_key))?;
        writeln!(f, "Service URL: {}", self.endpoint_url)?;
        write!(f, "Bucket name: {}", self.bucket_name)
    }
}

/// Per-invocation field edits, as typed on the command line.
#[derive(Debug, Clone, Default)]
pub struct ProfileOverrides {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub endpoint_url: Option<String>,
    pub bucket_name: Option<String>,
}

impl ProfileOverrides {
    pub fn is_empty(&self) -> bool {
        self.access_key.is_none()
            && self.secret_key.is_none()
            && self.endpoint_url.is_none()
            && self.bucket_name.is_none()
    }
}
