//! Security utilities.
//!
//! This module provides credential scrubbing so that access keys, secret
//! keys and signed request material never reach a log line or a message
//! shown to the operator.

pub mod credential_scrubber;

pub use credential_scrubber::{safe_error_message, scrub_credentials, scrub_secrets};
