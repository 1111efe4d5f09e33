//! Upload sessions.
//!
//! A session locates the artifact pair, builds a storage client from the
//! profile and publishes the two files in a fixed order:
//!
//! ```text
//! Idle → LocatingArtifacts ─┬─▶ NotFound
//!                           └─▶ UploadingBundle ─┬─▶ Failed | Cancelled
//!                                                └─▶ UploadingMeta ─┬─▶ Failed | Cancelled
//!                                                                   └─▶ Succeeded
//! ```
//!
//! The metadata file describes the bundle, so it is only published once the
//! bundle itself is up. A bundle without metadata is treated as "not yet
//! published" by consumers and is not rolled back.
//!
//! ## Components
//!
//! - **Orchestrator**: the session state machine and status classification
//! - **Progress**: the progress surface contract and a terminal implementation
//! - **Report**: per-file results and where their messages go

pub mod orchestrator;
pub mod progress;
pub mod report;

pub use orchestrator::{
    classify, is_success_status, SessionReport, SessionState, UploadOrchestrator,
};
pub use progress::{ProgressScope, ProgressSignal, ProgressSink, TerminalProgress};
pub use report::{LogReporter, UploadOutcome, UploadReporter, UploadResult};
