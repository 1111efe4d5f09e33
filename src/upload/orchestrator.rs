use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::artifacts;
use crate::cloud::client::ObjectStorageClient;
use crate::cloud::s3::S3ObjectClient;
use crate::config::ConfigProfile;
use crate::constants::{
    ERROR_FAILED_TO_CREATE_CLIENT, EXIT_ARTIFACTS_NOT_FOUND, EXIT_SESSION_CANCELLED,
    EXIT_SESSION_FAILED, PROGRESS_TITLE, SUCCESS_STATUS_MAX, SUCCESS_STATUS_MIN,
};
use crate::error::UploadError;
use crate::security::{safe_error_message, scrub_secrets};
use crate::upload::progress::{ProgressScope, ProgressSink};
use crate::upload::report::{UploadOutcome, UploadReporter, UploadResult};

/// Where an upload session is, or where it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    LocatingArtifacts,
    UploadingBundle,
    UploadingMeta,
    NotFound,
    Failed,
    Cancelled,
    Succeeded,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::NotFound
                | SessionState::Failed
                | SessionState::Cancelled
                | SessionState::Succeeded
        )
    }
}

/// What a finished session produced.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub state: SessionState,
    /// One entry per transfer that was attempted, in upload order
    pub results: Vec<UploadResult>,
}

impl SessionReport {
    /// True only when both files were published
    pub fn is_success(&self) -> bool {
        self.state == SessionState::Succeeded
    }

    /// Process exit code for a host that ends with this session.
    pub fn exit_code(&self) -> u8 {
        match self.state {
            SessionState::Succeeded => 0,
            SessionState::NotFound => EXIT_ARTIFACTS_NOT_FOUND,
            SessionState::Cancelled => EXIT_SESSION_CANCELLED,
            _ => EXIT_SESSION_FAILED,
        }
    }
}

/// Tracks state transitions and results for one session.
struct Session {
    state: SessionState,
    results: Vec<UploadResult>,
}

impl Session {
    fn new() -> Self {
        Self {
            state: SessionState::Idle,
            results: Vec::with_capacity(2),
        }
    }

    fn enter(&mut self, next: SessionState) {
        debug!("Upload session {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn finish(mut self, terminal: SessionState) -> SessionReport {
        debug_assert!(terminal.is_terminal(), "{:?} is not a terminal state", terminal);
        self.enter(terminal);
        SessionReport {
            state: self.state,
            results: self.results,
        }
    }
}

/// Whether an HTTP status counts as a successful transfer
pub fn is_success_status(status: u16) -> bool {
    (SUCCESS_STATUS_MIN..=SUCCESS_STATUS_MAX).contains(&status)
}

/// Convert the storage client's answer into an [`UploadResult`].
///
/// A success without a status (`Ok(None)`) stays without one. Error details
/// are scrubbed of `secrets` and credential-like patterns.
pub fn classify(
    file_path: &Path,
    response: Result<Option<u16>, UploadError>,
    secrets: &[&str],
) -> UploadResult {
    match response {
        Ok(None) => UploadResult::succeeded(file_path, None),
        Ok(Some(status)) if is_success_status(status) => {
            UploadResult::succeeded(file_path, Some(status))
        }
        Ok(Some(status)) => UploadResult::rejected(file_path, status),
        Err(e) if e.is_cancelled() => UploadResult::cancelled(file_path),
        Err(e) => UploadResult::failed(file_path, scrub_secrets(&e.to_string(), secrets)),
    }
}

/// Publishes the artifact pair: bundle first, metadata only once the bundle is up.
///
/// The orchestrator keeps no state between sessions. The host surface is
/// expected to run one session at a time.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use avatar_uploader::artifacts::working_directory_artifacts;
/// use avatar_uploader::config::ProfileStore;
/// use avatar_uploader::upload::{LogReporter, TerminalProgress, UploadOrchestrator};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> anyhow::Result<()> {
/// let profile = ProfileStore::default_location()?.load();
/// let orchestrator = UploadOrchestrator::new(
///     working_directory_artifacts()?,
///     Arc::new(TerminalProgress::new()),
///     Arc::new(LogReporter),
///     CancellationToken::new(),
/// );
///
/// let report = orchestrator.upload(&profile).await;
/// println!("session ended in {:?}", report.state);
/// # Ok(())
/// # }
/// ```
pub struct UploadOrchestrator {
    artifact_dir: PathBuf,
    progress: Arc<dyn ProgressSink>,
    reporter: Arc<dyn UploadReporter>,
    shutdown: CancellationToken,
}

impl UploadOrchestrator {
    /// `shutdown` is the process-wide cancellation source; every transfer
    /// runs under a child of it.
    pub fn new(
        artifact_dir: impl Into<PathBuf>,
        progress: Arc<dyn ProgressSink>,
        reporter: Arc<dyn UploadReporter>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
            progress,
            reporter,
            shutdown,
        }
    }

    /// Run one session against the S3 endpoint named in `profile`.
    pub async fn upload(&self, profile: &ConfigProfile) -> SessionReport {
        self.upload_with(profile, S3ObjectClient::from_profile).await
    }

    /// Run one session with a client built by `connect`.
    ///
    /// The client is created after the artifacts are located and dropped
    /// when the session ends, whatever the outcome.
    pub async fn upload_with<C, F>(&self, profile: &ConfigProfile, connect: F) -> SessionReport
    where
        C: ObjectStorageClient,
        F: FnOnce(&ConfigProfile) -> Result<C>,
    {
        let mut session = Session::new();
        let secrets = profile.secrets();

        session.enter(SessionState::LocatingArtifacts);
        let pair = match artifacts::find(&self.artifact_dir) {
            Ok(pair) => pair,
            Err(e) => {
                debug!("{}", e);
                self.reporter.artifacts_not_found(&self.artifact_dir);
                return session.finish(SessionState::NotFound);
            }
        };

        let client = match connect(profile) {
            Ok(client) => client,
            Err(e) => {
                let cause = format!("{:#}", e);
                let detail = safe_error_message(ERROR_FAILED_TO_CREATE_CLIENT, &cause, &secrets);
                let result = UploadResult::failed(&pair.bundle_path, detail);
                self.reporter.transfer_finished(&result);
                session.results.push(result);
                return session.finish(SessionState::Failed);
            }
        };

        let stages = [SessionState::UploadingBundle, SessionState::UploadingMeta];

        for (stage, file_path) in stages.into_iter().zip(pair.in_upload_order()) {
            session.enter(stage);

            let result = self
                .transfer(&client, &profile.bucket_name, file_path, &secrets)
                .await;
            self.reporter.transfer_finished(&result);

            let outcome = result.outcome;
            session.results.push(result);

            match outcome {
                UploadOutcome::Succeeded => {}
                UploadOutcome::Failed => return session.finish(SessionState::Failed),
                UploadOutcome::Cancelled => return session.finish(SessionState::Cancelled),
            }
        }

        session.finish(SessionState::Succeeded)
    }

    /// One transfer with the progress surface held for its whole duration.
    async fn transfer<C: ObjectStorageClient>(
        &self,
        client: &C,
        bucket: &str,
        file_path: &Path,
        secrets: &[&str],
    ) -> UploadResult {
        let token = self.shutdown.child_token();
        let info = format!("Uploading to bucket {}\n{}", bucket, file_path.display());

        let scope = ProgressScope::begin(Arc::clone(&self.progress), PROGRESS_TITLE, &info);
        let response = client
            .put(bucket, file_path, scope.callback(token.clone()), &token)
            .await;
        drop(scope);

        classify(file_path, response, secrets)
    }
}
