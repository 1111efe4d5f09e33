//! Integration tests for upload sessions.
//!
//! Sessions run against a temporary AssetBundles directory and either a
//! mockall mock or a scripted in-memory client, so no network is needed
//! except for the single unreachable-endpoint test.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use mockall::mock;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use avatar_uploader::cloud::client::{ObjectStorageClient, ProgressCallback};
use avatar_uploader::config::ConfigProfile;
use avatar_uploader::constants::{BUNDLE_SUFFIX, META_SUFFIX};
use avatar_uploader::error::UploadError;
use avatar_uploader::upload::{
    ProgressSignal, ProgressSink, SessionReport, SessionState, UploadOrchestrator, UploadOutcome,
    UploadReporter, UploadResult,
};

mock! {
    pub Storage {}

    #[async_trait]
    impl ObjectStorageClient for Storage {
        async fn put(
            &self,
            bucket: &str,
            file_path: &Path,
            on_progress: ProgressCallback,
            cancel: &CancellationToken,
        ) -> Result<Option<u16>, UploadError>;
    }
}

/// What the scripted client does for one put call
enum Step {
    Respond(u16),
    /// Success as reported by a client that cannot see the status code
    Completed,
    Transport(&'static str),
    /// Report some progress, then wait for the token
    StallUntilCancelled,
}

struct ScriptedClient {
    steps: Mutex<VecDeque<Step>>,
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl ScriptedClient {
    fn new(steps: Vec<Step>) -> (Self, Arc<Mutex<Vec<PathBuf>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let client = Self {
            steps: Mutex::new(steps.into()),
            calls: Arc::clone(&calls),
        };
        (client, calls)
    }
}

#[async_trait]
impl ObjectStorageClient for ScriptedClient {
    async fn put(
        &self,
        _bucket: &str,
        file_path: &Path,
        on_progress: ProgressCallback,
        cancel: &CancellationToken,
    ) -> Result<Option<u16>, UploadError> {
        self.calls.lock().unwrap().push(file_path.to_path_buf());
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Step::Respond(200));

        match step {
            Step::Respond(status) => {
                on_progress(0.5);
                on_progress(1.0);
                Ok(Some(status))
            }
            Step::Completed => {
                on_progress(1.0);
                Ok(None)
            }
            Step::Transport(message) => Err(UploadError::Transport(message.to_string())),
            Step::StallUntilCancelled => {
                for fraction in [0.1, 0.25, 0.5] {
                    on_progress(fraction);
                    tokio::task::yield_now().await;
                }
                cancel.cancelled().await;
                Err(UploadError::Cancelled)
            }
        }
    }
}

#[derive(Default)]
struct RecordingSink {
    begins: Mutex<Vec<String>>,
    fractions: Mutex<Vec<f64>>,
    clears: Mutex<usize>,
    cancel_at: Option<f64>,
}

impl RecordingSink {
    fn cancelling_at(fraction: f64) -> Self {
        Self {
            cancel_at: Some(fraction),
            ..Default::default()
        }
    }

    fn begin_count(&self) -> usize {
        self.begins.lock().unwrap().len()
    }

    fn clear_count(&self) -> usize {
        *self.clears.lock().unwrap()
    }
}

impl ProgressSink for RecordingSink {
    fn begin(&self, title: &str, info: &str) {
        self.begins.lock().unwrap().push(format!("{}: {}", title, info));
    }

    fn report(&self, fraction: f64) -> ProgressSignal {
        self.fractions.lock().unwrap().push(fraction);
        match self.cancel_at {
            Some(at) if fraction >= at => ProgressSignal::Cancel,
            _ => ProgressSignal::Continue,
        }
    }

    fn clear(&self) {
        *self.clears.lock().unwrap() += 1;
    }
}

#[derive(Default)]
struct RecordingReporter {
    not_found: Mutex<Vec<PathBuf>>,
    finished: Mutex<Vec<UploadResult>>,
}

impl UploadReporter for RecordingReporter {
    fn artifacts_not_found(&self, directory: &Path) {
        self.not_found.lock().unwrap().push(directory.to_path_buf());
    }

    fn transfer_finished(&self, result: &UploadResult) {
        self.finished.lock().unwrap().push(result.clone());
    }
}

struct Fixture {
    _dir: TempDir,
    artifact_dir: PathBuf,
    sink: Arc<RecordingSink>,
    reporter: Arc<RecordingReporter>,
    shutdown: CancellationToken,
}

impl Fixture {
    /// AssetBundles holding one bundle and one metadata file
    fn with_pair() -> Result<Self> {
        Self::with_sink(RecordingSink::default())
    }

    fn with_sink(sink: RecordingSink) -> Result<Self> {
        let fixture = Self::empty(sink)?;
        fs::write(fixture.bundle_path(), vec![1u8; 4096])?;
        fs::write(fixture.meta_path(), b"{\"name\":\"avatar\"}")?;
        Ok(fixture)
    }

    fn empty(sink: RecordingSink) -> Result<Self> {
        let dir = TempDir::new()?;
        let artifact_dir = dir.path().join("AssetBundles");
        fs::create_dir(&artifact_dir)?;
        Ok(Self {
            _dir: dir,
            artifact_dir,
            sink: Arc::new(sink),
            reporter: Arc::new(RecordingReporter::default()),
            shutdown: CancellationToken::new(),
        })
    }

    fn bundle_path(&self) -> PathBuf {
        self.artifact_dir.join(format!("x.{}", BUNDLE_SUFFIX))
    }

    fn meta_path(&self) -> PathBuf {
        self.artifact_dir.join(format!("x.{}", META_SUFFIX))
    }

    fn orchestrator(&self) -> UploadOrchestrator {
        UploadOrchestrator::new(
            self.artifact_dir.clone(),
            self.sink.clone(),
            self.reporter.clone(),
            self.shutdown.clone(),
        )
    }

    async fn run<C: ObjectStorageClient>(&self, client: C) -> SessionReport {
        self.orchestrator()
            .upload_with(&profile(), move |_| Ok(client))
            .await
    }
}

fn profile() -> ConfigProfile {
    ConfigProfile::new("AKIDEXAMPLE", "wJalrXUtnFEMI", "https://s3.example.com", "avatars")
}

fn is_bundle(path: &Path) -> bool {
    path.to_string_lossy().ends_with(BUNDLE_SUFFIX)
}

fn is_meta(path: &Path) -> bool {
    path.to_string_lossy().ends_with(META_SUFFIX)
}

#[tokio::test]
async fn test_both_files_published_in_order() -> Result<()> {
    let fixture = Fixture::with_pair()?;
    let (client, calls) = ScriptedClient::new(vec![Step::Respond(200), Step::Respond(200)]);

    let report = fixture.run(client).await;

    assert_eq!(report.state, SessionState::Succeeded);
    assert!(report.is_success());
    assert_eq!(*calls.lock().unwrap(), vec![fixture.bundle_path(), fixture.meta_path()]);
    assert_eq!(report.results.len(), 2);
    assert!(report
        .results
        .iter()
        .all(|r| r.outcome == UploadOutcome::Succeeded && r.status == Some(200)));
    Ok(())
}

/// A success without a status code is reported without one
#[tokio::test]
async fn test_success_without_status_code() -> Result<()> {
    let fixture = Fixture::with_pair()?;
    let (client, _calls) = ScriptedClient::new(vec![Step::Completed, Step::Completed]);

    let report = fixture.run(client).await;

    assert_eq!(report.state, SessionState::Succeeded);
    assert!(report.results.iter().all(|r| r.status.is_none()));

    let finished = fixture.reporter.finished.lock().unwrap();
    assert!(finished[0].to_string().starts_with("Upload completed for"));
    assert!(!finished[0].to_string().contains("status code"));
    Ok(())
}

/// Metadata is never attempted when the bundle is rejected
#[tokio::test]
async fn test_meta_skipped_when_bundle_rejected() -> Result<()> {
    let fixture = Fixture::with_pair()?;

    let mut storage = MockStorage::new();
    storage
        .expect_put()
        .withf(|bucket, file_path, _, _| bucket.to_string() == "avatars" && is_bundle(file_path))
        .times(1)
        .returning(|_, _, _, _| Ok(Some(500)));
    storage
        .expect_put()
        .withf(|_, file_path, _, _| is_meta(file_path))
        .times(0);

    let report = fixture.run(storage).await;

    assert_eq!(report.state, SessionState::Failed);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].outcome, UploadOutcome::Failed);
    assert_eq!(report.results[0].status, Some(500));
    assert!(report.results[0].detail.as_deref().unwrap().contains("500"));
    Ok(())
}

/// Any 2xx status counts as success
#[tokio::test]
async fn test_2xx_statuses_succeed() -> Result<()> {
    for status in [200u16, 204] {
        let fixture = Fixture::with_pair()?;
        let mut storage = MockStorage::new();
        storage
            .expect_put()
            .times(2)
            .returning(move |_, _, _, _| Ok(Some(status)));

        let report = fixture.run(storage).await;

        assert_eq!(report.state, SessionState::Succeeded, "status {}", status);
        assert_eq!(report.results[1].status, Some(status));
    }
    Ok(())
}

#[tokio::test]
async fn test_non_2xx_statuses_fail() -> Result<()> {
    for status in [403u16, 500] {
        let fixture = Fixture::with_pair()?;
        let mut storage = MockStorage::new();
        storage
            .expect_put()
            .times(1)
            .returning(move |_, _, _, _| Ok(Some(status)));

        let report = fixture.run(storage).await;

        assert_eq!(report.state, SessionState::Failed);
        let detail = report.results[0].detail.clone().unwrap_or_default();
        assert!(detail.contains(&status.to_string()), "detail was {:?}", detail);
    }
    Ok(())
}

/// A rejected metadata upload fails the session with the bundle already published
#[tokio::test]
async fn test_meta_rejection_after_bundle_success() -> Result<()> {
    let fixture = Fixture::with_pair()?;
    let (client, calls) = ScriptedClient::new(vec![Step::Respond(200), Step::Respond(403)]);

    let report = fixture.run(client).await;

    assert_eq!(report.state, SessionState::Failed);
    assert_eq!(calls.lock().unwrap().len(), 2);
    assert_eq!(report.results[0].outcome, UploadOutcome::Succeeded);
    assert_eq!(report.results[1].outcome, UploadOutcome::Failed);
    assert_eq!(report.results[1].status, Some(403));
    Ok(())
}

#[tokio::test]
async fn test_transport_error_reported_with_message() -> Result<()> {
    let fixture = Fixture::with_pair()?;
    let (client, calls) = ScriptedClient::new(vec![Step::Transport("connection refused")]);

    let report = fixture.run(client).await;

    assert_eq!(report.state, SessionState::Failed);
    assert_eq!(calls.lock().unwrap().len(), 1);

    let finished = fixture.reporter.finished.lock().unwrap();
    assert_eq!(finished.len(), 1);
    assert!(finished[0].detail.as_deref().unwrap().contains("connection refused"));
    assert!(finished[0].to_string().contains("connection refused"));
    Ok(())
}

/// Secrets from the profile never reach the reported message
#[tokio::test]
async fn test_error_detail_scrubbed_of_profile_secret() -> Result<()> {
    let fixture = Fixture::with_pair()?;
    let mut storage = MockStorage::new();
    storage
        .expect_put()
        .times(1)
        .returning(|_, _, _, _| {
            Err(UploadError::Auth(
                "signature for wJalrXUtnFEMI rejected".to_string(),
            ))
        });

    let report = fixture.run(storage).await;

    let detail = report.results[0].detail.clone().unwrap_or_default();
    assert!(!detail.contains("wJalrXUtnFEMI"));
    assert!(detail.contains("rejected"));
    Ok(())
}

/// Cancelling from the progress surface ends the session without touching the metadata
#[tokio::test]
async fn test_cancel_from_progress_surface() -> Result<()> {
    let fixture = Fixture::with_sink(RecordingSink::cancelling_at(0.25))?;
    let (client, calls) = ScriptedClient::new(vec![Step::StallUntilCancelled]);

    let report = fixture.run(client).await;

    assert_eq!(report.state, SessionState::Cancelled);
    assert_eq!(*calls.lock().unwrap(), vec![fixture.bundle_path()]);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].outcome, UploadOutcome::Cancelled);
    assert_eq!(fixture.sink.begin_count(), 1);
    assert_eq!(fixture.sink.clear_count(), 1);
    assert!(!fixture.shutdown.is_cancelled());
    Ok(())
}

/// Cancelling the process-wide token aborts the transfer in flight
#[tokio::test]
async fn test_shutdown_cancels_transfer_in_flight() -> Result<()> {
    let fixture = Fixture::with_pair()?;
    let (client, calls) = ScriptedClient::new(vec![Step::StallUntilCancelled]);

    let shutdown = fixture.shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.cancel();
    });

    let report = fixture.run(client).await;

    assert_eq!(report.state, SessionState::Cancelled);
    assert_eq!(calls.lock().unwrap().len(), 1);
    assert_eq!(fixture.sink.clear_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_shutdown_before_session_cancels_bundle() -> Result<()> {
    let fixture = Fixture::with_pair()?;
    fixture.shutdown.cancel();
    let (client, calls) = ScriptedClient::new(vec![Step::StallUntilCancelled]);

    let report = fixture.run(client).await;

    assert_eq!(report.state, SessionState::Cancelled);
    assert_eq!(*calls.lock().unwrap(), vec![fixture.bundle_path()]);
    Ok(())
}

/// A missing pair is reported once and no client is ever built
#[tokio::test]
async fn test_missing_pair_reports_not_found() -> Result<()> {
    let fixture = Fixture::empty(RecordingSink::default())?;
    fs::write(fixture.bundle_path(), b"bundle only")?;

    let report = fixture
        .orchestrator()
        .upload_with(&profile(), |_| -> Result<MockStorage> {
            panic!("client should not be built without artifacts")
        })
        .await;

    assert_eq!(report.state, SessionState::NotFound);
    assert!(report.results.is_empty());
    assert_eq!(*fixture.reporter.not_found.lock().unwrap(), vec![fixture.artifact_dir.clone()]);
    assert!(fixture.reporter.finished.lock().unwrap().is_empty());
    assert_eq!(fixture.sink.begin_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_client_construction_failure() -> Result<()> {
    let fixture = Fixture::with_pair()?;

    let report = fixture
        .orchestrator()
        .upload_with(&profile(), |_| -> Result<MockStorage> {
            Err(anyhow!("tls backend unavailable"))
        })
        .await;

    assert_eq!(report.state, SessionState::Failed);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].file_path, fixture.bundle_path());
    assert!(report.results[0].detail.as_deref().unwrap().contains("tls backend unavailable"));
    assert_eq!(fixture.sink.begin_count(), 0);
    Ok(())
}

/// The surface is shown and cleared once per attempted transfer
#[tokio::test]
async fn test_progress_cleared_after_every_transfer() -> Result<()> {
    let fixture = Fixture::with_pair()?;
    let (client, _calls) = ScriptedClient::new(vec![Step::Respond(200), Step::Transport("reset")]);

    fixture.run(client).await;

    assert_eq!(fixture.sink.begin_count(), 2);
    assert_eq!(fixture.sink.clear_count(), 2);

    let begins = fixture.sink.begins.lock().unwrap();
    assert!(begins[0].starts_with("Upload: Uploading to bucket avatars"));
    assert!(begins[0].contains(BUNDLE_SUFFIX));
    assert!(begins[1].contains(META_SUFFIX));
    Ok(())
}

#[tokio::test]
async fn test_progress_fractions_in_range() -> Result<()> {
    let fixture = Fixture::with_pair()?;
    let (client, _calls) = ScriptedClient::new(vec![Step::Respond(200), Step::Respond(200)]);

    fixture.run(client).await;

    let fractions = fixture.sink.fractions.lock().unwrap();
    assert!(!fractions.is_empty());
    assert!(fractions.iter().all(|f| (0.0..=1.0).contains(f)));
    Ok(())
}

/// Every session rescans the directory, so a rebuilt pair is picked up
#[tokio::test]
async fn test_sessions_rescan_directory() -> Result<()> {
    let fixture = Fixture::with_pair()?;
    let orchestrator = fixture.orchestrator();

    let (first, _) = ScriptedClient::new(vec![]);
    let report = orchestrator.upload_with(&profile(), move |_| Ok(first)).await;
    assert_eq!(report.state, SessionState::Succeeded);

    fs::remove_file(fixture.meta_path())?;
    let (second, calls) = ScriptedClient::new(vec![]);
    let report = orchestrator.upload_with(&profile(), move |_| Ok(second)).await;

    assert_eq!(report.state, SessionState::NotFound);
    assert!(calls.lock().unwrap().is_empty());
    Ok(())
}

/// Unreachable endpoint through the real S3 client
#[tokio::test]
async fn test_unreachable_endpoint_fails_bundle() -> Result<()> {
    let fixture = Fixture::with_pair()?;
    let profile = ConfigProfile::new("AKIDEXAMPLE", "secret-key", "http://127.0.0.1:1", "avatars");

    let report = fixture.orchestrator().upload(&profile).await;

    assert_eq!(report.state, SessionState::Failed);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].file_path, fixture.bundle_path());
    assert!(report.results[0].status.is_none());
    Ok(())
}
