use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use avatar_uploader::artifacts::working_directory_artifacts;
use avatar_uploader::cli::{Args, Commands, ProfileCommand, ProfileFields, UploadOpts};
use avatar_uploader::config::ProfileStore;
use avatar_uploader::upload::{LogReporter, SessionReport, TerminalProgress, UploadOrchestrator};

fn main() -> Result<ExitCode> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    initialize_logging(args.verbose)?;

    let store = match &args.profile_path {
        Some(path) => ProfileStore::new(path),
        None => ProfileStore::default_location()?,
    };

    match &args.command {
        Commands::Upload(opts) => handle_upload(&store, opts),
        Commands::Profile { action } => {
            handle_profile(&store, action)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("Failed to initialize logger")?;
    Ok(())
}

/// Run one upload session and turn its terminal state into the exit status.
///
/// The reporter has already logged the outcome, so a failed session only
/// changes the exit code.
fn handle_upload(store: &ProfileStore, opts: &UploadOpts) -> Result<ExitCode> {
    let mut profile = store.load();
    profile.apply(&opts.fields.to_overrides());

    if profile.is_empty() {
        warn!(
            "Profile at {} is empty; use `profile set` or pass the fields as flags",
            store.path().display()
        );
    }

    if opts.save {
        store.save(&profile)?;
    }

    let artifact_dir = match &opts.dir {
        Some(dir) => absolute_dir(dir)?,
        None => working_directory_artifacts()?,
    };

    let runtime = Runtime::new().context("Failed to create Tokio runtime")?;
    let report: SessionReport = runtime.block_on(async {
        let shutdown = CancellationToken::new();
        let watcher = spawn_shutdown_watcher(shutdown.clone());

        let orchestrator = UploadOrchestrator::new(
            artifact_dir,
            Arc::new(TerminalProgress::new()),
            Arc::new(LogReporter),
            shutdown,
        );
        let report = orchestrator.upload(&profile).await;

        watcher.abort();
        report
    });

    debug!("Upload session ended in {:?}", report.state);
    if report.is_success() {
        info!("Avatar published to bucket {}", profile.bucket_name);
    }
    Ok(ExitCode::from(report.exit_code()))
}

/// Cancel `shutdown` on Ctrl-C so the transfer in flight is aborted
fn spawn_shutdown_watcher(shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling upload");
            shutdown.cancel();
        }
    })
}

/// Handle the profile subcommands
fn handle_profile(store: &ProfileStore, action: &ProfileCommand) -> Result<()> {
    match action {
        ProfileCommand::Show => {
            println!("Profile: {}", store.path().display());
            println!("{}", store.load());
        }
        ProfileCommand::Set(fields) => set_profile_fields(store, fields)?,
        ProfileCommand::Delete => store.delete()?,
        ProfileCommand::Path => println!("{}", store.path().display()),
    }
    Ok(())
}

fn set_profile_fields(store: &ProfileStore, fields: &ProfileFields) -> Result<()> {
    let overrides = fields.to_overrides();
    if overrides.is_empty() {
        warn!("No profile fields given, nothing to save");
        return Ok(());
    }

    let mut profile = store.load();
    profile.apply(&overrides);
    store.save(&profile)
}

fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to get current working directory")?;
    Ok(cwd.join(dir))
}
