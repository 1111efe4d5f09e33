use std::sync::{Arc, Mutex};

use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::cloud::client::ProgressCallback;

/// Resolution of the terminal bar; fractions are scaled to this many steps
const PROGRESS_BAR_STEPS: u64 = 1000;

/// What the progress surface wants the transfer to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSignal {
    Continue,
    Cancel,
}

/// Whatever renders transfer progress and offers a way to cancel it.
///
/// `report` can be called from the task that drives the request body,
/// concurrently with the session task, so implementations synchronize
/// their own state.
pub trait ProgressSink: Send + Sync {
    /// Show the surface for a new transfer
    fn begin(&self, title: &str, info: &str);

    /// Update the completion fraction; returning [`ProgressSignal::Cancel`]
    /// aborts the transfer in flight.
    fn report(&self, fraction: f64) -> ProgressSignal;

    /// Remove the surface
    fn clear(&self);
}

/// Holds the progress surface for the duration of one transfer.
///
/// Created with [`ProgressScope::begin`]; dropping it clears the sink, so
/// the surface goes away on success, failure and cancellation alike.
pub struct ProgressScope {
    sink: Arc<dyn ProgressSink>,
}

impl ProgressScope {
    pub fn begin(sink: Arc<dyn ProgressSink>, title: &str, info: &str) -> Self {
        sink.begin(title, info);
        Self { sink }
    }

    /// Progress callback for the storage client.
    ///
    /// Forwards each fraction to the sink and cancels `token` when the sink
    /// answers with [`ProgressSignal::Cancel`].
    pub fn callback(&self, token: CancellationToken) -> ProgressCallback {
        let sink = Arc::clone(&self.sink);
        Arc::new(move |fraction| {
            let signal = sink.report(fraction.clamp(0.0, 1.0));
            if signal == ProgressSignal::Cancel && !token.is_cancelled() {
                debug!("Cancellation requested from the progress surface");
                token.cancel();
            }
        })
    }
}

impl Drop for ProgressScope {
    fn drop(&mut self) {
        self.sink.clear();
    }
}

/// Terminal progress bar drawn with indicatif.
///
/// The bar never asks for cancellation itself. On a terminal the cancel
/// affordance is Ctrl-C, which cancels the session's shutdown token.
#[derive(Default)]
pub struct TerminalProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for TerminalProgress {
    fn begin(&self, title: &str, info: &str) {
        let bar = ProgressBar::new(PROGRESS_BAR_STEPS);
        match ProgressStyle::default_bar()
            .template("{prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}%\n{msg}")
        {
            Ok(style) => bar.set_style(style.progress_chars("#>-")),
            Err(e) => debug!("Falling back to the default progress style: {}", e),
        }
        bar.set_prefix(title.to_string());
        bar.set_message(info.to_string());

        if let Ok(mut slot) = self.bar.lock() {
            if let Some(previous) = slot.replace(bar) {
                previous.finish_and_clear();
            }
        }
    }

    fn report(&self, fraction: f64) -> ProgressSignal {
        if let Ok(slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.set_position((fraction * PROGRESS_BAR_STEPS as f64) as u64);
            }
        }
        ProgressSignal::Continue
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}
