//! Simulated upload.
//!
//! Nothing is transferred: progress advances on a local timer by a random
//! 2-7 % per tick and is reported as discrete events. The task stops as
//! soon as the cancellation token fires or the receiver goes away.

use rand::Rng;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::EditorConfig;
use crate::error::Result;
use crate::feed::Feed;
use crate::state::data::PostRecord;
use crate::state::draft::DraftStore;
use crate::wizard::Wizard;

/// Per-tick progress range, in percent
const STEP_RANGE: std::ops::Range<f64> = 2.0..7.0;

/// What the progress indicator shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Preparing,
    Compressing,
    Uploading,
    Finalizing,
    Done,
}

impl UploadStage {
    /// Stage shown at a given percentage
    pub fn for_percent(percent: f64) -> Self {
        if percent >= 100.0 {
            UploadStage::Done
        } else if percent > 90.0 {
            UploadStage::Finalizing
        } else if percent > 60.0 {
            UploadStage::Uploading
        } else if percent > 30.0 {
            UploadStage::Compressing
        } else {
            UploadStage::Preparing
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UploadStage::Preparing => "Preparing your Vibe...",
            UploadStage::Compressing => "Compressing video...",
            UploadStage::Uploading => "Uploading to cloud...",
            UploadStage::Finalizing => "Finalizing...",
            UploadStage::Done => "All set!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UploadEvent {
    Progress { percent: f64, stage: UploadStage },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Completed,
    Cancelled,
}

/// Run the simulated upload until it reaches 100 % or is cancelled.
pub async fn run(
    config: &EditorConfig,
    cancel: CancellationToken,
    progress: mpsc::Sender<UploadEvent>,
) -> UploadOutcome {
    let mut percent = 0.0_f64;
    let mut interval = tokio::time::interval(config.upload_tick());
    // The first tick of an interval fires immediately
    interval.tick().await;

    tracing::debug!(tick_ms = config.upload_tick_ms, "upload task started");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(percent, "upload task cancelled");
                return UploadOutcome::Cancelled;
            }
            _ = interval.tick() => {
                percent = (percent + rand::rng().random_range(STEP_RANGE)).min(100.0);
                let event = UploadEvent::Progress {
                    percent,
                    stage: UploadStage::for_percent(percent),
                };
                if progress.send(event).await.is_err() {
                    tracing::warn!("progress receiver dropped, stopping upload");
                    return UploadOutcome::Cancelled;
                }
                if percent >= 100.0 {
                    tracing::info!("upload task finished");
                    return UploadOutcome::Completed;
                }
            }
        }
    }
}

/// Drive a wizard that is in review through the upload. On completion the
/// draft is cleared and the post handed to the feed; on cancellation the
/// wizard returns to review and `None` is returned.
pub async fn post(
    wizard: &mut Wizard,
    config: &EditorConfig,
    store: &mut dyn DraftStore,
    feed: &mut dyn Feed,
    cancel: CancellationToken,
    progress: mpsc::Sender<UploadEvent>,
) -> Result<Option<PostRecord>> {
    wizard.begin_upload()?;

    match run(config, cancel, progress).await {
        UploadOutcome::Completed => Ok(Some(wizard.complete_upload(store, feed)?)),
        UploadOutcome::Cancelled => {
            wizard.cancel_upload()?;
            Ok(None)
        }
    }
}
