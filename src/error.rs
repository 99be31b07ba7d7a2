//! Error types for the editing core
//!
//! Numeric input is never an error here: out-of-range values are clamped
//! by the session. What remains are precondition violations, storage
//! failures and capture-device failures.

use thiserror::Error;

use crate::wizard::Step;

/// Errors raised by the session and the wizard
#[derive(Debug, Error)]
pub enum EditorError {
    /// Media metadata has not produced a usable duration yet
    #[error("source duration is not known yet (got {0})")]
    DurationUnknown(f64),

    /// A wizard action was requested from a step that does not allow it
    #[error("cannot {action} while {from}")]
    InvalidTransition { from: Step, action: &'static str },

    /// The picked file is not a video
    #[error("please select a valid video file (got {0})")]
    NotVideo(String),

    /// Resume was requested but the draft slot is empty
    #[error("no saved draft to resume")]
    NoDraft,

    #[error(transparent)]
    Draft(#[from] DraftError),
}

/// Errors from the persisted draft slot
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("draft database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("draft is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not prepare draft storage: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not determine user data directory")]
    NoDataDir,
}

/// Errors from camera / microphone acquisition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// Shown to the user with a retry action
    #[error("Could not access camera. Please check permissions and try again.")]
    PermissionDenied,

    #[error("Camera not supported on this device.")]
    Unsupported,

    #[error("Recording not supported on this device.")]
    RecorderUnavailable,

    /// A single request in the fallback ladder failed
    #[error("device request failed: {0}")]
    Request(String),
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
