//! Editing-session core for a short-form video creator.
//!
//! A clip is picked or recorded ([`capture`]), edited inside an
//! [`EditingSession`] with undo/redo and a persisted draft, reviewed, and
//! posted through a simulated [`upload`] to a [`feed::Feed`]. The
//! [`Wizard`] sequences those steps.

pub mod capture;
pub mod config;
pub mod error;
pub mod feed;
pub mod state;
pub mod upload;
pub mod wizard;

pub use config::EditorConfig;
pub use error::{CaptureError, DraftError, EditorError, Result};
pub use state::session::EditingSession;
pub use wizard::{Step, Wizard};
