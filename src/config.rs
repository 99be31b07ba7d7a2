//! Editor configuration
//!
//! Values are read from `config.toml` in the user's config directory:
//! - Linux: ~/.config/shorts-editor/config.toml
//! - macOS: ~/Library/Application Support/shorts-editor/config.toml
//! - Windows: %APPDATA%\shorts-editor\config.toml
//!
//! Any key missing from the file keeps its default, so a partial file is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Shortest clip the trim handles allow, in seconds
pub const MIN_CLIP_LENGTH: f64 = 0.5;

/// Default number of snapshots kept for undo
pub const DEFAULT_HISTORY_DEPTH: usize = 200;

/// Slot name the draft is stored under
pub const DEFAULT_DRAFT_SLOT: &str = "vibeShortsDraft";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Minimum gap between trim start and end, in seconds
    pub min_clip_length: f64,

    /// Maximum snapshots kept in the undo history (oldest dropped first)
    pub history_depth: usize,

    /// Interval between simulated upload progress ticks, in milliseconds
    pub upload_tick_ms: u64,

    /// Key of the single draft slot
    pub draft_slot: String,

    /// Override for the draft database location
    pub database_path: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_clip_length: MIN_CLIP_LENGTH,
            history_depth: DEFAULT_HISTORY_DEPTH,
            upload_tick_ms: 200,
            draft_slot: DEFAULT_DRAFT_SLOT.to_string(),
            database_path: None,
        }
    }
}

impl EditorConfig {
    /// Load from the default location, falling back to defaults when the
    /// file is absent or unreadable.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from an explicit path, falling back to defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read config, using defaults");
                return Self::default();
            }
        };

        match Self::from_toml(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::default()
            }
        }
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(contents)?;
        config.sanitize();
        Ok(config)
    }

    /// Path of the config file, if a config directory exists on this platform
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("shorts-editor");
        path.push("config.toml");
        Some(path)
    }

    /// Upload tick as a `Duration`
    pub fn upload_tick(&self) -> Duration {
        Duration::from_millis(self.upload_tick_ms)
    }

    fn sanitize(&mut self) {
        if !self.min_clip_length.is_finite() || self.min_clip_length < 0.0 {
            self.min_clip_length = MIN_CLIP_LENGTH;
        }
        // History must at least hold the current state
        self.history_depth = self.history_depth.max(1);
        self.upload_tick_ms = self.upload_tick_ms.max(1);
    }
}
