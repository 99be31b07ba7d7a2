//! Persisted, resumable draft of an editing session
//!
//! There is a single draft slot. Saving overwrites it, posting or an
//! explicit discard clears it. Every field has a default so drafts written
//! by older versions (or with fields missing) still load.

use serde::{Deserialize, Serialize};

use super::edit::{EditState, Rotation, DEFAULT_MUSIC_VOLUME};
use super::overlay::{ImageOverlay, TextOverlay};
use crate::error::DraftError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
    pub caption: String,
    pub text_overlays: Vec<TextOverlay>,
    pub image_overlays: Vec<ImageOverlay>,
    /// Missing means "from the beginning"
    pub start_time: Option<f64>,
    /// Missing means "to the end of whatever media is loaded"
    pub end_time: Option<f64>,
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub rotation: Rotation,
    pub scale: f64,
    pub original_volume: f64,
    pub music_volume: f64,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            caption: String::new(),
            text_overlays: Vec::new(),
            image_overlays: Vec::new(),
            start_time: None,
            end_time: None,
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            rotation: Rotation::Deg0,
            scale: 1.0,
            original_volume: 1.0,
            music_volume: DEFAULT_MUSIC_VOLUME,
        }
    }
}

impl Draft {
    pub fn from_state(state: &EditState, caption: &str) -> Self {
        Self {
            caption: caption.to_string(),
            text_overlays: state.text_overlays.clone(),
            image_overlays: state.image_overlays.clone(),
            start_time: Some(state.start_time),
            end_time: Some(state.end_time),
            brightness: state.brightness,
            contrast: state.contrast,
            saturation: state.saturation,
            rotation: state.rotation,
            scale: state.scale,
            original_volume: state.original_volume,
            music_volume: state.music_volume,
        }
    }

    /// Edit state seeded from this draft for a source of the given length.
    /// The result is not yet range-checked; see `EditState::sanitize`.
    pub fn to_state(&self, source_duration: f64) -> EditState {
        EditState {
            text_overlays: self.text_overlays.clone(),
            image_overlays: self.image_overlays.clone(),
            start_time: self.start_time.unwrap_or(0.0),
            end_time: self.end_time.unwrap_or(source_duration),
            brightness: self.brightness,
            contrast: self.contrast,
            saturation: self.saturation,
            rotation: self.rotation,
            scale: self.scale,
            original_volume: self.original_volume,
            music_volume: self.music_volume,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The external single-slot key/value store drafts live in
pub trait DraftStore {
    /// Stored draft, or `None` when the slot is empty
    fn load(&self) -> Result<Option<Draft>, DraftError>;

    /// Overwrite the slot
    fn save(&mut self, draft: &Draft) -> Result<(), DraftError>;

    /// Empty the slot. Clearing an empty slot is fine.
    fn clear(&mut self) -> Result<(), DraftError>;

    fn exists(&self) -> Result<bool, DraftError> {
        Ok(self.load()?.is_some())
    }
}

/// Draft slot held in memory, storing the same JSON the database would
#[derive(Debug, Default, Clone)]
pub struct MemoryDraftStore {
    slot: Option<String>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-filled with raw JSON, e.g. a draft from an older schema
    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            slot: Some(json.into()),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.slot.as_deref()
    }
}

impl DraftStore for MemoryDraftStore {
    fn load(&self) -> Result<Option<Draft>, DraftError> {
        match &self.slot {
            Some(json) => Ok(Some(Draft::from_json(json)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, draft: &Draft) -> Result<(), DraftError> {
        self.slot = Some(draft.to_json()?);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DraftError> {
        self.slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::edit::Adjustment;
    use crate::state::overlay::{OverlayId, OverlayKind};

    #[test]
    fn test_state_survives_save_and_load() {
        let mut state = EditState::for_duration(15.0);
        state.start_time = 1.5;
        state.apply_adjustment(Adjustment::Saturation(1.7));
        state.apply_adjustment(Adjustment::Rotation(180));
        state
            .text_overlays
            .push(TextOverlay::new(OverlayId::new(OverlayKind::Text, 1), 1.5, 15.0));

        let mut store = MemoryDraftStore::new();
        store.save(&Draft::from_state(&state, "hello #vibes")).unwrap();

        let draft = store.load().unwrap().unwrap();
        assert_eq!(draft.caption, "hello #vibes");
        assert_eq!(draft.to_state(99.0), state);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let store = MemoryDraftStore::with_json(r#"{"caption":"old","brightness":1.3}"#);
        let draft = store.load().unwrap().unwrap();

        assert_eq!(draft.caption, "old");
        assert_eq!(draft.brightness, 1.3);
        assert_eq!(draft.contrast, 1.0);
        assert_eq!(draft.music_volume, DEFAULT_MUSIC_VOLUME);
        assert!(draft.text_overlays.is_empty());

        let state = draft.to_state(20.0);
        assert_eq!((state.start_time, state.end_time), (0.0, 20.0));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let store = MemoryDraftStore::with_json(r#"{"caption":"x","filterClass":"sepia"}"#);
        assert_eq!(store.load().unwrap().unwrap().caption, "x");
    }

    #[test]
    fn test_empty_slot() {
        let mut store = MemoryDraftStore::new();
        assert!(store.load().unwrap().is_none());
        assert!(!store.exists().unwrap());

        store.save(&Draft::default()).unwrap();
        assert!(store.exists().unwrap());
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(!store.exists().unwrap());
    }

    #[test]
    fn test_corrupt_slot_is_an_error() {
        let store = MemoryDraftStore::with_json("{not json");
        assert!(matches!(store.load(), Err(DraftError::Json(_))));
    }
}
