//! The editing session: single source of truth for an in-progress edit
//!
//! A session only exists once the source duration is known, so nothing can
//! mutate edit state before initialization. Every mutation either records
//! a history snapshot itself (discrete actions: add, delete, rotate) or
//! leaves recording to the end of the gesture that drove it (trim drag,
//! overlay drag, slider, text editing).

use super::data::Sound;
use super::draft::{Draft, DraftStore};
use super::edit::{Adjustment, EditState, TrimEdge};
use super::history::History;
use super::overlay::{
    ImageOverlay, OverlayId, OverlayKind, OverlayPatch, OverlayRef, Position, TextOverlay,
};
use crate::config::EditorConfig;
use crate::error::{DraftError, EditorError, Result};

/// At most one pointer gesture is tracked at a time
#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Trim(TrimEdge),
    Drag { id: OverlayId, origin: Position },
}

#[derive(Debug, Clone)]
pub struct EditingSession {
    config: EditorConfig,
    source_duration: f64,
    state: EditState,
    history: History,
    caption: String,
    sound: Option<Sound>,
    selection: Option<OverlayId>,
    gesture: Option<Gesture>,
    next_seq: u64,
}

impl EditingSession {
    /// Start a session for media of `source_duration` seconds, either fresh
    /// or seeded from a resumed draft. The history starts with exactly one
    /// entry.
    pub fn initialize(source_duration: f64, seed: Option<Draft>, config: EditorConfig) -> Result<Self> {
        if !source_duration.is_finite() || source_duration <= 0.0 {
            return Err(EditorError::DurationUnknown(source_duration));
        }

        let (state, caption) = match seed {
            Some(draft) => {
                let mut state = draft.to_state(source_duration);
                state.sanitize(source_duration, config.min_clip_length);
                tracing::info!(
                    text_overlays = state.text_overlays.len(),
                    image_overlays = state.image_overlays.len(),
                    "session resumed from draft"
                );
                (state, draft.caption)
            }
            None => (EditState::for_duration(source_duration), String::new()),
        };

        let next_seq = state
            .overlays()
            .filter_map(|o| o.id().sequence())
            .max()
            .map_or(1, |seq| seq.saturating_add(1));

        tracing::debug!(source_duration, "editing session initialized");

        Ok(Self {
            history: History::new(state.clone(), config.history_depth),
            config,
            source_duration,
            state,
            caption,
            sound: None,
            selection: None,
            gesture: None,
            next_seq,
        })
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn source_duration(&self) -> f64 {
        self.source_duration
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Caption is not part of the undo history
    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = caption.into();
    }

    pub fn selected_sound(&self) -> Option<&Sound> {
        self.sound.as_ref()
    }

    pub fn select_sound(&mut self, sound: Option<Sound>) {
        self.sound = sound;
    }

    pub fn selected(&self) -> Option<&OverlayId> {
        self.selection.as_ref()
    }

    /// Select an overlay; unknown ids are refused
    pub fn select(&mut self, id: &OverlayId) -> bool {
        if self.overlay(id).is_none() {
            return false;
        }
        self.selection = Some(id.clone());
        true
    }

    pub fn deselect(&mut self) {
        self.selection = None;
    }

    /// Handle being dragged, if a trim gesture is active
    pub fn trimming(&self) -> Option<TrimEdge> {
        match self.gesture {
            Some(Gesture::Trim(edge)) => Some(edge),
            _ => None,
        }
    }

    /// Overlay being dragged, if any
    pub fn dragging(&self) -> Option<&OverlayId> {
        match &self.gesture {
            Some(Gesture::Drag { id, .. }) => Some(id),
            _ => None,
        }
    }

    pub fn overlay(&self, id: &OverlayId) -> Option<OverlayRef<'_>> {
        self.state.overlays().find(|o| o.id() == id)
    }

    // ---------------------------------------------------------------------
    // Trim
    // ---------------------------------------------------------------------

    /// Move a trim handle (live, no history). Returns whether it moved.
    pub fn set_trim(&mut self, edge: TrimEdge, time: f64) -> bool {
        self.state
            .set_trim(edge, time, self.source_duration, self.config.min_clip_length)
    }

    /// Grab a trim handle. Refused while another gesture is active.
    pub fn begin_trim(&mut self, edge: TrimEdge) -> bool {
        if self.gesture.is_some() {
            return false;
        }
        self.gesture = Some(Gesture::Trim(edge));
        true
    }

    /// Release the trim handle, recording the result once. Returns whether
    /// a trim gesture was active; an unchanged trim records nothing.
    pub fn end_trim(&mut self) -> bool {
        if !matches!(self.gesture, Some(Gesture::Trim(_))) {
            return false;
        }
        self.gesture = None;
        self.commit();
        true
    }

    /// Where playback should continue from: wraps back to the trim start
    /// once the end is reached
    pub fn playback_position(&self, time: f64) -> f64 {
        if time >= self.state.end_time || time < self.state.start_time || time.is_nan() {
            self.state.start_time
        } else {
            time
        }
    }

    // ---------------------------------------------------------------------
    // Adjustments
    // ---------------------------------------------------------------------

    /// Apply an adjustment live. Rotation is a discrete action and is
    /// recorded immediately; slider values are recorded by `commit`.
    pub fn set_adjustment(&mut self, adjustment: Adjustment) {
        self.state.apply_adjustment(adjustment);
        if adjustment.is_discrete() {
            self.commit();
        }
    }

    /// One press of the rotate button
    pub fn rotate_clockwise(&mut self) {
        self.set_adjustment(Adjustment::Rotation(90));
    }

    /// "Reset All" in the adjust panel, recorded as one step
    pub fn reset_adjustments(&mut self) {
        self.state.reset_adjustments();
        self.commit();
    }

    // ---------------------------------------------------------------------
    // Overlays
    // ---------------------------------------------------------------------

    /// Next free id. Sequences come from the counter; once it is exhausted
    /// (a draft carried a huge id) the first unused number is taken instead.
    fn mint_id(&mut self, kind: OverlayKind) -> OverlayId {
        if self.next_seq < u64::MAX {
            let id = OverlayId::new(kind, self.next_seq);
            self.next_seq += 1;
            return id;
        }

        let mut seq = 1;
        loop {
            let id = OverlayId::new(kind, seq);
            if self.overlay(&id).is_none() {
                return id;
            }
            seq += 1;
        }
    }

    /// Add a caption with default styling over the current trim range
    pub fn add_text_overlay(&mut self) -> OverlayId {
        let id = self.mint_id(OverlayKind::Text);
        self.state.text_overlays.push(TextOverlay::new(
            id.clone(),
            self.state.start_time,
            self.state.end_time,
        ));
        self.selection = Some(id.clone());
        self.commit();
        id
    }

    /// Add a sticker over the current trim range
    pub fn add_image_overlay(&mut self, src: impl Into<String>) -> OverlayId {
        let id = self.mint_id(OverlayKind::Image);
        self.state.image_overlays.push(ImageOverlay::new(
            id.clone(),
            src,
            self.state.start_time,
            self.state.end_time,
        ));
        self.selection = Some(id.clone());
        self.commit();
        id
    }

    /// Merge a patch into the overlay with this id (live, no history).
    /// Returns false if no overlay of the patch's kind has that id.
    pub fn update_overlay(&mut self, id: &OverlayId, patch: OverlayPatch) -> bool {
        let duration = self.source_duration;
        match patch {
            OverlayPatch::Text(patch) => {
                match self.state.text_overlays.iter_mut().find(|o| o.id == *id) {
                    Some(overlay) => {
                        overlay.apply(patch, duration);
                        true
                    }
                    None => false,
                }
            }
            OverlayPatch::Image(patch) => {
                match self.state.image_overlays.iter_mut().find(|o| o.id == *id) {
                    Some(overlay) => {
                        overlay.apply(patch, duration);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Remove an overlay, clear the selection and record
    pub fn delete_overlay(&mut self, id: &OverlayId) -> bool {
        let text_before = self.state.text_overlays.len();
        let image_before = self.state.image_overlays.len();
        self.state.text_overlays.retain(|o| o.id != *id);
        self.state.image_overlays.retain(|o| o.id != *id);

        let removed = self.state.text_overlays.len() != text_before
            || self.state.image_overlays.len() != image_before;
        if !removed {
            return false;
        }

        self.selection = None;
        if self.dragging() == Some(id) {
            self.gesture = None;
        }
        tracing::debug!(%id, "overlay deleted");
        self.commit();
        true
    }

    /// Pick up an overlay for dragging. Refused while another gesture is
    /// active or if the id is unknown.
    pub fn begin_drag(&mut self, id: &OverlayId) -> bool {
        if self.gesture.is_some() {
            return false;
        }
        let Some(origin) = self.overlay(id).map(|o| o.position()) else {
            return false;
        };
        self.selection = Some(id.clone());
        self.gesture = Some(Gesture::Drag {
            id: id.clone(),
            origin,
        });
        true
    }

    /// Move an overlay by a delta in percent of the frame. During a drag of
    /// this overlay the delta is measured from where the drag began;
    /// otherwise it nudges from the current position.
    pub fn move_overlay(&mut self, id: &OverlayId, dx: f64, dy: f64) -> bool {
        let base = match &self.gesture {
            Some(Gesture::Drag { id: dragged, origin }) if dragged == id => *origin,
            _ => match self.overlay(id) {
                Some(overlay) => overlay.position(),
                None => return false,
            },
        };
        let Some(kind) = self.overlay(id).map(|o| o.kind()) else {
            return false;
        };
        self.update_overlay(id, OverlayPatch::position(kind, base.offset(dx, dy)))
    }

    /// Drop the dragged overlay, recording once. Returns whether a drag
    /// was active; an overlay dropped where it started records nothing.
    pub fn end_drag(&mut self) -> bool {
        if !matches!(self.gesture, Some(Gesture::Drag { .. })) {
            return false;
        }
        self.gesture = None;
        self.commit();
        true
    }

    /// Overlays on screen at `time`, without allocating
    pub fn visible_overlays_at(&self, time: f64) -> impl Iterator<Item = OverlayRef<'_>> + '_ {
        self.state.visible_overlays_at(time)
    }

    /// Same as `visible_overlays_at`, reusing the caller's buffer
    pub fn visible_overlays_into<'a>(&'a self, time: f64, out: &mut Vec<OverlayRef<'a>>) {
        out.clear();
        out.extend(self.state.visible_overlays_at(time));
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    /// Record the current state ("gesture end", "done editing").
    /// Returns false when nothing changed since the last entry.
    pub fn commit(&mut self) -> bool {
        self.history.record(&self.state)
    }

    pub fn undo(&mut self) -> bool {
        let Some(state) = self.history.undo() else {
            return false;
        };
        self.state = state.clone();
        self.after_restore();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(state) = self.history.redo() else {
            return false;
        };
        self.state = state.clone();
        self.after_restore();
        true
    }

    fn after_restore(&mut self) {
        self.gesture = None;
        let stale = self
            .selection
            .as_ref()
            .is_some_and(|id| self.overlay(id).is_none());
        if stale {
            self.selection = None;
        }
    }

    // ---------------------------------------------------------------------
    // Drafts
    // ---------------------------------------------------------------------

    /// Snapshot of the live state plus caption
    pub fn to_draft(&self) -> Draft {
        Draft::from_state(&self.state, &self.caption)
    }

    pub fn save_draft(&self, store: &mut dyn DraftStore) -> Result<(), DraftError> {
        store.save(&self.to_draft())
    }

    /// Read the stored draft to seed a new session; `None` if the slot is empty
    pub fn load_draft(store: &dyn DraftStore) -> Result<Option<Draft>, DraftError> {
        store.load()
    }

    pub fn clear_draft(store: &mut dyn DraftStore) -> Result<(), DraftError> {
        store.clear()
    }
}
