//! Edit state for one clip
//!
//! This struct is the snapshot unit of the undo history: every recorded
//! entry is a complete, independent copy (overlays included). It is
//! serialized to JSON for drafts and for the published post.

use serde::{Deserialize, Serialize};

use super::overlay::{clamp_or, ImageOverlay, OverlayRef, TextOverlay};

/// Brightness and contrast slider range
pub const TONE_RANGE: (f64, f64) = (0.5, 1.5);

/// Saturation slider range
pub const SATURATION_RANGE: (f64, f64) = (0.0, 2.0);

/// Whole-frame zoom range
pub const SCALE_RANGE: (f64, f64) = (1.0, 2.0);

/// Default level of the background music track
pub const DEFAULT_MUSIC_VOLUME: f64 = 0.5;

/// Quarter-turn rotation of the whole frame
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(from = "i64", into = "i64")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> i64 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Rotate by `degrees`, snapped to the nearest quarter turn, wrapping at 360
    pub fn rotated_by(self, degrees: i64) -> Self {
        Self::from(self.degrees() + degrees.rem_euclid(360))
    }
}

impl From<i64> for Rotation {
    fn from(degrees: i64) -> Self {
        let quarters = ((degrees.rem_euclid(360) as f64) / 90.0).round() as i64;
        match quarters.rem_euclid(4) {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }
}

impl From<Rotation> for i64 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Which trim handle is being moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimEdge {
    Start,
    End,
}

/// A single adjustment from the adjust or audio panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    Brightness(f64),
    Contrast(f64),
    Saturation(f64),
    /// Rotate by this many degrees (a rotate-button press is `Rotation(90)`)
    Rotation(i64),
    Scale(f64),
    OriginalVolume(f64),
    MusicVolume(f64),
}

impl Adjustment {
    /// Discrete actions are recorded to history as soon as they happen
    pub fn is_discrete(&self) -> bool {
        matches!(self, Adjustment::Rotation(_))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditState {
    // ========== Overlays ==========
    /// Captions, rendered in order, first is bottom-most
    pub text_overlays: Vec<TextOverlay>,
    /// Stickers, drawn above the captions
    pub image_overlays: Vec<ImageOverlay>,

    // ========== Trim ==========
    /// Clip start in seconds into the source (0.0 to end_time - 0.5)
    pub start_time: f64,
    /// Clip end in seconds (start_time + 0.5 to source duration)
    pub end_time: f64,

    // ========== Adjust ==========
    /// Brightness multiplier (0.5 to 1.5, default: 1.0)
    pub brightness: f64,
    /// Contrast multiplier (0.5 to 1.5, default: 1.0)
    pub contrast: f64,
    /// Saturation multiplier (0.0 to 2.0, default: 1.0)
    pub saturation: f64,
    /// Whole-frame rotation in quarter turns (default: 0)
    pub rotation: Rotation,
    /// Zoom (1.0 to 2.0, default: 1.0)
    pub scale: f64,

    // ========== Audio ==========
    /// Level of the clip's own audio (0.0 to 1.0, default: 1.0)
    pub original_volume: f64,
    /// Level of the selected sound (0.0 to 1.0, default: 0.5)
    pub music_volume: f64,
}

impl Default for EditState {
    fn default() -> Self {
        Self {
            text_overlays: Vec::new(),
            image_overlays: Vec::new(),
            start_time: 0.0,
            end_time: 0.0,
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

impl EditState {
    /// Fresh state covering the whole source
    pub fn for_duration(source_duration: f64) -> Self {
        Self {
            end_time: source_duration,
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// True when nothing has been changed from a fresh state for this source
    pub fn is_unedited(&self, source_duration: f64) -> bool {
        *self == Self::for_duration(source_duration)
    }

    /// Back to a fresh state for this source, overlays included
    pub fn reset(&mut self, source_duration: f64) {
        *self = Self::for_duration(source_duration);
    }

    /// Length of the trimmed clip in seconds
    pub fn clip_length(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// "Reset All" in the adjust panel: tone, rotation and zoom only
    pub fn reset_adjustments(&mut self) {
        let neutral = Self::default();
        self.brightness = neutral.brightness;
        self.contrast = neutral.contrast;
        self.saturation = neutral.saturation;
        self.rotation = neutral.rotation;
        self.scale = neutral.scale;
    }

    /// Apply one adjustment, clamping into its range. NaN is ignored.
    pub fn apply_adjustment(&mut self, adjustment: Adjustment) {
        match adjustment {
            Adjustment::Brightness(v) => {
                self.brightness = clamp_or(v, TONE_RANGE.0, TONE_RANGE.1, self.brightness)
            }
            Adjustment::Contrast(v) => {
                self.contrast = clamp_or(v, TONE_RANGE.0, TONE_RANGE.1, self.contrast)
            }
            Adjustment::Saturation(v) => {
                self.saturation =
                    clamp_or(v, SATURATION_RANGE.0, SATURATION_RANGE.1, self.saturation)
            }
            Adjustment::Rotation(degrees) => self.rotation = self.rotation.rotated_by(degrees),
            Adjustment::Scale(v) => {
                self.scale = clamp_or(v, SCALE_RANGE.0, SCALE_RANGE.1, self.scale)
            }
            Adjustment::OriginalVolume(v) => {
                self.original_volume = clamp_or(v, 0.0, 1.0, self.original_volume)
            }
            Adjustment::MusicVolume(v) => {
                self.music_volume = clamp_or(v, 0.0, 1.0, self.music_volume)
            }
        }
    }

    /// Move one trim handle. The time is clamped to the source; a handle
    /// that would close the gap below `min_gap` stops at the gap instead.
    /// Returns whether the handle moved.
    pub fn set_trim(&mut self, edge: TrimEdge, time: f64, source_duration: f64, min_gap: f64) -> bool {
        if time.is_nan() {
            return false;
        }
        let time = time.clamp(0.0, source_duration);

        let (start, end) = match edge {
            TrimEdge::Start => (time.min(self.end_time - min_gap).max(0.0), self.end_time),
            TrimEdge::End => (self.start_time, time.max(self.start_time + min_gap).min(source_duration)),
        };

        // Rounding at the limit can leave the gap a hair short; refuse then
        if end - start < min_gap || (start == self.start_time && end == self.end_time) {
            return false;
        }
        self.start_time = start;
        self.end_time = end;
        true
    }

    /// Bring every field back into range for a source of the given length.
    /// Used when seeding from a draft recorded against other media.
    pub fn sanitize(&mut self, source_duration: f64, min_gap: f64) {
        let start = clamp_or(self.start_time, 0.0, source_duration, 0.0);
        let end = clamp_or(self.end_time, 0.0, source_duration, source_duration);
        if end - start >= min_gap {
            self.start_time = start;
            self.end_time = end;
        } else {
            self.start_time = 0.0;
            self.end_time = source_duration;
        }

        let neutral = Self::default();
        self.brightness = clamp_or(self.brightness, TONE_RANGE.0, TONE_RANGE.1, neutral.brightness);
        self.contrast = clamp_or(self.contrast, TONE_RANGE.0, TONE_RANGE.1, neutral.contrast);
        self.saturation = clamp_or(
            self.saturation,
            SATURATION_RANGE.0,
            SATURATION_RANGE.1,
            neutral.saturation,
        );
        self.scale = clamp_or(self.scale, SCALE_RANGE.0, SCALE_RANGE.1, neutral.scale);
        self.original_volume = clamp_or(self.original_volume, 0.0, 1.0, neutral.original_volume);
        self.music_volume = clamp_or(self.music_volume, 0.0, 1.0, neutral.music_volume);

        for overlay in &mut self.text_overlays {
            overlay.sanitize(source_duration);
        }
        for overlay in &mut self.image_overlays {
            overlay.sanitize(source_duration);
        }
    }

    /// Overlays on screen at `time`: text first, then images, each in
    /// insertion order. Both window ends are inclusive.
    pub fn visible_overlays_at(&self, time: f64) -> impl Iterator<Item = OverlayRef<'_>> + '_ {
        self.overlays().filter(move |overlay| overlay.is_visible_at(time))
    }

    /// Every overlay in render order
    pub fn overlays(&self) -> impl Iterator<Item = OverlayRef<'_>> + '_ {
        self.text_overlays
            .iter()
            .map(OverlayRef::Text)
            .chain(self.image_overlays.iter().map(OverlayRef::Image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::overlay::{OverlayId, OverlayKind};

    #[test]
    fn test_fresh_state_is_unedited() {
        let state = EditState::for_duration(10.0);
        assert!(state.is_unedited(10.0));
        assert_eq!(state.clip_length(), 10.0);
    }

    #[test]
    fn test_reset() {
        let mut state = EditState::for_duration(10.0);
        state.start_time = 3.0;
        state.contrast = 1.4;
        state
            .text_overlays
            .push(TextOverlay::new(OverlayId::new(OverlayKind::Text, 1), 3.0, 10.0));

        state.reset(10.0);
        assert!(state.is_unedited(10.0));
    }

    #[test]
    fn test_serialization() {
        let mut state = EditState::for_duration(12.0);
        state.brightness = 1.2;
        state.rotation = Rotation::Deg270;
        state
            .text_overlays
            .push(TextOverlay::new(OverlayId::new(OverlayKind::Text, 1), 0.0, 12.0));

        let json = state.to_json().unwrap();
        assert!(json.contains("\"rotation\":270"));
        assert!(json.contains("\"textOverlays\""));

        let restored = EditState::from_json(&json).unwrap();
        assert_eq!(state, restored);
        assert!(!restored.is_unedited(12.0));
    }

    #[test]
    fn test_rotation_wraps_and_snaps() {
        assert_eq!(Rotation::Deg270.rotated_by(90), Rotation::Deg0);
        assert_eq!(Rotation::Deg0.rotated_by(-90), Rotation::Deg270);
        assert_eq!(Rotation::from(100), Rotation::Deg90);
        assert_eq!(Rotation::from(450), Rotation::Deg90);
    }

    #[test]
    fn test_rotation_extreme_input() {
        let mut state = EditState::for_duration(5.0);
        state.apply_adjustment(Adjustment::Rotation(90));
        state.apply_adjustment(Adjustment::Rotation(i64::MAX));
        assert_eq!(state.rotation, Rotation::Deg90);
        state.apply_adjustment(Adjustment::Rotation(i64::MIN));
        assert_eq!(state.rotation, Rotation::Deg90);

        assert_eq!(Rotation::from(i64::MIN), Rotation::Deg0);
        assert_eq!(Rotation::from(i64::MAX), Rotation::Deg0);
    }

    #[test]
    fn test_adjustments_clamp() {
        let mut state = EditState::for_duration(5.0);
        state.apply_adjustment(Adjustment::Brightness(3.0));
        state.apply_adjustment(Adjustment::Contrast(0.1));
        state.apply_adjustment(Adjustment::Saturation(-1.0));
        state.apply_adjustment(Adjustment::Scale(0.2));
        state.apply_adjustment(Adjustment::MusicVolume(f64::NAN));
        state.apply_adjustment(Adjustment::OriginalVolume(f64::INFINITY));

        assert_eq!(state.brightness, 1.5);
        assert_eq!(state.contrast, 0.5);
        assert_eq!(state.saturation, 0.0);
        assert_eq!(state.scale, 1.0);
        assert_eq!(state.music_volume, DEFAULT_MUSIC_VOLUME);
        assert_eq!(state.original_volume, 1.0);
    }

    #[test]
    fn test_trim_keeps_minimum_gap() {
        let mut state = EditState::for_duration(10.0);
        assert!(state.set_trim(TrimEdge::Start, 3.0, 10.0, 0.5));
        assert!(state.set_trim(TrimEdge::End, 3.2, 10.0, 0.5));
        assert_eq!(state.end_time, 3.5);

        // Already at the limit: nothing moves
        assert!(!state.set_trim(TrimEdge::Start, 9.0, 10.0, 0.5));
        assert_eq!(state.start_time, 3.0);
        assert!(state.clip_length() >= 0.5);
    }

    #[test]
    fn test_trim_clamps_to_source() {
        let mut state = EditState::for_duration(10.0);
        assert!(!state.set_trim(TrimEdge::End, 25.0, 10.0, 0.5));
        assert!(!state.set_trim(TrimEdge::Start, -4.0, 10.0, 0.5));
        assert_eq!((state.start_time, state.end_time), (0.0, 10.0));
        assert!(!state.set_trim(TrimEdge::Start, f64::NAN, 10.0, 0.5));
    }

    #[test]
    fn test_reset_adjustments_leaves_trim_and_audio() {
        let mut state = EditState::for_duration(8.0);
        state.set_trim(TrimEdge::Start, 2.0, 8.0, 0.5);
        state.apply_adjustment(Adjustment::Brightness(1.4));
        state.apply_adjustment(Adjustment::Rotation(90));
        state.apply_adjustment(Adjustment::MusicVolume(0.9));

        state.reset_adjustments();

        assert_eq!(state.brightness, 1.0);
        assert_eq!(state.rotation, Rotation::Deg0);
        assert_eq!(state.start_time, 2.0);
        assert_eq!(state.music_volume, 0.9);
    }

    #[test]
    fn test_sanitize_for_shorter_source() {
        let mut state = EditState::for_duration(30.0);
        state.start_time = 4.0;
        state.end_time = 30.0;
        state.brightness = 9.0;
        let mut sticker = ImageOverlay::new(OverlayId::new(OverlayKind::Image, 1), "s", 20.0, 25.0);
        sticker.position.x = 250.0;
        sticker.opacity = 7.0;
        state.image_overlays.push(sticker);
        let mut caption = TextOverlay::new(OverlayId::new(OverlayKind::Text, 1), 0.0, 5.0);
        caption.font_size = 500.0;
        state.text_overlays.push(caption);

        state.sanitize(10.0, 0.5);

        assert_eq!((state.start_time, state.end_time), (4.0, 10.0));
        assert_eq!(state.brightness, 1.5);
        let sticker = &state.image_overlays[0];
        assert_eq!((sticker.start_time, sticker.end_time), (10.0, 10.0));
        assert_eq!(sticker.position.x, 100.0);
        assert_eq!(sticker.opacity, 1.0);
        assert_eq!(state.text_overlays[0].font_size, 72.0);
    }
}
