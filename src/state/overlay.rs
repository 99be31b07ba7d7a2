//! Timed, positioned overlays composited onto the clip
//!
//! Text and image overlays live in separate lists inside `EditState`.
//! Anything that has to treat them uniformly goes through `OverlayRef`
//! (read side) or `OverlayPatch` (write side), both matched exhaustively.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Font size range offered by the text panel, in pixels
pub const FONT_SIZE_RANGE: (f64, f64) = (12.0, 72.0);

/// Scale range for a single overlay
pub const OVERLAY_SCALE_RANGE: (f64, f64) = (0.5, 3.0);

/// Font size a new caption starts with
pub const DEFAULT_FONT_SIZE: f64 = 28.0;

/// Which list an overlay belongs to
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Text,
    Image,
}

impl OverlayKind {
    fn prefix(self) -> &'static str {
        match self {
            OverlayKind::Text => "text",
            OverlayKind::Image => "img",
        }
    }
}

/// Overlay identifier, `text-<n>` or `img-<n>`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct OverlayId(String);

impl OverlayId {
    pub fn new(kind: OverlayKind, seq: u64) -> Self {
        Self(format!("{}-{}", kind.prefix(), seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Kind encoded in the prefix, if the id is well formed
    pub fn kind(&self) -> Option<OverlayKind> {
        let (prefix, _) = self.0.split_once('-')?;
        match prefix {
            "text" => Some(OverlayKind::Text),
            "img" => Some(OverlayKind::Image),
            _ => None,
        }
    }

    /// Numeric suffix, used to keep freshly minted ids unique
    pub fn sequence(&self) -> Option<u64> {
        self.0.split_once('-')?.1.parse().ok()
    }
}

impl From<&str> for OverlayId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position in percent of the video frame, each axis 0-100
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const CENTER: Position = Position { x: 50.0, y: 50.0 };

    pub fn clamped(x: f64, y: f64) -> Self {
        Self {
            x: clamp_or(x, 0.0, 100.0, 50.0),
            y: clamp_or(y, 0.0, 100.0, 50.0),
        }
    }

    /// Offset by a delta in percent, staying inside the frame
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::clamped(self.x + dx, self.y + dy)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::CENTER
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundStyle {
    #[default]
    None,
    Rectangle,
    Pill,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextOverlay {
    pub id: OverlayId,
    pub position: Position,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "one")]
    pub scale: f64,
    pub text: String,
    pub color: String,
    pub font_size: f64,
    pub font_family: String,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default)]
    pub background_style: BackgroundStyle,
    #[serde(default = "black")]
    pub background_color: String,
    #[serde(default = "half")]
    pub background_opacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image_url: Option<String>,
}

impl TextOverlay {
    /// New caption with the panel's default styling, centered, visible
    /// across the given window
    pub fn new(id: OverlayId, start_time: f64, end_time: f64) -> Self {
        Self {
            id,
            position: Position::CENTER,
            start_time,
            end_time,
            rotation: 0.0,
            scale: 1.0,
            text: "Double Tap to Edit".to_string(),
            color: "#FFFFFF".to_string(),
            font_size: DEFAULT_FONT_SIZE,
            font_family: "Nunito".to_string(),
            text_align: TextAlign::Center,
            background_style: BackgroundStyle::None,
            background_color: black(),
            background_opacity: half(),
            background_image_url: None,
        }
    }

    /// Pull every numeric field back into range, e.g. after loading a draft
    pub fn sanitize(&mut self, duration: f64) {
        sanitize_common(
            &mut self.position,
            &mut self.start_time,
            &mut self.end_time,
            &mut self.rotation,
            &mut self.scale,
            duration,
        );
        self.font_size = clamp_or(
            self.font_size,
            FONT_SIZE_RANGE.0,
            FONT_SIZE_RANGE.1,
            DEFAULT_FONT_SIZE,
        );
        self.background_opacity = clamp_or(self.background_opacity, 0.0, 1.0, half());
    }

    pub fn apply(&mut self, patch: TextPatch, duration: f64) {
        let TextPatch {
            common,
            text,
            color,
            font_size,
            font_family,
            text_align,
            background_style,
            background_color,
            background_opacity,
            background_image_url,
        } = patch;

        common.apply_to(
            &mut self.position,
            &mut self.start_time,
            &mut self.end_time,
            &mut self.rotation,
            &mut self.scale,
            duration,
        );
        if let Some(text) = text {
            self.text = text;
        }
        if let Some(color) = color {
            self.color = color;
        }
        if let Some(size) = font_size {
            self.font_size = clamp_or(size, FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1, self.font_size);
        }
        if let Some(family) = font_family {
            self.font_family = family;
        }
        if let Some(align) = text_align {
            self.text_align = align;
        }
        if let Some(style) = background_style {
            self.background_style = style;
        }
        if let Some(color) = background_color {
            self.background_color = color;
        }
        if let Some(opacity) = background_opacity {
            self.background_opacity = clamp_or(opacity, 0.0, 1.0, self.background_opacity);
        }
        if let Some(url) = background_image_url {
            self.background_image_url = url;
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageOverlay {
    pub id: OverlayId,
    pub position: Position,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "one")]
    pub scale: f64,
    /// Opaque reference to the sticker resource
    pub src: String,
    #[serde(default = "one")]
    pub opacity: f64,
}

impl ImageOverlay {
    pub fn new(id: OverlayId, src: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            id,
            position: Position::CENTER,
            start_time,
            end_time,
            rotation: 0.0,
            scale: 1.0,
            src: src.into(),
            opacity: 1.0,
        }
    }

    pub fn sanitize(&mut self, duration: f64) {
        sanitize_common(
            &mut self.position,
            &mut self.start_time,
            &mut self.end_time,
            &mut self.rotation,
            &mut self.scale,
            duration,
        );
        self.opacity = clamp_or(self.opacity, 0.0, 1.0, one());
    }

    pub fn apply(&mut self, patch: ImagePatch, duration: f64) {
        patch.common.apply_to(
            &mut self.position,
            &mut self.start_time,
            &mut self.end_time,
            &mut self.rotation,
            &mut self.scale,
            duration,
        );
        if let Some(opacity) = patch.opacity {
            self.opacity = clamp_or(opacity, 0.0, 1.0, self.opacity);
        }
    }
}

/// Fields every overlay has in common
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommonPatch {
    pub position: Option<Position>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub rotation: Option<f64>,
    pub scale: Option<f64>,
}

impl CommonPatch {
    fn apply_to(
        self,
        position: &mut Position,
        start_time: &mut f64,
        end_time: &mut f64,
        rotation: &mut f64,
        scale: &mut f64,
        duration: f64,
    ) {
        if let Some(p) = self.position {
            *position = Position::clamped(p.x, p.y);
        }
        let start = self.start_time.unwrap_or(*start_time);
        let end = self.end_time.unwrap_or(*end_time);
        let (start, end) = clamp_window(start, end, duration);
        *start_time = start;
        *end_time = end;
        if let Some(r) = self.rotation {
            if r.is_finite() {
                *rotation = r.rem_euclid(360.0);
            }
        }
        if let Some(s) = self.scale {
            *scale = clamp_or(s, OVERLAY_SCALE_RANGE.0, OVERLAY_SCALE_RANGE.1, *scale);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPatch {
    pub common: CommonPatch,
    pub text: Option<String>,
    pub color: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub text_align: Option<TextAlign>,
    pub background_style: Option<BackgroundStyle>,
    pub background_color: Option<String>,
    pub background_opacity: Option<f64>,
    /// `Some(None)` removes a generated background
    pub background_image_url: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImagePatch {
    pub common: CommonPatch,
    pub opacity: Option<f64>,
}

/// Partial update for one overlay
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayPatch {
    Text(TextPatch),
    Image(ImagePatch),
}

impl OverlayPatch {
    pub fn kind(&self) -> OverlayKind {
        match self {
            OverlayPatch::Text(_) => OverlayKind::Text,
            OverlayPatch::Image(_) => OverlayKind::Image,
        }
    }

    /// Patch that only moves the overlay; valid for either kind
    pub fn position(kind: OverlayKind, position: Position) -> Self {
        let common = CommonPatch {
            position: Some(position),
            ..CommonPatch::default()
        };
        match kind {
            OverlayKind::Text => OverlayPatch::Text(TextPatch {
                common,
                ..TextPatch::default()
            }),
            OverlayKind::Image => OverlayPatch::Image(ImagePatch {
                common,
                ..ImagePatch::default()
            }),
        }
    }
}

/// Borrowed view over either overlay kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayRef<'a> {
    Text(&'a TextOverlay),
    Image(&'a ImageOverlay),
}

impl<'a> OverlayRef<'a> {
    pub fn id(&self) -> &'a OverlayId {
        match self {
            OverlayRef::Text(o) => &o.id,
            OverlayRef::Image(o) => &o.id,
        }
    }

    pub fn kind(&self) -> OverlayKind {
        match self {
            OverlayRef::Text(_) => OverlayKind::Text,
            OverlayRef::Image(_) => OverlayKind::Image,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            OverlayRef::Text(o) => o.position,
            OverlayRef::Image(o) => o.position,
        }
    }

    pub fn window(&self) -> (f64, f64) {
        match self {
            OverlayRef::Text(o) => (o.start_time, o.end_time),
            OverlayRef::Image(o) => (o.start_time, o.end_time),
        }
    }

    /// Both ends inclusive
    pub fn is_visible_at(&self, time: f64) -> bool {
        let (start, end) = self.window();
        start <= time && time <= end
    }
}

/// Geometry shared by both overlay kinds; NaN falls back to the new-overlay value
fn sanitize_common(
    position: &mut Position,
    start_time: &mut f64,
    end_time: &mut f64,
    rotation: &mut f64,
    scale: &mut f64,
    duration: f64,
) {
    *position = Position::clamped(position.x, position.y);
    (*start_time, *end_time) = clamp_window(*start_time, *end_time, duration);
    *rotation = if rotation.is_finite() {
        rotation.rem_euclid(360.0)
    } else {
        0.0
    };
    *scale = clamp_or(*scale, OVERLAY_SCALE_RANGE.0, OVERLAY_SCALE_RANGE.1, one());
}

/// Clamp `value` into `[min, max]`; NaN keeps `fallback`
pub(crate) fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// Keep an overlay window inside the source and ordered
pub(crate) fn clamp_window(start: f64, end: f64, duration: f64) -> (f64, f64) {
    let start = clamp_or(start, 0.0, duration, 0.0);
    let end = clamp_or(end, 0.0, duration, duration);
    if end < start {
        (start, start)
    } else {
        (start, end)
    }
}

fn one() -> f64 {
    1.0
}

fn half() -> f64 {
    0.5
}

fn black() -> String {
    "#000000".to_string()
}
