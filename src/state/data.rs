//! Shared data structures for the creator flow
//!
//! These structs flow between the editing session, the wizard and the
//! feed the finished post is handed to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use super::edit::{EditState, Rotation};
use super::overlay::{ImageOverlay, TextOverlay};
use crate::error::EditorError;

/// Output quality picked on the post screen
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    /// 480p, faster upload
    #[serde(rename = "SD")]
    Sd,
    /// 720p
    #[default]
    #[serde(rename = "HD")]
    Hd,
    /// 2160p
    #[serde(rename = "4K")]
    Uhd4k,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::Sd, Quality::Hd, Quality::Uhd4k];

    pub fn label(self) -> &'static str {
        match self {
            Quality::Sd => "SD (480p)",
            Quality::Hd => "HD (720p)",
            Quality::Uhd4k => "4K (2160p)",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Quality::Sd => "SD",
            Quality::Hd => "HD",
            Quality::Uhd4k => "4K",
        })
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SD" | "480P" => Ok(Quality::Sd),
            "HD" | "720P" => Ok(Quality::Hd),
            "4K" | "2160P" | "UHD" => Ok(Quality::Uhd4k),
            other => Err(format!("unknown quality '{other}', expected SD, HD or 4K")),
        }
    }
}

/// A background track from the sound picker
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Sound {
    pub id: String,
    pub title: String,
    pub artist: String,
}

impl Sound {
    /// "Title - Artist", as shown on the post
    pub fn song_title(&self) -> String {
        format!("{} - {}", self.title, self.artist)
    }
}

/// Where the clip came from
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaOrigin {
    Upload,
    Camera,
}

/// The media the session edits; `uri` is an opaque reference
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    pub uri: String,
    pub mime: String,
    pub origin: MediaOrigin,
}

impl MediaSource {
    /// A picked file. Only video files are accepted.
    pub fn from_file(uri: impl Into<String>, mime: impl Into<String>) -> Result<Self, EditorError> {
        let mime = mime.into();
        if !mime.starts_with("video/") {
            return Err(EditorError::NotVideo(mime));
        }
        Ok(Self {
            uri: uri.into(),
            mime,
            origin: MediaOrigin::Upload,
        })
    }

    /// A finished camera recording
    pub fn from_recording(uri: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime: mime.into(),
            origin: MediaOrigin::Camera,
        }
    }
}

/// Everything the feed needs to show a new post
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: String,
    pub media: MediaSource,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub text_overlays: Vec<TextOverlay>,
    pub image_overlays: Vec<ImageOverlay>,
    pub start_time: f64,
    pub end_time: f64,
    pub quality: Quality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song_title: Option<String>,
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub rotation: Rotation,
    pub scale: f64,
    pub original_volume: f64,
    pub music_volume: f64,
    pub created_at: DateTime<Utc>,
}

/// Distinguishes posts created within the same millisecond
static POST_SEQ: AtomicU64 = AtomicU64::new(1);

impl PostRecord {
    /// Assemble a post from the final edit state
    pub fn new(
        media: MediaSource,
        state: &EditState,
        caption: &str,
        hashtags: Vec<String>,
        quality: Quality,
        sound: Option<&Sound>,
    ) -> Self {
        let created_at = Utc::now();
        Self {
            id: format!(
                "v-{}-{}",
                created_at.timestamp_millis(),
                POST_SEQ.fetch_add(1, Ordering::Relaxed)
            ),
            media,
            caption: caption.to_string(),
            hashtags,
            text_overlays: state.text_overlays.clone(),
            image_overlays: state.image_overlays.clone(),
            start_time: state.start_time,
            end_time: state.end_time,
            quality,
            song_title: sound.map(Sound::song_title),
            brightness: state.brightness,
            contrast: state.contrast,
            saturation: state.saturation,
            rotation: state.rotation,
            scale: state.scale,
            original_volume: state.original_volume,
            music_volume: state.music_volume,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_ids_unique_within_a_millisecond() {
        let media = MediaSource::from_file("a.mp4", "video/mp4").unwrap();
        let state = EditState::for_duration(3.0);
        let ids: std::collections::HashSet<String> = (0..50)
            .map(|_| PostRecord::new(media.clone(), &state, "", vec![], Quality::Hd, None).id)
            .collect();
        assert_eq!(ids.len(), 50);
        assert!(ids.iter().all(|id| id.starts_with("v-")));
    }

    #[test]
    fn test_quality_parsing_and_default() {
        assert_eq!(Quality::default(), Quality::Hd);
        assert_eq!("4k".parse::<Quality>().unwrap(), Quality::Uhd4k);
        assert_eq!("sd".parse::<Quality>().unwrap(), Quality::Sd);
        assert!("8k".parse::<Quality>().is_err());
        assert_eq!(serde_json::to_string(&Quality::Uhd4k).unwrap(), "\"4K\"");
    }

    #[test]
    fn test_only_video_files_accepted() {
        assert!(MediaSource::from_file("clip.mp4", "video/mp4").is_ok());
        let err = MediaSource::from_file("cat.png", "image/png").unwrap_err();
        assert!(err.to_string().contains("image/png"));
    }

    #[test]
    fn test_post_copies_edit_state() {
        let mut state = EditState::for_duration(9.0);
        state.start_time = 1.0;
        let sound = Sound {
            id: "s1".into(),
            title: "Neon Nights".into(),
            artist: "Synthwave Kid".into(),
        };

        let post = PostRecord::new(
            MediaSource::from_recording("recording-1.webm", "video/webm"),
            &state,
            "hi",
            vec!["#hi".into()],
            Quality::Sd,
            Some(&sound),
        );

        assert!(post.id.starts_with("v-"));
        assert_eq!(post.start_time, 1.0);
        assert_eq!(post.end_time, 9.0);
        assert_eq!(post.song_title.as_deref(), Some("Neon Nights - Synthwave Kid"));
        assert_eq!(post.media.origin, MediaOrigin::Camera);
    }
}
