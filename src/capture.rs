//! Camera access and recording.
//!
//! The platform's capture API sits behind [`MediaDevices`]. Acquiring a
//! stream walks a fixed fallback ladder, from the front camera with audio
//! down to any camera without audio, and only reports
//! [`CaptureError::PermissionDenied`] once every rung has failed.

use chrono::Utc;

use crate::error::CaptureError;
use crate::state::data::MediaSource;

const DEFAULT_RECORDING_MIME: &str = "video/webm";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    User,
    Environment,
}

/// One device request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraints {
    /// `None` lets the device pick any camera
    pub facing: Option<FacingMode>,
    pub audio: bool,
}

/// Requests tried in order by [`acquire_stream`]
pub const FALLBACK_LADDER: [Constraints; 3] = [
    Constraints { facing: Some(FacingMode::User), audio: true },
    Constraints { facing: None, audio: true },
    Constraints { facing: None, audio: false },
];

/// A live camera stream, described by the request that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaStream {
    pub constraints: Constraints,
    /// Container type the platform recorder emits, when it reports one
    pub recorder_mime: Option<String>,
}

impl MediaStream {
    pub fn has_audio(&self) -> bool {
        self.constraints.audio
    }
}

/// Platform camera and microphone access
pub trait MediaDevices {
    fn is_supported(&self) -> bool {
        true
    }

    fn request(&mut self, constraints: &Constraints) -> Result<MediaStream, CaptureError>;

    fn can_record(&self, _stream: &MediaStream) -> bool {
        true
    }
}

/// Open a camera stream, relaxing constraints rung by rung.
pub fn acquire_stream(devices: &mut dyn MediaDevices) -> Result<MediaStream, CaptureError> {
    if !devices.is_supported() {
        return Err(CaptureError::Unsupported);
    }

    for (rung, constraints) in FALLBACK_LADDER.iter().enumerate() {
        match devices.request(constraints) {
            Ok(stream) => {
                tracing::debug!(rung, audio = constraints.audio, "camera stream acquired");
                return Ok(stream);
            }
            Err(e) => {
                tracing::warn!(rung, error = %e, "camera request failed, relaxing constraints");
            }
        }
    }

    tracing::error!("all camera requests failed");
    Err(CaptureError::PermissionDenied)
}

/// A finished recording ready to enter the editor
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub media: MediaSource,
    pub bytes: usize,
    /// Whole seconds counted while recording
    pub elapsed_secs: u32,
}

/// Collects chunks from a stream between start and stop
#[derive(Debug)]
pub struct Recorder {
    mime: String,
    chunks: Vec<Vec<u8>>,
    elapsed_secs: u32,
}

impl Recorder {
    pub fn start(devices: &dyn MediaDevices, stream: &MediaStream) -> Result<Self, CaptureError> {
        if !devices.can_record(stream) {
            return Err(CaptureError::RecorderUnavailable);
        }
        let mime = stream
            .recorder_mime
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_RECORDING_MIME.to_string());

        tracing::info!(%mime, "recording started");
        Ok(Self { mime, chunks: Vec::new(), elapsed_secs: 0 })
    }

    /// Empty chunks are ignored
    pub fn push_chunk(&mut self, chunk: Vec<u8>) {
        if !chunk.is_empty() {
            self.chunks.push(chunk);
        }
    }

    /// Advance the one-second recording timer
    pub fn tick(&mut self) {
        self.elapsed_secs += 1;
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Stop recording. Yields nothing when no data arrived.
    pub fn stop(self) -> Option<Recording> {
        if self.chunks.is_empty() {
            tracing::warn!("recording stopped without data");
            return None;
        }
        let bytes = self.chunks.iter().map(Vec::len).sum();
        let uri = format!(
            "recording-{}.{}",
            Utc::now().timestamp_millis(),
            extension_for(&self.mime)
        );
        tracing::info!(%uri, bytes, "recording finished");

        Some(Recording {
            media: MediaSource::from_recording(uri, self.mime),
            bytes,
            elapsed_secs: self.elapsed_secs,
        })
    }
}

/// `video/webm;codecs=vp9` -> `webm`
fn extension_for(mime: &str) -> &str {
    let subtype = mime.split_once('/').map_or(mime, |(_, sub)| sub);
    subtype.split(';').next().unwrap_or(subtype).trim()
}
