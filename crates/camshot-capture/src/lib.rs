#![warn(missing_docs)]
//! # camshot-capture
//!
//! ## Purpose
//! Provides camera enumeration, stream acquisition and frame reads behind a
//! backend-agnostic trait.
//!
//! ## Responsibilities
//! - Define the [`CameraBackend`] and [`MediaStream`] seams.
//! - Own a live stream through [`StreamHandle`], which stops every track when
//!   released or dropped.
//! - Expose deterministic synthetic capture for CI and unit tests.
//! - Expose real camera capture through `nokhwa` behind the `native-camera`
//!   feature.
//!
//! ## Data flow
//! Controller requests access with [`MediaConstraints`] -> backend returns a
//! stream -> [`StreamHandle`] reads [`camshot_core::Frame`] values on demand ->
//! release stops every track.
//!
//! ## Ownership and lifetimes
//! A [`StreamHandle`] is `Send` so an acquisition job can hand it back to the
//! event loop. Frames are owned values; no device memory escapes a backend.
//!
//! ## Error model
//! Denied access, missing devices, unsupported constraints and backend faults
//! are reported as [`CaptureError`] values.

use std::fmt;

use camshot_core::Frame;
use thiserror::Error;

#[cfg(feature = "native-camera")]
mod native;
mod synthetic;

#[cfg(feature = "native-camera")]
pub use native::NativeCameraBackend;
pub use synthetic::{SyntheticAccess, SyntheticCameraBackend, SyntheticProbe};

/// Metadata describing one available camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Backend index used in [`MediaConstraints::device_index`].
    pub index: u32,
    /// Human-readable device name.
    pub name: String,
    /// Backend-specific description.
    pub description: String,
}

/// Access request passed to [`CameraBackend::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    /// Whether a video track is requested.
    pub video: bool,
    /// Whether an audio track is requested.
    pub audio: bool,
    /// Camera to open.
    pub device_index: u32,
}

impl MediaConstraints {
    /// Video-only request for one camera.
    pub fn video_only(device_index: u32) -> Self {
        Self {
            video: true,
            audio: false,
            device_index,
        }
    }

    /// Checks that the request is one this crate can satisfy.
    ///
    /// # Errors
    /// Returns [`CaptureError::InvalidConstraints`] when video is not
    /// requested or audio is requested.
    pub fn validate(&self) -> Result<(), CaptureError> {
        if !self.video {
            return Err(CaptureError::InvalidConstraints(
                "a video track must be requested".to_string(),
            ));
        }
        if self.audio {
            return Err(CaptureError::InvalidConstraints(
                "audio capture is not supported".to_string(),
            ));
        }
        Ok(())
    }
}

/// Kind of media carried by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    /// Video frames.
    Video,
    /// Audio samples.
    Audio,
}

/// Lifecycle of one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    /// Track is producing media.
    Live,
    /// Track was stopped and will not produce media again.
    Ended,
}

/// Snapshot of one constituent track of a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    /// Track identifier, unique within the stream.
    pub id: String,
    /// Media kind.
    pub kind: TrackKind,
    /// Device label.
    pub label: String,
    /// Current lifecycle state.
    pub state: TrackState,
}

/// Native geometry of the live video track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoSettings {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Trait implemented by concrete camera providers.
pub trait CameraBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Enumerates available cameras.
    ///
    /// # Errors
    /// Returns [`CaptureError::Backend`] when enumeration fails.
    fn list_devices(&self) -> Result<Vec<DeviceInfo>, CaptureError>;

    /// Requests access to one camera and starts streaming.
    ///
    /// # Errors
    /// Returns [`CaptureError::PermissionDenied`],
    /// [`CaptureError::DeviceNotFound`], [`CaptureError::InvalidConstraints`]
    /// or [`CaptureError::Backend`].
    fn acquire(&self, constraints: &MediaConstraints) -> Result<Box<dyn MediaStream>, CaptureError>;
}

/// A running capture stream made of one or more tracks.
pub trait MediaStream: Send {
    /// Returns a snapshot of every constituent track.
    fn tracks(&self) -> Vec<TrackInfo>;

    /// Returns the native geometry of the video track.
    ///
    /// # Errors
    /// Returns [`CaptureError::StreamEnded`] once the video track is stopped.
    fn video_settings(&self) -> Result<VideoSettings, CaptureError>;

    /// Reads the current video frame.
    ///
    /// # Errors
    /// Returns [`CaptureError::StreamEnded`] once the video track is stopped,
    /// or [`CaptureError::Backend`] when the device fails.
    fn read_frame(&mut self, captured_at_ms: u64) -> Result<Frame, CaptureError>;

    /// Stops one track. Stopping an ended track is a no-op.
    fn stop_track(&mut self, track_id: &str);
}

/// Exclusive owner of one live stream.
///
/// Every release path stops every constituent track: [`StreamHandle::release`]
/// does it explicitly and `Drop` does it for handles that are discarded.
pub struct StreamHandle {
    stream: Box<dyn MediaStream>,
    released: bool,
}

impl StreamHandle {
    /// Acquires a new stream from `backend`.
    ///
    /// # Errors
    /// Propagates constraint validation and backend failures.
    pub fn acquire(
        backend: &dyn CameraBackend,
        constraints: &MediaConstraints,
    ) -> Result<Self, CaptureError> {
        constraints.validate()?;
        let stream = backend.acquire(constraints)?;
        Ok(Self::from_stream(stream))
    }

    /// Takes ownership of an already running stream.
    pub fn from_stream(stream: Box<dyn MediaStream>) -> Self {
        Self {
            stream,
            released: false,
        }
    }

    /// Returns a snapshot of every constituent track.
    pub fn tracks(&self) -> Vec<TrackInfo> {
        self.stream.tracks()
    }

    /// Returns `true` while at least one track is live.
    pub fn is_live(&self) -> bool {
        self.stream
            .tracks()
            .iter()
            .any(|track| track.state == TrackState::Live)
    }

    /// Returns the native geometry of the video track.
    ///
    /// # Errors
    /// See [`MediaStream::video_settings`].
    pub fn video_settings(&self) -> Result<VideoSettings, CaptureError> {
        self.stream.video_settings()
    }

    /// Reads the current video frame.
    ///
    /// # Errors
    /// See [`MediaStream::read_frame`].
    pub fn read_frame(&mut self, captured_at_ms: u64) -> Result<Frame, CaptureError> {
        self.stream.read_frame(captured_at_ms)
    }

    /// Stops every track and consumes the handle.
    ///
    /// # Returns
    /// Number of tracks that were live and got stopped.
    pub fn release(mut self) -> usize {
        self.stop_all_tracks()
    }

    fn stop_all_tracks(&mut self) -> usize {
        self.released = true;
        let mut stopped = 0;
        for track in self.stream.tracks() {
            if track.state == TrackState::Live {
                self.stream.stop_track(&track.id);
                stopped += 1;
            }
        }
        tracing::debug!(
            stage = "camera",
            action = "tracks_stopped",
            stopped,
            "stream released"
        );
        stopped
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        if !self.released {
            let _ = self.stop_all_tracks();
        }
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("tracks", &self.stream.tracks())
            .field("released", &self.released)
            .finish()
    }
}

/// Capture layer error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The user or OS refused camera access.
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    /// Requested camera index does not exist.
    #[error("camera device not found: index {0}")]
    DeviceNotFound(u32),
    /// Request asks for something the backend cannot provide.
    #[error("invalid media constraints: {0}")]
    InvalidConstraints(String),
    /// Stream was already stopped.
    #[error("media stream has ended")]
    StreamEnded,
    /// Backend runtime failure.
    #[error("camera backend failure: {0}")]
    Backend(String),
}
