//! Deterministic camera backend for tests and machines without a camera.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use camshot_core::Frame;

use crate::{
    CameraBackend, CaptureError, DeviceInfo, MediaConstraints, MediaStream, TrackInfo, TrackKind,
    TrackState, VideoSettings,
};

const DEFAULT_WIDTH: u32 = 8;
const DEFAULT_HEIGHT: u32 = 6;

/// How the synthetic backend answers access requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntheticAccess {
    /// Every request succeeds.
    Granted,
    /// Every request fails with [`CaptureError::PermissionDenied`].
    Denied(String),
}

/// Shared counters observed by tests.
#[derive(Debug, Default)]
pub struct SyntheticProbe {
    acquisitions: AtomicUsize,
    stopped_tracks: AtomicUsize,
    frames_read: AtomicUsize,
}

impl SyntheticProbe {
    /// Number of successful acquisitions.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Number of tracks stopped across all streams.
    pub fn stopped_tracks(&self) -> usize {
        self.stopped_tracks.load(Ordering::SeqCst)
    }

    /// Number of frames read across all streams.
    pub fn frames_read(&self) -> usize {
        self.frames_read.load(Ordering::SeqCst)
    }
}

/// Synthetic backend producing a fixed gradient.
///
/// Pixel `(x, y)` of frame `n` is `[x, y, n, 255]` (each channel truncated to
/// `u8`), so orientation changes are visible in tests.
#[derive(Debug)]
pub struct SyntheticCameraBackend {
    devices: Vec<DeviceInfo>,
    settings: VideoSettings,
    access: SyntheticAccess,
    probe: Arc<SyntheticProbe>,
}

impl SyntheticCameraBackend {
    /// Creates a backend with one camera granting access.
    pub fn new() -> Self {
        Self {
            devices: vec![DeviceInfo {
                index: 0,
                name: "Synthetic Camera".to_string(),
                description: "deterministic gradient source".to_string(),
            }],
            settings: VideoSettings {
                width: DEFAULT_WIDTH,
                height: DEFAULT_HEIGHT,
            },
            access: SyntheticAccess::Granted,
            probe: Arc::new(SyntheticProbe::default()),
        }
    }

    /// Sets the native resolution reported and produced by streams.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.settings = VideoSettings { width, height };
        self
    }

    /// Sets how access requests are answered.
    pub fn with_access(mut self, access: SyntheticAccess) -> Self {
        self.access = access;
        self
    }

    /// Replaces the device list.
    pub fn with_devices(mut self, devices: Vec<DeviceInfo>) -> Self {
        self.devices = devices;
        self
    }

    /// Returns the counters shared with every stream of this backend.
    pub fn probe(&self) -> Arc<SyntheticProbe> {
        Arc::clone(&self.probe)
    }
}

impl Default for SyntheticCameraBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for SyntheticCameraBackend {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn list_devices(&self) -> Result<Vec<DeviceInfo>, CaptureError> {
        Ok(self.devices.clone())
    }

    fn acquire(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Box<dyn MediaStream>, CaptureError> {
        constraints.validate()?;

        if let SyntheticAccess::Denied(reason) = &self.access {
            return Err(CaptureError::PermissionDenied(reason.clone()));
        }

        let device = self
            .devices
            .iter()
            .find(|device| device.index == constraints.device_index)
            .ok_or(CaptureError::DeviceNotFound(constraints.device_index))?;

        self.probe.acquisitions.fetch_add(1, Ordering::SeqCst);
        let stream_number = self.probe.acquisitions();

        Ok(Box::new(SyntheticStream {
            track: TrackInfo {
                id: format!("synthetic-video-{stream_number}"),
                kind: TrackKind::Video,
                label: device.name.clone(),
                state: TrackState::Live,
            },
            settings: self.settings,
            sequence: 0,
            probe: Arc::clone(&self.probe),
        }))
    }
}

struct SyntheticStream {
    track: TrackInfo,
    settings: VideoSettings,
    sequence: u64,
    probe: Arc<SyntheticProbe>,
}

impl MediaStream for SyntheticStream {
    fn tracks(&self) -> Vec<TrackInfo> {
        vec![self.track.clone()]
    }

    fn video_settings(&self) -> Result<VideoSettings, CaptureError> {
        if self.track.state == TrackState::Ended {
            return Err(CaptureError::StreamEnded);
        }
        Ok(self.settings)
    }

    fn read_frame(&mut self, captured_at_ms: u64) -> Result<Frame, CaptureError> {
        if self.track.state == TrackState::Ended {
            return Err(CaptureError::StreamEnded);
        }

        self.sequence += 1;
        self.probe.frames_read.fetch_add(1, Ordering::SeqCst);

        let VideoSettings { width, height } = self.settings;
        let mut rgba = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for y in 0..height {
            for x in 0..width {
                rgba.extend_from_slice(&[x as u8, y as u8, self.sequence as u8, 255]);
            }
        }

        Frame::new(self.track.id.clone(), width, height, captured_at_ms, rgba)
            .map_err(|error| CaptureError::Backend(error.to_string()))
    }

    fn stop_track(&mut self, track_id: &str) {
        if self.track.id == track_id && self.track.state == TrackState::Live {
            self.track.state = TrackState::Ended;
            self.probe.stopped_tracks.fetch_add(1, Ordering::SeqCst);
        }
    }
}
