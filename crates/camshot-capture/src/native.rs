//! Real camera backend built on `nokhwa`.
//!
//! `nokhwa::Camera` is not `Send`, so each stream owns a dedicated camera
//! thread. The stream talks to it over channels and stays `Send` itself.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use camshot_core::Frame;
use nokhwa::pixel_format::RgbAFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, CameraInfo, RequestedFormat, RequestedFormatType};
use nokhwa::{Camera, NokhwaError};

use crate::{
    CameraBackend, CaptureError, DeviceInfo, MediaConstraints, MediaStream, TrackInfo, TrackKind,
    TrackState, VideoSettings,
};

/// Camera backend for the platform's native capture API.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCameraBackend;

impl NativeCameraBackend {
    /// Creates the backend. Devices are resolved on each call.
    pub fn new() -> Self {
        Self
    }
}

impl CameraBackend for NativeCameraBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn list_devices(&self) -> Result<Vec<DeviceInfo>, CaptureError> {
        let cameras = nokhwa::query(ApiBackend::Auto)
            .map_err(|error| CaptureError::Backend(format!("camera enumeration failed: {error}")))?;

        Ok(cameras.iter().filter_map(device_from_info).collect())
    }

    fn acquire(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Box<dyn MediaStream>, CaptureError> {
        constraints.validate()?;

        let index = constraints.device_index;
        let (command_tx, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name(format!("camera-{index}"))
            .spawn(move || camera_worker(index, command_rx, ready_tx))
            .map_err(|error| {
                CaptureError::Backend(format!("camera thread spawn failed: {error}"))
            })?;

        let startup = ready_rx.recv().map_err(|_| {
            CaptureError::Backend("camera thread exited during startup".to_string())
        })?;

        let (settings, label) = match startup {
            Ok(ready) => ready,
            Err(error) => {
                let _ = worker.join();
                return Err(error);
            }
        };

        Ok(Box::new(NativeStream {
            command_tx,
            worker: Some(worker),
            track: TrackInfo {
                id: format!("native-video-{index}"),
                kind: TrackKind::Video,
                label,
                state: TrackState::Live,
            },
            settings,
        }))
    }
}

/// Lists a camera under the backend index that [`CameraBackend::acquire`]
/// opens. Devices addressed only by a path string cannot be opened through
/// [`MediaConstraints::device_index`] and are skipped.
fn device_from_info(info: &CameraInfo) -> Option<DeviceInfo> {
    match info.index() {
        CameraIndex::Index(index) => Some(DeviceInfo {
            index: *index,
            name: info.human_name(),
            description: info.description().to_string(),
        }),
        CameraIndex::String(path) => {
            tracing::debug!(
                stage = "camera",
                action = "device_skipped",
                path = %path,
                "camera has no numeric index"
            );
            None
        }
    }
}

enum CameraCommand {
    ReadFrame {
        captured_at_ms: u64,
        reply: Sender<Result<Frame, CaptureError>>,
    },
    Stop,
}

struct NativeStream {
    command_tx: Sender<CameraCommand>,
    worker: Option<JoinHandle<()>>,
    track: TrackInfo,
    settings: VideoSettings,
}

impl NativeStream {
    fn shutdown_worker(&mut self) {
        let _ = self.command_tx.send(CameraCommand::Stop);
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::error!(
                stage = "camera",
                action = "worker_join_failed",
                "camera thread panicked"
            );
        }
    }
}

impl MediaStream for NativeStream {
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

        let (reply, response) = mpsc::channel();
        self.command_tx
            .send(CameraCommand::ReadFrame {
                captured_at_ms,
                reply,
            })
            .map_err(|_| CaptureError::Backend("camera thread is not running".to_string()))?;

        response
            .recv()
            .map_err(|_| CaptureError::Backend("camera thread dropped frame request".to_string()))?
    }

    fn stop_track(&mut self, track_id: &str) {
        if self.track.id == track_id && self.track.state == TrackState::Live {
            self.track.state = TrackState::Ended;
            self.shutdown_worker();
        }
    }
}

impl Drop for NativeStream {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.shutdown_worker();
        }
    }
}

fn camera_worker(
    index: u32,
    commands: Receiver<CameraCommand>,
    ready: Sender<Result<(VideoSettings, String), CaptureError>>,
) {
    let requested =
        RequestedFormat::new::<RgbAFormat>(RequestedFormatType::AbsoluteHighestResolution);
    let mut camera = match Camera::new(CameraIndex::Index(index), requested) {
        Ok(camera) => camera,
        Err(error) => {
            let _ = ready.send(Err(map_open_error(index, &error)));
            return;
        }
    };

    if let Err(error) = camera.open_stream() {
        let _ = ready.send(Err(map_open_error(index, &error)));
        return;
    }

    let resolution = camera.resolution();
    let settings = VideoSettings {
        width: resolution.width(),
        height: resolution.height(),
    };
    if ready.send(Ok((settings, camera.info().human_name()))).is_err() {
        let _ = camera.stop_stream();
        return;
    }

    let source_id = format!("native-video-{index}");
    while let Ok(command) = commands.recv() {
        match command {
            CameraCommand::ReadFrame {
                captured_at_ms,
                reply,
            } => {
                let _ = reply.send(read_native_frame(&mut camera, &source_id, captured_at_ms));
            }
            CameraCommand::Stop => break,
        }
    }

    if let Err(error) = camera.stop_stream() {
        tracing::warn!(
            stage = "camera",
            action = "stop_stream_failed",
            error = %error,
            "camera stream did not stop cleanly"
        );
    }
}

fn read_native_frame(
    camera: &mut Camera,
    source_id: &str,
    captured_at_ms: u64,
) -> Result<Frame, CaptureError> {
    let buffer = camera
        .frame()
        .map_err(|error| CaptureError::Backend(format!("frame read failed: {error}")))?;
    let decoded = buffer
        .decode_image::<RgbAFormat>()
        .map_err(|error| CaptureError::Backend(format!("frame decode failed: {error}")))?;

    let width = decoded.width();
    let height = decoded.height();
    Frame::new(source_id, width, height, captured_at_ms, decoded.into_raw())
        .map_err(|error| CaptureError::Backend(error.to_string()))
}

fn map_open_error(index: u32, error: &NokhwaError) -> CaptureError {
    let detail = error.to_string();
    let lowered = detail.to_ascii_lowercase();
    if lowered.contains("permission") || lowered.contains("denied") {
        CaptureError::PermissionDenied(detail)
    } else if lowered.contains("not found") || lowered.contains("no such") {
        CaptureError::DeviceNotFound(index)
    } else {
        CaptureError::Backend(format!("camera open failed: {detail}"))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for device enumeration mapping.

    use super::*;

    #[test]
    fn listed_index_is_the_backend_index_not_the_position() {
        let cameras = [
            CameraInfo::new("Integrated", "uvcvideo", "", CameraIndex::Index(0)),
            CameraInfo::new("USB Camera", "uvcvideo", "", CameraIndex::Index(2)),
        ];

        let devices: Vec<DeviceInfo> = cameras.iter().filter_map(device_from_info).collect();

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].index, 0);
        assert_eq!(devices[1].index, 2);
        assert_eq!(devices[1].name, "USB Camera");
    }

    #[test]
    fn path_addressed_cameras_are_skipped() {
        let info = CameraInfo::new(
            "IP Camera",
            "network",
            "",
            CameraIndex::String("rtsp://camera.local/stream".to_string()),
        );
        assert_eq!(device_from_info(&info), None);
    }
}
