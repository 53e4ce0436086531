//! Camera toggle and capture-and-upload orchestration.
//!
//! Both operations are split into a synchronous decision step and a
//! completion step so the runtime can run the slow part (camera startup,
//! HTTP upload) on a worker while the event loop keeps ownership of state.

use camshot_capture::{CameraBackend, CaptureError, MediaConstraints, StreamHandle};
use camshot_core::DataUrl;
use camshot_snapshot::snapshot_data_url;
use camshot_ui::UiState;
use camshot_upload::{UploadClient, UploadError, UploadReceipt, classify_upload_error};

/// Owner of the single camera stream slot.
#[derive(Debug)]
pub struct CameraController {
    stream: Option<StreamHandle>,
    acquisition_pending: bool,
    constraints: MediaConstraints,
}

impl CameraController {
    /// Creates a controller with no stream.
    pub fn new(constraints: MediaConstraints) -> Self {
        Self {
            stream: None,
            acquisition_pending: false,
            constraints,
        }
    }

    /// Returns `true` when a stream is held.
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Returns `true` while an acquisition request is in flight.
    pub fn acquisition_pending(&self) -> bool {
        self.acquisition_pending
    }

    /// Returns the held stream, if any.
    pub fn stream(&self) -> Option<&StreamHandle> {
        self.stream.as_ref()
    }

    /// Constraints used for every acquisition.
    pub fn constraints(&self) -> MediaConstraints {
        self.constraints
    }

    fn release(&mut self) -> Option<usize> {
        self.stream.take().map(StreamHandle::release)
    }
}

/// Decision taken by [`AppController::request_toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    /// The held stream was released inline.
    Released {
        /// Number of tracks stopped.
        stopped_tracks: usize,
    },
    /// An acquisition must be started with these constraints.
    AcquireRequested(MediaConstraints),
    /// An acquisition is already in flight; nothing was done.
    IgnoredPending,
}

/// Encoded capture ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    /// PNG data URL.
    pub image: DataUrl,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
}

/// Final result of one capture-and-upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// No stream was active; nothing was drawn or sent.
    CameraRequired,
    /// The frame could not be read or encoded; nothing was sent.
    SnapshotFailed,
    /// The endpoint stored the image under this name.
    Saved(String),
    /// The upload request failed.
    UploadFailed,
}

/// UI state plus camera slot, mutated only from the event loop.
#[derive(Debug)]
pub struct AppController {
    ui: UiState,
    camera: CameraController,
}

impl AppController {
    /// Creates a controller with the camera off.
    pub fn new(version: impl Into<String>, constraints: MediaConstraints) -> Self {
        Self {
            ui: UiState::new(version),
            camera: CameraController::new(constraints),
        }
    }

    /// Current UI state.
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Camera slot.
    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    /// Decides what a toggle press does.
    ///
    /// With a stream held, every track is stopped and the UI returns to the
    /// "off" state before this returns. Without one, the caller must run the
    /// returned acquisition and pass its result to
    /// [`AppController::complete_acquisition`].
    pub fn request_toggle(&mut self) -> ToggleAction {
        if self.camera.acquisition_pending {
            tracing::info!(
                stage = "camera",
                action = "toggle_ignored",
                "acquisition already in flight"
            );
            return ToggleAction::IgnoredPending;
        }

        if let Some(stopped_tracks) = self.camera.release() {
            self.ui.camera_stopped();
            tracing::info!(
                stage = "camera",
                action = "stopped",
                stopped_tracks,
                "camera switched off"
            );
            return ToggleAction::Released { stopped_tracks };
        }

        self.camera.acquisition_pending = true;
        tracing::info!(
            stage = "camera",
            action = "acquire_requested",
            device_index = self.camera.constraints.device_index,
            "requesting camera access"
        );
        ToggleAction::AcquireRequested(self.camera.constraints)
    }

    /// Applies the result of an acquisition started by
    /// [`AppController::request_toggle`].
    pub fn complete_acquisition(&mut self, result: Result<StreamHandle, CaptureError>) {
        self.camera.acquisition_pending = false;

        match result {
            Ok(handle) => {
                if self.camera.stream.is_some() {
                    tracing::warn!(
                        stage = "camera",
                        action = "duplicate_stream_released",
                        "a stream is already held; releasing the new one"
                    );
                    let _ = handle.release();
                    return;
                }

                let preview = handle
                    .tracks()
                    .first()
                    .map(|track| track.id.clone())
                    .unwrap_or_default();
                tracing::info!(
                    stage = "camera",
                    action = "started",
                    track = %preview,
                    "camera switched on"
                );
                self.camera.stream = Some(handle);
                self.ui.camera_started(preview);
            }
            Err(error) => {
                tracing::error!(
                    stage = "camera",
                    action = "acquire_failed",
                    error = %error,
                    "camera access failed"
                );
                self.ui.camera_denied();
            }
        }
    }

    /// Blocking toggle: decides and, when needed, acquires inline.
    pub fn toggle(&mut self, backend: &dyn CameraBackend) -> ToggleAction {
        let action = self.request_toggle();
        if let ToggleAction::AcquireRequested(constraints) = action {
            self.complete_acquisition(StreamHandle::acquire(backend, &constraints));
        }
        action
    }

    /// Checks the precondition, snapshots the current frame and encodes it.
    ///
    /// # Errors
    /// Returns the final [`CaptureOutcome`] when no upload should happen; the
    /// status line is already updated in that case.
    pub fn prepare_capture(&mut self, captured_at_ms: u64) -> Result<UploadJob, CaptureOutcome> {
        let Some(stream) = self.camera.stream.as_mut() else {
            tracing::info!(
                stage = "capture",
                action = "rejected",
                "capture requested with camera off"
            );
            self.ui.camera_required();
            return Err(CaptureOutcome::CameraRequired);
        };

        let snapshot = stream.video_settings().and_then(|settings| {
            stream
                .read_frame(captured_at_ms)
                .map(|frame| (settings, frame))
        });
        let encoded = snapshot
            .map_err(|error| error.to_string())
            .and_then(|(settings, frame)| {
                snapshot_data_url(&frame, settings.width, settings.height)
                    .map(|image| UploadJob {
                        image,
                        width: settings.width,
                        height: settings.height,
                    })
                    .map_err(|error| error.to_string())
            });

        match encoded {
            Ok(job) => {
                tracing::info!(
                    stage = "capture",
                    action = "encoded",
                    width = job.width,
                    height = job.height,
                    data_url_bytes = job.image.len(),
                    "frame captured"
                );
                Ok(job)
            }
            Err(detail) => {
                tracing::error!(
                    stage = "capture",
                    action = "snapshot_failed",
                    error = %detail,
                    "frame capture failed"
                );
                self.ui.photo_failed();
                Err(CaptureOutcome::SnapshotFailed)
            }
        }
    }

    /// Applies the result of one upload.
    pub fn complete_upload(
        &mut self,
        result: Result<UploadReceipt, UploadError>,
    ) -> CaptureOutcome {
        match result {
            Ok(receipt) => {
                tracing::info!(
                    stage = "upload",
                    action = "saved",
                    filename = %receipt.filename,
                    "photo saved"
                );
                self.ui.photo_saved(&receipt.filename);
                CaptureOutcome::Saved(receipt.filename)
            }
            Err(error) => {
                tracing::error!(
                    stage = "upload",
                    action = "failed",
                    kind = ?classify_upload_error(&error),
                    error = %error,
                    "photo upload failed"
                );
                self.ui.photo_failed();
                CaptureOutcome::UploadFailed
            }
        }
    }

    /// Blocking capture-and-upload.
    pub fn capture_and_send(
        &mut self,
        client: &UploadClient,
        captured_at_ms: u64,
    ) -> CaptureOutcome {
        match self.prepare_capture(captured_at_ms) {
            Ok(job) => {
                let result = client.upload_snapshot(&job.image);
                self.complete_upload(result)
            }
            Err(outcome) => outcome,
        }
    }

    /// Releases the stream without touching the status line.
    pub fn shutdown(&mut self) {
        if let Some(stopped_tracks) = self.camera.release() {
            self.ui.preview_source = None;
            self.ui.toggle = camshot_ui::ToggleLabel::Start;
            tracing::info!(
                stage = "camera",
                action = "shutdown",
                stopped_tracks,
                "camera released on exit"
            );
        }
    }
}
