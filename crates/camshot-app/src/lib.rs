#![warn(missing_docs)]
//! # camshot-app
//!
//! ## Purpose
//! Orchestrates the camera toggle, frame capture, upload and status display
//! for `camshot`.
//!
//! ## Responsibilities
//! - Own the single camera stream slot and keep it in sync with the toggle
//!   label ([`AppController`]).
//! - Guard captures behind an active stream, then snapshot, encode and upload
//!   exactly once.
//! - Drive both operations from one event loop ([`Runtime`]).
//! - Load configuration from the environment and install logging.
//!
//! ## Data flow
//! Input line -> [`Runtime`] -> [`AppController::request_toggle`] /
//! [`AppController::prepare_capture`] -> worker job -> completion event ->
//! [`AppController::complete_acquisition`] /
//! [`AppController::complete_upload`] -> rendered status line.
//!
//! ## Ownership and lifetimes
//! The controller lives on the loop thread. Jobs receive owned inputs (a
//! backend `Arc`, a cloned client, an encoded data URL) and send owned results
//! back, so no state is shared across threads.
//!
//! ## Error model
//! Operation failures never escape the triggering operation: they are logged
//! and shown as an error-category status. [`AppError`] covers startup
//! problems (configuration, logging, endpoint setup, I/O).

pub mod config;
pub mod controller;
pub mod logging;
pub mod runtime;

use std::sync::Arc;

use camshot_capture::{CameraBackend, SyntheticCameraBackend};
use camshot_upload::UploadError;
use thiserror::Error;
use url::Url;

pub use config::{AppConfig, CameraBackendKind};
pub use controller::{AppController, CameraController, CaptureOutcome, ToggleAction, UploadJob};
pub use logging::init_logging;
pub use runtime::{AppEvent, LoopControl, Runtime, ShellCommand};

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("CAMSHOT_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Returns `true` when the endpoint URL is HTTPS.
pub fn is_https_endpoint(endpoint: &str) -> bool {
    Url::parse(endpoint)
        .map(|url| url.scheme() == "https")
        .unwrap_or(false)
}

/// Builds the configured camera backend.
///
/// # Errors
/// Returns [`AppError::Config`] when the native backend is requested but the
/// crate was built without the `native-camera` feature.
pub fn build_backend(kind: CameraBackendKind) -> Result<Arc<dyn CameraBackend>, AppError> {
    match kind {
        CameraBackendKind::Synthetic => Ok(Arc::new(SyntheticCameraBackend::new())),
        #[cfg(feature = "native-camera")]
        CameraBackendKind::Native => Ok(Arc::new(camshot_capture::NativeCameraBackend::new())),
        #[cfg(not(feature = "native-camera"))]
        CameraBackendKind::Native => Err(AppError::Config(
            "native camera support is not compiled in; rebuild with `--features native-camera`"
                .to_string(),
        )),
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
    /// Logging could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
    /// Upload subsystem error.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),
    /// Terminal or file I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
