#![warn(missing_docs)]
//! # camshot-ui
//!
//! ## Purpose
//! Defines the UI-facing state model for `camshot`.
//!
//! ## Responsibilities
//! - Hold the toggle control label, preview binding and status line.
//! - Provide one transition per user-visible outcome so every caller renders
//!   the same text and category.
//!
//! ## Data flow
//! Controller outcomes mutate [`UiState`], which the shell renders.
//!
//! ## Ownership and lifetimes
//! `UiState` owns all strings so reducers never borrow from transient
//! responses.
//!
//! ## Error model
//! This crate has no fallible operations; failures arrive as transitions
//! that set an error-category status.

use std::fmt;

/// Status shown after the camera was switched off.
pub const STATUS_CAMERA_OFF: &str = "Cámara apagada";
/// Status shown after the camera was switched on.
pub const STATUS_CAMERA_ON: &str = "Cámara encendida";
/// Status shown when camera access failed.
pub const STATUS_CAMERA_DENIED: &str = "No se pudo acceder a la cámara.";
/// Status shown when a capture is attempted without a live camera.
pub const STATUS_CAMERA_REQUIRED: &str = "Primero enciende la cámara";
/// Prefix of the status shown after a successful upload.
pub const STATUS_PHOTO_SAVED_PREFIX: &str = "Foto guardada: ";
/// Status shown when capture or upload failed.
pub const STATUS_PHOTO_FAILED: &str = "Error al guardar foto";

/// Visual category of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusCategory {
    /// No emphasis.
    #[default]
    Neutral,
    /// Success emphasis.
    Ok,
    /// Error emphasis.
    Error,
}

/// Text plus category shown in the status region.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    /// Display text.
    pub text: String,
    /// Visual category.
    pub category: StatusCategory,
}

impl StatusLine {
    fn new(text: impl Into<String>, category: StatusCategory) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.category {
            StatusCategory::Neutral => "    ",
            StatusCategory::Ok => " ok ",
            StatusCategory::Error => "err ",
        };
        write!(f, "[{tag}] {}", self.text)
    }
}

/// Visual state of the camera toggle control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleLabel {
    /// Camera is off; pressing starts it.
    #[default]
    Start,
    /// Camera is on; pressing stops it.
    Stop,
}

impl ToggleLabel {
    /// Returns the control caption.
    pub fn caption(&self) -> &'static str {
        match self {
            Self::Start => "Encender Cámara",
            Self::Stop => "Apagar Cámara",
        }
    }
}

/// Aggregate UI state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    /// Toggle control state.
    pub toggle: ToggleLabel,
    /// Track id bound to the preview, if any.
    pub preview_source: Option<String>,
    /// Status region.
    pub status: StatusLine,
}

impl UiState {
    /// Creates the initial state: camera off, empty neutral status.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            toggle: ToggleLabel::Start,
            preview_source: None,
            status: StatusLine::default(),
        }
    }

    /// Camera switched on and bound to the preview.
    pub fn camera_started(&mut self, preview_source: impl Into<String>) {
        self.preview_source = Some(preview_source.into());
        self.toggle = ToggleLabel::Stop;
        self.status = StatusLine::new(STATUS_CAMERA_ON, StatusCategory::Ok);
    }

    /// Camera switched off and preview cleared.
    pub fn camera_stopped(&mut self) {
        self.preview_source = None;
        self.toggle = ToggleLabel::Start;
        self.status = StatusLine::new(STATUS_CAMERA_OFF, StatusCategory::Neutral);
    }

    /// Camera access failed; control and preview are left untouched.
    pub fn camera_denied(&mut self) {
        self.status = StatusLine::new(STATUS_CAMERA_DENIED, StatusCategory::Error);
    }

    /// Capture attempted while the camera is off.
    pub fn camera_required(&mut self) {
        self.status = StatusLine::new(STATUS_CAMERA_REQUIRED, StatusCategory::Error);
    }

    /// Upload succeeded.
    pub fn photo_saved(&mut self, filename: &str) {
        self.status = StatusLine::new(
            format!("{STATUS_PHOTO_SAVED_PREFIX}{filename}"),
            StatusCategory::Ok,
        );
    }

    /// Capture or upload failed.
    pub fn photo_failed(&mut self) {
        self.status = StatusLine::new(STATUS_PHOTO_FAILED, StatusCategory::Error);
    }

    /// Returns `true` when the preview is bound to a live stream.
    pub fn preview_bound(&self) -> bool {
        self.preview_source.is_some()
    }
}
