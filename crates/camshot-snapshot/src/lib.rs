#![warn(missing_docs)]
//! # camshot-snapshot
//!
//! ## Purpose
//! Turns one live video frame into an upload-ready PNG data URL.
//!
//! ## Responsibilities
//! - Draw a frame into an off-screen [`Surface`] of the stream's native size.
//! - Mirror the drawing about the vertical axis so the saved image matches
//!   real-world orientation instead of the mirrored preview.
//! - Encode the surface losslessly as PNG inside a [`DataUrl`].
//!
//! ## Data flow
//! [`camshot_core::Frame`] -> [`draw_mirrored`] -> [`Surface`] ->
//! [`encode_data_url`] -> [`DataUrl`] consumed by the upload stage.
//!
//! ## Ownership and lifetimes
//! The surface owns its buffer; the source frame is only borrowed for the draw.
//!
//! ## Error model
//! Empty geometry and encoder failures return [`SnapshotError`].

use camshot_core::{CoreError, DataUrl, Frame, PNG_MIME};
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use thiserror::Error;

/// Off-screen RGBA raster holding one mirrored capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA bytes in row-major order.
    pub rgba: Vec<u8>,
}

/// Draws `frame` into a `width x height` surface, mirrored horizontally.
///
/// The frame is scaled to the surface when the geometries differ, then the
/// result is flipped so surface pixel `(x, y)` comes from drawn pixel
/// `(width - 1 - x, y)`.
///
/// # Errors
/// Returns [`SnapshotError::EmptySurface`] when either surface dimension is
/// zero, [`SnapshotError::EmptyFrame`] when the frame holds no pixels.
pub fn draw_mirrored(frame: &Frame, width: u32, height: u32) -> Result<Surface, SnapshotError> {
    if width == 0 || height == 0 {
        return Err(SnapshotError::EmptySurface { width, height });
    }
    if frame.is_empty() {
        return Err(SnapshotError::EmptyFrame);
    }

    // Frame fields are public, so the buffer may no longer match its geometry.
    let expected = camshot_core::required_rgba_len(frame.width, frame.height)?;
    let source = RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone()).ok_or(
        CoreError::InvalidFrameShape {
            expected,
            actual: frame.rgba.len(),
        },
    )?;

    let drawn = if (frame.width, frame.height) == (width, height) {
        source
    } else {
        imageops::resize(&source, width, height, FilterType::Triangle)
    };

    let mirrored = imageops::flip_horizontal(&drawn);
    Ok(Surface {
        width,
        height,
        rgba: mirrored.into_raw(),
    })
}

/// Encodes a surface as PNG bytes.
///
/// # Errors
/// Returns [`SnapshotError::Encode`] when the PNG encoder fails.
pub fn encode_png(surface: &Surface) -> Result<Vec<u8>, SnapshotError> {
    let mut png = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png)
        .write_image(
            &surface.rgba,
            surface.width,
            surface.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|error| SnapshotError::Encode(error.to_string()))?;
    Ok(png)
}

/// Encodes a surface as a `data:image/png;base64,` URL.
///
/// # Errors
/// Propagates [`encode_png`] failures.
pub fn encode_data_url(surface: &Surface) -> Result<DataUrl, SnapshotError> {
    let png = encode_png(surface)?;
    Ok(DataUrl::from_bytes(PNG_MIME, &png)?)
}

/// Draws and encodes in one step.
///
/// # Errors
/// Propagates [`draw_mirrored`] and [`encode_data_url`] failures.
pub fn snapshot_data_url(frame: &Frame, width: u32, height: u32) -> Result<DataUrl, SnapshotError> {
    let surface = draw_mirrored(frame, width, height)?;
    encode_data_url(&surface)
}

/// Snapshot error type.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Surface would hold no pixels.
    #[error("surface has no pixels ({width}x{height})")]
    EmptySurface {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// Frame holds no pixels.
    #[error("frame has no pixels")]
    EmptyFrame,
    /// PNG encoding failure.
    #[error("png encoding failed: {0}")]
    Encode(String),
    /// Core validation failure.
    #[error(transparent)]
    Core(#[from] CoreError),
}
