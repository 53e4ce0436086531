#![warn(missing_docs)]
//! # camshot-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `camshot` workspace.
//!
//! ## Responsibilities
//! - Represent captured camera frames as validated RGBA rasters.
//! - Represent encoded images as immutable `data:` URLs.
//! - Encode/decode the `/capturar` request and response bodies.
//!
//! ## Data flow
//! Capture code emits [`Frame`] values. The snapshot stage turns one frame into
//! a [`DataUrl`], which is wrapped in an [`UploadRequest`] and sent once. The
//! server answers with an [`UploadResponse`].
//!
//! ## Ownership and lifetimes
//! Frames and data URLs own their buffers so they can move between the event
//! loop and worker threads without borrowing.
//!
//! ## Error model
//! Shape mismatches, malformed data URLs and contract violations return
//! [`CoreError`] variants.
//!
//! ## Example
//! ```rust
//! use camshot_core::{DataUrl, UploadRequest};
//!
//! let image = DataUrl::from_bytes("image/png", &[1, 2, 3]).unwrap();
//! let request = UploadRequest::new(image);
//! let body = request.to_json_bytes().unwrap();
//! assert!(body.starts_with(b"{\"imagen\":\"data:image/png;base64,"));
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// MIME type used for every encoded capture.
pub const PNG_MIME: &str = "image/png";

const DATA_URL_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// One RGBA frame read from a live video track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Identifier of the track the frame came from.
    pub source_id: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Capture time in Unix epoch milliseconds.
    pub captured_at_ms: u64,
    /// Raw RGBA pixel buffer (`width * height * 4` bytes), row-major.
    pub rgba: Vec<u8>,
}

impl Frame {
    /// Constructs a validated frame.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidFrameShape`] when the pixel buffer length is
    /// not exactly `width * height * 4`.
    pub fn new(
        source_id: impl Into<String>,
        width: u32,
        height: u32,
        captured_at_ms: u64,
        rgba: Vec<u8>,
    ) -> Result<Self, CoreError> {
        let expected_len = required_rgba_len(width, height)?;
        if rgba.len() != expected_len {
            return Err(CoreError::InvalidFrameShape {
                expected: expected_len,
                actual: rgba.len(),
            });
        }

        Ok(Self {
            source_id: source_id.into(),
            width,
            height,
            captured_at_ms,
            rgba,
        })
    }

    /// Returns the RGBA value at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let offset = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = self.rgba.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Returns `true` when the frame holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Immutable `data:<mime>;base64,<payload>` string.
///
/// Construction validates the scheme, MIME type and base64 marker, so every
/// value can be split without further checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataUrl {
    raw: String,
    payload_start: usize,
}

impl DataUrl {
    /// Encodes `bytes` as a base64 data URL with the given MIME type.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDataUrl`] when `mime` is not of the form
    /// `type/subtype`.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Result<Self, CoreError> {
        validate_mime(mime)?;
        let raw = format!(
            "{DATA_URL_SCHEME}{mime}{BASE64_MARKER}{}",
            STANDARD.encode(bytes)
        );
        Self::parse(raw)
    }

    /// Parses and validates an existing data URL string.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDataUrl`] when the scheme, MIME type or
    /// base64 marker is missing.
    pub fn parse(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        let rest = raw.strip_prefix(DATA_URL_SCHEME).ok_or_else(|| {
            CoreError::InvalidDataUrl("missing `data:` scheme".to_string())
        })?;
        let marker = rest.find(BASE64_MARKER).ok_or_else(|| {
            CoreError::InvalidDataUrl("missing `;base64,` marker".to_string())
        })?;
        validate_mime(&rest[..marker])?;

        let payload_start = DATA_URL_SCHEME.len() + marker + BASE64_MARKER.len();
        Ok(Self { raw, payload_start })
    }

    /// Returns the declared MIME type.
    pub fn mime_type(&self) -> &str {
        &self.raw[DATA_URL_SCHEME.len()..self.payload_start - BASE64_MARKER.len()]
    }

    /// Returns the base64 payload without the header.
    pub fn payload_base64(&self) -> &str {
        &self.raw[self.payload_start..]
    }

    /// Decodes the base64 payload back into bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Base64`] when the payload is not valid base64.
    pub fn decode_payload(&self) -> Result<Vec<u8>, CoreError> {
        STANDARD
            .decode(self.payload_base64())
            .map_err(CoreError::Base64)
    }

    /// Returns the full data URL string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the length of the full data URL in bytes.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` when the payload section is empty.
    pub fn is_empty(&self) -> bool {
        self.payload_base64().is_empty()
    }
}

impl TryFrom<String> for DataUrl {
    type Error = CoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl From<DataUrl> for String {
    fn from(value: DataUrl) -> Self {
        value.raw
    }
}

/// Body of `POST /capturar`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    /// Encoded capture as a PNG data URL.
    pub imagen: DataUrl,
}

impl UploadRequest {
    /// Wraps one encoded capture.
    pub fn new(imagen: DataUrl) -> Self {
        Self { imagen }
    }

    /// Serializes the request to compact JSON bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(self).map_err(CoreError::Codec)
    }
}

/// Body returned by `POST /capturar` on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Server-assigned name of the stored image.
    pub filename: String,
    /// Optional human-readable confirmation from the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UploadResponse {
    /// Parses and validates a response body.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] for invalid JSON or a missing `filename`.
    /// Returns [`CoreError::InvalidContract`] when `filename` is blank.
    pub fn from_json_bytes(raw: &[u8]) -> Result<Self, CoreError> {
        let parsed: Self = serde_json::from_slice(raw).map_err(CoreError::Codec)?;
        if parsed.filename.trim().is_empty() {
            return Err(CoreError::InvalidContract("filename is empty".to_string()));
        }
        Ok(parsed)
    }
}

/// Error type for core validation and codec failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Frame buffer shape does not match declared geometry.
    #[error("invalid frame shape: expected {expected} bytes, got {actual}")]
    InvalidFrameShape {
        /// Expected RGBA byte count.
        expected: usize,
        /// Actual RGBA byte count.
        actual: usize,
    },
    /// Frame dimensions overflow addressable memory.
    #[error("frame dimensions overflow")]
    DimensionOverflow,
    /// Data URL is structurally invalid.
    #[error("invalid data url: {0}")]
    InvalidDataUrl(String),
    /// Data URL payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    /// JSON encoding/decoding error.
    #[error("payload codec failure: {0}")]
    Codec(#[from] serde_json::Error),
    /// Decoded payload violates the endpoint contract.
    #[error("contract violation: {0}")]
    InvalidContract(String),
}

/// Returns the RGBA byte length for a `width x height` raster.
///
/// # Errors
/// Returns [`CoreError::DimensionOverflow`] when the product overflows.
pub fn required_rgba_len(width: u32, height: u32) -> Result<usize, CoreError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(CoreError::DimensionOverflow)
}

fn validate_mime(mime: &str) -> Result<(), CoreError> {
    let valid = mime
        .split_once('/')
        .is_some_and(|(kind, subtype)| !kind.is_empty() && !subtype.is_empty());
    if !valid {
        return Err(CoreError::InvalidDataUrl(format!(
            "mime type `{mime}` is not of the form type/subtype"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Unit tests for frame and data URL validation.

    use super::*;

    #[test]
    fn frame_rejects_short_buffers() {
        let error = Frame::new("track-1", 2, 2, 0, vec![0; 15]).expect_err("shape must fail");
        assert!(matches!(
            error,
            CoreError::InvalidFrameShape {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn frame_pixel_reads_row_major() {
        let rgba = (0..16_u8).collect::<Vec<_>>();
        let frame = Frame::new("track-1", 2, 2, 0, rgba).expect("frame should be valid");
        assert_eq!(frame.pixel(1, 0), Some([4, 5, 6, 7]));
        assert_eq!(frame.pixel(0, 1), Some([8, 9, 10, 11]));
        assert_eq!(frame.pixel(2, 0), None);
    }

    #[test]
    fn data_url_splits_header_and_payload() {
        let url = DataUrl::from_bytes(PNG_MIME, b"png").expect("data url should build");
        assert_eq!(url.mime_type(), "image/png");
        assert_eq!(url.payload_base64(), "cG5n");
        assert_eq!(url.decode_payload().expect("payload decodes"), b"png");
    }

    #[test]
    fn data_url_rejects_missing_marker() {
        assert!(DataUrl::parse("data:image/png,AAAA").is_err());
        assert!(DataUrl::parse("image/png;base64,AAAA").is_err());
        assert!(DataUrl::parse("data:png;base64,AAAA").is_err());
    }
}
