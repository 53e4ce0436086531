#![warn(missing_docs)]
//! # camshot-upload
//!
//! ## Purpose
//! Sends one encoded capture to the `/capturar` endpoint and interprets the
//! answer.
//!
//! ## Responsibilities
//! - Validate the endpoint URL once at client construction.
//! - Build the JSON request body and hand it to an injectable
//!   [`UploadTransport`].
//! - Turn the raw response into an [`UploadReceipt`] or an [`UploadError`].
//! - Provide the real HTTP transport ([`HttpTransport`], `reqwest`).
//!
//! ## Data flow
//! [`camshot_core::DataUrl`] -> [`UploadClient::upload_snapshot`] ->
//! [`UploadEnvelope`] -> transport -> [`TransportResponse`] ->
//! [`UploadReceipt`].
//!
//! ## Error model
//! Exactly one request is made per call. Nothing is retried; every failure is
//! returned to the caller, and [`classify_upload_error`] tells transport
//! faults apart from bad responses.
//!
//! ## Security and privacy notes
//! Image bytes are never logged; only body sizes and status codes are.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use camshot_core::{CoreError, DataUrl, UploadRequest, UploadResponse};
use thiserror::Error;
use url::Url;

/// Content type of every upload body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// One outbound request as handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEnvelope {
    /// Absolute endpoint URL.
    pub endpoint: Url,
    /// `Content-Type` header value.
    pub content_type: &'static str,
    /// Serialized JSON body.
    pub body: Vec<u8>,
}

/// Raw response returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
}

/// Successful upload result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Server-assigned file name.
    pub filename: String,
    /// Optional server confirmation text.
    pub message: Option<String>,
    /// HTTP status of the response.
    pub status: u16,
}

/// Transport abstraction used by [`UploadClient`].
pub trait UploadTransport: Send + Sync {
    /// Performs one POST and returns the raw response.
    ///
    /// # Errors
    /// Returns [`UploadError::Timeout`] or [`UploadError::Transport`] when no
    /// response was received.
    fn send(&self, envelope: &UploadEnvelope) -> Result<TransportResponse, UploadError>;
}

/// Client bound to one upload endpoint.
#[derive(Clone)]
pub struct UploadClient {
    endpoint: Url,
    transport: Arc<dyn UploadTransport>,
}

impl UploadClient {
    /// Creates a client for `endpoint`.
    ///
    /// # Errors
    /// Returns [`UploadError::InvalidEndpoint`] when the URL does not parse or
    /// its scheme is not `http`/`https`.
    pub fn new(endpoint: &str, transport: Arc<dyn UploadTransport>) -> Result<Self, UploadError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|error| UploadError::InvalidEndpoint(format!("{endpoint}: {error}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(UploadError::InvalidEndpoint(format!(
                "unsupported scheme `{}`",
                endpoint.scheme()
            )));
        }

        Ok(Self {
            endpoint,
            transport,
        })
    }

    /// Returns the configured endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Uploads one encoded capture with exactly one request.
    ///
    /// # Errors
    /// - Transport failures from [`UploadTransport::send`].
    /// - [`UploadError::Client`] / [`UploadError::Server`] for non-2xx statuses.
    /// - [`UploadError::MalformedResponse`] when the body is not JSON with a
    ///   non-empty `filename`.
    pub fn upload_snapshot(&self, image: &DataUrl) -> Result<UploadReceipt, UploadError> {
        let body = UploadRequest::new(image.clone())
            .to_json_bytes()
            .map_err(UploadError::Encode)?;
        let envelope = UploadEnvelope {
            endpoint: self.endpoint.clone(),
            content_type: JSON_CONTENT_TYPE,
            body,
        };

        tracing::info!(
            stage = "upload",
            action = "request_sent",
            endpoint = %self.endpoint,
            body_bytes = envelope.body.len(),
            "posting capture"
        );
        let response = self.transport.send(&envelope)?;
        tracing::info!(
            stage = "upload",
            action = "response_received",
            status = response.status,
            body_bytes = response.body.len(),
            "endpoint answered"
        );

        parse_receipt(response)
    }
}

impl fmt::Debug for UploadClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

/// Interprets a raw response as an upload receipt.
///
/// # Errors
/// See [`UploadClient::upload_snapshot`].
pub fn parse_receipt(response: TransportResponse) -> Result<UploadReceipt, UploadError> {
    match response.status {
        200..=299 => {}
        status @ 400..=499 => return Err(UploadError::Client(status)),
        status @ 500..=599 => return Err(UploadError::Server(status)),
        status => return Err(UploadError::UnexpectedStatus(status)),
    }

    let parsed = UploadResponse::from_json_bytes(&response.body)
        .map_err(|error| UploadError::MalformedResponse(error.to_string()))?;

    Ok(UploadReceipt {
        filename: parsed.filename,
        message: parsed.message,
        status: response.status,
    })
}

/// Blocking HTTP transport built on `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Builds the transport. `None` disables the request timeout.
    ///
    /// # Errors
    /// Returns [`UploadError::Transport`] when the HTTP client cannot be built.
    pub fn new(timeout: Option<Duration>) -> Result<Self, UploadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| UploadError::Transport(format!("http client init failed: {error}")))?;
        Ok(Self { client })
    }
}

impl UploadTransport for HttpTransport {
    fn send(&self, envelope: &UploadEnvelope) -> Result<TransportResponse, UploadError> {
        let response = self
            .client
            .post(envelope.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, envelope.content_type)
            .body(envelope.body.clone())
            .send()
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().map_err(map_reqwest_error)?.to_vec();
        Ok(TransportResponse { status, body })
    }
}

fn map_reqwest_error(error: reqwest::Error) -> UploadError {
    if error.is_timeout() {
        UploadError::Timeout
    } else {
        UploadError::Transport(error.to_string())
    }
}

/// Coarse failure grouping used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFailureKind {
    /// Request could not be built or the client is misconfigured.
    Request,
    /// No response was received.
    Transport,
    /// A response arrived but was unusable.
    Response,
}

/// Classifies an upload error.
pub fn classify_upload_error(error: &UploadError) -> UploadFailureKind {
    match error {
        UploadError::InvalidEndpoint(_) | UploadError::Encode(_) => UploadFailureKind::Request,
        UploadError::Timeout | UploadError::Transport(_) => UploadFailureKind::Transport,
        UploadError::Client(_)
        | UploadError::Server(_)
        | UploadError::UnexpectedStatus(_)
        | UploadError::MalformedResponse(_) => UploadFailureKind::Response,
    }
}

/// Upload error type.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Endpoint URL is unusable.
    #[error("invalid upload endpoint: {0}")]
    InvalidEndpoint(String),
    /// Request body could not be serialized.
    #[error("request encoding failed: {0}")]
    Encode(CoreError),
    /// Request timed out.
    #[error("upload timed out")]
    Timeout,
    /// Connection-level failure.
    #[error("upload transport failure: {0}")]
    Transport(String),
    /// Endpoint answered with a 4xx status.
    #[error("endpoint rejected upload with status {0}")]
    Client(u16),
    /// Endpoint answered with a 5xx status.
    #[error("endpoint failed with status {0}")]
    Server(u16),
    /// Endpoint answered with a non-success status outside 4xx/5xx.
    #[error("unexpected endpoint status {0}")]
    UnexpectedStatus(u16),
    /// Response body is not the expected JSON.
    #[error("malformed endpoint response: {0}")]
    MalformedResponse(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for response interpretation.

    use super::*;

    #[test]
    fn success_status_with_filename_is_a_receipt() {
        let receipt = parse_receipt(TransportResponse {
            status: 200,
            body: br#"{"filename": "foto123.png"}"#.to_vec(),
        })
        .expect("receipt should parse");
        assert_eq!(receipt.filename, "foto123.png");
        assert_eq!(receipt.message, None);
    }

    #[test]
    fn redirect_status_is_not_success() {
        let error = parse_receipt(TransportResponse {
            status: 302,
            body: Vec::new(),
        })
        .expect_err("redirect must fail");
        assert!(matches!(error, UploadError::UnexpectedStatus(302)));
    }

    #[test]
    fn rejects_non_http_endpoints() {
        let transport: Arc<dyn UploadTransport> =
            Arc::new(HttpTransport::new(None).expect("client builds"));
        let result = UploadClient::new("ftp://example.test/capturar", transport);
        assert!(matches!(result, Err(UploadError::InvalidEndpoint(_))));
    }
}
