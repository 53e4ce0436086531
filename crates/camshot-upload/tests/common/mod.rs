//! Shared fixtures for upload integration tests.

use std::sync::Mutex;

use camshot_core::{DataUrl, PNG_MIME};
use camshot_upload::{TransportResponse, UploadEnvelope, UploadError, UploadTransport};

/// Transport answering every request with one canned result.
#[derive(Debug)]
pub struct CannedTransport {
    response: Result<TransportResponse, String>,
    pub sent: Mutex<Vec<UploadEnvelope>>,
}

impl CannedTransport {
    /// Answers with `status` and `body`.
    #[allow(dead_code)]
    pub fn responding(status: u16, body: &str) -> Self {
        Self {
            response: Ok(TransportResponse {
                status,
                body: body.as_bytes().to_vec(),
            }),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Fails every request at the transport level.
    #[allow(dead_code)]
    pub fn unreachable(reason: &str) -> Self {
        Self {
            response: Err(reason.to_string()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Number of requests sent so far.
    #[allow(dead_code)]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().expect("sent lock should work").len()
    }
}

impl UploadTransport for CannedTransport {
    fn send(&self, envelope: &UploadEnvelope) -> Result<TransportResponse, UploadError> {
        self.sent
            .lock()
            .expect("sent lock should work")
            .push(envelope.clone());
        self.response.clone().map_err(UploadError::Transport)
    }
}

/// Small valid data URL fixture.
#[allow(dead_code)]
pub fn fixture_image() -> DataUrl {
    DataUrl::from_bytes(PNG_MIME, &[0x89, b'P', b'N', b'G', 0x0d, 0x0a]).expect("fixture data url")
}
