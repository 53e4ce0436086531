//! Shared fixtures for app integration tests.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use camshot_app::AppController;
use camshot_capture::MediaConstraints;
use camshot_upload::{
    TransportResponse, UploadClient, UploadEnvelope, UploadError, UploadTransport,
};

/// Endpoint used by every fixture client.
#[allow(dead_code)]
pub const ENDPOINT: &str = "http://127.0.0.1:10000/capturar";

/// Transport answering every request with one canned result and counting calls.
#[derive(Debug)]
pub struct CannedTransport {
    response: Result<TransportResponse, String>,
    sent: Mutex<Vec<UploadEnvelope>>,
}

impl CannedTransport {
    /// Answers with `status` and `body`.
    #[allow(dead_code)]
    pub fn responding(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(TransportResponse {
                status,
                body: body.as_bytes().to_vec(),
            }),
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Fails every request before a response arrives.
    #[allow(dead_code)]
    pub fn unreachable(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(reason.to_string()),
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Requests sent so far.
    #[allow(dead_code)]
    pub fn sent(&self) -> Vec<UploadEnvelope> {
        self.sent.lock().expect("sent lock should work").clone()
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

/// Client bound to [`ENDPOINT`] over `transport`.
#[allow(dead_code)]
pub fn client_with(transport: Arc<CannedTransport>) -> UploadClient {
    UploadClient::new(ENDPOINT, transport).expect("fixture client should build")
}

/// Controller with the camera off, video-only on device 0.
#[allow(dead_code)]
pub fn fresh_controller() -> AppController {
    AppController::new("0.1.0", MediaConstraints::video_only(0))
}

/// In-memory sink for formatted log output.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Captured output as UTF-8 text.
    #[allow(dead_code)]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log lock should work")).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log lock should work")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a thread-local subscriber and returns the captured log text.
#[allow(dead_code)]
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();

    let value = tracing::subscriber::with_default(subscriber, f);
    (value, buffer.contents())
}
