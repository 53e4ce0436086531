//! Environment-driven runtime configuration.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::AppError;

/// Endpoint used when `CAMSHOT_UPLOAD_URL` is unset.
pub const DEFAULT_UPLOAD_URL: &str = "http://127.0.0.1:10000/capturar";

const ENV_UPLOAD_URL: &str = "CAMSHOT_UPLOAD_URL";
const ENV_CAMERA_INDEX: &str = "CAMSHOT_CAMERA_INDEX";
const ENV_UPLOAD_TIMEOUT_SECS: &str = "CAMSHOT_UPLOAD_TIMEOUT_SECS";
const ENV_CAMERA_BACKEND: &str = "CAMSHOT_CAMERA_BACKEND";
const ENV_LOG_DIR: &str = "CAMSHOT_LOG_DIR";

/// Which camera backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraBackendKind {
    /// Platform camera through `nokhwa`.
    Native,
    /// Deterministic gradient source.
    Synthetic,
}

impl CameraBackendKind {
    /// Native when compiled with `native-camera`, synthetic otherwise.
    pub fn default_for_build() -> Self {
        if cfg!(feature = "native-camera") {
            Self::Native
        } else {
            Self::Synthetic
        }
    }

    /// Lowercase name as accepted by `CAMSHOT_CAMERA_BACKEND`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Synthetic => "synthetic",
        }
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `/capturar` endpoint.
    pub upload_url: String,
    /// Camera index passed to the backend.
    pub camera_index: u32,
    /// Upload request timeout; `None` waits indefinitely.
    pub upload_timeout: Option<Duration>,
    /// Camera backend selection.
    pub camera_backend: CameraBackendKind,
    /// Directory for per-run log files; `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when a variable holds an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, treating blank values as unset.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when a variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let upload_url = read(ENV_UPLOAD_URL).unwrap_or_else(|| DEFAULT_UPLOAD_URL.to_string());
        Url::parse(&upload_url)
            .map_err(|error| AppError::Config(format!("{ENV_UPLOAD_URL}={upload_url}: {error}")))?;

        let camera_index = match read(ENV_CAMERA_INDEX) {
            Some(raw) => raw.parse::<u32>().map_err(|error| {
                AppError::Config(format!("{ENV_CAMERA_INDEX}={raw}: {error}"))
            })?,
            None => 0,
        };

        let upload_timeout = match read(ENV_UPLOAD_TIMEOUT_SECS) {
            Some(raw) => {
                let seconds = raw.parse::<u64>().map_err(|error| {
                    AppError::Config(format!("{ENV_UPLOAD_TIMEOUT_SECS}={raw}: {error}"))
                })?;
                (seconds > 0).then(|| Duration::from_secs(seconds))
            }
            None => None,
        };

        let camera_backend = match read(ENV_CAMERA_BACKEND).map(|raw| raw.to_ascii_lowercase()) {
            None => CameraBackendKind::default_for_build(),
            Some(raw) if raw == "native" => CameraBackendKind::Native,
            Some(raw) if raw == "synthetic" => CameraBackendKind::Synthetic,
            Some(raw) => {
                return Err(AppError::Config(format!(
                    "{ENV_CAMERA_BACKEND}={raw}: expected `native` or `synthetic`"
                )));
            }
        };

        Ok(Self {
            upload_url,
            camera_index,
            upload_timeout,
            camera_backend,
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for value normalization.

    use super::*;

    #[test]
    fn blank_values_count_as_unset() {
        let config = AppConfig::from_lookup(|key: &str| match key {
            "CAMSHOT_UPLOAD_URL" | "CAMSHOT_LOG_DIR" => Some("   ".to_string()),
            _ => None,
        })
        .expect("blank values fall back to defaults");
        assert_eq!(config.upload_url, DEFAULT_UPLOAD_URL);
        assert_eq!(config.log_dir, None);
    }
}
