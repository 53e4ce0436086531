//! Tracing subscriber setup with an optional per-run log file.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use crate::AppError;

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides the default `info` filter. With `log_dir`, output is
/// appended to `<YYYYMMDD_HHMMSS>_log.txt` inside it.
///
/// # Returns
/// Path of the log file when one was created.
///
/// # Errors
/// Returns [`AppError::Io`] when the log file cannot be created and
/// [`AppError::Logging`] when a subscriber is already installed.
pub fn init_logging(log_dir: Option<&Path>) -> Result<Option<PathBuf>, AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let path = dir.join(format!("{}_log.txt", timestamp_compact_utc()));
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|error| AppError::Logging(error.to_string()))?;
            Ok(Some(path))
        }
        None => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|error| AppError::Logging(error.to_string()))?;
            Ok(None)
        }
    }
}

/// UTC timestamp formatted as `YYYYMMDD_HHMMSS`.
pub fn timestamp_compact_utc() -> String {
    let now = OffsetDateTime::now_utc();
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}
