#![warn(missing_docs)]
//! # camshot-app binary
//!
//! Console entry point for camshot.

/// CLI entry point.
fn main() {
    if let Err(error) = shell::run() {
        eprintln!("failed to start camshot: {error}");
        std::process::exit(1);
    }
}

mod shell {
    //! Line-oriented console shell: one toggle command, one capture command,
    //! and a status line rendered after every change.

    use std::io::{self, BufRead};
    use std::sync::Arc;
    use std::sync::mpsc::Sender;
    use std::thread;

    use camshot_app::{
        AppConfig, AppController, AppError, AppEvent, CameraBackendKind, Runtime, app_version,
        build_backend, init_logging, is_https_endpoint,
    };
    use camshot_capture::MediaConstraints;
    use camshot_upload::{HttpTransport, UploadClient};

    /// Starts the shell and blocks until the user quits.
    pub fn run() -> Result<(), AppError> {
        let config = AppConfig::from_env()?;
        let log_file = init_logging(config.log_dir.as_deref())?;

        tracing::info!(
            stage = "bootstrap",
            action = "started",
            version = app_version(),
            backend = ?config.camera_backend,
            endpoint = %config.upload_url,
            log_file = ?log_file,
            "camshot starting"
        );
        if !is_https_endpoint(&config.upload_url) {
            tracing::warn!(
                stage = "bootstrap",
                action = "plaintext_endpoint",
                endpoint = %config.upload_url,
                "captures will be uploaded without TLS"
            );
        }

        let backend = build_backend(config.camera_backend)?;
        if config.camera_backend == CameraBackendKind::Synthetic {
            tracing::warn!(
                stage = "bootstrap",
                action = "synthetic_camera",
                "no real camera in use; frames are generated"
            );
        }
        let transport = Arc::new(HttpTransport::new(config.upload_timeout)?);
        let client = UploadClient::new(&config.upload_url, transport)?;
        let controller = AppController::new(
            app_version(),
            MediaConstraints::video_only(config.camera_index),
        );

        let (mut runtime, events) = Runtime::new(controller, backend, client);
        spawn_input_reader(runtime.sender())?;

        println!(
            "camshot {} ({} camera)",
            app_version(),
            config.camera_backend.as_str()
        );
        println!("commands: t(oggle) camera, c(apture) photo, s(tatus), d(evices), h(elp), q(uit)");

        let stdout = io::stdout();
        let mut out = stdout.lock();
        runtime.run(events, &mut out)?;
        tracing::info!(stage = "bootstrap", action = "stopped", "camshot exiting");
        Ok(())
    }

    fn spawn_input_reader(events: Sender<AppEvent>) -> Result<(), AppError> {
        thread::Builder::new()
            .name("camshot-input".to_string())
            .spawn(move || {
                let stdin = io::stdin();
                for line in stdin.lock().lines() {
                    match line {
                        Ok(line) => {
                            if events.send(AppEvent::Input(line)).is_err() {
                                return;
                            }
                        }
                        Err(error) => {
                            tracing::error!(
                                stage = "input",
                                action = "read_failed",
                                error = %error,
                                "stdin read failed"
                            );
                            break;
                        }
                    }
                }
                let _ = events.send(AppEvent::InputClosed);
            })?;
        Ok(())
    }
}
