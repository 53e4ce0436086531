//! Single-threaded event loop driving the controller.
//!
//! Input lines and job completions arrive on one channel. Camera acquisition
//! and uploads run as detached worker jobs that post exactly one completion
//! event each; only the loop thread touches [`AppController`].

use std::io::Write;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use camshot_capture::{CameraBackend, CaptureError, MediaConstraints, StreamHandle};
use camshot_upload::{UploadClient, UploadError, UploadReceipt};

use crate::AppError;
use crate::controller::{AppController, ToggleAction, UploadJob};

/// Backend name that marks generated frames in the rendered status line.
const SYNTHETIC_BACKEND_NAME: &str = "synthetic";

/// Message handled by the event loop.
#[derive(Debug)]
pub enum AppEvent {
    /// One line typed by the user.
    Input(String),
    /// Input stream reached end of file.
    InputClosed,
    /// A camera acquisition job finished.
    AcquisitionFinished(Result<StreamHandle, CaptureError>),
    /// An upload job finished.
    UploadFinished(Result<UploadReceipt, UploadError>),
}

/// Shell command parsed from one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    /// Switch the camera on or off.
    Toggle,
    /// Capture the current frame and upload it.
    Capture,
    /// Print the current state.
    Status,
    /// List cameras.
    Devices,
    /// Print command help.
    Help,
    /// Leave the loop once running jobs finish.
    Quit,
}

impl ShellCommand {
    /// Parses one input line. Blank lines parse to `None`.
    ///
    /// # Errors
    /// Returns the trimmed input when it is not a known command.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let command = match line.trim().to_ascii_lowercase().as_str() {
            "" => return Ok(None),
            "t" | "toggle" => Self::Toggle,
            "c" | "capture" => Self::Capture,
            "s" | "status" => Self::Status,
            "d" | "devices" => Self::Devices,
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            _ => return Err(line.trim().to_string()),
        };
        Ok(Some(command))
    }
}

/// Whether the loop keeps running after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    /// Keep processing events.
    Continue,
    /// Stop; no jobs are in flight.
    Exit,
}

/// Event loop state.
pub struct Runtime {
    controller: AppController,
    backend: Arc<dyn CameraBackend>,
    client: UploadClient,
    events_tx: Sender<AppEvent>,
    jobs_in_flight: usize,
    quitting: bool,
}

impl Runtime {
    /// Creates the runtime and the receiving end of its event channel.
    pub fn new(
        controller: AppController,
        backend: Arc<dyn CameraBackend>,
        client: UploadClient,
    ) -> (Self, Receiver<AppEvent>) {
        let (events_tx, events_rx) = mpsc::channel();
        (
            Self {
                controller,
                backend,
                client,
                events_tx,
                jobs_in_flight: 0,
                quitting: false,
            },
            events_rx,
        )
    }

    /// Returns a sender for input producers.
    pub fn sender(&self) -> Sender<AppEvent> {
        self.events_tx.clone()
    }

    /// Current controller state.
    pub fn controller(&self) -> &AppController {
        &self.controller
    }

    /// Number of acquisition/upload jobs not yet completed.
    pub fn jobs_in_flight(&self) -> usize {
        self.jobs_in_flight
    }

    /// Processes events until quit (or end of input) and no job is running,
    /// then releases the camera.
    ///
    /// # Errors
    /// Returns [`AppError::Io`] when writing to `out` fails.
    pub fn run(&mut self, events: Receiver<AppEvent>, out: &mut dyn Write) -> Result<(), AppError> {
        self.render_status(out)?;
        while let Ok(event) = events.recv() {
            if self.handle_event(event, out)? == LoopControl::Exit {
                break;
            }
        }
        self.controller.shutdown();
        Ok(())
    }

    /// Handles one event.
    ///
    /// # Errors
    /// Returns [`AppError::Io`] when writing to `out` fails.
    pub fn handle_event(
        &mut self,
        event: AppEvent,
        out: &mut dyn Write,
    ) -> Result<LoopControl, AppError> {
        match event {
            AppEvent::Input(line) => match ShellCommand::parse(&line) {
                Ok(Some(command)) => self.handle_command(command, out)?,
                Ok(None) => {}
                Err(unknown) => {
                    writeln!(out, "unknown command `{unknown}`")?;
                    write_help(out)?;
                }
            },
            AppEvent::InputClosed => self.quitting = true,
            AppEvent::AcquisitionFinished(result) => {
                self.jobs_in_flight = self.jobs_in_flight.saturating_sub(1);
                self.controller.complete_acquisition(result);
                self.render_status(out)?;
            }
            AppEvent::UploadFinished(result) => {
                self.jobs_in_flight = self.jobs_in_flight.saturating_sub(1);
                let _ = self.controller.complete_upload(result);
                self.render_status(out)?;
            }
        }

        if self.quitting && self.jobs_in_flight == 0 {
            return Ok(LoopControl::Exit);
        }
        Ok(LoopControl::Continue)
    }

    fn handle_command(
        &mut self,
        command: ShellCommand,
        out: &mut dyn Write,
    ) -> Result<(), AppError> {
        match command {
            ShellCommand::Toggle => match self.controller.request_toggle() {
                ToggleAction::AcquireRequested(constraints) => {
                    writeln!(out, "requesting camera access...")?;
                    self.spawn_acquisition(constraints);
                }
                ToggleAction::Released { .. } => self.render_status(out)?,
                ToggleAction::IgnoredPending => {
                    writeln!(out, "camera access request already pending")?;
                }
            },
            ShellCommand::Capture => {
                match self.controller.prepare_capture(unix_timestamp_millis()) {
                    Ok(job) => {
                        writeln!(out, "uploading {}x{} capture...", job.width, job.height)?;
                        self.spawn_upload(job);
                    }
                    Err(_) => self.render_status(out)?,
                }
            }
            ShellCommand::Status => self.render_status(out)?,
            ShellCommand::Devices => match self.backend.list_devices() {
                Ok(devices) if devices.is_empty() => writeln!(out, "no cameras found")?,
                Ok(devices) => {
                    for device in devices {
                        writeln!(
                            out,
                            "  [{}] {} ({})",
                            device.index, device.name, device.description
                        )?;
                    }
                }
                Err(error) => {
                    tracing::error!(
                        stage = "camera",
                        action = "list_failed",
                        error = %error,
                        "device enumeration failed"
                    );
                    writeln!(out, "device enumeration failed: {error}")?;
                }
            },
            ShellCommand::Help => write_help(out)?,
            ShellCommand::Quit => self.quitting = true,
        }
        Ok(())
    }

    fn spawn_acquisition(&mut self, constraints: MediaConstraints) {
        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();
        self.spawn_job(
            "camshot-acquire",
            move || {
                let result = StreamHandle::acquire(backend.as_ref(), &constraints);
                let _ = events.send(AppEvent::AcquisitionFinished(result));
            },
            |reason| AppEvent::AcquisitionFinished(Err(CaptureError::Backend(reason))),
        );
    }

    fn spawn_upload(&mut self, job: UploadJob) {
        let client = self.client.clone();
        let events = self.events_tx.clone();
        self.spawn_job(
            "camshot-upload",
            move || {
                let result = client.upload_snapshot(&job.image);
                let _ = events.send(AppEvent::UploadFinished(result));
            },
            |reason| AppEvent::UploadFinished(Err(UploadError::Transport(reason))),
        );
    }

    /// Runs `work` on a detached thread. A spawn failure is reported through
    /// the channel as the job's completion so the pending state still clears.
    fn spawn_job<F, E>(&mut self, name: &str, work: F, on_spawn_error: E)
    where
        F: FnOnce() + Send + 'static,
        E: FnOnce(String) -> AppEvent,
    {
        self.jobs_in_flight += 1;
        if let Err(error) = thread::Builder::new().name(name.to_string()).spawn(work) {
            tracing::error!(
                stage = "runtime",
                action = "spawn_failed",
                job = name,
                error = %error,
                "worker thread could not start"
            );
            let _ = self
                .events_tx
                .send(on_spawn_error(format!("worker thread spawn failed: {error}")));
        }
    }

    fn render_status(&self, out: &mut dyn Write) -> Result<(), AppError> {
        let ui = self.controller.ui();
        let preview = ui.preview_source.as_deref().unwrap_or("none");
        let source = if self.backend.name() == SYNTHETIC_BACKEND_NAME {
            " [synthetic camera]"
        } else {
            ""
        };
        writeln!(
            out,
            "<{}> preview={}{} | {}",
            ui.toggle.caption(),
            preview,
            source,
            ui.status
        )?;
        out.flush()?;
        Ok(())
    }
}

fn write_help(out: &mut dyn Write) -> Result<(), AppError> {
    writeln!(
        out,
        "commands: t(oggle) camera, c(apture) photo, s(tatus), d(evices), h(elp), q(uit)"
    )?;
    Ok(())
}

/// Current Unix time in milliseconds, zero when the clock is before the epoch.
pub fn unix_timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis() as u64)
}
