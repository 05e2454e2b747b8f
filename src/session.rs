//! Persistent ExifTool batch worker.
//!
//! A [`Session`] owns one `exiftool -stay_open true -@ -` process and its
//! pipes. Commands are framed onto stdin ([`framing`]) and answered on stdout
//! up to the `{ready}` sentinel ([`reader`]). Dropping the session runs the
//! shutdown sequence ([`shutdown`]), so the worker never outlives its owner.
//!
//! The session is strictly request/response: `execute` takes `&mut self`, so
//! sharing one between threads requires an external `Mutex`.

pub mod framing;
pub mod reader;
pub mod shutdown;
pub mod state;

use std::process::{Child, ChildStdin, ChildStdout};
use std::time::Duration;

use crate::config::SessionSettings;
use crate::error::{ExifToolError, Result};
use crate::launcher::{Launcher, WorkerProcess};

pub use reader::{PipeReader, READY_SENTINEL, Termination};
pub use shutdown::ShutdownTimeout;
pub use state::SessionState;

/// Upper bound for the startup handshake when no response timeout is configured.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// A running batch worker.
pub struct Session {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<PipeReader<ChildStdout>>,
    state: SessionState,
    shutdown_timeout: ShutdownTimeout,
    response_timeout: Option<Duration>,
    worker_version: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("pid", &self.child.id())
            .field("state", &self.state)
            .field("worker_version", &self.worker_version)
            .finish()
    }
}

impl Session {
    /// Spawn a worker and complete the startup handshake.
    ///
    /// The handshake sends `-ver` and waits for the sentinel. A worker that
    /// exits before answering fails with [`ExifToolError::Startup`].
    pub fn start(launcher: &Launcher, settings: &SessionSettings) -> Result<Self> {
        let shutdown_timeout = settings.shutdown_timeout()?;
        let WorkerProcess {
            child,
            stdin,
            stdout,
        } = launcher.spawn_worker()?;

        let mut session = Self {
            child,
            stdin: Some(stdin),
            stdout: Some(PipeReader::new(stdout)),
            state: SessionState::Created,
            shutdown_timeout,
            response_timeout: settings.response_timeout(),
            worker_version: String::new(),
        };

        if let Ok(Some(status)) = session.child.try_wait() {
            session.close_failed();
            return Err(ExifToolError::startup(format!(
                "worker exited immediately with {}",
                status
            )));
        }

        match session.handshake() {
            Ok(version) => {
                session.worker_version = version;
                session.state = SessionState::Running;
                log::info!(
                    target: "exifbatch::session",
                    "Started ExifTool {} worker (pid {})",
                    session.worker_version,
                    session.id()
                );
                Ok(session)
            }
            Err(e) => {
                session.close_failed();
                Err(e)
            }
        }
    }

    fn handshake(&mut self) -> Result<String> {
        let timeout = self.response_timeout.unwrap_or(HANDSHAKE_TIMEOUT);
        let (Some(stdin), Some(stdout)) = (self.stdin.as_mut(), self.stdout.as_mut()) else {
            return Err(ExifToolError::startup("worker pipes are unavailable"));
        };

        framing::write_command(stdin, &["-ver"])
            .map_err(|e| ExifToolError::startup(format!("handshake write failed: {}", e)))?;

        match reader::read_frame(stdout, Some(timeout)) {
            Ok((version, Termination::Sentinel)) => Ok(version),
            Ok((_, Termination::BlankLine)) => Err(ExifToolError::startup(
                "worker answered the handshake without a ready sentinel",
            )),
            Ok((_, Termination::EndOfStream)) => Err(ExifToolError::startup(
                "worker exited during the handshake",
            )),
            Err(ExifToolError::ResponseTimeout(t)) => Err(ExifToolError::startup(format!(
                "no handshake response within {:?}",
                t
            ))),
            Err(e) => Err(ExifToolError::startup(format!("handshake failed: {}", e))),
        }
    }

    /// Tear down a worker that never reached `Running`.
    fn close_failed(&mut self) {
        self.stdin = None;
        self.stdout = None;
        if !matches!(self.child.try_wait(), Ok(Some(_))) {
            shutdown::terminate(&mut self.child);
        }
        self.state = SessionState::Closed;
    }

    /// Run one command group and return the worker's trimmed output.
    ///
    /// Blocks until the `{ready}` sentinel, a blank line, or end of stream.
    /// Returns an empty string without writing anything if the worker has
    /// already exited. Fails with [`ExifToolError::SessionClosed`] after
    /// shutdown. A response timeout shuts the session down, since the
    /// unread remainder would corrupt every later response.
    pub fn execute<S: AsRef<str>>(&mut self, args: &[S]) -> Result<String> {
        if !self.state.accepts_commands() {
            return Err(ExifToolError::SessionClosed);
        }
        if self.has_exited() {
            log::warn!(
                target: "exifbatch::session",
                "Worker {} has exited, returning empty response",
                self.id()
            );
            return Ok(String::new());
        }

        let result = {
            let (Some(stdin), Some(stdout)) = (self.stdin.as_mut(), self.stdout.as_mut()) else {
                return Err(ExifToolError::SessionClosed);
            };
            log::debug!(
                target: "exifbatch::session",
                "-> {:?}",
                args.iter().map(AsRef::as_ref).collect::<Vec<&str>>()
            );
            match framing::write_command(stdin, args) {
                Ok(()) => reader::read_response(stdout, self.response_timeout),
                Err(e) => Err(e),
            }
        };

        match result {
            Err(ExifToolError::Io(e))
                if e.kind() == std::io::ErrorKind::BrokenPipe && self.has_exited() =>
            {
                log::warn!(
                    target: "exifbatch::session",
                    "Worker {} exited before reading the command",
                    self.id()
                );
                Ok(String::new())
            }
            Err(ExifToolError::ResponseTimeout(t)) => {
                log::warn!(
                    target: "exifbatch::session",
                    "No response from worker {} within {:?}, closing session",
                    self.id(),
                    t
                );
                self.shutdown();
                Err(ExifToolError::ResponseTimeout(t))
            }
            other => other,
        }
    }

    /// Process id of the worker.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Version reported by the worker during the handshake.
    pub fn worker_version(&self) -> &str {
        &self.worker_version
    }

    /// Whether the worker process is still alive.
    pub fn is_running(&mut self) -> bool {
        !self.has_exited()
    }

    fn has_exited(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(_)) => true,
            Ok(None) => false,
            Err(e) => {
                log::debug!(
                    target: "exifbatch::session",
                    "Failed to query worker status: {}",
                    e
                );
                false
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
