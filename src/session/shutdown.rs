//! Shutdown sequencing for the batch worker.
//!
//! Order: send the `-stay_open false` directive, wait up to the shutdown
//! timeout for a voluntary exit, force-terminate otherwise, then release both
//! pipes. The whole sequence runs at most once per session.

use std::process::{Child, ExitStatus};
use std::time::{Duration, Instant};

use super::framing;
use super::{Session, SessionState};
use crate::error::{ExifToolError, Result};

/// Interval between `try_wait` polls while waiting for the worker to exit.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Grace period between SIGTERM and SIGKILL during forced termination.
#[cfg(unix)]
const TERM_GRACE: Duration = Duration::from_secs(2);

/// How long a worker gets to exit on its own after the shutdown directive.
///
/// # Valid Range
///
/// - Minimum: 1 second
/// - Maximum: 60 seconds
/// - Default: 10 seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownTimeout(Duration);

impl ShutdownTimeout {
    const DEFAULT_SECS: u64 = 10;
    const MIN: Duration = Duration::from_secs(1);
    const MAX: Duration = Duration::from_secs(60);

    /// Create a validated timeout.
    ///
    /// Returns a configuration error outside the 1s..=60s range.
    pub fn new(duration: Duration) -> Result<Self> {
        if duration < Self::MIN || duration > Self::MAX {
            return Err(ExifToolError::config(format!(
                "shutdown timeout must be between {:?} and {:?}, got {:?}",
                Self::MIN,
                Self::MAX,
                duration
            )));
        }
        Ok(Self(duration))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl Default for ShutdownTimeout {
    fn default() -> Self {
        Self(Duration::from_secs(Self::DEFAULT_SECS))
    }
}

impl Session {
    /// Shut the worker down and release its pipes.
    ///
    /// Idempotent: calls after the first return immediately. Never fails;
    /// problems are logged and resolved by force-terminating the process.
    /// When this returns the worker is no longer running.
    pub fn shutdown(&mut self) {
        if self.state.is_disposed() {
            log::trace!(
                target: "exifbatch::session",
                "Session {} already {:?}, skipping shutdown",
                self.id(),
                self.state
            );
            return;
        }
        self.state = SessionState::ShuttingDown;

        log::debug!(
            target: "exifbatch::session",
            "Shutting down session {}",
            self.id()
        );

        if let Some(stdin) = self.stdin.as_mut()
            && let Err(e) = framing::write_shutdown(stdin)
        {
            // Usually a broken pipe from a worker that is already gone.
            log::debug!(
                target: "exifbatch::session",
                "Failed to send shutdown directive: {}",
                e
            );
        }

        let timeout = self.shutdown_timeout.as_duration();
        match wait_for_exit(&mut self.child, timeout) {
            Some(status) => {
                log::debug!(
                    target: "exifbatch::session",
                    "Worker {} exited with {}",
                    self.id(),
                    status
                );
            }
            None => {
                log::warn!(
                    target: "exifbatch::session",
                    "Worker {} did not exit within {:?}, terminating",
                    self.id(),
                    timeout
                );
                terminate(&mut self.child);
            }
        }

        self.stdin = None;
        self.stdout = None;
        self.state = SessionState::Closed;
    }
}

/// Wait for the child to exit with a timeout.
///
/// Returns the exit status if the process exited, or None if the timeout
/// elapsed or its status could not be queried.
pub(crate) fn wait_for_exit(child: &mut Child, timeout: Duration) -> Option<ExitStatus> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    return None;
                }
                std::thread::sleep(EXIT_POLL_INTERVAL);
            }
            Err(e) => {
                log::debug!(
                    target: "exifbatch::session",
                    "Failed to query worker status: {}",
                    e
                );
                return None;
            }
        }
    }
}

/// Force-terminate the child and reap it.
///
/// **Unix**: SIGTERM, up to 2 seconds grace, then SIGKILL.
/// **Elsewhere**: `Child::kill` directly.
pub(crate) fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        let pid = Pid::from_raw(child.id() as i32);
        if kill(pid, Signal::SIGTERM).is_ok() && wait_for_exit(child, TERM_GRACE).is_some() {
            return;
        }
    }

    if let Err(e) = child.kill() {
        log::debug!(
            target: "exifbatch::session",
            "Failed to kill worker {}: {}",
            child.id(),
            e
        );
    }
    // Reap to avoid leaving a zombie.
    let _ = child.wait();
}
