//! Reading sentinel-delimited responses from the worker's stdout.
//!
//! A response ends at the first line that is blank or starts with
//! [`READY_SENTINEL`]; the terminator itself is discarded. End of stream also
//! ends the response, which is how a worker that died mid-command shows up.

use std::io::{self, BufRead, BufReader, Read};
use std::time::{Duration, Instant};

use crate::error::{ExifToolError, Result};

/// Line the worker prints once a command group is complete.
pub const READY_SENTINEL: &str = "{ready}";

/// Blocking readiness check for a readable stream.
///
/// Used to bound reads by a deadline without a background reader thread.
pub trait Readiness {
    /// Returns `Ok(true)` if a read would not block, `Ok(false)` if `timeout`
    /// elapsed first. End of stream counts as readable.
    fn wait_readable(&self, timeout: Duration) -> io::Result<bool>;
}

#[cfg(unix)]
impl Readiness for std::process::ChildStdout {
    fn wait_readable(&self, timeout: Duration) -> io::Result<bool> {
        use nix::errno::Errno;
        use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
        use std::os::fd::AsFd;

        // poll() takes at most u16::MAX ms; callers loop until their deadline.
        let millis = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
        let mut fds = [PollFd::new(self.as_fd(), PollFlags::POLLIN)];
        loop {
            match poll(&mut fds, PollTimeout::from(millis)) {
                Ok(0) => return Ok(false),
                Ok(_) => return Ok(true),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(io::Error::from(e)),
            }
        }
    }
}

// Without poll(2) reads stay blocking and the response timeout is not enforced.
#[cfg(not(unix))]
impl Readiness for std::process::ChildStdout {
    fn wait_readable(&self, _timeout: Duration) -> io::Result<bool> {
        Ok(true)
    }
}

impl<T: AsRef<[u8]>> Readiness for io::Cursor<T> {
    fn wait_readable(&self, _timeout: Duration) -> io::Result<bool> {
        Ok(true)
    }
}

/// How a response frame ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A `{ready}` line
    Sentinel,
    /// A blank or whitespace-only line
    BlankLine,
    /// The stream closed (worker exited)
    EndOfStream,
}

/// Line reader over the worker's stdout that can honour a deadline.
pub struct PipeReader<R> {
    inner: BufReader<R>,
    pending: Vec<u8>,
}

impl<R: Read + Readiness> PipeReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            pending: Vec::new(),
        }
    }

    /// Read the next line without its terminator.
    ///
    /// Returns `Ok(None)` at end of stream and an `ErrorKind::TimedOut` error
    /// when `deadline` passes before a full line arrives. Bytes of a partial
    /// line are kept for the next call.
    pub fn next_line(&mut self, deadline: Option<Instant>) -> io::Result<Option<String>> {
        loop {
            let buffered = self.inner.buffer();
            if let Some(pos) = buffered.iter().position(|&b| b == b'\n') {
                self.pending.extend_from_slice(&buffered[..pos]);
                self.inner.consume(pos + 1);
                return Ok(Some(self.take_pending()));
            }
            let len = buffered.len();
            self.pending.extend_from_slice(buffered);
            self.inner.consume(len);

            if let Some(deadline) = deadline {
                self.wait_until(deadline)?;
            }

            // The internal buffer is empty here, so this performs exactly one read.
            let at_eof = match self.inner.fill_buf() {
                Ok(filled) => filled.is_empty(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if at_eof {
                return Ok((!self.pending.is_empty()).then(|| self.take_pending()));
            }
        }
    }

    fn wait_until(&self, deadline: Instant) -> io::Result<()> {
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "no output before deadline",
                ));
            }
            if self.inner.get_ref().wait_readable(deadline - now)? {
                return Ok(());
            }
        }
    }

    fn take_pending(&mut self) -> String {
        let mut line = std::mem::take(&mut self.pending);
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        match String::from_utf8(line) {
            Ok(line) => line,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

/// Returns how `line` ends a response, or `None` for an ordinary output line.
pub fn terminator(line: &str) -> Option<Termination> {
    if line.trim().is_empty() {
        Some(Termination::BlankLine)
    } else if line.starts_with(READY_SENTINEL) {
        Some(Termination::Sentinel)
    } else {
        None
    }
}

/// Read one response frame, reporting how it ended.
///
/// The returned text excludes the terminator and is trimmed.
pub fn read_frame<R: Read + Readiness>(
    reader: &mut PipeReader<R>,
    timeout: Option<Duration>,
) -> Result<(String, Termination)> {
    let deadline = timeout.map(|t| Instant::now() + t);
    let mut text = String::new();

    let termination = loop {
        let line = match reader.next_line(deadline) {
            Ok(Some(line)) => line,
            Ok(None) => break Termination::EndOfStream,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                return Err(ExifToolError::ResponseTimeout(timeout.unwrap_or_default()));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(termination) = terminator(&line) {
            break termination;
        }
        log::trace!(target: "exifbatch::session", "<- {}", line);
        text.push_str(&line);
        text.push('\n');
    };

    Ok((text.trim().to_string(), termination))
}

/// Read one response and return its trimmed text.
pub fn read_response<R: Read + Readiness>(
    reader: &mut PipeReader<R>,
    timeout: Option<Duration>,
) -> Result<String> {
    read_frame(reader, timeout).map(|(text, _)| text)
}
