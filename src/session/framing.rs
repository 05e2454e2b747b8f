//! Batch wire format for commands sent to the worker.
//!
//! Format: one argument per line, then `-execute`.
//! Shutdown is the two-line directive `-stay_open` / `false` with no marker.

use std::io::Write;

use crate::error::{ExifToolError, Result};

/// Line that tells the worker to run the accumulated command group.
pub const EXECUTE_MARKER: &str = "-execute";

/// Directive that makes the worker leave batch mode and exit.
pub const SHUTDOWN_DIRECTIVE: [&str; 2] = ["-stay_open", "false"];

/// Serialize `args` into a command frame.
///
/// Arguments containing a line break are rejected since they would be read
/// back as two arguments.
pub fn frame<S: AsRef<str>>(args: &[S]) -> Result<String> {
    let mut frame = String::new();
    for arg in args {
        let arg = arg.as_ref();
        if arg.contains(['\n', '\r']) {
            return Err(ExifToolError::invalid_argument(
                arg,
                "arguments must not contain line breaks",
            ));
        }
        frame.push_str(arg);
        frame.push('\n');
    }
    frame.push_str(EXECUTE_MARKER);
    frame.push('\n');
    Ok(frame)
}

/// Write a command frame and flush so the worker starts immediately.
///
/// Nothing is written when an argument is invalid.
pub fn write_command<W, S>(writer: &mut W, args: &[S]) -> Result<()>
where
    W: Write + ?Sized,
    S: AsRef<str>,
{
    let frame = frame(args)?;
    writer.write_all(frame.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Write the shutdown directive and flush.
pub fn write_shutdown<W: Write + ?Sized>(writer: &mut W) -> std::io::Result<()> {
    for line in SHUTDOWN_DIRECTIVE {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}
