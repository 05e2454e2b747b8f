//! Default configuration values for exifbatch.

use std::path::PathBuf;

/// Default shutdown timeout in milliseconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 10_000;

/// Returns the default ExifTool executable.
///
/// A bare file name is resolved through `PATH` by the launcher.
pub fn default_executable() -> PathBuf {
    if cfg!(target_os = "windows") {
        PathBuf::from("exiftool.exe")
    } else {
        PathBuf::from("exiftool")
    }
}

pub fn default_shutdown_timeout_ms() -> u64 {
    DEFAULT_SHUTDOWN_TIMEOUT_MS
}

pub fn default_overwrite_original() -> bool {
    true
}
