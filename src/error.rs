//! Error handling types for exifbatch
//!
//! This module provides the error type shared by the launcher, the persistent
//! session and the client facade.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced to callers of the ExifTool client
#[derive(Debug, Error)]
pub enum ExifToolError {
    /// Executable missing or the OS refused to start it
    #[error("Failed to launch {}: {source}", path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Worker exited immediately or its pipes were unavailable
    #[error("Failed to start ExifTool worker: {message}")]
    Startup { message: String },

    /// Command issued after the session was disposed
    #[error("ExifTool session is closed")]
    SessionClosed,

    /// Argument the worker cannot receive intact
    #[error("Invalid argument {argument:?}: {reason}")]
    InvalidArgument {
        argument: String,
        reason: &'static str,
    },

    /// Worker produced no sentinel within the configured response timeout
    #[error("Timed out after {0:?} waiting for ExifTool response")]
    ResponseTimeout(Duration),

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// IO error on the worker pipes
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ExifTool operations
pub type Result<T> = std::result::Result<T, ExifToolError>;

/// Helper functions for common error patterns
impl ExifToolError {
    /// Create a launch error for the given executable
    pub fn launch(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExifToolError::Launch {
            path: path.into(),
            source,
        }
    }

    /// Create a startup error
    pub fn startup(message: impl Into<String>) -> Self {
        ExifToolError::Startup {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(argument: impl Into<String>, reason: &'static str) -> Self {
        ExifToolError::InvalidArgument {
            argument: argument.into(),
            reason,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        ExifToolError::Config {
            message: message.into(),
        }
    }
}
