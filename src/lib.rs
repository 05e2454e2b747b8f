//! Client for the ExifTool command-line metadata tool.
//!
//! Commands either run as one-shot processes ([`Launcher`]) or go through a
//! persistent `-stay_open` batch worker ([`Session`]). [`ExifTool`] wraps both
//! behind read/write/delete operations.

pub mod bulk_delete;
pub mod client;
pub mod config;
pub mod datetime;
pub mod error;
pub mod launcher;
pub mod parser;
pub mod session;

pub use bulk_delete::BulkDeleteResult;
pub use client::ExifTool;
pub use config::SessionSettings;
pub use error::{ExifToolError, Result};
pub use launcher::Launcher;
pub use parser::{MetadataResult, StatusVocabulary, UnchangedPolicy};
pub use session::{Session, SessionState, ShutdownTimeout};
