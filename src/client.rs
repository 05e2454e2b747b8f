//! High-level ExifTool client.
//!
//! [`ExifTool`] combines a [`Launcher`] for one-shot calls with a persistent
//! [`Session`] for everything that goes through the batch worker.

use std::collections::HashMap;
use std::path::Path;

use crate::bulk_delete::{self, BulkDeleteResult};
use crate::config::SessionSettings;
use crate::error::{ExifToolError, Result};
use crate::launcher::Launcher;
use crate::parser::{MetadataResult, StatusVocabulary, parse_response};
use crate::session::Session;

/// ExifTool client owning one batch worker.
///
/// The worker is shut down on [`ExifTool::shutdown`] or when the client is
/// dropped, whichever comes first.
#[derive(Debug)]
pub struct ExifTool {
    launcher: Launcher,
    session: Session,
    settings: SessionSettings,
    vocabulary: StatusVocabulary,
}

impl ExifTool {
    /// Validate the configured executable and start a worker.
    pub fn new(settings: SessionSettings) -> Result<Self> {
        let launcher = Launcher::validated(&settings.executable)?;
        let session = Session::start(&launcher, &settings)?;
        let vocabulary = settings.vocabulary();
        Ok(Self {
            launcher,
            session,
            settings,
            vocabulary,
        })
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    /// Send raw arguments to the worker and return its output.
    pub fn execute<S: AsRef<str>>(&mut self, args: &[S]) -> Result<String> {
        self.session.execute(args)
    }

    /// Send raw arguments and parse the output.
    pub fn execute_parsed<S: AsRef<str>>(&mut self, args: &[S]) -> Result<MetadataResult> {
        let output = self.session.execute(args)?;
        Ok(parse_response(&output, &self.vocabulary))
    }

    /// Read all tags of a file, keyed by tag name without group.
    pub fn read_metadata(&mut self, path: &Path) -> Result<HashMap<String, String>> {
        let result = self.execute_parsed(&[path_arg(path)?])?;
        Ok(result.into_tags())
    }

    /// Write tags to a file.
    ///
    /// Returns `Ok(false)` when ExifTool reports nothing updated or any error;
    /// only process-level problems are `Err`.
    pub fn write_metadata(&mut self, path: &Path, tags: &HashMap<String, String>) -> Result<bool> {
        let args = write_args(&self.settings, path, tags)?;
        let result = self.execute_parsed(&args)?;
        if !result.is_write_success() {
            log::warn!(
                target: "exifbatch::client",
                "Write to {} failed ({} updated, {} errors): {}",
                path.display(),
                result.updates(),
                result.errors(),
                result.output()
            );
        }
        Ok(result.is_write_success())
    }

    /// Delete `_original` backups under each path using one-shot processes.
    pub fn delete_originals<P: AsRef<Path>>(&self, paths: Option<&[P]>) -> Result<BulkDeleteResult> {
        bulk_delete::delete_originals(&self.launcher, paths)
    }

    /// ExifTool version via a one-shot `-ver` call.
    pub fn version(&self) -> Result<String> {
        self.launcher.version()
    }

    /// Shut the worker down now instead of on drop.
    pub fn shutdown(mut self) {
        self.session.shutdown();
    }
}

/// Worker arguments travel as UTF-8 lines, so a path that is not valid UTF-8
/// cannot be sent without naming a different file.
fn path_arg(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        ExifToolError::invalid_argument(
            path.to_string_lossy(),
            "worker paths must be valid UTF-8",
        )
    })
}

/// Build the argument list for a write: flags, `-TAG=VALUE` per tag sorted by
/// name, then the file.
pub fn write_args(
    settings: &SessionSettings,
    path: &Path,
    tags: &HashMap<String, String>,
) -> Result<Vec<String>> {
    let path = path_arg(path)?;
    let mut sorted: Vec<_> = tags.iter().collect();
    sorted.sort();

    let mut args: Vec<String> = settings
        .write_flags()
        .into_iter()
        .map(String::from)
        .collect();
    args.extend(sorted.into_iter().map(|(name, value)| format!("-{}={}", name, value)));
    args.push(path.to_string());
    Ok(args)
}
