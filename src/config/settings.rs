use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::{default_executable, default_overwrite_original, default_shutdown_timeout_ms};
use crate::error::{ExifToolError, Result};
use crate::parser::{StatusVocabulary, UnchangedPolicy};
use crate::session::ShutdownTimeout;

/// Settings passed to a session at construction.
///
/// Every field has a default so partial TOML files are accepted:
///
/// ```toml
/// executable = "/usr/local/bin/exiftool"
/// shutdownTimeoutMs = 5000
/// responseTimeoutMs = 30000
/// ignoreMinorErrors = true
/// unchangedPolicy = "ignore"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SessionSettings {
    /// Path or bare name of the ExifTool executable
    pub executable: PathBuf,
    /// How long the worker gets to exit after the shutdown directive
    pub shutdown_timeout_ms: u64,
    /// Upper bound for a single response; `None` waits indefinitely
    pub response_timeout_ms: Option<u64>,
    /// Pass `-overwrite_original` on writes
    pub overwrite_original: bool,
    /// Pass `-F` (fix maker note offsets) on writes
    pub fix_offsets: bool,
    /// Pass `-m` (ignore minor errors) on writes
    pub ignore_minor_errors: bool,
    /// How "image files unchanged" status lines are counted
    pub unchanged_policy: UnchangedPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            response_timeout_ms: None,
            overwrite_original: default_overwrite_original(),
            fix_offsets: false,
            ignore_minor_errors: false,
            unchanged_policy: UnchangedPolicy::default(),
        }
    }
}

impl SessionSettings {
    /// Parse settings from a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ExifToolError::config(e.to_string()))
    }

    /// Returns a copy using a different executable.
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Validated shutdown timeout.
    pub fn shutdown_timeout(&self) -> Result<ShutdownTimeout> {
        ShutdownTimeout::new(Duration::from_millis(self.shutdown_timeout_ms))
    }

    pub fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout_ms.map(Duration::from_millis)
    }

    /// Flags prepended to every write command.
    pub fn write_flags(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.overwrite_original {
            flags.push("-overwrite_original");
        }
        if self.fix_offsets {
            flags.push("-F");
        }
        if self.ignore_minor_errors {
            flags.push("-m");
        }
        flags
    }

    /// Status vocabulary for read/write responses under the configured policy.
    pub fn vocabulary(&self) -> StatusVocabulary {
        StatusVocabulary::read_write(self.unchanged_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let settings = SessionSettings::from_toml_str("").unwrap();
        assert_eq!(settings, SessionSettings::default());
        assert_eq!(settings.shutdown_timeout_ms, 10_000);
        assert!(settings.overwrite_original);
        assert_eq!(settings.response_timeout(), None);
    }

    #[test]
    fn camel_case_fields_are_parsed() {
        let settings = SessionSettings::from_toml_str(
            r#"
            executable = "/opt/exiftool/exiftool"
            shutdownTimeoutMs = 5000
            responseTimeoutMs = 250
            fixOffsets = true
            ignoreMinorErrors = true
            overwriteOriginal = false
            unchangedPolicy = "ignore"
            "#,
        )
        .unwrap();

        assert_eq!(settings.executable, PathBuf::from("/opt/exiftool/exiftool"));
        assert_eq!(
            settings.shutdown_timeout().unwrap().as_duration(),
            Duration::from_secs(5)
        );
        assert_eq!(settings.response_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(settings.unchanged_policy, UnchangedPolicy::Ignore);
        assert_eq!(settings.write_flags(), vec!["-F", "-m"]);
    }

    #[test]
    fn unknown_field_is_a_config_error() {
        let err = SessionSettings::from_toml_str("shutdownTimeout = 3").unwrap_err();
        assert!(matches!(err, ExifToolError::Config { .. }), "got: {:?}", err);
    }

    #[test]
    fn out_of_range_shutdown_timeout_is_rejected() {
        let settings = SessionSettings {
            shutdown_timeout_ms: 0,
            ..SessionSettings::default()
        };
        assert!(settings.shutdown_timeout().is_err());
    }

    #[test]
    fn default_write_flags_only_overwrite_original() {
        assert_eq!(
            SessionSettings::default().write_flags(),
            vec!["-overwrite_original"]
        );
    }
}
