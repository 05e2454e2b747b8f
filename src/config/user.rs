//! User configuration loading for exifbatch.
//!
//! This module handles loading user-wide configuration from the XDG config directory.
//! User config location: $XDG_CONFIG_HOME/exifbatch/exifbatch.toml
//! Fallback: the platform config directory reported by `dirs::config_dir()`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings::SessionSettings;

/// Errors raised while reading a settings file.
#[derive(Debug, Error)]
pub enum UserConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type UserConfigResult<T> = Result<T, UserConfigError>;

/// Returns the path to the user configuration file.
///
/// The path is determined by:
/// 1. If $XDG_CONFIG_HOME is set: $XDG_CONFIG_HOME/exifbatch/exifbatch.toml
/// 2. Otherwise: `dirs::config_dir()`/exifbatch/exifbatch.toml
///
/// Returns None if no config directory can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(xdg_config) if !xdg_config.is_empty() => PathBuf::from(xdg_config),
        _ => dirs::config_dir()?,
    };
    Some(base.join("exifbatch").join("exifbatch.toml"))
}

/// Load the user configuration file.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_user_config() -> UserConfigResult<Option<SessionSettings>> {
    let Some(path) = user_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }
    log::debug!(target: "exifbatch::config", "Loading user config from {}", path.display());
    load_settings_file(&path).map(Some)
}

/// Load settings from an explicit TOML file.
pub fn load_settings_file(path: &Path) -> UserConfigResult<SessionSettings> {
    let contents = fs::read_to_string(path).map_err(|source| UserConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| UserConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
