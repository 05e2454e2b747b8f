//! Configuration for the ExifTool client.
//!
//! Settings are plain serde structs loadable from TOML. Layering is
//! defaults < user config < explicit file < command-line overrides; the
//! binary performs the last two steps.

pub mod defaults;
pub mod settings;
pub mod user;

pub use settings::SessionSettings;
pub use user::{
    UserConfigError, UserConfigResult, load_settings_file, load_user_config, user_config_path,
};
