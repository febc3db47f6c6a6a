//! Unified path management for EduSmart client files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/edusmart/          # Config directory
//! ├── config.toml              # Client configuration
//! ├── preferences.toml         # Stored campus/year preferences
//! └── session.json             # Persisted session (token + user)
//! ```

use std::path::PathBuf;

const APP_DIR_NAME: &str = "edusmart";

/// Errors that can occur during path resolution.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Home/config directory could not be determined.
    #[error("Cannot find config directory")]
    ConfigDirNotFound,
}

impl From<PathError> for edusmart_core::EduError {
    fn from(err: PathError) -> Self {
        edusmart_core::EduError::config(err.to_string())
    }
}

pub struct EduPaths;

impl EduPaths {
    /// Returns the client configuration directory (e.g. `~/.config/edusmart/`).
    ///
    /// `EDUSMART_CONFIG_DIR` overrides the platform default.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        if let Some(dir) = std::env::var_os("EDUSMART_CONFIG_DIR") {
            return Ok(PathBuf::from(dir));
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn preferences_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("preferences.toml"))
    }

    /// Returns the path to the persisted session.
    ///
    /// # Security Note
    ///
    /// The file holds a bearer token; it is written with mode 600 on Unix.
    pub fn session_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("session.json"))
    }
}
