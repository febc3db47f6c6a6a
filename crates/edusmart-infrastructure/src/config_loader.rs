//! Client configuration loading.
//!
//! Reads `config.toml` from the config directory, then applies environment
//! overrides. A missing file is not an error; defaults apply.

use crate::paths::EduPaths;
use crate::storage::AtomicTomlFile;
use edusmart_core::config::ClientConfig;
use edusmart_core::error::{EduError, Result};
use std::path::{Path, PathBuf};

pub const ENV_API_URL: &str = "EDUSMART_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "EDUSMART_TIMEOUT_SECS";
pub const ENV_LOG: &str = "EDUSMART_LOG";

pub struct ConfigLoader {
    file: AtomicTomlFile<ClientConfig>,
}

impl ConfigLoader {
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(EduPaths::config_file()?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads the file and applies process environment overrides.
    pub fn load(&self) -> Result<ClientConfig> {
        let config = self.load_file()?;
        apply_overrides(config, |name| std::env::var(name).ok())
    }

    /// Loads the file only.
    pub fn load_file(&self) -> Result<ClientConfig> {
        let config = self.file.load()?.unwrap_or_default();
        tracing::debug!(
            "[ConfigLoader] Loaded config from {} (api_base_url={})",
            self.file.path().display(),
            config.api_base_url
        );
        Ok(config)
    }

    /// Writes `config` to disk, e.g. to persist `--api-url` from the CLI.
    pub fn save(&self, config: &ClientConfig) -> Result<()> {
        self.file.save(config)?;
        Ok(())
    }
}

/// Applies overrides from `lookup` (normally the process environment).
pub fn apply_overrides<F>(mut config: ClientConfig, lookup: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        config.api_base_url = url.trim().to_string();
    }

    if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
        config.request_timeout_secs = raw.trim().parse().map_err(|_| {
            EduError::config(format!("{} must be a whole number of seconds, got '{}'", ENV_TIMEOUT_SECS, raw))
        })?;
    }

    if let Some(level) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
        config.log_level = level;
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &ClientConfig) -> Result<()> {
    let url = config.api_base_url.as_str();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(EduError::config(format!(
            "api_base_url must start with http:// or https://, got '{}'",
            url
        )));
    }
    if config.request_timeout_secs == 0 {
        return Err(EduError::config("request_timeout_secs must be greater than zero"));
    }
    Ok(())
}
