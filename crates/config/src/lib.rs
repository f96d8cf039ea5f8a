//! Configuration management for gluon.
//!
//! Loads and saves `config.toml` from the XDG config directory, filling in
//! missing keys with defaults and writing the normalized file back.

mod settings;
mod xdg;

pub use settings::{Config, EditorSettings, GeneralSettings, LoggingSettings, WatcherSettings};
pub use xdg::{get_cache_dir, get_config_dir, get_data_dir};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default values as constants
pub mod defaults {
    pub const RECENT_PROJECTS_LIMIT: usize = 10;
    pub const RESTORE_SESSION: bool = true;
    pub const MAX_FILE_SIZE_MB: u64 = 20;
    pub const WATCHER_ENABLED: bool = true;
    pub const DEBOUNCE_MS: u64 = 100;
    pub const MIN_LOG_LEVEL: &str = "info";
    pub const MAX_LOG_ENTRIES: usize = 500;
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// On first run, creates the config file with default values.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load configuration from an explicit file.
    ///
    /// Missing keys are auto-completed and the normalized file is written
    /// back when it differs from what was on disk.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let original_content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
        let config = Self::validate_content(&original_content)?;

        let normalized_content = toml::to_string_pretty(&config)?;
        if original_content != normalized_content {
            config.save_to(config_path)?;
        }

        Ok(config)
    }

    /// Save configuration to an explicit file.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        Ok(())
    }

    /// Get path to config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(get_config_dir()?.join("config.toml"))
    }

    /// Resolved log file path: the configured one or `<cache>/gluon.log`.
    pub fn log_file_path(&self) -> Option<PathBuf> {
        match &self.logging.file_path {
            Some(path) => Some(PathBuf::from(path)),
            None => get_cache_dir().ok().map(|dir| dir.join("gluon.log")),
        }
    }

    /// Max file size accepted by the editor, in bytes. Saturates at `u64::MAX`.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.editor.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    /// Validate config content.
    pub fn validate_content(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("{}", e))
    }
}
