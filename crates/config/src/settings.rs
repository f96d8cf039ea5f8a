//! Configuration structures for gluon settings.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Application configuration with nested sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General application settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Editor settings
    #[serde(default)]
    pub editor: EditorSettings,

    /// Filesystem watcher settings
    #[serde(default)]
    pub watcher: WatcherSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// How many projects the recent list keeps
    #[serde(default = "default_recent_projects_limit")]
    pub recent_projects_limit: usize,

    /// Reopen the tabs of the last session when a project is opened
    #[serde(default = "default_restore_session")]
    pub restore_session: bool,
}

/// Editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Files above this size in MB are refused on open
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
}

/// Filesystem watcher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatcherSettings {
    /// Close tabs whose files disappear from disk
    #[serde(default = "default_watcher_enabled")]
    pub enabled: bool,

    /// Debounce window for filesystem events in ms
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log file path (optional, defaults to the cache directory)
    #[serde(default)]
    pub file_path: Option<String>,

    /// Minimum log level (debug, info, warn, error)
    #[serde(default = "default_min_level")]
    pub min_level: String,

    /// Entries kept in memory for the `log` command
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

// Default value functions for serde
fn default_recent_projects_limit() -> usize {
    defaults::RECENT_PROJECTS_LIMIT
}

fn default_restore_session() -> bool {
    defaults::RESTORE_SESSION
}

fn default_max_file_size_mb() -> u64 {
    defaults::MAX_FILE_SIZE_MB
}

fn default_watcher_enabled() -> bool {
    defaults::WATCHER_ENABLED
}

fn default_debounce_ms() -> u64 {
    defaults::DEBOUNCE_MS
}

fn default_min_level() -> String {
    defaults::MIN_LOG_LEVEL.to_string()
}

fn default_max_entries() -> usize {
    defaults::MAX_LOG_ENTRIES
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            recent_projects_limit: default_recent_projects_limit(),
            restore_session: default_restore_session(),
        }
    }
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size_mb(),
        }
    }
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            enabled: default_watcher_enabled(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file_path: None,
            min_level: default_min_level(),
            max_entries: default_max_entries(),
        }
    }
}
