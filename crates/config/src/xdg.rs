//! Per-user directories for gluon.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "gluon";

/// Scope a platform base directory to gluon.
fn app_dir(base: Option<PathBuf>, kind: &str) -> Result<PathBuf> {
    base.map(|dir| dir.join(APP_NAME))
        .with_context(|| format!("No {} directory on this platform", kind))
}

/// `$XDG_CONFIG_HOME/gluon`, holding `config.toml`.
pub fn get_config_dir() -> Result<PathBuf> {
    app_dir(dirs::config_dir(), "config")
}

/// `$XDG_DATA_HOME/gluon`, holding sessions and recent projects.
pub fn get_data_dir() -> Result<PathBuf> {
    app_dir(dirs::data_dir(), "data")
}

/// `$XDG_CACHE_HOME/gluon`, the default home of the log file.
pub fn get_cache_dir() -> Result<PathBuf> {
    app_dir(dirs::cache_dir(), "cache")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_dir_joins_app_name() {
        let dir = app_dir(Some(PathBuf::from("/home/me/.local/share")), "data").unwrap();
        assert_eq!(dir, PathBuf::from("/home/me/.local/share/gluon"));
    }

    #[test]
    fn test_app_dir_without_base_names_the_kind() {
        let err = app_dir(None, "cache").unwrap_err();
        assert!(err.to_string().contains("cache"));
    }
}
