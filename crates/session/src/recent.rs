//! Recently opened projects.

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const RECENT_FILE: &str = "recent.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentProject {
    pub path: PathBuf,
    /// Last time the project was opened (RFC 3339)
    pub opened_at: String,
}

/// Most-recent-first list of project roots without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentProjects {
    #[serde(default)]
    projects: Vec<RecentProject>,
}

impl RecentProjects {
    pub fn file_in(data_dir: &Path) -> PathBuf {
        data_dir.join(RECENT_FILE)
    }

    /// Load the list. A missing file yields an empty list.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read recent projects: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse recent projects: {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let contents =
            toml::to_string_pretty(self).context("Failed to serialize recent projects")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write recent projects: {}", path.display()))
    }

    /// Move `path` to the front, dropping the oldest entries beyond `limit`.
    pub fn add(&mut self, path: impl Into<PathBuf>, limit: usize) {
        let path = path.into();
        self.projects.retain(|p| p.path != path);
        self.projects.insert(
            0,
            RecentProject {
                path,
                opened_at: Local::now().to_rfc3339(),
            },
        );
        self.projects.truncate(limit);
    }

    /// Forget a project. Returns whether it was listed.
    pub fn remove(&mut self, path: &Path) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| p.path != path);
        self.projects.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecentProject> {
        self.projects.iter()
    }

    pub fn paths(&self) -> Vec<&Path> {
        self.projects.iter().map(|p| p.path.as_path()).collect()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_moves_to_front_without_duplicates() {
        let mut recent = RecentProjects::default();
        recent.add("/a", 10);
        recent.add("/b", 10);
        recent.add("/a", 10);
        assert_eq!(recent.paths(), vec![Path::new("/a"), Path::new("/b")]);
    }

    #[test]
    fn test_add_respects_limit() {
        let mut recent = RecentProjects::default();
        for name in ["/a", "/b", "/c", "/d"] {
            recent.add(name, 3);
        }
        assert_eq!(
            recent.paths(),
            vec![Path::new("/d"), Path::new("/c"), Path::new("/b")]
        );
    }

    #[test]
    fn test_remove() {
        let mut recent = RecentProjects::default();
        recent.add("/a", 10);
        assert!(recent.remove(Path::new("/a")));
        assert!(!recent.remove(Path::new("/a")));
        assert!(recent.is_empty());
    }

    #[test]
    fn test_persists_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RECENT_FILE);
        assert!(RecentProjects::load_from(&path).unwrap().is_empty());

        let mut recent = RecentProjects::default();
        recent.add("/a", 10);
        recent.add("/b", 10);
        recent.save_to(&path).unwrap();

        let loaded = RecentProjects::load_from(&path).unwrap();
        assert_eq!(loaded, recent);
        assert_eq!(loaded.len(), 2);
    }
}
