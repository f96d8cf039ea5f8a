//! Session persistence for gluon.
//!
//! Saves the tab layout per project and keeps the list of recently opened
//! projects.

mod recent;

pub use recent::{RecentProject, RecentProjects};

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use gluon_state::{GroupId, GroupSnapshot, LayoutSnapshot};

const SESSION_FILE: &str = "session.toml";

/// Saved tab layout of one project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// When the session was written (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
    /// Whether split view was on
    #[serde(default)]
    pub split: bool,
    /// Focused group name ("primary" or "secondary")
    #[serde(default)]
    pub focused_group: String,
    #[serde(default)]
    pub primary: SessionGroup,
    #[serde(default)]
    pub secondary: SessionGroup,
}

/// Tabs of one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionGroup {
    #[serde(default)]
    pub tabs: Vec<PathBuf>,
    /// Focused tab (0-based index)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<usize>,
}

impl From<&GroupSnapshot> for SessionGroup {
    fn from(group: &GroupSnapshot) -> Self {
        Self {
            tabs: group.paths.clone(),
            active: group.active,
        }
    }
}

impl From<&SessionGroup> for GroupSnapshot {
    fn from(group: &SessionGroup) -> Self {
        Self {
            paths: group.tabs.clone(),
            active: group.active.filter(|&i| i < group.tabs.len()),
        }
    }
}

impl From<&LayoutSnapshot> for Session {
    fn from(layout: &LayoutSnapshot) -> Self {
        Self {
            saved_at: Some(Local::now().to_rfc3339()),
            split: layout.split,
            focused_group: layout.focused.as_str().to_string(),
            primary: SessionGroup::from(&layout.primary),
            secondary: SessionGroup::from(&layout.secondary),
        }
    }
}

impl Session {
    /// Layout to hand to the workbench. Unknown group names fall back to primary.
    pub fn layout(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            primary: GroupSnapshot::from(&self.primary),
            secondary: GroupSnapshot::from(&self.secondary),
            split: self.split,
            focused: self.focused_group.parse::<GroupId>().unwrap_or_default(),
        }
    }

    /// Session directory for `project_root` under the data directory.
    ///
    /// Nests subdirectories matching the project path.
    /// Example: /home/user/project1 -> <data>/sessions/home/user/project1/
    pub fn session_dir_in(data_dir: &Path, project_root: &Path) -> PathBuf {
        // Canonicalize the project path to handle symlinks and relative paths
        let canonical_project = project_root
            .canonicalize()
            .unwrap_or_else(|_| project_root.to_path_buf());

        // Keep only normal components so the path nests under sessions/
        let relative: PathBuf = canonical_project
            .components()
            .filter(|c| matches!(c, std::path::Component::Normal(_)))
            .collect();

        data_dir.join("sessions").join(relative)
    }

    /// `session.toml` of `project_root` under the data directory.
    pub fn file_in(data_dir: &Path, project_root: &Path) -> PathBuf {
        Self::session_dir_in(data_dir, project_root).join(SESSION_FILE)
    }

    /// Load a session file. A missing file yields an empty session.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file: {}", path.display()))?;
        let session: Session = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse session file: {}", path.display()))?;
        Ok(session)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(session_dir) = path.parent() {
            fs::create_dir_all(session_dir).with_context(|| {
                format!(
                    "Failed to create session directory: {}",
                    session_dir.display()
                )
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize session")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write session file: {}", path.display()))?;
        Ok(())
    }
}
