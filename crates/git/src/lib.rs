//! Git integration for gluon.
//!
//! Reads file contents from HEAD for diff tabs and summarizes line changes.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use similar::{ChangeTag, TextDiff};

use gluon_host::RevisionSource;

/// Global flag for git availability on system.
static GIT_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Check if git is available on system.
pub fn is_available() -> bool {
    *GIT_AVAILABLE.get_or_init(|| {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    })
}

/// Find git repository root by walking up from a path.
pub fn find_repo_root(path: &Path) -> Option<PathBuf> {
    let mut current = path;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

/// Revision source backed by the `git` executable.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitRevisionSource;

impl RevisionSource for GitRevisionSource {
    fn head_content(&self, root: &Path, relative: &Path) -> Result<Option<String>> {
        if !is_available() {
            anyhow::bail!("git is not installed");
        }

        // Git object paths always use forward slashes. The `./` prefix makes
        // git resolve them against `root`, which may sit below the repo root.
        let object_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let output = Command::new("git")
            .arg("show")
            .arg(format!("HEAD:./{}", object_path))
            .current_dir(root)
            .output()
            .context("Failed to execute git show")?;

        if !output.status.success() {
            // New file or not a repository
            gluon_logger::debug(format!(
                "Not in HEAD: {} ({})",
                relative.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
            return Ok(None);
        }

        let content =
            String::from_utf8(output.stdout).context("Failed to parse git show output as UTF-8")?;
        gluon_logger::debug(format!(
            "Loaded {} bytes from HEAD for: {}",
            content.len(),
            relative.display()
        ));
        Ok(Some(content))
    }
}

/// Line counts of a two-way diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffSummary {
    pub fn compute(original: &str, modified: &str) -> Self {
        let diff = TextDiff::from_lines(original, modified);
        let mut summary = Self::default();
        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => summary.insertions += 1,
                ChangeTag::Delete => summary.deletions += 1,
                ChangeTag::Equal => {}
            }
        }
        summary
    }

    pub fn is_empty(&self) -> bool {
        self.insertions == 0 && self.deletions == 0
    }
}

impl std::fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "+{} -{}", self.insertions, self.deletions)
    }
}
