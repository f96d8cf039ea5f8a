//! Filesystem watcher for gluon.
//!
//! Watches the project root recursively and reports paths that disappeared,
//! so their tabs can be closed.

use anyhow::{Context, Result};
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

/// Whether a changed path lives inside a `.git` directory.
fn is_git_internal(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == ".git")
}

/// Reduce a batch of changed paths to the removed ones.
///
/// The debouncer does not keep event kinds, so a path counts as removed
/// when `exists` says it is gone. Paths nested under another removed path
/// are folded into it.
pub fn removed_paths(
    changed: impl IntoIterator<Item = PathBuf>,
    exists: impl Fn(&Path) -> bool,
) -> Vec<PathBuf> {
    let mut removed: Vec<PathBuf> = Vec::new();
    for path in changed {
        if is_git_internal(&path) || exists(&path) || removed.contains(&path) {
            continue;
        }
        removed.push(path);
    }

    removed.sort();
    let mut result: Vec<PathBuf> = Vec::with_capacity(removed.len());
    for path in removed {
        if !result.iter().any(|kept| path.starts_with(kept)) {
            result.push(path);
        }
    }
    result
}

/// Debounced recursive watcher over one project root.
pub struct ProjectWatcher {
    debouncer: Debouncer<RecommendedWatcher>,
    receiver: Receiver<Vec<PathBuf>>,
    root: Option<PathBuf>,
}

impl ProjectWatcher {
    /// Create a watcher that debounces events to `debounce_ms`.
    pub fn new(debounce_ms: u64) -> Result<Self> {
        let (tx, rx) = channel();

        let debouncer = new_debouncer(
            Duration::from_millis(debounce_ms),
            move |result: DebounceEventResult| match result {
                Ok(events) => {
                    let paths: Vec<PathBuf> = events.into_iter().map(|e| e.path).collect();
                    let _ = tx.send(paths);
                }
                Err(e) => gluon_logger::warn(format!("Filesystem watcher error: {:?}", e)),
            },
        )
        .context("Failed to create filesystem watcher")?;

        Ok(Self {
            debouncer,
            receiver: rx,
            root: None,
        })
    }

    /// Watch `root` recursively, replacing any previously watched root.
    pub fn watch_project(&mut self, root: &Path) -> Result<()> {
        self.unwatch();
        self.debouncer
            .watcher()
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch path: {}", root.display()))?;
        self.root = Some(root.to_path_buf());
        gluon_logger::debug(format!("Watching {}", root.display()));
        Ok(())
    }

    /// Stop watching the current root, if any.
    pub fn unwatch(&mut self) {
        if let Some(root) = self.root.take() {
            let _ = self.debouncer.watcher().unwatch(&root);
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Drain pending events (non-blocking) and return removed paths.
    pub fn poll_removed(&self) -> Vec<PathBuf> {
        let changed: Vec<PathBuf> = self.receiver.try_iter().flatten().collect();
        if changed.is_empty() {
            return Vec::new();
        }
        removed_paths(changed, |p| p.exists())
    }
}
