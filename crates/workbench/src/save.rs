//! Save and SaveAll.

use std::path::{Path, PathBuf};

use anyhow::Result;

use gluon_host::SaveTarget;
use gluon_state::{Document, DocumentKey, GroupId};

use crate::Workbench;

/// What a single save did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to this path
    Saved(PathBuf),
    /// User dismissed the destination picker
    Cancelled,
    /// Nothing to save (no document, or a diff view)
    Skipped,
}

/// Summary of `save_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveAllReport {
    pub saved: Vec<PathBuf>,
    pub cancelled: usize,
    pub failed: Vec<(PathBuf, String)>,
}

impl SaveAllReport {
    pub fn is_clean(&self) -> bool {
        self.cancelled == 0 && self.failed.is_empty()
    }
}

impl Workbench {
    /// Save a document of the focused group, `index` or the focused one.
    ///
    /// On write failure the document stays dirty and the error is returned.
    pub fn save(&mut self, index: Option<usize>) -> Result<SaveOutcome> {
        let id = self.active_group;
        let Some(index) = index.or_else(|| self.group(id).active_index()) else {
            gluon_logger::warn("Save ignored: no document selected");
            return Ok(SaveOutcome::Skipped);
        };

        let outcome = self.save_document(id, index)?;
        if matches!(outcome, SaveOutcome::Saved(_)) {
            self.notify_refresh();
        }
        Ok(outcome)
    }

    /// Save every dirty document of both groups, primary first.
    ///
    /// Cancelled pickers and failed writes are skipped, never retried. The
    /// refresh notification fires once, if anything was written.
    pub fn save_all(&mut self) -> SaveAllReport {
        let mut report = SaveAllReport::default();

        for id in GroupId::ALL {
            let dirty: Vec<DocumentKey> = self
                .group(id)
                .iter()
                .filter(|d| d.is_dirty)
                .map(Document::key)
                .collect();

            // Earlier saves can rename, clean or supersede later entries,
            // so every key is re-resolved against live state.
            for key in dirty {
                let Some(index) = self.group(id).position_of(&key) else {
                    continue;
                };
                if !self.group(id).get(index).is_some_and(|d| d.is_dirty) {
                    continue;
                }

                match self.save_document(id, index) {
                    Ok(SaveOutcome::Saved(target)) => report.saved.push(target),
                    Ok(SaveOutcome::Cancelled) => report.cancelled += 1,
                    Ok(SaveOutcome::Skipped) => {}
                    Err(e) => report.failed.push((key.path, format!("{:#}", e))),
                }
            }
        }

        if !report.saved.is_empty() {
            self.notify_refresh();
        }
        gluon_logger::info(format!(
            "Save all: {} saved, {} cancelled, {} failed",
            report.saved.len(),
            report.cancelled,
            report.failed.len()
        ));
        report
    }

    /// Write one document without notifying.
    pub(crate) fn save_document(&mut self, id: GroupId, index: usize) -> Result<SaveOutcome> {
        let Some(document) = self.group(id).get(index) else {
            gluon_logger::warn(format!("Save ignored: no document at index {}", index));
            return Ok(SaveOutcome::Skipped);
        };
        if document.is_diff() {
            gluon_logger::warn(format!("Diff view is read-only: {}", document.path.display()));
            return Ok(SaveOutcome::Skipped);
        }

        let old_path = document.path.clone();
        let content = document.content.clone();
        let is_placeholder = document.is_placeholder();

        let target = if is_placeholder {
            match self.services.save_prompt.prompt_save_path(&old_path) {
                SaveTarget::Chosen(path) => path,
                SaveTarget::Cancelled => {
                    gluon_logger::debug(format!("Save of {} cancelled", old_path.display()));
                    return Ok(SaveOutcome::Cancelled);
                }
            }
        } else {
            old_path.clone()
        };

        if target != old_path && self.has_dirty_editable(&target) {
            gluon_logger::warn(format!(
                "Save of {} refused: {} is open with unsaved changes",
                old_path.display(),
                target.display()
            ));
            anyhow::bail!(
                "{} is open with unsaved changes; save or close it first",
                target.display()
            );
        }

        if let Err(e) = self.services.files.write_file(&target, &content) {
            gluon_logger::error(format!("Failed to save {}: {:#}", target.display(), e));
            return Err(e);
        }

        self.mark_saved(&old_path, &target, &content);
        gluon_logger::info(format!("File saved: {}", target.display()));
        Ok(SaveOutcome::Saved(target))
    }

    fn has_dirty_editable(&self, path: &Path) -> bool {
        GroupId::ALL.into_iter().any(|id| {
            let group = self.group(id);
            group
                .position_editable(path)
                .and_then(|index| group.get(index))
                .is_some_and(|d| d.is_dirty)
        })
    }

    /// Record a successful write of `old_path` to `target` in both groups.
    ///
    /// Only copies whose content matches what was written become clean.
    /// A clean entry already at `target` is superseded and dropped; dirty
    /// ones never get here.
    fn mark_saved(&mut self, old_path: &Path, target: &Path, written: &str) {
        for id in GroupId::ALL {
            let group = self.group_mut(id);
            let Some(index) = group.position_editable(old_path) else {
                continue;
            };

            if old_path != target {
                let saved_key = group.get(index).map(Document::key);
                group.remove_where(
                    |d, _| !d.is_diff() && d.path == target,
                    saved_key.as_ref(),
                );
            }

            if let Some(index) = group.position_editable(old_path) {
                if let Some(document) = group.get_mut(index) {
                    document.path = target.to_path_buf();
                    if document.content == written {
                        document.is_dirty = false;
                    }
                }
            }
        }
        self.debug_check();
    }
}
