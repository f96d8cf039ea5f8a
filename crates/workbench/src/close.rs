//! Close operations and the unsaved-changes gate.
//!
//! Every destructive request computes the exact set of documents it would
//! discard and passes it through `request_close`. Clean sets are applied at
//! once; sets with dirty documents become a `PendingConfirmation` that the
//! front end resolves with `resolve_confirmation`.

use std::collections::HashSet;
use std::path::PathBuf;

use gluon_state::{Document, DocumentKey, GroupId};

use crate::{SaveOutcome, Transition, Workbench};

/// User's answer to the unsaved-changes modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsavedDecision {
    Save,
    DontSave,
    Cancel,
}

impl std::str::FromStr for UnsavedDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "save" => Ok(UnsavedDecision::Save),
            "d" | "dontsave" | "don't save" | "discard" => Ok(UnsavedDecision::DontSave),
            "c" | "cancel" | "" => Ok(UnsavedDecision::Cancel),
            _ => Err(format!("Unknown answer: {}", s)),
        }
    }
}

/// What the pending close will do once approved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseScope {
    /// One tab
    Single { group: GroupId },
    /// Every tab but `keep`
    Others { group: GroupId, keep: DocumentKey },
    /// Every tab right of `anchor`
    ToRight { group: GroupId, anchor: DocumentKey },
    /// Every tab of a group
    All { group: GroupId },
    /// Every tab of both groups, then forget the project
    Project,
}

impl CloseScope {
    /// Tab to focus if the focused one is discarded.
    fn fallback(&self) -> Option<&DocumentKey> {
        match self {
            CloseScope::Others { keep, .. } => Some(keep),
            CloseScope::ToRight { anchor, .. } => Some(anchor),
            _ => None,
        }
    }
}

/// A close waiting for the user's decision about dirty documents.
///
/// `targets` is frozen when the request is made: documents opened or edited
/// while the modal is up are not pulled into the close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    scope: CloseScope,
    targets: Vec<(GroupId, DocumentKey)>,
    dirty: Vec<(GroupId, DocumentKey)>,
}

impl PendingConfirmation {
    pub fn scope(&self) -> &CloseScope {
        &self.scope
    }

    /// Paths the modal should list.
    pub fn dirty_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for (_, key) in &self.dirty {
            if !paths.contains(&key.path) {
                paths.push(key.path.clone());
            }
        }
        paths
    }

    /// Number of documents the close discards.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Retarget entries after a placeholder was saved under a new path.
    fn rename(&mut self, old: &DocumentKey, new_path: &PathBuf) {
        for (_, key) in self.targets.iter_mut().chain(self.dirty.iter_mut()) {
            if key == old {
                key.path.clone_from(new_path);
            }
        }
    }

    /// Keep every editable copy of `path` open.
    fn spare(&mut self, path: &PathBuf) {
        self.targets.retain(|(_, key)| key.diff || &key.path != path);
    }
}

impl Workbench {
    /// Close a tab of the focused group.
    pub fn close(&mut self, index: usize) -> Transition {
        let id = self.active_group;
        let Some(document) = self.group(id).get(index) else {
            gluon_logger::warn(format!("Close ignored: no document at index {}", index));
            return Transition::Unchanged;
        };
        let targets = vec![(id, document.key())];
        self.request_close(CloseScope::Single { group: id }, targets)
    }

    /// Close the focused tab of the focused group.
    pub fn close_active(&mut self) -> Transition {
        match self.group(self.active_group).active_index() {
            Some(index) => self.close(index),
            None => Transition::Unchanged,
        }
    }

    /// Close every tab of the focused group except `index`.
    pub fn close_others(&mut self, index: usize) -> Transition {
        let id = self.active_group;
        let Some(keep) = self.group(id).get(index).map(Document::key) else {
            gluon_logger::warn(format!("Close others ignored: no document at index {}", index));
            return Transition::Unchanged;
        };
        let targets = self.keys_where(id, |i| i != index);
        self.request_close(CloseScope::Others { group: id, keep }, targets)
    }

    /// Close every tab right of `index` in the focused group.
    pub fn close_to_right(&mut self, index: usize) -> Transition {
        let id = self.active_group;
        let Some(anchor) = self.group(id).get(index).map(Document::key) else {
            gluon_logger::warn(format!("Close to right ignored: no document at index {}", index));
            return Transition::Unchanged;
        };
        let targets = self.keys_where(id, |i| i > index);
        self.request_close(CloseScope::ToRight { group: id, anchor }, targets)
    }

    /// Close every tab of the focused group.
    pub fn close_all(&mut self) -> Transition {
        let id = self.active_group;
        let targets = self.keys_where(id, |_| true);
        self.request_close(CloseScope::All { group: id }, targets)
    }

    /// Close every tab of both groups and forget the project root.
    pub fn close_project(&mut self) -> Transition {
        let mut targets = self.keys_where(GroupId::Primary, |_| true);
        targets.extend(self.keys_where(GroupId::Secondary, |_| true));

        if targets.is_empty() {
            if self.pending.is_some() {
                return Transition::Blocked;
            }
            let pending = PendingConfirmation {
                scope: CloseScope::Project,
                targets,
                dirty: Vec::new(),
            };
            self.apply_close(pending);
            return Transition::Applied;
        }
        self.request_close(CloseScope::Project, targets)
    }

    /// Finish the pending close with the user's decision.
    pub fn resolve_confirmation(&mut self, decision: UnsavedDecision) -> Transition {
        let Some(mut pending) = self.pending.take() else {
            gluon_logger::warn("No pending confirmation to resolve");
            return Transition::Unchanged;
        };

        match decision {
            UnsavedDecision::Cancel => {
                gluon_logger::debug("Close cancelled");
                Transition::Cancelled
            }
            UnsavedDecision::DontSave => {
                gluon_logger::info(format!(
                    "Discarding changes in {} document(s)",
                    pending.dirty.len()
                ));
                self.apply_close(pending);
                Transition::Applied
            }
            UnsavedDecision::Save => {
                let saved_any = self.save_pending(&mut pending);
                if saved_any {
                    self.notify_refresh();
                }
                self.apply_close(pending);
                Transition::Applied
            }
        }
    }

    /// Save the dirty documents of a pending close, resolved by path
    /// against live state. Documents that could not be saved are spared.
    fn save_pending(&mut self, pending: &mut PendingConfirmation) -> bool {
        let mut saved_any = false;
        let mut index = 0;

        while index < pending.dirty.len() {
            let (id, key) = pending.dirty[index].clone();
            index += 1;

            let Some(position) = self.group(id).position_of(&key) else {
                continue;
            };
            if !self.group(id).get(position).is_some_and(|d| d.is_dirty) {
                continue;
            }

            match self.save_document(id, position) {
                Ok(SaveOutcome::Saved(target)) => {
                    saved_any = true;
                    pending.rename(&key, &target);
                }
                Ok(SaveOutcome::Skipped) => {}
                Ok(SaveOutcome::Cancelled) => {
                    gluon_logger::info(format!("Kept {} open: save cancelled", key.path.display()));
                    pending.spare(&key.path);
                }
                Err(e) => {
                    gluon_logger::warn(format!(
                        "Kept {} open: save failed: {:#}",
                        key.path.display(),
                        e
                    ));
                    pending.spare(&key.path);
                }
            }
        }

        saved_any
    }

    fn keys_where(&self, id: GroupId, keep: impl Fn(usize) -> bool) -> Vec<(GroupId, DocumentKey)> {
        self.group(id)
            .iter()
            .enumerate()
            .filter(|(i, _)| keep(*i))
            .map(|(_, d)| (id, d.key()))
            .collect()
    }

    fn request_close(
        &mut self,
        scope: CloseScope,
        targets: Vec<(GroupId, DocumentKey)>,
    ) -> Transition {
        if self.pending.is_some() {
            gluon_logger::warn("Close refused: a confirmation is already pending");
            return Transition::Blocked;
        }
        if targets.is_empty() {
            return Transition::Unchanged;
        }

        let dirty: Vec<(GroupId, DocumentKey)> = targets
            .iter()
            .filter(|(id, key)| self.find(*id, key).is_some_and(|d| d.is_dirty))
            .cloned()
            .collect();

        let pending = PendingConfirmation {
            scope,
            targets,
            dirty,
        };

        if pending.dirty.is_empty() {
            self.apply_close(pending);
            Transition::Applied
        } else {
            gluon_logger::debug(format!(
                "Awaiting confirmation for {} unsaved document(s)",
                pending.dirty.len()
            ));
            self.pending = Some(pending);
            Transition::NeedsConfirmation
        }
    }

    fn apply_close(&mut self, pending: PendingConfirmation) {
        let fallback = pending.scope.fallback().cloned();
        let mut removed = 0;

        for id in GroupId::ALL {
            let keys: HashSet<&DocumentKey> = pending
                .targets
                .iter()
                .filter(|(group, _)| *group == id)
                .map(|(_, key)| key)
                .collect();
            if keys.is_empty() {
                continue;
            }
            removed += self
                .group_mut(id)
                .remove_where(|d, _| keys.contains(&d.key()), fallback.as_ref())
                .len();
        }

        if pending.scope == CloseScope::Project {
            if self.groups.iter().all(|g| g.is_empty()) {
                self.split = false;
                self.active_group = GroupId::Primary;
                if let Some(root) = self.project_root.take() {
                    gluon_logger::info(format!("Project closed: {}", root.display()));
                }
            } else {
                gluon_logger::warn("Project kept open: some documents could not be saved");
            }
        }

        gluon_logger::debug(format!("Closed {} document(s)", removed));
        self.debug_check();
    }
}
