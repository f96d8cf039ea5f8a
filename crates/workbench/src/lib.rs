//! Editor group manager for gluon.
//!
//! `Workbench` owns the two editor groups (primary and secondary), the split
//! flag, workspace focus and the pending unsaved-changes confirmation.
//!
//! # Architecture
//!
//! Every operation runs to completion against `&mut Workbench`. The only
//! place where the user has to answer before an operation can finish is the
//! unsaved-changes confirmation, which is held as explicit state:
//!
//! ```text
//! close*/close_project ──► clean? ──yes──► Applied
//!                             │
//!                             no
//!                             ▼
//!                     NeedsConfirmation ──► front end shows modal
//!                             │
//!                 resolve_confirmation(decision)
//!                             ▼
//!                  Applied / Cancelled
//! ```

mod close;
mod save;
mod snapshot;
mod split;

#[cfg(test)]
mod testing;

pub use close::{CloseScope, PendingConfirmation, UnsavedDecision};
pub use save::{SaveAllReport, SaveOutcome};

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use gluon_host::{FileAccess, RefreshNotifier, RevisionSource, SavePathPrompt};
use gluon_state::{placeholder_number, Document, DocumentKey, EditorGroup, GroupId};

/// Result of a state transition request.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State changed
    Applied,
    /// Nothing to do, or the request was invalid (logged)
    Unchanged,
    /// Dirty documents involved; call `resolve_confirmation`
    NeedsConfirmation,
    /// User cancelled; state untouched
    Cancelled,
    /// Refused because a confirmation is still pending
    Blocked,
}

/// Host collaborators used by the workbench.
pub struct Services {
    pub files: Box<dyn FileAccess>,
    pub save_prompt: Box<dyn SavePathPrompt>,
    pub notifier: Box<dyn RefreshNotifier>,
    pub revisions: Box<dyn RevisionSource>,
}

/// Two editor groups plus split view and workspace focus.
pub struct Workbench {
    groups: [EditorGroup; 2],
    active_group: GroupId,
    split: bool,
    pending: Option<PendingConfirmation>,
    project_root: Option<PathBuf>,
    services: Services,
}

impl Workbench {
    pub fn new(services: Services) -> Self {
        Self {
            groups: [EditorGroup::new(), EditorGroup::new()],
            active_group: GroupId::Primary,
            split: false,
            pending: None,
            project_root: None,
            services,
        }
    }

    pub fn group(&self, id: GroupId) -> &EditorGroup {
        &self.groups[id.index()]
    }

    fn group_mut(&mut self, id: GroupId) -> &mut EditorGroup {
        &mut self.groups[id.index()]
    }

    /// Group that ambiguous operations target.
    pub fn active_group(&self) -> GroupId {
        self.active_group
    }

    pub fn is_split(&self) -> bool {
        self.split
    }

    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    pub fn pending_confirmation(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }

    /// Focused document of the focused group.
    pub fn active_document(&self) -> Option<&Document> {
        self.group(self.active_group).active_document()
    }

    /// Dirty documents of both groups, primary first.
    pub fn dirty_documents(&self) -> impl Iterator<Item = (GroupId, &Document)> {
        GroupId::ALL.into_iter().flat_map(move |id| {
            self.group(id)
                .iter()
                .filter(|d| d.is_dirty)
                .map(move |d| (id, d))
        })
    }

    pub fn has_dirty_documents(&self) -> bool {
        self.dirty_documents().next().is_some()
    }

    fn find(&self, id: GroupId, key: &DocumentKey) -> Option<&Document> {
        let group = self.group(id);
        group.position_of(key).and_then(|i| group.get(i))
    }

    /// Set the project root used for git diffs and sessions.
    pub fn open_project(&mut self, root: impl Into<PathBuf>) {
        let root = root.into();
        gluon_logger::info(format!("Project opened: {}", root.display()));
        self.project_root = Some(root);
    }

    /// Open a file in the focused group, or focus it if already open.
    ///
    /// Diff tabs of the same path do not count as open. If the other group
    /// holds the file, its live buffer is shared instead of re-reading the
    /// disk. Returns the index of the focused document. On read failure
    /// nothing changes and the error is returned.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let id = self.active_group;

        if let Some(index) = self.group(id).position_editable(path) {
            self.group_mut(id).focus(index);
            gluon_logger::debug(format!("Focused already open file: {}", path.display()));
            return Ok(index);
        }

        let other = self.group(id.other());
        let live = other
            .position_editable(path)
            .and_then(|index| other.get(index))
            .cloned();

        let document = match live {
            Some(document) => {
                gluon_logger::debug(format!(
                    "Sharing {} with the {} group",
                    path.display(),
                    id.other().as_str()
                ));
                document
            }
            None => {
                let content = self.services.files.read_file(path).map_err(|e| {
                    gluon_logger::error(format!("Failed to open {}: {:#}", path.display(), e));
                    e
                })?;
                Document::from_disk(path, content)
            }
        };

        let index = self.group_mut(id).push(document);
        gluon_logger::info(format!("Opened {} in {} group", path.display(), id.as_str()));
        self.debug_check();
        Ok(index)
    }

    /// Open or refresh a read-only diff view in the focused group.
    pub fn open_diff(
        &mut self,
        path: impl Into<PathBuf>,
        original: String,
        modified: String,
    ) -> usize {
        let document = Document::diff(path, original, modified);
        let key = document.key();
        let group = self.group_mut(self.active_group);

        let index = match group.position_of(&key) {
            Some(index) => {
                group.replace(index, document);
                group.focus(index);
                index
            }
            None => group.push(document),
        };
        self.debug_check();
        index
    }

    /// Diff of a project file against its HEAD revision.
    ///
    /// A file missing from HEAD or from the working copy shows as empty on
    /// that side.
    pub fn open_git_diff(&mut self, relative: impl AsRef<Path>) -> Result<usize> {
        let relative = relative.as_ref();
        let root = self
            .project_root
            .clone()
            .context("No project is open")?;

        let original = match self.services.revisions.head_content(&root, relative) {
            Ok(content) => content.unwrap_or_default(),
            Err(e) => {
                gluon_logger::warn(format!(
                    "Failed to load HEAD revision of {}: {:#}",
                    relative.display(),
                    e
                ));
                String::new()
            }
        };

        let path = root.join(relative);
        let modified = self.services.files.read_file(&path).unwrap_or_else(|e| {
            gluon_logger::warn(format!("Failed to read working copy: {:#}", e));
            String::new()
        });

        Ok(self.open_diff(path, original, modified))
    }

    /// Create an empty `untitled-N` document in the focused group.
    ///
    /// `N` is the smallest number unused in either group, so merging the
    /// groups later never folds two distinct new files together.
    pub fn new_file(&mut self) -> usize {
        let used: Vec<u32> = self
            .groups
            .iter()
            .flat_map(|g| g.iter())
            .filter_map(|d| placeholder_number(&d.path))
            .collect();
        let number = (1..).find(|n| !used.contains(n)).unwrap_or(1);

        let index = self.group_mut(self.active_group).push(Document::untitled(number));
        gluon_logger::debug(format!("Created untitled-{}", number));
        self.debug_check();
        index
    }

    /// Replace the content of a document in the focused group and mark it
    /// dirty. An editable copy of the same file in the other group follows.
    pub fn edit(&mut self, index: usize, content: impl Into<String>) -> Transition {
        let id = self.active_group;
        let path = match self.group(id).get(index) {
            Some(doc) if doc.is_diff() => {
                gluon_logger::warn(format!("Diff view is read-only: {}", doc.path.display()));
                return Transition::Unchanged;
            }
            Some(doc) => doc.path.clone(),
            None => {
                gluon_logger::warn(format!("Edit ignored: no document at index {}", index));
                return Transition::Unchanged;
            }
        };

        let content = content.into();
        if let Some(other) = self.group(id.other()).position_editable(&path) {
            if let Some(doc) = self.group_mut(id.other()).get_mut(other) {
                doc.content.clone_from(&content);
                doc.is_dirty = true;
            }
        }
        if let Some(doc) = self.group_mut(id).get_mut(index) {
            doc.content = content;
            doc.is_dirty = true;
        }
        Transition::Applied
    }

    /// Move workspace focus to a group. The secondary group is only
    /// focusable in split view.
    pub fn focus_group(&mut self, id: GroupId) -> Transition {
        if id == GroupId::Secondary && !self.split {
            gluon_logger::warn("Secondary group is hidden");
            return Transition::Unchanged;
        }
        if self.active_group == id {
            return Transition::Unchanged;
        }
        self.active_group = id;
        Transition::Applied
    }

    /// Focus a group and one of its documents (tab click).
    pub fn select(&mut self, id: GroupId, index: usize) -> Transition {
        if id == GroupId::Secondary && !self.split {
            gluon_logger::warn("Secondary group is hidden");
            return Transition::Unchanged;
        }
        if !self.group_mut(id).focus(index) {
            gluon_logger::warn(format!("No tab {} in {} group", index, id.as_str()));
            return Transition::Unchanged;
        }
        self.active_group = id;
        Transition::Applied
    }

    fn notify_refresh(&self) {
        self.services.notifier.workspace_changed();
    }

    fn debug_check(&self) {
        debug_assert!(self.groups.iter().all(EditorGroup::is_consistent));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    #[test]
    fn test_open_twice_reuses_document() {
        let mut h = Harness::new();
        h.fs.insert("/p/a.py", "a");
        h.fs.insert("/p/b.py", "b");

        assert_eq!(h.wb.open("/p/a.py").unwrap(), 0);
        assert_eq!(h.wb.open("/p/b.py").unwrap(), 1);
        // Changed on disk after opening: reopening must not re-read
        h.fs.insert("/p/a.py", "changed");
        for _ in 0..3 {
            assert_eq!(h.wb.open("/p/a.py").unwrap(), 0);
        }

        let group = h.wb.group(GroupId::Primary);
        assert_eq!(group.len(), 2);
        assert_eq!(group.active_index(), Some(0));
        assert_eq!(group.get(0).unwrap().content, "a");
    }

    #[test]
    fn test_open_failure_leaves_state_unchanged() {
        let mut h = Harness::new();
        h.fs.insert("/p/a.py", "a");
        h.wb.open("/p/a.py").unwrap();
        let before = h.wb.group(GroupId::Primary).clone();

        assert!(h.wb.open("/p/missing.py").is_err());
        assert_eq!(h.wb.group(GroupId::Primary), &before);
    }

    #[test]
    fn test_open_targets_focused_group() {
        let mut h = Harness::new();
        h.fs.insert("/p/a.py", "a");
        h.wb.open("/p/a.py").unwrap();
        let _ = h.wb.toggle_split();
        let _ = h.wb.close(0);
        assert!(h.wb.group(GroupId::Secondary).is_empty());

        h.wb.open("/p/a.py").unwrap();
        assert_eq!(h.wb.group(GroupId::Secondary).len(), 1);
        assert_eq!(h.wb.group(GroupId::Primary).len(), 1);
    }

    #[test]
    fn test_open_diff_updates_in_place() {
        let mut h = Harness::new();
        h.fs.insert("/p/a.rs", "fn a() {}");
        h.wb.open("/p/a.rs").unwrap();

        assert_eq!(h.wb.open_diff("/p/a.rs", "old".into(), "v1".into()), 1);
        h.wb.open("/p/a.rs").unwrap();
        assert_eq!(h.wb.open_diff("/p/a.rs", "old".into(), "v2".into()), 1);

        let group = h.wb.group(GroupId::Primary);
        assert_eq!(group.len(), 2);
        assert_eq!(group.active_index(), Some(1));
        let diff = group.get(1).unwrap().diff.as_ref().unwrap();
        assert_eq!(diff.modified, "v2");
        assert!(!group.get(0).unwrap().is_diff());
    }

    #[test]
    fn test_open_shares_dirty_buffer_of_other_group() {
        let mut h = Harness::new();
        h.fs.insert("/p/a", "disk");
        h.fs.insert("/p/b", "b");
        h.wb.open("/p/a").unwrap();
        let _ = h.wb.edit(0, "live edits");
        h.wb.open("/p/b").unwrap();
        let _ = h.wb.toggle_split();

        assert_eq!(h.wb.open("/p/a").unwrap(), 1);
        let right = h.wb.active_document().unwrap();
        assert_eq!(right.content, "live edits");
        assert!(right.is_dirty);

        let _ = h.wb.edit(1, "live edits\ntyped in right pane");
        let left = h.wb.group(GroupId::Primary).get(0).unwrap();
        assert_eq!(left.content, "live edits\ntyped in right pane");
        assert!(left.is_dirty);
    }

    #[test]
    fn test_open_after_git_diff_adds_editable_tab() {
        let mut h = Harness::new();
        h.wb.open_project("/repo");
        h.revisions.insert("src/lib.rs", "old");
        h.fs.insert("/repo/src/lib.rs", "new");
        h.wb.open_git_diff("src/lib.rs").unwrap();

        assert_eq!(h.wb.open("/repo/src/lib.rs").unwrap(), 1);
        let group = h.wb.group(GroupId::Primary);
        assert_eq!(group.len(), 2);
        assert!(group.get(0).unwrap().is_diff());
        assert!(!group.get(1).unwrap().is_diff());
        assert_eq!(h.wb.edit(1, "edited"), Transition::Applied);

        // Reopening focuses the editable tab, never the diff
        let _ = h.wb.select(GroupId::Primary, 0);
        assert_eq!(h.wb.open("/repo/src/lib.rs").unwrap(), 1);
    }

    #[test]
    fn test_open_git_diff_reads_head_and_working_copy() {
        let mut h = Harness::new();
        assert!(h.wb.open_git_diff("src/lib.rs").is_err());

        h.wb.open_project("/repo");
        h.revisions.insert("src/lib.rs", "pub fn old() {}");
        h.fs.insert("/repo/src/lib.rs", "pub fn new() {}");
        h.wb.open_git_diff("src/lib.rs").unwrap();
        // Untracked: HEAD side is empty
        h.fs.insert("/repo/new.rs", "fresh");
        h.wb.open_git_diff("new.rs").unwrap();

        let group = h.wb.group(GroupId::Primary);
        let tracked = group.get(0).unwrap();
        assert_eq!(tracked.path, PathBuf::from("/repo/src/lib.rs"));
        assert_eq!(tracked.diff.as_ref().unwrap().original, "pub fn old() {}");
        assert_eq!(tracked.content, "pub fn new() {}");
        assert_eq!(group.get(1).unwrap().diff.as_ref().unwrap().original, "");
    }

    #[test]
    fn test_edit_marks_dirty_even_if_unchanged() {
        let mut h = Harness::new();
        h.fs.insert("/p/a.py", "same");
        h.wb.open("/p/a.py").unwrap();

        assert_eq!(h.wb.edit(0, "same"), Transition::Applied);
        assert!(h.wb.active_document().unwrap().is_dirty);
        assert_eq!(h.wb.edit(4, "nowhere"), Transition::Unchanged);
    }

    #[test]
    fn test_diff_view_rejects_edits() {
        let mut h = Harness::new();
        h.wb.open_diff("/p/a.rs", "old".into(), "new".into());
        assert_eq!(h.wb.edit(0, "hack"), Transition::Unchanged);
        let doc = h.wb.active_document().unwrap();
        assert_eq!(doc.content, "new");
        assert!(!doc.is_dirty);
    }

    #[test]
    fn test_secondary_not_focusable_when_unsplit() {
        let mut h = Harness::new();
        assert_eq!(h.wb.focus_group(GroupId::Secondary), Transition::Unchanged);
        assert_eq!(h.wb.select(GroupId::Secondary, 0), Transition::Unchanged);
        assert_eq!(h.wb.active_group(), GroupId::Primary);
    }

    #[test]
    fn test_dirty_documents_lists_both_groups() {
        let mut h = Harness::new();
        h.wb.new_file();
        assert!(h.wb.has_dirty_documents());
        let _ = h.wb.toggle_split();
        let dirty: Vec<GroupId> = h.wb.dirty_documents().map(|(id, _)| id).collect();
        assert_eq!(dirty, vec![GroupId::Primary, GroupId::Secondary]);
    }
}
