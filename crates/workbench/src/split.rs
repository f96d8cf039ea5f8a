//! Split view, tab reordering and moving tabs between groups.

use gluon_state::{Document, GroupId};

use crate::{Transition, Workbench};

impl Workbench {
    /// Toggle split view.
    ///
    /// Turning it on seeds an empty secondary group with the focused primary
    /// document and focuses the secondary group. Turning it off merges the
    /// secondary tabs into primary (skipping ones already there) and focuses
    /// primary on whatever was focused in secondary.
    pub fn toggle_split(&mut self) -> Transition {
        if self.pending.is_some() {
            gluon_logger::warn("Split toggle refused: a confirmation is pending");
            return Transition::Blocked;
        }

        if !self.split {
            self.split = true;
            if self.group(GroupId::Secondary).is_empty() {
                if let Some(document) = self.group(GroupId::Primary).active_document().cloned() {
                    self.group_mut(GroupId::Secondary).push(document);
                }
            }
            self.active_group = GroupId::Secondary;
            gluon_logger::debug("Split view on");
        } else {
            let focused = self
                .group(GroupId::Secondary)
                .active_document()
                .map(Document::key);
            let primary_focus = self
                .group(GroupId::Primary)
                .active_document()
                .map(Document::key);

            let incoming = self.group_mut(GroupId::Secondary).take_all();
            let primary = self.group_mut(GroupId::Primary);
            for document in incoming {
                if !primary.contains(&document.key()) {
                    primary.push(document);
                }
            }

            if let Some(index) = focused
                .or(primary_focus)
                .and_then(|key| primary.position_of(&key))
            {
                primary.focus(index);
            }

            self.split = false;
            self.active_group = GroupId::Primary;
            gluon_logger::debug("Split view off");
        }

        self.debug_check();
        Transition::Applied
    }

    /// Move the focused tab of `from` to the other group.
    ///
    /// If the other group already has it, that tab is focused instead of
    /// adding a duplicate. Moving out of primary while unsplit turns split
    /// view on. Focus follows the document.
    pub fn move_to_other_group(&mut self, from: GroupId) -> Transition {
        if self.pending.is_some() {
            gluon_logger::warn("Move refused: a confirmation is pending");
            return Transition::Blocked;
        }

        let Some(index) = self.group(from).active_index() else {
            gluon_logger::warn(format!("Move ignored: {} group is empty", from.as_str()));
            return Transition::Unchanged;
        };
        let Some(document) = self.group_mut(from).remove(index) else {
            return Transition::Unchanged;
        };

        let to = from.other();
        let target = self.group_mut(to);
        match target.position_of(&document.key()) {
            Some(existing) => {
                target.focus(existing);
            }
            None => {
                target.push(document);
            }
        }

        if from == GroupId::Primary && !self.split {
            self.split = true;
        }
        self.active_group = to;

        self.debug_check();
        Transition::Applied
    }

    /// Move a tab within a group. The focused document stays focused.
    pub fn reorder(&mut self, from: usize, to: usize, id: GroupId) -> Transition {
        if from == to {
            return Transition::Unchanged;
        }
        if !self.group_mut(id).move_document(from, to) {
            gluon_logger::warn(format!("Reorder ignored: {} -> {} out of range", from, to));
            return Transition::Unchanged;
        }
        self.debug_check();
        Transition::Applied
    }

    /// Drop every tab whose file is `path` or lies beneath it.
    ///
    /// Used when the file disappeared outside the editor, so there is
    /// nothing left to confirm. Returns how many tabs were closed.
    pub fn file_deleted_externally(&mut self, path: impl AsRef<std::path::Path>) -> usize {
        let path = path.as_ref();
        let mut removed = 0;

        for id in GroupId::ALL {
            removed += self
                .group_mut(id)
                .remove_where(|d, _| !d.is_placeholder() && d.path.starts_with(path), None)
                .len();
        }

        if removed > 0 {
            gluon_logger::info(format!(
                "Closed {} tab(s) for removed path {}",
                removed,
                path.display()
            ));
        }
        self.debug_check();
        removed
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::testing::Harness;
    use crate::UnsavedDecision;

    fn open(h: &mut Harness, paths: &[&str]) {
        for path in paths {
            h.fs.insert(path, path);
            h.wb.open(path).unwrap();
        }
    }

    fn paths(h: &Harness, id: GroupId) -> Vec<PathBuf> {
        h.wb.group(id).iter().map(|d| d.path.clone()).collect()
    }

    #[test]
    fn test_reorder_preserves_focus_target() {
        let mut h = Harness::new();
        open(&mut h, &["/p/a", "/p/b", "/p/c", "/p/d"]);
        let _ = h.wb.select(GroupId::Primary, 1);

        assert_eq!(h.wb.reorder(1, 3, GroupId::Primary), Transition::Applied);
        assert_eq!(h.wb.active_document().unwrap().path, PathBuf::from("/p/b"));
        assert_eq!(h.wb.group(GroupId::Primary).active_index(), Some(3));

        assert_eq!(h.wb.reorder(0, 2, GroupId::Primary), Transition::Applied);
        assert_eq!(h.wb.active_document().unwrap().path, PathBuf::from("/p/b"));

        assert_eq!(h.wb.reorder(0, 9, GroupId::Primary), Transition::Unchanged);
    }

    #[test]
    fn test_split_seeds_secondary_with_active_document() {
        let mut h = Harness::new();
        open(&mut h, &["/p/a", "/p/b"]);

        assert_eq!(h.wb.toggle_split(), Transition::Applied);
        assert!(h.wb.is_split());
        assert_eq!(h.wb.active_group(), GroupId::Secondary);
        assert_eq!(paths(&h, GroupId::Secondary), vec![PathBuf::from("/p/b")]);
    }

    #[test]
    fn test_split_with_empty_primary_leaves_secondary_empty() {
        let mut h = Harness::new();
        let _ = h.wb.toggle_split();
        assert!(h.wb.group(GroupId::Secondary).is_empty());
        assert_eq!(h.wb.active_group(), GroupId::Secondary);
    }

    #[test]
    fn test_split_round_trip_loses_nothing() {
        let mut h = Harness::new();
        open(&mut h, &["/p/a", "/p/b"]);
        let before = paths(&h, GroupId::Primary);

        let _ = h.wb.toggle_split();
        let _ = h.wb.toggle_split();

        let after = paths(&h, GroupId::Primary);
        assert!(before.iter().all(|p| after.contains(p)));
        assert_eq!(after.len(), before.len());
        assert!(h.wb.group(GroupId::Secondary).is_empty());
        assert!(!h.wb.is_split());
        assert_eq!(h.wb.active_group(), GroupId::Primary);
    }

    #[test]
    fn test_unsplit_merges_new_tabs_and_focuses_them() {
        let mut h = Harness::new();
        open(&mut h, &["/p/a"]);
        let _ = h.wb.toggle_split();
        open(&mut h, &["/p/z"]);

        let _ = h.wb.toggle_split();
        assert_eq!(
            paths(&h, GroupId::Primary),
            vec![PathBuf::from("/p/a"), PathBuf::from("/p/z")]
        );
        assert_eq!(h.wb.active_document().unwrap().path, PathBuf::from("/p/z"));
    }

    #[test]
    fn test_edits_are_shared_between_panes() {
        let mut h = Harness::new();
        open(&mut h, &["/p/a"]);
        let _ = h.wb.toggle_split();
        let _ = h.wb.edit(0, "from the right pane");

        let left = h.wb.group(GroupId::Primary).get(0).unwrap();
        assert_eq!(left.content, "from the right pane");
        assert!(left.is_dirty);

        h.wb.save(None).unwrap();
        assert!(!h.wb.group(GroupId::Primary).get(0).unwrap().is_dirty);
        assert!(!h.wb.group(GroupId::Secondary).get(0).unwrap().is_dirty);
    }

    #[test]
    fn test_move_from_primary_turns_split_on() {
        let mut h = Harness::new();
        open(&mut h, &["/p/a", "/p/b"]);

        assert_eq!(h.wb.move_to_other_group(GroupId::Primary), Transition::Applied);
        assert!(h.wb.is_split());
        assert_eq!(h.wb.active_group(), GroupId::Secondary);
        assert_eq!(paths(&h, GroupId::Primary), vec![PathBuf::from("/p/a")]);
        assert_eq!(paths(&h, GroupId::Secondary), vec![PathBuf::from("/p/b")]);
    }

    #[test]
    fn test_move_focuses_existing_copy_instead_of_duplicating() {
        let mut h = Harness::new();
        open(&mut h, &["/p/a", "/p/b"]);
        let _ = h.wb.toggle_split();
        let _ = h.wb.focus_group(GroupId::Primary);

        assert_eq!(h.wb.move_to_other_group(GroupId::Primary), Transition::Applied);
        assert_eq!(paths(&h, GroupId::Secondary), vec![PathBuf::from("/p/b")]);
        assert_eq!(paths(&h, GroupId::Primary), vec![PathBuf::from("/p/a")]);
    }

    #[test]
    fn test_move_from_empty_group_is_noop() {
        let mut h = Harness::new();
        assert_eq!(
            h.wb.move_to_other_group(GroupId::Primary),
            Transition::Unchanged
        );
        assert!(!h.wb.is_split());
    }

    #[test]
    fn test_structural_changes_blocked_while_pending() {
        let mut h = Harness::new();
        open(&mut h, &["/p/a"]);
        let _ = h.wb.edit(0, "x");
        assert_eq!(h.wb.close(0), Transition::NeedsConfirmation);

        assert_eq!(h.wb.toggle_split(), Transition::Blocked);
        assert_eq!(h.wb.move_to_other_group(GroupId::Primary), Transition::Blocked);
        let _ = h.wb.resolve_confirmation(UnsavedDecision::Cancel);
        assert_eq!(h.wb.toggle_split(), Transition::Applied);
    }

    #[test]
    fn test_deleted_directory_closes_nested_documents() {
        let mut h = Harness::new();
        open(&mut h, &["/p/src/a.rs", "/p/src/util/b.rs", "/p/srcx.rs", "/p/README"]);
        let _ = h.wb.edit(1, "unsaved work");

        let removed = h.wb.file_deleted_externally("/p/src");
        assert_eq!(removed, 2);
        assert!(h.wb.pending_confirmation().is_none());
        assert_eq!(
            paths(&h, GroupId::Primary),
            vec![PathBuf::from("/p/srcx.rs"), PathBuf::from("/p/README")]
        );
        assert_eq!(h.wb.active_document().unwrap().path, PathBuf::from("/p/README"));
    }

    #[test]
    fn test_deleting_active_file_clamps_in_both_groups() {
        let mut h = Harness::new();
        open(&mut h, &["/p/a", "/p/b"]);
        let _ = h.wb.toggle_split();

        assert_eq!(h.wb.file_deleted_externally("/p/b"), 2);
        assert_eq!(h.wb.group(GroupId::Primary).active_index(), Some(0));
        assert_eq!(h.wb.group(GroupId::Secondary).active_index(), None);

        assert_eq!(h.wb.file_deleted_externally("/p/a"), 1);
        assert_eq!(h.wb.group(GroupId::Primary).active_index(), None);
        assert_eq!(h.wb.file_deleted_externally("/p/missing"), 0);
    }

    #[test]
    fn test_new_file_numbers_never_collide() {
        let mut h = Harness::new();
        assert_eq!(h.wb.new_file(), 0);
        assert_eq!(h.wb.new_file(), 1);
        assert_eq!(
            paths(&h, GroupId::Primary),
            vec![PathBuf::from("untitled-1"), PathBuf::from("untitled-2")]
        );
        assert_eq!(h.wb.group(GroupId::Primary).active_index(), Some(1));

        // Numbers used by the other group are skipped too
        let _ = h.wb.toggle_split();
        h.wb.new_file();
        assert_eq!(
            paths(&h, GroupId::Secondary),
            vec![PathBuf::from("untitled-2"), PathBuf::from("untitled-3")]
        );
    }
}
