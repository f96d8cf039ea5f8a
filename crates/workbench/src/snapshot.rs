//! Export and rebuild the tab layout for session persistence.

use gluon_state::{Document, EditorGroup, GroupId, GroupSnapshot, LayoutSnapshot};

use crate::Workbench;

fn snapshot_group(group: &EditorGroup) -> GroupSnapshot {
    let focused = group.active_document().map(Document::key);
    let persisted: Vec<&Document> = group
        .iter()
        .filter(|d| !d.is_diff() && !d.is_placeholder())
        .collect();

    GroupSnapshot {
        paths: persisted.iter().map(|d| d.path.clone()).collect(),
        active: focused.and_then(|key| persisted.iter().position(|d| d.matches(&key))),
    }
}

impl Workbench {
    /// Current layout. Untitled documents and diff views are left out.
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            primary: snapshot_group(self.group(GroupId::Primary)),
            secondary: snapshot_group(self.group(GroupId::Secondary)),
            split: self.split,
            focused: self.active_group,
        }
    }

    /// Rebuild a saved layout by reopening its files.
    ///
    /// Only allowed while both groups are empty. Files that no longer exist
    /// or fail to read are skipped. Returns the number of tabs opened.
    pub fn restore(&mut self, snapshot: &LayoutSnapshot) -> usize {
        if self.groups.iter().any(|g| !g.is_empty()) {
            gluon_logger::warn("Session restore skipped: tabs are already open");
            return 0;
        }

        let mut opened = 0;
        for id in GroupId::ALL {
            let saved = snapshot.group(id);
            let focused = saved.active.and_then(|i| saved.paths.get(i));
            let mut documents = Vec::with_capacity(saved.paths.len());
            let mut active = None;

            for path in &saved.paths {
                match self.services.files.exists(path) {
                    Ok(true) => {}
                    Ok(false) => {
                        gluon_logger::info(format!("Session file gone: {}", path.display()));
                        continue;
                    }
                    Err(e) => {
                        gluon_logger::warn(format!("Session file check failed: {:#}", e));
                        continue;
                    }
                }
                match self.services.files.read_file(path) {
                    Ok(content) => {
                        if Some(path) == focused {
                            active = Some(documents.len());
                        }
                        documents.push(Document::from_disk(path.clone(), content));
                    }
                    Err(e) => {
                        gluon_logger::warn(format!("Session file unreadable: {:#}", e));
                    }
                }
            }

            opened += documents.len();
            self.group_mut(id).reset(documents, active);
        }

        self.split = snapshot.split && !self.group(GroupId::Secondary).is_empty();
        self.active_group = if self.split {
            snapshot.focused
        } else {
            GroupId::Primary
        };

        gluon_logger::info(format!("Restored {} tab(s) from session", opened));
        self.debug_check();
        opened
    }
}
