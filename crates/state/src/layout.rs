//! Persistable description of the two-group layout.

use std::path::PathBuf;

use crate::GroupId;

/// Tabs of one group. Only real, editable files are recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSnapshot {
    pub paths: Vec<PathBuf>,
    pub active: Option<usize>,
}

/// Both groups plus split and focus state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutSnapshot {
    pub primary: GroupSnapshot,
    pub secondary: GroupSnapshot,
    pub split: bool,
    pub focused: GroupId,
}

impl LayoutSnapshot {
    pub fn group(&self, id: GroupId) -> &GroupSnapshot {
        match id {
            GroupId::Primary => &self.primary,
            GroupId::Secondary => &self.secondary,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.paths.is_empty() && self.secondary.paths.is_empty()
    }
}
