//! State types and data structures for gluon.
//!
//! Pure data: documents, editor groups and group identifiers, with no
//! knowledge of disks, prompts or the front end.

mod document;
mod group;
mod layout;

pub use document::{
    placeholder_number, placeholder_path, DiffView, Document, DocumentKey, UNTITLED_PREFIX,
};
pub use group::EditorGroup;
pub use layout::{GroupSnapshot, LayoutSnapshot};

/// Which of the two editor groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GroupId {
    #[default]
    Primary,
    Secondary,
}

impl GroupId {
    pub const ALL: [GroupId; 2] = [GroupId::Primary, GroupId::Secondary];

    /// The other group.
    pub fn other(self) -> Self {
        match self {
            GroupId::Primary => GroupId::Secondary,
            GroupId::Secondary => GroupId::Primary,
        }
    }

    /// Slot in a `[EditorGroup; 2]`.
    pub fn index(self) -> usize {
        match self {
            GroupId::Primary => 0,
            GroupId::Secondary => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GroupId::Primary => "primary",
            GroupId::Secondary => "secondary",
        }
    }
}

impl std::str::FromStr for GroupId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" | "left" | "1" => Ok(GroupId::Primary),
            "secondary" | "right" | "2" => Ok(GroupId::Secondary),
            _ => Err(format!("Unknown group: {}", s)),
        }
    }
}
