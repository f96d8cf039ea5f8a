//! Open documents and placeholder paths.

use std::path::{Path, PathBuf};

/// Prefix of the synthetic path given to never-saved documents.
pub const UNTITLED_PREFIX: &str = "untitled-";

/// Build the placeholder path `untitled-N`.
pub fn placeholder_path(number: u32) -> PathBuf {
    PathBuf::from(format!("{}{}", UNTITLED_PREFIX, number))
}

/// Number of a placeholder path, or `None` for real paths.
///
/// A placeholder is a single relative component `untitled-N`, so an
/// absolute `/tmp/untitled-1` on disk is never mistaken for one.
pub fn placeholder_number(path: &Path) -> Option<u32> {
    let mut components = path.components();
    let first = components.next()?;
    if components.next().is_some() {
        return None;
    }
    match first {
        std::path::Component::Normal(name) => name
            .to_str()?
            .strip_prefix(UNTITLED_PREFIX)?
            .parse()
            .ok(),
        _ => None,
    }
}

/// Read-only comparison payload of a diff document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffView {
    /// Content at the base revision
    pub original: String,
    /// Working copy content
    pub modified: String,
}

/// Identity of a document inside a group.
///
/// A path can be open once as an editable document and once as a diff.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub path: PathBuf,
    pub diff: bool,
}

/// One open editable (or diff-view) unit of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub content: String,
    pub is_dirty: bool,
    pub diff: Option<DiffView>,
}

impl Document {
    /// Document freshly loaded from disk.
    pub fn from_disk(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            is_dirty: false,
            diff: None,
        }
    }

    /// Empty never-saved document. Starts dirty.
    pub fn untitled(number: u32) -> Self {
        Self {
            path: placeholder_path(number),
            content: String::new(),
            is_dirty: true,
            diff: None,
        }
    }

    /// Read-only comparison view. Its content is the modified side.
    pub fn diff(path: impl Into<PathBuf>, original: String, modified: String) -> Self {
        Self {
            path: path.into(),
            content: modified.clone(),
            is_dirty: false,
            diff: Some(DiffView { original, modified }),
        }
    }

    pub fn is_diff(&self) -> bool {
        self.diff.is_some()
    }

    /// Whether the path is a synthetic `untitled-N` placeholder.
    pub fn is_placeholder(&self) -> bool {
        placeholder_number(&self.path).is_some()
    }

    pub fn key(&self) -> DocumentKey {
        DocumentKey {
            path: self.path.clone(),
            diff: self.is_diff(),
        }
    }

    pub fn matches(&self, key: &DocumentKey) -> bool {
        self.path == key.path && self.is_diff() == key.diff
    }

    /// Tab title: file name, or the whole placeholder.
    pub fn title(&self) -> String {
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| self.path.display().to_string());
        if self.is_diff() {
            format!("{} (diff)", name)
        } else {
            name
        }
    }
}
