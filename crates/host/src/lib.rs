//! Host-side collaborators of the editor groups.
//!
//! The workbench never touches the disk or the user directly. It goes
//! through these traits:
//! - `FileAccess` - read/write/exists
//! - `SavePathPrompt` - destination picker for never-saved documents
//! - `RefreshNotifier` - "on-disk state may have changed" signal
//! - `RevisionSource` - base revision content for diff views

mod local;
mod notify;

pub use local::LocalFileAccess;
pub use notify::ChannelNotifier;

use std::path::{Path, PathBuf};

use anyhow::Result;

/// Filesystem access.
pub trait FileAccess {
    fn read_file(&self, path: &Path) -> Result<String>;
    fn write_file(&self, path: &Path, content: &str) -> Result<()>;
    fn exists(&self, path: &Path) -> Result<bool>;
}

/// Outcome of the destination picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    Chosen(PathBuf),
    Cancelled,
}

/// Asks the user where to save a never-saved document.
pub trait SavePathPrompt {
    /// `placeholder` is the document's current `untitled-N` path.
    fn prompt_save_path(&mut self, placeholder: &Path) -> SaveTarget;
}

/// Fire-and-forget notification consumed by file tree views.
pub trait RefreshNotifier {
    fn workspace_changed(&self);
}

/// Source of the base revision shown on the left of a diff.
pub trait RevisionSource {
    /// Content of `relative` at the base revision of `root`.
    ///
    /// `Ok(None)` when the file does not exist in that revision.
    fn head_content(&self, root: &Path, relative: &Path) -> Result<Option<String>>;
}
