//! `FileAccess` backed by the local filesystem.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::FileAccess;

const MEGABYTE: u64 = 1024 * 1024;

/// Local disk access with a size cap on reads.
#[derive(Debug, Clone)]
pub struct LocalFileAccess {
    max_file_size: u64,
}

impl LocalFileAccess {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }
}

impl Default for LocalFileAccess {
    fn default() -> Self {
        Self::new(20 * MEGABYTE)
    }
}

impl FileAccess for LocalFileAccess {
    fn read_file(&self, path: &Path) -> Result<String> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        if metadata.is_dir() {
            bail!("{} is a directory", path.display());
        }
        if metadata.len() > self.max_file_size {
            bail!(
                "File is too large to open ({:.1} MB). Maximum allowed size is {} MB.",
                metadata.len() as f64 / MEGABYTE as f64,
                self.max_file_size / MEGABYTE
            );
        }

        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory {}", parent.display())
                })?;
            }
        }
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        gluon_logger::debug(format!("Wrote {} bytes to {}", content.len(), path.display()));
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        path.try_exists()
            .with_context(|| format!("Failed to check {}", path.display()))
    }
}
