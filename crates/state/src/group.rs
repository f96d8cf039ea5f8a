//! Ordered collection of open documents with a focus cursor.

use std::path::Path;

use crate::{Document, DocumentKey};

/// One tab strip: documents in display order plus the focused index.
///
/// `active` is `None` exactly when the group is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorGroup {
    documents: Vec<Document>,
    active: Option<usize>,
}

impl EditorGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of documents in group.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if group is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Document> {
        self.documents.get_mut(index)
    }

    /// Focused index.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.active.and_then(|i| self.documents.get(i))
    }

    /// Editable document with `path`.
    pub fn position_editable(&self, path: &Path) -> Option<usize> {
        self.documents
            .iter()
            .position(|d| d.path == path && !d.is_diff())
    }

    pub fn position_of(&self, key: &DocumentKey) -> Option<usize> {
        self.documents.iter().position(|d| d.matches(key))
    }

    pub fn contains(&self, key: &DocumentKey) -> bool {
        self.position_of(key).is_some()
    }

    /// Focus document by index. Out-of-range indices are ignored.
    pub fn focus(&mut self, index: usize) -> bool {
        if index < self.documents.len() {
            self.active = Some(index);
            true
        } else {
            false
        }
    }

    /// Append a document and focus it. Returns its index.
    pub fn push(&mut self, document: Document) -> usize {
        self.documents.push(document);
        let index = self.documents.len() - 1;
        self.active = Some(index);
        index
    }

    /// Replace the document at `index` in place.
    pub fn replace(&mut self, index: usize, document: Document) -> bool {
        match self.documents.get_mut(index) {
            Some(slot) => {
                *slot = document;
                true
            }
            None => false,
        }
    }

    /// Remove document by index.
    ///
    /// Removing the focused document focuses `min(index, len - 1)`; removing
    /// one before it shifts focus left; removing one after it keeps focus.
    pub fn remove(&mut self, index: usize) -> Option<Document> {
        if index >= self.documents.len() {
            return None;
        }
        let mut removed = self.remove_where(|_, i| i == index, None);
        removed.pop()
    }

    /// Remove every document matching `pred(document, index)` in one pass.
    ///
    /// Focus stays on the previously focused document if it survives,
    /// otherwise moves to `fallback` if that survives, otherwise to
    /// `min(old_active, len - 1)`.
    pub fn remove_where<F>(&mut self, mut pred: F, fallback: Option<&DocumentKey>) -> Vec<Document>
    where
        F: FnMut(&Document, usize) -> bool,
    {
        let old_active = self.active;
        let old_active_key = self.active_document().map(Document::key);

        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.documents.len());
        for (index, document) in std::mem::take(&mut self.documents).into_iter().enumerate() {
            if pred(&document, index) {
                removed.push(document);
            } else {
                kept.push(document);
            }
        }
        self.documents = kept;

        if removed.is_empty() {
            return removed;
        }

        self.active = if self.documents.is_empty() {
            None
        } else {
            let last = self.documents.len() - 1;
            old_active_key
                .as_ref()
                .and_then(|key| self.position_of(key))
                .or_else(|| fallback.and_then(|key| self.position_of(key)))
                .or(Some(old_active.unwrap_or(0).min(last)))
        };

        removed
    }

    /// Move a document within the group, keeping the focused document focused.
    pub fn move_document(&mut self, from: usize, to: usize) -> bool {
        if from >= self.documents.len() || to >= self.documents.len() {
            return false;
        }
        if from == to {
            return true;
        }

        let focused = self.active_document().map(Document::key);
        let document = self.documents.remove(from);
        self.documents.insert(to, document);
        self.active = focused.and_then(|key| self.position_of(&key));
        true
    }

    /// Take all documents (empties the group).
    pub fn take_all(&mut self) -> Vec<Document> {
        self.active = None;
        std::mem::take(&mut self.documents)
    }

    /// Replace the whole list. `active` is clamped into range.
    pub fn reset(&mut self, documents: Vec<Document>, active: Option<usize>) {
        self.documents = documents;
        self.active = if self.documents.is_empty() {
            None
        } else {
            Some(active.unwrap_or(0).min(self.documents.len() - 1))
        };
    }

    /// Cursor invariant: `None` iff empty, otherwise in range.
    pub fn is_consistent(&self) -> bool {
        match self.active {
            None => self.documents.is_empty(),
            Some(i) => i < self.documents.len(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }
}
