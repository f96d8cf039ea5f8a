//! In-memory collaborators for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{anyhow, Result};

use gluon_host::{FileAccess, RefreshNotifier, RevisionSource, SavePathPrompt, SaveTarget};

use crate::{Services, Workbench};

/// Shared in-memory filesystem.
#[derive(Clone, Default)]
pub(crate) struct MemoryFs {
    files: Rc<RefCell<HashMap<PathBuf, String>>>,
    failing: Rc<RefCell<HashSet<PathBuf>>>,
}

impl MemoryFs {
    pub fn insert(&self, path: impl AsRef<Path>, content: &str) {
        self.files
            .borrow_mut()
            .insert(path.as_ref().to_path_buf(), content.to_string());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    pub fn fail_writes_to(&self, path: impl AsRef<Path>) {
        self.failing.borrow_mut().insert(path.as_ref().to_path_buf());
    }
}

impl FileAccess for MemoryFs {
    fn read_file(&self, path: &Path) -> Result<String> {
        self.get(path)
            .ok_or_else(|| anyhow!("No such file: {}", path.display()))
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if self.failing.borrow().contains(path) {
            return Err(anyhow!("Permission denied: {}", path.display()));
        }
        self.insert(path, content);
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.files.borrow().contains_key(path))
    }
}

/// Answers destination prompts from a queue; an empty queue cancels.
struct QueuedPrompt {
    answers: Rc<RefCell<VecDeque<SaveTarget>>>,
    calls: Rc<Cell<usize>>,
}

impl SavePathPrompt for QueuedPrompt {
    fn prompt_save_path(&mut self, _placeholder: &Path) -> SaveTarget {
        self.calls.set(self.calls.get() + 1);
        self.answers
            .borrow_mut()
            .pop_front()
            .unwrap_or(SaveTarget::Cancelled)
    }
}

struct CountingNotifier(Rc<Cell<usize>>);

impl RefreshNotifier for CountingNotifier {
    fn workspace_changed(&self) {
        self.0.set(self.0.get() + 1);
    }
}

/// HEAD contents keyed by path relative to the root.
#[derive(Clone, Default)]
pub(crate) struct MemoryRevisions(Rc<RefCell<HashMap<PathBuf, String>>>);

impl MemoryRevisions {
    pub fn insert(&self, relative: &str, content: &str) {
        self.0
            .borrow_mut()
            .insert(PathBuf::from(relative), content.to_string());
    }
}

impl RevisionSource for MemoryRevisions {
    fn head_content(&self, _root: &Path, relative: &Path) -> Result<Option<String>> {
        Ok(self.0.borrow().get(relative).cloned())
    }
}

/// Workbench wired to in-memory collaborators.
pub(crate) struct Harness {
    pub wb: Workbench,
    pub fs: MemoryFs,
    pub revisions: MemoryRevisions,
    answers: Rc<RefCell<VecDeque<SaveTarget>>>,
    prompt_calls: Rc<Cell<usize>>,
    refreshes: Rc<Cell<usize>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_fs(MemoryFs::default())
    }

    pub fn with_fs(fs: MemoryFs) -> Self {
        let answers = Rc::new(RefCell::new(VecDeque::new()));
        let prompt_calls = Rc::new(Cell::new(0));
        let refreshes = Rc::new(Cell::new(0));
        let revisions = MemoryRevisions::default();

        let services = Services {
            files: Box::new(fs.clone()),
            save_prompt: Box::new(QueuedPrompt {
                answers: answers.clone(),
                calls: prompt_calls.clone(),
            }),
            notifier: Box::new(CountingNotifier(refreshes.clone())),
            revisions: Box::new(revisions.clone()),
        };

        Self {
            wb: Workbench::new(services),
            fs,
            revisions,
            answers,
            prompt_calls,
            refreshes,
        }
    }

    pub fn queue_prompt(&self, answer: SaveTarget) {
        self.answers.borrow_mut().push_back(answer);
    }

    pub fn prompt_calls(&self) -> usize {
        self.prompt_calls.get()
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.get()
    }
}
