//! Line-based prompts standing in for the save dialog and the unsaved-changes modal.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use gluon_host::{SavePathPrompt, SaveTarget};
use gluon_workbench::UnsavedDecision;

/// Print `question` and read one trimmed line. `None` on end of input.
pub fn ask(input: &mut impl BufRead, output: &mut impl Write, question: &str) -> Option<String> {
    let _ = write!(output, "{}", question);
    let _ = output.flush();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim().to_string()),
        Err(e) => {
            gluon_logger::error(format!("Failed to read input: {}", e));
            None
        }
    }
}

/// Ask what to do about unsaved changes until the answer parses.
///
/// End of input counts as cancel.
pub fn ask_unsaved_decision(
    input: &mut impl BufRead,
    output: &mut impl Write,
    dirty: &[PathBuf],
) -> UnsavedDecision {
    let _ = writeln!(output, "Unsaved changes in:");
    for path in dirty {
        let _ = writeln!(output, "  {}", path.display());
    }

    loop {
        let Some(answer) = ask(input, output, "[s]ave, [d]on't save, [c]ancel? ") else {
            return UnsavedDecision::Cancel;
        };
        match answer.parse::<UnsavedDecision>() {
            Ok(decision) => return decision,
            Err(e) => {
                let _ = writeln!(output, "{}", e);
            }
        }
    }
}

/// Turn the destination answer into a save target. Relative paths are
/// resolved against `base`; an empty answer cancels.
pub fn save_target(answer: Option<String>, base: &Path) -> SaveTarget {
    match answer {
        Some(answer) if !answer.is_empty() => {
            let path = PathBuf::from(answer);
            if path.is_absolute() {
                SaveTarget::Chosen(path)
            } else {
                SaveTarget::Chosen(base.join(path))
            }
        }
        _ => SaveTarget::Cancelled,
    }
}

/// Save-path picker reading from the shell's input.
pub struct LinePrompt<R> {
    input: Rc<RefCell<R>>,
}

impl<R> LinePrompt<R> {
    pub fn new(input: Rc<RefCell<R>>) -> Self {
        Self { input }
    }
}

impl<R: BufRead> SavePathPrompt for LinePrompt<R> {
    fn prompt_save_path(&mut self, placeholder: &Path) -> SaveTarget {
        let base = std::env::current_dir().unwrap_or_default();
        let answer = ask(
            &mut *self.input.borrow_mut(),
            &mut io::stdout(),
            &format!("Save {} as (empty to cancel): ", placeholder.display()),
        );
        save_target(answer, &base)
    }
}
