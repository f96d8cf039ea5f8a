//! Interactive command shell driving the workbench.

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::Receiver;

use anyhow::{bail, Context, Result};
use crossterm::style::Stylize;
use similar::TextDiff;

use gluon_config::Config;
use gluon_git::DiffSummary;
use gluon_session::{RecentProjects, Session};
use gluon_state::GroupId;
use gluon_watcher::ProjectWatcher;
use gluon_workbench::{SaveOutcome, Transition, Workbench};

use crate::command::{Command, HELP};
use crate::prompt;

/// Tab strip lines: one per visible group, focused tab highlighted.
pub fn render_tabs(wb: &Workbench) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(match wb.project_root() {
        Some(root) => format!("project: {}", root.display()),
        None => "project: (none)".to_string(),
    });

    let visible: &[GroupId] = if wb.is_split() {
        &GroupId::ALL
    } else {
        &[GroupId::Primary]
    };

    for &id in visible {
        let group = wb.group(id);
        let focused = id == wb.active_group();
        let label = format!("{:>9} |", id.as_str());
        let mut line = if focused {
            label.bold().to_string()
        } else {
            label.dark_grey().to_string()
        };

        if group.is_empty() {
            line.push_str(&" (empty)".dark_grey().to_string());
        }
        for (index, document) in group.iter().enumerate() {
            let marker = if document.is_dirty { "*" } else { "" };
            let tab = format!(" {}:{}{} ", index + 1, document.title(), marker);
            let styled = if Some(index) == group.active_index() {
                if focused {
                    tab.reverse().to_string()
                } else {
                    tab.underlined().to_string()
                }
            } else if document.is_diff() {
                tab.cyan().to_string()
            } else {
                tab
            };
            line.push_str(&styled);
        }
        lines.push(line);
    }
    lines
}

pub struct Shell<R, W> {
    wb: Workbench,
    config: Config,
    data_dir: PathBuf,
    recent: RecentProjects,
    watcher: Option<ProjectWatcher>,
    refresh: Receiver<()>,
    /// Shared with the save-path prompt
    input: Rc<RefCell<R>>,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(
        wb: Workbench,
        config: Config,
        data_dir: PathBuf,
        refresh: Receiver<()>,
        input: Rc<RefCell<R>>,
        output: W,
    ) -> Self {
        let recent = RecentProjects::load_from(&RecentProjects::file_in(&data_dir))
            .unwrap_or_else(|e| {
                gluon_logger::warn(format!("Recent projects unavailable: {:#}", e));
                RecentProjects::default()
            });

        Self {
            wb,
            config,
            data_dir,
            recent,
            watcher: None,
            refresh,
            input,
            output,
        }
    }

    fn say(&mut self, message: impl std::fmt::Display) {
        let _ = writeln!(self.output, "{}", message);
    }

    fn print_tabs(&mut self) {
        for line in render_tabs(&self.wb) {
            self.say(line);
        }
    }

    /// Relative paths resolve against the project root, else the working directory.
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.wb.project_root() {
            Some(root) => root.join(path),
            None => std::env::current_dir().unwrap_or_default().join(path),
        }
    }

    /// Read commands until `quit` succeeds or input ends.
    pub fn run(&mut self) -> Result<()> {
        self.print_tabs();
        loop {
            self.drain_events();
            let line = prompt::ask(&mut *self.input.borrow_mut(), &mut self.output, "gluon> ");
            let Some(line) = line else {
                self.shutdown();
                return Ok(());
            };

            match Command::parse(&line) {
                Ok(None) => {}
                Ok(Some(Command::Quit)) => {
                    if self.close_project() {
                        return Ok(());
                    }
                }
                Ok(Some(command)) => {
                    if let Err(e) = self.execute(command) {
                        gluon_logger::error(format!("{:#}", e));
                        self.say(format!("Error: {:#}", e).red());
                    }
                }
                Err(e) => self.say(e),
            }
        }
    }

    /// Apply refresh notifications and external deletions.
    fn drain_events(&mut self) {
        let refreshes = self.refresh.try_iter().count();
        if refreshes > 0 {
            gluon_logger::debug(format!("Workspace changed ({} notification(s))", refreshes));
        }

        let removed = self
            .watcher
            .as_ref()
            .map(ProjectWatcher::poll_removed)
            .unwrap_or_default();
        for path in removed {
            let closed = self.wb.file_deleted_externally(&path);
            if closed > 0 {
                self.say(format!(
                    "{} was removed, closed {} tab(s)",
                    path.display(),
                    closed
                ));
            }
        }
    }

    /// Run the unsaved-changes modal if the transition asks for it.
    fn settle(&mut self, transition: Transition) -> Transition {
        let transition = if transition == Transition::NeedsConfirmation {
            let (dirty, count) = self
                .wb
                .pending_confirmation()
                .map(|p| (p.dirty_paths(), p.target_count()))
                .unwrap_or_default();
            self.say(format!("Closing {} tab(s)", count));
            let decision = prompt::ask_unsaved_decision(
                &mut *self.input.borrow_mut(),
                &mut self.output,
                &dirty,
            );
            self.wb.resolve_confirmation(decision)
        } else {
            transition
        };
        self.report(transition);
        transition
    }

    fn report(&mut self, transition: Transition) {
        match transition {
            Transition::Applied => self.print_tabs(),
            Transition::Unchanged => self.say("Nothing changed"),
            Transition::Cancelled => self.say("Cancelled"),
            Transition::Blocked => self.say("Answer the pending confirmation first"),
            Transition::NeedsConfirmation => {}
        }
    }

    fn focused_index(&self) -> Result<usize> {
        match self.wb.group(self.wb.active_group()).active_index() {
            Some(index) => Ok(index),
            None => bail!("No document selected"),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Open(path) => {
                let path = self.resolve(&path);
                self.wb.open(&path)?;
                self.print_tabs();
            }
            Command::New => {
                self.wb.new_file();
                self.print_tabs();
            }
            Command::Edit(text) => {
                let index = self.focused_index()?;
                let transition = self.wb.edit(index, text);
                self.report(transition);
            }
            Command::Append(text) => {
                let index = self.focused_index()?;
                let mut content = self
                    .wb
                    .active_document()
                    .map(|d| d.content.clone())
                    .unwrap_or_default();
                if !content.is_empty() && !content.ends_with('\n') {
                    content.push('\n');
                }
                content.push_str(&text);
                let transition = self.wb.edit(index, content);
                self.report(transition);
            }
            Command::Save(index) => match self.wb.save(index)? {
                SaveOutcome::Saved(path) => {
                    self.say(format!("Saved {}", path.display()));
                    self.print_tabs();
                }
                SaveOutcome::Cancelled => self.say("Save cancelled"),
                SaveOutcome::Skipped => self.say("Nothing to save"),
            },
            Command::SaveAll => {
                let report = self.wb.save_all();
                if report.is_clean() {
                    self.say(format!("Saved {}", report.saved.len()));
                } else {
                    self.say(format!(
                        "Saved {}, cancelled {}, failed {}",
                        report.saved.len(),
                        report.cancelled,
                        report.failed.len()
                    ));
                }
                for (path, error) in &report.failed {
                    self.say(format!("  {}: {}", path.display(), error).red());
                }
                self.print_tabs();
            }
            Command::Close(index) => {
                let transition = match index {
                    Some(index) => self.wb.close(index),
                    None => self.wb.close_active(),
                };
                self.settle(transition);
            }
            Command::CloseOthers(index) => {
                let index = match index {
                    Some(index) => index,
                    None => self.focused_index()?,
                };
                let transition = self.wb.close_others(index);
                self.settle(transition);
            }
            Command::CloseRight(index) => {
                let index = match index {
                    Some(index) => index,
                    None => self.focused_index()?,
                };
                let transition = self.wb.close_to_right(index);
                self.settle(transition);
            }
            Command::CloseAll => {
                let transition = self.wb.close_all();
                self.settle(transition);
            }
            Command::Reorder { from, to } => {
                let transition = self.wb.reorder(from, to, self.wb.active_group());
                self.report(transition);
            }
            Command::Move => {
                let transition = self.wb.move_to_other_group(self.wb.active_group());
                self.report(transition);
            }
            Command::Split => {
                let transition = self.wb.toggle_split();
                self.report(transition);
            }
            Command::Focus(id) => {
                let transition = self.wb.focus_group(id);
                self.report(transition);
            }
            Command::Select { group, index } => {
                let transition = self.wb.select(group, index);
                self.report(transition);
            }
            Command::Diff(path) => self.open_diff(&path)?,
            Command::Tabs => self.print_tabs(),
            Command::Show => self.show(),
            Command::Project(arg) => {
                let path = match arg.parse::<usize>() {
                    Ok(number) if number >= 1 && number <= self.recent.len() => {
                        let path = self.recent.paths()[number - 1].to_path_buf();
                        if !path.is_dir() {
                            self.forget_recent(&path);
                            bail!("{} no longer exists", path.display());
                        }
                        path
                    }
                    _ => self.resolve(Path::new(&arg)),
                };
                self.open_project(&path)?;
            }
            Command::CloseProject => {
                self.close_project();
            }
            Command::Recent => {
                if self.recent.is_empty() {
                    self.say("No recent projects");
                }
                let lines: Vec<String> = self
                    .recent
                    .iter()
                    .enumerate()
                    .map(|(i, p)| format!("{:>3}  {}  ({})", i + 1, p.path.display(), p.opened_at))
                    .collect();
                for line in lines {
                    self.say(line);
                }
            }
            Command::Log(count) => {
                let entries = gluon_logger::get_entries();
                let skip = entries.len().saturating_sub(count);
                for entry in entries.into_iter().skip(skip) {
                    self.say(format!(
                        "{} [{}] {}",
                        entry.timestamp,
                        entry.level.to_str(),
                        entry.message
                    ));
                }
            }
            Command::Help => self.say(HELP),
            Command::Quit => {
                self.close_project();
            }
        }
        Ok(())
    }

    fn open_diff(&mut self, path: &Path) -> Result<()> {
        let Some(root) = self.wb.project_root().map(Path::to_path_buf) else {
            bail!("Open a project first");
        };
        let relative = if path.is_absolute() {
            path.strip_prefix(&root)
                .with_context(|| format!("{} is outside the project", path.display()))?
                .to_path_buf()
        } else {
            path.to_path_buf()
        };

        self.wb.open_git_diff(&relative)?;
        let summary = self
            .wb
            .active_document()
            .and_then(|d| d.diff.as_ref())
            .map(|diff| DiffSummary::compute(&diff.original, &diff.modified));
        match summary {
            Some(summary) if summary.is_empty() => {
                self.say(format!("{}: no changes against HEAD", relative.display()));
            }
            Some(summary) => self.say(format!("{}: {}", relative.display(), summary)),
            None => {}
        }
        self.print_tabs();
        Ok(())
    }

    fn show(&mut self) {
        let Some(document) = self.wb.active_document() else {
            self.say("No document selected");
            return;
        };

        let text = match &document.diff {
            Some(diff) => TextDiff::from_lines(diff.original.as_str(), diff.modified.as_str())
                .unified_diff()
                .header("HEAD", "working tree")
                .to_string(),
            None => document
                .content
                .lines()
                .enumerate()
                .map(|(i, line)| format!("{:>4} {}", i + 1, line))
                .collect::<Vec<_>>()
                .join("\n"),
        };
        self.say(text);
    }

    /// Switch to `path` as the project root, closing the current project first.
    pub fn open_project(&mut self, path: &Path) -> Result<()> {
        let root = path
            .canonicalize()
            .with_context(|| format!("Failed to resolve project: {}", path.display()))?;
        if !root.is_dir() {
            bail!("Not a directory: {}", root.display());
        }
        if self.wb.project_root().is_some() && !self.close_project() {
            return Ok(());
        }

        self.wb.open_project(&root);
        if gluon_git::find_repo_root(&root).is_none() {
            gluon_logger::debug(format!("{} is not inside a git repository", root.display()));
        }
        self.recent
            .add(&root, self.config.general.recent_projects_limit);
        self.save_recent();

        if self.config.general.restore_session {
            match Session::load_from(&Session::file_in(&self.data_dir, &root)) {
                Ok(session) => {
                    let restored = self.wb.restore(&session.layout());
                    if restored > 0 {
                        self.say(format!("Restored {} tab(s)", restored));
                    }
                }
                Err(e) => gluon_logger::warn(format!("Session not restored: {:#}", e)),
            }
        }

        self.watch(&root);
        self.print_tabs();
        Ok(())
    }

    fn save_recent(&self) {
        if let Err(e) = self
            .recent
            .save_to(&RecentProjects::file_in(&self.data_dir))
        {
            gluon_logger::warn(format!("Failed to save recent projects: {:#}", e));
        }
    }

    fn forget_recent(&mut self, path: &Path) {
        if self.recent.remove(path) {
            gluon_logger::info(format!("Dropped missing project {}", path.display()));
            self.save_recent();
        }
    }

    fn watch(&mut self, root: &Path) {
        if !self.config.watcher.enabled {
            return;
        }
        if self.watcher.is_none() {
            match ProjectWatcher::new(self.config.watcher.debounce_ms) {
                Ok(watcher) => self.watcher = Some(watcher),
                Err(e) => {
                    gluon_logger::warn(format!("{:#}", e));
                    return;
                }
            }
        }
        if let Some(watcher) = self.watcher.as_mut() {
            if watcher.root() == Some(root) {
                return;
            }
            if let Err(e) = watcher.watch_project(root) {
                gluon_logger::warn(format!("{:#}", e));
            }
        }
    }

    fn save_session(&self, root: &Path) {
        let session = Session::from(&self.wb.snapshot());
        match session.save_to(&Session::file_in(&self.data_dir, root)) {
            Ok(()) => gluon_logger::debug(format!("Session saved for {}", root.display())),
            Err(e) => gluon_logger::warn(format!("Failed to save session: {:#}", e)),
        }
    }

    /// Close every tab and the project, asking about unsaved changes.
    ///
    /// Returns whether everything was closed.
    fn close_project(&mut self) -> bool {
        let root = self.wb.project_root().map(Path::to_path_buf);
        if let Some(root) = &root {
            self.save_session(root);
        }

        let transition = self.wb.close_project();
        self.settle(transition);

        let closed = self.wb.project_root().is_none()
            && GroupId::ALL.iter().all(|&id| self.wb.group(id).is_empty());
        if closed {
            if let Some(watcher) = self.watcher.as_mut() {
                watcher.unwatch();
            }
            if let Some(root) = root {
                self.say(format!("Closed project {}", root.display()));
            }
        }
        closed
    }

    /// End of input: keep the layout, nothing is asked.
    fn shutdown(&mut self) {
        if let Some(root) = self.wb.project_root().map(Path::to_path_buf) {
            self.save_session(&root);
        }
        if self.wb.has_dirty_documents() {
            gluon_logger::warn("Input ended with unsaved changes; they were discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use std::sync::mpsc;

    use gluon_host::{ChannelNotifier, LocalFileAccess, RevisionSource};
    use gluon_workbench::Services;

    use crate::prompt::LinePrompt;

    struct NoRevisions;

    impl RevisionSource for NoRevisions {
        fn head_content(&self, _root: &Path, _relative: &Path) -> Result<Option<String>> {
            Ok(None)
        }
    }

    fn shell(data_dir: &Path, script: &str) -> Shell<Cursor<String>, Vec<u8>> {
        let (tx, rx) = mpsc::channel();
        let input = Rc::new(RefCell::new(Cursor::new(script.to_string())));
        let services = Services {
            files: Box::new(LocalFileAccess::default()),
            save_prompt: Box::new(LinePrompt::new(input.clone())),
            notifier: Box::new(ChannelNotifier::new(tx)),
            revisions: Box::new(NoRevisions),
        };
        let mut config = Config::default();
        config.watcher.enabled = false;
        Shell::new(
            Workbench::new(services),
            config,
            data_dir.to_path_buf(),
            rx,
            input,
            Vec::new(),
        )
    }

    fn output(shell: &Shell<Cursor<String>, Vec<u8>>) -> String {
        String::from_utf8_lossy(&shell.output).to_string()
    }

    #[test]
    fn test_edit_save_and_quit() {
        let project = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        fs::write(project.path().join("a.txt"), "old").unwrap();

        let script = format!(
            "project {}\nopen a.txt\nedit new\\ntext\nsave\nquit\n",
            project.path().display()
        );
        let mut sh = shell(data.path(), &script);
        sh.run().unwrap();

        assert_eq!(
            fs::read_to_string(project.path().join("a.txt")).unwrap(),
            "new\ntext"
        );
        assert!(output(&sh).contains("Saved"));
        assert!(sh.wb.project_root().is_none());
    }

    #[test]
    fn test_close_dirty_discards_after_confirmation() {
        let project = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        fs::write(project.path().join("a.py"), "print(1)").unwrap();

        let script = format!(
            "project {}\nopen a.py\nappend print(2)\nclose\nd\n",
            project.path().display()
        );
        let mut sh = shell(data.path(), &script);
        sh.run().unwrap();

        assert!(sh.wb.group(GroupId::Primary).is_empty());
        assert_eq!(
            fs::read_to_string(project.path().join("a.py")).unwrap(),
            "print(1)"
        );
        assert!(output(&sh).contains("Unsaved changes in:"));
    }

    #[test]
    fn test_cancelled_quit_keeps_running() {
        let project = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        fs::write(project.path().join("a.txt"), "a").unwrap();

        let script = format!(
            "project {}\nopen a.txt\nedit b\nquit\nc\ntabs\n",
            project.path().display()
        );
        let mut sh = shell(data.path(), &script);
        sh.run().unwrap();

        assert!(sh.wb.project_root().is_some());
        assert_eq!(sh.wb.group(GroupId::Primary).len(), 1);
        assert!(output(&sh).contains("Cancelled"));
    }

    #[test]
    fn test_session_restored_on_reopen() {
        let project = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        fs::write(project.path().join("a.txt"), "a").unwrap();
        fs::write(project.path().join("b.txt"), "b").unwrap();

        let script = format!(
            "project {}\nopen a.txt\nopen b.txt\nmove\nquit\n",
            project.path().display()
        );
        let mut first = shell(data.path(), &script);
        first.run().unwrap();

        let mut second = shell(data.path(), "project 1\n");
        second.run().unwrap();
        assert_eq!(second.wb.group(GroupId::Primary).len(), 1);
        assert_eq!(second.wb.group(GroupId::Secondary).len(), 1);
        assert!(second.wb.is_split());
        assert!(output(&second).contains("Restored 2 tab(s)"));
    }

    #[test]
    fn test_save_as_reads_destination_from_input() {
        let project = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        let target = project.path().join("notes.txt");

        let script = format!("new\nedit hello\nsave\n{}\n", target.display());
        let mut sh = shell(data.path(), &script);
        sh.run().unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "hello");
        let document = sh.wb.active_document().unwrap();
        assert_eq!(document.path, target);
        assert!(!document.is_dirty);
    }

    #[test]
    fn test_missing_recent_project_is_forgotten() {
        let data = tempfile::tempdir().unwrap();
        let gone = tempfile::tempdir().unwrap();
        let gone_path = gone.path().canonicalize().unwrap();

        let mut first = shell(data.path(), &format!("project {}\nquit\n", gone_path.display()));
        first.run().unwrap();
        drop(gone);

        let mut second = shell(data.path(), "project 1\n");
        second.run().unwrap();
        assert!(output(&second).contains("no longer exists"));
        assert!(second.wb.project_root().is_none());
        assert!(second.recent.is_empty());

        let reloaded = RecentProjects::load_from(&RecentProjects::file_in(data.path())).unwrap();
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_save_all_summary() {
        let project = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        fs::write(project.path().join("a.txt"), "a").unwrap();

        let script = format!(
            "project {}\nopen a.txt\nedit b\nsaveall\nnew\nsaveall\n\n",
            project.path().display()
        );
        let mut sh = shell(data.path(), &script);
        sh.run().unwrap();

        let printed = output(&sh);
        assert!(printed.contains("Saved 1\n"));
        assert!(printed.contains("Saved 0, cancelled 1, failed 0"));
        assert_eq!(fs::read_to_string(project.path().join("a.txt")).unwrap(), "b");
    }

    #[test]
    fn test_errors_do_not_stop_the_shell() {
        let data = tempfile::tempdir().unwrap();
        let mut sh = shell(data.path(), "open /no/such/file\nbogus\ndiff x\nnew\n");
        sh.run().unwrap();

        let printed = output(&sh);
        assert!(printed.contains("Error"));
        assert!(printed.contains("Unknown command: bogus"));
        assert!(printed.contains("Open a project first"));
        assert_eq!(sh.wb.group(GroupId::Primary).len(), 1);
    }

    #[test]
    fn test_render_tabs_marks_dirty_documents() {
        let data = tempfile::tempdir().unwrap();
        let mut sh = shell(data.path(), "");
        sh.execute(Command::New).unwrap();
        let lines = render_tabs(&sh.wb);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("1:untitled-1*"));
    }
}
