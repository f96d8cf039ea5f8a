mod command;
mod prompt;
mod shell;

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;

use anyhow::Result;
use clap::Parser;

use gluon_config::Config;
use gluon_git::GitRevisionSource;
use gluon_host::{ChannelNotifier, LocalFileAccess};
use gluon_logger::LogLevel;
use gluon_workbench::{Services, Workbench};

use prompt::LinePrompt;
use shell::Shell;

#[derive(Parser)]
#[command(name = "gluon", version)]
#[command(about = "Dual-pane editor groups driven from the command line")]
struct Cli {
    /// Project directory to open
    project: Option<PathBuf>,
    /// Files to open after the project
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config errors fall back to defaults so the editor still starts
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Config error: {:#}", e);
        Config::default()
    });

    let min_level = config
        .logging
        .min_level
        .parse::<LogLevel>()
        .unwrap_or(LogLevel::Info);
    gluon_logger::init(
        config.log_file_path(),
        config.logging.max_entries,
        min_level,
    );
    gluon_logger::info("gluon started");

    if gluon_git::is_available() {
        gluon_logger::info("git detected");
    } else {
        gluon_logger::warn("git not found, diffs against HEAD are unavailable");
    }

    let data_dir = gluon_config::get_data_dir()?;
    let (refresh_tx, refresh_rx) = mpsc::channel();
    let input = Rc::new(RefCell::new(io::stdin().lock()));
    let services = Services {
        files: Box::new(LocalFileAccess::new(config.max_file_size_bytes())),
        save_prompt: Box::new(LinePrompt::new(input.clone())),
        notifier: Box::new(ChannelNotifier::new(refresh_tx)),
        revisions: Box::new(GitRevisionSource),
    };

    let mut shell = Shell::new(
        Workbench::new(services),
        config,
        data_dir,
        refresh_rx,
        input,
        io::stdout(),
    );

    if let Some(project) = &cli.project {
        if let Err(e) = shell.open_project(project) {
            eprintln!("Error: {:#}", e);
        }
    }
    let cwd = std::env::current_dir()?;
    for file in cli.files {
        if let Err(e) = shell.execute(command::Command::Open(cwd.join(file))) {
            eprintln!("Error: {:#}", e);
        }
    }

    let result = shell.run();
    gluon_logger::info("gluon stopped");
    result
}
