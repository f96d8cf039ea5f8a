//! Shell command parsing.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use gluon_state::GroupId;

/// One line of shell input. Tab numbers are 1-based as printed in the strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    New,
    Edit(String),
    Append(String),
    Save(Option<usize>),
    SaveAll,
    Close(Option<usize>),
    CloseOthers(Option<usize>),
    CloseRight(Option<usize>),
    CloseAll,
    Reorder { from: usize, to: usize },
    Move,
    Split,
    Focus(GroupId),
    Select { group: GroupId, index: usize },
    Diff(PathBuf),
    Tabs,
    Show,
    Project(String),
    CloseProject,
    Recent,
    Log(usize),
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands (tab numbers start at 1):
  open <path>            open a file in the focused group
  new                    new untitled document
  edit <text>            replace the focused document (\\n for newlines)
  append <text>          append a line to the focused document
  save [n]               save the focused (or n-th) tab
  saveall                save every dirty document
  close [n]              close the focused (or n-th) tab
  close-others [n]       close every other tab
  close-right [n]        close tabs to the right
  close-all              close every tab of the focused group
  reorder <from> <to>    move a tab within the focused group
  move                   move the focused tab to the other group
  split                  toggle split view
  focus <primary|secondary>
  select <group> <n>     focus a tab of a group
  diff <path>            compare a project file against HEAD
  tabs                   print the tab strip
  show                   print the focused document
  project <path|n>       open a project (n picks from `recent`)
  close-project          close every tab and the project
  recent                 list recent projects
  log [n]                print the last n log entries
  help                   this text
  quit                   close the project and exit";

/// Decode `\n` and `\t` escapes typed on a single line.
fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

/// Parse a 1-based tab number into an index.
fn tab_number(arg: &str) -> Result<usize> {
    let number: usize = arg
        .parse()
        .with_context(|| format!("Not a tab number: {}", arg))?;
    number
        .checked_sub(1)
        .ok_or_else(|| anyhow!("Tab numbers start at 1"))
}

fn optional_tab(arg: &str) -> Result<Option<usize>> {
    if arg.is_empty() {
        Ok(None)
    } else {
        tab_number(arg).map(Some)
    }
}

fn group(arg: &str) -> Result<GroupId> {
    arg.parse::<GroupId>().map_err(|e| anyhow!(e))
}

fn required<'a>(arg: &'a str, usage: &str) -> Result<&'a str> {
    if arg.is_empty() {
        bail!("Usage: {}", usage);
    }
    Ok(arg)
}

impl Command {
    /// Parse a line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let command = match name {
            "open" | "o" => Command::Open(PathBuf::from(required(rest, "open <path>")?)),
            "new" => Command::New,
            "edit" => Command::Edit(unescape(rest)),
            "append" => Command::Append(unescape(rest)),
            "save" | "w" => Command::Save(optional_tab(rest)?),
            "saveall" => Command::SaveAll,
            "close" | "q" => Command::Close(optional_tab(rest)?),
            "close-others" => Command::CloseOthers(optional_tab(rest)?),
            "close-right" => Command::CloseRight(optional_tab(rest)?),
            "close-all" => Command::CloseAll,
            "reorder" => {
                let args: Vec<&str> = rest.split_whitespace().collect();
                let [from, to] = args.as_slice() else {
                    bail!("Usage: reorder <from> <to>");
                };
                Command::Reorder {
                    from: tab_number(from)?,
                    to: tab_number(to)?,
                }
            }
            "move" => Command::Move,
            "split" => Command::Split,
            "focus" => Command::Focus(group(required(rest, "focus <group>")?)?),
            "select" => {
                let args: Vec<&str> = rest.split_whitespace().collect();
                let [name, number] = args.as_slice() else {
                    bail!("Usage: select <group> <n>");
                };
                Command::Select {
                    group: group(name)?,
                    index: tab_number(number)?,
                }
            }
            "diff" => Command::Diff(PathBuf::from(required(rest, "diff <path>")?)),
            "tabs" | "ls" => Command::Tabs,
            "show" | "cat" => Command::Show,
            "project" => Command::Project(required(rest, "project <path|n>")?.to_string()),
            "close-project" => Command::CloseProject,
            "recent" => Command::Recent,
            "log" => Command::Log(if rest.is_empty() {
                20
            } else {
                rest.parse()
                    .with_context(|| format!("Not a number: {}", rest))?
            }),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("Unknown command: {} (try `help`)", other),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_line_is_none() {
        assert!(Command::parse("   ").unwrap().is_none());
    }

    #[test]
    fn test_tab_numbers_are_one_based() {
        assert_eq!(parse("close 2"), Command::Close(Some(1)));
        assert_eq!(parse("close"), Command::Close(None));
        assert_eq!(parse("reorder 1 3"), Command::Reorder { from: 0, to: 2 });
        assert!(Command::parse("close 0").is_err());
        assert!(Command::parse("reorder 1").is_err());
    }

    #[test]
    fn test_paths_keep_spaces() {
        assert_eq!(
            parse("open  my notes/a b.txt "),
            Command::Open(PathBuf::from("my notes/a b.txt"))
        );
        assert!(Command::parse("open").is_err());
    }

    #[test]
    fn test_edit_unescapes_newlines() {
        assert_eq!(parse(r"edit a\nb\\n"), Command::Edit("a\nb\\n".to_string()));
        assert_eq!(parse("edit"), Command::Edit(String::new()));
    }

    #[test]
    fn test_groups() {
        assert_eq!(parse("focus right"), Command::Focus(GroupId::Secondary));
        assert_eq!(
            parse("select primary 1"),
            Command::Select {
                group: GroupId::Primary,
                index: 0
            }
        );
        assert!(Command::parse("focus middle").is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert!(Command::parse("frobnicate").is_err());
        assert_eq!(parse("log"), Command::Log(20));
        assert_eq!(parse("log 5"), Command::Log(5));
    }
}
