//! Line commands accepted by the console.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Add(String),
    Toggle(usize),
    Done(usize),
    Undo(usize),
    Rename(usize, String),
    Remove(usize),
    Time,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("`{0}` needs a task number")]
    MissingIndex(&'static str),
    #[error("`{0}` is not a task number")]
    BadIndex(String),
    #[error("`{0}` needs a title")]
    MissingTitle(&'static str),
}

pub const HELP: &str = "\
commands:
  list                 show tasks
  add <title>          add a task
  toggle <n>           flip task n between done and open
  done <n> / undo <n>  mark task n done / open
  rename <n> <title>   change the title of task n
  rm <n>               delete task n
  time                 show the server clock
  help                 this text
  quit                 exit";

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Option<Result<Command, CommandError>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "list" | "ls" => Ok(Command::List),
        "add" => Ok(Command::Add(rest.to_string())),
        "toggle" => parse_index("toggle", rest).map(Command::Toggle),
        "done" => parse_index("done", rest).map(Command::Done),
        "undo" => parse_index("undo", rest).map(Command::Undo),
        "rm" | "delete" => parse_index("rm", rest).map(Command::Remove),
        "rename" => parse_rename(rest),
        "time" => Ok(Command::Time),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    };
    Some(command)
}

fn parse_index(name: &'static str, raw: &str) -> Result<usize, CommandError> {
    let raw = raw.split_whitespace().next().ok_or(CommandError::MissingIndex(name))?;
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::BadIndex(raw.to_string())),
    }
}

fn parse_rename(rest: &str) -> Result<Command, CommandError> {
    let (index, title) = match rest.split_once(char::is_whitespace) {
        Some((index, title)) => (index, title.trim()),
        None => (rest, ""),
    };
    let index = parse_index("rename", index)?;
    if title.is_empty() {
        return Err(CommandError::MissingTitle("rename"));
    }
    Ok(Command::Rename(index, title.to_string()))
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
