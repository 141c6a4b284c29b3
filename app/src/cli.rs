//! Line-oriented terminal front end.
//!
//! Each input line is one command. A line that does not start with a command
//! word is added as a new item, so typing text and pressing Enter behaves like
//! the add box of a graphical list. The same goes for a command word followed
//! by something that is not an id: `done laundry` is an item.

use crate::config::Config;
use crate::error::TodoError;
use crate::store::TodoStore;
use crate::types::{Stage, TodoId, TodoList};
use std::fmt::Write as _;
use std::io::{self, Write};
use std::str::FromStr;
use thiserror::Error;

const HELP: &str = "\
commands:
  <text> | add <text>   add a pending item
  done <id>             mark an item done
  undo <id>             move a done item back to pending (if enabled)
  rm <id>               delete an item
  list                  show both panels
  help                  show this text
  quit                  leave
";

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add an item with this raw text
    Add(String),
    /// Mark an item done
    Done(TodoId),
    /// Move an item back to pending
    Undo(TodoId),
    /// Delete an item
    Remove(TodoId),
    /// Print the board
    List,
    /// Print usage
    Help,
    /// End the session
    Quit,
}

/// Why an input line could not be understood
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A command that needs an id got none
    #[error("'{0}' needs an item id, e.g. '{0} 3'")]
    MissingId(&'static str),
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        match word.to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add(rest.to_string())),
            "done" | "check" => id_or_text("done", rest, line, Self::Done),
            "undo" | "reopen" => id_or_text("undo", rest, line, Self::Undo),
            "rm" | "del" | "delete" => id_or_text("rm", rest, line, Self::Remove),
            "list" | "ls" if rest.is_empty() => Ok(Self::List),
            "help" | "?" if rest.is_empty() => Ok(Self::Help),
            "quit" | "exit" if rest.is_empty() => Ok(Self::Quit),
            _ => Ok(Self::Add(line.to_string())),
        }
    }
}

/// `word <id>` becomes `command(id)`; any other argument makes the line an item
fn id_or_text(
    word: &'static str,
    arg: &str,
    line: &str,
    command: fn(TodoId) -> Command,
) -> Result<Command, ParseError> {
    if arg.is_empty() {
        return Err(ParseError::MissingId(word));
    }
    Ok(arg
        .parse()
        .map_or_else(|_| Command::Add(line.to_string()), command))
}

/// Renders the pending panel followed by the done panel
#[must_use]
pub fn render_board(list: &TodoList) -> String {
    let mut out = String::from("Todo\n");
    for stage in Stage::ALL {
        // Writing into a String cannot fail
        let _ = writeln!(out, "{} ({})", stage.title(), list.count(stage));
        let mut rows = list.view_by_stage(stage).peekable();
        if rows.peek().is_none() {
            out.push_str("  (none)\n");
        }
        for item in rows {
            let mark = if item.done { 'x' } else { ' ' };
            let _ = writeln!(out, "  [{mark}] {} {}", item.id, item.text);
        }
    }
    out
}

/// Whether the input loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line
    Continue,
    /// Stop reading
    Quit,
}

/// One interactive session writing to `out`
pub struct Session<W> {
    store: TodoStore,
    config: Config,
    out: W,
}

impl<W: Write> Session<W> {
    /// Creates a session over `store`
    pub const fn new(store: TodoStore, config: Config, out: W) -> Self {
        Self { store, config, out }
    }

    /// The store behind this session
    pub const fn store(&self) -> &TodoStore {
        &self.store
    }

    /// Gives back the output sink
    pub fn into_output(self) -> W {
        self.out
    }

    /// Prints the usage hint and the (empty) board
    ///
    /// # Errors
    ///
    /// Fails if the output cannot be written.
    pub async fn greet(&mut self) -> io::Result<()> {
        writeln!(self.out, "type an item and press Enter to add it, 'help' for commands")?;
        self.print_board().await
    }

    /// Prints the prompt without a newline
    ///
    /// # Errors
    ///
    /// Fails if the output cannot be written or flushed.
    pub fn prompt(&mut self) -> io::Result<()> {
        self.out.write_all(self.config.prompt.as_bytes())?;
        self.out.flush()
    }

    /// Parses and runs one input line
    ///
    /// # Errors
    ///
    /// Only output failures; command errors are reported to the user.
    pub async fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        match line.parse::<Command>() {
            Ok(command) => self.execute(command).await,
            Err(error) => {
                writeln!(self.out, "error: {error}")?;
                Ok(Flow::Continue)
            },
        }
    }

    /// Runs one command and re-renders the board after a change
    ///
    /// # Errors
    ///
    /// Only output failures; command errors are reported to the user.
    pub async fn execute(&mut self, command: Command) -> io::Result<Flow> {
        let outcome = match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => {
                self.out.write_all(HELP.as_bytes())?;
                return Ok(Flow::Continue);
            },
            Command::List => Ok(()),
            Command::Add(text) => self.store.add(&text).await.map(|item| {
                tracing::info!(id = %item.id, "Added todo");
            }),
            Command::Done(id) => self.store.set_status(id, true).await,
            Command::Undo(id) if !self.config.allow_reopen => {
                match self.store.read(|list| list.get(id).map(|item| item.done)).await {
                    None => writeln!(self.out, "error: {}", TodoError::NotFound(id))?,
                    Some(false) => writeln!(self.out, "{id} is already pending")?,
                    Some(true) => writeln!(
                        self.out,
                        "{id} stays done: reopening is disabled (set TODO_ALLOW_REOPEN=1)"
                    )?,
                }
                return Ok(Flow::Continue);
            },
            Command::Undo(id) => self.store.set_status(id, false).await,
            Command::Remove(id) => self.store.remove(id).await,
        };

        match outcome {
            Ok(()) => self.print_board().await?,
            // The notifier has already told the user
            Err(TodoError::EmptyText) => {},
            Err(error) => writeln!(self.out, "error: {error}")?,
        }
        Ok(Flow::Continue)
    }

    async fn print_board(&mut self) -> io::Result<()> {
        let board = self.store.read(render_board).await;
        self.out.write_all(board.as_bytes())?;
        self.out.flush()
    }
}
