//! Domain types for the todo list.
//!
//! A todo list is an ordered collection of items, each either pending or
//! done. The two stages are never stored separately: they are projections
//! over [`TodoList::items`].

use crate::error::TodoError;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Identifier of a todo item, issued by the list and never reused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TodoId(u64);

impl TodoId {
    /// Wraps a raw identifier
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for TodoId {
    type Err = std::num::ParseIntError;

    /// Accepts `7` as well as `#7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        digits.parse().map(Self)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoItem {
    /// Unique identifier
    pub id: TodoId,
    /// Trimmed, non-empty description; never edited after creation
    pub text: String,
    /// Whether the item is done
    pub done: bool,
    /// When the item was added
    pub created_at: DateTime<Utc>,
    /// When the item was last moved to done
    pub completed_at: Option<DateTime<Utc>>,
}

impl TodoItem {
    /// Creates a pending item
    #[must_use]
    pub const fn new(id: TodoId, text: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text,
            done: false,
            created_at,
            completed_at: None,
        }
    }

    /// Moves the item to `done`; moving back to pending clears `completed_at`
    pub fn set_done(&mut self, done: bool, at: DateTime<Utc>) {
        self.done = done;
        self.completed_at = done.then_some(at);
    }

    /// The stage this item currently belongs to
    #[must_use]
    pub const fn stage(&self) -> Stage {
        if self.done { Stage::Done } else { Stage::Pending }
    }
}

/// Partition key of the two views
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Items with `done == false`
    Pending,
    /// Items with `done == true`
    Done,
}

impl Stage {
    /// Both stages in display order
    pub const ALL: [Self; 2] = [Self::Pending, Self::Done];

    /// Whether `item` belongs to this stage
    #[must_use]
    pub const fn contains(self, item: &TodoItem) -> bool {
        item.done == matches!(self, Self::Done)
    }

    /// Panel heading
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Done => "done",
        })
    }
}

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" | "undone" => Ok(Self::Pending),
            "done" => Ok(Self::Done),
            other => Err(UnknownStage(other.to_string())),
        }
    }
}

/// Returned when a stage name is neither `pending`/`undone` nor `done`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage '{0}', expected 'pending' or 'done'")]
pub struct UnknownStage(pub String);

/// Trims `text` and rejects it if nothing is left
///
/// # Errors
///
/// Returns [`TodoError::EmptyText`] for empty or whitespace-only input.
pub fn normalize_text(text: &str) -> Result<&str, TodoError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TodoError::EmptyText);
    }
    Ok(trimmed)
}

/// State of the todo list
///
/// `next_id` only ever grows, so an id is never handed out twice even after
/// the item carrying it is removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoList {
    next_id: u64,
    items: Vec<TodoItem>,
    last_error: Option<TodoError>,
}

impl TodoList {
    /// Creates an empty list whose first id will be `#0`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: 0,
            items: Vec::new(),
            last_error: None,
        }
    }

    /// The id the next added item will receive
    #[must_use]
    pub const fn next_id(&self) -> TodoId {
        TodoId(self.next_id)
    }

    /// All items in insertion order
    #[must_use]
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list holds no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns an item by id
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Checks if an item exists
    #[must_use]
    pub fn contains(&self, id: TodoId) -> bool {
        self.get(id).is_some()
    }

    /// Error recorded by the most recent rejected command, cleared by any
    /// applied change
    #[must_use]
    pub const fn last_error(&self) -> Option<&TodoError> {
        self.last_error.as_ref()
    }

    /// Items of one stage, in list order
    ///
    /// Lazily filters the canonical list; call again after a change to see it.
    pub fn view_by_stage(&self, stage: Stage) -> impl Iterator<Item = &TodoItem> + '_ {
        self.items.iter().filter(move |item| stage.contains(item))
    }

    /// Number of items in a stage
    #[must_use]
    pub fn count(&self, stage: Stage) -> usize {
        self.view_by_stage(stage).count()
    }

    /// Adds a pending item with the next id
    ///
    /// On error neither the items nor the id counter change.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::EmptyText`] if `text` is blank after trimming, or
    /// [`TodoError::IdsExhausted`] once the id counter has reached `u64::MAX`.
    pub fn add(&mut self, text: &str, created_at: DateTime<Utc>) -> Result<TodoItem, TodoError> {
        let text = normalize_text(text)?;
        let item = TodoItem::new(self.next_id(), text.to_string(), created_at);
        self.insert(item.clone())?;
        Ok(item)
    }

    /// Sets the done flag of an item; setting the current value again succeeds
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::NotFound`] if no item has this id.
    pub fn set_status(
        &mut self,
        id: TodoId,
        done: bool,
        at: DateTime<Utc>,
    ) -> Result<(), TodoError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(TodoError::NotFound(id))?;
        if item.done != done {
            item.set_done(done, at);
        }
        Ok(())
    }

    /// Removes an item if present; unknown ids are ignored
    pub fn remove(&mut self, id: TodoId) -> Option<TodoItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Appends an item that already carries its id
    ///
    /// Keeps `next_id` above every id seen, which is what makes event replay
    /// reproduce the counter.
    ///
    /// # Errors
    ///
    /// - [`TodoError::DuplicateId`] if an item with this id is present.
    /// - [`TodoError::IdsExhausted`] for `u64::MAX`, which leaves no id after it.
    pub(crate) fn insert(&mut self, item: TodoItem) -> Result<(), TodoError> {
        if self.contains(item.id) {
            return Err(TodoError::DuplicateId(item.id));
        }
        let after = item.id.0.checked_add(1).ok_or(TodoError::IdsExhausted)?;
        self.next_id = self.next_id.max(after);
        self.items.push(item);
        Ok(())
    }

    pub(crate) fn set_last_error(&mut self, error: Option<TodoError>) {
        self.last_error = error;
    }
}

/// Actions representing commands and events for the todo list
///
/// Commands express what the user asked for and may be rejected. Events
/// record what happened and are applied unconditionally, so replaying the
/// events of a session rebuilds the same list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Command: add an item with this text
    AddTodo {
        /// Raw user input, trimmed by the reducer
        text: String,
    },

    /// Command: mark an item done or pending
    SetStatus {
        /// Item to change
        id: TodoId,
        /// Target status
        done: bool,
    },

    /// Command: delete an item
    RemoveTodo {
        /// Item to delete
        id: TodoId,
    },

    // ========== Events ==========
    /// Event: an item was added
    TodoAdded {
        /// Issued id
        id: TodoId,
        /// Trimmed text
        text: String,
        /// When the item was added
        created_at: DateTime<Utc>,
    },

    /// Event: an item changed stage
    StatusChanged {
        /// Item that changed
        id: TodoId,
        /// New status
        done: bool,
        /// When the change happened
        at: DateTime<Utc>,
    },

    /// Event: an item was deleted
    TodoRemoved {
        /// Deleted item
        id: TodoId,
    },

    /// Event: a command was rejected
    CommandRejected {
        /// Why
        error: TodoError,
    },
}

impl TodoAction {
    /// Whether this action is a command
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(
            self,
            Self::AddTodo { .. } | Self::SetStatus { .. } | Self::RemoveTodo { .. }
        )
    }

    /// Whether this action is an event
    #[must_use]
    pub const fn is_event(&self) -> bool {
        !self.is_command()
    }
}
