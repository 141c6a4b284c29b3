//! Errors surfaced by todo operations.

use crate::types::TodoId;
use thiserror::Error;
use todo_runtime::StoreError;

/// Errors from todo commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// The text was empty or whitespace-only
    ///
    /// A user mistake: the input is rejected and the list stays as it was.
    #[error("empty text")]
    EmptyText,

    /// No item carries this id
    ///
    /// Front ends only offer controls for existing items, so seeing this
    /// means the caller is out of sync with the list.
    #[error("todo {0} not found")]
    NotFound(TodoId),

    /// An item with this id already exists
    ///
    /// Only replayed events carry their own id; commands never hit this.
    #[error("todo {0} already exists")]
    DuplicateId(TodoId),

    /// Every id has been issued
    #[error("no todo ids left")]
    IdsExhausted,

    /// The runtime failed while running the command
    #[error(transparent)]
    Runtime(#[from] StoreError),
}

impl TodoError {
    /// Whether the user can fix this by changing their input
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::EmptyText)
    }
}
