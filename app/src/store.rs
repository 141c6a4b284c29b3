//! Command/query surface over the runtime store.
//!
//! [`TodoStore`] is what a front end talks to: three commands and one query,
//! each returning plain values instead of actions.

use crate::error::TodoError;
use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::{Stage, TodoAction, TodoId, TodoItem, TodoList};
use todo_runtime::Store;

/// The authoritative todo list for one session
pub struct TodoStore {
    store: Store<TodoList, TodoAction, TodoEnvironment, TodoReducer>,
}

impl TodoStore {
    /// Creates an empty store
    #[must_use]
    pub fn new(env: TodoEnvironment) -> Self {
        Self::with_state(TodoList::new(), env)
    }

    /// Creates a store starting from an existing list
    #[must_use]
    pub fn with_state(list: TodoList, env: TodoEnvironment) -> Self {
        Self {
            store: Store::new(list, TodoReducer::new(), env),
        }
    }

    /// Adds a pending item and returns it
    ///
    /// The returned item is the one this call added, even with other callers
    /// sending at the same time.
    ///
    /// # Errors
    ///
    /// [`TodoError::EmptyText`] if `text` is blank after trimming; the user has
    /// already been alerted through the environment's notifier by the time
    /// this returns.
    pub async fn add(&self, text: &str) -> Result<TodoItem, TodoError> {
        let action = TodoAction::AddTodo {
            text: text.to_string(),
        };
        self.store
            .send_and_read(action, |list| match list.last_error() {
                Some(error) => Err(error.clone()),
                // A successful add always appends
                None => list
                    .items()
                    .last()
                    .cloned()
                    .ok_or(TodoError::NotFound(list.next_id())),
            })
            .await?
    }

    /// Marks an item done or pending
    ///
    /// # Errors
    ///
    /// [`TodoError::NotFound`] if no item has this id.
    pub async fn set_status(&self, id: TodoId, done: bool) -> Result<(), TodoError> {
        self.dispatch(TodoAction::SetStatus { id, done }).await
    }

    /// Deletes an item; unknown ids are ignored
    ///
    /// # Errors
    ///
    /// Only runtime failures; a missing id is not an error.
    pub async fn remove(&self, id: TodoId) -> Result<(), TodoError> {
        self.dispatch(TodoAction::RemoveTodo { id }).await
    }

    /// Items of one stage in list order, computed from the current list
    pub async fn view_by_stage(&self, stage: Stage) -> Vec<TodoItem> {
        self.store
            .state(|list| list.view_by_stage(stage).cloned().collect())
            .await
    }

    /// A copy of the whole list
    pub async fn snapshot(&self) -> TodoList {
        self.store.state(Clone::clone).await
    }

    /// Reads the list through a closure without copying it
    pub async fn read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&TodoList) -> T,
    {
        self.store.state(f).await
    }

    async fn dispatch(&self, action: TodoAction) -> Result<(), TodoError> {
        let error = self
            .store
            .send_and_read(action, |list| list.last_error().cloned())
            .await?;
        error.map_or(Ok(()), Err)
    }
}
