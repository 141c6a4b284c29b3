//! Reducer logic for the todo list.
//!
//! Commands are validated, turned into events and the events applied.
//! A rejected command leaves the items untouched and records the error in
//! [`TodoList::last_error`]; blank text also raises an alert through the
//! environment's [`Notifier`].

use crate::error::TodoError;
use crate::notify::{EMPTY_TEXT_ALERT, Notifier};
use crate::types::{TodoAction, TodoId, TodoItem, TodoList, normalize_text};
use std::sync::Arc;
use todo_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer, smallvec};

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for item timestamps
    pub clock: Arc<dyn Clock>,
    /// Where rejected input is reported
    pub notifier: Arc<dyn Notifier>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>) -> Self {
        Self { clock, notifier }
    }
}

/// Reducer for the todo list
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a `SetStatus` command; `Ok(false)` means nothing would change
    fn validate_set_status(state: &TodoList, id: TodoId, done: bool) -> Result<bool, TodoError> {
        let item = state.get(id).ok_or(TodoError::NotFound(id))?;
        Ok(item.done != done)
    }

    /// Applies an event to state
    fn apply_event(state: &mut TodoList, action: &TodoAction) {
        match action {
            TodoAction::TodoAdded {
                id,
                text,
                created_at,
            } => {
                match state.insert(TodoItem::new(*id, text.clone(), *created_at)) {
                    Ok(()) => state.set_last_error(None),
                    Err(error) => {
                        tracing::warn!(%error, "Dropping todo that cannot be added");
                        state.set_last_error(Some(error));
                    },
                }
            },
            TodoAction::StatusChanged { id, done, at } => {
                // Validated before the event was built; replayed events for
                // vanished items are dropped
                if let Err(error) = state.set_status(*id, *done, *at) {
                    tracing::warn!(%error, "Ignoring status change for missing item");
                }
                state.set_last_error(None);
            },
            TodoAction::TodoRemoved { id } => {
                state.remove(*id);
                state.set_last_error(None);
            },
            TodoAction::CommandRejected { error } => {
                state.set_last_error(Some(error.clone()));
            },
            // Commands are not applied to state
            TodoAction::AddTodo { .. }
            | TodoAction::SetStatus { .. }
            | TodoAction::RemoveTodo { .. } => {},
        }
    }

    /// Records a rejection and describes what the user should be told
    fn reject(
        state: &mut TodoList,
        error: TodoError,
        env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        let alert = match &error {
            TodoError::EmptyText => {
                tracing::warn!(%error, "Rejected todo input");
                Some(EMPTY_TEXT_ALERT)
            },
            TodoError::NotFound(_)
            | TodoError::DuplicateId(_)
            | TodoError::IdsExhausted
            | TodoError::Runtime(_) => {
                tracing::error!(%error, "Command refers to state the list does not have");
                None
            },
        };

        Self::apply_event(state, &TodoAction::CommandRejected { error });

        match alert {
            Some(message) => {
                let notifier = Arc::clone(&env.notifier);
                smallvec![Effect::future(async move {
                    notifier.alert(message);
                    None
                })]
            },
            None => SmallVec::new(),
        }
    }
}

impl Reducer for TodoReducer {
    type State = TodoList;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            TodoAction::AddTodo { text } => {
                let text = match normalize_text(&text) {
                    Ok(text) => text.to_string(),
                    Err(error) => return Self::reject(state, error, env),
                };

                let event = TodoAction::TodoAdded {
                    id: state.next_id(),
                    text,
                    created_at: env.clock.now(),
                };
                tracing::debug!(?event, "Adding todo");
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            TodoAction::SetStatus { id, done } => {
                match Self::validate_set_status(state, id, done) {
                    Err(error) => return Self::reject(state, error, env),
                    Ok(false) => {
                        tracing::debug!(%id, done, "Status unchanged");
                        state.set_last_error(None);
                    },
                    Ok(true) => {
                        let event = TodoAction::StatusChanged {
                            id,
                            done,
                            at: env.clock.now(),
                        };
                        tracing::debug!(?event, "Changing status");
                        Self::apply_event(state, &event);
                    },
                }
                SmallVec::new()
            },

            TodoAction::RemoveTodo { id } => {
                if state.contains(id) {
                    let event = TodoAction::TodoRemoved { id };
                    tracing::debug!(?event, "Removing todo");
                    Self::apply_event(state, &event);
                } else {
                    tracing::debug!(%id, "Remove of unknown todo ignored");
                    state.set_last_error(None);
                }
                SmallVec::new()
            },

            // ========== Events ==========
            TodoAction::TodoAdded { .. }
            | TodoAction::StatusChanged { .. }
            | TodoAction::TodoRemoved { .. }
            | TodoAction::CommandRejected { .. } => {
                Self::apply_event(state, &action);
                SmallVec::new()
            },
        }
    }
}
