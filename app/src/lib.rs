//! Two-stage todo list built on the reducer/store runtime.
//!
//! Items are added, marked done (or back to pending) and deleted. The list is
//! the single source of truth; the "pending" and "done" panels are computed
//! from it on every read.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use todo_app::{RecordingNotifier, Stage, TodoEnvironment, TodoStore};
//! use todo_core::environment::SystemClock;
//!
//! # tokio_test::block_on(async {
//! let env = TodoEnvironment::new(Arc::new(SystemClock), Arc::new(RecordingNotifier::new()));
//! let store = TodoStore::new(env);
//!
//! let milk = store.add("Buy milk").await?;
//! store.add("Write documentation").await?;
//! store.set_status(milk.id, true).await?;
//!
//! let done = store.view_by_stage(Stage::Done).await;
//! assert_eq!(done[0].text, "Buy milk");
//! assert_eq!(store.view_by_stage(Stage::Pending).await.len(), 1);
//! # Ok::<(), todo_app::TodoError>(())
//! # }).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod notify;
pub mod reducer;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::TodoError;
pub use notify::{Notifier, RecordingNotifier, StderrNotifier};
pub use reducer::{TodoEnvironment, TodoReducer};
pub use store::TodoStore;
pub use types::{Stage, TodoAction, TodoId, TodoItem, TodoList};
