//! # Todo Runtime
//!
//! The [`Store`] owns a reducer's state and is the only place where that state
//! is mutated. Each call to [`Store::send`]:
//!
//! 1. takes the state write lock and runs the reducer,
//! 2. releases the lock and runs every returned effect to completion,
//! 3. feeds actions produced by effects back through the reducer,
//!
//! and only returns once the queue of fed-back actions is empty. Sends are
//! serialized, so one send's chain never interleaves with another's, and
//! [`Store::send_and_read`] reads the state that a send left behind before
//! any other send can start.
//!
//! ## Example
//!
//! ```
//! use todo_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//! use todo_runtime::Store;
//!
//! #[derive(Clone)]
//! enum Ping {
//!     Ping,
//!     Pong,
//! }
//!
//! struct PingReducer;
//!
//! impl Reducer for PingReducer {
//!     type State = Vec<&'static str>;
//!     type Action = Ping;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         log: &mut Self::State,
//!         action: Ping,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<Ping>; 4]> {
//!         match action {
//!             Ping::Ping => {
//!                 log.push("ping");
//!                 smallvec![Effect::future(async { Some(Ping::Pong) })]
//!             },
//!             Ping::Pong => {
//!                 log.push("pong");
//!                 SmallVec::new()
//!             },
//!         }
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let store = Store::new(Vec::new(), PingReducer, ());
//! store.send(Ping::Ping).await?;
//! assert_eq!(store.state(Clone::clone).await, vec!["ping", "pong"]);
//! # Ok::<(), todo_runtime::StoreError>(())
//! # }).unwrap();
//! ```

use futures::future::{BoxFuture, FutureExt};
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use todo_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{Mutex, RwLock};

pub use error::StoreError;
pub use store::Store;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// An effect panicked while running
        ///
        /// State changes made by the reducer before the effect ran are kept.
        #[error("Effect panicked: {0}")]
        EffectPanicked(String),

        /// Effects kept feeding actions back past the configured limit
        #[error("Feedback limit of {0} actions exceeded in a single send")]
        FeedbackLimit(usize),
    }
}

/// Configuration for a [`Store`]
///
/// ```
/// use todo_runtime::StoreConfig;
///
/// let config = StoreConfig::default().with_max_actions_per_send(32);
/// assert_eq!(config.max_actions_per_send, 32);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Upper bound on actions reduced during one `send`, the initial one included
    pub max_actions_per_send: usize,
}

impl StoreConfig {
    /// Set the per-send action limit
    #[must_use]
    pub const fn with_max_actions_per_send(mut self, limit: usize) -> Self {
        self.max_actions_per_send = limit;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_actions_per_send: 1024,
        }
    }
}

/// Store module - the runtime coordinator
pub mod store {
    use super::{
        AssertUnwindSafe, BoxFuture, Effect, FutureExt, Mutex, Reducer, RwLock, StoreConfig,
        StoreError, VecDeque,
    };

    /// The Store - runtime coordinator for a reducer
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: RwLock<S>,
        /// Held for the whole of one send, effects and feedback included
        dispatch: Mutex<()>,
        reducer: R,
        environment: E,
        config: StoreConfig,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync,
        A: Send + 'static,
        S: Send + Sync,
        E: Send + Sync,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new store with explicit configuration
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            Self {
                state: RwLock::new(initial_state),
                dispatch: Mutex::new(()),
                reducer,
                environment,
                config,
            }
        }

        /// The injected environment
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Send an action and run it, and everything it feeds back, to completion
        ///
        /// Actions produced by effects are reduced in FIFO order after the
        /// action that produced them. Concurrent sends wait for each other.
        ///
        /// # Errors
        ///
        /// - [`StoreError::EffectPanicked`] if an effect panics; actions already
        ///   reduced stay applied and the remaining queue is dropped.
        /// - [`StoreError::FeedbackLimit`] if more than
        ///   [`StoreConfig::max_actions_per_send`] actions are reduced.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            let _dispatch = self.dispatch.lock().await;
            self.process(action).await
        }

        /// Send an action, then read the state it left behind
        ///
        /// No other send runs between the two steps, so `f` sees exactly the
        /// outcome of `action` and whatever it fed back.
        ///
        /// ```ignore
        /// let added = store.send_and_read(action, |s| s.items.last().cloned()).await?;
        /// ```
        ///
        /// # Errors
        ///
        /// The same as [`Store::send`]; `f` is not called on error.
        #[tracing::instrument(skip(self, action, f), name = "store_send_and_read")]
        pub async fn send_and_read<F, T>(&self, action: A, f: F) -> Result<T, StoreError>
        where
            F: FnOnce(&S) -> T,
        {
            let _dispatch = self.dispatch.lock().await;
            self.process(action).await?;
            let state = self.state.read().await;
            Ok(f(&*state))
        }

        async fn process(&self, action: A) -> Result<(), StoreError> {
            let mut queue = VecDeque::from([action]);
            let mut reduced = 0_usize;

            while let Some(action) = queue.pop_front() {
                if reduced == self.config.max_actions_per_send {
                    tracing::error!(
                        limit = self.config.max_actions_per_send,
                        dropped = queue.len() + 1,
                        "Feedback limit reached"
                    );
                    metrics::counter!("store.feedback_limit.hit").increment(1);
                    return Err(StoreError::FeedbackLimit(self.config.max_actions_per_send));
                }
                reduced += 1;
                metrics::counter!("store.actions.total").increment(1);

                let effects = {
                    let mut state = self.state.write().await;
                    let span = tracing::debug_span!("reducer_execution");
                    let _enter = span.enter();

                    let start = std::time::Instant::now();
                    let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                    metrics::histogram!("store.reducer.duration_seconds")
                        .record(start.elapsed().as_secs_f64());

                    tracing::trace!("Reducer returned {} effects", effects.len());
                    effects
                };

                for effect in effects {
                    queue.extend(run_effect(effect).await?);
                }
            }

            tracing::debug!(reduced, "Action processing completed");
            Ok(())
        }

        /// Read current state via a closure
        ///
        /// Does not wait for a running send, so it may observe a chain of
        /// fed-back actions halfway through. Use [`Store::send_and_read`] to
        /// read the result of a particular action.
        ///
        /// ```ignore
        /// let pending = store.state(|s| s.items.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }
    }

    /// Run one effect tree to completion, collecting produced actions
    fn run_effect<A>(effect: Effect<A>) -> BoxFuture<'static, Result<Vec<A>, StoreError>>
    where
        A: Send + 'static,
    {
        async move {
            match effect {
                Effect::None => Ok(Vec::new()),
                Effect::Sequential(effects) => {
                    let mut produced = Vec::new();
                    for effect in effects {
                        produced.extend(run_effect(effect).await?);
                    }
                    Ok(produced)
                },
                Effect::Parallel(effects) => {
                    let results =
                        futures::future::join_all(effects.into_iter().map(run_effect)).await;
                    let mut produced = Vec::new();
                    for result in results {
                        produced.extend(result?);
                    }
                    Ok(produced)
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.total").increment(1);
                    match AssertUnwindSafe(fut).catch_unwind().await {
                        Ok(action) => Ok(action.into_iter().collect()),
                        Err(payload) => {
                            let message = panic_message(payload.as_ref());
                            tracing::error!(error = %message, "Effect panicked");
                            metrics::counter!("store.effects.panicked").increment(1);
                            Err(StoreError::EffectPanicked(message))
                        },
                    }
                },
            }
        }
        .boxed()
    }

    fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
        payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)] // Test code can use unwrap/panic

    use super::*;
    use todo_core::{SmallVec, smallvec};

    #[derive(Debug, Clone, Default)]
    struct TestState {
        value: i32,
        trail: Vec<&'static str>,
    }

    #[derive(Debug, Clone)]
    enum TestAction {
        Increment,
        ProduceEffect,
        ProduceSequentialEffects,
        ProduceParallelEffects,
        ProducePanickingEffect,
        Loop,
        Mark(&'static str),
    }

    #[derive(Debug, Clone)]
    struct TestEnv;

    #[derive(Debug, Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                TestAction::ProduceEffect => {
                    smallvec![Effect::future(async { Some(TestAction::Increment) })]
                },
                TestAction::ProduceSequentialEffects => smallvec![Effect::chain(vec![
                    Effect::future(async { Some(TestAction::Mark("first")) }),
                    Effect::future(async { Some(TestAction::Mark("second")) }),
                ])],
                TestAction::ProduceParallelEffects => smallvec![Effect::merge(vec![
                    Effect::future(async { Some(TestAction::Increment) }),
                    Effect::future(async { Some(TestAction::Increment) }),
                    Effect::future(async { None }),
                ])],
                TestAction::ProducePanickingEffect => {
                    state.trail.push("before panic");
                    smallvec![Effect::Future(Box::pin(async {
                        panic!("effect blew up");
                    }))]
                },
                TestAction::Loop => {
                    state.value += 1;
                    smallvec![Effect::future(async { Some(TestAction::Loop) })]
                },
                TestAction::Mark(label) => {
                    state.trail.push(label);
                    SmallVec::new()
                },
            }
        }
    }

    fn store() -> Store<TestState, TestAction, TestEnv, TestReducer> {
        Store::new(TestState::default(), TestReducer, TestEnv)
    }

    #[tokio::test]
    async fn send_applies_action() {
        let store = store();
        store.send(TestAction::Increment).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn feedback_actions_are_reduced_before_send_returns() {
        let store = store();
        store.send(TestAction::ProduceEffect).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn sequential_effects_keep_order() {
        let store = store();
        store.send(TestAction::ProduceSequentialEffects).await.unwrap();
        assert_eq!(store.state(|s| s.trail.clone()).await, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn parallel_effects_all_complete() {
        let store = store();
        store.send(TestAction::ProduceParallelEffects).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 2);
    }

    #[tokio::test]
    async fn panicking_effect_reports_error_and_keeps_state() {
        let store = store();
        let err = store.send(TestAction::ProducePanickingEffect).await.unwrap_err();
        assert_eq!(err, StoreError::EffectPanicked("effect blew up".to_string()));
        assert_eq!(store.state(|s| s.trail.clone()).await, vec!["before panic"]);

        // The store stays usable afterwards
        store.send(TestAction::Increment).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn runaway_feedback_is_cut_off() {
        let store = Store::with_config(
            TestState::default(),
            TestReducer,
            TestEnv,
            StoreConfig::default().with_max_actions_per_send(5),
        );
        let err = store.send(TestAction::Loop).await.unwrap_err();
        assert_eq!(err, StoreError::FeedbackLimit(5));
        assert_eq!(store.state(|s| s.value).await, 5);
    }
}
