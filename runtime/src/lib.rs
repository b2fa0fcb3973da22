//! # Event Booking Runtime
//!
//! Runtime implementation for the event booking ledger.
//!
//! This crate provides the Store that coordinates reducer execution and
//! effect handling.
//!
//! ## Core Components
//!
//! - **Store**: Owns the state, runs the reducer and executes effects
//! - **Effect Executor**: Executes storage operations and feeds dispatched actions back
//! - **Event Loop**: Manages the action → reducer → effects → action feedback loop
//!
//! The Store is synchronous and single-writer: `send` runs the action and
//! every action it feeds back to completion before returning, so no other
//! action can observe a half-applied mutation.
//!
//! ## Example
//!
//! ```ignore
//! use event_booking_runtime::Store;
//!
//! let mut store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action, collect the actions its effects produced
//! let produced = store.send(Action::DoSomething)?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field);
//! ```

use event_booking_core::{
    effect::{Effect, StorageOperation},
    reducer::Reducer,
};
use std::collections::VecDeque;

/// Metrics recorded by the Store
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use event_booking_core::storage::StorageError;
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// A storage effect failed
        ///
        /// State changes made by the reducer before the failure are kept;
        /// remaining effects of the same `send` are skipped.
        #[error("Storage effect failed: {0}")]
        Storage(#[from] StorageError),
    }
}

pub use error::StoreError;

/// The Store - runtime for reducers
///
/// The Store manages:
/// 1. State (owned, mutated only through `send`)
/// 2. Reducer (business logic)
/// 3. Environment (injected dependencies)
/// 4. Effect execution (with feedback loop)
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
    state: S,
    reducer: R,
    environment: E,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
    A: Clone,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub const fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: initial_state,
            reducer,
            environment,
        }
    }

    /// Send an action to the store
    ///
    /// Runs the reducer, executes the returned effects in order, then
    /// reduces every action fed back through [`Effect::Dispatch`] (FIFO)
    /// until the queue is empty.
    ///
    /// # Returns
    ///
    /// Every action produced by `Dispatch` effects, in dispatch order. The
    /// initial action is not included.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if a storage effect fails. The state is
    /// left exactly as the reducer mutated it; it is not rolled back.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub fn send(&mut self, action: A) -> Result<Vec<A>, StoreError> {
        let mut queue = VecDeque::from([action]);
        let mut produced = Vec::new();

        while let Some(action) = queue.pop_front() {
            metrics::record_action();
            let effects = self
                .reducer
                .reduce(&mut self.state, action, &self.environment);

            for effect in effects {
                Self::execute(effect, &mut queue, &mut produced)?;
            }
        }

        Ok(produced)
    }

    /// Read current state via a closure
    ///
    /// ```ignore
    /// let confirmed = store.state(|s| s.confirmed.len());
    /// ```
    pub fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        f(&self.state)
    }

    /// Borrow the current state
    pub const fn current_state(&self) -> &S {
        &self.state
    }

    /// Injected dependencies
    pub const fn environment(&self) -> &E {
        &self.environment
    }

    /// Consume the store and return its state
    pub fn into_state(self) -> S {
        self.state
    }

    fn execute(
        effect: Effect<A>,
        queue: &mut VecDeque<A>,
        produced: &mut Vec<A>,
    ) -> Result<(), StoreError> {
        match effect {
            Effect::None => Ok(()),
            Effect::Sequential(effects) => {
                for effect in effects {
                    Self::execute(effect, queue, produced)?;
                }
                Ok(())
            },
            Effect::Storage(operation) => Self::execute_storage(operation),
            Effect::Dispatch(action) => {
                produced.push((*action).clone());
                queue.push_back(*action);
                Ok(())
            },
        }
    }

    fn execute_storage(operation: StorageOperation) -> Result<(), StoreError> {
        let name = operation.name();
        let result = match &operation {
            StorageOperation::Put { store, key, value } => store.put(key, value),
            StorageOperation::Remove { store, key } => store.remove(key),
        };

        metrics::record_storage(name, result.is_ok());

        match result {
            Ok(()) => {
                tracing::trace!(operation = name, key = operation.key(), "Storage effect executed");
                Ok(())
            },
            Err(error) => {
                tracing::error!(
                    operation = name,
                    key = operation.key(),
                    error = %error,
                    "Storage effect failed"
                );
                Err(StoreError::Storage(error))
            },
        }
    }
}
