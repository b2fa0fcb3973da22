//! # Event Booking Core
//!
//! Core traits and types for the event booking ledger.
//!
//! The ledger is built as a Reducer: business rules live in a pure function
//! over owned state, and every side effect is returned as a description that
//! a runtime executes afterwards.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state owned by a single store
//! - **Action**: All possible inputs to a reducer (commands and events)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (storage writes, feedback actions)
//! - **Environment**: Injected dependencies (clock, key-value storage)
//!
//! ## Example
//!
//! ```ignore
//! use event_booking_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = CounterEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         env: &CounterEnvironment,
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         state.count += 1;
//!         SmallVec::new()
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Duration, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Key-value storage abstraction used for durable ledger state
pub mod storage;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// Most reducers return zero to four effects, so the inline
        /// capacity of the returned `SmallVec` avoids a heap allocation.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values, not execution. The runtime store interprets them
/// after the reducer has returned.
pub mod effect {
    use crate::storage::KeyValueStore;
    use std::sync::Arc;

    /// Operations against a [`KeyValueStore`]
    ///
    /// The store handle travels with the operation so the runtime does not
    /// need to know which backend a reducer's environment was built with.
    pub enum StorageOperation {
        /// Overwrite `key` with `value`
        Put {
            /// Target store
            store: Arc<dyn KeyValueStore>,
            /// Key to write
            key: String,
            /// Full serialized value
            value: String,
        },

        /// Delete `key` (absent keys are not an error)
        Remove {
            /// Target store
            store: Arc<dyn KeyValueStore>,
            /// Key to delete
            key: String,
        },
    }

    impl StorageOperation {
        /// Short operation name for logs and metric labels
        #[must_use]
        pub const fn name(&self) -> &'static str {
            match self {
                Self::Put { .. } => "put",
                Self::Remove { .. } => "remove",
            }
        }

        /// Key this operation touches
        #[must_use]
        pub fn key(&self) -> &str {
            match self {
                Self::Put { key, .. } | Self::Remove { key, .. } => key,
            }
        }
    }

    impl std::fmt::Debug for StorageOperation {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Put { key, value, .. } => f
                    .debug_struct("StorageOperation::Put")
                    .field("key", key)
                    .field("value", value)
                    .finish_non_exhaustive(),
                Self::Remove { key, .. } => f
                    .debug_struct("StorageOperation::Remove")
                    .field("key", key)
                    .finish_non_exhaustive(),
            }
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects one after another, stopping at the first failure
        Sequential(Vec<Effect<Action>>),

        /// Durable storage operation
        Storage(StorageOperation),

        /// Feed an action back into the reducer once the current one completes
        Dispatch(Box<Action>),
    }

    // Manual Debug implementation since StorageOperation holds a trait object
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Storage(operation) => {
                    f.debug_tuple("Effect::Storage").field(operation).finish()
                },
                Effect::Dispatch(action) => {
                    f.debug_tuple("Effect::Dispatch").field(action).finish()
                },
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Feed `action` back into the reducer
        #[must_use]
        pub fn dispatch(action: Action) -> Effect<Action> {
            Effect::Dispatch(Box::new(action))
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use event_booking_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let earlier = clock.now();
    /// assert!(clock.now() >= earlier);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;

    #[derive(Debug)]
    enum Ping {
        Pong,
    }

    #[test]
    fn effect_debug_renders_dispatch() {
        let effect = Effect::dispatch(Ping::Pong);
        assert_eq!(format!("{effect:?}"), "Effect::Dispatch(Pong)");
    }

    #[test]
    fn chain_wraps_in_sequential() {
        let effect: Effect<Ping> = Effect::chain(vec![Effect::None, Effect::None]);
        assert!(matches!(effect, Effect::Sequential(ref inner) if inner.len() == 2));
    }
}
