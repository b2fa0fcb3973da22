//! # Event Booking Testing
//!
//! Testing utilities and helpers for the event booking ledger.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - In-memory and failing key-value stores
//! - `ReducerTest`, a Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use event_booking_testing::{test_clock, InMemoryKeyValueStore};
//! use std::sync::Arc;
//!
//! let storage = Arc::new(InMemoryKeyValueStore::new());
//! let mut ledger = BookingLedger::open(config.event_slots, storage.clone(), Arc::new(test_clock()));
//! ledger.register("Ada", "ada@example.com")?;
//! assert!(storage.contains_key("bookings"));
//! ```

use chrono::{DateTime, Duration, Utc};
use event_booking_core::environment::Clock;

/// Reducer testing harness
pub mod reducer_test;

/// In-memory and failing storage backends
pub mod storage_mocks;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Duration, Utc};
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use event_booking_testing::mocks::FixedClock;
    /// use event_booking_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that advances by a fixed step on every read
    #[derive(Debug)]
    pub struct SteppingClock {
        next: Mutex<DateTime<Utc>>,
        step: Duration,
    }

    impl SteppingClock {
        /// Start at `start`, advancing by `step` after each `now()`
        #[must_use]
        pub const fn new(start: DateTime<Utc>, step: Duration) -> Self {
            Self {
                next: Mutex::new(start),
                step,
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = match self.next.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let current = *next;
            *next = current + self.step;
            current
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_089))
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, SteppingClock};
pub use reducer_test::{assertions, ReducerTest};
pub use storage_mocks::{FailingKeyValueStore, InMemoryKeyValueStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(time1.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn stepping_clock_advances() {
        let clock = SteppingClock::new(test_clock().now(), Duration::milliseconds(5));
        let first = clock.now();
        let second = clock.now();
        assert_eq!(second - first, Duration::milliseconds(5));
    }
}
