//! Event Booking - slot-limited registration for a single event
//!
//! A fixed pool of slots is handed out first come, first served. Once it is
//! exhausted, new registrants join a FIFO waiting list; cancelling a
//! confirmed booking promotes the oldest waiting registrant into the freed
//! slot. The whole ledger is saved to a durable key-value store after every
//! change and rehydrated from it at startup.
//!
//! # Architecture
//!
//! ```text
//!   register / cancel / reset
//!            │
//!            ▼
//!   ┌─────────────────┐   command    ┌──────────────────┐
//!   │  BookingLedger  │ ───────────▶ │  BookingReducer  │  validate, decide
//!   │  (owned state)  │              └──────────────────┘
//!   └─────────────────┘                       │ Dispatch(event)
//!            ▲                                ▼
//!            │ outcome               ┌──────────────────┐
//!            └────────────────────── │  BookingReducer  │  apply, persist
//!                                    └──────────────────┘
//!                                             │ Storage(Put / Remove)
//!                                             ▼
//!                                    ┌──────────────────┐
//!                                    │  KeyValueStore   │  bookings, waitingList,
//!                                    └──────────────────┘  availableSlots
//! ```
//!
//! # Invariants
//!
//! After every operation:
//!
//! - `confirmed.len() <= total_slots`, and `confirmed.len() + remaining == total_slots`
//!   whenever nobody is waiting
//! - the waiting list is non-empty only when no slot is free
//! - an email appears at most once across confirmed and waiting
//!
//! State loaded from storage is trusted and only checked (see
//! [`LedgerState::check_invariants`]).
//!
//! # Example
//!
//! ```ignore
//! let mut ledger = BookingLedger::open(config.event_slots, storage, Arc::new(SystemClock));
//!
//! let ada = ledger.register("Ada", "ada@example.com")?;
//! assert_eq!(ada.placement, Placement::Confirmed);
//!
//! ledger.cancel(ada.registrant.id)?;
//! ```

pub mod config;
pub mod error;
pub mod file_store;
pub mod ledger;
pub mod metrics;
pub mod persistence;
pub mod reducer;
pub mod types;

pub use config::Config;
pub use error::{BookingError, InputField};
pub use file_store::FileKeyValueStore;
pub use ledger::BookingLedger;
pub use reducer::{BookingEnvironment, BookingReducer};
pub use types::{
    BookingAction, Cancellation, InvariantViolation, LedgerState, LedgerView, Placement,
    Registrant, RegistrantId, Registration,
};
