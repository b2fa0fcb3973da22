//! The booking ledger: one owned state object per session.
//!
//! `BookingLedger` wraps a [`Store`] running the [`BookingReducer`]. Each
//! operation sends one command, lets the store run it to completion
//! (decide, apply, persist) and turns the outcome event into a typed result.

use crate::error::BookingError;
use crate::metrics;
use crate::persistence;
use crate::reducer::{BookingEnvironment, BookingReducer};
use crate::types::{
    BookingAction, Cancellation, LedgerState, LedgerView, Placement, Registrant, RegistrantId,
    Registration,
};
use event_booking_core::{environment::Clock, storage::KeyValueStore};
use event_booking_runtime::Store;
use std::num::NonZeroU32;
use std::sync::Arc;

type LedgerStore = Store<LedgerState, BookingAction, BookingEnvironment, BookingReducer>;

/// Slot-limited registration ledger for a single event
pub struct BookingLedger {
    store: LedgerStore,
}

impl BookingLedger {
    /// Opens the ledger persisted in `storage`, or a fresh one if nothing is stored
    ///
    /// Stored values are trusted as-is. Inconsistent state is logged, not repaired.
    #[must_use]
    pub fn open(
        total_slots: NonZeroU32,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let total = total_slots.get();
        let state = persistence::load_state(storage.as_ref(), total);

        if let Err(violation) = state.check_invariants(total) {
            tracing::warn!(%violation, "Rehydrated ledger is inconsistent");
        }

        tracing::info!(
            confirmed = state.confirmed.len(),
            waiting = state.waiting.len(),
            available_slots = state.remaining_slots,
            total_slots = total,
            "Ledger opened"
        );

        let environment = BookingEnvironment::new(clock, storage, total);
        let ledger = Self {
            store: Store::new(state, BookingReducer::new(), environment),
        };

        metrics::record_levels(&ledger.view());
        ledger
    }

    /// Registers an entrant, confirming them if a slot is free and queueing them otherwise
    ///
    /// # Errors
    ///
    /// - [`BookingError::InvalidInput`] if `name` or `email` is blank after trimming
    /// - [`BookingError::DuplicateEmail`] if `email` is already confirmed or waiting
    /// - [`BookingError::Persistence`] if the new state could not be saved
    pub fn register(&mut self, name: &str, email: &str) -> Result<Registration, BookingError> {
        let outcome = self.execute(BookingAction::Register {
            name: name.to_string(),
            email: email.to_string(),
        })?;

        let registration = match outcome {
            BookingAction::RegistrantConfirmed { registrant } => Registration {
                placement: Placement::Confirmed,
                registrant,
            },
            BookingAction::RegistrantWaitlisted { registrant } => Registration {
                placement: Placement::Waitlisted,
                registrant,
            },
            _ => return Err(BookingError::MissingOutcome { command: "register" }),
        };

        metrics::record_registration(registration.placement);
        tracing::info!(
            id = %registration.registrant.id,
            placement = %registration.placement,
            "Registrant placed"
        );

        Ok(registration)
    }

    /// Cancels a confirmed booking, promoting the oldest waiting registrant into the freed slot
    ///
    /// # Errors
    ///
    /// - [`BookingError::NotFound`] if no confirmed booking has `id`
    /// - [`BookingError::Persistence`] if the new state could not be saved
    pub fn cancel(&mut self, id: RegistrantId) -> Result<Cancellation, BookingError> {
        let BookingAction::BookingCanceled { removed, promoted } =
            self.execute(BookingAction::Cancel { id })?
        else {
            return Err(BookingError::MissingOutcome { command: "cancel" });
        };

        metrics::record_cancellation(promoted.is_some());
        match &promoted {
            Some(next) => {
                tracing::info!(%id, promoted = %next.id, "Booking canceled, waiting registrant promoted");
            },
            None => tracing::info!(%id, "Booking canceled, slot freed"),
        }

        Ok(Cancellation { removed, promoted })
    }

    /// Empties the ledger and deletes its persisted state
    ///
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Persistence`] if stored keys could not be removed.
    pub fn reset(&mut self) -> Result<(), BookingError> {
        match self.execute(BookingAction::Reset)? {
            BookingAction::LedgerReset => {
                metrics::record_reset();
                tracing::info!(total_slots = self.total_slots(), "Ledger reset");
                Ok(())
            },
            _ => Err(BookingError::MissingOutcome { command: "reset" }),
        }
    }

    /// Read-only projection for presentation
    #[must_use]
    pub fn view(&self) -> LedgerView {
        self.state().view(self.total_slots())
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> &LedgerState {
        self.store.current_state()
    }

    /// Configured slot pool size
    #[must_use]
    pub fn total_slots(&self) -> u32 {
        self.store.environment().total_slots
    }

    /// Slots still free
    #[must_use]
    pub fn available_slots(&self) -> u32 {
        self.state().remaining_slots
    }

    /// Registrant with `id`, confirmed or waiting
    #[must_use]
    pub fn find(&self, id: RegistrantId) -> Option<(Placement, &Registrant)> {
        self.state().find(id)
    }

    /// 1-based position of `email` on the waiting list
    #[must_use]
    pub fn position_in_waiting_list(&self, email: &str) -> Option<usize> {
        self.state().waiting_position(email.trim())
    }

    /// Sends `command` and returns the last action it produced
    fn execute(&mut self, command: BookingAction) -> Result<BookingAction, BookingError> {
        let result = self.store.send(command);
        metrics::record_levels(&self.view());

        match result?.pop() {
            Some(BookingAction::CommandRejected { error }) => {
                metrics::record_rejection(error.kind());
                Err(error)
            },
            Some(outcome) => Ok(outcome),
            None => Err(BookingError::MissingOutcome { command: "send" }),
        }
    }
}

impl std::fmt::Debug for BookingLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingLedger")
            .field("state", self.state())
            .field("total_slots", &self.total_slots())
            .finish()
    }
}
