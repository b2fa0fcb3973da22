//! Reducer logic for the booking ledger.
//!
//! Commands are validated against the current state and answered with one
//! event dispatched back through the store. Events are applied to state and
//! return the storage effects that make the change durable.

use crate::error::{BookingError, InputField};
use crate::persistence;
use crate::types::{BookingAction, LedgerState, Registrant, RegistrantId};
use event_booking_core::{
    effect::Effect, environment::Clock, reducer::Reducer, smallvec, storage::KeyValueStore,
    SmallVec,
};
use std::sync::Arc;

/// Environment dependencies for the booking reducer
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Clock for issuing registrant ids
    pub clock: Arc<dyn Clock>,
    /// Durable store the ledger is saved to
    pub storage: Arc<dyn KeyValueStore>,
    /// Fixed size of the slot pool
    pub total_slots: u32,
}

impl BookingEnvironment {
    /// Creates a new `BookingEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, storage: Arc<dyn KeyValueStore>, total_slots: u32) -> Self {
        Self {
            clock,
            storage,
            total_slots,
        }
    }
}

/// Reducer for the booking ledger
#[derive(Clone, Debug, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Creates a new `BookingReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a `Register` command (inputs already trimmed)
    fn validate_register(state: &LedgerState, name: &str, email: &str) -> Result<(), BookingError> {
        if name.is_empty() {
            return Err(BookingError::InvalidInput {
                field: InputField::Name,
            });
        }

        if email.is_empty() {
            return Err(BookingError::InvalidInput {
                field: InputField::Email,
            });
        }

        if state.contains_email(email) {
            return Err(BookingError::DuplicateEmail {
                email: email.to_string(),
            });
        }

        Ok(())
    }

    /// Validates a `Cancel` command, returning the booking to remove
    fn validate_cancel(state: &LedgerState, id: RegistrantId) -> Result<&Registrant, BookingError> {
        state
            .find_confirmed(id)
            .ok_or(BookingError::NotFound { id })
    }

    fn reject(error: BookingError) -> SmallVec<[Effect<BookingAction>; 4]> {
        tracing::warn!(reason = error.kind(), error = %error, "Command rejected");
        smallvec![Effect::dispatch(BookingAction::CommandRejected { error })]
    }

    /// Applies an event to state
    fn apply_event(state: &mut LedgerState, action: &BookingAction, total_slots: u32) {
        match action {
            BookingAction::RegistrantConfirmed { registrant } => {
                state.note_issued(registrant.id);
                state.remaining_slots = state.remaining_slots.saturating_sub(1);
                state.confirmed.push(registrant.clone());
            },
            BookingAction::RegistrantWaitlisted { registrant } => {
                state.note_issued(registrant.id);
                state.waiting.push_back(registrant.clone());
            },
            BookingAction::BookingCanceled { removed, promoted } => {
                state.confirmed.retain(|r| r.id != removed.id);
                match promoted {
                    Some(next) => {
                        if state.waiting.front().is_some_and(|head| head.id == next.id) {
                            state.waiting.pop_front();
                        } else {
                            state.waiting.retain(|r| r.id != next.id);
                        }
                        state.confirmed.push(next.clone());
                    },
                    None => {
                        state.remaining_slots = state.remaining_slots.saturating_add(1);
                    },
                }
            },
            BookingAction::LedgerReset => state.clear(total_slots),
            // Rejections change nothing; commands are not applied to state
            BookingAction::CommandRejected { .. }
            | BookingAction::Register { .. }
            | BookingAction::Cancel { .. }
            | BookingAction::Reset => {},
        }
    }

    /// Storage effect for the state after a mutating event
    fn persist(state: &LedgerState, env: &BookingEnvironment) -> SmallVec<[Effect<BookingAction>; 4]> {
        match persistence::save_effect(state, &env.storage) {
            Ok(effect) => smallvec![effect],
            Err(error) => Self::reject(BookingError::Persistence(error)),
        }
    }
}

impl Reducer for BookingReducer {
    type State = LedgerState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            BookingAction::Register { name, email } => {
                let (name, email) = (name.trim(), email.trim());
                tracing::debug!(email, "Register command");

                if let Err(error) = Self::validate_register(state, name, email) {
                    return Self::reject(error);
                }

                let registrant = Registrant::new(state.next_id(env.clock.now()), name, email);
                let event = if state.remaining_slots > 0 {
                    BookingAction::RegistrantConfirmed { registrant }
                } else {
                    BookingAction::RegistrantWaitlisted { registrant }
                };

                smallvec![Effect::dispatch(event)]
            },

            BookingAction::Cancel { id } => {
                tracing::debug!(%id, "Cancel command");

                let removed = match Self::validate_cancel(state, id) {
                    Ok(removed) => removed.clone(),
                    Err(error) => return Self::reject(error),
                };

                // Promotion candidate is fixed now so the event is self-describing
                let promoted = state.waiting.front().cloned();

                smallvec![Effect::dispatch(BookingAction::BookingCanceled {
                    removed,
                    promoted,
                })]
            },

            BookingAction::Reset => {
                tracing::debug!("Reset command");
                smallvec![Effect::dispatch(BookingAction::LedgerReset)]
            },

            // ========== Events ==========
            BookingAction::RegistrantConfirmed { .. }
            | BookingAction::RegistrantWaitlisted { .. }
            | BookingAction::BookingCanceled { .. } => {
                Self::apply_event(state, &action, env.total_slots);
                Self::persist(state, env)
            },

            BookingAction::LedgerReset => {
                Self::apply_event(state, &action, env.total_slots);
                smallvec![persistence::clear_effect(&env.storage)]
            },

            BookingAction::CommandRejected { .. } => SmallVec::new(),
        }
    }
}
