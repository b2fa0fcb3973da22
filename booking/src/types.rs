//! Domain types for the booking ledger.
//!
//! A ledger is a fixed pool of slots, the registrants currently holding one
//! (`confirmed`) and a FIFO queue of registrants waiting for one (`waiting`).

use crate::error::BookingError;
use event_booking_core::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use thiserror::Error;

/// Unique identifier for a registrant
///
/// Serialized as a bare JSON number. Issued from the clock in epoch
/// milliseconds, bumped past the highest id already handed out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrantId(u64);

impl RegistrantId {
    /// Wraps a raw id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RegistrantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RegistrantId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A person holding a slot or waiting for one
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registrant {
    /// Unique identifier
    pub id: RegistrantId,
    /// Display name (trimmed, non-empty)
    pub name: String,
    /// Contact email (trimmed, non-empty, unique across the ledger)
    pub email: String,
}

impl Registrant {
    /// Creates a new registrant
    #[must_use]
    pub fn new(id: RegistrantId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Where a new registrant ended up
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Holds a slot
    Confirmed,
    /// Queued on the waiting list
    Waitlisted,
}

impl Placement {
    /// Label used in logs and metrics
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Waitlisted => "waitlisted",
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful outcome of `register`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    /// Confirmed or waitlisted
    pub placement: Placement,
    /// The registrant that was created
    pub registrant: Registrant,
}

/// Successful outcome of `cancel`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cancellation {
    /// The confirmed booking that was removed
    pub removed: Registrant,
    /// The waiting registrant that took the freed slot, if any
    pub promoted: Option<Registrant>,
}

/// A broken ledger invariant, reported when inspecting rehydrated state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// More confirmed bookings than slots
    #[error("{confirmed} confirmed bookings exceed {total} slots")]
    OverCapacity {
        /// Confirmed count
        confirmed: usize,
        /// Configured slots
        total: u32,
    },

    /// With an empty waiting list, confirmed + remaining must equal total
    #[error("{confirmed} confirmed + {remaining} remaining != {total} slots")]
    SlotCountMismatch {
        /// Confirmed count
        confirmed: usize,
        /// Remaining slot counter
        remaining: u32,
        /// Configured slots
        total: u32,
    },

    /// Someone is waiting although slots are free
    #[error("{waiting} waiting while {remaining} slots remain")]
    WaitingWithFreeSlots {
        /// Waiting count
        waiting: usize,
        /// Remaining slot counter
        remaining: u32,
    },

    /// An email appears more than once across confirmed and waiting
    #[error("email {email} appears more than once")]
    DuplicateEmail {
        /// The repeated email
        email: String,
    },
}

/// State of the booking ledger
///
/// Mutated only by the [`BookingReducer`](crate::BookingReducer) applying events.
#[derive(Clone, Debug)]
pub struct LedgerState {
    /// Registrants holding a slot, in booking order
    pub confirmed: Vec<Registrant>,
    /// Registrants waiting for a slot, oldest first
    pub waiting: VecDeque<Registrant>,
    /// Slots still free
    pub remaining_slots: u32,
    /// Highest id ever issued or loaded; ids are only issued above it
    last_issued_id: u64,
}

impl LedgerState {
    /// A ledger with no registrants and every slot free
    #[must_use]
    pub fn fresh(total_slots: u32) -> Self {
        Self::from_parts(Vec::new(), VecDeque::new(), total_slots)
    }

    /// Builds state from loaded collections, trusting them as given
    #[must_use]
    pub fn from_parts(
        confirmed: Vec<Registrant>,
        waiting: VecDeque<Registrant>,
        remaining_slots: u32,
    ) -> Self {
        let last_issued_id = confirmed
            .iter()
            .chain(waiting.iter())
            .map(|r| r.id.get())
            .max()
            .unwrap_or(0);

        Self {
            confirmed,
            waiting,
            remaining_slots,
            last_issued_id,
        }
    }

    /// Highest id issued so far
    #[must_use]
    pub const fn last_issued_id(&self) -> u64 {
        self.last_issued_id
    }

    /// Next id to hand out at time `now`
    ///
    /// Uses epoch milliseconds, bumped to stay strictly above every id
    /// already issued, so two registrations in the same millisecond (or a
    /// clock that went backwards) never collide.
    #[must_use]
    pub fn next_id(&self, now: DateTime<Utc>) -> RegistrantId {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        RegistrantId::new(millis.max(self.last_issued_id.saturating_add(1)))
    }

    /// Records `id` as issued
    pub(crate) fn note_issued(&mut self, id: RegistrantId) {
        self.last_issued_id = self.last_issued_id.max(id.get());
    }

    /// Empties the ledger; the id high-water mark survives
    pub(crate) fn clear(&mut self, total_slots: u32) {
        self.confirmed.clear();
        self.waiting.clear();
        self.remaining_slots = total_slots;
    }

    /// Whether `email` is already confirmed or waiting (exact match)
    #[must_use]
    pub fn contains_email(&self, email: &str) -> bool {
        self.confirmed
            .iter()
            .chain(self.waiting.iter())
            .any(|r| r.email == email)
    }

    /// Confirmed booking with `id`
    #[must_use]
    pub fn find_confirmed(&self, id: RegistrantId) -> Option<&Registrant> {
        self.confirmed.iter().find(|r| r.id == id)
    }

    /// Registrant with `id` in either collection, with its placement
    #[must_use]
    pub fn find(&self, id: RegistrantId) -> Option<(Placement, &Registrant)> {
        self.find_confirmed(id)
            .map(|r| (Placement::Confirmed, r))
            .or_else(|| {
                self.waiting
                    .iter()
                    .find(|r| r.id == id)
                    .map(|r| (Placement::Waitlisted, r))
            })
    }

    /// 1-based position of `email` on the waiting list
    #[must_use]
    pub fn waiting_position(&self, email: &str) -> Option<usize> {
        self.waiting
            .iter()
            .position(|r| r.email == email)
            .map(|index| index + 1)
    }

    /// Checks the ledger invariants against `total_slots`
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn check_invariants(&self, total_slots: u32) -> Result<(), InvariantViolation> {
        let confirmed = self.confirmed.len();
        let total = usize::try_from(total_slots).unwrap_or(usize::MAX);

        if confirmed > total {
            return Err(InvariantViolation::OverCapacity {
                confirmed,
                total: total_slots,
            });
        }

        if !self.waiting.is_empty() && self.remaining_slots > 0 {
            return Err(InvariantViolation::WaitingWithFreeSlots {
                waiting: self.waiting.len(),
                remaining: self.remaining_slots,
            });
        }

        let remaining = usize::try_from(self.remaining_slots).unwrap_or(usize::MAX);
        if self.waiting.is_empty() && confirmed.saturating_add(remaining) != total {
            return Err(InvariantViolation::SlotCountMismatch {
                confirmed,
                remaining: self.remaining_slots,
                total: total_slots,
            });
        }

        let mut seen = HashSet::new();
        for registrant in self.confirmed.iter().chain(self.waiting.iter()) {
            if !seen.insert(registrant.email.as_str()) {
                return Err(InvariantViolation::DuplicateEmail {
                    email: registrant.email.clone(),
                });
            }
        }

        Ok(())
    }

    /// Read-only projection for presentation
    #[must_use]
    pub fn view(&self, total_slots: u32) -> LedgerView {
        LedgerView {
            bookings: self.confirmed.clone(),
            waiting_list: self.waiting.iter().cloned().collect(),
            available_slots: self.remaining_slots,
            total_slots,
        }
    }
}

/// Read-only view handed to presentation code
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerView {
    /// Confirmed bookings, in booking order
    pub bookings: Vec<Registrant>,
    /// Waiting list, oldest first
    pub waiting_list: Vec<Registrant>,
    /// Slots still free
    pub available_slots: u32,
    /// Configured slots
    pub total_slots: u32,
}

/// Actions representing commands and events for the ledger
///
/// Commands are validated by the reducer and answered with exactly one
/// event, fed back through the store. Events are what get applied to state
/// and persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingAction {
    // ========== Commands ==========
    /// Command: Register a new entrant
    Register {
        /// Raw name as entered
        name: String,
        /// Raw email as entered
        email: String,
    },

    /// Command: Cancel a confirmed booking
    Cancel {
        /// Booking to cancel
        id: RegistrantId,
    },

    /// Command: Clear the ledger and its persisted state
    Reset,

    // ========== Events ==========
    /// Event: Registrant took a free slot
    RegistrantConfirmed {
        /// New registrant
        registrant: Registrant,
    },

    /// Event: No slot was free, registrant queued
    RegistrantWaitlisted {
        /// New registrant
        registrant: Registrant,
    },

    /// Event: Confirmed booking removed, waiting head promoted if present
    BookingCanceled {
        /// Removed booking
        removed: Registrant,
        /// Waiting registrant moved into the freed slot
        promoted: Option<Registrant>,
    },

    /// Event: Ledger emptied
    LedgerReset,

    /// Event: A command failed validation, or its outcome could not be encoded
    CommandRejected {
        /// Why
        error: BookingError,
    },
}

impl BookingAction {
    /// Returns true if this action is a command
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(self, Self::Register { .. } | Self::Cancel { .. } | Self::Reset)
    }

    /// Returns true if this action is an event
    #[must_use]
    pub const fn is_event(&self) -> bool {
        !self.is_command()
    }

    /// Returns the event type name, "unknown" for commands
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::RegistrantConfirmed { .. } => "RegistrantConfirmed.v1",
            Self::RegistrantWaitlisted { .. } => "RegistrantWaitlisted.v1",
            Self::BookingCanceled { .. } => "BookingCanceled.v1",
            Self::LedgerReset => "LedgerReset.v1",
            Self::CommandRejected { .. } => "CommandRejected.v1",
            Self::Register { .. } | Self::Cancel { .. } | Self::Reset => "unknown",
        }
    }
}
