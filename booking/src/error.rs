//! Errors returned by ledger operations.

use crate::types::RegistrantId;
use event_booking_core::storage::StorageError;
use event_booking_runtime::StoreError;
use thiserror::Error;

/// Which registration field was blank
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputField {
    /// Registrant name
    Name,
    /// Registrant email
    Email,
}

impl std::fmt::Display for InputField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Email => "email",
        })
    }
}

/// Errors from ledger operations
///
/// `InvalidInput`, `DuplicateEmail` and `NotFound` are rejections: the
/// ledger is left untouched. `Persistence` means the in-memory ledger was
/// updated but the durable copy may be stale.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Name or email was blank after trimming
    #[error("{field} must not be blank")]
    InvalidInput {
        /// The blank field
        field: InputField,
    },

    /// Email already confirmed or waiting
    #[error("{email} is already used for a booking or the waiting list")]
    DuplicateEmail {
        /// The rejected email
        email: String,
    },

    /// No confirmed booking has this id
    #[error("no confirmed booking with id {id}")]
    NotFound {
        /// The requested id
        id: RegistrantId,
    },

    /// Durable storage failed; in-memory state was kept
    #[error("failed to persist ledger state: {0}")]
    Persistence(#[from] StorageError),

    /// The store finished a command without producing its outcome event
    #[error("{command} produced no outcome")]
    MissingOutcome {
        /// Command name
        command: &'static str,
    },
}

impl BookingError {
    /// Short label for logs and metrics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::DuplicateEmail { .. } => "duplicate_email",
            Self::NotFound { .. } => "not_found",
            Self::Persistence(_) => "persistence",
            Self::MissingOutcome { .. } => "missing_outcome",
        }
    }

    /// True for validation failures that left the ledger unchanged
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::DuplicateEmail { .. } | Self::NotFound { .. }
        )
    }
}

impl From<StoreError> for BookingError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Storage(storage) => Self::Persistence(storage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        let error = BookingError::InvalidInput { field: InputField::Email };
        assert_eq!(error.to_string(), "email must not be blank");

        let error = BookingError::NotFound { id: RegistrantId::new(9) };
        assert_eq!(error.to_string(), "no confirmed booking with id 9");
    }

    #[test]
    fn store_errors_become_persistence_errors() {
        let error = BookingError::from(StoreError::Storage(StorageError::Io("disk full".into())));
        assert_eq!(error.kind(), "persistence");
        assert!(!error.is_rejection());
    }
}
