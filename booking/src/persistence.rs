//! Persisted layout of the ledger.
//!
//! Three independently stored values make up one record:
//!
//! | Key              | Value                                         |
//! |------------------|-----------------------------------------------|
//! | `bookings`       | JSON array of `{id, name, email}`             |
//! | `waitingList`    | JSON array of `{id, name, email}`             |
//! | `availableSlots` | integer as a decimal string                   |
//!
//! Every save overwrites all three. Loading reads each key on its own and
//! falls back to the fresh-ledger default for that key when it is absent
//! or cannot be parsed.

use crate::types::{LedgerState, Registrant};
use event_booking_core::{
    effect::{Effect, StorageOperation},
    storage::{KeyValueStore, StorageError},
};
use std::collections::VecDeque;
use std::sync::Arc;

/// Confirmed bookings
pub const BOOKINGS_KEY: &str = "bookings";
/// Waiting list
pub const WAITING_LIST_KEY: &str = "waitingList";
/// Remaining slot counter
pub const AVAILABLE_SLOTS_KEY: &str = "availableSlots";

/// Every key owned by a ledger
pub const LEDGER_KEYS: [&str; 3] = [BOOKINGS_KEY, WAITING_LIST_KEY, AVAILABLE_SLOTS_KEY];

/// Serializes `state` into its three stored values
///
/// # Errors
///
/// Returns [`StorageError::Serialization`] if a registrant list cannot be encoded.
pub fn encode(state: &LedgerState) -> Result<[(&'static str, String); 3], StorageError> {
    let bookings = serde_json::to_string(&state.confirmed)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    let waiting = serde_json::to_string(&state.waiting)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

    Ok([
        (BOOKINGS_KEY, bookings),
        (WAITING_LIST_KEY, waiting),
        (AVAILABLE_SLOTS_KEY, state.remaining_slots.to_string()),
    ])
}

/// Effect that overwrites the stored record with `state`
///
/// # Errors
///
/// Returns [`StorageError::Serialization`] if `state` cannot be encoded.
pub fn save_effect<A>(
    state: &LedgerState,
    storage: &Arc<dyn KeyValueStore>,
) -> Result<Effect<A>, StorageError> {
    let puts = encode(state)?
        .into_iter()
        .map(|(key, value)| {
            Effect::Storage(StorageOperation::Put {
                store: Arc::clone(storage),
                key: key.to_string(),
                value,
            })
        })
        .collect();

    Ok(Effect::chain(puts))
}

/// Effect that deletes every stored ledger key
#[must_use]
pub fn clear_effect<A>(storage: &Arc<dyn KeyValueStore>) -> Effect<A> {
    Effect::chain(
        LEDGER_KEYS
            .iter()
            .map(|key| {
                Effect::Storage(StorageOperation::Remove {
                    store: Arc::clone(storage),
                    key: (*key).to_string(),
                })
            })
            .collect(),
    )
}

/// Rehydrates a ledger from `storage`
///
/// Missing or unparseable keys fall back to `[]`, `[]` and `total_slots`.
/// The loaded values are trusted as-is: nothing is re-derived or repaired.
pub fn load_state(storage: &dyn KeyValueStore, total_slots: u32) -> LedgerState {
    let confirmed: Vec<Registrant> =
        parse_registrants(read_key(storage, BOOKINGS_KEY), BOOKINGS_KEY);
    let waiting: VecDeque<Registrant> =
        parse_registrants(read_key(storage, WAITING_LIST_KEY), WAITING_LIST_KEY);
    let remaining_slots = parse_slots(read_key(storage, AVAILABLE_SLOTS_KEY), total_slots);

    LedgerState::from_parts(confirmed, waiting, remaining_slots)
}

fn read_key(storage: &dyn KeyValueStore, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value,
        Err(error) => {
            tracing::error!(key, error = %error, "Failed to read ledger key, using default");
            None
        },
    }
}

fn parse_registrants<C>(raw: Option<String>, key: &str) -> C
where
    C: Default + serde::de::DeserializeOwned,
{
    let Some(raw) = raw else {
        return C::default();
    };

    serde_json::from_str(&raw).unwrap_or_else(|error| {
        tracing::warn!(key, error = %error, "Unparseable registrant list, using empty list");
        C::default()
    })
}

/// Parses the stored slot counter
///
/// `"0"` is a real value; only absent, negative or non-integer input falls
/// back to `default`.
fn parse_slots(raw: Option<String>, default: u32) -> u32 {
    let Some(raw) = raw else {
        return default;
    };

    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(key = AVAILABLE_SLOTS_KEY, value = %raw, "Unparseable slot count, using default");
        default
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::RegistrantId;
    use event_booking_testing::InMemoryKeyValueStore;

    fn sample_state() -> LedgerState {
        LedgerState::from_parts(
            vec![Registrant::new(RegistrantId::new(1), "Ada", "ada@x")],
            VecDeque::from([Registrant::new(RegistrantId::new(2), "Bob", "bob@x")]),
            0,
        )
    }

    #[test]
    fn encode_matches_layout() {
        let [bookings, waiting, slots] = encode(&sample_state()).unwrap();

        assert_eq!(bookings.0, "bookings");
        assert_eq!(bookings.1, r#"[{"id":1,"name":"Ada","email":"ada@x"}]"#);
        assert_eq!(waiting.0, "waitingList");
        assert_eq!(waiting.1, r#"[{"id":2,"name":"Bob","email":"bob@x"}]"#);
        assert_eq!(slots, ("availableSlots", "0".to_string()));
    }

    #[test]
    fn load_from_empty_store_is_fresh() {
        let state = load_state(&InMemoryKeyValueStore::new(), 10);

        assert!(state.confirmed.is_empty());
        assert!(state.waiting.is_empty());
        assert_eq!(state.remaining_slots, 10);
    }

    #[test]
    fn each_key_falls_back_independently() {
        let storage = InMemoryKeyValueStore::with_entries([
            (BOOKINGS_KEY, r#"[{"id":1,"name":"Ada","email":"ada@x"}]"#),
            (WAITING_LIST_KEY, "not json"),
            (AVAILABLE_SLOTS_KEY, "seven"),
        ]);

        let state = load_state(&storage, 4);

        assert_eq!(state.confirmed.len(), 1);
        assert!(state.waiting.is_empty());
        assert_eq!(state.remaining_slots, 4);
    }

    #[test]
    fn zero_slots_is_not_treated_as_missing() {
        let storage = InMemoryKeyValueStore::with_entries([(AVAILABLE_SLOTS_KEY, "0")]);
        assert_eq!(load_state(&storage, 10).remaining_slots, 0);
    }

    #[test]
    fn negative_slots_fall_back_to_default() {
        let storage = InMemoryKeyValueStore::with_entries([(AVAILABLE_SLOTS_KEY, "-3")]);
        assert_eq!(load_state(&storage, 10).remaining_slots, 10);
    }

    #[test]
    fn loaded_state_is_not_repaired() {
        let storage = InMemoryKeyValueStore::with_entries([
            (BOOKINGS_KEY, r#"[{"id":1,"name":"Ada","email":"ada@x"}]"#),
            (AVAILABLE_SLOTS_KEY, "10"),
        ]);

        let state = load_state(&storage, 10);

        assert_eq!(state.remaining_slots, 10);
        assert!(state.check_invariants(10).is_err());
    }
}
