//! Configuration management for the booking ledger.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Read once at process start; the values are fixed for the process lifetime.

use serde::{Deserialize, Serialize};
use std::env;
use std::num::NonZeroU32;
use std::path::PathBuf;

/// Slots when `EVENT_SLOTS` is unset or invalid
pub const DEFAULT_EVENT_SLOTS: NonZeroU32 = match NonZeroU32::new(10) {
    Some(slots) => slots,
    None => NonZeroU32::MIN,
};

/// Store directory when `BOOKING_DATA_DIR` is unset
pub const DEFAULT_DATA_DIR: &str = ".event-booking";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Size of the slot pool (`EVENT_SLOTS`)
    pub event_slots: NonZeroU32,
    /// Directory of the file store (`BOOKING_DATA_DIR`)
    pub data_dir: PathBuf,
    /// Log filter (`RUST_LOG`)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_slots: DEFAULT_EVENT_SLOTS,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A missing, zero or non-numeric `EVENT_SLOTS` falls back to 10.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            event_slots: lookup("EVENT_SLOTS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.event_slots),
            data_dir: lookup("BOOKING_DATA_DIR")
                .filter(|s| !s.trim().is_empty())
                .map_or(defaults.data_dir, PathBuf::from),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }

    /// Slot pool size as a plain integer
    #[must_use]
    pub const fn total_slots(&self) -> u32 {
        self.event_slots.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.total_slots(), 10);
        assert_eq!(config.data_dir, PathBuf::from(".event-booking"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn reads_event_slots() {
        assert_eq!(config_from(&[("EVENT_SLOTS", " 25 ")]).total_slots(), 25);
    }

    #[test]
    fn invalid_event_slots_fall_back() {
        for raw in ["0", "-4", "ten", ""] {
            assert_eq!(config_from(&[("EVENT_SLOTS", raw)]).total_slots(), 10, "{raw:?}");
        }
    }

    #[test]
    fn reads_data_dir() {
        let config = config_from(&[("BOOKING_DATA_DIR", "/var/lib/booking")]);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/booking"));
    }
}
