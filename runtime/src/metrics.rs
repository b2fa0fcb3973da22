//! Runtime metrics for the Store.
//!
//! Metrics are recorded through the `metrics` facade. Nothing is exported
//! unless the embedding application installs a recorder.
//!
//! # Recorded Metrics
//!
//! - `store_actions_total` - Actions reduced (including fed-back actions)
//! - `store_storage_operations_total{operation}` - Storage effects executed
//! - `store_storage_failures_total{operation}` - Storage effects that failed

use metrics::{counter, describe_counter};

/// Register all runtime metric descriptions.
///
/// Call once at startup, after a recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "store_actions_total",
        "Total number of actions reduced by the store"
    );
    describe_counter!(
        "store_storage_operations_total",
        "Total number of storage effects executed, by operation"
    );
    describe_counter!(
        "store_storage_failures_total",
        "Total number of storage effects that failed, by operation"
    );
}

pub(crate) fn record_action() {
    counter!("store_actions_total").increment(1);
}

pub(crate) fn record_storage(operation: &'static str, ok: bool) {
    counter!("store_storage_operations_total", "operation" => operation).increment(1);
    if !ok {
        counter!("store_storage_failures_total", "operation" => operation).increment(1);
    }
}
