//! Business metrics for the booking ledger.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `booking_registrations_total{placement}` - Registrations by placement (confirmed, waitlisted)
//! - `booking_cancellations_total{promoted}` - Cancellations, labelled by whether someone was promoted
//! - `booking_rejections_total{reason}` - Rejected commands by error kind
//! - `booking_resets_total` - Ledger resets
//!
//! ## Gauges
//! - `booking_available_slots` - Slots still free
//! - `booking_waiting_list_length` - Registrants waiting

use crate::types::{LedgerView, Placement};
use metrics::{counter, describe_counter, describe_gauge, gauge};

/// Register all booking metric descriptions.
///
/// Call once at application startup, before any metrics are recorded.
pub fn register_business_metrics() {
    describe_counter!(
        "booking_registrations_total",
        "Total number of registrations by placement (confirmed, waitlisted)"
    );
    describe_counter!(
        "booking_cancellations_total",
        "Total number of cancelled bookings, by whether a waiting registrant was promoted"
    );
    describe_counter!(
        "booking_rejections_total",
        "Total number of rejected commands by reason"
    );
    describe_counter!("booking_resets_total", "Total number of ledger resets");
    describe_gauge!("booking_available_slots", "Current number of free slots");
    describe_gauge!(
        "booking_waiting_list_length",
        "Current number of registrants on the waiting list"
    );

    tracing::debug!("Booking metrics registered");
}

pub(crate) fn record_registration(placement: Placement) {
    counter!("booking_registrations_total", "placement" => placement.as_str()).increment(1);
}

pub(crate) fn record_cancellation(promoted: bool) {
    let label = if promoted { "true" } else { "false" };
    counter!("booking_cancellations_total", "promoted" => label).increment(1);
}

pub(crate) fn record_rejection(reason: &'static str) {
    counter!("booking_rejections_total", "reason" => reason).increment(1);
}

pub(crate) fn record_reset() {
    counter!("booking_resets_total").increment(1);
}

#[allow(clippy::cast_precision_loss)] // Ledger sizes are far below 2^52
pub(crate) fn record_levels(view: &LedgerView) {
    gauge!("booking_available_slots").set(f64::from(view.available_slots));
    gauge!("booking_waiting_list_length").set(view.waiting_list.len() as f64);
}
