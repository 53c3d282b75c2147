//! Placeholder for Error Tracking System features.
//! As per Prompt #8: Crash reporting, error aggregation, context collection, notifications.

use tracing::warn;

pub fn init_error_tracking() {
    warn!("Error tracking system is not yet fully implemented.");
}

pub fn report_crash(details: &str, stack_trace: Option<&str>) {
    warn!("Crash reported: {} (Stack: {:?}) - feature not fully implemented.", details, stack_trace.unwrap_or("N/A"));
}

pub fn aggregate_error(error_signature: &str, count: u32) {
    // warn!("Error aggregation for '{}': {} occurrences - feature not fully implemented.", error_signature, count);
}
