//! Metrics collection for observability

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

mod collector;

pub use collector::ActivityCollector;

pub const PACKAGES_SUBMITTED: &str = "catalog.packages.submitted";
pub const PACKAGES_APPROVED: &str = "catalog.packages.approved";
pub const PACKAGES_REJECTED: &str = "catalog.packages.rejected";
pub const PACKAGES_FLAGGED: &str = "catalog.packages.flagged_spam";
pub const PACKAGE_DOWNLOADS: &str = "catalog.downloads";
pub const PACKAGE_RATINGS: &str = "catalog.ratings";
pub const PACKAGE_REPORTS: &str = "catalog.reports";
pub const PAID_EDITS: &str = "catalog.edits.paid";
pub const EDIT_PAYMENTS_REFUSED: &str = "catalog.edits.refused";
pub const IDENTITY_REGISTRATIONS: &str = "identity.registrations";
pub const IDENTITY_LOGINS: &str = "identity.logins";
pub const OPERATION_DURATION_MS: &str = "operation.duration_ms";

/// Initialize metrics with descriptions
pub fn init_metrics() {
    // Catalog metrics
    describe_counter!(PACKAGES_SUBMITTED, "Packages submitted for review");
    describe_counter!(PACKAGES_APPROVED, "Packages approved by the automated review");
    describe_counter!(PACKAGES_REJECTED, "Packages rejected by the automated review");
    describe_counter!(PACKAGES_FLAGGED, "Packages flagged as spam after reports");
    describe_counter!(PACKAGE_DOWNLOADS, "Completed download countdowns");
    describe_counter!(PACKAGE_RATINGS, "Ratings applied to packages");
    describe_counter!(PACKAGE_REPORTS, "Moderation reports received");
    describe_counter!(PAID_EDITS, "Paid edits applied");
    describe_counter!(EDIT_PAYMENTS_REFUSED, "Edits refused for insufficient payment");

    // Identity metrics
    describe_counter!(IDENTITY_REGISTRATIONS, "User registrations");
    describe_counter!(IDENTITY_LOGINS, "User logins");

    describe_histogram!(OPERATION_DURATION_MS, "Store operation duration in milliseconds");
}

/// Record a counter metric
pub fn record_counter(name: &'static str, value: u64) {
    counter!(name).increment(value);
}

/// Timer for measuring operation duration
pub struct Timer {
    operation: &'static str,
    start: Instant,
}

impl Timer {
    /// Create a new timer
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    /// Stop the timer and record the duration
    pub fn stop(self) {
        let duration = self.start.elapsed();
        histogram!(OPERATION_DURATION_MS, "operation" => self.operation)
            .record(duration.as_secs_f64() * 1000.0);
    }
}

/// Activity counters at a point in time
#[derive(Debug, Clone)]
pub struct ActivitySnapshot {
    pub timestamp: std::time::SystemTime,
    pub submissions: u64,
    pub approvals: u64,
    pub rejections: u64,
    pub spam_flags: u64,
    pub downloads: u64,
    pub ratings: u64,
    pub paid_edits: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        // No global recorder is installed in tests; the facade must accept
        // calls anyway.
        init_metrics();
        record_counter(PACKAGES_SUBMITTED, 1);
        Timer::new("submit").stop();
    }
}
