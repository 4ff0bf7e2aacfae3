//! In-process activity counters

use std::sync::atomic::{AtomicU64, Ordering};

use super::ActivitySnapshot;

/// Counters for catalog and identity activity
///
/// The `metrics` facade only exports; this collector keeps the same numbers
/// readable in-process so the CLI can print a summary.
#[derive(Debug, Default)]
pub struct ActivityCollector {
    submissions: AtomicU64,
    approvals: AtomicU64,
    rejections: AtomicU64,
    spam_flags: AtomicU64,
    downloads: AtomicU64,
    ratings: AtomicU64,
    paid_edits: AtomicU64,
}

impl ActivityCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_submissions(&self) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_approvals(&self) {
        self.approvals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejections(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_spam_flags(&self) {
        self.spam_flags.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_downloads(&self) {
        self.downloads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_ratings(&self) {
        self.ratings.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_paid_edits(&self) {
        self.paid_edits.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current counters
    pub fn snapshot(&self) -> ActivitySnapshot {
        ActivitySnapshot {
            timestamp: std::time::SystemTime::now(),
            submissions: self.submissions.load(Ordering::Relaxed),
            approvals: self.approvals.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            spam_flags: self.spam_flags.load(Ordering::Relaxed),
            downloads: self.downloads.load(Ordering::Relaxed),
            ratings: self.ratings.load(Ordering::Relaxed),
            paid_edits: self.paid_edits.load(Ordering::Relaxed),
        }
    }
}
