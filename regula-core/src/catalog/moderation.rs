//! Simulated moderation: scanner verdicts and spam reports

use serde::{Deserialize, Serialize};

use super::package::{ModerationTag, PackageStatus};
use crate::config::{CatalogConfig, ReportPolicy};
use crate::random::RandomSource;
use crate::types::{PackageId, Timestamp};

/// Exclusive upper bound of a sampled report count
pub const SAMPLED_REPORT_RANGE: u32 = 10;

/// A report filed against a package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationReport {
    pub reason: String,
    pub reporter: Option<String>,
    pub reported_at: Timestamp,
}

/// What a report did to its package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutcome {
    pub package_id: PackageId,
    /// Existing count plus this report
    pub report_count: u32,
    /// True when this report moved the package to spam
    pub flagged: bool,
    pub status: PackageStatus,
}

/// Tag given by the upload scan
pub fn scan_tag(rng: &dyn RandomSource, config: &CatalogConfig) -> ModerationTag {
    if rng.exceeds(config.warning_ceiling) {
        ModerationTag::Safe
    } else {
        ModerationTag::Warning
    }
}

/// Outcome of the timed review, `true` meaning approved
pub fn review_verdict(rng: &dyn RandomSource, config: &CatalogConfig) -> bool {
    rng.exceeds(config.rejection_ceiling)
}

/// Report count a package is believed to have before a new report
///
/// `logged` is the number of reports already in the package's log.
pub fn existing_reports(rng: &dyn RandomSource, policy: ReportPolicy, logged: usize) -> u32 {
    match policy {
        ReportPolicy::Sampled => rng.next_below(SAMPLED_REPORT_RANGE),
        ReportPolicy::Cumulative => u32::try_from(logged).unwrap_or(u32::MAX),
    }
}

/// Whether `existing` prior reports plus one more reach `threshold`
pub fn reaches_threshold(existing: u32, threshold: u32) -> bool {
    existing.saturating_add(1) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedRandom;

    #[test]
    fn test_threshold() {
        assert!(!reaches_threshold(0, 5));
        assert!(!reaches_threshold(3, 5));
        assert!(reaches_threshold(4, 5));
        assert!(reaches_threshold(9, 5));
        assert!(reaches_threshold(u32::MAX, 5));
    }

    #[test]
    fn test_scan_tag_boundaries() {
        let config = CatalogConfig::default();

        let rng = ScriptedRandom::new().with_floats([0.31, 0.3, 0.0]);
        assert_eq!(scan_tag(&rng, &config), ModerationTag::Safe);
        assert_eq!(scan_tag(&rng, &config), ModerationTag::Warning);
        assert_eq!(scan_tag(&rng, &config), ModerationTag::Warning);
    }

    #[test]
    fn test_review_verdict_boundaries() {
        let config = CatalogConfig::default();

        let rng = ScriptedRandom::new().with_floats([0.95, 0.21, 0.2, 0.05]);
        assert!(review_verdict(&rng, &config));
        assert!(review_verdict(&rng, &config));
        assert!(!review_verdict(&rng, &config));
        assert!(!review_verdict(&rng, &config));
    }

    #[test]
    fn test_existing_reports_per_policy() {
        let rng = ScriptedRandom::new().with_integers([7]);
        assert_eq!(existing_reports(&rng, ReportPolicy::Sampled, 2), 7);
        assert_eq!(existing_reports(&rng, ReportPolicy::Cumulative, 2), 2);
    }
}
