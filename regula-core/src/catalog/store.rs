//! The catalog store
//!
//! Owned packages and featured items share one lock. Every mutation is one
//! critical section, so concurrent operations on the same package never
//! lose each other's updates. Review timers hold only a [`Weak`] handle on
//! the state: a timer that fires after the store is gone does nothing.

use serde::Serialize;
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::edit::{EditEntry, EditRequest, EditTier, PaymentInfo};
use super::featured::featured_seed;
use super::moderation::{
    existing_reports, reaches_threshold, review_verdict, scan_tag, ModerationReport, ReportOutcome,
};
use super::package::{ModerationTag, Origin, Owner, Package, PackageStatus, Submission};
use super::query::PackageQuery;
use super::review::{sort_reviews, Review, ReviewOrder, ReviewStats, Stars};
use super::scheduler::ReviewScheduler;
use super::CatalogError;
use crate::config::CatalogConfig;
use crate::identity::IdentityStore;
use crate::metrics::{self, record_counter, ActivityCollector, Timer};
use crate::random::RandomSource;
use crate::types::{self, IdSequence, PackageId, ReviewId, UserId};

/// Result of a finished download countdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadReceipt {
    pub package_id: PackageId,
    pub file_name: String,
    /// Download count after this download
    pub downloads: u64,
}

/// Aggregate rating after a rating was applied
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub package_id: PackageId,
    pub rating: f64,
    pub review_count: u64,
}

#[derive(Default)]
struct CatalogState {
    owned: Vec<Package>,
    featured: Vec<Package>,
}

impl CatalogState {
    fn find(&self, id: PackageId) -> Option<&Package> {
        self.owned
            .iter()
            .chain(self.featured.iter())
            .find(|p| p.id == id)
    }

    fn find_mut(&mut self, id: PackageId) -> Option<&mut Package> {
        self.owned
            .iter_mut()
            .chain(self.featured.iter_mut())
            .find(|p| p.id == id)
    }

    fn owned_mut(&mut self, id: PackageId) -> Option<&mut Package> {
        self.owned.iter_mut().find(|p| p.id == id)
    }
}

/// State reachable from review timers
struct Shared {
    state: RwLock<CatalogState>,
    rng: Arc<dyn RandomSource>,
    config: CatalogConfig,
    activity: Arc<ActivityCollector>,
}

impl Shared {
    async fn resolve_review(&self, id: PackageId) -> Option<PackageStatus> {
        let mut state = self.state.write().await;

        let Some(package) = state.owned_mut(id) else {
            debug!(package_id = %id, "Review skipped, package is gone");
            return None;
        };
        if package.status != PackageStatus::Pending {
            debug!(package_id = %id, status = %package.status, "Review skipped, package already settled");
            return None;
        }

        let approved = review_verdict(self.rng.as_ref(), &self.config);
        package.status = if approved {
            PackageStatus::Approved
        } else {
            PackageStatus::Rejected
        };
        package.verified = approved;
        package.moderation = if approved {
            ModerationTag::Safe
        } else {
            ModerationTag::Danger
        };
        package.reviewed_at = Some(types::now());

        if approved {
            record_counter(metrics::PACKAGES_APPROVED, 1);
            self.activity.inc_approvals();
        } else {
            record_counter(metrics::PACKAGES_REJECTED, 1);
            self.activity.inc_rejections();
        }
        info!(package_id = %id, status = %package.status, "Review of {} finished", package.name);

        Some(package.status)
    }
}

/// Submitted and featured packages with their review workflow
pub struct CatalogStore {
    shared: Arc<Shared>,
    identity: Arc<IdentityStore>,
    scheduler: ReviewScheduler,
    package_ids: IdSequence,
    review_ids: IdSequence,
}

impl CatalogStore {
    /// Create a store holding the featured items and no submissions
    ///
    /// Review timers stop when `cancel` is cancelled or the store is dropped.
    pub fn new(
        config: CatalogConfig,
        identity: Arc<IdentityStore>,
        rng: Arc<dyn RandomSource>,
        cancel: CancellationToken,
    ) -> Self {
        let state = CatalogState {
            owned: Vec::new(),
            featured: featured_seed(),
        };

        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(state),
                rng,
                config,
                activity: Arc::new(ActivityCollector::new()),
            }),
            identity,
            scheduler: ReviewScheduler::new(cancel),
            package_ids: IdSequence::from_clock(),
            review_ids: IdSequence::from_clock(),
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.shared.config
    }

    /// Activity counters since the store was created
    pub fn activity(&self) -> &ActivityCollector {
        &self.shared.activity
    }

    /// Replace the featured items with a fresh seed
    pub async fn load_featured(&self) -> usize {
        tokio::time::sleep(self.shared.config.featured_latency).await;

        let seed = featured_seed();
        let count = seed.len();
        self.shared.state.write().await.featured = seed;

        debug!("Loaded {} featured packages", count);
        count
    }

    /// Accept an upload as a pending package and start its review timer
    pub async fn submit_package(&self, submission: Submission) -> Package {
        let timer = Timer::new("submit_package");
        tokio::time::sleep(self.shared.config.submit_latency).await;

        let owner = match self.identity.current_user().await {
            Some(user) => Owner {
                id: Some(user.id),
                name: user.name,
            },
            None => Owner::anonymous(),
        };

        let rng = self.shared.rng.as_ref();
        let moderation = scan_tag(rng, &self.shared.config);
        let size = match submission.binary {
            Some(_) => format!("{:.1} MB", rng.next_f64() * 100.0 + 5.0),
            None => "0 MB".to_string(),
        };

        let package = Package {
            id: PackageId::new(self.package_ids.next()),
            origin: Origin::Submitted,
            name: submission.name,
            version: submission.version,
            package_name: submission.package_name,
            description: submission.description,
            category: submission.category,
            binary: submission.binary,
            icon: submission.icon,
            screenshots: submission.screenshots,
            size,
            owner,
            uploaded_at: types::now(),
            status: PackageStatus::Pending,
            verified: false,
            moderation,
            downloads: 0,
            rating: 0.0,
            review_count: 0,
            rating_sum: 0.0,
            reviews: Vec::new(),
            reports: Vec::new(),
            spam_reports: None,
            reviewed_at: None,
            last_edited: None,
            edit_history: Vec::new(),
        };

        self.shared.state.write().await.owned.push(package.clone());

        let id = package.id;
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        self.scheduler
            .schedule(id, self.shared.config.review_delay, move || async move {
                match weak.upgrade() {
                    Some(shared) => {
                        shared.resolve_review(id).await;
                    }
                    None => debug!(package_id = %id, "Review fired after the catalog was dropped"),
                }
            });

        record_counter(metrics::PACKAGES_SUBMITTED, 1);
        self.shared.activity.inc_submissions();
        info!(
            package_id = %id,
            moderation = %package.moderation,
            "Package {} v{} submitted for review",
            package.name,
            package.version
        );
        timer.stop();

        package
    }

    /// Settle a pending package now, as its timer would
    ///
    /// Returns the new status, or `None` when the package is missing or
    /// no longer pending.
    pub async fn resolve_review(&self, id: PackageId) -> Option<PackageStatus> {
        self.scheduler.cancel(id);
        self.shared.resolve_review(id).await
    }

    /// Stop the review timer of one package
    pub fn cancel_review(&self, id: PackageId) -> bool {
        self.scheduler.cancel(id)
    }

    pub fn is_review_scheduled(&self, id: PackageId) -> bool {
        self.scheduler.is_scheduled(id)
    }

    pub fn pending_reviews(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// Stop every review timer
    pub fn shutdown(&self) {
        let pending = self.scheduler.pending_count();
        self.scheduler.cancel_all();
        info!("Catalog stopped with {} review(s) still pending", pending);
    }

    /// Count down, then count one download
    pub async fn download_package(&self, id: PackageId) -> Result<DownloadReceipt, CatalogError> {
        self.download_package_with_cancel(id, &CancellationToken::new())
            .await
    }

    /// Like [`download_package`](Self::download_package); cancelling `cancel`
    /// during the countdown aborts it without counting a download
    pub async fn download_package_with_cancel(
        &self,
        id: PackageId,
        cancel: &CancellationToken,
    ) -> Result<DownloadReceipt, CatalogError> {
        let name = {
            let state = self.shared.state.read().await;
            let package = state.find(id).ok_or(CatalogError::PackageNotFound(id))?;
            package.name.clone()
        };

        let config = &self.shared.config;
        for remaining in (1..=config.download_countdown_ticks).rev() {
            info!(package_id = %id, "Download of {} starts in {}s", name, remaining);
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(package_id = %id, "Download of {} cancelled", name);
                    return Err(CatalogError::DownloadCancelled(id));
                }
                _ = tokio::time::sleep(config.download_tick) => {}
            }
        }

        let receipt = {
            let mut state = self.shared.state.write().await;
            let package = state
                .find_mut(id)
                .ok_or(CatalogError::PackageNotFound(id))?;
            package.downloads += 1;
            DownloadReceipt {
                package_id: id,
                file_name: package.file_name(),
                downloads: package.downloads,
            }
        };

        record_counter(metrics::PACKAGE_DOWNLOADS, 1);
        self.shared.activity.inc_downloads();
        info!(package_id = %id, "Download of {} started", receipt.file_name);

        Ok(receipt)
    }

    /// Fold a star rating into the package's mean
    pub async fn rate_package(
        &self,
        id: PackageId,
        stars: Stars,
        comment: &str,
    ) -> Result<RatingSummary, CatalogError> {
        tokio::time::sleep(self.shared.config.rate_latency).await;

        let summary = {
            let mut state = self.shared.state.write().await;
            let package = state
                .find_mut(id)
                .ok_or(CatalogError::PackageNotFound(id))?;
            package.apply_rating(stars);
            RatingSummary {
                package_id: id,
                rating: package.rating,
                review_count: package.review_count,
            }
        };

        record_counter(metrics::PACKAGE_RATINGS, 1);
        self.shared.activity.inc_ratings();
        debug!(package_id = %id, %stars, comment, "Rating applied, mean now {}", summary.rating);

        Ok(summary)
    }

    /// Publish a written review by the logged-in user and count its rating
    pub async fn submit_review(
        &self,
        id: PackageId,
        stars: Stars,
        comment: &str,
    ) -> Result<Review, CatalogError> {
        let user = self
            .identity
            .current_user()
            .await
            .ok_or(CatalogError::NotAuthenticated)?;

        tokio::time::sleep(self.shared.config.rate_latency).await;

        let review = Review {
            id: ReviewId::new(self.review_ids.next()),
            author_id: user.id,
            author_name: user.name,
            stars,
            comment: comment.trim().to_string(),
            created_at: types::now(),
            helpful: 0,
            reported: false,
            verified: user.verified,
        };

        {
            let mut state = self.shared.state.write().await;
            let package = state
                .find_mut(id)
                .ok_or(CatalogError::PackageNotFound(id))?;
            package.reviews.push(review.clone());
            package.apply_rating(stars);
        }

        record_counter(metrics::PACKAGE_RATINGS, 1);
        self.shared.activity.inc_ratings();
        info!(package_id = %id, review_id = %review.id, "Review by {} published", review.author_name);

        Ok(review)
    }

    /// Vote a review up or down; returns the new helpfulness score
    pub async fn vote_review(
        &self,
        package_id: PackageId,
        review_id: ReviewId,
        helpful: bool,
    ) -> Result<i64, CatalogError> {
        let mut state = self.shared.state.write().await;
        let review = state
            .find_mut(package_id)
            .ok_or(CatalogError::PackageNotFound(package_id))?
            .review_mut(review_id)
            .ok_or(CatalogError::ReviewNotFound {
                package_id,
                review_id,
            })?;

        review.helpful += if helpful { 1 } else { -1 };
        Ok(review.helpful)
    }

    /// Soft-flag a review; it stays in the list
    pub async fn report_review(
        &self,
        package_id: PackageId,
        review_id: ReviewId,
    ) -> Result<(), CatalogError> {
        let mut state = self.shared.state.write().await;
        let review = state
            .find_mut(package_id)
            .ok_or(CatalogError::PackageNotFound(package_id))?
            .review_mut(review_id)
            .ok_or(CatalogError::ReviewNotFound {
                package_id,
                review_id,
            })?;

        review.reported = true;
        info!(%package_id, %review_id, "Review reported");
        Ok(())
    }

    pub async fn reviews(
        &self,
        id: PackageId,
        order: ReviewOrder,
    ) -> Result<Vec<Review>, CatalogError> {
        let state = self.shared.state.read().await;
        let package = state.find(id).ok_or(CatalogError::PackageNotFound(id))?;
        Ok(sort_reviews(&package.reviews, order))
    }

    pub async fn review_stats(&self, id: PackageId) -> Result<ReviewStats, CatalogError> {
        let state = self.shared.state.read().await;
        let package = state.find(id).ok_or(CatalogError::PackageNotFound(id))?;
        Ok(ReviewStats::from_reviews(&package.reviews))
    }

    /// Log a report and flag the package as spam once the count reaches
    /// the threshold
    pub async fn report_package(
        &self,
        id: PackageId,
        reason: &str,
    ) -> Result<ReportOutcome, CatalogError> {
        tokio::time::sleep(self.shared.config.report_latency).await;

        let reporter = self.identity.current_user().await.map(|u| u.name);
        let config = &self.shared.config;

        let (outcome, was_pending) = {
            let mut state = self.shared.state.write().await;
            let package = state
                .find_mut(id)
                .ok_or(CatalogError::PackageNotFound(id))?;

            let existing = existing_reports(
                self.shared.rng.as_ref(),
                config.report_policy,
                package.reports.len(),
            );
            package.reports.push(ModerationReport {
                reason: reason.to_string(),
                reporter,
                reported_at: types::now(),
            });

            let count = existing.saturating_add(1);
            let was_pending = package.status == PackageStatus::Pending;
            let flagged = !package.is_featured()
                && package.status.can_transition_to(PackageStatus::Spam)
                && reaches_threshold(existing, config.report_threshold);
            if flagged {
                package.status = PackageStatus::Spam;
                package.spam_reports = Some(count);
            }

            let outcome = ReportOutcome {
                package_id: id,
                report_count: count,
                flagged,
                status: package.status,
            };
            (outcome, was_pending)
        };

        record_counter(metrics::PACKAGE_REPORTS, 1);
        if outcome.flagged {
            if was_pending {
                self.scheduler.cancel(id);
            }
            record_counter(metrics::PACKAGES_FLAGGED, 1);
            self.shared.activity.inc_spam_flags();
            warn!(package_id = %id, reports = outcome.report_count, "Package flagged as spam");
        } else {
            debug!(package_id = %id, reason, "Report logged");
        }

        Ok(outcome)
    }

    /// Apply a paid edit to an owned package
    ///
    /// The payment is checked before anything else happens.
    pub async fn edit_package(
        &self,
        id: PackageId,
        edit: EditRequest,
        payment: PaymentInfo,
    ) -> Result<Package, CatalogError> {
        let config = &self.shared.config;
        let tier = EditTier::for_request(&edit);
        let required = tier.price(config);

        if payment.amount < required {
            record_counter(metrics::EDIT_PAYMENTS_REFUSED, 1);
            warn!(package_id = %id, %tier, "Edit refused, paid {} of {}", payment.amount, required);
            return Err(CatalogError::InsufficientPayment {
                required,
                offered: payment.amount,
                currency: config.currency.clone(),
            });
        }

        let timer = Timer::new("edit_package");
        tokio::time::sleep(config.edit_latency).await;

        let editor = self.identity.current_user().await.map(|u| u.name);

        let edited = {
            let mut state = self.shared.state.write().await;
            let package = state
                .owned_mut(id)
                .ok_or(CatalogError::PackageNotFound(id))?;

            edit.apply_to(package);
            let now = types::now();
            package.last_edited = Some(now);
            package.edit_history.push(EditEntry {
                timestamp: now,
                editor,
                changes: edit,
                tier,
                amount_paid: payment.amount,
                transaction_id: payment.transaction_id,
            });
            package.clone()
        };

        record_counter(metrics::PAID_EDITS, 1);
        self.shared.activity.inc_paid_edits();
        info!(package_id = %id, %tier, "Edit of {} applied", edited.name);
        timer.stop();

        Ok(edited)
    }

    /// Snapshot of one package, owned or featured
    pub async fn package(&self, id: PackageId) -> Option<Package> {
        self.shared.state.read().await.find(id).cloned()
    }

    pub async fn owned_packages(&self) -> Vec<Package> {
        self.shared.state.read().await.owned.clone()
    }

    pub async fn featured_packages(&self) -> Vec<Package> {
        self.shared.state.read().await.featured.clone()
    }

    pub async fn packages_by_owner(&self, owner: UserId) -> Vec<Package> {
        self.shared
            .state
            .read()
            .await
            .owned
            .iter()
            .filter(|p| p.owner.id == Some(owner))
            .cloned()
            .collect()
    }

    /// Featured and owned packages matching `query`, in its order
    pub async fn search(&self, query: &PackageQuery) -> Vec<Package> {
        let mut hits: Vec<Package> = {
            let state = self.shared.state.read().await;
            state
                .featured
                .iter()
                .chain(state.owned.iter())
                .filter(|p| query.matches(p))
                .cloned()
                .collect()
        };
        query.sort(&mut hits);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::edit::PaymentMethod;
    use crate::config::ReportPolicy;
    use crate::identity::{Credentials, MemorySlot};
    use crate::random::SeededRandom;
    use crate::config::IdentityConfig;
    use crate::test_utils::fixtures::{fast_catalog_config, test_submission};
    use crate::test_utils::ScriptedRandom;
    use std::time::Duration;

    async fn identity() -> Arc<IdentityStore> {
        Arc::new(
            IdentityStore::open(
                IdentityConfig::default(),
                Arc::new(MemorySlot::new()),
                Arc::new(SeededRandom::new(5)),
            )
            .await,
        )
    }

    async fn catalog_with(config: CatalogConfig, rng: Arc<dyn RandomSource>) -> CatalogStore {
        CatalogStore::new(config, identity().await, rng, CancellationToken::new())
    }

    fn payment(amount: u64) -> PaymentInfo {
        PaymentInfo::new(amount, "Kz AOA", PaymentMethod::Card)
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_creates_pending_package() {
        let catalog = catalog_with(CatalogConfig::default(), Arc::new(SeededRandom::new(1))).await;

        let start = tokio::time::Instant::now();
        let package = catalog.submit_package(test_submission("Test App")).await;
        assert!(start.elapsed() >= Duration::from_secs(2));

        assert_eq!(package.status, PackageStatus::Pending);
        assert_eq!(package.downloads, 0);
        assert_eq!(package.rating, 0.0);
        assert_eq!(package.review_count, 0);
        assert_eq!(package.owner, Owner::anonymous());
        assert!(package.size.ends_with(" MB"));
        assert!(catalog.is_review_scheduled(package.id));
        assert_eq!(catalog.owned_packages().await, vec![package]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_attributes_logged_in_user() {
        let catalog = catalog_with(CatalogConfig::default(), Arc::new(SeededRandom::new(1))).await;
        catalog
            .identity
            .login(Credentials {
                email: "joao@example.com".to_string(),
                password: String::new(),
            })
            .await
            .unwrap();

        let package = catalog.submit_package(test_submission("Test App")).await;
        assert_eq!(package.owner.id, Some(UserId::new(1)));
        assert_eq!(package.owner.name, "João Silva");
        assert_eq!(catalog.packages_by_owner(UserId::new(1)).await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_size_label_and_scan_tag_come_from_rng() {
        // scan draw, then size draw
        let rng = ScriptedRandom::new().with_floats([0.1, 0.5]);
        let catalog = catalog_with(CatalogConfig::default(), Arc::new(rng)).await;

        let package = catalog.submit_package(test_submission("Test App")).await;
        assert_eq!(package.moderation, ModerationTag::Warning);
        assert_eq!(package.size, "55.0 MB");

        let mut no_binary = test_submission("Bare");
        no_binary.binary = None;
        assert_eq!(catalog.submit_package(no_binary).await.size, "0 MB");
    }

    #[tokio::test(start_paused = true)]
    async fn test_review_timer_approves() {
        // scan, size, verdict
        let rng = ScriptedRandom::new().with_floats([0.9, 0.5, 0.9]);
        let catalog = catalog_with(CatalogConfig::default(), Arc::new(rng)).await;
        let id = catalog.submit_package(test_submission("Test App")).await.id;

        tokio::time::sleep(Duration::from_secs(119)).await;
        assert_eq!(catalog.package(id).await.unwrap().status, PackageStatus::Pending);

        tokio::time::sleep(Duration::from_secs(2)).await;
        let package = catalog.package(id).await.unwrap();
        assert_eq!(package.status, PackageStatus::Approved);
        assert!(package.verified);
        assert_eq!(package.moderation, ModerationTag::Safe);
        assert!(package.reviewed_at.is_some());
        assert_eq!(catalog.activity().snapshot().approvals, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_review_timer_rejects() {
        let rng = ScriptedRandom::new().with_floats([0.9, 0.5, 0.1]);
        let catalog = catalog_with(CatalogConfig::default(), Arc::new(rng)).await;
        let id = catalog.submit_package(test_submission("Test App")).await.id;

        tokio::time::sleep(Duration::from_secs(121)).await;
        let package = catalog.package(id).await.unwrap();
        assert_eq!(package.status, PackageStatus::Rejected);
        assert!(!package.verified);
        assert_eq!(package.moderation, ModerationTag::Danger);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_review_ignores_settled_and_missing() {
        let catalog = catalog_with(fast_catalog_config(), Arc::new(SeededRandom::new(2))).await;
        let id = catalog.submit_package(test_submission("Test App")).await.id;

        let status = catalog.resolve_review(id).await.unwrap();
        assert!(!catalog.is_review_scheduled(id));
        assert_eq!(catalog.resolve_review(id).await, None);
        assert_eq!(catalog.package(id).await.unwrap().status, status);

        assert_eq!(catalog.resolve_review(PackageId::new(999)).await, None);
        // Featured items never enter the workflow
        assert_eq!(catalog.resolve_review(PackageId::new(1)).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_review_keeps_package_pending() {
        let catalog = catalog_with(CatalogConfig::default(), Arc::new(SeededRandom::new(2))).await;
        let id = catalog.submit_package(test_submission("Test App")).await.id;

        assert!(catalog.cancel_review(id));
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(catalog.package(id).await.unwrap().status, PackageStatus::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_all_timers() {
        let catalog = catalog_with(CatalogConfig::default(), Arc::new(SeededRandom::new(2))).await;
        let a = catalog.submit_package(test_submission("A")).await.id;
        let b = catalog.submit_package(test_submission("B")).await.id;
        assert_eq!(catalog.pending_reviews(), 2);

        catalog.shutdown();
        tokio::time::sleep(Duration::from_secs(300)).await;

        for id in [a, b] {
            assert_eq!(catalog.package(id).await.unwrap().status, PackageStatus::Pending);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_counts_after_countdown() {
        let catalog = catalog_with(CatalogConfig::default(), Arc::new(SeededRandom::new(3))).await;

        let start = tokio::time::Instant::now();
        let receipt = catalog.download_package(PackageId::new(1)).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(10));

        assert_eq!(receipt.downloads, 15_401);
        assert_eq!(receipt.file_name, "WhatsApp Business-v2.23.20.76.apk");
        assert_eq!(catalog.package(PackageId::new(1)).await.unwrap().downloads, 15_401);
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_cancelled_mid_countdown() {
        let catalog = Arc::new(
            catalog_with(CatalogConfig::default(), Arc::new(SeededRandom::new(3))).await,
        );
        let cancel = CancellationToken::new();

        let task = {
            let catalog = Arc::clone(&catalog);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                catalog
                    .download_package_with_cancel(PackageId::new(2), &cancel)
                    .await
            })
        };

        tokio::time::sleep(Duration::from_secs(4)).await;
        cancel.cancel();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(CatalogError::DownloadCancelled(_))));
        assert_eq!(catalog.package(PackageId::new(2)).await.unwrap().downloads, 25_600);
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_unknown_package() {
        let catalog = catalog_with(fast_catalog_config(), Arc::new(SeededRandom::new(3))).await;
        let err = catalog.download_package(PackageId::new(42)).await.unwrap_err();
        assert!(matches!(err, CatalogError::PackageNotFound(id) if id == PackageId::new(42)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_featured_package() {
        let catalog = catalog_with(fast_catalog_config(), Arc::new(SeededRandom::new(3))).await;

        let summary = catalog
            .rate_package(PackageId::new(3), Stars::new(1).unwrap(), "meh")
            .await
            .unwrap();
        assert_eq!(summary.review_count, 2157);
        // (4.7 * 2156 + 1) / 2157 = 4.698...
        assert_eq!(summary.rating, 4.7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_review_requires_login() {
        let catalog = catalog_with(fast_catalog_config(), Arc::new(SeededRandom::new(3))).await;
        let err = catalog
            .submit_review(PackageId::new(1), Stars::new(5).unwrap(), "great")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotAuthenticated));
    }

    #[tokio::test(start_paused = true)]
    async fn test_review_board() {
        let catalog = catalog_with(fast_catalog_config(), Arc::new(SeededRandom::new(3))).await;
        catalog
            .identity
            .login(Credentials {
                email: "joao@example.com".to_string(),
                password: String::new(),
            })
            .await
            .unwrap();
        let id = catalog.submit_package(test_submission("Test App")).await.id;

        let first = catalog
            .submit_review(id, Stars::new(4).unwrap(), "  solid app  ")
            .await
            .unwrap();
        let second = catalog
            .submit_review(id, Stars::new(2).unwrap(), "crashes")
            .await
            .unwrap();
        assert_eq!(first.comment, "solid app");

        assert_eq!(catalog.vote_review(id, second.id, true).await.unwrap(), 1);
        assert_eq!(catalog.vote_review(id, first.id, false).await.unwrap(), -1);
        catalog.report_review(id, first.id).await.unwrap();

        let helpful = catalog.reviews(id, ReviewOrder::Helpful).await.unwrap();
        assert_eq!(helpful[0].id, second.id);
        assert!(helpful[1].reported);
        assert_eq!(helpful.len(), 2);

        let stats = catalog.review_stats(id).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.average, 3.0);

        let package = catalog.package(id).await.unwrap();
        assert_eq!(package.rating, 3.0);
        assert_eq!(package.review_count, 2);

        let missing = catalog
            .vote_review(id, ReviewId::new(7), true)
            .await
            .unwrap_err();
        assert!(matches!(missing, CatalogError::ReviewNotFound { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_below_threshold_changes_nothing() {
        let rng = ScriptedRandom::new().with_integers([3]);
        let catalog = catalog_with(fast_catalog_config(), Arc::new(rng)).await;
        let id = catalog.submit_package(test_submission("Test App")).await.id;

        let outcome = catalog.report_package(id, "looks fake").await.unwrap();
        assert!(!outcome.flagged);
        assert_eq!(outcome.report_count, 4);
        assert_eq!(outcome.status, PackageStatus::Pending);

        let package = catalog.package(id).await.unwrap();
        assert_eq!(package.spam_reports, None);
        assert_eq!(package.reports.len(), 1);
        assert!(catalog.is_review_scheduled(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_at_threshold_flags_spam() {
        let rng = ScriptedRandom::new().with_integers([4]);
        let catalog = catalog_with(fast_catalog_config(), Arc::new(rng)).await;
        let id = catalog.submit_package(test_submission("Test App")).await.id;

        let outcome = catalog.report_package(id, "malware").await.unwrap();
        assert!(outcome.flagged);
        assert_eq!(outcome.status, PackageStatus::Spam);

        let package = catalog.package(id).await.unwrap();
        assert_eq!(package.spam_reports, Some(5));
        assert!(!catalog.is_review_scheduled(id));

        // Spam is terminal
        assert_eq!(catalog.resolve_review(id).await, None);
        assert_eq!(catalog.package(id).await.unwrap().status, PackageStatus::Spam);
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_never_flags_featured() {
        let rng = ScriptedRandom::new().with_integers([9]);
        let catalog = catalog_with(fast_catalog_config(), Arc::new(rng)).await;

        let outcome = catalog.report_package(PackageId::new(1), "spam").await.unwrap();
        assert!(!outcome.flagged);
        assert_eq!(outcome.status, PackageStatus::Approved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cumulative_reports() {
        let config = CatalogConfig {
            report_policy: ReportPolicy::Cumulative,
            ..fast_catalog_config()
        };
        let catalog = catalog_with(config, Arc::new(SeededRandom::new(4))).await;
        let id = catalog.submit_package(test_submission("Test App")).await.id;

        for expected in 1..=4 {
            let outcome = catalog.report_package(id, "spam").await.unwrap();
            assert_eq!(outcome.report_count, expected);
            assert!(!outcome.flagged);
        }
        let fifth = catalog.report_package(id, "spam").await.unwrap();
        assert!(fifth.flagged);
        assert_eq!(catalog.package(id).await.unwrap().spam_reports, Some(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_payment_checked_first() {
        let catalog = catalog_with(CatalogConfig::default(), Arc::new(SeededRandom::new(6))).await;
        let id = catalog.submit_package(test_submission("Test App")).await.id;

        let major = EditRequest {
            name: Some("Renamed".to_string()),
            major_edit: true,
            ..Default::default()
        };

        let start = tokio::time::Instant::now();
        let err = catalog.edit_package(id, major, payment(5000)).await.unwrap_err();
        assert!(start.elapsed() < Duration::from_millis(1));
        match err {
            CatalogError::InsufficientPayment {
                required,
                offered,
                currency,
            } => {
                assert_eq!(required, 7000);
                assert_eq!(offered, 5000);
                assert_eq!(currency, "Kz AOA");
            }
            other => panic!("unexpected error: {other}"),
        }

        let package = catalog.package(id).await.unwrap();
        assert_eq!(package.name, "Test App");
        assert!(package.edit_history.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_minor_edit_refused_below_basic_price() {
        let catalog = catalog_with(fast_catalog_config(), Arc::new(SeededRandom::new(6))).await;
        let id = catalog.submit_package(test_submission("Test App")).await.id;

        let minor = EditRequest {
            version: Some("1.1".to_string()),
            ..Default::default()
        };
        let err = catalog.edit_package(id, minor, payment(2999)).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InsufficientPayment {
                required: 3000,
                offered: 2999,
                ..
            }
        ));

        let package = catalog.package(id).await.unwrap();
        assert_eq!(package.version, "1.0");
        assert!(package.edit_history.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_applies_and_records_history() {
        let catalog = catalog_with(CatalogConfig::default(), Arc::new(SeededRandom::new(6))).await;
        let id = catalog.submit_package(test_submission("Test App")).await.id;

        let minor = EditRequest {
            version: Some("1.1".to_string()),
            ..Default::default()
        };
        let start = tokio::time::Instant::now();
        let edited = catalog.edit_package(id, minor, payment(3000)).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1500));

        assert_eq!(edited.version, "1.1");
        assert_eq!(edited.status, PackageStatus::Pending);
        assert!(edited.last_edited.is_some());
        assert_eq!(edited.edit_history.len(), 1);
        assert_eq!(edited.edit_history[0].tier, EditTier::Basic);
        assert_eq!(edited.edit_history[0].editor, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_only_targets_owned_packages() {
        let catalog = catalog_with(fast_catalog_config(), Arc::new(SeededRandom::new(6))).await;
        let err = catalog
            .edit_package(PackageId::new(1), EditRequest::default(), payment(3000))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::PackageNotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_featured_resets_items() {
        let catalog = catalog_with(fast_catalog_config(), Arc::new(SeededRandom::new(6))).await;
        catalog.download_package(PackageId::new(1)).await.unwrap();

        assert_eq!(catalog.load_featured().await, 3);
        assert_eq!(catalog.package(PackageId::new(1)).await.unwrap().downloads, 15_400);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_after_drop_is_noop() {
        let catalog = catalog_with(fast_catalog_config(), Arc::new(SeededRandom::new(6))).await;
        let activity = Arc::clone(&catalog.shared.activity);
        catalog.submit_package(test_submission("Test App")).await;
        drop(catalog);

        tokio::time::sleep(Duration::from_secs(600)).await;
        let snapshot = activity.snapshot();
        assert_eq!(snapshot.submissions, 1);
        assert_eq!(snapshot.approvals, 0);
        assert_eq!(snapshot.rejections, 0);
    }
}
