//! Package catalog
//!
//! Submitted packages go through a timed review, collect downloads,
//! ratings, written reviews and spam reports, and can be edited for a fee.
//! Featured items are pre-seeded, always approved, and share every read
//! path with submitted packages.

mod edit;
mod featured;
mod moderation;
mod package;
mod query;
mod review;
mod scheduler;
mod store;

use thiserror::Error;

pub use edit::{EditEntry, EditRequest, EditTier, PaymentInfo, PaymentMethod};
pub use featured::featured_seed;
pub use moderation::{ModerationReport, ReportOutcome};
pub use package::{
    Category, ModerationTag, Origin, Owner, Package, PackageStatus, Submission, MIN_SCREENSHOTS,
};
pub use query::{PackageQuery, SortOrder};
pub use review::{Review, ReviewOrder, ReviewStats, Stars};
pub use store::{CatalogStore, DownloadReceipt, RatingSummary};

pub use crate::types::{PackageId, ReviewId};

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Package not found: {0}")]
    PackageNotFound(PackageId),

    #[error("Review {review_id} not found on package {package_id}")]
    ReviewNotFound {
        package_id: PackageId,
        review_id: ReviewId,
    },

    #[error("Payment of {required} {currency} required, got {offered}")]
    InsufficientPayment {
        required: u64,
        offered: u64,
        currency: String,
    },

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("You must be logged in")]
    NotAuthenticated,

    #[error("Download of package {0} was cancelled")]
    DownloadCancelled(PackageId),
}
