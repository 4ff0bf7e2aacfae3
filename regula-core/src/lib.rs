//! Regula core
//!
//! State layer for a platform that shares, reviews and sells edits of
//! Android application packages. Two stores carry all of the business logic:
//!
//! - [`identity::IdentityStore`]: the single logged-in user, persisted in a
//!   key-value slot
//! - [`catalog::CatalogStore`]: submitted and featured packages, the timed
//!   review workflow, downloads, ratings, reviews, reports and paid edits
//!
//! [`platform::Platform`] builds both once and hands them out by `Arc`.

pub mod catalog;
pub mod config;
pub mod identity;
pub mod logging;
pub mod metrics;
pub mod platform;
pub mod random;
pub mod shutdown;
pub mod test_utils;
pub mod types;
pub mod validation;

pub use catalog::{CatalogError, CatalogStore, Package, PackageId, PackageStatus};
pub use config::Config;
pub use identity::{IdentityError, IdentityStore, User, UserId};
pub use logging::{init_logging, LogLevel};
pub use platform::Platform;
pub use random::{RandomSource, SeededRandom, ThreadRandom};
