//! Factories for common test objects

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{Category, ModerationTag, Origin, Owner, Package, PackageStatus, Submission};
use crate::config::{CatalogConfig, Config, IdentityConfig};
use crate::identity::{Credentials, MemorySlot, RegisterRequest};
use crate::platform::Platform;
use crate::random::RandomSource;
use crate::types::{self, PackageId};

/// Complete upload form for `name` v1.0
pub fn test_submission(name: &str) -> Submission {
    let slug = name.to_lowercase().replace(' ', "");
    Submission {
        name: name.to_string(),
        version: "1.0".to_string(),
        package_name: format!("com.example.{}", slug),
        description: format!("{} for tests", name),
        category: Category::Tools,
        binary: Some(format!("{}.apk", slug)),
        icon: Some("icon.png".to_string()),
        screenshots: vec![
            "home.png".to_string(),
            "detail.png".to_string(),
            "settings.png".to_string(),
        ],
    }
}

/// Fresh pending package without any ratings
pub fn test_package(id: PackageId) -> Package {
    Package {
        id,
        origin: Origin::Submitted,
        name: "Fixture".to_string(),
        version: "0.1".to_string(),
        package_name: "com.example.fixture".to_string(),
        description: "Fixture package".to_string(),
        category: Category::Other,
        binary: Some("fixture.apk".to_string()),
        icon: Some("icon.png".to_string()),
        screenshots: Vec::new(),
        size: "12.0 MB".to_string(),
        owner: Owner::anonymous(),
        uploaded_at: types::now(),
        status: PackageStatus::Pending,
        verified: false,
        moderation: ModerationTag::Safe,
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
    }
}

pub fn register_request(name: &str) -> RegisterRequest {
    let local = name.to_lowercase().replace(' ', ".");
    RegisterRequest {
        name: name.to_string(),
        email: format!("{}@example.com", local),
        password: "secret1".to_string(),
    }
}

pub fn demo_credentials() -> Credentials {
    Credentials {
        email: "joao@example.com".to_string(),
        password: "anything".to_string(),
    }
}

/// Catalog settings without simulated latency
///
/// The review delay and download countdown keep their defaults.
pub fn fast_catalog_config() -> CatalogConfig {
    CatalogConfig {
        featured_latency: Duration::ZERO,
        submit_latency: Duration::ZERO,
        rate_latency: Duration::ZERO,
        report_latency: Duration::ZERO,
        edit_latency: Duration::ZERO,
        ..CatalogConfig::default()
    }
}

/// Full configuration without simulated latency, metrics off
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.identity = IdentityConfig {
        register_latency: Duration::ZERO,
        login_latency: Duration::ZERO,
        reset_latency: Duration::ZERO,
        ..IdentityConfig::default()
    };
    config.catalog = fast_catalog_config();
    config.metrics.enabled = false;
    config
}

/// Platform backed by a memory slot
pub async fn test_platform(config: Config, rng: Arc<dyn RandomSource>) -> Platform {
    Platform::new(config, rng, Arc::new(MemorySlot::new())).await
}
