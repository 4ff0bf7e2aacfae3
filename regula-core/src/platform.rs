//! Wiring of the two stores

use std::sync::Arc;
use tracing::info;

use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::identity::{FileSlot, IdentityError, IdentityStore, KeyValueSlot, StatsUpdate, User};
use crate::metrics::init_metrics;
use crate::random::{RandomSource, ThreadRandom};
use crate::shutdown::ShutdownCoordinator;
use crate::types::round_to_tenth;

/// Owns the identity and catalog stores for one session
pub struct Platform {
    config: Config,
    identity: Arc<IdentityStore>,
    catalog: Arc<CatalogStore>,
    shutdown: Arc<ShutdownCoordinator>,
}

impl Platform {
    /// Build both stores; the identity store restores whoever `slot` holds
    pub async fn new(config: Config, rng: Arc<dyn RandomSource>, slot: Arc<dyn KeyValueSlot>) -> Self {
        if config.metrics.enabled {
            init_metrics();
        }

        let shutdown = Arc::new(ShutdownCoordinator::new());
        let identity = Arc::new(
            IdentityStore::open(config.identity.clone(), slot, Arc::clone(&rng)).await,
        );
        let catalog = Arc::new(CatalogStore::new(
            config.catalog.clone(),
            Arc::clone(&identity),
            rng,
            shutdown.child_token(),
        ));

        Self {
            config,
            identity,
            catalog,
            shutdown,
        }
    }

    /// Production wiring: thread randomness and a file slot in the data dir
    pub async fn from_config(config: &Config) -> Self {
        let slot = Arc::new(FileSlot::new(&config.identity.data_dir));
        info!("Using data directory {}", config.identity.data_dir.display());
        Self::new(config.clone(), Arc::new(ThreadRandom), slot).await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn identity(&self) -> &Arc<IdentityStore> {
        &self.identity
    }

    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    pub fn shutdown_coordinator(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Recompute the logged-in user's upload, download and rating stats
    /// from the packages they own
    pub async fn sync_user_stats(&self) -> Result<Option<User>, IdentityError> {
        let Some(user) = self.identity.current_user().await else {
            return Ok(None);
        };

        let owned = self.catalog.packages_by_owner(user.id).await;
        let rated: Vec<f64> = owned
            .iter()
            .filter(|p| p.review_count > 0)
            .map(|p| p.rating)
            .collect();
        let average_rating = if rated.is_empty() {
            0.0
        } else {
            round_to_tenth(rated.iter().sum::<f64>() / rated.len() as f64)
        };

        self.identity
            .update_user_stats(StatsUpdate {
                uploaded_apks: Some(owned.len() as u64),
                total_downloads: Some(owned.iter().map(|p| p.downloads).sum()),
                average_rating: Some(average_rating),
                invites_sent: None,
            })
            .await
    }

    /// Stop every scheduled review
    pub async fn shutdown(&self) {
        self.catalog.shutdown();
        self.shutdown.shutdown().await;
    }
}
