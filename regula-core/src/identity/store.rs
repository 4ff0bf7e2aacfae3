//! The identity store

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::slot::{KeyValueSlot, USER_SLOT_KEY};
use super::user::{
    demo_account, generate_reset_code, generate_token, Credentials, RegisterRequest, ResetNotice,
    StatsUpdate, User, UserStats,
};
use super::IdentityError;
use crate::config::IdentityConfig;
use crate::metrics::{self, record_counter};
use crate::random::RandomSource;
use crate::types::{self, IdSequence, UserId};

/// Holds the single logged-in user and keeps the slot in sync with it
pub struct IdentityStore {
    user: RwLock<Option<User>>,
    slot: Arc<dyn KeyValueSlot>,
    rng: Arc<dyn RandomSource>,
    config: IdentityConfig,
    ids: IdSequence,
}

impl IdentityStore {
    /// Open the store, restoring whoever is persisted in `slot`
    ///
    /// A missing, unreadable or corrupt record means nobody is logged in.
    pub async fn open(
        config: IdentityConfig,
        slot: Arc<dyn KeyValueSlot>,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        let restored = Self::restore(slot.as_ref()).await;
        if let Some(user) = &restored {
            info!(user_id = %user.id, "Restored persisted user {}", user.name);
        }

        Self {
            user: RwLock::new(restored),
            slot,
            rng,
            config,
            ids: IdSequence::from_clock(),
        }
    }

    async fn restore(slot: &dyn KeyValueSlot) -> Option<User> {
        let raw = match slot.load(USER_SLOT_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Ignoring unreadable identity slot: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Ignoring corrupt identity record: {}", e);
                None
            }
        }
    }

    async fn persist(&self, user: &User) -> Result<(), IdentityError> {
        let encoded = serde_json::to_string(user)?;
        self.slot.store(USER_SLOT_KEY, &encoded).await?;
        Ok(())
    }

    /// Create an account with zeroed stats and log it in
    pub async fn register(&self, request: RegisterRequest) -> Result<User, IdentityError> {
        tokio::time::sleep(self.config.register_latency).await;

        let user = User {
            id: UserId::new(self.ids.next()),
            name: request.name,
            email: request.email,
            uuid: generate_token(self.rng.as_ref()),
            created_at: types::now(),
            stats: UserStats::default(),
            verified: false,
        };

        let mut current = self.user.write().await;
        self.persist(&user).await?;
        *current = Some(user.clone());
        drop(current);

        record_counter(metrics::IDENTITY_REGISTRATIONS, 1);
        info!(user_id = %user.id, "Token sent to {}: {}", user.email, user.uuid);

        Ok(user)
    }

    /// Log in; the password is not checked and every login resolves to the
    /// demo account under the given email
    pub async fn login(&self, credentials: Credentials) -> Result<User, IdentityError> {
        tokio::time::sleep(self.config.login_latency).await;

        let user = demo_account(&credentials.email);

        let mut current = self.user.write().await;
        self.persist(&user).await?;
        *current = Some(user.clone());
        drop(current);

        record_counter(metrics::IDENTITY_LOGINS, 1);
        info!(user_id = %user.id, "Logged in as {}", user.email);

        Ok(user)
    }

    /// Forget the current user, in memory and in the slot
    pub async fn logout(&self) -> Result<(), IdentityError> {
        let mut current = self.user.write().await;
        self.slot.remove(USER_SLOT_KEY).await?;
        let previous = current.take();
        drop(current);

        if let Some(user) = previous {
            info!(user_id = %user.id, "Logged out");
        }
        Ok(())
    }

    /// Mail a reset code; there is no step that verifies it
    pub async fn forgot_password(&self, email: &str) -> ResetNotice {
        tokio::time::sleep(self.config.reset_latency).await;

        let code = generate_reset_code(self.rng.as_ref());
        info!("Password reset code sent to {}: {}", email, code);

        ResetNotice {
            email: email.to_string(),
            message: "A reset code was sent to your email".to_string(),
        }
    }

    /// Merge `update` into the current user's stats and persist
    ///
    /// Returns `None` when nobody is logged in. The user lock is held until
    /// the slot write finishes, so a concurrent logout cannot be undone.
    pub async fn update_user_stats(
        &self,
        update: StatsUpdate,
    ) -> Result<Option<User>, IdentityError> {
        let mut guard = self.user.write().await;
        let Some(user) = guard.as_mut() else {
            debug!("Stats update ignored, nobody is logged in");
            return Ok(None);
        };

        let mut updated = user.clone();
        updated.stats.merge(&update);
        self.persist(&updated).await?;

        *user = updated.clone();
        Ok(Some(updated))
    }

    /// Snapshot of the logged-in user
    pub async fn current_user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.user.read().await.is_some()
    }
}
