//! User profile and statistics

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;
use crate::types::{Timestamp, UserId};
use crate::validation::{FieldError, ValidationErrors};

/// Aggregate statistics shown on a user's dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub uploaded_apks: u64,
    pub total_downloads: u64,
    pub invites_sent: u64,
    pub average_rating: f64,
}

/// Partial update of [`UserStats`]; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsUpdate {
    pub uploaded_apks: Option<u64>,
    pub total_downloads: Option<u64>,
    pub invites_sent: Option<u64>,
    pub average_rating: Option<f64>,
}

impl UserStats {
    /// Shallow merge of the provided fields
    pub fn merge(&mut self, update: &StatsUpdate) {
        if let Some(v) = update.uploaded_apks {
            self.uploaded_apks = v;
        }
        if let Some(v) = update.total_downloads {
            self.total_downloads = v;
        }
        if let Some(v) = update.invites_sent {
            self.invites_sent = v;
        }
        if let Some(v) = update.average_rating {
            self.average_rating = v;
        }
    }
}

/// The logged-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Token mailed to the user at registration
    pub uuid: String,
    pub created_at: Timestamp,
    pub stats: UserStats,
    /// Whether reviews by this user carry the verified badge
    #[serde(default)]
    pub verified: bool,
}

/// Input of a registration
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Input of a login
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Generic answer to a password reset request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetNotice {
    pub email: String,
    pub message: String,
}

/// Registration form as typed by the user
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub accept_terms: bool,
}

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

impl RegistrationForm {
    /// Check the form before it reaches the identity store
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if self.full_name.trim().is_empty() {
            errors.push(FieldError::new("full_name", "full name is required"));
        }
        if self.email.trim().is_empty() {
            errors.push(FieldError::new("email", "email is required"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                "password",
                format!("password must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        if self.password != self.confirm_password {
            errors.push(FieldError::new("confirm_password", "passwords do not match"));
        }
        if !self.accept_terms {
            errors.push(FieldError::new("accept_terms", "terms of service must be accepted"));
        }

        ValidationErrors::into_result(errors)
    }

    /// Request for [`IdentityStore::register`](super::IdentityStore::register)
    pub fn into_request(self) -> RegisterRequest {
        RegisterRequest {
            name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
        }
    }
}

/// Random version-4 style token, e.g. `3f2c9a1e-7b4d-4e0a-9c1f-0d2e4b6a8c10`
pub fn generate_token(rng: &dyn RandomSource) -> String {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .hyphenated()
        .to_string()
}

const RESET_CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of a password reset code
pub const RESET_CODE_LEN: usize = 6;

/// Random uppercase base-36 reset code
pub fn generate_reset_code(rng: &dyn RandomSource) -> String {
    (0..RESET_CODE_LEN)
        .map(|_| {
            let idx = rng.next_below(RESET_CODE_ALPHABET.len() as u32) as usize;
            RESET_CODE_ALPHABET[idx] as char
        })
        .collect()
}

/// Account every login resolves to
pub(crate) fn demo_account(email: &str) -> User {
    User {
        id: UserId::new(1),
        name: "João Silva".to_string(),
        email: email.to_string(),
        uuid: "abc123-def456-gh1789".to_string(),
        // 2025-01-15T10:00:00Z
        created_at: Timestamp::from_timestamp(1_736_935_200, 0).unwrap_or_default(),
        stats: UserStats {
            uploaded_apks: 12,
            total_downloads: 3456,
            invites_sent: 8,
            average_rating: 4.6,
        },
        verified: false,
    }
}
