//! Identity store
//!
//! Holds the single logged-in [`User`] and mirrors it into a
//! [`KeyValueSlot`] under [`USER_SLOT_KEY`].

mod slot;
mod store;
mod user;

pub use slot::{FileSlot, KeyValueSlot, MemorySlot, USER_SLOT_KEY};
pub use store::IdentityStore;
pub use user::{
    generate_reset_code, generate_token, Credentials, RegisterRequest, RegistrationForm,
    ResetNotice, StatsUpdate, User, UserStats, MIN_PASSWORD_LEN, RESET_CODE_LEN,
};

pub use crate::types::UserId;

use thiserror::Error;

/// Identity store errors
///
/// Every identity operation succeeds as far as the business rules go; only
/// the persistence slot can fail.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity slot I/O failed: {0}")]
    Slot(#[from] std::io::Error),

    #[error("Failed to encode user record: {0}")]
    Encode(#[from] serde_json::Error),
}
