/*
    types.rs - Common types shared by the identity and catalog stores

    Defines:
    - Timestamps
    - IDs for users, packages and reviews
    - The id sequence used to mint them
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Wall-clock timestamp, serialized as RFC 3339
pub type Timestamp = DateTime<Utc>;

/// Current wall-clock time
pub fn now() -> Timestamp {
    Utc::now()
}

/// Milliseconds since the Unix epoch for the current wall-clock time
pub fn now_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Create an id from its raw value
            pub fn new(value: u64) -> Self {
                $name(value)
            }

            /// Raw value of the id
            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                $name(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a registered user
    UserId
);

numeric_id!(
    /// Identifier of a package, owned or featured
    PackageId
);

numeric_id!(
    /// Identifier of a review left on a package
    ReviewId
);

/// Monotonic id allocator
///
/// Starts at the current time in milliseconds so ids look like creation
/// timestamps, and never hands out the same value twice even when several
/// records are created within one millisecond.
#[derive(Debug)]
pub struct IdSequence {
    next: AtomicU64,
}

impl IdSequence {
    /// Sequence starting at the current time in milliseconds
    pub fn from_clock() -> Self {
        Self::starting_at(now_millis())
    }

    /// Sequence starting at an explicit value
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Allocate the next value
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::from_clock()
    }
}

/// Round to one decimal place, half away from zero
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
