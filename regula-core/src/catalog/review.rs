//! Written reviews attached to a package

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

use super::CatalogError;
use crate::types::{round_to_tenth, ReviewId, Timestamp, UserId};

/// A star rating between 1 and 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stars(u8);

impl Stars {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, CatalogError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CatalogError::InvalidRating(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Stars {
    type Error = CatalogError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Stars::new(value)
    }
}

impl From<Stars> for u8 {
    fn from(stars: Stars) -> u8 {
        stars.0
    }
}

impl fmt::Display for Stars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub author_id: UserId,
    pub author_name: String,
    pub stars: Stars,
    pub comment: String,
    pub created_at: Timestamp,
    /// Helpful votes minus unhelpful votes
    pub helpful: i64,
    pub reported: bool,
    pub verified: bool,
}

/// Display order of a review list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReviewOrder {
    #[default]
    Recent,
    Rating,
    Helpful,
}

/// Sorted copy of `reviews`
pub fn sort_reviews(reviews: &[Review], order: ReviewOrder) -> Vec<Review> {
    let mut sorted = reviews.to_vec();
    match order {
        ReviewOrder::Recent => sorted.sort_by_key(|r| Reverse(r.created_at)),
        ReviewOrder::Rating => sorted.sort_by_key(|r| Reverse(r.stars)),
        ReviewOrder::Helpful => sorted.sort_by_key(|r| Reverse(r.helpful)),
    }
    sorted
}

/// Summary of the written reviews of one package
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewStats {
    pub total: usize,
    /// Mean stars, one decimal; zero without reviews
    pub average: f64,
    /// Review count per star value, index 0 holds one-star reviews
    pub distribution: [usize; 5],
}

impl ReviewStats {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let mut distribution = [0usize; 5];
        let mut sum = 0u64;
        for review in reviews {
            distribution[usize::from(review.stars.get() - 1)] += 1;
            sum += u64::from(review.stars.get());
        }

        let average = if reviews.is_empty() {
            0.0
        } else {
            round_to_tenth(sum as f64 / reviews.len() as f64)
        };

        Self {
            total: reviews.len(),
            average,
            distribution,
        }
    }

    /// Share of reviews with `stars`, in percent
    pub fn share(&self, stars: Stars) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.distribution[usize::from(stars.get() - 1)] as f64 * 100.0 / self.total as f64
    }
}
