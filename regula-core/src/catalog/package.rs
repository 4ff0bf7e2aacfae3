//! Package records and their lifecycle

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::edit::EditEntry;
use super::moderation::ModerationReport;
use super::review::{Review, Stars};
use crate::types::{round_to_tenth, PackageId, ReviewId, Timestamp, UserId};
use crate::validation::{FieldError, ValidationErrors};

/// Lifecycle status of a package
///
/// ```text
/// pending --(review, approved)--> approved --(reports)--> spam
/// pending --(review, rejected)--> rejected --(reports)--> spam
/// pending --(reports)--> spam
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageStatus {
    Pending,
    Approved,
    Rejected,
    Spam,
}

impl PackageStatus {
    /// Whether the workflow allows moving from `self` to `next`
    pub fn can_transition_to(self, next: PackageStatus) -> bool {
        use PackageStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Pending | Approved | Rejected, Spam)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageStatus::Pending => "pending",
            PackageStatus::Approved => "approved",
            PackageStatus::Rejected => "rejected",
            PackageStatus::Spam => "spam",
        }
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification attached by the automated scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationTag {
    Safe,
    Warning,
    Danger,
}

impl fmt::Display for ModerationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModerationTag::Safe => "safe",
            ModerationTag::Warning => "warning",
            ModerationTag::Danger => "danger",
        })
    }
}

/// Which collection a package lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Submitted by a user and subject to the review workflow
    Submitted,
    /// Pre-seeded promotional item
    Featured,
}

/// Store category of a package
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Communication,
    Entertainment,
    Tools,
    Games,
    Music,
    Productivity,
    Social,
    Photography,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Communication,
        Category::Entertainment,
        Category::Tools,
        Category::Games,
        Category::Music,
        Category::Productivity,
        Category::Social,
        Category::Photography,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Communication => "communication",
            Category::Entertainment => "entertainment",
            Category::Tools => "tools",
            Category::Games => "games",
            Category::Music => "music",
            Category::Productivity => "productivity",
            Category::Social => "social",
            Category::Photography => "photography",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Who a package belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: Option<UserId>,
    pub name: String,
}

impl Owner {
    pub const ANONYMOUS: &'static str = "Anonymous";

    pub fn anonymous() -> Self {
        Self {
            id: None,
            name: Self::ANONYMOUS.to_string(),
        }
    }
}

/// A package, owned or featured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: PackageId,
    pub origin: Origin,
    pub name: String,
    pub version: String,
    pub package_name: String,
    pub description: String,
    pub category: Category,
    /// File name of the uploaded binary
    pub binary: Option<String>,
    pub icon: Option<String>,
    pub screenshots: Vec<String>,
    /// Display size, e.g. `45.2 MB`
    pub size: String,
    pub owner: Owner,
    pub uploaded_at: Timestamp,
    pub status: PackageStatus,
    pub verified: bool,
    pub moderation: ModerationTag,
    pub downloads: u64,
    /// Mean rating rounded to one decimal
    pub rating: f64,
    /// Number of ratings behind `rating`
    pub review_count: u64,
    /// Sum of every rating, kept unrounded so the mean never drifts
    pub rating_sum: f64,
    pub reviews: Vec<Review>,
    pub reports: Vec<ModerationReport>,
    /// Report count recorded when the package was flagged as spam
    pub spam_reports: Option<u32>,
    pub reviewed_at: Option<Timestamp>,
    pub last_edited: Option<Timestamp>,
    pub edit_history: Vec<EditEntry>,
}

impl Package {
    /// Fold one rating into the running mean
    ///
    /// `new = (old * count + stars) / (count + 1)`, rounded to one decimal.
    pub fn apply_rating(&mut self, stars: Stars) {
        self.rating_sum += f64::from(stars.get());
        self.review_count += 1;
        self.rating = round_to_tenth(self.rating_sum / self.review_count as f64);
    }

    /// File name handed out on download
    pub fn file_name(&self) -> String {
        format!("{}-v{}.apk", self.name, self.version)
    }

    pub fn is_featured(&self) -> bool {
        self.origin == Origin::Featured
    }

    pub(crate) fn review_mut(&mut self, id: ReviewId) -> Option<&mut Review> {
        self.reviews.iter_mut().find(|r| r.id == id)
    }
}

/// Upload form contents
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub name: String,
    pub version: String,
    pub package_name: String,
    pub description: String,
    pub category: Category,
    pub binary: Option<String>,
    pub icon: Option<String>,
    pub screenshots: Vec<String>,
}

/// Screenshots an upload must carry
pub const MIN_SCREENSHOTS: usize = 3;

impl Submission {
    /// Check the upload form before it reaches the catalog store
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("name", &self.name),
            ("version", &self.version),
            ("package_name", &self.package_name),
            ("description", &self.description),
        ] {
            if value.trim().is_empty() {
                errors.push(FieldError::new(field, format!("{} is required", field)));
            }
        }

        match &self.binary {
            None => errors.push(FieldError::new("binary", "an APK file is required")),
            Some(file) if !file.to_lowercase().ends_with(".apk") => {
                errors.push(FieldError::new("binary", "the file must be an .apk"))
            }
            Some(_) => {}
        }

        if self.icon.is_none() {
            errors.push(FieldError::new("icon", "an icon is required"));
        }

        if self.screenshots.len() < MIN_SCREENSHOTS {
            errors.push(FieldError::new(
                "screenshots",
                format!("at least {} screenshots are required", MIN_SCREENSHOTS),
            ));
        }

        ValidationErrors::into_result(errors)
    }
}
