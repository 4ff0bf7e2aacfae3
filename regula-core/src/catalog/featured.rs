//! Promotional items shown on the landing page

use super::package::{Category, ModerationTag, Origin, Owner, Package, PackageStatus};
use crate::types::{PackageId, Timestamp};

struct Seed {
    id: u64,
    name: &'static str,
    version: &'static str,
    package_name: &'static str,
    description: &'static str,
    category: Category,
    icon: &'static str,
    size: &'static str,
    author: &'static str,
    downloads: u64,
    rating: f64,
    reviews: u64,
    /// Upload date, seconds since the epoch at midnight UTC
    uploaded: i64,
}

const SEEDS: [Seed; 3] = [
    Seed {
        id: 1,
        name: "WhatsApp Business",
        version: "2.23.20.76",
        package_name: "com.whatsapp.w4b",
        description: "Official WhatsApp application for businesses",
        category: Category::Communication,
        icon: "📱",
        size: "45.2 MB",
        author: "WhatsApp Inc.",
        downloads: 15_400,
        rating: 4.8,
        reviews: 1247,
        uploaded: 1_736_467_200, // 2025-01-10
    },
    Seed {
        id: 2,
        name: "Instagram",
        version: "312.0.0.37.103",
        package_name: "com.instagram.android",
        description: "Share photos and videos with your friends",
        category: Category::Social,
        icon: "📸",
        size: "78.3 MB",
        author: "Meta Platforms",
        downloads: 25_600,
        rating: 4.5,
        reviews: 3421,
        uploaded: 1_736_640_000, // 2025-01-12
    },
    Seed {
        id: 3,
        name: "Spotify Music",
        version: "8.8.96.488",
        package_name: "com.spotify.music",
        description: "Listen to millions of songs and podcasts",
        category: Category::Music,
        icon: "🎵",
        size: "32.1 MB",
        author: "Spotify AB",
        downloads: 18_900,
        rating: 4.7,
        reviews: 2156,
        uploaded: 1_736_294_400, // 2025-01-08
    },
];

/// Fresh copies of the featured items
pub fn featured_seed() -> Vec<Package> {
    SEEDS.iter().map(Seed::to_package).collect()
}

impl Seed {
    fn to_package(&self) -> Package {
        let uploaded_at = Timestamp::from_timestamp(self.uploaded, 0).unwrap_or_default();
        Package {
            id: PackageId::new(self.id),
            origin: Origin::Featured,
            name: self.name.to_string(),
            version: self.version.to_string(),
            package_name: self.package_name.to_string(),
            description: self.description.to_string(),
            category: self.category,
            binary: None,
            icon: Some(self.icon.to_string()),
            screenshots: Vec::new(),
            size: self.size.to_string(),
            owner: Owner {
                id: None,
                name: self.author.to_string(),
            },
            uploaded_at,
            status: PackageStatus::Approved,
            verified: true,
            moderation: ModerationTag::Safe,
            downloads: self.downloads,
            rating: self.rating,
            review_count: self.reviews,
            rating_sum: self.rating * self.reviews as f64,
            reviews: Vec::new(),
            reports: Vec::new(),
            spam_reports: None,
            reviewed_at: Some(uploaded_at),
            last_edited: None,
            edit_history: Vec::new(),
        }
    }
}
