//! Catalog search

use std::cmp::Reverse;

use super::package::{Category, Package, PackageStatus};

/// Result ordering of a search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    MostDownloaded,
    TopRated,
}

/// Filters applied by [`CatalogStore::search`](super::CatalogStore::search)
#[derive(Debug, Clone, Default)]
pub struct PackageQuery {
    /// Case-insensitive match on name, description or package name
    pub text: Option<String>,
    pub category: Option<Category>,
    pub status: Option<PackageStatus>,
    pub order: SortOrder,
}

impl PackageQuery {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn status(mut self, status: PackageStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn matches(&self, package: &Package) -> bool {
        if self.category.is_some_and(|c| c != package.category) {
            return false;
        }
        if self.status.is_some_and(|s| s != package.status) {
            return false;
        }
        match &self.text {
            Some(text) => {
                let needle = text.trim().to_lowercase();
                [&package.name, &package.description, &package.package_name]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }

    pub(crate) fn sort(&self, packages: &mut [Package]) {
        match self.order {
            SortOrder::Newest => packages.sort_by_key(|p| Reverse(p.uploaded_at)),
            SortOrder::MostDownloaded => packages.sort_by_key(|p| Reverse(p.downloads)),
            SortOrder::TopRated => packages.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::featured::featured_seed;

    fn names(packages: &[Package]) -> Vec<&str> {
        packages.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_text_filter_is_case_insensitive() {
        let query = PackageQuery::default().text("SPOTIFY");
        let hits: Vec<_> = featured_seed().into_iter().filter(|p| query.matches(p)).collect();
        assert_eq!(names(&hits), vec!["Spotify Music"]);

        let by_package_name = PackageQuery::default().text("com.instagram");
        assert_eq!(
            featured_seed().iter().filter(|p| by_package_name.matches(p)).count(),
            1
        );
    }

    #[test]
    fn test_category_and_status_filters() {
        let social = PackageQuery::default().category(Category::Social);
        assert_eq!(featured_seed().iter().filter(|p| social.matches(p)).count(), 1);

        let pending = PackageQuery::default().status(PackageStatus::Pending);
        assert_eq!(featured_seed().iter().filter(|p| pending.matches(p)).count(), 0);
    }

    #[test]
    fn test_orders() {
        let mut packages = featured_seed();

        PackageQuery::default().sort(&mut packages);
        assert_eq!(names(&packages), vec!["Instagram", "WhatsApp Business", "Spotify Music"]);

        PackageQuery::default()
            .order(SortOrder::MostDownloaded)
            .sort(&mut packages);
        assert_eq!(names(&packages), vec!["Instagram", "Spotify Music", "WhatsApp Business"]);

        PackageQuery::default().order(SortOrder::TopRated).sort(&mut packages);
        assert_eq!(names(&packages), vec!["WhatsApp Business", "Spotify Music", "Instagram"]);
    }
}
