//! Slug-based linkage between the restaurant and review tables.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::models::{RestaurantRecord, ReviewRecord};

/// Longest fallback key taken from a URL without a `/place/` segment.
pub const MAX_FALLBACK_SLUG_CHARS: usize = 80;

static PLACE_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/place/([^/@]+)").expect("place segment pattern should compile")
});

/// Whether the two tables could be joined at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Linkage {
    /// Both tables expose a URL column.
    Linked,
    /// At least one table has no URL column; enrichment runs in degraded mode.
    Unlinked,
}

/// Derives the join key from a Google Maps URL.
///
/// Short and canonical links both carry `/place/<Name+With+Pluses>/`; that
/// segment, lowercased, is the slug. URLs without it fall back to the first
/// 80 characters of the lowercased URL.
pub fn url_slug(url: &str) -> String {
    match PLACE_SEGMENT.captures(url).and_then(|caps| caps.get(1)) {
        Some(segment) => segment.as_str().to_lowercase(),
        None => url
            .to_lowercase()
            .chars()
            .take(MAX_FALLBACK_SLUG_CHARS)
            .collect(),
    }
}

/// Attaches slugs from whichever tables expose a URL column.
///
/// Only when both do are the tables linked; reviews are still slugged on
/// their own so name-based matching keeps working. Records with an empty URL
/// cell stay unslugged and simply match nothing.
pub fn link(
    restaurants: &mut [RestaurantRecord],
    reviews: &mut [ReviewRecord],
    restaurant_urls: bool,
    review_urls: bool,
) -> Linkage {
    if review_urls {
        for review in reviews.iter_mut() {
            review.slug = review.url.as_deref().map(url_slug);
        }
    }
    if !(restaurant_urls && review_urls) {
        return Linkage::Unlinked;
    }

    for restaurant in restaurants.iter_mut() {
        restaurant.slug = restaurant.url.as_deref().map(url_slug);
    }
    Linkage::Linked
}

/// Reviews grouped by slug, built once per dataset load.
#[derive(Debug, Clone, Default)]
pub struct ReviewIndex {
    groups: HashMap<String, Vec<usize>>,
}

impl ReviewIndex {
    pub fn build(reviews: &[ReviewRecord]) -> Self {
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, review) in reviews.iter().enumerate() {
            if let Some(slug) = &review.slug {
                groups.entry(slug.clone()).or_default().push(position);
            }
        }
        Self { groups }
    }

    /// Reviews sharing `slug`, in table order.
    pub fn matched<'a>(&self, slug: &str, reviews: &'a [ReviewRecord]) -> Vec<&'a ReviewRecord> {
        self.groups
            .get(slug)
            .map(|positions| positions.iter().filter_map(|&i| reviews.get(i)).collect())
            .unwrap_or_default()
    }

    /// Reviews whose slug contains `fragment`, in table order.
    pub fn matched_containing<'a>(
        &self,
        fragment: &str,
        reviews: &'a [ReviewRecord],
    ) -> Vec<&'a ReviewRecord> {
        let mut positions: Vec<usize> = self
            .groups
            .iter()
            .filter(|(slug, _)| slug.contains(fragment))
            .flat_map(|(_, positions)| positions.iter().copied())
            .collect();
        positions.sort_unstable();
        positions.iter().filter_map(|&i| reviews.get(i)).collect()
    }

    pub fn slug_count(&self) -> usize {
        self.groups.len()
    }
}
