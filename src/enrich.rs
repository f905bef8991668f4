//! Per-restaurant signals derived from the matched review subset.

use chrono::{Duration, NaiveDateTime};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::join::{Linkage, ReviewIndex};
use crate::models::{
    EnrichedRestaurant, Provenance, ResponseStatus, RestaurantRecord, ReviewRecord, Signals,
    SyntheticReason,
};

/// Seed for the response-rate spread used when the tables cannot be joined.
pub const SYNTHETIC_RESPONSE_SEED: u64 = 42;

/// Recency assumed for restaurants without matched reviews.
pub const NEUTRAL_RECENCY: f64 = 0.5;

const RECENT_WINDOW_DAYS: i64 = 90;
const EXTENDED_WINDOW_DAYS: i64 = 180;
const RECENT_WEIGHT: f64 = 0.7;
const EXTENDED_WEIGHT: f64 = 0.3;

/// Maps a 1–5 star rating linearly onto 0–100.
pub fn sentiment_from_rating(rating: f64) -> f64 {
    (((rating - 1.0) / 4.0) * 100.0).clamp(0.0, 100.0)
}

pub fn response_status(reviews: &[&ReviewRecord]) -> ResponseStatus {
    let responded = reviews.iter().filter(|review| review.is_responded()).count();
    ResponseStatus::from_counts(responded, reviews.len())
}

pub fn mean_rating(reviews: &[&ReviewRecord]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: f64 = reviews.iter().map(|review| review.rating).sum();
    Some(total / reviews.len() as f64)
}

/// Weighted share of reviews newer than 90 and 180 days, capped at 1.0.
///
/// A review inside 90 days counts in both windows, so a fully fresh
/// restaurant reaches exactly 1.0.
pub fn recency_score(reviews: &[&ReviewRecord], now: NaiveDateTime) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let recent_cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    let extended_cutoff = now - Duration::days(EXTENDED_WINDOW_DAYS);

    let recent = reviews
        .iter()
        .filter(|review| review.review_date > recent_cutoff)
        .count();
    let extended = reviews
        .iter()
        .filter(|review| review.review_date > extended_cutoff)
        .count();

    let weighted = recent as f64 * RECENT_WEIGHT + extended as f64 * EXTENDED_WEIGHT;
    Some((weighted / reviews.len() as f64).min(1.0))
}

/// Signals for one restaurant from the reviews that share its slug.
pub fn observed_signals(
    record: &RestaurantRecord,
    matched: &[&ReviewRecord],
    now: NaiveDateTime,
) -> Signals {
    let status = response_status(matched);
    let fallback = SyntheticReason::NoMatchedReviews;

    let response_rate = if matched.is_empty() {
        Provenance::synthetic(0.0, fallback)
    } else {
        Provenance::Observed(status.rate())
    };

    let sentiment_score = match mean_rating(matched) {
        Some(mean) => Provenance::Observed(sentiment_from_rating(mean)),
        None => Provenance::synthetic(sentiment_from_rating(record.rating), fallback),
    };

    let recency_score = match recency_score(matched, now) {
        Some(score) => Provenance::Observed(score),
        None => Provenance::synthetic(NEUTRAL_RECENCY, fallback),
    };

    Signals {
        response_rate,
        response_status: status,
        sentiment_score,
        recency_score,
        matched_reviews: matched.len(),
    }
}

/// Draws from Beta(2, 3) as the second smallest of four uniforms.
fn beta_2_3(rng: &mut StdRng) -> f64 {
    let mut draws: [f64; 4] = [rng.gen(), rng.gen(), rng.gen(), rng.gen()];
    draws.sort_by(|a, b| a.total_cmp(b));
    draws[1]
}

fn unlinked_signals(record: &RestaurantRecord, rng: &mut StdRng) -> Signals {
    let reason = SyntheticReason::NoReviewLinkage;
    Signals {
        response_rate: Provenance::synthetic(beta_2_3(rng), reason),
        response_status: ResponseStatus::NoData,
        sentiment_score: Provenance::synthetic(sentiment_from_rating(record.rating), reason),
        recency_score: Provenance::synthetic(NEUTRAL_RECENCY, reason),
        matched_reviews: 0,
    }
}

pub fn enrich(
    restaurants: Vec<RestaurantRecord>,
    reviews: &[ReviewRecord],
    index: &ReviewIndex,
    linkage: Linkage,
    now: NaiveDateTime,
) -> Vec<EnrichedRestaurant> {
    match linkage {
        Linkage::Unlinked => {
            warn!(
                restaurants = restaurants.len(),
                seed = SYNTHETIC_RESPONSE_SEED,
                "no URL columns to join on; response rates are synthetic"
            );
            let mut rng = StdRng::seed_from_u64(SYNTHETIC_RESPONSE_SEED);
            restaurants
                .into_iter()
                .map(|record| {
                    let signals = unlinked_signals(&record, &mut rng);
                    EnrichedRestaurant { record, signals }
                })
                .collect()
        }
        Linkage::Linked => {
            let mut unmatched = 0usize;
            let enriched: Vec<EnrichedRestaurant> = restaurants
                .into_iter()
                .map(|record| {
                    let matched = record
                        .slug
                        .as_deref()
                        .map(|slug| index.matched(slug, reviews))
                        .unwrap_or_default();
                    if matched.is_empty() {
                        unmatched += 1;
                        debug!(restaurant = %record.name, slug = ?record.slug, "no matched reviews");
                    }
                    let signals = observed_signals(&record, &matched, now);
                    EnrichedRestaurant { record, signals }
                })
                .collect();
            info!(
                restaurants = enriched.len(),
                unmatched,
                slugs = index.slug_count(),
                "enriched restaurants from reviews"
            );
            enriched
        }
    }
}
