use crate::models::{BenchmarkSet, EnrichedRestaurant};

pub const RESPONSE_RATE_TARGET: f64 = 0.90;
pub const RECENCY_TARGET: f64 = 0.70;

/// Linear-interpolated quantile; 0.0 for an empty slice.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl BenchmarkSet {
    /// Market targets over the whole enriched dataset.
    pub fn compute(restaurants: &[EnrichedRestaurant]) -> Self {
        let ratings: Vec<f64> = restaurants.iter().map(|r| r.record.rating).collect();
        let volumes: Vec<f64> = restaurants
            .iter()
            .map(|r| r.record.review_count as f64)
            .collect();

        Self {
            rating_p75: quantile(&ratings, 0.75),
            response_rate_target: RESPONSE_RATE_TARGET,
            recency_target: RECENCY_TARGET,
            review_volume_p75: quantile(&volumes, 0.75),
            top_rating: ratings.iter().copied().fold(0.0, f64::max),
            avg_rating: mean(&ratings),
            median_reviews: quantile(&volumes, 0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Provenance, ResponseStatus, RestaurantRecord, Signals};

    fn enriched(rating: f64, review_count: u64) -> EnrichedRestaurant {
        EnrichedRestaurant {
            record: RestaurantRecord {
                name: format!("R{rating}-{review_count}"),
                rating,
                review_count,
                district: "Frankfurt City".to_string(),
                price: None,
                has_website: false,
                has_phone: false,
                url: None,
                slug: None,
            },
            signals: Signals {
                response_rate: Provenance::Observed(0.0),
                response_status: ResponseStatus::NoData,
                sentiment_score: Provenance::Observed(0.0),
                recency_score: Provenance::Observed(0.5),
                matched_reviews: 0,
            },
        }
    }

    #[test]
    fn quantile_interpolates_between_ranks() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&values, 0.75) - 3.25).abs() < 1e-9);
        assert!((quantile(&values, 0.5) - 2.5).abs() < 1e-9);
        assert_eq!(quantile(&[7.0], 0.75), 7.0);
        assert_eq!(quantile(&[], 0.75), 0.0);
    }

    #[test]
    fn benchmarks_over_dataset() {
        let restaurants = vec![
            enriched(4.0, 100),
            enriched(4.8, 900),
            enriched(4.4, 300),
            enriched(3.6, 50),
        ];
        let benchmarks = BenchmarkSet::compute(&restaurants);
        assert!((benchmarks.rating_p75 - 4.5).abs() < 1e-9);
        assert!((benchmarks.review_volume_p75 - 450.0).abs() < 1e-9);
        assert!((benchmarks.median_reviews - 200.0).abs() < 1e-9);
        assert!((benchmarks.avg_rating - 4.2).abs() < 1e-9);
        assert_eq!(benchmarks.top_rating, 4.8);
        assert_eq!(benchmarks.response_rate_target, 0.90);
        assert_eq!(benchmarks.recency_target, 0.70);
    }

    #[test]
    fn degenerate_datasets_do_not_panic() {
        let empty = BenchmarkSet::compute(&[]);
        assert_eq!(empty.rating_p75, 0.0);
        assert_eq!(empty.avg_rating, 0.0);
        assert_eq!(empty.median_reviews, 0.0);

        let single = BenchmarkSet::compute(&[enriched(4.3, 42)]);
        assert_eq!(single.rating_p75, 4.3);
        assert_eq!(single.avg_rating, 4.3);
        assert_eq!(single.median_reviews, 42.0);
        assert_eq!(single.top_rating, 4.3);
    }
}
