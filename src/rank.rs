use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::models::{EnrichedRestaurant, RankedRestaurant};
use crate::scoring::score_restaurant;

/// Every restaurant ordered by composite score.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ranking {
    entries: Vec<RankedRestaurant>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl Ranking {
    pub fn compute(restaurants: &[EnrichedRestaurant]) -> Self {
        let mut scored: Vec<(String, f64)> = restaurants
            .iter()
            .map(|restaurant| {
                let composite = score_restaurant(restaurant).composite;
                if composite.is_finite() {
                    (restaurant.name().to_string(), composite)
                } else {
                    warn!(restaurant = %restaurant.name(), "non-finite composite; ranking as 0");
                    (restaurant.name().to_string(), 0.0)
                }
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let total = scored.len();
        let entries: Vec<RankedRestaurant> = scored
            .into_iter()
            .enumerate()
            .map(|(i, (name, composite))| RankedRestaurant {
                rank: i + 1,
                name,
                composite,
                percentile: 100.0 * (total - i) as f64 / total as f64,
            })
            .collect();

        let mut positions = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            positions.entry(entry.name.clone()).or_insert(i);
        }

        Self { entries, positions }
    }

    pub fn entries(&self) -> &[RankedRestaurant] {
        &self.entries
    }

    pub fn top(&self, limit: usize) -> &[RankedRestaurant] {
        &self.entries[..limit.min(self.entries.len())]
    }

    /// Best placement of `name` when names repeat.
    pub fn position(&self, name: &str) -> Option<&RankedRestaurant> {
        self.positions.get(name).and_then(|&i| self.entries.get(i))
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Provenance, ResponseStatus, RestaurantRecord, Signals};

    fn restaurant(name: &str, rating: f64, response_rate: f64) -> EnrichedRestaurant {
        EnrichedRestaurant {
            record: RestaurantRecord {
                name: name.to_string(),
                rating,
                review_count: 200,
                district: "Frankfurt City".to_string(),
                price: Some("20-30".to_string()),
                has_website: true,
                has_phone: false,
                url: None,
                slug: None,
            },
            signals: Signals {
                response_rate: Provenance::Observed(response_rate),
                response_status: ResponseStatus::from_counts(0, 0),
                sentiment_score: Provenance::Observed(80.0),
                recency_score: Provenance::Observed(0.5),
                matched_reviews: 0,
            },
        }
    }

    #[test]
    fn ranks_are_contiguous_and_descending() {
        let restaurants = vec![
            restaurant("Mitte", 4.2, 0.5),
            restaurant("Spitze", 4.9, 0.9),
            restaurant("Ende", 3.1, 0.0),
        ];
        let ranking = Ranking::compute(&restaurants);
        let names: Vec<&str> = ranking.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Spitze", "Mitte", "Ende"]);

        let ranks: Vec<usize> = ranking.entries().iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert!(ranking
            .entries()
            .windows(2)
            .all(|pair| pair[0].composite >= pair[1].composite));

        assert_eq!(ranking.total(), 3);
        assert_eq!(ranking.position("Spitze").map(|e| e.percentile), Some(100.0));
        assert_eq!(ranking.position("Ende").map(|e| e.rank), Some(3));
        assert!(ranking.position("Nirgendwo").is_none());
    }

    #[test]
    fn ties_keep_input_order() {
        let restaurants = vec![
            restaurant("Erste", 4.0, 0.5),
            restaurant("Zweite", 4.0, 0.5),
            restaurant("Dritte", 4.0, 0.5),
        ];
        let ranking = Ranking::compute(&restaurants);
        let names: Vec<&str> = ranking.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Erste", "Zweite", "Dritte"]);
    }

    #[test]
    fn empty_dataset_ranks_nothing() {
        let ranking = Ranking::compute(&[]);
        assert_eq!(ranking.total(), 0);
        assert!(ranking.top(10).is_empty());
    }

    #[test]
    fn top_truncates() {
        let restaurants = vec![restaurant("A", 4.0, 0.1), restaurant("B", 4.5, 0.1)];
        let ranking = Ranking::compute(&restaurants);
        assert_eq!(ranking.top(1).len(), 1);
        assert_eq!(ranking.top(5).len(), 2);
    }
}
