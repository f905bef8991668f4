use crate::models::{Dimension, EnrichedRestaurant, HealthBand, PriceTier, ScoreSet};

/// Price text carrying this token is treated as the premium band ("Mehr als 50 €").
pub const PREMIUM_MARKER: &str = "Mehr";
/// Price text carrying this token is treated as the mid band ("20-30 €").
pub const MID_RANGE_MARKER: &str = "20";

const REVIEW_VOLUME_CAP: f64 = 500.0;

pub fn price_tier(price: Option<&str>) -> PriceTier {
    match price {
        Some(text) if text.contains(PREMIUM_MARKER) => PriceTier::Premium,
        Some(text) if text.contains(MID_RANGE_MARKER) => PriceTier::MidRange,
        _ => PriceTier::Other,
    }
}

pub fn price_bonus(tier: PriceTier) -> f64 {
    match tier {
        PriceTier::Premium => 10.0,
        PriceTier::MidRange => 5.0,
        PriceTier::Other => 2.0,
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn bounded(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

pub fn reputation(rating: f64, review_count: u64) -> f64 {
    let volume = (review_count as f64 / REVIEW_VOLUME_CAP).min(1.0);
    bounded((rating / 5.0) * 70.0 + volume * 30.0)
}

pub fn digital_presence(has_website: bool, has_phone: bool, tier: PriceTier) -> f64 {
    let website = if has_website { 50.0 } else { 10.0 };
    let phone = if has_phone { 25.0 } else { 0.0 };
    bounded(website + phone + 15.0 + price_bonus(tier))
}

/// Weighted sum of the five dimensions.
pub fn composite(scores: &ScoreSet) -> f64 {
    Dimension::ALL
        .iter()
        .map(|dimension| scores.get(*dimension) * dimension.weight())
        .sum()
}

pub fn score_restaurant(restaurant: &EnrichedRestaurant) -> ScoreSet {
    let record = &restaurant.record;
    let signals = &restaurant.signals;

    let mut scores = ScoreSet {
        reputation: round1(reputation(record.rating, record.review_count)),
        responsiveness: round1(bounded(signals.response_rate.value() * 100.0)),
        digital_presence: round1(digital_presence(
            record.has_website,
            record.has_phone,
            price_tier(record.price.as_deref()),
        )),
        intelligence: round1(bounded(*signals.sentiment_score.value())),
        visibility: round1(bounded(signals.recency_score.value() * 100.0)),
        composite: 0.0,
    };
    scores.composite = round1(composite(&scores));
    scores
}

pub fn health_band(composite: f64) -> HealthBand {
    match composite {
        c if c < 50.0 => HealthBand::AtRisk,
        c if c < 75.0 => HealthBand::Developing,
        _ => HealthBand::Strong,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Provenance, ResponseStatus, RestaurantRecord, Signals};

    fn sample_restaurant(
        rating: f64,
        review_count: u64,
        price: Option<&str>,
        response_rate: f64,
        sentiment: f64,
        recency: f64,
    ) -> EnrichedRestaurant {
        EnrichedRestaurant {
            record: RestaurantRecord {
                name: "Cafe Rosa".to_string(),
                rating,
                review_count,
                district: "Frankfurt City".to_string(),
                price: price.map(str::to_string),
                has_website: true,
                has_phone: true,
                url: None,
                slug: Some("cafe+rosa".to_string()),
            },
            signals: Signals {
                response_rate: Provenance::Observed(response_rate),
                response_status: ResponseStatus::Rate(response_rate),
                sentiment_score: Provenance::Observed(sentiment),
                recency_score: Provenance::Observed(recency),
                matched_reviews: 10,
            },
        }
    }

    #[test]
    fn price_tiers_follow_markers() {
        assert_eq!(price_tier(Some("Mehr als 50 €")), PriceTier::Premium);
        assert_eq!(price_tier(Some("20-30 €")), PriceTier::MidRange);
        assert_eq!(price_tier(Some("€€")), PriceTier::Other);
        assert_eq!(price_tier(None), PriceTier::Other);
        assert_eq!(price_bonus(PriceTier::Premium), 10.0);
        assert_eq!(price_bonus(PriceTier::MidRange), 5.0);
        assert_eq!(price_bonus(PriceTier::Other), 2.0);
    }

    #[test]
    fn reputation_blends_rating_and_volume() {
        assert!((reputation(4.5, 250) - 78.0).abs() < 1e-9);
        assert!((reputation(5.0, 5000) - 100.0).abs() < 1e-9);
        assert_eq!(reputation(0.0, 0), 0.0);
    }

    #[test]
    fn digital_presence_caps_at_hundred() {
        assert_eq!(digital_presence(true, true, PriceTier::Premium), 100.0);
        assert_eq!(digital_presence(true, false, PriceTier::MidRange), 70.0);
        assert_eq!(digital_presence(false, false, PriceTier::Other), 27.0);
    }

    #[test]
    fn scores_follow_dimension_formulas() {
        let restaurant = sample_restaurant(4.5, 250, Some("20-30 €"), 0.4, 87.5, 0.6);
        let scores = score_restaurant(&restaurant);
        assert_eq!(scores.reputation, 78.0);
        assert_eq!(scores.responsiveness, 40.0);
        assert_eq!(scores.digital_presence, 95.0);
        assert_eq!(scores.intelligence, 87.5);
        assert_eq!(scores.visibility, 60.0);

        let expected = 78.0 * 0.30 + 40.0 * 0.25 + 95.0 * 0.20 + 87.5 * 0.15 + 60.0 * 0.10;
        assert!((scores.composite - expected).abs() <= 0.05);
    }

    #[test]
    fn out_of_range_signals_are_clamped() {
        let restaurant = sample_restaurant(7.0, 10_000, Some("Mehr"), 1.4, 130.0, -0.2);
        let scores = score_restaurant(&restaurant);
        for dimension in Dimension::ALL {
            let value = scores.get(dimension);
            assert!((0.0..=100.0).contains(&value), "{dimension:?} = {value}");
        }
        assert!((0.0..=100.0).contains(&scores.composite));
    }

    #[test]
    fn health_bands_split_at_fifty_and_seventy_five() {
        assert_eq!(health_band(49.9), HealthBand::AtRisk);
        assert_eq!(health_band(50.0), HealthBand::Developing);
        assert_eq!(health_band(74.9), HealthBand::Developing);
        assert_eq!(health_band(75.0), HealthBand::Strong);
    }
}
