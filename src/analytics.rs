//! Read-only views over scored restaurants: gaps, momentum, personas.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::loader::DEFAULT_PRICE;
use crate::models::{
    BenchmarkSet, Dimension, Gap, MomentumPoint, MomentumSummary, PersonaProfile, PersonaTier,
    PriceTier, ReviewRecord, ScoreSet, Trend,
};
use crate::scoring::{price_tier, round1};

pub const MOMENTUM_MONTHS: usize = 13;
pub const SYNTHETIC_MOMENTUM_SEED: u64 = 42;
const SYNTHETIC_MONTHLY_MEAN: f64 = 3.5;

pub const SILENT_WINNER_MIN_RATING: f64 = 4.5;
pub const SILENT_WINNER_MAX_RESPONSE_RATE: f64 = 0.30;

const VENDOR: &str = "Praxiotech";

pub fn gap_target(dimension: Dimension, benchmarks: &BenchmarkSet) -> f64 {
    match dimension {
        Dimension::Reputation => benchmarks.rating_p75 * 20.0,
        Dimension::Responsiveness => 90.0,
        Dimension::DigitalPresence => 85.0,
        Dimension::Intelligence => 75.0,
        Dimension::Visibility => 70.0,
    }
}

/// Shortfall per dimension, largest first; ties keep dimension order.
pub fn gap_analysis(scores: &ScoreSet, benchmarks: &BenchmarkSet) -> Vec<Gap> {
    let mut gaps: Vec<Gap> = Dimension::ALL
        .iter()
        .map(|&dimension| {
            let target = gap_target(dimension, benchmarks);
            let score = scores.get(dimension);
            Gap {
                dimension,
                target,
                score,
                gap: round1(target - score),
            }
        })
        .collect();
    gaps.sort_by(|a, b| b.gap.partial_cmp(&a.gap).unwrap_or(std::cmp::Ordering::Equal));
    gaps
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Reviews per calendar month, oldest first, limited to the latest 13 months
/// that have any reviews.
pub fn monthly_counts(reviews: &[&ReviewRecord]) -> Vec<MomentumPoint> {
    let mut months: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for review in reviews {
        *months.entry(month_start(review.review_date.date())).or_insert(0) += 1;
    }

    let skip = months.len().saturating_sub(MOMENTUM_MONTHS);
    months
        .into_iter()
        .skip(skip)
        .map(|(month, count)| MomentumPoint { month, count })
        .collect()
}

/// Knuth's method; fine for the small means used here.
fn poisson(rng: &mut StdRng, mean: f64) -> usize {
    let limit = (-mean).exp();
    let mut product: f64 = rng.gen();
    let mut count = 0usize;
    while product > limit {
        count += 1;
        product *= rng.gen::<f64>();
    }
    count
}

/// Placeholder series over the 13 month starts ending at `now`'s month.
pub fn synthetic_momentum(now: NaiveDateTime) -> Vec<MomentumPoint> {
    let current = month_start(now.date());
    let mut rng = StdRng::seed_from_u64(SYNTHETIC_MOMENTUM_SEED);
    (0..MOMENTUM_MONTHS)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back as u32)))
        .map(|month| MomentumPoint {
            month,
            count: poisson(&mut rng, SYNTHETIC_MONTHLY_MEAN),
        })
        .collect()
}

pub fn momentum_summary(points: &[MomentumPoint]) -> Option<MomentumSummary> {
    if points.is_empty() {
        return None;
    }
    let counts: Vec<f64> = points.iter().map(|point| point.count as f64).collect();
    let average = counts.iter().sum::<f64>() / counts.len() as f64;
    let recent = if counts.len() >= 3 {
        counts[counts.len() - 3..].iter().sum::<f64>() / 3.0
    } else {
        average
    };

    let trend = if recent > average * 1.1 {
        Trend::Accelerating
    } else if recent < average * 0.8 {
        Trend::Declining
    } else {
        Trend::Stable
    };

    Some(MomentumSummary {
        average,
        recent,
        trend,
    })
}

/// Highly rated but rarely answering: the easiest pitch.
pub fn is_silent_winner(rating: f64, response_rate: f64) -> bool {
    rating >= SILENT_WINNER_MIN_RATING && response_rate < SILENT_WINNER_MAX_RESPONSE_RATE
}

/// Review counts per star, index 0 holding one-star reviews.
pub fn rating_distribution(reviews: &[&ReviewRecord]) -> [usize; 5] {
    let mut buckets = [0usize; 5];
    for review in reviews {
        let stars = review.rating.round().clamp(1.0, 5.0) as usize;
        buckets[stars - 1] += 1;
    }
    buckets
}

/// Score points an owner-response programme is pitched to add.
pub fn projected_response_lift(responsiveness: f64) -> f64 {
    ((90.0 - responsiveness) * 0.8).round().max(5.0)
}

pub fn classify_persona(rating: f64, price: Option<&str>) -> PersonaTier {
    let premium = price_tier(Some(price.unwrap_or(DEFAULT_PRICE))) == PriceTier::Premium;
    if premium || rating >= 4.7 {
        PersonaTier::UpscaleExperienceSeeker
    } else if rating >= 4.4 {
        PersonaTier::DinnerDateRomantic
    } else {
        PersonaTier::CuriousExplorer
    }
}

/// Formats `1234567` as `1,234,567`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// What the persona narrative is written from.
#[derive(Debug, Clone)]
pub struct PersonaInputs<'a> {
    pub name: &'a str,
    pub rating: f64,
    pub price: Option<&'a str>,
    pub review_count: u64,
    pub response_rate: f64,
}

impl<'a> PersonaInputs<'a> {
    /// Neutral inputs for a restaurant the dataset does not know.
    pub fn neutral(name: &'a str) -> Self {
        Self {
            name,
            rating: 4.0,
            price: Some(DEFAULT_PRICE),
            review_count: 100,
            response_rate: 0.0,
        }
    }
}

pub fn persona_profile(inputs: &PersonaInputs<'_>) -> PersonaProfile {
    let name = inputs.name;
    let rating = inputs.rating;
    let reviews = group_thousands(inputs.review_count);
    let replied = inputs.response_rate * 100.0;
    let tier = classify_persona(rating, inputs.price);

    match tier {
        PersonaTier::UpscaleExperienceSeeker => PersonaProfile {
            tier,
            label: "The Upscale Experience Seeker",
            segment: "Corporate Dinner / Special Occasion",
            motivation: "Seeks prestige, Instagram-worthy moments, and flawless service. \
                         Books via OpenTable or direct website.",
            pitch_en: format!(
                "{name} is already exceptional, rated {rating:.1} stars with over {reviews} \
                 reviews. But with only {replied:.0}% of customer reviews receiving a reply, \
                 you're leaving trust and revenue on the table. High-spending diners read owner \
                 responses before booking. {VENDOR}'s AI Review Manager ensures every guest \
                 feels heard, turning 4-star experiences into loyal 5-star advocates. \
                 Investment: 120 EUR/mo. Expected return: 2-3x booking uplift in 90 days."
            ),
            pitch_de: format!(
                "{name} ist bereits ausgezeichnet: {rating:.1} Sterne mit {reviews} \
                 Bewertungen. Doch nur {replied:.0}% der Gäste erhalten eine Antwort. \
                 Mit {VENDOR}s KI-Bewertungsmanagement verwandeln wir stille Gäste in treue \
                 Stammkunden. Investition: 120 EUR/Monat. ROI innerhalb von 90 Tagen sichtbar."
            ),
        },
        PersonaTier::DinnerDateRomantic => PersonaProfile {
            tier,
            label: "The Dinner Date Romantic",
            segment: "Business Date / Luncher",
            motivation: "Values speed and digital convenience. Most likely to book via mobile. \
                         Reads reviews on Google before deciding.",
            pitch_en: format!(
                "{name} commands a strong {rating:.1}-star reputation across {reviews} reviews. \
                 However, with a {replied:.0}% response rate, the digital conversation is \
                 one-sided. Top 3 competitors average 85%+ responsiveness. {VENDOR} closes this \
                 gap: AI responses, review campaigns, weekly reports for 120 EUR/month. This is \
                 the difference between being found and being chosen."
            ),
            pitch_de: format!(
                "{name} hat {rating:.1} Sterne mit {reviews} Rezensionen. Nur {replied:.0}% \
                 Antwortrate vs. 85% der Top-Konkurrenz. {VENDOR} schliesst diese Lücke: \
                 KI-Antworten, Bewertungskampagnen, wöchentliche Reports für 120 EUR/Monat."
            ),
        },
        PersonaTier::CuriousExplorer => PersonaProfile {
            tier,
            label: "The Curious Explorer",
            segment: "Walk-in / Discovery Diner",
            motivation: "Discovers restaurants through Google Maps and social proof. \
                         Heavily influenced by recent review activity.",
            pitch_en: format!(
                "{name} has solid foundations with a {rating:.1} rating and {reviews} reviews. \
                 {VENDOR} targets three levers: fresh review acquisition, responsiveness \
                 automation, and Google profile optimization. Est. 15-25% increase in foot \
                 traffic within 60 days."
            ),
            pitch_de: format!(
                "{name} hat solide {rating:.1} Sterne. {VENDOR}: neue Bewertungen gewinnen, \
                 Antworten automatisieren, Google-Profil optimieren. +15-25% mehr \
                 Laufkundschaft in 60 Tagen."
            ),
        },
    }
}
