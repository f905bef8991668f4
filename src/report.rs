use std::fmt::Write;

use crate::analytics;
use crate::dataset::Dataset;
use crate::models::{Dimension, Gap, ResponseStatus};
use crate::rank::Ranking;
use crate::scoring::health_band;

/// How many of the largest gaps the action plan covers.
const ACTION_ITEMS: usize = 3;

/// What the responsiveness number actually means for a salesperson.
pub fn response_status_note(status: ResponseStatus) -> String {
    match status {
        ResponseStatus::NoData => "no reviews scraped for this restaurant yet".to_string(),
        ResponseStatus::ZeroResponses => "the owner has never replied to a review".to_string(),
        ResponseStatus::Rate(rate) => format!("{:.0}% of reviews carry an owner reply", rate * 100.0),
    }
}

fn action_for(gap: &Gap, responsiveness: f64) -> String {
    match gap.dimension {
        Dimension::Responsiveness => format!(
            "Answer every new review within 48 hours (projected +{:.0} responsiveness points).",
            analytics::projected_response_lift(responsiveness)
        ),
        Dimension::Reputation => {
            "Run a review campaign to lift volume toward the market's top quartile.".to_string()
        }
        Dimension::DigitalPresence => {
            "Complete the Google profile: website link, phone number, price band.".to_string()
        }
        Dimension::Intelligence => {
            "Address recurring complaints in recent low-star reviews.".to_string()
        }
        Dimension::Visibility => {
            "Prompt recent guests for reviews to keep the profile fresh.".to_string()
        }
    }
}

pub fn build_leaderboard(ranking: &Ranking, limit: usize) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "| Rank | Restaurant | Composite | Percentile |");
    let _ = writeln!(output, "|---:|---|---:|---:|");
    for entry in ranking.top(limit) {
        let _ = writeln!(
            output,
            "| {} | {} | {:.1} | {:.0} |",
            entry.rank, entry.name, entry.composite, entry.percentile
        );
    }
    output
}

/// Sales brief for one restaurant as markdown.
pub fn build_brief(dataset: &Dataset, name: &str) -> String {
    let restaurant = dataset.restaurant(name);
    let scores = dataset.scores(name);
    let gaps = dataset.gaps(name);
    let momentum = dataset.momentum(name);
    let persona = dataset.persona(name);
    let ranking = dataset.ranking();

    let mut output = String::new();

    let _ = writeln!(output, "# Restaurant Brief: {name}");
    let _ = writeln!(
        output,
        "Data as of {}",
        dataset.loaded_at().format("%Y-%m-%d %H:%M")
    );
    match ranking.position(name) {
        Some(position) => {
            let _ = writeln!(
                output,
                "Rank {} of {} (percentile {:.0}), health {}",
                position.rank,
                ranking.total(),
                position.percentile,
                health_band(scores.composite).as_str()
            );
        }
        None => {
            let _ = writeln!(
                output,
                "Not found in the dataset ({} restaurants); figures below are defaults.",
                ranking.total()
            );
        }
    }
    if let Some(restaurant) = restaurant {
        let _ = writeln!(
            output,
            "{} | {:.1} stars | {} reviews",
            restaurant.record.district,
            restaurant.record.rating,
            analytics::group_thousands(restaurant.record.review_count)
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Scorecard");
    let _ = writeln!(output, "| Dimension | Score | Weight |");
    let _ = writeln!(output, "|---|---:|---:|");
    for dimension in Dimension::ALL {
        let _ = writeln!(
            output,
            "| {} | {:.1} | {:.0}% |",
            dimension.label(),
            scores.get(dimension),
            dimension.weight() * 100.0
        );
    }
    let _ = writeln!(output, "| **Composite** | **{:.1}** | |", scores.composite);
    if let Some(restaurant) = restaurant {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "Responsiveness: {}.",
            response_status_note(restaurant.signals.response_status)
        );
        let distribution = dataset.rating_distribution(name);
        if distribution.iter().any(|&count| count > 0) {
            let stars: Vec<String> = distribution
                .iter()
                .enumerate()
                .rev()
                .map(|(i, count)| format!("{}★ {count}", i + 1))
                .collect();
            let _ = writeln!(output, "Review stars: {}.", stars.join(", "));
        }
        if dataset.is_silent_winner(name) {
            let _ = writeln!(
                output,
                "Silent winner: highly rated but rarely answering its reviews."
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Gaps to Market");
    let _ = writeln!(output, "| Dimension | Score | Target | Gap |");
    let _ = writeln!(output, "|---|---:|---:|---:|");
    for gap in &gaps {
        let _ = writeln!(
            output,
            "| {} | {:.1} | {:.1} | {:+.1} |",
            gap.dimension.label(),
            gap.score,
            gap.target,
            gap.gap
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Review Momentum");
    let points = momentum.value();
    if points.is_empty() {
        let _ = writeln!(output, "No reviews to chart.");
    } else {
        let _ = writeln!(output, "| Month | Reviews |");
        let _ = writeln!(output, "|---|---:|");
        for point in points {
            let _ = writeln!(output, "| {} | {} |", point.month.format("%Y-%m"), point.count);
        }
    }
    if let Some(summary) = analytics::momentum_summary(points) {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "Trend: {} (last 3 months {:.1}/month vs average {:.1}/month)",
            summary.trend.as_str(),
            summary.recent,
            summary.average
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Guest Persona: {}", persona.label);
    let _ = writeln!(output, "- Segment: {}", persona.segment);
    let _ = writeln!(output, "- Motivation: {}", persona.motivation);
    let _ = writeln!(output);
    let _ = writeln!(output, "> {}", persona.pitch_en);
    let _ = writeln!(output);
    let _ = writeln!(output, "> {}", persona.pitch_de);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Action Plan");
    let open: Vec<&Gap> = gaps
        .iter()
        .filter(|gap| gap.gap > 0.0)
        .take(ACTION_ITEMS)
        .collect();
    if open.is_empty() {
        let _ = writeln!(output, "At or above market on every dimension; focus on retention.");
    } else {
        for (i, gap) in open.iter().enumerate() {
            let _ = writeln!(
                output,
                "{}. {} ({:.1} points behind): {}",
                i + 1,
                gap.dimension.label(),
                gap.gap,
                action_for(gap, scores.responsiveness)
            );
        }
    }

    let mut synthetic: Vec<String> = restaurant
        .map(|r| {
            r.signals
                .synthetic_reasons()
                .into_iter()
                .map(|(signal, reason)| format!("{signal} ({})", reason.as_str()))
                .collect()
        })
        .unwrap_or_default();
    if let Some(reason) = momentum.reason() {
        synthetic.push(format!("review momentum ({})", reason.as_str()));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "---");
    if synthetic.is_empty() {
        let _ = writeln!(output, "_All signals observed from scraped reviews._");
    } else {
        let _ = writeln!(output, "_Estimated rather than observed: {}._", synthetic.join(", "));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DataSources;
    use crate::loader::{RestaurantTable, ReviewTable};
    use crate::models::{RankedRestaurant, RestaurantRecord, ReviewRecord};
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid timestamp")
    }

    fn dataset(with_urls: bool) -> Dataset {
        let url = "https://www.google.com/maps/place/Cafe+Rosa/@50.1,8.6";
        Dataset::from_tables(
            DataSources::new("restaurants.csv", "reviews.csv"),
            RestaurantTable {
                records: vec![RestaurantRecord {
                    name: "Cafe Rosa".to_string(),
                    rating: 4.6,
                    review_count: 1520,
                    district: "Sachsenhausen".to_string(),
                    price: Some("20-30 €".to_string()),
                    has_website: true,
                    has_phone: false,
                    url: Some(url.to_string()),
                    slug: None,
                }],
                has_url_column: with_urls,
            },
            ReviewTable {
                records: (0..6)
                    .map(|i| ReviewRecord {
                        rating: 5.0,
                        review_date: fixed_now() - Duration::days(i * 20),
                        owner_response_text: None,
                        owner_response_flag: None,
                        url: Some(url.to_string()),
                        slug: None,
                    })
                    .collect(),
                has_url_column: true,
            },
            fixed_now(),
        )
    }

    #[test]
    fn brief_contains_every_section() {
        let brief = build_brief(&dataset(true), "Cafe Rosa");
        for heading in [
            "# Restaurant Brief: Cafe Rosa",
            "## Scorecard",
            "## Gaps to Market",
            "## Review Momentum",
            "## Guest Persona: The Dinner Date Romantic",
            "## Action Plan",
        ] {
            assert!(brief.contains(heading), "missing {heading}");
        }
        assert!(brief.contains("Data as of 2025-06-15 12:00"));
        assert!(brief.contains("Rank 1 of 1"));
        assert!(brief.contains("1,520 reviews"));
        assert!(brief.contains("the owner has never replied"));
        assert!(brief.contains("Silent winner"));
        assert!(brief.contains("Review stars: 5★ 6, 4★ 0, 3★ 0, 2★ 0, 1★ 0."));
        assert!(brief.contains("projected +72 responsiveness points"));
        assert!(brief.contains("_All signals observed from scraped reviews._"));
    }

    #[test]
    fn brief_flags_synthetic_signals() {
        let brief = build_brief(&dataset(false), "Cafe Rosa");
        assert!(brief.contains("_Estimated rather than observed:"));
        assert!(brief.contains("response rate (no review linkage)"));
        // Reviews still carry URLs, so momentum is matched by name.
        assert!(!brief.contains("review momentum ("));
    }

    #[test]
    fn brief_for_unknown_restaurant_still_renders() {
        let brief = build_brief(&dataset(true), "Nirgendwo");
        assert!(brief.contains("Not found in the dataset"));
        assert!(brief.contains("| **Composite** | **0.0** | |"));
        assert!(brief.contains("The Curious Explorer"));
        assert!(brief.contains("review momentum (unknown restaurant)"));
    }

    #[test]
    fn response_notes_distinguish_missing_data() {
        assert!(response_status_note(ResponseStatus::NoData).contains("no reviews scraped"));
        assert!(response_status_note(ResponseStatus::ZeroResponses).contains("never replied"));
        assert_eq!(
            response_status_note(ResponseStatus::Rate(0.25)),
            "25% of reviews carry an owner reply"
        );
    }

    #[test]
    fn leaderboard_lists_ranked_rows() {
        let ranking = dataset(true).ranking().clone();
        let table = build_leaderboard(&ranking, 10);
        let rows: Vec<&str> = table.lines().skip(2).collect();
        assert_eq!(rows.len(), 1);
        let first: &RankedRestaurant = &ranking.entries()[0];
        assert!(rows[0].starts_with(&format!("| 1 | {} |", first.name)));
    }
}
