use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use restaurant_intel::analytics;
use restaurant_intel::models::{Dimension, HealthBand};
use restaurant_intel::report;
use restaurant_intel::scoring::health_band;
use restaurant_intel::{DataSources, Dataset};

#[derive(Parser)]
#[command(name = "restaurant-intel")]
#[command(about = "Restaurant scoring and sales intelligence from scraped Google Maps data", long_about = None)]
struct Cli {
    /// Restaurant table export
    #[arg(long, global = true, env = "RESTAURANTS_CSV", default_value = "restaurants.csv")]
    restaurants: PathBuf,
    /// Review table export
    #[arg(long, global = true, env = "REVIEWS_CSV", default_value = "reviews.csv")]
    reviews: PathBuf,
    /// Log pipeline progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank restaurants by composite score
    Leaderboard {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show dimension scores for one restaurant
    Score {
        name: String,
        #[arg(long)]
        json: bool,
    },
    /// Compare one restaurant against market targets
    Gaps { name: String },
    /// Monthly review counts and trend
    Momentum { name: String },
    /// Highly rated restaurants that rarely answer reviews
    SilentWinners {
        #[arg(long, default_value_t = 4)]
        limit: usize,
    },
    /// Market benchmarks over the whole dataset
    Benchmarks {
        #[arg(long)]
        json: bool,
    },
    /// Write a markdown sales brief
    Report {
        name: String,
        #[arg(long, default_value = "brief.md")]
        out: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "restaurant_intel=info"
    } else {
        "restaurant_intel=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let sources = DataSources::new(cli.restaurants, cli.reviews);
    let dataset = Dataset::load(&sources).with_context(|| {
        format!(
            "failed to load {} and {}",
            sources.restaurants.display(),
            sources.reviews.display()
        )
    })?;

    match cli.command {
        Commands::Leaderboard { limit } => {
            if dataset.ranking().total() == 0 {
                println!("No restaurants loaded.");
                return Ok(());
            }
            print!("{}", report::build_leaderboard(dataset.ranking(), limit));
        }
        Commands::Score { name, json } => {
            let scores = dataset.scores(&name);
            if json {
                let body = serde_json::json!({
                    "name": name,
                    "scores": scores,
                    "rank": dataset.ranking().position(&name),
                    "health": health_band(scores.composite),
                    "silent_winner": dataset.is_silent_winner(&name),
                    "signals": dataset.restaurant(&name).map(|r| &r.signals),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
                return Ok(());
            }

            match dataset.ranking().position(&name) {
                Some(position) => println!(
                    "{name}: rank {} of {}, composite {:.1}",
                    position.rank,
                    dataset.ranking().total(),
                    scores.composite
                ),
                None => println!("{name}: not in the dataset, showing zero scores"),
            }
            for dimension in Dimension::ALL {
                println!("- {}: {:.1}", dimension.label(), scores.get(dimension));
            }
            let band = health_band(scores.composite);
            println!("Health: {}", band.as_str());
            if band == HealthBand::AtRisk {
                println!("Below 50: a priority prospect.");
            }
            if let Some(restaurant) = dataset.restaurant(&name) {
                println!(
                    "Responsiveness: {}",
                    report::response_status_note(restaurant.signals.response_status)
                );
            }
            if dataset.is_silent_winner(&name) {
                println!("Silent winner.");
            }
        }
        Commands::Gaps { name } => {
            println!("Gaps for {name} (largest first):");
            for gap in dataset.gaps(&name) {
                println!(
                    "- {}: score {:.1}, target {:.1}, gap {:+.1}",
                    gap.dimension.label(),
                    gap.score,
                    gap.target,
                    gap.gap
                );
            }
        }
        Commands::Momentum { name } => {
            let momentum = dataset.momentum(&name);
            if let Some(reason) = momentum.reason() {
                println!("Estimated series ({}).", reason.as_str());
            }
            let points = momentum.into_value();
            for point in &points {
                println!("{} {:>4}", point.month.format("%Y-%m"), point.count);
            }
            if let Some(summary) = analytics::momentum_summary(&points) {
                println!(
                    "Trend: {} ({:.1}/month recently vs {:.1}/month on average)",
                    summary.trend.as_str(),
                    summary.recent,
                    summary.average
                );
            }
        }
        Commands::SilentWinners { limit } => {
            let winners = dataset.silent_winners(limit);
            if winners.is_empty() {
                println!("No silent winners in this dataset.");
                return Ok(());
            }
            for restaurant in winners {
                println!(
                    "- {} ({:.1} stars, {:.0}% replied)",
                    restaurant.name(),
                    restaurant.record.rating,
                    restaurant.response_rate() * 100.0
                );
            }
        }
        Commands::Benchmarks { json } => {
            let benchmarks = dataset.benchmarks();
            if json {
                println!("{}", serde_json::to_string_pretty(benchmarks)?);
                return Ok(());
            }
            println!(
                "Loaded at {}",
                dataset.loaded_at().format("%Y-%m-%d %H:%M:%S")
            );
            println!("Linkage: {:?}", dataset.linkage());
            println!("Rating p75: {:.2}", benchmarks.rating_p75);
            println!("Top rating: {:.1}", benchmarks.top_rating);
            println!("Average rating: {:.2}", benchmarks.avg_rating);
            println!("Review volume p75: {:.0}", benchmarks.review_volume_p75);
            println!("Median reviews: {:.0}", benchmarks.median_reviews);
            println!(
                "Response rate target: {:.0}%",
                benchmarks.response_rate_target * 100.0
            );
            println!("Recency target: {:.0}%", benchmarks.recency_target * 100.0);
        }
        Commands::Report { name, out } => {
            let brief = report::build_brief(&dataset, &name);
            std::fs::write(&out, brief)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Brief written to {}.", out.display());
        }
    }

    Ok(())
}
