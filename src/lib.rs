//! Scoring and sales intelligence over scraped restaurant and review tables.
//!
//! Two CSV exports go in; a [`Dataset`] comes out holding enriched
//! restaurants, market benchmarks and a composite ranking. Per-restaurant
//! views (scores, gaps, momentum, persona, markdown brief) are derived from
//! the snapshot on demand.

pub mod analytics;
pub mod benchmark;
pub mod dataset;
pub mod enrich;
pub mod error;
pub mod join;
pub mod loader;
pub mod models;
pub mod parse;
pub mod rank;
pub mod report;
pub mod scoring;

pub use dataset::{DataSources, Dataset, DatasetCache};
pub use error::LoadError;
pub use join::Linkage;
pub use rank::Ranking;
