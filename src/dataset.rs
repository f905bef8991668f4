//! The loaded, joined, enriched and benchmarked snapshot of both tables.
//!
//! A [`Dataset`] is built in one step and never changes afterwards; reloading
//! produces a new snapshot. Every per-restaurant view (scores, gaps,
//! momentum, persona) is derived from it on demand.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info};

use crate::analytics::{self, PersonaInputs};
use crate::error::LoadError;
use crate::join::{self, Linkage, ReviewIndex};
use crate::loader::{self, RestaurantTable, ReviewTable};
use crate::models::{
    BenchmarkSet, EnrichedRestaurant, Gap, MomentumPoint, PersonaProfile, Provenance,
    ReviewRecord, ScoreSet, SyntheticReason,
};
use crate::rank::Ranking;
use crate::{enrich, scoring};

/// Characters of the `+`-joined name tried when a slug matches no reviews.
const NAME_FRAGMENT_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub restaurants: PathBuf,
    pub reviews: PathBuf,
}

impl DataSources {
    pub fn new(restaurants: impl Into<PathBuf>, reviews: impl Into<PathBuf>) -> Self {
        Self {
            restaurants: restaurants.into(),
            reviews: reviews.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    sources: DataSources,
    loaded_at: NaiveDateTime,
    linkage: Linkage,
    restaurants: Vec<EnrichedRestaurant>,
    reviews: Vec<ReviewRecord>,
    index: ReviewIndex,
    by_name: HashMap<String, usize>,
    benchmarks: BenchmarkSet,
    ranking: Ranking,
}

impl Dataset {
    pub fn load(sources: &DataSources) -> Result<Self, LoadError> {
        Self::load_at(sources, Local::now().naive_local())
    }

    /// Loads with relative review dates resolved against `now`.
    pub fn load_at(sources: &DataSources, now: NaiveDateTime) -> Result<Self, LoadError> {
        let restaurants = loader::load_restaurants(&sources.restaurants)?;
        let reviews = loader::load_reviews(&sources.reviews, now)?;
        Ok(Self::from_tables(sources.clone(), restaurants, reviews, now))
    }

    pub fn from_tables(
        sources: DataSources,
        restaurants: RestaurantTable,
        reviews: ReviewTable,
        now: NaiveDateTime,
    ) -> Self {
        let RestaurantTable {
            records: mut restaurant_records,
            has_url_column: restaurant_urls,
        } = restaurants;
        let ReviewTable {
            records: mut review_records,
            has_url_column: review_urls,
        } = reviews;

        let linkage = join::link(
            &mut restaurant_records,
            &mut review_records,
            restaurant_urls,
            review_urls,
        );
        let index = ReviewIndex::build(&review_records);
        let restaurants = enrich::enrich(restaurant_records, &review_records, &index, linkage, now);

        let mut by_name = HashMap::with_capacity(restaurants.len());
        for (i, restaurant) in restaurants.iter().enumerate() {
            by_name.entry(restaurant.name().to_string()).or_insert(i);
        }

        let benchmarks = BenchmarkSet::compute(&restaurants);
        let ranking = Ranking::compute(&restaurants);

        info!(
            restaurants = restaurants.len(),
            reviews = review_records.len(),
            ?linkage,
            rating_p75 = benchmarks.rating_p75,
            review_volume_p75 = benchmarks.review_volume_p75,
            "dataset ready"
        );

        Self {
            sources,
            loaded_at: now,
            linkage,
            restaurants,
            reviews: review_records,
            index,
            by_name,
            benchmarks,
            ranking,
        }
    }

    /// Builds a fresh snapshot from the same files.
    pub fn reload(&self) -> Result<Self, LoadError> {
        Self::load(&self.sources)
    }

    pub fn sources(&self) -> &DataSources {
        &self.sources
    }

    pub fn loaded_at(&self) -> NaiveDateTime {
        self.loaded_at
    }

    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    pub fn restaurants(&self) -> &[EnrichedRestaurant] {
        &self.restaurants
    }

    pub fn reviews(&self) -> &[ReviewRecord] {
        &self.reviews
    }

    pub fn benchmarks(&self) -> &BenchmarkSet {
        &self.benchmarks
    }

    pub fn ranking(&self) -> &Ranking {
        &self.ranking
    }

    /// First restaurant carrying `name`.
    pub fn restaurant(&self, name: &str) -> Option<&EnrichedRestaurant> {
        self.by_name
            .get(name)
            .and_then(|&i| self.restaurants.get(i))
    }

    pub fn matched_reviews(&self, name: &str) -> Vec<&ReviewRecord> {
        self.restaurant(name)
            .and_then(|restaurant| restaurant.record.slug.as_deref())
            .map(|slug| self.index.matched(slug, &self.reviews))
            .unwrap_or_default()
    }

    /// All-zero for names the dataset does not contain.
    pub fn scores(&self, name: &str) -> ScoreSet {
        self.restaurant(name)
            .map(scoring::score_restaurant)
            .unwrap_or_else(ScoreSet::zero)
    }

    pub fn gaps(&self, name: &str) -> Vec<Gap> {
        analytics::gap_analysis(&self.scores(name), &self.benchmarks)
    }

    /// Monthly review counts, or a seeded placeholder series when there is
    /// nothing to count.
    pub fn momentum(&self, name: &str) -> Provenance<Vec<MomentumPoint>> {
        let mut matched = self.matched_reviews(name);
        if matched.is_empty() {
            let fragment = name_fragment(name);
            if !fragment.is_empty() {
                matched = self.index.matched_containing(&fragment, &self.reviews);
            }
        }

        if matched.is_empty() {
            let reason = if self.linkage == Linkage::Unlinked {
                SyntheticReason::NoReviewLinkage
            } else if self.restaurant(name).is_some() {
                SyntheticReason::NoMatchedReviews
            } else {
                SyntheticReason::UnknownRestaurant
            };
            debug!(restaurant = name, reason = reason.as_str(), "synthetic momentum");
            return Provenance::synthetic(analytics::synthetic_momentum(self.loaded_at), reason);
        }

        Provenance::Observed(analytics::monthly_counts(&matched))
    }

    pub fn is_silent_winner(&self, name: &str) -> bool {
        self.restaurant(name)
            .map(|r| analytics::is_silent_winner(r.record.rating, r.response_rate()))
            .unwrap_or(false)
    }

    /// Silent winners in dataset order.
    pub fn silent_winners(&self, limit: usize) -> Vec<&EnrichedRestaurant> {
        self.restaurants
            .iter()
            .filter(|r| analytics::is_silent_winner(r.record.rating, r.response_rate()))
            .take(limit)
            .collect()
    }

    pub fn persona(&self, name: &str) -> PersonaProfile {
        let inputs = match self.restaurant(name) {
            Some(restaurant) => PersonaInputs {
                name,
                rating: restaurant.record.rating,
                price: restaurant.record.price.as_deref(),
                review_count: restaurant.record.review_count,
                response_rate: restaurant.response_rate(),
            },
            None => PersonaInputs::neutral(name),
        };
        analytics::persona_profile(&inputs)
    }

    pub fn rating_distribution(&self, name: &str) -> [usize; 5] {
        analytics::rating_distribution(&self.matched_reviews(name))
    }
}

fn name_fragment(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(' ', "+")
        .chars()
        .take(NAME_FRAGMENT_CHARS)
        .collect()
}

/// Identity of one source file: where it is, how big, when it last changed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
}

impl FileStamp {
    fn read(path: &Path) -> Result<Self, LoadError> {
        let metadata = fs::metadata(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

/// Holds the last snapshot and reuses it while both files are unchanged.
#[derive(Debug, Default)]
pub struct DatasetCache {
    cached: Option<([FileStamp; 2], Arc<Dataset>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, sources: &DataSources) -> Result<Arc<Dataset>, LoadError> {
        let stamps = [
            FileStamp::read(&sources.restaurants)?,
            FileStamp::read(&sources.reviews)?,
        ];

        if let Some((cached_stamps, dataset)) = &self.cached {
            if *cached_stamps == stamps {
                debug!("reusing cached dataset");
                return Ok(Arc::clone(dataset));
            }
        }

        let dataset = Arc::new(Dataset::load(sources)?);
        self.cached = Some((stamps, Arc::clone(&dataset)));
        Ok(dataset)
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
