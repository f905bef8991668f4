use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RestaurantRecord {
    pub name: String,
    pub rating: f64,
    pub review_count: u64,
    pub district: String,
    pub price: Option<String>,
    pub has_website: bool,
    pub has_phone: bool,
    pub url: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewRecord {
    pub rating: f64,
    pub review_date: NaiveDateTime,
    pub owner_response_text: Option<String>,
    pub owner_response_flag: Option<String>,
    pub url: Option<String>,
    pub slug: Option<String>,
}

impl ReviewRecord {
    /// Either the reply text or the reply marker is enough.
    pub fn is_responded(&self) -> bool {
        self.owner_response_text.is_some() || self.owner_response_flag.is_some()
    }
}

/// Why a derived value was filled in instead of measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntheticReason {
    /// Neither table exposes a URL column, so nothing could be joined.
    NoReviewLinkage,
    /// The restaurant has no slug or no review shares it.
    NoMatchedReviews,
    /// The requested restaurant is not in the dataset.
    UnknownRestaurant,
}

impl SyntheticReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyntheticReason::NoReviewLinkage => "no review linkage",
            SyntheticReason::NoMatchedReviews => "no matched reviews",
            SyntheticReason::UnknownRestaurant => "unknown restaurant",
        }
    }
}

/// A derived value tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance<T> {
    Observed(T),
    Synthetic { value: T, reason: SyntheticReason },
}

impl<T> Provenance<T> {
    pub fn synthetic(value: T, reason: SyntheticReason) -> Self {
        Provenance::Synthetic { value, reason }
    }

    pub fn value(&self) -> &T {
        match self {
            Provenance::Observed(value) => value,
            Provenance::Synthetic { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Provenance::Observed(value) => value,
            Provenance::Synthetic { value, .. } => value,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Provenance::Synthetic { .. })
    }

    pub fn reason(&self) -> Option<SyntheticReason> {
        match self {
            Provenance::Observed(_) => None,
            Provenance::Synthetic { reason, .. } => Some(*reason),
        }
    }
}

/// Owner engagement as observed in the review table.
///
/// `NoData` and `ZeroResponses` both score as a 0.0 response rate but mean
/// different things to a salesperson: nothing has been scraped yet versus an
/// owner who never replies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    NoData,
    ZeroResponses,
    Rate(f64),
}

impl ResponseStatus {
    pub fn from_counts(responded: usize, total: usize) -> Self {
        if total == 0 {
            ResponseStatus::NoData
        } else if responded == 0 {
            ResponseStatus::ZeroResponses
        } else {
            ResponseStatus::Rate(responded as f64 / total as f64)
        }
    }

    pub fn rate(&self) -> f64 {
        match self {
            ResponseStatus::NoData | ResponseStatus::ZeroResponses => 0.0,
            ResponseStatus::Rate(rate) => *rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signals {
    /// Share of matched reviews with an owner reply, in [0, 1].
    pub response_rate: Provenance<f64>,
    pub response_status: ResponseStatus,
    /// Mean matched review rating mapped onto [0, 100].
    pub sentiment_score: Provenance<f64>,
    /// Weighted share of recent reviews, in [0, 1].
    pub recency_score: Provenance<f64>,
    pub matched_reviews: usize,
}

impl Signals {
    pub fn synthetic_reasons(&self) -> Vec<(&'static str, SyntheticReason)> {
        let mut reasons = Vec::new();
        if let Some(reason) = self.response_rate.reason() {
            reasons.push(("response rate", reason));
        }
        if let Some(reason) = self.sentiment_score.reason() {
            reasons.push(("sentiment", reason));
        }
        if let Some(reason) = self.recency_score.reason() {
            reasons.push(("recency", reason));
        }
        reasons
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedRestaurant {
    pub record: RestaurantRecord,
    pub signals: Signals,
}

impl EnrichedRestaurant {
    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn response_rate(&self) -> f64 {
        *self.signals.response_rate.value()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkSet {
    pub rating_p75: f64,
    pub response_rate_target: f64,
    pub recency_target: f64,
    pub review_volume_p75: f64,
    pub top_rating: f64,
    pub avg_rating: f64,
    pub median_reviews: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Reputation,
    Responsiveness,
    DigitalPresence,
    Intelligence,
    Visibility,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Reputation,
        Dimension::Responsiveness,
        Dimension::DigitalPresence,
        Dimension::Intelligence,
        Dimension::Visibility,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Reputation => "Reputation",
            Dimension::Responsiveness => "Responsiveness",
            Dimension::DigitalPresence => "Digital Presence",
            Dimension::Intelligence => "Intelligence",
            Dimension::Visibility => "Visibility",
        }
    }

    /// Share of the composite score carried by this dimension.
    pub fn weight(&self) -> f64 {
        match self {
            Dimension::Reputation => 0.30,
            Dimension::Responsiveness => 0.25,
            Dimension::DigitalPresence => 0.20,
            Dimension::Intelligence => 0.15,
            Dimension::Visibility => 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSet {
    pub reputation: f64,
    pub responsiveness: f64,
    pub digital_presence: f64,
    pub intelligence: f64,
    pub visibility: f64,
    pub composite: f64,
}

impl ScoreSet {
    pub fn zero() -> Self {
        Self {
            reputation: 0.0,
            responsiveness: 0.0,
            digital_presence: 0.0,
            intelligence: 0.0,
            visibility: 0.0,
            composite: 0.0,
        }
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Reputation => self.reputation,
            Dimension::Responsiveness => self.responsiveness,
            Dimension::DigitalPresence => self.digital_presence,
            Dimension::Intelligence => self.intelligence,
            Dimension::Visibility => self.visibility,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    AtRisk,
    Developing,
    Strong,
}

impl HealthBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthBand::AtRisk => "at risk",
            HealthBand::Developing => "developing",
            HealthBand::Strong => "strong",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Premium,
    MidRange,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gap {
    pub dimension: Dimension,
    pub target: f64,
    pub score: f64,
    /// Positive when the score falls short of the target.
    pub gap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MomentumPoint {
    /// First day of the calendar month.
    pub month: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Accelerating,
    Stable,
    Declining,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Accelerating => "ACCELERATING",
            Trend::Stable => "STABLE",
            Trend::Declining => "DECLINING",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MomentumSummary {
    pub average: f64,
    pub recent: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaTier {
    UpscaleExperienceSeeker,
    DinnerDateRomantic,
    CuriousExplorer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaProfile {
    pub tier: PersonaTier,
    pub label: &'static str,
    pub segment: &'static str,
    pub motivation: &'static str,
    pub pitch_en: String,
    pub pitch_de: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRestaurant {
    pub rank: usize,
    pub name: String,
    pub composite: f64,
    /// 100 for the leader, 100 / N for the last place.
    pub percentile: f64,
}
