//! CSV readers for the restaurant and review exports.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDateTime;
use csv::StringRecord;
use tracing::{info, warn};

use crate::error::LoadError;
use crate::models::{RestaurantRecord, ReviewRecord};
use crate::parse;

pub const DEFAULT_DISTRICT: &str = "Frankfurt City";
pub const DEFAULT_PRICE: &str = "20-30";

const NAME_COLUMNS: &[&str] = &["name", "restaurant_name", "title"];
const RATING_COLUMNS: &[&str] = &["rating"];
const REVIEW_COUNT_COLUMNS: &[&str] = &["review_count", "review_co", "reviews", "rev_count"];
const DISTRICT_COLUMNS: &[&str] = &["district"];
const PRICE_COLUMNS: &[&str] = &["price"];
const WEBSITE_COLUMNS: &[&str] = &["website"];
const PHONE_COLUMNS: &[&str] = &["phone"];
const URL_COLUMNS: &[&str] = &["page_url", "url", "link"];

const REVIEW_DATE_COLUMNS: &[&str] = &["review_date", "date", "review_time", "reviewer_data"];
const REVIEW_RATING_COLUMNS: &[&str] = &["review_rating", "rating", "stars", "review_c"];
const RESPONSE_TEXT_COLUMNS: &[&str] = &["owner_response_content"];
const RESPONSE_FLAG_COLUMNS: &[&str] = &["owner_response"];

#[derive(Debug, Clone)]
pub struct RestaurantTable {
    pub records: Vec<RestaurantRecord>,
    pub has_url_column: bool,
}

#[derive(Debug, Clone)]
pub struct ReviewTable {
    pub records: Vec<ReviewRecord>,
    pub has_url_column: bool,
}

struct CsvSource {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl CsvSource {
    fn read(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

        let headers = reader
            .headers()
            .map_err(|source| LoadError::Csv {
                path: path.to_path_buf(),
                source,
            })?
            .iter()
            .map(|header| header.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (line, result) in reader.records().enumerate() {
            match result {
                Ok(row) => rows.push(row),
                Err(error) => warn!(
                    path = %path.display(),
                    row = line + 1,
                    %error,
                    "skipping unreadable CSV row"
                ),
            }
        }

        Ok(Self { headers, rows })
    }

    fn column(&self, aliases: &[&str]) -> Option<usize> {
        parse::find_column(&self.headers, aliases)
    }
}

fn cell(row: &StringRecord, column: Option<usize>) -> &str {
    column.and_then(|index| row.get(index)).unwrap_or("")
}

pub fn load_restaurants(path: &Path) -> Result<RestaurantTable, LoadError> {
    let source = CsvSource::read(path)?;

    let name_col = source
        .column(NAME_COLUMNS)
        .ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: "name",
        })?;
    let rating_col = source.column(RATING_COLUMNS);
    let count_col = source.column(REVIEW_COUNT_COLUMNS);
    let district_col = source.column(DISTRICT_COLUMNS);
    let price_col = source.column(PRICE_COLUMNS);
    let website_col = source.column(WEBSITE_COLUMNS);
    let phone_col = source.column(PHONE_COLUMNS);
    let url_col = source.column(URL_COLUMNS);

    let mut records = Vec::with_capacity(source.rows.len());
    let mut unnamed = 0usize;

    for row in &source.rows {
        let Some(name) = parse::present(cell(row, Some(name_col))) else {
            unnamed += 1;
            continue;
        };

        let price = match price_col {
            Some(_) => parse::present(cell(row, price_col)),
            None => Some(DEFAULT_PRICE.to_string()),
        };

        records.push(RestaurantRecord {
            name,
            rating: parse::parse_rating(cell(row, rating_col)),
            review_count: parse::parse_count(cell(row, count_col)),
            district: parse::present(cell(row, district_col))
                .unwrap_or_else(|| DEFAULT_DISTRICT.to_string()),
            price,
            has_website: parse::present(cell(row, website_col)).is_some(),
            has_phone: parse::present(cell(row, phone_col)).is_some(),
            url: parse::present(cell(row, url_col)),
            slug: None,
        });
    }

    if unnamed > 0 {
        warn!(path = %path.display(), unnamed, "dropped restaurant rows without a name");
    }
    info!(
        path = %path.display(),
        rows = records.len(),
        url_column = url_col.is_some(),
        "loaded restaurants"
    );

    Ok(RestaurantTable {
        records,
        has_url_column: url_col.is_some(),
    })
}

/// Loads reviews, resolving relative dates against `now`.
pub fn load_reviews(path: &Path, now: NaiveDateTime) -> Result<ReviewTable, LoadError> {
    let source = CsvSource::read(path)?;

    let date_col = source.column(REVIEW_DATE_COLUMNS);
    let rating_col = source.column(REVIEW_RATING_COLUMNS);
    let text_col = source.column(RESPONSE_TEXT_COLUMNS);
    let flag_col = source.column(RESPONSE_FLAG_COLUMNS);
    let url_col = source.column(URL_COLUMNS);

    let records: Vec<ReviewRecord> = source
        .rows
        .iter()
        .map(|row| ReviewRecord {
            rating: match rating_col {
                Some(_) => parse::parse_review_rating(cell(row, rating_col)),
                None => parse::DEFAULT_REVIEW_RATING,
            },
            review_date: match date_col {
                Some(_) => parse::parse_review_date(cell(row, date_col), now),
                None => now,
            },
            owner_response_text: parse::present(cell(row, text_col)),
            owner_response_flag: parse::present(cell(row, flag_col)),
            url: parse::present(cell(row, url_col)),
            slug: None,
        })
        .collect();

    info!(
        path = %path.display(),
        rows = records.len(),
        url_column = url_col.is_some(),
        date_column = date_col.is_some(),
        "loaded reviews"
    );

    Ok(ReviewTable {
        records,
        has_url_column: url_col.is_some(),
    })
}
