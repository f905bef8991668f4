//! Cell-level normalizers for scraped restaurant and review tables.
//!
//! None of these fail: text that cannot be interpreted collapses to a fixed
//! policy default so one bad cell never sinks a load.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

/// Review dates that match no known form are placed this far in the past.
pub const UNKNOWN_DATE_AGE_DAYS: i64 = 90;

/// Rating given to a review whose star cell cannot be read.
pub const DEFAULT_REVIEW_RATING: f64 = 5.0;

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)").expect("decimal pattern should compile"));

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digits pattern should compile"));

static EDITED_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^bearbeitet:\s*").expect("edited prefix pattern should compile")
});

const ABSOLUTE_DATE_FORMATS: [&str; 3] = ["%d.%m.%Y", "%Y-%m-%d", "%d/%m/%Y"];

/// Returns the trimmed cell when it carries a value.
///
/// Empty cells and the literal `nan` left behind by spreadsheet exports both
/// count as absent.
pub fn present(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Case-insensitive header lookup; the first alias that exists wins.
pub fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|alias| {
        headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(alias))
    })
}

/// Parses a star rating such as `4,6`, `4.6 Sterne` or `\u{a0}4,6`.
pub fn parse_rating(raw: &str) -> f64 {
    let cleaned = raw.replace(',', ".").replace('\u{a0}', "");
    DECIMAL
        .captures(&cleaned)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Parses a review count such as `1.234 Rezensionen` or `(89)`.
///
/// The first two digit runs are joined so a single thousands separator
/// survives; anything without digits is zero.
pub fn parse_count(raw: &str) -> u64 {
    let joined: String = DIGITS
        .find_iter(raw)
        .take(2)
        .map(|m| m.as_str())
        .collect();
    joined.parse().unwrap_or(0)
}

/// Parses a single review's star cell, defaulting to five stars.
pub fn parse_review_rating(raw: &str) -> f64 {
    raw.replace('\u{a0}', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(DEFAULT_REVIEW_RATING)
}

/// Resolves a review date relative to `now`.
///
/// Understands the German relative phrases Google Maps renders
/// ("vor 3 Tagen", "vor einem Monat", "gestern", optionally prefixed with
/// "Bearbeitet: ") and falls back to `DD.MM.YYYY`, `YYYY-MM-DD` and
/// `DD/MM/YYYY`. Anything else lands 90 days before `now`.
pub fn parse_review_date(raw: &str, now: NaiveDateTime) -> NaiveDateTime {
    let lowered = raw.trim().to_lowercase();
    let text = EDITED_PREFIX.replace(&lowered, "");
    let text = text.trim();

    // Digits too long for an i64 make the phrase unreadable, not "one".
    let n = match DIGITS.find(text) {
        Some(m) => m.as_str().parse::<i64>().ok(),
        None => Some(1),
    };
    let days = |per_unit: i64| {
        n.and_then(|n| n.checked_mul(per_unit))
            .and_then(Duration::try_days)
    };

    let relative = if text.contains("einem monat") {
        Some(Duration::try_days(30))
    } else if text.contains("monat") {
        Some(days(30))
    } else if text.contains("einem jahr") {
        Some(Duration::try_days(365))
    } else if text.contains("jahr") {
        Some(days(365))
    } else if text.contains("einer woche") {
        Some(Duration::try_days(7))
    } else if text.contains("woche") {
        Some(days(7))
    } else if text.contains("tag") {
        Some(days(1))
    } else if text.contains("stunde") {
        Some(n.and_then(Duration::try_hours))
    } else if text.contains("gestern") {
        Some(Duration::try_days(1))
    } else if text.contains("heute") {
        Some(Some(Duration::zero()))
    } else {
        None
    };

    if let Some(offset) = relative {
        return offset
            .and_then(|offset| now.checked_sub_signed(offset))
            .unwrap_or_else(|| unknown_date(now));
    }

    ABSOLUTE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
        .unwrap_or_else(|| unknown_date(now))
}

fn unknown_date(now: NaiveDateTime) -> NaiveDateTime {
    Duration::try_days(UNKNOWN_DATE_AGE_DAYS)
        .and_then(|age| now.checked_sub_signed(age))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn rating_handles_decimal_comma_and_padding() {
        assert_eq!(parse_rating("4,5"), 4.5);
        assert_eq!(parse_rating("\u{a0}4,7\u{a0}Sterne"), 4.7);
        assert_eq!(parse_rating("4.6 (1,234)"), 4.6);
        assert_eq!(parse_rating("no rating"), 0.0);
        assert_eq!(parse_rating(""), 0.0);
    }

    #[test]
    fn count_joins_thousands_groups() {
        assert_eq!(parse_count("1.234 Rezensionen"), 1234);
        assert_eq!(parse_count("(89)"), 89);
        assert_eq!(parse_count("keine"), 0);
        assert_eq!(parse_count("1.234.567"), 1234);
    }

    #[test]
    fn review_rating_defaults_to_five_stars() {
        assert_eq!(parse_review_rating("3"), 3.0);
        assert_eq!(parse_review_rating("\u{a0}4 "), 4.0);
        assert_eq!(parse_review_rating("fünf"), 5.0);
        assert_eq!(parse_review_rating(""), 5.0);
    }

    #[test]
    fn relative_german_dates() {
        let now = fixed_now();
        assert_eq!(parse_review_date("vor 3 Tagen", now), now - Duration::days(3));
        assert_eq!(parse_review_date("vor einem Tag", now), now - Duration::days(1));
        assert_eq!(parse_review_date("vor einer Woche", now), now - Duration::days(7));
        assert_eq!(parse_review_date("vor 2 Wochen", now), now - Duration::days(14));
        assert_eq!(parse_review_date("vor 4 Monaten", now), now - Duration::days(120));
        assert_eq!(parse_review_date("vor einem Jahr", now), now - Duration::days(365));
        assert_eq!(parse_review_date("vor 2 Jahren", now), now - Duration::days(730));
        assert_eq!(parse_review_date("vor 5 Stunden", now), now - Duration::hours(5));
        assert_eq!(parse_review_date("gestern", now), now - Duration::days(1));
        assert_eq!(parse_review_date("Heute", now), now);
    }

    #[test]
    fn edited_prefix_is_stripped() {
        let now = fixed_now();
        assert_eq!(
            parse_review_date("Bearbeitet: vor einem Monat", now),
            now - Duration::days(30)
        );
        assert_eq!(
            parse_review_date("Bearbeitet:   vor 6 Tagen", now),
            now - Duration::days(6)
        );
    }

    #[test]
    fn absolute_dates_fall_back_to_formats() {
        let now = fixed_now();
        let march = NaiveDate::from_ymd_opt(2024, 3, 15)
            .map(|date| date.and_time(NaiveTime::MIN))
            .expect("valid date");
        assert_eq!(parse_review_date("15.03.2024", now), march);
        assert_eq!(parse_review_date("2024-03-15", now), march);
        assert_eq!(parse_review_date("15/03/2024", now), march);
    }

    #[test]
    fn garbage_dates_land_ninety_days_back() {
        let now = fixed_now();
        assert_eq!(parse_review_date("irgendwann", now), now - Duration::days(90));
        assert_eq!(parse_review_date("", now), now - Duration::days(90));
    }

    #[test]
    fn out_of_range_relative_dates_land_ninety_days_back() {
        let now = fixed_now();
        let fallback = now - Duration::days(90);
        assert_eq!(parse_review_date("vor 1000000 Jahren", now), fallback);
        assert_eq!(parse_review_date("vor 9999999999999 Tagen", now), fallback);
        assert_eq!(parse_review_date("vor 9999999999999 Stunden", now), fallback);
        assert_eq!(
            parse_review_date("vor 99999999999999999999 Monaten", now),
            fallback
        );
    }

    #[test]
    fn column_lookup_is_case_insensitive_and_ordered() {
        let headers = vec!["Name".to_string(), "RATING".to_string(), "reviews".to_string()];
        assert_eq!(find_column(&headers, &["rating"]), Some(1));
        assert_eq!(find_column(&headers, &["review_count", "reviews"]), Some(2));
        assert_eq!(find_column(&headers, &["website"]), None);
    }

    #[test]
    fn present_treats_nan_as_missing() {
        assert_eq!(present("  Antwort vom Inhaber "), Some("Antwort vom Inhaber".to_string()));
        assert_eq!(present("NaN"), None);
        assert_eq!(present("   "), None);
    }
}
