use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// A date-parsing strategy: free text in, calendar date out, or nothing.
type Strategy = fn(&str, NaiveDate) -> Option<NaiveDate>;

/// Tried in order; the order is behavior. ISO stamps win over weekday words,
/// weekday words win over textual patterns.
const STRATEGIES: &[Strategy] = &[
    parse_iso_timestamp,
    parse_weekday_name,
    parse_textual_patterns,
];

/// Resolves arbitrary date text to an ISO `yyyy-MM-dd` string.
///
/// `today` anchors relative inputs like bare weekday names; callers inject a
/// fixed date in tests. A parse failure is a `None`, never an error.
pub fn normalize_date(text: &str, today: NaiveDate) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(trimmed, today))
        .map(|date| date.format("%Y-%m-%d").to_string())
}

/// ISO-8601 / RFC 3339 timestamps, e.g. "2026-03-01T20:00:00Z".
fn parse_iso_timestamp(text: &str, _today: NaiveDate) -> Option<NaiveDate> {
    if !text.contains('T') && !text.contains('Z') {
        return None;
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(text, format) {
            return Some(stamp.date());
        }
    }
    None
}

const DAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Bare weekday names resolve to the next occurrence strictly after `today`.
/// When `today` already falls on the named weekday, the result is a full week
/// out, never `today` itself.
fn parse_weekday_name(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lowered = text.to_lowercase();
    let target = DAY_NAMES.iter().position(|day| lowered.contains(day))? as i64;
    let current = today.weekday().num_days_from_sunday() as i64;

    let mut days_until = target - current;
    if days_until <= 0 {
        days_until += 7;
    }

    today.checked_add_signed(Duration::days(days_until))
}

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    const MONTHS: &str = "January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Oct|Nov|Dec";
    [
        // "January 15, 2026" or "Jan 15, 2026"
        format!(r"(?i)(?:{MONTHS})[,\s]+\d{{1,2}}[,\s]+\d{{4}}"),
        // "15 January 2026" or "15 Jan 2026"
        format!(r"(?i)\d{{1,2}}[,\s]+(?:{MONTHS})[,\s]+\d{{4}}"),
        // "2026-01-15"
        r"\d{4}-\d{2}-\d{2}".to_string(),
        // "01/15/2026"
        r"\d{1,2}/\d{1,2}/\d{4}".to_string(),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("static date pattern"))
    .collect()
});

/// Formats tried against a matched pattern, first success wins.
const PARSE_FORMATS: [&str; 6] = [
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
];

/// Textual date patterns embedded anywhere in the input.
fn parse_textual_patterns(text: &str, _today: NaiveDate) -> Option<NaiveDate> {
    for pattern in DATE_PATTERNS.iter() {
        if let Some(matched) = pattern.find(text) {
            for format in PARSE_FORMATS {
                if let Ok(date) = NaiveDate::parse_from_str(matched.as_str(), format) {
                    return Some(date);
                }
            }
        }
    }
    None
}
