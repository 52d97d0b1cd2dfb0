pub mod date;
pub mod price;
pub mod time;

use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::LocationDefaults;
use crate::domain::{CanonicalEvent, Location};
use crate::types::RawRecord;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static pattern"));

const DESCRIPTION_LIMIT: usize = 500;
const ID_LIMIT: usize = 100;

/// Pure, stateless mapping from a raw per-source record to the canonical
/// schema. Holds only immutable context (the reference date anchoring
/// relative date text, and the configured location defaults), so it is safe
/// to call from anywhere.
pub struct Normalizer {
    reference_date: NaiveDate,
    defaults: LocationDefaults,
}

impl Normalizer {
    pub fn new(defaults: LocationDefaults) -> Self {
        Self {
            reference_date: Utc::now().date_naive(),
            defaults,
        }
    }

    /// Pins the reference date used for relative inputs like "Monday".
    /// Tests inject a fixed date here for determinism.
    pub fn with_reference_date(defaults: LocationDefaults, reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            defaults,
        }
    }

    /// Maps one raw record into a canonical event. Sub-parser failures
    /// degrade their own field to null; this function itself cannot fail.
    pub fn normalize(&self, record: &RawRecord, source: &str) -> CanonicalEvent {
        CanonicalEvent {
            id: generate_id(record, source),
            title: clean_title(record.title.as_deref().unwrap_or("Untitled Event")),
            description: clean_description(record.description.as_deref().unwrap_or("")),
            date: record
                .date
                .as_deref()
                .and_then(|text| date::normalize_date(text, self.reference_date)),
            time: record.time.as_deref().and_then(time::normalize_time),
            end_date: record
                .end_date
                .as_deref()
                .and_then(|text| date::normalize_date(text, self.reference_date)),
            end_time: record.end_time.as_deref().and_then(time::normalize_time),
            location: Location {
                venue: record.venue.clone().unwrap_or_default(),
                address: record.address.clone().unwrap_or_default(),
                city: record
                    .city
                    .clone()
                    .unwrap_or_else(|| self.defaults.city.clone()),
                state: record
                    .state
                    .clone()
                    .unwrap_or_else(|| self.defaults.state.clone()),
                zip_code: record.zip_code.clone().unwrap_or_default(),
            },
            category: record
                .category
                .clone()
                .unwrap_or_else(|| "General".to_string()),
            price: price::normalize_price(record.price.as_deref()),
            image: record.image.clone().unwrap_or_default(),
            url: record.url.clone().unwrap_or_default(),
            source: source.to_string(),
            scraped_at: Utc::now(),
        }
    }
}

/// Deterministic `source-title-digits` id, truncated to 100 chars.
/// Built from the raw fields so the same (title, date, source) triple always
/// yields the same id regardless of how normalization resolves the date.
pub fn generate_id(record: &RawRecord, source: &str) -> String {
    let title = record.title.as_deref().unwrap_or("").to_lowercase();
    let title = WHITESPACE.replace_all(&title, "-");
    let digits: String = record
        .date
        .as_deref()
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    format!("{}-{}-{}", source, title, digits)
        .chars()
        .take(ID_LIMIT)
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim and collapse internal whitespace.
pub fn clean_title(title: &str) -> String {
    collapse_whitespace(title)
}

/// Trim, collapse internal whitespace, cap the length.
pub fn clean_description(description: &str) -> String {
    collapse_whitespace(description)
        .chars()
        .take(DESCRIPTION_LIMIT)
        .collect()
}
