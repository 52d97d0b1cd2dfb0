use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The validated, schema-normalized representation of one event from one
/// source. `date` and `time` hold already-normalized `yyyy-MM-dd` / `HH:mm`
/// strings (or nothing) because every downstream comparison — duplicate
/// detection, catalog ordering, the upcoming filter — is defined over those
/// fixed-width formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEvent {
    /// Deterministic `source-title-digits` id, truncated to 100 chars
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
    pub location: Location,
    pub category: String,
    pub price: Price,
    pub image: String,
    pub url: String,
    pub source: String,
    pub scraped_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub venue: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: String,
    pub is_free: bool,
}

impl Default for Price {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            currency: "USD".to_string(),
            is_free: false,
        }
    }
}

impl Price {
    pub fn free() -> Self {
        Self {
            min: Some(0.0),
            max: Some(0.0),
            currency: "USD".to_string(),
            is_free: true,
        }
    }
}

/// A canonical event enriched by deduplication: the surviving record plus the
/// names of every source that reported it and any URLs that disagreed with
/// the kept one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedEvent {
    #[serde(flatten)]
    pub event: CanonicalEvent,
    pub sources: Vec<String>,
    pub alternate_urls: Vec<AlternateUrl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternateUrl {
    pub source: String,
    pub url: String,
}

/// Per-stage counts for one scrape cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapeStats {
    /// Records fetched per source; a failed source records 0
    pub scraped: BTreeMap<String, usize>,
    /// Canonical events produced by normalization, across all sources
    pub normalized: usize,
    /// Near-duplicate records absorbed into merged events
    pub deduplicated: usize,
    /// Events surviving the null-date filter into the catalog
    #[serde(rename = "final")]
    pub final_count: usize,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMetadata {
    pub last_updated: DateTime<Utc>,
    pub total_events: usize,
    pub date_range: DateRange,
    pub sources: Vec<String>,
    pub scraping_results: ScrapeStats,
}

/// The full, replace-in-place snapshot of all valid, deduplicated events for
/// one scrape cycle. The sole artifact consumed by serving and persistence;
/// rebuilt from scratch each run, never incrementally patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    pub metadata: CatalogMetadata,
    /// Ascending ISO date keys; within a date, ascending time with null last
    pub events_by_date: BTreeMap<String, Vec<MergedEvent>>,
    pub all_events: Vec<MergedEvent>,
}
