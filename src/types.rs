use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One scraped listing, straight off a source page or feed.
///
/// Every field is optional: sources disagree wildly about which fields they
/// carry and how they spell them. [`RawRecord::from_value`] applies the
/// field-name precedence chains used by loosely-typed feeds, so collectors
/// working from arbitrary JSON all validate through the same adapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRecord {
    pub title: Option<String>,
    /// Free-form date text, e.g. "January 15, 2026", "Monday", an ISO stamp
    pub date: Option<String>,
    pub time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
    pub venue: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub category: Option<String>,
    /// Free-form price text, e.g. "$25 - $45", "Free admission"
    pub price: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

/// First non-empty string among the named keys.
fn pick(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| value.get(k))
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

impl RawRecord {
    /// Adapts a duck-typed JSON object into a typed record.
    ///
    /// Key precedence mirrors what event sites actually emit: Schema.org
    /// names (`startDate`, `location`), WordPress plugin names (`link`,
    /// `excerpt`) and plain names all land on the same field.
    pub fn from_value(value: &Value) -> Self {
        Self {
            title: pick(value, &["title", "name"]),
            date: pick(value, &["date", "startDate"]),
            time: pick(value, &["time", "startTime"]),
            end_date: pick(value, &["endDate"]),
            end_time: pick(value, &["endTime"]),
            venue: pick(value, &["venue", "location"]),
            address: pick(value, &["address"]),
            city: pick(value, &["city"]),
            state: pick(value, &["state"]),
            zip_code: pick(value, &["zipCode", "zip"]),
            category: pick(value, &["category", "type"]),
            price: pick(value, &["price"]),
            image: pick(value, &["image", "imageUrl"]),
            url: pick(value, &["url", "link"]),
            description: pick(value, &["description", "excerpt"]),
        }
    }
}

/// Core trait every event source must implement.
///
/// Collectors are thin I/O wrappers: they fetch and extract, the pipeline
/// owns normalization and everything after it. A collector failure is
/// isolated at the orchestration boundary and contributes zero records.
#[async_trait::async_trait]
pub trait Collector: Send + Sync {
    /// Unique identifier for this source, used in ids and provenance
    fn source_name(&self) -> &'static str;

    /// Fetch all currently listed events from this source
    async fn collect(&self) -> Result<Vec<RawRecord>>;
}
