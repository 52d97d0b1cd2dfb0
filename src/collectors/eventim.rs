use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::collectors::{absolutize, select_attr, select_text, EVENTIM_SOURCE};
use crate::error::Result;
use crate::types::{Collector, RawRecord};

const BASE_URL: &str = "https://www.eventim.us";
const LISTING_URL: &str = "https://www.eventim.us/city/birmingham-al-2634/";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Collector for the Eventim city listing page. Reads both the visible event
/// markup and any embedded Schema.org `application/ld+json` blocks, which
/// carry richer structured fields when present.
pub struct EventimCollector {
    client: reqwest::Client,
}

impl EventimCollector {
    pub fn new(timeout_seconds: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    fn extract_events(&self, html: &str) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        let mut events = Vec::new();

        let item_selector = Selector::parse("article, .event-item").unwrap();
        for element in document.select(&item_selector) {
            if let Some(event) = self.parse_event_item(&element) {
                events.push(event);
            }
        }

        let ld_json_selector = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();
        for script in document.select(&ld_json_selector) {
            let body = script.text().collect::<String>();
            match serde_json::from_str::<Value>(&body) {
                Ok(json) => {
                    if let Some(event) = parse_schema_org(&json) {
                        events.push(event);
                    }
                }
                Err(e) => debug!("Skipping unparseable ld+json block: {}", e),
            }
        }

        events
    }

    fn parse_event_item(&self, element: &ElementRef) -> Option<RawRecord> {
        let title = select_text(element, &["h1", "h2", "h3", ".title"])?;

        let date = select_text(element, &[".date", "time"])
            .or_else(|| select_attr(element, &["time"], "datetime"));
        let venue = select_text(element, &[".venue", ".location"]);
        let description = select_text(element, &[".description", "p"]);
        let image = select_attr(element, &["img"], "src").map(|src| absolutize(BASE_URL, &src));
        let url = select_attr(element, &["a"], "href").map(|href| absolutize(BASE_URL, &href));

        Some(RawRecord {
            title: Some(title),
            date,
            venue: venue.or_else(|| Some("Birmingham Area".to_string())),
            category: Some("Event".to_string()),
            image,
            url,
            description,
            ..Default::default()
        })
    }
}

/// Maps a Schema.org Event object onto a raw record. Non-Event documents are
/// ignored.
fn parse_schema_org(json: &Value) -> Option<RawRecord> {
    if json.get("@type").and_then(Value::as_str) != Some("Event") {
        return None;
    }

    let string_at = |keys: &[&str]| -> Option<String> {
        let mut current = json;
        for key in keys {
            current = current.get(key)?;
        }
        current
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Some(RawRecord {
        title: string_at(&["name"]),
        date: string_at(&["startDate"]),
        end_date: string_at(&["endDate"]),
        venue: string_at(&["location", "name"]),
        address: string_at(&["location", "address", "streetAddress"]),
        city: string_at(&["location", "address", "addressLocality"]),
        state: string_at(&["location", "address", "addressRegion"]),
        zip_code: string_at(&["location", "address", "postalCode"]),
        category: Some("Event".to_string()),
        // image appears both as a bare URL string and as an ImageObject
        image: string_at(&["image"]).or_else(|| string_at(&["image", "url"])),
        url: string_at(&["url"]),
        description: string_at(&["description"]),
        ..Default::default()
    })
}

#[async_trait::async_trait]
impl Collector for EventimCollector {
    fn source_name(&self) -> &'static str {
        EVENTIM_SOURCE
    }

    #[instrument(skip(self))]
    async fn collect(&self) -> Result<Vec<RawRecord>> {
        debug!("Fetching {}", LISTING_URL);
        let response = self
            .client
            .get(LISTING_URL)
            .header("Accept", "text/html,application/xhtml+xml")
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::FORBIDDEN {
            warn!("Eventim is blocking requests (403); yielding no records");
            return Ok(Vec::new());
        }

        let html = response.error_for_status()?.text().await?;
        let events = self.extract_events(&html);
        info!("Found {} Eventim events", events.len());
        Ok(events)
    }
}
