use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::collectors::{absolutize, select_attr, select_text, ALABAMA_THEATRE_SOURCE};
use crate::error::Result;
use crate::types::{Collector, RawRecord};

const BASE_URL: &str = "https://alabamatheatre.com";
const EVENTS_URL: &str = "https://alabamatheatre.com/events/";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Collector for the Alabama Theatre events calendar, a WordPress site using
/// the tribe-events plugin markup.
pub struct AlabamaTheatreCollector {
    client: reqwest::Client,
}

impl AlabamaTheatreCollector {
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
        let row_selector = Selector::parse(
            ".tribe-events-calendar-list__event-row, article.tribe-events-calendar-list__event",
        )
        .unwrap();

        let mut events = Vec::new();
        for element in document.select(&row_selector) {
            if let Some(event) = self.parse_event_item(&element) {
                events.push(event);
            }
        }

        debug!("Parsed {} event rows", events.len());
        events
    }

    fn parse_event_item(&self, element: &ElementRef) -> Option<RawRecord> {
        let title = select_text(
            element,
            &[
                ".tribe-events-calendar-list__event-title-link",
                ".tribe-events-calendar-list__event-title",
                "h3 a",
                "h4 a",
            ],
        )?;

        let date = select_text(
            element,
            &[
                ".tribe-event-date-start",
                ".tribe-events-calendar-list__event-datetime",
                "time",
            ],
        );
        let time = select_text(element, &[".tribe-events-start-time", ".tribe-event-time"]);
        let description = select_text(
            element,
            &[".tribe-events-calendar-list__event-description", "p"],
        );

        let image = select_attr(element, &["img"], "src").map(|src| absolutize(BASE_URL, &src));
        let url = select_attr(element, &["a"], "href").map(|href| absolutize(BASE_URL, &href));

        Some(RawRecord {
            title: Some(title),
            date,
            time,
            venue: Some("Alabama Theatre".to_string()),
            address: Some("1817 3rd Ave N".to_string()),
            city: Some("Birmingham".to_string()),
            state: Some("AL".to_string()),
            zip_code: Some("35203".to_string()),
            category: Some("Entertainment".to_string()),
            image,
            url,
            description,
            ..Default::default()
        })
    }
}

#[async_trait::async_trait]
impl Collector for AlabamaTheatreCollector {
    fn source_name(&self) -> &'static str {
        ALABAMA_THEATRE_SOURCE
    }

    #[instrument(skip(self))]
    async fn collect(&self) -> Result<Vec<RawRecord>> {
        debug!("Fetching {}", EVENTS_URL);
        let html = self
            .client
            .get(EVENTS_URL)
            .header("Accept", "text/html,application/xhtml+xml")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let events = self.extract_events(&html);
        info!("Found {} Alabama Theatre events", events.len());
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <div class="tribe-events-calendar-list">
          <div class="tribe-events-calendar-list__event-row">
            <time class="tribe-event-date-start">January 15, 2026</time>
            <span class="tribe-events-start-time">8:00 PM</span>
            <h3><a class="tribe-events-calendar-list__event-title-link"
                   href="/event/organ-concert/">Mighty Wurlitzer Organ Concert</a></h3>
            <div class="tribe-events-calendar-list__event-description">
              A night with the Mighty Wurlitzer.
            </div>
            <img src="/img/wurlitzer.jpg" />
          </div>
          <div class="tribe-events-calendar-list__event-row">
            <h3><a class="tribe-events-calendar-list__event-title-link"
                   href="https://tickets.example.com/e/2">Classic Film Series</a></h3>
          </div>
          <div class="tribe-events-calendar-list__event-row"></div>
        </div>
    "#;

    #[test]
    fn extracts_fully_populated_rows() {
        let collector = AlabamaTheatreCollector::new(5);
        let events = collector.extract_events(FIXTURE);

        assert_eq!(events.len(), 2);
        let first = &events[0];
        assert_eq!(first.title.as_deref(), Some("Mighty Wurlitzer Organ Concert"));
        assert_eq!(first.date.as_deref(), Some("January 15, 2026"));
        assert_eq!(first.time.as_deref(), Some("8:00 PM"));
        assert_eq!(
            first.url.as_deref(),
            Some("https://alabamatheatre.com/event/organ-concert/")
        );
        assert_eq!(
            first.image.as_deref(),
            Some("https://alabamatheatre.com/img/wurlitzer.jpg")
        );
        assert_eq!(first.venue.as_deref(), Some("Alabama Theatre"));
        assert_eq!(first.zip_code.as_deref(), Some("35203"));
    }

    #[test]
    fn rows_without_a_title_are_skipped() {
        let collector = AlabamaTheatreCollector::new(5);
        let events = collector.extract_events(FIXTURE);
        assert!(events.iter().all(|e| e.title.is_some()));
    }

    #[test]
    fn absolute_ticket_urls_are_untouched() {
        let collector = AlabamaTheatreCollector::new(5);
        let events = collector.extract_events(FIXTURE);
        assert_eq!(
            events[1].url.as_deref(),
            Some("https://tickets.example.com/e/2")
        );
    }
}
