use async_trait::async_trait;
use std::sync::Arc;

use bhm_scraper::config::Config;
use bhm_scraper::error::{Result, ScraperError};
use bhm_scraper::pipeline::Aggregator;
use bhm_scraper::storage::{FileStorage, InMemoryStorage, Storage};
use bhm_scraper::types::{Collector, RawRecord};

struct FixtureCollector {
    name: &'static str,
    records: Vec<RawRecord>,
}

#[async_trait]
impl Collector for FixtureCollector {
    fn source_name(&self) -> &'static str {
        self.name
    }

    async fn collect(&self) -> Result<Vec<RawRecord>> {
        Ok(self.records.clone())
    }
}

struct FailingCollector;

#[async_trait]
impl Collector for FailingCollector {
    fn source_name(&self) -> &'static str {
        "broken-source"
    }

    async fn collect(&self) -> Result<Vec<RawRecord>> {
        Err(ScraperError::Source {
            message: "connection refused".to_string(),
        })
    }
}

fn record(title: &str, date: &str, venue: &str) -> RawRecord {
    RawRecord {
        title: Some(title.to_string()),
        date: Some(date.to_string()),
        venue: Some(venue.to_string()),
        ..Default::default()
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.scraper.delay_ms = 1;
    config
}

#[tokio::test]
async fn near_duplicates_across_sources_collapse_into_one_event() {
    let site_a = FixtureCollector {
        name: "siteA",
        records: vec![record("Jazz Night", "2026-03-01", "The Venue")],
    };
    let site_b = FixtureCollector {
        name: "siteB",
        records: vec![record("jazz night!", "2026-03-01", "the venue")],
    };

    let storage = Arc::new(InMemoryStorage::new());
    let aggregator = Aggregator::new(
        vec![Box::new(site_a), Box::new(site_b)],
        test_config(),
        storage,
    );

    let document = aggregator.run().await.unwrap();

    assert_eq!(document.metadata.total_events, 1);
    assert_eq!(document.all_events.len(), 1);
    assert_eq!(document.all_events[0].sources, vec!["siteA", "siteB"]);

    let results = &document.metadata.scraping_results;
    assert_eq!(results.scraped["siteA"], 1);
    assert_eq!(results.scraped["siteB"], 1);
    assert_eq!(results.normalized, 2);
    assert_eq!(results.deduplicated, 1);
    assert_eq!(results.final_count, 1);
}

#[tokio::test]
async fn failing_collector_contributes_zero_records_and_cycle_continues() {
    let working = FixtureCollector {
        name: "working-source",
        records: vec![record("Spring Market", "2026-04-11", "Railroad Park")],
    };

    let storage = Arc::new(InMemoryStorage::new());
    let aggregator = Aggregator::new(
        vec![Box::new(FailingCollector), Box::new(working)],
        test_config(),
        storage,
    );

    let document = aggregator.run().await.unwrap();

    assert_eq!(document.metadata.total_events, 1);
    let results = &document.metadata.scraping_results;
    assert_eq!(results.scraped["broken-source"], 0);
    assert_eq!(results.scraped["working-source"], 1);
    assert_eq!(
        document.metadata.sources,
        vec!["broken-source", "working-source"]
    );
}

#[tokio::test]
async fn undated_events_are_dropped_but_counted_through_the_stats() {
    let source = FixtureCollector {
        name: "mixed-source",
        records: vec![
            record("Dated Show", "2026-03-01", "Hall"),
            RawRecord {
                title: Some("Date TBA Show".to_string()),
                date: Some("to be announced".to_string()),
                ..Default::default()
            },
        ],
    };

    let storage = Arc::new(InMemoryStorage::new());
    let aggregator = Aggregator::new(vec![Box::new(source)], test_config(), storage);

    let document = aggregator.run().await.unwrap();

    let results = &document.metadata.scraping_results;
    assert_eq!(results.normalized, 2);
    assert_eq!(results.final_count, 1);
    assert_eq!(document.all_events[0].event.title, "Dated Show");
}

#[tokio::test]
async fn catalog_orders_dates_and_times_with_null_time_last() {
    let source = FixtureCollector {
        name: "order-source",
        records: vec![
            RawRecord {
                time: Some("9 PM".to_string()),
                ..record("Late Show", "2026-03-02", "Hall")
            },
            RawRecord {
                time: Some("2 PM".to_string()),
                ..record("Matinee", "2026-03-02", "Hall")
            },
            record("Timeless", "2026-03-02", "Hall"),
            record("Day Before", "2026-03-01", "Hall"),
        ],
    };

    let storage = Arc::new(InMemoryStorage::new());
    let aggregator = Aggregator::new(vec![Box::new(source)], test_config(), storage);

    let document = aggregator.run().await.unwrap();

    let keys: Vec<&String> = document.events_by_date.keys().collect();
    assert_eq!(keys, ["2026-03-01", "2026-03-02"]);
    assert_eq!(
        document.metadata.date_range.earliest.as_deref(),
        Some("2026-03-01")
    );
    assert_eq!(
        document.metadata.date_range.latest.as_deref(),
        Some("2026-03-02")
    );

    let day_two: Vec<&str> = document.events_by_date["2026-03-02"]
        .iter()
        .map(|e| e.event.title.as_str())
        .collect();
    assert_eq!(day_two, ["Matinee", "Late Show", "Timeless"]);
}

#[tokio::test]
async fn snapshot_is_persisted_wholesale_and_reloadable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.json");
    let storage: Arc<FileStorage> = Arc::new(FileStorage::new(&path));

    let source = FixtureCollector {
        name: "persist-source",
        records: vec![record("Persisted Show", "2026-03-01", "Hall")],
    };
    let aggregator = Aggregator::new(vec![Box::new(source)], test_config(), storage.clone());

    let document = aggregator.run().await.unwrap();
    assert!(path.exists());

    let reloaded = storage.load_catalog().await.unwrap().unwrap();
    assert_eq!(reloaded, document);

    // The stored JSON uses the external contract's key spellings
    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(json["metadata"]["scrapingResults"]["final"].is_number());
    assert!(json["eventsByDate"]["2026-03-01"].is_array());
    assert!(json["allEvents"][0]["location"]["zipCode"].is_string());
}
