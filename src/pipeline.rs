use chrono::Utc;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::catalog;
use crate::config::Config;
use crate::dedup;
use crate::domain::{CatalogDocument, ScrapeStats};
use crate::error::Result;
use crate::normalize::Normalizer;
use crate::storage::Storage;
use crate::types::Collector;

/// Orchestrates one scrape cycle: collect from every source in sequence,
/// normalize, deduplicate, assemble, persist. Sources run strictly one after
/// another with a rate-limiting pause in between; a failing source is logged
/// and contributes zero records while the rest of the cycle proceeds.
pub struct Aggregator {
    collectors: Vec<Box<dyn Collector>>,
    config: Config,
    storage: Arc<dyn Storage>,
}

impl Aggregator {
    pub fn new(
        collectors: Vec<Box<dyn Collector>>,
        config: Config,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            collectors,
            config,
            storage,
        }
    }

    /// Runs one full cycle and returns the freshly built catalog document.
    pub async fn run(&self) -> Result<CatalogDocument> {
        let span = tracing::info_span!("scrape_run", run_id = %Uuid::new_v4());
        self.run_cycle().instrument(span).await
    }

    async fn run_cycle(&self) -> Result<CatalogDocument> {
        let t_run = Instant::now();
        info!("Starting scrape cycle for {} sources", self.collectors.len());
        counter!("bhm_scrape_runs_total").increment(1);

        let normalizer = Normalizer::new(self.config.location.clone());
        let mut all_events = Vec::new();
        let mut stats = ScrapeStats::default();
        let mut source_names = Vec::with_capacity(self.collectors.len());

        for (i, collector) in self.collectors.iter().enumerate() {
            let name = collector.source_name();
            source_names.push(name.to_string());

            let t_fetch = Instant::now();
            match collector.collect().await {
                Ok(records) => {
                    histogram!("bhm_fetch_duration_seconds", "source" => name)
                        .record(t_fetch.elapsed().as_secs_f64());
                    counter!("bhm_records_scraped_total", "source" => name)
                        .increment(records.len() as u64);
                    info!(source = name, count = records.len(), "Fetched records");

                    stats.scraped.insert(name.to_string(), records.len());
                    all_events.extend(records.iter().map(|r| normalizer.normalize(r, name)));
                }
                Err(e) => {
                    // Isolation boundary: the source yields nothing, the
                    // cycle keeps going
                    error!(source = name, "Collector failed: {}", e);
                    counter!("bhm_collector_errors_total", "source" => name).increment(1);
                    stats.scraped.insert(name.to_string(), 0);
                }
            }

            // Rate-limiting pause between sources, never parallel fan-out
            if i + 1 < self.collectors.len() {
                tokio::time::sleep(Duration::from_millis(self.config.scraper.delay_ms)).await;
            }
        }

        stats.normalized = all_events.len();
        info!("Normalized {} events across all sources", stats.normalized);

        let merged = dedup::merge_duplicates(all_events);
        stats.deduplicated = stats.normalized - merged.len();
        counter!("bhm_duplicates_removed_total").increment(stats.deduplicated as u64);
        info!("Removed {} duplicates", stats.deduplicated);

        stats.timestamp = Some(Utc::now());
        let document = catalog::assemble(merged, stats, source_names);
        info!("Final event count: {}", document.metadata.total_events);

        self.storage.save_catalog(&document).await?;

        histogram!("bhm_scrape_duration_seconds").record(t_run.elapsed().as_secs_f64());
        Ok(document)
    }
}
