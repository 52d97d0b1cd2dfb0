use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, NaiveTime};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::server::AppState;

/// Daily scheduled scrape: sleeps until the next local occurrence of `hour`,
/// rebuilds the catalog, replaces the cached snapshot, repeats. Runs as a
/// background task for the lifetime of the serve command.
pub async fn run_daily_schedule(state: Arc<AppState>, hour: u32) {
    info!("Daily scraping scheduled for {:02}:00", hour % 24);
    loop {
        let wait = duration_until_next(hour, Local::now().naive_local());
        info!("Next scheduled scrape in {}s", wait.as_secs());
        tokio::time::sleep(wait).await;

        info!("Running scheduled scrape");
        match state.aggregator.run().await {
            Ok(document) => {
                *state.catalog.write().await = Some(document);
                info!("Scheduled scrape complete");
            }
            Err(e) => error!("Scheduled scrape failed: {}", e),
        }
    }
}

/// Time until the next occurrence of `hour:00`, strictly in the future.
fn duration_until_next(hour: u32, now: NaiveDateTime) -> Duration {
    let target_time = NaiveTime::from_hms_opt(hour % 24, 0, 0).unwrap_or_default();
    let mut target = now.date().and_time(target_time);
    if target <= now {
        target += ChronoDuration::days(1);
    }
    (target - now).to_std().unwrap_or_default()
}
