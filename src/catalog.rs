use chrono::Utc;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::{CatalogDocument, CatalogMetadata, DateRange, MergedEvent, ScrapeStats};

/// Builds the catalog document for one scrape cycle: drops undated events,
/// groups the rest by ISO date, orders within each date, and assembles the
/// metadata block. The result wholly replaces any previous snapshot.
pub fn assemble(
    merged: Vec<MergedEvent>,
    mut stats: ScrapeStats,
    sources: Vec<String>,
) -> CatalogDocument {
    // Events without a resolvable date cannot be placed in the date index;
    // they are counted out, not reported as errors
    let valid: Vec<MergedEvent> = merged
        .into_iter()
        .filter(|e| e.event.date.is_some())
        .collect();
    stats.final_count = valid.len();

    let events_by_date = group_by_date(&valid);
    let earliest = events_by_date.keys().next().cloned();
    let latest = events_by_date.keys().next_back().cloned();

    CatalogDocument {
        metadata: CatalogMetadata {
            last_updated: Utc::now(),
            total_events: valid.len(),
            date_range: DateRange { earliest, latest },
            sources,
            scraping_results: stats,
        },
        events_by_date,
        all_events: valid,
    }
}

/// ISO date -> events, ascending keys by construction. Within a date, events
/// sort ascending by time with timeless events after all timed ones.
fn group_by_date(events: &[MergedEvent]) -> BTreeMap<String, Vec<MergedEvent>> {
    let mut grouped: BTreeMap<String, Vec<MergedEvent>> = BTreeMap::new();

    for event in events {
        if let Some(date) = &event.event.date {
            grouped.entry(date.clone()).or_default().push(event.clone());
        }
    }

    for members in grouped.values_mut() {
        members.sort_by(|a, b| match (&a.event.time, &b.event.time) {
            (Some(ta), Some(tb)) => ta.cmp(tb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }

    grouped
}
