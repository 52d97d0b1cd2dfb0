use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::domain::{AlternateUrl, CanonicalEvent, MergedEvent};

/// Two events are duplicates when their similarity exceeds this.
const DUPLICATE_THRESHOLD: f64 = 0.8;

/// Title similarity dominates venue similarity in the weighted score.
const TITLE_WEIGHT: f64 = 0.7;
const VENUE_WEIGHT: f64 = 0.3;

static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("static pattern"));

/// The normalized `(title, date, venue)` triple duplicate comparison runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    title: String,
    date: String,
    venue: String,
}

pub fn signature(event: &CanonicalEvent) -> Signature {
    Signature {
        title: normalize_for_comparison(&event.title),
        // Missing dates compare as the empty string; two undated events with
        // matching titles are still the same listing
        date: event.date.clone().unwrap_or_default(),
        venue: normalize_for_comparison(&event.location.venue),
    }
}

/// Lowercase, strip punctuation, collapse whitespace.
fn normalize_for_comparison(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Jaccard index over whitespace-tokenized word sets.
fn word_jaccard(a: &str, b: &str) -> f64 {
    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();

    let union = words_a.union(&words_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = words_a.intersection(&words_b).count();
    intersection as f64 / union as f64
}

/// Weighted similarity in [0, 1]. Dates gate everything: no exact date match,
/// no similarity, regardless of how close titles and venues are.
pub fn similarity(a: &Signature, b: &Signature) -> f64 {
    if a.date != b.date {
        return 0.0;
    }
    TITLE_WEIGHT * word_jaccard(&a.title, &b.title)
        + VENUE_WEIGHT * word_jaccard(&a.venue, &b.venue)
}

/// Collapses near-duplicate canonical events into merged records, one per
/// group of events describing the same real-world occurrence.
pub fn merge_duplicates(events: Vec<CanonicalEvent>) -> Vec<MergedEvent> {
    group_similar(events).into_iter().filter_map(merge_group).collect()
}

/// Single greedy pass in input order: each event is compared against the
/// signature of the *first* member of every existing group, joining the first
/// group that clears the threshold or opening a new one. Order-dependent by
/// construction; transitivity is not enforced.
fn group_similar(events: Vec<CanonicalEvent>) -> Vec<Vec<CanonicalEvent>> {
    let mut groups: Vec<(Signature, Vec<CanonicalEvent>)> = Vec::new();

    for event in events {
        let sig = signature(&event);
        match groups
            .iter_mut()
            .find(|(first, _)| similarity(&sig, first) > DUPLICATE_THRESHOLD)
        {
            Some((_, members)) => members.push(event),
            None => groups.push((sig, vec![event])),
        }
    }

    groups.into_iter().map(|(_, members)| members).collect()
}

/// Folds a group into one record, preferring the most complete value for each
/// field across members in encounter order.
fn merge_group(group: Vec<CanonicalEvent>) -> Option<MergedEvent> {
    let mut members = group.into_iter();
    let first = members.next()?;
    let mut merged = MergedEvent {
        sources: vec![first.source.clone()],
        alternate_urls: Vec::new(),
        event: first,
    };

    for member in members {
        // Longest description wins
        if member.description.len() > merged.event.description.len() {
            merged.event.description = member.description.clone();
        }
        // First non-empty image wins
        if merged.event.image.is_empty() && !member.image.is_empty() {
            merged.event.image = member.image.clone();
        }
        // A price with a known minimum beats one without
        if member.price.min.is_some() && merged.event.price.min.is_none() {
            merged.event.price = member.price.clone();
        }
        // Fill the address if the kept record lacks one
        if merged.event.location.address.is_empty() && !member.location.address.is_empty() {
            merged.event.location.address = member.location.address.clone();
        }
        // Disagreeing URLs are kept, tagged with their source
        if !member.url.is_empty() && member.url != merged.event.url {
            merged.alternate_urls.push(AlternateUrl {
                source: member.source.clone(),
                url: member.url.clone(),
            });
        }
        merged.sources.push(member.source);
    }

    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, Price};
    use chrono::Utc;

    fn event(title: &str, date: Option<&str>, venue: &str, source: &str) -> CanonicalEvent {
        CanonicalEvent {
            id: format!("{}-{}", source, title.to_lowercase()),
            title: title.to_string(),
            description: String::new(),
            date: date.map(str::to_string),
            time: None,
            end_date: None,
            end_time: None,
            location: Location {
                venue: venue.to_string(),
                address: String::new(),
                city: "Birmingham".to_string(),
                state: "AL".to_string(),
                zip_code: String::new(),
            },
            category: "General".to_string(),
            price: Price::default(),
            image: String::new(),
            url: String::new(),
            source: source.to_string(),
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn case_and_punctuation_variants_merge() {
        let merged = merge_duplicates(vec![
            event("Jazz Night", Some("2026-03-01"), "The Venue", "siteA"),
            event("jazz night!", Some("2026-03-01"), "the venue", "siteB"),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].sources, vec!["siteA", "siteB"]);
    }

    #[test]
    fn different_dates_never_merge() {
        let merged = merge_duplicates(vec![
            event("Jazz Night", Some("2026-03-01"), "The Venue", "siteA"),
            event("Jazz Night", Some("2026-03-02"), "The Venue", "siteB"),
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn dissimilar_titles_stay_separate() {
        let merged = merge_duplicates(vec![
            event("Jazz Night", Some("2026-03-01"), "The Venue", "siteA"),
            event("Poetry Slam", Some("2026-03-01"), "The Venue", "siteB"),
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn singleton_group_keeps_own_source() {
        let merged = merge_duplicates(vec![event(
            "Jazz Night",
            Some("2026-03-01"),
            "The Venue",
            "siteA",
        )]);
        assert_eq!(merged[0].sources, vec!["siteA"]);
        assert!(merged[0].alternate_urls.is_empty());
    }

    #[test]
    fn merge_prefers_most_complete_fields() {
        let mut a = event("Jazz Night", Some("2026-03-01"), "The Venue", "siteA");
        a.description = "short".to_string();
        a.url = "https://a.example/e".to_string();

        let mut b = event("Jazz Night", Some("2026-03-01"), "The Venue", "siteB");
        b.description = "a much longer description of the show".to_string();
        b.image = "https://b.example/img.jpg".to_string();
        b.url = "https://b.example/e".to_string();
        b.price = Price {
            min: Some(10.0),
            max: Some(20.0),
            currency: "USD".to_string(),
            is_free: false,
        };
        b.location.address = "1817 3rd Ave N".to_string();

        let merged = merge_duplicates(vec![a, b]);
        assert_eq!(merged.len(), 1);
        let kept = &merged[0];
        assert_eq!(kept.event.description, "a much longer description of the show");
        assert_eq!(kept.event.image, "https://b.example/img.jpg");
        assert_eq!(kept.event.price.min, Some(10.0));
        assert_eq!(kept.event.location.address, "1817 3rd Ave N");
        assert_eq!(kept.event.url, "https://a.example/e");
        assert_eq!(
            kept.alternate_urls,
            vec![AlternateUrl {
                source: "siteB".to_string(),
                url: "https://b.example/e".to_string(),
            }]
        );
    }

    #[test]
    fn grouping_compares_against_first_member_only() {
        // B joins A's group; C is similar to B but not to A, so it opens its
        // own group. Accepted limitation of the greedy pass.
        let a = event("Spring Gala Opening Night", Some("2026-03-01"), "Hall", "siteA");
        let b = event(
            "Spring Gala Opening Night Live",
            Some("2026-03-01"),
            "Hall",
            "siteB",
        );
        let c = event(
            "Spring Gala Opening Night Live Encore",
            Some("2026-03-01"),
            "Hall",
            "siteC",
        );

        let sig_a = signature(&a);
        let sig_b = signature(&b);
        let sig_c = signature(&c);
        assert!(similarity(&sig_a, &sig_b) > DUPLICATE_THRESHOLD);
        assert!(similarity(&sig_b, &sig_c) > DUPLICATE_THRESHOLD);
        assert!(similarity(&sig_a, &sig_c) <= DUPLICATE_THRESHOLD);

        let merged = merge_duplicates(vec![a, b, c]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].sources, vec!["siteA", "siteB"]);
        assert_eq!(merged[1].sources, vec!["siteC"]);
    }

    #[test]
    fn similarity_is_zero_across_dates() {
        let a = signature(&event("Same Show", Some("2026-03-01"), "Same Venue", "x"));
        let b = signature(&event("Same Show", Some("2026-03-02"), "Same Venue", "y"));
        assert_eq!(similarity(&a, &b), 0.0);
    }
}
