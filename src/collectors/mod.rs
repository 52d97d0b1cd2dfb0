pub mod alabama_theatre;
pub mod eventim;

use scraper::{ElementRef, Selector};

use crate::config::Config;
use crate::types::Collector;

pub const ALABAMA_THEATRE_SOURCE: &str = "alabama-theatre";
pub const EVENTIM_SOURCE: &str = "eventim";

/// Registry of built-in sources, in the order they are scraped.
pub fn all_collectors(config: &Config) -> Vec<Box<dyn Collector>> {
    let timeout = config.scraper.request_timeout_seconds;
    vec![
        Box::new(alabama_theatre::AlabamaTheatreCollector::new(timeout)),
        Box::new(eventim::EventimCollector::new(timeout)),
    ]
}

/// First non-empty text content among the candidate selectors.
pub(crate) fn select_text(element: &ElementRef, selectors: &[&str]) -> Option<String> {
    for candidate in selectors {
        let Ok(selector) = Selector::parse(candidate) else {
            continue;
        };
        if let Some(found) = element.select(&selector).next() {
            let text = found.text().collect::<Vec<_>>().join(" ");
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}

/// First matching attribute value among the candidate selectors.
pub(crate) fn select_attr(element: &ElementRef, selectors: &[&str], attr: &str) -> Option<String> {
    for candidate in selectors {
        let Ok(selector) = Selector::parse(candidate) else {
            continue;
        };
        if let Some(value) = element
            .select(&selector)
            .next()
            .and_then(|found| found.value().attr(attr))
        {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Resolves a possibly-relative URL against the source's base.
pub(crate) fn absolutize(base_url: &str, url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("{}{}", base_url, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolutize_leaves_absolute_urls_alone() {
        assert_eq!(
            absolutize("https://example.com", "https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
    }

    #[test]
    fn absolutize_prefixes_relative_paths() {
        assert_eq!(
            absolutize("https://example.com", "/events/1"),
            "https://example.com/events/1"
        );
    }
}
