use crate::domain::Price;
use once_cell::sync::Lazy;
use regex::Regex;

static FREE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)free|no charge|complimentary").expect("static price pattern"));

static NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.?\d*").expect("static price pattern"));

/// Resolves free-form price text into a structured range.
///
/// Free-admission phrasing wins outright and pins the range to zero.
/// Otherwise every numeric substring is extracted and the range spans the
/// minimum to the maximum; text with no numbers yields an absent price.
pub fn normalize_price(text: Option<&str>) -> Price {
    let Some(text) = text else {
        return Price::default();
    };

    if FREE_PATTERN.is_match(text) {
        return Price::free();
    }

    let numbers: Vec<f64> = NUMBER_PATTERN
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    if numbers.is_empty() {
        return Price::default();
    }

    let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
    let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Price {
        min: Some(min),
        max: Some(max),
        currency: "USD".to_string(),
        is_free: false,
    }
}
