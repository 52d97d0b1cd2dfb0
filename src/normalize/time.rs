use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;

// "7 PM", "7:30pm", "11:00 AM" — minutes optional
static TIME_12H: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2}):?(\d{2})?\s*(AM|PM)").expect("static time pattern"));

// bare 24-hour "19:30"
static TIME_24H: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("static time pattern"));

/// Resolves arbitrary time text to 24-hour `HH:mm`.
///
/// 12-hour AM/PM forms are recognized first, with noon and midnight handled
/// explicitly (`12 PM` -> `12`, `12 AM` -> `00`). Anything that does not
/// round-trip through a real clock degrades to `None`.
pub fn normalize_time(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = TIME_12H.captures(trimmed) {
        let mut hours: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minutes: u32 = caps
            .get(2)
            .map(|m| m.as_str())
            .unwrap_or("00")
            .parse()
            .ok()?;
        let period = caps.get(3)?.as_str().to_ascii_uppercase();

        if period == "PM" && hours != 12 {
            hours += 12;
        }
        if period == "AM" && hours == 12 {
            hours = 0;
        }

        // Out-of-range inputs like "13:45 PM" fail the clock check and
        // degrade to None rather than emitting an invalid hour
        return NaiveTime::from_hms_opt(hours, minutes, 0)
            .map(|time| time.format("%H:%M").to_string());
    }

    if let Some(caps) = TIME_24H.captures(trimmed) {
        let hours: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minutes: u32 = caps.get(2)?.as_str().parse().ok()?;
        return NaiveTime::from_hms_opt(hours, minutes, 0)
            .map(|time| time.format("%H:%M").to_string());
    }

    None
}
