//! Duration parsing and human-readable time formatting.

use chrono::{DateTime, NaiveDateTime};
use regex_lite::Regex;
use std::sync::LazyLock;

static ISO_DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?").unwrap());

/// Parses an ISO-8601 time duration such as `PT2H35M` into minutes.
///
/// Either component may be missing. Strings without a `PT` token yield 0,
/// so a malformed upstream value never fails a render.
pub fn parse_iso_duration_to_minutes(duration: &str) -> u32 {
    let Some(caps) = ISO_DURATION.captures(duration) else {
        return 0;
    };

    let component = |idx: usize| -> u32 {
        caps.get(idx).map(|m| m.as_str().parse::<u32>().unwrap_or(u32::MAX)).unwrap_or(0)
    };

    component(1).saturating_mul(60).saturating_add(component(2))
}

/// Encodes minutes back into the `PT#H#M` grammar.
pub fn to_iso_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    match (hours, mins) {
        (0, m) => format!("PT{}M", m),
        (h, 0) => format!("PT{}H", h),
        (h, m) => format!("PT{}H{}M", h, m),
    }
}

/// Formats minutes as `5h 20m`, `5h` or `20m`.
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    if hours == 0 {
        return format!("{}m", mins);
    }

    if mins == 0 {
        return format!("{}h", hours);
    }

    format!("{}h {}m", hours, mins)
}

/// Parses an upstream timestamp, keeping the wall-clock time it carries.
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .ok()
}

/// Formats a timestamp as a 24-hour time of day (`08:05`). Empty on bad input.
pub fn format_time(timestamp: &str) -> String {
    parse_timestamp(timestamp).map(|dt| dt.format("%H:%M").to_string()).unwrap_or_default()
}

/// Formats a timestamp as a short date (`Thu, Jan 1`). Empty on bad input.
pub fn format_date(timestamp: &str) -> String {
    parse_timestamp(timestamp).map(|dt| dt.format("%a, %b %-d").to_string()).unwrap_or_default()
}

/// Describes a stop count for display.
pub fn format_stops(stops: u32) -> String {
    match stops {
        0 => "Nonstop".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{} stops", n),
    }
}

/// Formats an amount in whole currency units, e.g. `$1,234` or `CHF 310`.
pub fn format_currency(amount: f64, currency: &str) -> String {
    let rounded = if amount.is_finite() { amount.round().max(0.0) as u64 } else { 0 };
    let digits = group_thousands(rounded);

    match currency.to_uppercase().as_str() {
        "USD" => format!("${}", digits),
        "EUR" => format!("€{}", digits),
        "GBP" => format!("£{}", digits),
        "JPY" => format!("¥{}", digits),
        other => format!("{} {}", other, digits),
    }
}

fn group_thousands(value: u64) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);

    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}
