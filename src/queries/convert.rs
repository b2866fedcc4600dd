//! Date handling and unit conversions shared by the query mappers.
//!
//! Connect reports distance in meters, durations in seconds, and body
//! weight in grams; the mappers surface kilometers, hours/minutes, and
//! kilograms. All converters propagate `None` so missing fields stay
//! `null` in the output.

use chrono::{Local, NaiveDate};

/// Resolves an optional `YYYY-MM-DD` argument, falling back to today.
///
/// Malformed input also falls back to today rather than erroring, so a
/// typo degrades to current-day data instead of a dead end.
pub fn resolve_date(arg: Option<&str>) -> NaiveDate {
    if let Some(raw) = arg {
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => return date,
            Err(_) => tracing::debug!("ignoring malformed date {raw:?}, using today"),
        }
    }
    Local::now().date_naive()
}

pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn meters_to_km(meters: Option<f64>) -> Option<f64> {
    meters.map(|m| round2(m / 1000.0))
}

pub fn seconds_to_hours(seconds: Option<f64>) -> Option<f64> {
    seconds.map(|s| round1(s / 3600.0))
}

pub fn seconds_to_minutes(seconds: Option<f64>) -> Option<f64> {
    seconds.map(|s| round1(s / 60.0))
}

pub fn grams_to_kg(grams: Option<f64>) -> Option<f64> {
    grams.map(|g| round1(g / 1000.0))
}

/// Drops a zero reading. Several Connect fields report 0 when the
/// metric was never measured; those surface as `null`, not `0`.
pub fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Formats a speed in m/s as a `M:SS /km` pace string.
pub fn pace_min_km(speed_mps: Option<f64>) -> Option<String> {
    let speed = speed_mps?;
    if speed <= 0.0 {
        return None;
    }
    let secs_per_km = 1000.0 / speed;
    let mins = (secs_per_km / 60.0).floor() as i64;
    let secs = (secs_per_km % 60.0).floor() as i64;
    Some(format!("{mins}:{secs:02} /km"))
}
