//! Parsing and arithmetic helpers shared by the ingest and analytics crates

use chrono::NaiveDateTime;

use crate::{ClockDuration, Result, WatchstatError};

/// Timestamp format of the `Start_Time` column
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Width of a completion bucket in percent
pub const PERCENT_BUCKET_WIDTH: f64 = 5.0;

/// Parse a `Start_Time` value
pub fn parse_start_time(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), START_TIME_FORMAT).map_err(|e| {
        WatchstatError::data_with_source(format!("Invalid start time '{}'", value), e)
    })
}

/// Parse an `HH:MM:SS` value
pub fn parse_clock_duration(value: &str) -> Result<ClockDuration> {
    value.parse()
}

/// Minutes of an `HH:MM:SS` value with the seconds dropped
pub fn whole_minutes(value: &str) -> Result<u32> {
    parse_clock_duration(value).map(|d| d.whole_minutes())
}

/// `watched / duration * 100`, or `None` when `duration` is zero
pub fn percent_of(watched: u32, duration: u32) -> Option<f64> {
    if duration == 0 {
        return None;
    }
    Some(f64::from(watched) / f64::from(duration) * 100.0)
}

/// Round a completion percentage to the nearest multiple of five.
///
/// Halfway values round to the even multiple, so `12.5` becomes `10` and
/// `37.5` becomes `40`.
pub fn bucket_percent(percent: f64) -> u32 {
    let steps = (percent / PERCENT_BUCKET_WIDTH).round_ties_even();
    (steps * PERCENT_BUCKET_WIDTH).max(0.0) as u32
}

/// Round to a fixed number of decimals for display
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Trim a cell and map the empty string to `None`
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
