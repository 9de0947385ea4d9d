//! Timestamp utilities.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Format used for second-precision timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used for microsecond-precision timestamps.
pub const TIMESTAMP_FORMAT_USEC: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Format a timestamp in ISO-like local time.
pub fn format_timestamp(ts: &DateTime<Local>, usec: bool) -> String {
    let format = if usec { TIMESTAMP_FORMAT_USEC } else { TIMESTAMP_FORMAT };
    ts.format(format).to_string()
}

/// Parse a timestamp produced by [`format_timestamp`], with or without
/// microseconds.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();
    let naive = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT_USEC)
        .or_else(|_| NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT))
        .ok()?;
    Local.from_local_datetime(&naive).earliest()
}
