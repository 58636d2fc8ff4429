//! Permissive date parsing for window bounds and last run files
//!
//! Timestamps are naive and expressed in UTC. Inputs carrying an explicit
//! offset are converted to UTC before the offset is dropped.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATETIME_WITH_OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%d %B %Y",
    "%B %d %Y",
    "%B %d, %Y",
];

const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// The fallback window start: `1970-01-01T00:00:00`
pub fn epoch() -> NaiveDateTime {
    DateTime::<Utc>::UNIX_EPOCH.naive_utc()
}

/// Parse a human readable date or date-time.
///
/// Accepts RFC 3339, RFC 2822, ISO-like date-times with a `T` or space
/// separator and optional fractional seconds, and plain calendar dates
/// (read as midnight). Returns `None` when nothing matches, including
/// out-of-range values such as `1999-12-99`.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_utc());
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(value) {
        return Some(ts.naive_utc());
    }

    for format in DATETIME_WITH_OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(value, format) {
            return Some(ts.naive_utc());
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Render a timestamp the way last run files store it.
///
/// Fractional seconds are only written when present, so the output parses
/// back to the exact same value.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(OUTPUT_FORMAT).to_string()
}
