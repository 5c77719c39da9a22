//! Timestamp normalization
//!
//! Report sources hand back timestamps in whatever form their storage uses.
//! Everything leaving this crate is ISO-8601 UTC with second precision,
//! e.g. `2011-10-16T22:24:58Z`.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

const COMPACT_FORMAT: &str = "%Y%m%d%H%M%S";

/// Render a timestamp in the canonical ISO-8601 form
pub fn to_iso8601(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Interpret an integer as a timestamp
///
/// Fourteen-digit values are read as compact `YYYYMMDDHHMMSS`; anything
/// else is taken as Unix seconds.
pub fn from_integer(value: i64) -> Option<DateTime<Utc>> {
    if (10_000_000_000_000..=99_999_999_999_999).contains(&value) {
        return parse_compact(&value.to_string());
    }
    Utc.timestamp_opt(value, 0).single()
}

/// Parse a string timestamp in compact, RFC 3339 or Unix-seconds form
pub fn parse(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.len() == 14 && text.bytes().all(|b| b.is_ascii_digit()) {
        return parse_compact(text);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    text.parse::<i64>().ok().and_then(from_integer)
}

fn parse_compact(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, COMPACT_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
