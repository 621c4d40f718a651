//! Lenient date parsing for `lastmod` and `publication_date` values.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

/// Date-time with hour:minute precision, e.g. `2015-05-07T15:04+02:00`.
const MINUTE_PRECISION_FORMAT: &str = "%Y-%m-%dT%H:%M%:z";

/// Calendar date only, e.g. `2015-05-07`.
const DATE_ONLY_FORMAT: &str = "%Y-%m-%d";

/// Parse a W3C datetime string as used in sitemaps.
///
/// Formats are tried in order and the first match wins:
/// 1. RFC 3339 (`2015-05-07T15:04:05Z`, `2015-05-07T15:04:05.123+02:00`)
/// 2. minute precision with offset (`2015-05-07T15:04-07:00`)
/// 3. date only (`2015-05-07`), taken as midnight with a zero offset
///
/// Returns `None` for empty or unparseable input. A bad date and a missing
/// date are the same thing to callers.
pub fn parse_date_time(value: &str) -> Option<DateTime<FixedOffset>> {
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(value, MINUTE_PRECISION_FORMAT) {
        return Some(dt);
    }

    // second chance: short form
    NaiveDate::parse_from_str(value, DATE_ONLY_FORMAT)
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc().fixed_offset())
}
