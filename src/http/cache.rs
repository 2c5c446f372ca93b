//! HTTP cache validation module
//!
//! `Last-Modified` generation and `If-Modified-Since` handling. These are the
//! only cache headers emitted; no `ETag` or `Cache-Control`.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::time::SystemTime;

/// IMF-fixdate, the preferred HTTP-date format (RFC 9110 §5.6.7)
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a file modification time as an HTTP-date
pub fn format_http_date(time: SystemTime) -> String {
    let dt: DateTime<Utc> = time.into();
    dt.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an HTTP-date; obsolete RFC 850 and asctime forms are not accepted
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), HTTP_DATE_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Check whether the client's cached copy is still current
///
/// HTTP-dates have one second resolution, so the modification time is
/// truncated before comparing.
///
/// # Returns
/// Returns true if the file was not modified since the given date (should return 304)
pub fn not_modified_since(if_modified_since: Option<&str>, modified: SystemTime) -> bool {
    let Some(since) = if_modified_since.and_then(parse_http_date) else {
        return false;
    };
    let modified: DateTime<Utc> = modified.into();
    modified.timestamp() <= since.timestamp()
}
