//! Parsing and formatting of record dates.
//!
//! Dates are local wall-clock times without a zone, stored in SQLite as text in
//! `STORAGE_FORMAT`. A date given without a time means the start of that day.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, ParseError};

/// The text format of the `date` column.
pub(crate) const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATE_TIME_FORMATS: &[&str] = &[
    STORAGE_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]` or `YYYY-MM-DD HH:MM[:SS]`.
pub fn parse_date_time(s: &str) -> Result<NaiveDateTime, ParseError> {
    let s = s.trim();
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN))
}

pub(crate) fn format_for_storage(dt: &NaiveDateTime) -> String {
    dt.format(STORAGE_FORMAT).to_string()
}
