//! Calendar date normalization
//!
//! Stored rows and user input carry dates in several shapes: plain ISO
//! dates, timestamps written by datetime-only stores, and the `dd/mm/yyyy`
//! form used on screen. Everything is normalized to a `NaiveDate`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::result::{Error, Result};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// Normalize a stored or typed date string to a calendar date
///
/// Timestamps keep their own calendar day; no timezone conversion is
/// applied because the time part of a stored date carries no meaning.
pub fn parse_stored_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt.date());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%d/%m/%Y") {
        return Ok(date);
    }

    Err(Error::data_integrity(format!("unrecognized date '{}'", s)))
}

/// Render a date the way reports show it (`dd/mm/yyyy`)
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
