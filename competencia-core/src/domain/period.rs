//! Reference periods (competência)
//!
//! A reference period is the budget month a transaction counts toward. It is
//! always rendered as `"<MonthName> <Year>"` (e.g. `"Janeiro 2026"`) and parsed
//! back from the same form, so the label doubles as a storage key.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Month names, index 0 is January
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Look up the 1-based month number for a month name
///
/// Matching ignores case and accepts `Marco` for `Março`.
pub fn month_from_name(name: &str) -> Option<u32> {
    let needle = name.trim().to_lowercase();
    if needle == "marco" {
        return Some(3);
    }
    MONTH_NAMES
        .iter()
        .position(|m| m.to_lowercase() == needle)
        .map(|idx| idx as u32 + 1)
}

/// Month name for a 1-based month number
pub fn month_name(month: u32) -> Option<&'static str> {
    if (1..=12).contains(&month) {
        Some(MONTH_NAMES[(month - 1) as usize])
    } else {
        None
    }
}

/// Number of days in the given month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_next| first_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// A budget month, ordered chronologically by `(year, month)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferencePeriod {
    year: i32,
    month: u32,
}

impl ReferencePeriod {
    /// Create a period, validating the month number
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::validation(format!("month must be 1-12, got {}", month)));
        }
        Ok(Self { year, month })
    }

    /// The calendar month containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1-based month number
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    /// Move the period by `months` (negative moves backwards)
    ///
    /// `new_m = ((m - 1 + s) mod 12) + 1`, `new_y = y + floor((m - 1 + s) / 12)`.
    pub fn shift(&self, months: i32) -> Self {
        let zero_based = self.month as i32 - 1 + months;
        Self {
            year: self.year + zero_based.div_euclid(12),
            month: zero_based.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn previous(&self) -> Self {
        self.shift(-1)
    }

    pub fn next(&self) -> Self {
        self.shift(1)
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    /// Date in this period on `day`, clamped to the last valid day
    ///
    /// Day 31 in April gives April 30, in a non-leap February gives the 28th.
    pub fn date_clamped(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days());
        // Valid by construction: month is 1-12 and day is within the month
        NaiveDate::from_ymd_opt(self.year, self.month, day)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Whether `date` falls inside this calendar month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for ReferencePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

impl FromStr for ReferencePeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, year) = s
            .trim()
            .rsplit_once(' ')
            .ok_or_else(|| Error::data_integrity(format!("invalid period label '{}'", s)))?;
        let month = month_from_name(name)
            .ok_or_else(|| Error::data_integrity(format!("unknown month '{}' in '{}'", name, s)))?;
        let year: i32 = year
            .parse()
            .map_err(|_| Error::data_integrity(format!("invalid year in period '{}'", s)))?;
        Ok(Self { year, month })
    }
}

impl TryFrom<String> for ReferencePeriod {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ReferencePeriod> for String {
    fn from(period: ReferencePeriod) -> Self {
        period.to_string()
    }
}
