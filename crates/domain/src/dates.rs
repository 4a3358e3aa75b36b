// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar dates and timestamps.
//!
//! Every date the engine sees is a timezone-naive calendar date stored as
//! ISO `YYYY-MM-DD`. Ingestion paths call [`normalize_date`] to convert
//! other spellings (`MM/DD/YYYY`) once, at the write edge. Data already at
//! rest that is not ISO is kept verbatim as [`RecordedDate::Malformed`] so
//! the deadline calculator can flag it instead of guessing.

use crate::error::DomainError;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Month, PrimitiveDateTime};

const ISO_DATE: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

const TIMESTAMP: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// A date as recorded on a vehicle record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedDate {
    /// A well-formed ISO calendar date.
    Valid(Date),
    /// Text that is not an ISO calendar date, kept verbatim.
    Malformed(String),
}

impl RecordedDate {
    /// Interprets a stored value. Anything other than strict ISO is malformed.
    #[must_use]
    pub fn from_stored(raw: &str) -> Self {
        parse_iso_date(raw).map_or_else(|_| Self::Malformed(raw.to_string()), Self::Valid)
    }

    /// Returns the date if it is well formed.
    #[must_use]
    pub const fn as_date(&self) -> Option<Date> {
        match self {
            Self::Valid(date) => Some(*date),
            Self::Malformed(_) => None,
        }
    }

    /// Returns the representation written back to storage.
    #[must_use]
    pub fn to_stored(&self) -> String {
        match self {
            Self::Valid(date) => format_iso_date(*date),
            Self::Malformed(raw) => raw.clone(),
        }
    }
}

impl From<Date> for RecordedDate {
    fn from(date: Date) -> Self {
        Self::Valid(date)
    }
}

/// Parses a strict ISO `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` for any other spelling.
pub fn parse_iso_date(raw: &str) -> Result<Date, DomainError> {
    if raw.len() != 10 {
        return Err(DomainError::DateParseError {
            date_string: raw.to_string(),
            error: String::from("expected YYYY-MM-DD"),
        });
    }

    Date::parse(raw, ISO_DATE).map_err(|e| DomainError::DateParseError {
        date_string: raw.to_string(),
        error: e.to_string(),
    })
}

/// Normalizes an ingested date to a calendar date.
///
/// Accepts ISO `YYYY-MM-DD` and US `MM/DD/YYYY` (leading zeros optional).
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the value matches neither
/// format or names an impossible date.
pub fn normalize_date(raw: &str) -> Result<Date, DomainError> {
    let trimmed: &str = raw.trim();

    if trimmed.contains('/') {
        return parse_us_date(trimmed);
    }

    parse_iso_date(trimmed)
}

fn parse_us_date(raw: &str) -> Result<Date, DomainError> {
    let parse_error = |error: &str| DomainError::DateParseError {
        date_string: raw.to_string(),
        error: error.to_string(),
    };

    let parts: Vec<&str> = raw.split('/').collect();
    let [month, day, year] = parts.as_slice() else {
        return Err(parse_error("expected MM/DD/YYYY"));
    };

    if year.len() != 4 || month.is_empty() || month.len() > 2 || day.is_empty() || day.len() > 2
    {
        return Err(parse_error("expected MM/DD/YYYY"));
    }

    let year: i32 = year
        .parse()
        .map_err(|_| parse_error("year is not numeric"))?;
    let month: u8 = month
        .parse()
        .map_err(|_| parse_error("month is not numeric"))?;
    let day: u8 = day.parse().map_err(|_| parse_error("day is not numeric"))?;

    let month: Month = Month::try_from(month).map_err(|e| parse_error(&e.to_string()))?;
    Date::from_calendar_date(year, month, day).map_err(|e| parse_error(&e.to_string()))
}

/// Formats a date as ISO `YYYY-MM-DD`.
#[must_use]
pub fn format_iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Formats a timestamp as `YYYY-MM-DDTHH:MM:SS`.
#[must_use]
pub fn format_timestamp(at: PrimitiveDateTime) -> String {
    format!(
        "{}T{:02}:{:02}:{:02}",
        format_iso_date(at.date()),
        at.hour(),
        at.minute(),
        at.second()
    )
}

/// Parses a timestamp written by [`format_timestamp`].
///
/// # Errors
///
/// Returns `DomainError::TimestampParseError` if the value is not in that format.
pub fn parse_timestamp(raw: &str) -> Result<PrimitiveDateTime, DomainError> {
    PrimitiveDateTime::parse(raw, TIMESTAMP).map_err(|e| DomainError::TimestampParseError {
        timestamp: raw.to_string(),
        error: e.to_string(),
    })
}
