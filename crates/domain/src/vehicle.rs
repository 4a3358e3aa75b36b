// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::dates::{RecordedDate, format_timestamp};
use crate::error::DomainError;
use crate::status::Status;
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

/// The unique identifier of an impounded vehicle (the tow call number).
///
/// Call numbers are trimmed and compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallNumber(String);

impl CallNumber {
    /// Creates a call number.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCallNumber` if the value is blank.
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let trimmed: &str = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidCallNumber(String::from(
                "call number cannot be empty",
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the call number text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CallNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptive attributes of a vehicle. None of these drive the workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleDescription {
    pub vin: Option<String>,
    pub plate: Option<String>,
    pub plate_state: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub model_year: Option<u16>,
    pub color: Option<String>,
}

impl VehicleDescription {
    /// Parses a model year as entered on an intake sheet. Blank is `None`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidModelYear` if the value is not a year
    /// between 1900 and 2100.
    pub fn parse_model_year(raw: &str) -> Result<Option<u16>, DomainError> {
        let trimmed: &str = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        match trimmed.parse::<u16>() {
            Ok(year) if (1900..=2100).contains(&year) => Ok(Some(year)),
            _ => Err(DomainError::InvalidModelYear(trimmed.to_string())),
        }
    }

    /// A short human-readable label, e.g. `2014 Honda Civic (ABC123 PA)`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(year) = self.model_year {
            parts.push(year.to_string());
        }
        if let Some(make) = &self.make {
            parts.push(make.clone());
        }
        if let Some(model) = &self.model {
            parts.push(model.clone());
        }
        if parts.is_empty() {
            parts.push(String::from("Unknown vehicle"));
        }

        let mut summary: String = parts.join(" ");
        match (&self.plate, &self.plate_state) {
            (Some(plate), Some(state)) => summary.push_str(&format!(" ({plate} {state})")),
            (Some(plate), None) => summary.push_str(&format!(" ({plate})")),
            _ => {}
        }
        summary
    }
}

/// One impounded vehicle.
///
/// `archived` must equal `status.is_terminal()` at rest. Constructors and
/// every write path in this workspace maintain that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleRecord {
    pub call_number: CallNumber,
    pub description: VehicleDescription,
    pub jurisdiction: Option<String>,
    pub tow_date: Option<RecordedDate>,
    pub status: Status,
    pub top_sent_date: Option<RecordedDate>,
    pub tr52_sent_date: Option<RecordedDate>,
    pub tr208_sent_date: Option<RecordedDate>,
    /// Date of release, sale, scrapping, or transfer.
    pub outcome_date: Option<RecordedDate>,
    pub outcome_note: Option<String>,
    pub archived: bool,
    pub last_updated: Option<PrimitiveDateTime>,
    /// Store revision this copy was read at. Each successful save bumps it;
    /// a save carrying an older revision is refused.
    pub revision: i64,
}

impl VehicleRecord {
    /// Creates a freshly towed vehicle in status `New`.
    #[must_use]
    pub fn new(call_number: CallNumber, tow_date: Option<RecordedDate>) -> Self {
        Self {
            call_number,
            description: VehicleDescription::default(),
            jurisdiction: None,
            tow_date,
            status: Status::New,
            top_sent_date: None,
            tr52_sent_date: None,
            tr208_sent_date: None,
            outcome_date: None,
            outcome_note: None,
            archived: false,
            last_updated: None,
            revision: 0,
        }
    }

    /// Returns true if the archived flag agrees with the status.
    #[must_use]
    pub const fn archived_flag_consistent(&self) -> bool {
        self.archived == self.status.archived_flag()
    }

    /// A one-line description used in notification text and audit snapshots.
    #[must_use]
    pub fn snapshot_line(&self) -> String {
        format!(
            "call_number={},status={},archived={},tow_date={},top_sent={},tr52_sent={},tr208_sent={},last_updated={}",
            self.call_number,
            self.status,
            self.archived,
            stored_or_dash(self.tow_date.as_ref()),
            stored_or_dash(self.top_sent_date.as_ref()),
            stored_or_dash(self.tr52_sent_date.as_ref()),
            stored_or_dash(self.tr208_sent_date.as_ref()),
            self.last_updated
                .map_or_else(|| String::from("-"), format_timestamp),
        )
    }
}

fn stored_or_dash(date: Option<&RecordedDate>) -> String {
    date.map_or_else(|| String::from("-"), RecordedDate::to_stored)
}
