// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::archival::enforce_archived_invariant;
use time::{Date, PrimitiveDateTime};
use towline_domain::{RecordedDate, VehicleRecord};

/// A manual edit to a vehicle's descriptive fields and recorded dates.
///
/// Status only changes through [`crate::attempt_transition`]. `None` leaves
/// a field untouched; a blank string clears a text field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleCorrection {
    pub jurisdiction: Option<String>,
    pub vin: Option<String>,
    pub plate: Option<String>,
    pub plate_state: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub model_year: Option<u16>,
    pub color: Option<String>,
    pub tow_date: Option<Date>,
    pub top_sent_date: Option<Date>,
    pub tr52_sent_date: Option<Date>,
    pub tr208_sent_date: Option<Date>,
}

impl VehicleCorrection {
    /// Returns true if the correction changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Applies a correction to a copy of `record`.
///
/// The archived flag is re-derived from status and `last_updated` is
/// stamped with `at`.
#[must_use]
pub fn apply_correction(
    record: &VehicleRecord,
    correction: &VehicleCorrection,
    at: PrimitiveDateTime,
) -> VehicleRecord {
    let mut next: VehicleRecord = record.clone();

    replace(&mut next.jurisdiction, correction.jurisdiction.as_ref());
    replace(&mut next.description.vin, correction.vin.as_ref());
    replace(&mut next.description.plate, correction.plate.as_ref());
    replace(&mut next.description.plate_state, correction.plate_state.as_ref());
    replace(&mut next.description.make, correction.make.as_ref());
    replace(&mut next.description.model, correction.model.as_ref());
    replace(&mut next.description.color, correction.color.as_ref());
    if let Some(year) = correction.model_year {
        next.description.model_year = Some(year);
    }

    replace_date(&mut next.tow_date, correction.tow_date);
    replace_date(&mut next.top_sent_date, correction.top_sent_date);
    replace_date(&mut next.tr52_sent_date, correction.tr52_sent_date);
    replace_date(&mut next.tr208_sent_date, correction.tr208_sent_date);

    enforce_archived_invariant(&mut next);
    next.last_updated = Some(at);
    next
}

fn replace(field: &mut Option<String>, value: Option<&String>) {
    if let Some(value) = value {
        let trimmed: &str = value.trim();
        *field = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }
}

fn replace_date(field: &mut Option<RecordedDate>, value: Option<Date>) {
    if let Some(date) = value {
        *field = Some(RecordedDate::Valid(date));
    }
}
