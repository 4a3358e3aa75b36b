// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bulk vehicle intake from CSV.
//!
//! This is the normalization boundary for scraped and hand-kept lists:
//! dates arrive as ISO or `MM/DD/YYYY` and leave as ISO, status labels are
//! matched leniently, and `archived` is always derived from status. A row
//! that cannot be normalized is rejected whole.

use csv::StringRecord;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use time::{Date, PrimitiveDateTime};
use towline::enforce_archived_invariant;
use towline_domain::{
    CallNumber, RecordedDate, Status, VehicleDescription, VehicleRecord, normalize_date,
};

use crate::error::ImportError;

/// Required CSV column headers (case-insensitive, normalized).
const REQUIRED_HEADERS: &[&str] = &["call_number", "tow_date"];

/// Alternate spellings seen on intake sheets.
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("call", "call_number"),
    ("call_no", "call_number"),
    ("call_#", "call_number"),
    ("towed", "tow_date"),
    ("date_towed", "tow_date"),
    ("year", "model_year"),
    ("state", "plate_state"),
    ("tag", "plate"),
    ("license_plate", "plate"),
    ("top_sent", "top_sent_date"),
    ("tr52_sent", "tr52_sent_date"),
    ("tr208_sent", "tr208_sent_date"),
];

/// One parsed CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// The row number (1-based, excluding header).
    pub row_number: usize,
    /// The call number as written, if present.
    pub call_number: Option<String>,
    /// The normalized record, or every problem found in the row.
    pub result: Result<VehicleRecord, Vec<String>>,
}

/// What happened to one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportRowOutcome {
    Imported,
    /// The call number is already in the store; the stored record is kept.
    Duplicate,
    Rejected,
}

/// Per-row import result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRowResult {
    pub row_number: usize,
    pub call_number: Option<String>,
    pub outcome: ImportRowOutcome,
    pub errors: Vec<String>,
}

/// Result of one CSV import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub rows: Vec<ImportRowResult>,
    pub total_rows: usize,
    pub imported_count: usize,
    pub duplicate_count: usize,
    pub rejected_count: usize,
}

impl ImportReport {
    pub(crate) fn from_rows(rows: Vec<ImportRowResult>) -> Self {
        let count = |outcome: ImportRowOutcome| rows.iter().filter(|r| r.outcome == outcome).count();
        Self {
            total_rows: rows.len(),
            imported_count: count(ImportRowOutcome::Imported),
            duplicate_count: count(ImportRowOutcome::Duplicate),
            rejected_count: count(ImportRowOutcome::Rejected),
            rows,
        }
    }
}

/// Normalizes a CSV header string for case-insensitive, whitespace-tolerant matching.
fn normalize_header(header: &str) -> String {
    let normalized: String = header.trim().to_lowercase().replace([' ', '-'], "_");
    HEADER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map_or(normalized, |(_, canonical)| (*canonical).to_string())
}

/// Validates that all required headers are present in the CSV.
fn validate_headers(headers: &StringRecord) -> Result<HashMap<String, usize>, ImportError> {
    let mut header_map: HashMap<String, usize> = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        header_map.entry(normalize_header(header)).or_insert(idx);
    }

    let missing: Vec<&str> = REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|required| !header_map.contains_key(*required))
        .collect();

    if !missing.is_empty() {
        return Err(ImportError::InvalidCsvFormat {
            reason: format!("Missing required headers: {}", missing.join(", ")),
        });
    }

    Ok(header_map)
}

fn parse_date_field(
    get_field: &impl Fn(&str) -> Option<String>,
    field_name: &str,
    errors: &mut Vec<String>,
) -> Option<Date> {
    let raw: String = get_field(field_name)?;
    normalize_date(&raw)
        .map_err(|e| errors.push(format!("{field_name}: {e}")))
        .ok()
}

/// Parses a CSV row into a `VehicleRecord` if possible.
fn parse_csv_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    at: PrimitiveDateTime,
) -> Result<VehicleRecord, Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    let get_field = |name: &str| -> Option<String> {
        header_map
            .get(name)
            .and_then(|&idx| record.get(idx))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let call_number: Option<CallNumber> = match get_field("call_number") {
        Some(raw) => CallNumber::new(&raw)
            .map_err(|e| errors.push(format!("call_number: {e}")))
            .ok(),
        None => {
            errors.push(String::from("call_number: required field is missing or empty"));
            None
        }
    };

    if get_field("tow_date").is_none() {
        errors.push(String::from("tow_date: required field is missing or empty"));
    }
    let tow_date: Option<Date> = parse_date_field(&get_field, "tow_date", &mut errors);
    let top_sent_date: Option<Date> = parse_date_field(&get_field, "top_sent_date", &mut errors);
    let tr52_sent_date: Option<Date> = parse_date_field(&get_field, "tr52_sent_date", &mut errors);
    let tr208_sent_date: Option<Date> =
        parse_date_field(&get_field, "tr208_sent_date", &mut errors);

    let status: Status = match get_field("status") {
        Some(raw) => Status::parse_lenient(&raw).unwrap_or_else(|e| {
            errors.push(format!("status: {e}"));
            Status::New
        }),
        None => Status::New,
    };

    let model_year: Option<u16> = get_field("model_year").and_then(|raw| {
        VehicleDescription::parse_model_year(&raw)
            .map_err(|e| errors.push(format!("model_year: {e}")))
            .ok()
            .flatten()
    });

    let Some(call_number) = call_number else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut vehicle: VehicleRecord =
        VehicleRecord::new(call_number, tow_date.map(RecordedDate::Valid));
    vehicle.description = VehicleDescription {
        vin: get_field("vin").map(|vin| vin.to_uppercase()),
        plate: get_field("plate").map(|plate| plate.to_uppercase()),
        plate_state: get_field("plate_state").map(|state| state.to_uppercase()),
        make: get_field("make"),
        model: get_field("model"),
        model_year,
        color: get_field("color"),
    };
    vehicle.jurisdiction = get_field("jurisdiction");
    vehicle.status = status;
    vehicle.top_sent_date = top_sent_date.map(RecordedDate::Valid);
    vehicle.tr52_sent_date = tr52_sent_date.map(RecordedDate::Valid);
    vehicle.tr208_sent_date = tr208_sent_date.map(RecordedDate::Valid);
    vehicle.last_updated = Some(at);
    enforce_archived_invariant(&mut vehicle);

    Ok(vehicle)
}

/// Parses and normalizes CSV vehicle data without touching the store.
///
/// A call number repeated within the file rejects every row after the first.
///
/// # Arguments
///
/// * `csv_content` - The raw CSV content as a string
/// * `at` - The intake time, recorded as `last_updated`
///
/// # Errors
///
/// Returns `ImportError::InvalidCsvFormat` if the headers are unusable or
/// the file is not well-formed CSV.
pub fn parse_vehicle_csv(
    csv_content: &str,
    at: PrimitiveDateTime,
) -> Result<Vec<ParsedRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_content.as_bytes());

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| ImportError::InvalidCsvFormat {
            reason: format!("Failed to read CSV headers: {e}"),
        })?
        .clone();
    let header_map: HashMap<String, usize> = validate_headers(&headers)?;
    let call_idx: Option<usize> = header_map.get("call_number").copied();

    let mut rows: Vec<ParsedRow> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (idx, result) in reader.records().enumerate() {
        let row_number: usize = idx + 1;
        let record: StringRecord = result.map_err(|e| ImportError::InvalidCsvFormat {
            reason: format!("Failed to parse row {row_number}: {e}"),
        })?;

        let raw_call: Option<String> = call_idx
            .and_then(|i| record.get(i))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let mut result: Result<VehicleRecord, Vec<String>> =
            parse_csv_row(&record, &header_map, at);

        if let Ok(vehicle) = &result
            && !seen.insert(vehicle.call_number.value().to_string())
        {
            result = Err(vec![format!(
                "call_number: duplicate within CSV - '{}' appears multiple times",
                vehicle.call_number
            )]);
        }

        rows.push(ParsedRow {
            row_number,
            call_number: raw_call,
            result,
        });
    }

    Ok(rows)
}
