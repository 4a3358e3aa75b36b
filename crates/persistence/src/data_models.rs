// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row structs and their conversions to and from domain values.

use diesel::prelude::*;
use time::{Date, PrimitiveDateTime};
use tracing::warn;
use towline::StatusHistoryEntry;
use towline_domain::{
    CallNumber, DeliveryStatus, LedgerEntry, LedgerKey, NotificationType, RecordedDate, Status,
    VehicleDescription, VehicleRecord, format_timestamp, parse_iso_date, parse_timestamp,
};

use crate::diesel_schema::{notification_ledger, vehicle_status_history, vehicles};
use crate::error::PersistenceError;

/// Diesel Queryable struct for vehicle rows.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = vehicles)]
pub struct VehicleRow {
    pub call_number: String,
    pub vin: Option<String>,
    pub plate: Option<String>,
    pub plate_state: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub model_year: Option<i32>,
    pub color: Option<String>,
    pub jurisdiction: Option<String>,
    pub tow_date: Option<String>,
    pub status: String,
    pub top_sent_date: Option<String>,
    pub tr52_sent_date: Option<String>,
    pub tr208_sent_date: Option<String>,
    pub outcome_date: Option<String>,
    pub outcome_note: Option<String>,
    pub archived: i32,
    pub last_updated: Option<String>,
    pub revision: i64,
}

impl TryFrom<VehicleRow> for VehicleRecord {
    type Error = PersistenceError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        let call_number: CallNumber = CallNumber::new(&row.call_number)
            .map_err(|e| PersistenceError::CorruptRow(e.to_string()))?;
        let status: Status = row.status.parse().map_err(|e: towline_domain::DomainError| {
            PersistenceError::CorruptRow(format!("vehicle {call_number}: {e}"))
        })?;

        let last_updated: Option<PrimitiveDateTime> =
            row.last_updated.as_deref().and_then(|raw| {
                parse_timestamp(raw)
                    .map_err(|e| {
                        warn!(call_number = %call_number, error = %e, "Ignoring unreadable last_updated");
                    })
                    .ok()
            });

        Ok(Self {
            description: VehicleDescription {
                vin: row.vin,
                plate: row.plate,
                plate_state: row.plate_state,
                make: row.make,
                model: row.model,
                model_year: row.model_year.and_then(|year| u16::try_from(year).ok()),
                color: row.color,
            },
            jurisdiction: row.jurisdiction,
            tow_date: row.tow_date.as_deref().map(RecordedDate::from_stored),
            status,
            top_sent_date: row.top_sent_date.as_deref().map(RecordedDate::from_stored),
            tr52_sent_date: row.tr52_sent_date.as_deref().map(RecordedDate::from_stored),
            tr208_sent_date: row.tr208_sent_date.as_deref().map(RecordedDate::from_stored),
            outcome_date: row.outcome_date.as_deref().map(RecordedDate::from_stored),
            outcome_note: row.outcome_note,
            archived: row.archived != 0,
            last_updated,
            revision: row.revision,
            call_number,
        })
    }
}

/// Insertable vehicle row.
#[derive(Debug, Insertable)]
#[diesel(table_name = vehicles)]
pub struct NewVehicleRow {
    pub call_number: String,
    pub vin: Option<String>,
    pub plate: Option<String>,
    pub plate_state: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub model_year: Option<i32>,
    pub color: Option<String>,
    pub jurisdiction: Option<String>,
    pub tow_date: Option<String>,
    pub status: String,
    pub top_sent_date: Option<String>,
    pub tr52_sent_date: Option<String>,
    pub tr208_sent_date: Option<String>,
    pub outcome_date: Option<String>,
    pub outcome_note: Option<String>,
    pub archived: i32,
    pub last_updated: Option<String>,
    pub revision: i64,
}

impl From<&VehicleRecord> for NewVehicleRow {
    fn from(record: &VehicleRecord) -> Self {
        let changes: VehicleChangeset = VehicleChangeset::from(record);
        Self {
            call_number: record.call_number.value().to_string(),
            vin: changes.vin,
            plate: changes.plate,
            plate_state: changes.plate_state,
            make: changes.make,
            model: changes.model,
            model_year: changes.model_year,
            color: changes.color,
            jurisdiction: changes.jurisdiction,
            tow_date: changes.tow_date,
            status: changes.status,
            top_sent_date: changes.top_sent_date,
            tr52_sent_date: changes.tr52_sent_date,
            tr208_sent_date: changes.tr208_sent_date,
            outcome_date: changes.outcome_date,
            outcome_note: changes.outcome_note,
            archived: changes.archived,
            last_updated: changes.last_updated,
            revision: record.revision,
        }
    }
}

/// Full-row update for a vehicle. `None` writes NULL.
///
/// `archived` is derived from the status, never copied from the record, so
/// no write can store a flag that disagrees with the status. `revision` is
/// the record's revision plus one.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = vehicles, treat_none_as_null = true)]
pub struct VehicleChangeset {
    pub vin: Option<String>,
    pub plate: Option<String>,
    pub plate_state: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub model_year: Option<i32>,
    pub color: Option<String>,
    pub jurisdiction: Option<String>,
    pub tow_date: Option<String>,
    pub status: String,
    pub top_sent_date: Option<String>,
    pub tr52_sent_date: Option<String>,
    pub tr208_sent_date: Option<String>,
    pub outcome_date: Option<String>,
    pub outcome_note: Option<String>,
    pub archived: i32,
    pub last_updated: Option<String>,
    pub revision: i64,
}

impl From<&VehicleRecord> for VehicleChangeset {
    fn from(record: &VehicleRecord) -> Self {
        let stored = |date: Option<&RecordedDate>| date.map(RecordedDate::to_stored);
        Self {
            vin: record.description.vin.clone(),
            plate: record.description.plate.clone(),
            plate_state: record.description.plate_state.clone(),
            make: record.description.make.clone(),
            model: record.description.model.clone(),
            model_year: record.description.model_year.map(i32::from),
            color: record.description.color.clone(),
            jurisdiction: record.jurisdiction.clone(),
            tow_date: stored(record.tow_date.as_ref()),
            status: record.status.as_str().to_string(),
            top_sent_date: stored(record.top_sent_date.as_ref()),
            tr52_sent_date: stored(record.tr52_sent_date.as_ref()),
            tr208_sent_date: stored(record.tr208_sent_date.as_ref()),
            outcome_date: stored(record.outcome_date.as_ref()),
            outcome_note: record.outcome_note.clone(),
            archived: i32::from(record.status.archived_flag()),
            last_updated: record.last_updated.map(format_timestamp),
            revision: record.revision + 1,
        }
    }
}

/// Diesel Queryable struct for ledger rows.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = notification_ledger)]
pub struct LedgerRow {
    pub entry_id: i64,
    pub call_number: String,
    pub notification_type: String,
    pub due_date: String,
    pub message: String,
    pub status: String,
    pub created_at: String,
    pub sent_at: Option<String>,
}

impl TryFrom<LedgerRow> for LedgerEntry {
    type Error = PersistenceError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        let corrupt = |e: towline_domain::DomainError| {
            PersistenceError::CorruptRow(format!("ledger entry {}: {e}", row.entry_id))
        };

        let call_number: CallNumber = CallNumber::new(&row.call_number).map_err(corrupt)?;
        let notification_type: NotificationType =
            row.notification_type.parse().map_err(corrupt)?;
        let status: DeliveryStatus = row.status.parse().map_err(corrupt)?;
        let due_date: Date = parse_iso_date(&row.due_date).map_err(corrupt)?;
        let created_at: PrimitiveDateTime = parse_timestamp(&row.created_at).map_err(corrupt)?;
        let sent_at: Option<PrimitiveDateTime> = row
            .sent_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .map_err(corrupt)?;

        Ok(Self {
            entry_id: row.entry_id,
            key: LedgerKey::new(call_number, notification_type, due_date),
            message: row.message,
            status,
            created_at,
            sent_at,
        })
    }
}

/// Diesel Queryable struct for status history rows.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = vehicle_status_history)]
pub struct StatusHistoryRow {
    pub history_id: i64,
    pub call_number: String,
    pub occurred_at: String,
    pub from_status: String,
    pub to_status: String,
    pub actor_id: String,
    pub actor_kind: String,
    pub cause_id: String,
    pub cause_description: String,
    pub note: Option<String>,
    pub audit_json: String,
}

impl TryFrom<StatusHistoryRow> for StatusHistoryEntry {
    type Error = PersistenceError;

    fn try_from(row: StatusHistoryRow) -> Result<Self, Self::Error> {
        let corrupt = |e: towline_domain::DomainError| {
            PersistenceError::CorruptRow(format!("history row {}: {e}", row.history_id))
        };

        Ok(Self {
            call_number: CallNumber::new(&row.call_number).map_err(corrupt)?,
            occurred_at: parse_timestamp(&row.occurred_at).map_err(corrupt)?,
            from_status: row.from_status.parse().map_err(corrupt)?,
            to_status: row.to_status.parse().map_err(corrupt)?,
            actor_id: row.actor_id,
            actor_kind: row.actor_kind,
            cause_id: row.cause_id,
            cause_description: row.cause_description,
            note: row.note,
        })
    }
}
