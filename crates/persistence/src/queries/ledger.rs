// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use towline_domain::{
    CallNumber, DeliveryStatus, LedgerEntry, LedgerKey, NotificationType, format_iso_date,
};

use crate::data_models::LedgerRow;
use crate::diesel_schema::notification_ledger;
use crate::error::PersistenceError;

/// Returns the entry with the latest due date for a vehicle and type.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be converted.
pub fn find_latest_entry(
    conn: &mut SqliteConnection,
    call_number: &CallNumber,
    notification_type: NotificationType,
) -> Result<Option<LedgerEntry>, PersistenceError> {
    let row: Option<LedgerRow> = notification_ledger::table
        .filter(notification_ledger::call_number.eq(call_number.value()))
        .filter(notification_ledger::notification_type.eq(notification_type.as_str()))
        .order((
            notification_ledger::due_date.desc(),
            notification_ledger::entry_id.desc(),
        ))
        .select(LedgerRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("find_latest_entry: {e}")))?;

    row.map(LedgerEntry::try_from).transpose()
}

/// Returns the entry stored under an exact key.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be converted.
pub fn find_entry_by_key(
    conn: &mut SqliteConnection,
    key: &LedgerKey,
) -> Result<Option<LedgerEntry>, PersistenceError> {
    let row: Option<LedgerRow> = notification_ledger::table
        .filter(notification_ledger::call_number.eq(key.call_number.value()))
        .filter(notification_ledger::notification_type.eq(key.notification_type.as_str()))
        .filter(notification_ledger::due_date.eq(format_iso_date(key.due_date)))
        .select(LedgerRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("find_entry_by_key: {e}")))?;

    row.map(LedgerEntry::try_from).transpose()
}

/// Returns a vehicle's pending entries, oldest due date first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be converted.
pub fn pending_entries(
    conn: &mut SqliteConnection,
    call_number: &CallNumber,
) -> Result<Vec<LedgerEntry>, PersistenceError> {
    let rows: Vec<LedgerRow> = notification_ledger::table
        .filter(notification_ledger::call_number.eq(call_number.value()))
        .filter(notification_ledger::status.eq(DeliveryStatus::Pending.as_str()))
        .order((
            notification_ledger::due_date.asc(),
            notification_ledger::entry_id.asc(),
        ))
        .select(LedgerRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("pending_entries: {e}")))?;

    rows.into_iter().map(LedgerEntry::try_from).collect()
}
