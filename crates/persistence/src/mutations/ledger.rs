// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use time::PrimitiveDateTime;
use tracing::debug;
use towline_domain::{
    DeliveryStatus, LedgerEntry, LedgerKey, NewLedgerEntry, format_iso_date, format_timestamp,
};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::notification_ledger;
use crate::error::PersistenceError;
use crate::queries::ledger::find_entry_by_key;

/// Appends a pending ledger entry.
///
/// The UNIQUE `(call_number, notification_type, due_date)` constraint makes
/// a second append for the same key fail rather than duplicate.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the key already exists.
pub fn append_entry(
    conn: &mut SqliteConnection,
    entry: &NewLedgerEntry,
) -> Result<LedgerEntry, PersistenceError> {
    diesel::insert_into(notification_ledger::table)
        .values((
            notification_ledger::call_number.eq(entry.key.call_number.value()),
            notification_ledger::notification_type.eq(entry.key.notification_type.as_str()),
            notification_ledger::due_date.eq(format_iso_date(entry.key.due_date)),
            notification_ledger::message.eq(&entry.message),
            notification_ledger::status.eq(DeliveryStatus::Pending.as_str()),
            notification_ledger::created_at.eq(format_timestamp(entry.created_at)),
        ))
        .execute(conn)?;

    let entry_id: i64 = get_last_insert_rowid(conn)?;
    debug!(entry_id, key = %entry.key, "Appended ledger entry");

    Ok(LedgerEntry {
        entry_id,
        key: entry.key.clone(),
        message: entry.message.clone(),
        status: DeliveryStatus::Pending,
        created_at: entry.created_at,
        sent_at: None,
    })
}

/// Moves a pending entry to `sent`. An entry that is already sent is left
/// unchanged.
///
/// # Errors
///
/// Returns `PersistenceError::LedgerEntryNotFound` if no entry has this key.
pub fn mark_sent(
    conn: &mut SqliteConnection,
    key: &LedgerKey,
    sent_at: PrimitiveDateTime,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        notification_ledger::table
            .filter(notification_ledger::call_number.eq(key.call_number.value()))
            .filter(notification_ledger::notification_type.eq(key.notification_type.as_str()))
            .filter(notification_ledger::due_date.eq(format_iso_date(key.due_date)))
            .filter(notification_ledger::status.eq(DeliveryStatus::Pending.as_str())),
    )
    .set((
        notification_ledger::status.eq(DeliveryStatus::Sent.as_str()),
        notification_ledger::sent_at.eq(Some(format_timestamp(sent_at))),
    ))
    .execute(conn)?;

    if updated == 0 && find_entry_by_key(conn, key)?.is_none() {
        return Err(PersistenceError::LedgerEntryNotFound(key.clone()));
    }

    Ok(())
}
