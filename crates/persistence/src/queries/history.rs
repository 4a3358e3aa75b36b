// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use towline::StatusHistoryEntry;
use towline_domain::CallNumber;

use crate::data_models::StatusHistoryRow;
use crate::diesel_schema::vehicle_status_history;
use crate::error::PersistenceError;

/// Returns a vehicle's status history in the order it was written.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be converted.
pub fn status_history(
    conn: &mut SqliteConnection,
    call_number: &CallNumber,
) -> Result<Vec<StatusHistoryEntry>, PersistenceError> {
    let rows: Vec<StatusHistoryRow> = vehicle_status_history::table
        .filter(vehicle_status_history::call_number.eq(call_number.value()))
        .order(vehicle_status_history::history_id.asc())
        .select(StatusHistoryRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("status_history: {e}")))?;

    rows.into_iter().map(StatusHistoryEntry::try_from).collect()
}
