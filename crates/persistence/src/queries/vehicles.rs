// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;
use towline_domain::{CallNumber, Status, VehicleRecord};

use crate::data_models::VehicleRow;
use crate::diesel_schema::vehicles;
use crate::error::PersistenceError;

/// Loads every vehicle whose status is in the active set.
///
/// The archived flag is not consulted; status is authoritative.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be converted.
pub fn get_active_vehicles(
    conn: &mut SqliteConnection,
) -> Result<Vec<VehicleRecord>, PersistenceError> {
    let active: Vec<&str> = Status::ACTIVE.iter().map(Status::as_str).collect();

    let rows: Vec<VehicleRow> = vehicles::table
        .filter(vehicles::status.eq_any(active))
        .order(vehicles::call_number.asc())
        .select(VehicleRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("get_active_vehicles: {e}")))?;

    debug!(count = rows.len(), "Loaded active vehicles");
    rows.into_iter().map(VehicleRecord::try_from).collect()
}

/// Loads one vehicle by call number.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be converted.
/// Returns `Ok(None)` if the vehicle is not found.
pub fn get_vehicle(
    conn: &mut SqliteConnection,
    call_number: &CallNumber,
) -> Result<Option<VehicleRecord>, PersistenceError> {
    let row: Option<VehicleRow> = vehicles::table
        .filter(vehicles::call_number.eq(call_number.value()))
        .select(VehicleRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_vehicle: {e}")))?;

    row.map(VehicleRecord::try_from).transpose()
}

/// Returns true if a vehicle with this call number exists.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn vehicle_exists(
    conn: &mut SqliteConnection,
    call_number: &CallNumber,
) -> Result<bool, PersistenceError> {
    let count: i64 = vehicles::table
        .filter(vehicles::call_number.eq(call_number.value()))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}
