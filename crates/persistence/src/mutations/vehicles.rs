// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};
use towline::TransitionResult;
use towline_domain::{Status, VehicleRecord, format_timestamp};

use crate::data_models::{NewVehicleRow, VehicleChangeset};
use crate::diesel_schema::{vehicle_status_history, vehicles};
use crate::error::PersistenceError;
use crate::queries::vehicles::vehicle_exists;

/// Inserts a new vehicle.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the call number exists.
pub fn insert_vehicle(
    conn: &mut SqliteConnection,
    record: &VehicleRecord,
) -> Result<(), PersistenceError> {
    diesel::insert_into(vehicles::table)
        .values(NewVehicleRow::from(record))
        .execute(conn)?;
    debug!(call_number = %record.call_number, status = %record.status, "Inserted vehicle");
    Ok(())
}

/// Overwrites a vehicle row if its stored status equals `expected_prior_status`
/// and its stored revision equals `record.revision`.
///
/// The stored revision is bumped on success, so any other copy read before
/// this write becomes stale.
///
/// # Errors
///
/// Returns `PersistenceError::StatusConflict` if the row changed since it
/// was read and `PersistenceError::VehicleNotFound` if the vehicle is gone.
pub fn save_vehicle(
    conn: &mut SqliteConnection,
    record: &VehicleRecord,
    expected_prior_status: Status,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        vehicles::table
            .filter(vehicles::call_number.eq(record.call_number.value()))
            .filter(vehicles::status.eq(expected_prior_status.as_str()))
            .filter(vehicles::revision.eq(record.revision)),
    )
    .set(VehicleChangeset::from(record))
    .execute(conn)?;

    if updated == 0 {
        if vehicle_exists(conn, &record.call_number)? {
            debug!(
                call_number = %record.call_number,
                revision = record.revision,
                "Vehicle changed since it was read"
            );
            return Err(PersistenceError::StatusConflict {
                call_number: record.call_number.clone(),
                expected: expected_prior_status,
            });
        }
        return Err(PersistenceError::VehicleNotFound(record.call_number.clone()));
    }

    Ok(())
}

/// Writes a transition's record and history row in one transaction.
///
/// # Errors
///
/// Returns an error if the conditional write fails or the history row
/// cannot be written. Nothing is committed on error.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<(), PersistenceError> {
    let event = &result.audit_event;
    let audit_json: String = serde_json::to_string(event)?;

    conn.transaction::<(), PersistenceError, _>(|conn| {
        save_vehicle(conn, &result.record, result.previous_status)?;

        diesel::insert_into(vehicle_status_history::table)
            .values((
                vehicle_status_history::call_number.eq(event.call_number.value()),
                vehicle_status_history::occurred_at.eq(format_timestamp(event.occurred_at)),
                vehicle_status_history::from_status.eq(event.action.from.as_str()),
                vehicle_status_history::to_status.eq(event.action.to.as_str()),
                vehicle_status_history::actor_id.eq(&event.actor.id),
                vehicle_status_history::actor_kind.eq(event.actor.kind.as_str()),
                vehicle_status_history::cause_id.eq(&event.cause.id),
                vehicle_status_history::cause_description.eq(&event.cause.description),
                vehicle_status_history::note.eq(event.action.details.as_deref()),
                vehicle_status_history::audit_json.eq(&audit_json),
            ))
            .execute(conn)?;

        Ok(())
    })?;

    info!(
        call_number = %event.call_number,
        from = %event.action.from,
        to = %event.action.to,
        actor = %event.actor.id,
        "Persisted status transition"
    );
    Ok(())
}
