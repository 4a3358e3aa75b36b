// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod history_tests;

use diesel::prelude::*;
use time::PrimitiveDateTime;
use time::macros::{date, datetime};
use towline::{TransitionContext, VehicleRepository};
use towline_audit::{Actor, Cause};
use towline_domain::{CallNumber, RecordedDate, Status, VehicleRecord};

use crate::Persistence;
use crate::diesel_schema::vehicles;

pub fn create_test_context() -> TransitionContext {
    TransitionContext::new(
        datetime!(2025-02-01 09:30:00),
        Actor::operator("clerk-1"),
        Cause::new(String::from("test-cause"), String::from("Test operation")),
    )
}

pub fn create_test_vehicle(call_number: &str, status: Status) -> VehicleRecord {
    let mut record: VehicleRecord = VehicleRecord::new(
        CallNumber::new(call_number).expect("valid call number"),
        Some(RecordedDate::Valid(date!(2025 - 01 - 01))),
    );
    record.status = status;
    record.archived = status.archived_flag();
    record.jurisdiction = Some(String::from("Rockville"));
    record.description.make = Some(String::from("Honda"));
    record.description.model_year = Some(2012);
    record
}

pub fn created_at() -> PrimitiveDateTime {
    datetime!(2025-01-08 06:00:00)
}

/// Returns an in-memory store holding the given vehicles.
pub fn persistence_with(vehicles: &[VehicleRecord]) -> Persistence {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("in-memory database");
    for vehicle in vehicles {
        persistence.insert_vehicle(vehicle).expect("insert vehicle");
    }
    persistence
}

/// Overwrites a stored archived flag directly, leaving status alone.
///
/// Every repository write derives the flag from status, so drifted rows
/// can only be produced underneath it.
pub fn force_archived_flag(persistence: &mut Persistence, call_number: &str, archived: bool) {
    let updated: usize = diesel::update(vehicles::table.find(call_number))
        .set(vehicles::archived.eq(i32::from(archived)))
        .execute(&mut persistence.conn)
        .expect("update archived flag");
    assert_eq!(updated, 1, "{call_number} not stored");
}
