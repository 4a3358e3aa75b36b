// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use towline::RepairCounts;
use towline_domain::Status;

use crate::diesel_schema::vehicles;
use crate::error::PersistenceError;

/// Sets `archived` from status on every row that disagrees.
///
/// Each statement re-checks status in its own WHERE clause, so a concurrent
/// status write can never be overwritten with a stale flag.
///
/// # Errors
///
/// Returns an error if either update fails. Nothing is committed on error.
pub fn repair_archived_flags(conn: &mut SqliteConnection) -> Result<RepairCounts, PersistenceError> {
    let active: Vec<&str> = Status::ACTIVE.iter().map(Status::as_str).collect();
    let terminal: Vec<&str> = Status::TERMINAL.iter().map(Status::as_str).collect();

    conn.transaction::<RepairCounts, PersistenceError, _>(|conn| {
        let fixed_active: usize = diesel::update(
            vehicles::table
                .filter(vehicles::status.eq_any(&active))
                .filter(vehicles::archived.ne(0)),
        )
        .set(vehicles::archived.eq(0))
        .execute(conn)?;

        let fixed_completed: usize = diesel::update(
            vehicles::table
                .filter(vehicles::status.eq_any(&terminal))
                .filter(vehicles::archived.eq(0)),
        )
        .set(vehicles::archived.eq(1))
        .execute(conn)?;

        Ok(RepairCounts {
            fixed_active,
            fixed_completed,
        })
    })
}
