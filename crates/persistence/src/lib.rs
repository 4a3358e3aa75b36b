// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` persistence for the towline vehicle store.
//!
//! This crate owns three tables:
//!
//! - `vehicles` holds one row per towed vehicle, keyed by call number
//! - `notification_ledger` records every notification the scheduler
//!   created, unique per `(call_number, notification_type, due_date)`
//! - `vehicle_status_history` records one row per applied transition,
//!   including the serialized audit event
//!
//! ## Concurrency
//!
//! The adapter never holds an in-memory copy of a vehicle between calls.
//! Every status write is an `UPDATE ... WHERE status = ?` on the status the
//! caller last read, so an operator edit that lands between a read and a
//! write surfaces as a conflict instead of being overwritten.
//!
//! ## Testing
//!
//! `Persistence::new_in_memory()` creates an isolated shared-cache database
//! per call. Tests never touch the filesystem.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use time::PrimitiveDateTime;
use tracing::{debug, info, warn};
use towline::{RepairCounts, RepositoryError, StatusHistoryEntry, TransitionResult, VehicleRepository};
use towline_domain::{
    CallNumber, LedgerEntry, LedgerKey, NewLedgerEntry, NotificationType, Status, VehicleRecord,
};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use backend::sqlite::DEFAULT_BUSY_TIMEOUT;
pub use error::PersistenceError;

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Overrides how long statements wait on a locked database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the PRAGMA statement fails.
    pub fn set_busy_timeout(&mut self, timeout: Duration) -> Result<(), PersistenceError> {
        backend::sqlite::set_busy_timeout(&mut self.conn, timeout)
    }
}

impl VehicleRepository for Persistence {
    fn get_active_vehicles(&mut self) -> Result<Vec<VehicleRecord>, RepositoryError> {
        Ok(queries::vehicles::get_active_vehicles(&mut self.conn)?)
    }

    fn get_vehicle(
        &mut self,
        call_number: &CallNumber,
    ) -> Result<Option<VehicleRecord>, RepositoryError> {
        Ok(queries::vehicles::get_vehicle(&mut self.conn, call_number)?)
    }

    fn insert_vehicle(&mut self, record: &VehicleRecord) -> Result<(), RepositoryError> {
        mutations::vehicles::insert_vehicle(&mut self.conn, record).map_err(|e| {
            warn!(call_number = %record.call_number, error = %e, "Vehicle insert rejected");
            RepositoryError::from(e)
        })
    }

    fn save_vehicle(
        &mut self,
        record: &VehicleRecord,
        expected_prior_status: Status,
    ) -> Result<(), RepositoryError> {
        mutations::vehicles::save_vehicle(&mut self.conn, record, expected_prior_status)?;
        debug!(call_number = %record.call_number, status = %record.status, "Saved vehicle");
        Ok(())
    }

    fn persist_transition(&mut self, result: &TransitionResult) -> Result<(), RepositoryError> {
        Ok(mutations::vehicles::persist_transition(&mut self.conn, result)?)
    }

    fn append_ledger_entry(
        &mut self,
        entry: &NewLedgerEntry,
    ) -> Result<LedgerEntry, RepositoryError> {
        Ok(mutations::ledger::append_entry(&mut self.conn, entry)?)
    }

    fn mark_ledger_entry_sent(
        &mut self,
        key: &LedgerKey,
        sent_at: PrimitiveDateTime,
    ) -> Result<(), RepositoryError> {
        mutations::ledger::mark_sent(&mut self.conn, key, sent_at)?;
        debug!(key = %key, "Marked ledger entry sent");
        Ok(())
    }

    fn find_ledger_entry(
        &mut self,
        call_number: &CallNumber,
        notification_type: NotificationType,
    ) -> Result<Option<LedgerEntry>, RepositoryError> {
        Ok(queries::ledger::find_latest_entry(
            &mut self.conn,
            call_number,
            notification_type,
        )?)
    }

    fn pending_ledger_entries(
        &mut self,
        call_number: &CallNumber,
    ) -> Result<Vec<LedgerEntry>, RepositoryError> {
        Ok(queries::ledger::pending_entries(&mut self.conn, call_number)?)
    }

    fn repair_archived_flags(&mut self) -> Result<RepairCounts, RepositoryError> {
        let counts: RepairCounts = mutations::repair::repair_archived_flags(&mut self.conn)?;
        info!(
            fixed_active = counts.fixed_active,
            fixed_completed = counts.fixed_completed,
            "Repaired archived flags"
        );
        Ok(counts)
    }

    fn status_history(
        &mut self,
        call_number: &CallNumber,
    ) -> Result<Vec<StatusHistoryEntry>, RepositoryError> {
        Ok(queries::history::status_history(&mut self.conn, call_number)?)
    }
}
