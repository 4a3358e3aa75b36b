// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The persistence port consumed by the workflow.
//!
//! The store is shared mutable state. Implementations must never assume
//! exclusive access: every status write is conditioned on the status the
//! caller last read.

use crate::archival::RepairCounts;
use crate::error::RepositoryError;
use crate::transition::TransitionResult;
use time::PrimitiveDateTime;
use towline_domain::{
    CallNumber, LedgerEntry, LedgerKey, NewLedgerEntry, NotificationType, Status, VehicleRecord,
};

/// One row of a vehicle's status history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusHistoryEntry {
    pub call_number: CallNumber,
    pub occurred_at: PrimitiveDateTime,
    pub from_status: Status,
    pub to_status: Status,
    pub actor_id: String,
    pub actor_kind: String,
    pub cause_id: String,
    pub cause_description: String,
    pub note: Option<String>,
}

/// Narrow repository interface over the vehicle store and notification ledger.
pub trait VehicleRepository: Send {
    /// Returns every vehicle whose status is in the active set, ordered by
    /// call number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Unavailable` if the store cannot be read.
    fn get_active_vehicles(&mut self) -> Result<Vec<VehicleRecord>, RepositoryError>;

    /// Returns one vehicle, or `None` if the call number is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_vehicle(
        &mut self,
        call_number: &CallNumber,
    ) -> Result<Option<VehicleRecord>, RepositoryError>;

    /// Inserts a new vehicle. As with [`Self::save_vehicle`], the stored
    /// `archived` flag follows `record.status`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the call number exists.
    fn insert_vehicle(&mut self, record: &VehicleRecord) -> Result<(), RepositoryError>;

    /// Writes `record` only if the stored status still equals
    /// `expected_prior_status` and the stored revision still equals
    /// `record.revision`. A successful write bumps the stored revision.
    ///
    /// The stored `archived` flag is derived from `record.status`; the
    /// record's own flag is ignored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the stored row differs and
    /// `RepositoryError::NotFound` if the vehicle does not exist.
    fn save_vehicle(
        &mut self,
        record: &VehicleRecord,
        expected_prior_status: Status,
    ) -> Result<(), RepositoryError>;

    /// Writes a transition's record and its history row atomically,
    /// conditioned on `result.previous_status`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::save_vehicle`]; nothing is written on error.
    fn persist_transition(&mut self, result: &TransitionResult) -> Result<(), RepositoryError>;

    /// Appends a pending ledger entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if an entry with the same key exists.
    fn append_ledger_entry(
        &mut self,
        entry: &NewLedgerEntry,
    ) -> Result<LedgerEntry, RepositoryError>;

    /// Marks a ledger entry delivered. Marking an already sent entry is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no entry has this key.
    fn mark_ledger_entry_sent(
        &mut self,
        key: &LedgerKey,
        sent_at: PrimitiveDateTime,
    ) -> Result<(), RepositoryError>;

    /// Returns the most recent ledger entry (latest due date) for a vehicle
    /// and notification type.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn find_ledger_entry(
        &mut self,
        call_number: &CallNumber,
        notification_type: NotificationType,
    ) -> Result<Option<LedgerEntry>, RepositoryError>;

    /// Returns a vehicle's pending ledger entries, oldest due date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn pending_ledger_entries(
        &mut self,
        call_number: &CallNumber,
    ) -> Result<Vec<LedgerEntry>, RepositoryError>;

    /// Sets `archived` from status on every record that disagrees.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn repair_archived_flags(&mut self) -> Result<RepairCounts, RepositoryError>;

    /// Returns a vehicle's status history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn status_history(
        &mut self,
        call_number: &CallNumber,
    ) -> Result<Vec<StatusHistoryEntry>, RepositoryError>;
}
