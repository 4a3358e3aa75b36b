// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Sweep and repair results.
//!
//! These are the authoritative outcome of a run and are returned to the
//! caller. Logging mirrors them but is never the only record.

use serde::Serialize;
use time::Date;
use towline::RepairCounts;
use towline_domain::{CallNumber, DataQualityIssue, NotificationType, format_iso_date};

/// Category of a per-vehicle failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleErrorKind {
    /// The notification channel failed or timed out; the entry stays pending.
    NotificationDelivery,
    /// The document collaborator failed; no transition was attempted.
    DocumentGeneration,
    /// The transition engine rejected the target status.
    InvalidTransition,
    /// The transition engine found a required date missing.
    MissingPrerequisiteData,
    /// The vehicle changed between read and write; retried next sweep.
    PersistenceConflict,
    /// The store failed or timed out for this vehicle.
    Store,
}

/// One failure recorded against one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct VehicleError {
    pub call_number: CallNumber,
    pub kind: VehicleErrorKind,
    pub message: String,
}

/// A source date that kept a deadline rule from being evaluated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DataQualityRecord {
    pub call_number: CallNumber,
    pub rule: NotificationType,
    pub field: String,
    pub problem: String,
}

impl DataQualityRecord {
    pub(crate) fn new(call_number: &CallNumber, issue: &DataQualityIssue) -> Self {
        Self {
            call_number: call_number.clone(),
            rule: issue.rule,
            field: issue.field.to_string(),
            problem: issue.problem.to_string(),
        }
    }
}

/// Outcome of one daily sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// The calendar day deadlines were evaluated against.
    pub sweep_date: String,
    /// Active vehicles whose deadlines were evaluated.
    pub vehicles_processed: usize,
    /// Vehicles left alone: claimed by another sweep, or no longer active.
    pub vehicles_skipped: usize,
    pub notifications_created: usize,
    pub notifications_sent: usize,
    /// Pending entries from earlier sweeps offered to the channel again.
    pub notifications_retried: usize,
    /// Entries still pending when the sweep finished.
    pub notifications_pending: usize,
    pub transitions_applied: usize,
    pub documents_generated: usize,
    pub data_quality_issues: Vec<DataQualityRecord>,
    pub errors: Vec<VehicleError>,
    /// True if shutdown stopped the sweep before every vehicle was visited.
    pub cancelled: bool,
}

impl SweepReport {
    pub(crate) fn new(sweep_date: Date) -> Self {
        Self {
            sweep_date: format_iso_date(sweep_date),
            vehicles_processed: 0,
            vehicles_skipped: 0,
            notifications_created: 0,
            notifications_sent: 0,
            notifications_retried: 0,
            notifications_pending: 0,
            transitions_applied: 0,
            documents_generated: 0,
            data_quality_issues: Vec::new(),
            errors: Vec::new(),
            cancelled: false,
        }
    }

    pub(crate) fn absorb(&mut self, outcome: VehicleOutcome) {
        if outcome.skipped {
            self.vehicles_skipped += 1;
        } else {
            self.vehicles_processed += 1;
        }
        self.notifications_created += outcome.created;
        self.notifications_sent += outcome.sent;
        self.notifications_retried += outcome.retried;
        self.notifications_pending += outcome.pending;
        self.transitions_applied += outcome.transitions;
        self.documents_generated += outcome.documents;
        self.data_quality_issues.extend(outcome.issues);
        self.errors.extend(outcome.errors);
    }

    /// Orders issues and errors by vehicle so reports from concurrent runs
    /// compare equal.
    pub(crate) fn finish(&mut self) {
        self.data_quality_issues.sort();
        self.errors.sort();
    }

    /// Errors of one kind.
    pub fn errors_of(&self, kind: VehicleErrorKind) -> impl Iterator<Item = &VehicleError> {
        self.errors.iter().filter(move |error| error.kind == kind)
    }
}

/// Tallies for one vehicle's work unit.
#[derive(Debug, Default)]
pub(crate) struct VehicleOutcome {
    pub skipped: bool,
    pub created: usize,
    pub sent: usize,
    pub retried: usize,
    pub pending: usize,
    pub transitions: usize,
    pub documents: usize,
    pub issues: Vec<DataQualityRecord>,
    pub errors: Vec<VehicleError>,
}

impl VehicleOutcome {
    pub(crate) fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub(crate) fn error(
        &mut self,
        call_number: &CallNumber,
        kind: VehicleErrorKind,
        message: impl Into<String>,
    ) {
        self.errors.push(VehicleError {
            call_number: call_number.clone(),
            kind,
            message: message.into(),
        });
    }
}

/// Outcome of one archival repair pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    /// Active records whose `archived` flag was cleared.
    pub fixed_active: usize,
    /// Completed records whose `archived` flag was set.
    pub fixed_completed: usize,
}

impl From<RepairCounts> for RepairReport {
    fn from(counts: RepairCounts) -> Self {
        Self {
            fixed_active: counts.fixed_active,
            fixed_completed: counts.fixed_completed,
        }
    }
}
