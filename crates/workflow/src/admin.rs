// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator-initiated operations on individual vehicles.
//!
//! Every write here uses the same status-conditioned store calls as the
//! sweep, so an operator edit and a concurrent sweep can never silently
//! overwrite one another.

use serde::Serialize;
use std::sync::Arc;
use time::{Date, PrimitiveDateTime};
use tracing::{info, warn};
use towline::{
    RepositoryError, StatusHistoryEntry, TransitionContext, TransitionResult, VehicleCorrection,
    VehicleRepository, apply_correction, attempt_transition,
};
use towline_audit::{Actor, Cause};
use towline_domain::{
    CallNumber, DeadlineEvaluation, DeadlinePolicy, RecordedDate, Status, VehicleRecord,
    compute_deadlines, format_iso_date, format_timestamp,
};

use crate::clock::Clock;
use crate::error::{AdminError, ImportError};
use crate::import::{ImportReport, ImportRowOutcome, ImportRowResult, ParsedRow, parse_vehicle_csv};
use crate::store::{SharedRepository, with_store};

/// A deadline as shown to an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlineView {
    pub notification_type: String,
    pub description: String,
    pub due_date: String,
    pub is_due: bool,
    pub is_overdue: bool,
}

/// One status history row as shown to an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryView {
    pub occurred_at: String,
    pub from_status: String,
    pub to_status: String,
    pub actor_id: String,
    pub actor_kind: String,
    pub cause: String,
    pub note: Option<String>,
}

impl From<StatusHistoryEntry> for HistoryView {
    fn from(entry: StatusHistoryEntry) -> Self {
        Self {
            occurred_at: format_timestamp(entry.occurred_at),
            from_status: entry.from_status.as_str().to_string(),
            to_status: entry.to_status.as_str().to_string(),
            actor_id: entry.actor_id,
            actor_kind: entry.actor_kind,
            cause: entry.cause_description,
            note: entry.note,
        }
    }
}

/// A vehicle with its current deadlines and history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleView {
    pub call_number: String,
    pub status: String,
    pub archived: bool,
    pub summary: String,
    pub vin: Option<String>,
    pub plate: Option<String>,
    pub plate_state: Option<String>,
    pub jurisdiction: Option<String>,
    pub tow_date: Option<String>,
    pub top_sent_date: Option<String>,
    pub tr52_sent_date: Option<String>,
    pub tr208_sent_date: Option<String>,
    pub outcome_date: Option<String>,
    pub outcome_note: Option<String>,
    pub last_updated: Option<String>,
    pub deadlines: Vec<DeadlineView>,
    pub data_quality_issues: Vec<String>,
    pub history: Vec<HistoryView>,
}

impl VehicleView {
    fn build(
        record: &VehicleRecord,
        evaluation: &DeadlineEvaluation,
        history: Vec<StatusHistoryEntry>,
    ) -> Self {
        let stored = |date: Option<&RecordedDate>| date.map(RecordedDate::to_stored);
        Self {
            call_number: record.call_number.value().to_string(),
            status: record.status.as_str().to_string(),
            archived: record.archived,
            summary: record.description.summary(),
            vin: record.description.vin.clone(),
            plate: record.description.plate.clone(),
            plate_state: record.description.plate_state.clone(),
            jurisdiction: record.jurisdiction.clone(),
            tow_date: stored(record.tow_date.as_ref()),
            top_sent_date: stored(record.top_sent_date.as_ref()),
            tr52_sent_date: stored(record.tr52_sent_date.as_ref()),
            tr208_sent_date: stored(record.tr208_sent_date.as_ref()),
            outcome_date: stored(record.outcome_date.as_ref()),
            outcome_note: record.outcome_note.clone(),
            last_updated: record.last_updated.map(format_timestamp),
            deadlines: evaluation
                .deadlines
                .iter()
                .map(|deadline| DeadlineView {
                    notification_type: deadline.notification_type.as_str().to_string(),
                    description: deadline.notification_type.description().to_string(),
                    due_date: format_iso_date(deadline.due_date),
                    is_due: deadline.is_due,
                    is_overdue: deadline.is_overdue,
                })
                .collect(),
            data_quality_issues: evaluation.issues.iter().map(ToString::to_string).collect(),
            history: history.into_iter().map(HistoryView::from).collect(),
        }
    }
}

/// An operator's request to move a vehicle to a new status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualTransition {
    pub target: Status,
    pub operator: String,
    /// The real-world date of the event, if not today.
    pub event_date: Option<Date>,
    pub note: Option<String>,
}

/// Administrative operations over the shared vehicle store.
pub struct VehicleAdmin<R> {
    repository: SharedRepository<R>,
    clock: Arc<dyn Clock>,
    policy: DeadlinePolicy,
    store_timeout: std::time::Duration,
}

impl<R: VehicleRepository> VehicleAdmin<R> {
    #[must_use]
    pub fn new(
        repository: SharedRepository<R>,
        clock: Arc<dyn Clock>,
        policy: DeadlinePolicy,
        store_timeout: std::time::Duration,
    ) -> Self {
        Self {
            repository,
            clock,
            policy,
            store_timeout,
        }
    }

    /// Loads a vehicle with its deadlines as of today and its history.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::VehicleNotFound` for an unknown call number.
    pub async fn vehicle_view(&self, call_number: &str) -> Result<VehicleView, AdminError> {
        let call_number: CallNumber = CallNumber::new(call_number)?;
        let (record, history) = with_store(&self.repository, self.store_timeout, |repository| {
            let record: Option<VehicleRecord> = repository.get_vehicle(&call_number)?;
            let history: Vec<StatusHistoryEntry> = repository.status_history(&call_number)?;
            Ok((record, history))
        })
        .await?;

        let record: VehicleRecord =
            record.ok_or_else(|| AdminError::VehicleNotFound(call_number.value().to_string()))?;
        Ok(self.view_of(&record, history))
    }

    /// Applies an operator transition, including the `Released` escape valve
    /// and terminal outcomes.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Transition` if the engine rejects the target,
    /// `AdminError::Conflict` if the vehicle changed since it was read, and
    /// `AdminError::VehicleNotFound` for an unknown call number.
    pub async fn transition_vehicle(
        &self,
        call_number: &str,
        request: ManualTransition,
    ) -> Result<VehicleView, AdminError> {
        let call_number: CallNumber = CallNumber::new(call_number)?;
        let record: VehicleRecord = self.load(&call_number).await?;

        let mut context: TransitionContext = TransitionContext::new(
            self.clock.now(),
            Actor::operator(&request.operator),
            Cause::new(
                String::from("manual-transition"),
                format!("Operator set status to {}", request.target),
            ),
        );
        context.event_date = request.event_date;
        context.note = request.note;

        let transition: TransitionResult = attempt_transition(&record, request.target, &context)
            .map_err(|e| {
                warn!(call_number = %call_number, error = %e, "Manual transition rejected");
                AdminError::from(e)
            })?;

        with_store(&self.repository, self.store_timeout, |repository| {
            repository.persist_transition(&transition)
        })
        .await?;

        info!(
            call_number = %call_number,
            from = %transition.previous_status,
            to = %transition.record.status,
            operator = %request.operator,
            "Applied manual transition"
        );
        self.vehicle_view(call_number.value()).await
    }

    /// Corrects descriptive fields and dates. Status is never changed here.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::EmptyCorrection` if nothing would change,
    /// `AdminError::Conflict` if the vehicle changed since it was read, and
    /// `AdminError::VehicleNotFound` for an unknown call number.
    pub async fn correct_vehicle(
        &self,
        call_number: &str,
        correction: &VehicleCorrection,
    ) -> Result<VehicleView, AdminError> {
        if correction.is_empty() {
            return Err(AdminError::EmptyCorrection);
        }

        let call_number: CallNumber = CallNumber::new(call_number)?;
        let record: VehicleRecord = self.load(&call_number).await?;
        let corrected: VehicleRecord = apply_correction(&record, correction, self.clock.now());

        with_store(&self.repository, self.store_timeout, |repository| {
            repository.save_vehicle(&corrected, record.status)
        })
        .await?;

        info!(call_number = %call_number, "Applied vehicle correction");
        self.vehicle_view(call_number.value()).await
    }

    /// Normalizes and inserts every acceptable row of an intake CSV.
    ///
    /// Existing vehicles are reported as duplicates and left untouched.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::InvalidCsvFormat` if the file cannot be read
    /// and `ImportError::Store` if the store is unreachable.
    pub async fn import_csv(&self, csv_content: &str) -> Result<ImportReport, ImportError> {
        let at: PrimitiveDateTime = self.clock.now();
        let parsed: Vec<ParsedRow> = parse_vehicle_csv(csv_content, at)?;

        let rows: Vec<ImportRowResult> =
            with_store(&self.repository, self.store_timeout, |repository| {
                Ok(parsed
                    .into_iter()
                    .map(|row| insert_row(repository, row))
                    .collect())
            })
            .await?;

        let report: ImportReport = ImportReport::from_rows(rows);
        info!(
            total = report.total_rows,
            imported = report.imported_count,
            duplicates = report.duplicate_count,
            rejected = report.rejected_count,
            "Imported vehicle CSV"
        );
        Ok(report)
    }

    async fn load(&self, call_number: &CallNumber) -> Result<VehicleRecord, AdminError> {
        with_store(&self.repository, self.store_timeout, |repository| {
            repository.get_vehicle(call_number)
        })
        .await?
        .ok_or_else(|| AdminError::VehicleNotFound(call_number.value().to_string()))
    }

    fn view_of(&self, record: &VehicleRecord, history: Vec<StatusHistoryEntry>) -> VehicleView {
        let evaluation: DeadlineEvaluation =
            compute_deadlines(record, self.clock.today(), &self.policy);
        VehicleView::build(record, &evaluation, history)
    }
}

fn insert_row<R: VehicleRepository>(repository: &mut R, row: ParsedRow) -> ImportRowResult {
    let (outcome, errors): (ImportRowOutcome, Vec<String>) = match row.result {
        Err(errors) => (ImportRowOutcome::Rejected, errors),
        Ok(vehicle) => match repository.insert_vehicle(&vehicle) {
            Ok(()) => (ImportRowOutcome::Imported, Vec::new()),
            Err(RepositoryError::Duplicate(_)) => (
                ImportRowOutcome::Duplicate,
                vec![format!("call_number: '{}' already exists", vehicle.call_number)],
            ),
            Err(e) => (ImportRowOutcome::Rejected, vec![e.to_string()]),
        },
    };

    ImportRowResult {
        row_number: row.row_number,
        call_number: row.call_number,
        outcome,
        errors,
    }
}
