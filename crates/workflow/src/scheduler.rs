// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The daily notification sweep.
//!
//! For each active vehicle, in its own work unit:
//!
//! 1. Claim the vehicle; skip it if another sweep holds it.
//! 2. Offer every `pending` ledger entry to the channel again.
//! 3. Re-read the vehicle and compute its deadlines.
//! 4. For each due deadline, create the ledger entry if this due date has
//!    not been ledgered yet, and deliver it.
//! 5. If a due deadline implies an automatic advance, request its document
//!    (if any) and then apply and persist the transition, conditioned on the
//!    status read in step 3.
//!
//! A second run on the same day finds every entry already ledgered and
//! creates nothing.

use futures::StreamExt;
use futures::stream;
use std::sync::Arc;
use time::Date;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use towline::{
    PlannedAdvance, RepairCounts, RepositoryError, TransitionContext, TransitionError,
    TransitionResult, VehicleRepository, attempt_transition, planned_advance,
};
use towline_audit::{Actor, Cause};
use towline_domain::{
    CallNumber, Deadline, DeadlineEvaluation, LedgerEntry, LedgerKey, NewLedgerEntry,
    VehicleRecord, compute_deadlines, format_iso_date,
};

use crate::clock::Clock;
use crate::config::SchedulerConfig;
use crate::error::{DeliveryError, DocumentError, StoreError, SweepError};
use crate::locks::{VehicleLockGuard, VehicleLocks};
use crate::ports::{DocumentRequest, DocumentTrigger, Notification, NotificationChannel};
use crate::report::{
    DataQualityRecord, RepairReport, SweepReport, VehicleErrorKind, VehicleOutcome,
};
use crate::store::{SharedRepository, with_store};

/// Orchestrates the daily sweep and the archival repair pass.
pub struct NotificationScheduler<R> {
    repository: SharedRepository<R>,
    channel: Arc<dyn NotificationChannel>,
    documents: Arc<dyn DocumentTrigger>,
    clock: Arc<dyn Clock>,
    locks: VehicleLocks,
    config: SchedulerConfig,
}

impl<R: VehicleRepository> NotificationScheduler<R> {
    /// Creates a scheduler over the given store and collaborators.
    #[must_use]
    pub fn new(
        repository: SharedRepository<R>,
        channel: Arc<dyn NotificationChannel>,
        documents: Arc<dyn DocumentTrigger>,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            repository,
            channel,
            documents,
            clock,
            locks: VehicleLocks::new(),
            config,
        }
    }

    /// The per-vehicle claims held by running sweeps.
    #[must_use]
    pub const fn locks(&self) -> &VehicleLocks {
        &self.locks
    }

    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Today's date according to the scheduler's clock.
    #[must_use]
    pub fn today(&self) -> Date {
        self.clock.today()
    }

    /// Runs one sweep with deadlines evaluated against `today`.
    ///
    /// # Errors
    ///
    /// Returns `SweepError::StoreUnavailable` only if the list of active
    /// vehicles cannot be read. Every other failure is recorded in the report.
    pub async fn run_daily_sweep(&self, today: Date) -> Result<SweepReport, SweepError> {
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        self.run_daily_sweep_with_shutdown(today, shutdown_rx).await
    }

    /// Runs one sweep, stopping early if `shutdown` becomes `true`.
    ///
    /// Vehicles already in progress when shutdown is signalled are finished;
    /// no new vehicle is started. Unvisited vehicles are picked up by the
    /// next sweep.
    ///
    /// # Errors
    ///
    /// Returns `SweepError::StoreUnavailable` only if the list of active
    /// vehicles cannot be read.
    pub async fn run_daily_sweep_with_shutdown(
        &self,
        today: Date,
        shutdown: watch::Receiver<bool>,
    ) -> Result<SweepReport, SweepError> {
        info!(sweep_date = %format_iso_date(today), "Starting daily sweep");

        let vehicles: Vec<VehicleRecord> = with_store(
            &self.repository,
            self.config.store_timeout,
            VehicleRepository::get_active_vehicles,
        )
        .await
        .map_err(|e| {
            warn!(error = %e, "Daily sweep aborted: vehicle store unavailable");
            SweepError::StoreUnavailable(e)
        })?;

        let total: usize = vehicles.len();
        let mut report: SweepReport = SweepReport::new(today);
        let mut visited: usize = 0;

        let stop: watch::Receiver<bool> = shutdown.clone();
        let mut outcomes = stream::iter(vehicles)
            .take_while(move |_| futures::future::ready(!*stop.borrow()))
            .map(|vehicle| self.process_vehicle(vehicle, today))
            .buffer_unordered(self.config.effective_concurrency());

        while let Some(outcome) = outcomes.next().await {
            visited += 1;
            report.absorb(outcome);
        }

        report.cancelled = visited < total;
        report.finish();

        info!(
            sweep_date = %report.sweep_date,
            processed = report.vehicles_processed,
            skipped = report.vehicles_skipped,
            created = report.notifications_created,
            sent = report.notifications_sent,
            retried = report.notifications_retried,
            pending = report.notifications_pending,
            transitions = report.transitions_applied,
            errors = report.errors.len(),
            cancelled = report.cancelled,
            "Daily sweep finished"
        );

        Ok(report)
    }

    /// Sets `archived` from status on every record that disagrees.
    ///
    /// Safe to run at any time, including during a sweep: each correction is
    /// conditioned on the status it was computed from.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the store cannot be reached or written.
    pub async fn repair_archived_flags(&self) -> Result<RepairReport, StoreError> {
        let counts: RepairCounts = with_store(
            &self.repository,
            self.config.store_timeout,
            VehicleRepository::repair_archived_flags,
        )
        .await?;

        if counts.total() > 0 {
            warn!(
                fixed_active = counts.fixed_active,
                fixed_completed = counts.fixed_completed,
                "Archived flags had drifted from status"
            );
        }
        Ok(RepairReport::from(counts))
    }

    async fn process_vehicle(&self, vehicle: VehicleRecord, today: Date) -> VehicleOutcome {
        let call_number: CallNumber = vehicle.call_number;

        let Some(_claim): Option<VehicleLockGuard> = self.locks.try_acquire(&call_number) else {
            debug!(call_number = %call_number, "Vehicle is being processed by another sweep");
            return VehicleOutcome::skipped();
        };

        let mut outcome: VehicleOutcome = VehicleOutcome::default();

        self.retry_pending(&call_number, &mut outcome).await;

        let record: VehicleRecord = match with_store(
            &self.repository,
            self.config.store_timeout,
            |repository| repository.get_vehicle(&call_number),
        )
        .await
        {
            Ok(Some(record)) if record.status.is_active() => record,
            Ok(_) => {
                debug!(call_number = %call_number, "Vehicle left the active set before processing");
                outcome.skipped = true;
                return outcome;
            }
            Err(e) => {
                outcome.error(&call_number, VehicleErrorKind::Store, e.to_string());
                return outcome;
            }
        };

        let evaluation: DeadlineEvaluation =
            compute_deadlines(&record, today, &self.config.policy);
        for issue in &evaluation.issues {
            warn!(call_number = %call_number, issue = %issue, "Data quality issue");
            outcome
                .issues
                .push(DataQualityRecord::new(&call_number, issue));
        }

        for deadline in evaluation.due() {
            if let Err(e) = self.ensure_ledgered(&record, deadline, &mut outcome).await {
                outcome.error(&call_number, VehicleErrorKind::Store, e.to_string());
                return outcome;
            }

            if let Some(plan) =
                planned_advance(&record, deadline.notification_type, &self.config.policy)
            {
                self.advance(&record, deadline, plan, &mut outcome).await;
                break;
            }
        }

        outcome
    }

    async fn retry_pending(&self, call_number: &CallNumber, outcome: &mut VehicleOutcome) {
        let pending: Vec<LedgerEntry> = match with_store(
            &self.repository,
            self.config.store_timeout,
            |repository| repository.pending_ledger_entries(call_number),
        )
        .await
        {
            Ok(pending) => pending,
            Err(e) => {
                outcome.error(call_number, VehicleErrorKind::Store, e.to_string());
                return;
            }
        };

        for entry in &pending {
            outcome.retried += 1;
            debug!(key = %entry.key, "Retrying pending notification");
            self.deliver(&entry.key, &Notification::from(entry), outcome)
                .await;
        }
    }

    async fn ensure_ledgered(
        &self,
        record: &VehicleRecord,
        deadline: &Deadline,
        outcome: &mut VehicleOutcome,
    ) -> Result<(), StoreError> {
        let key: LedgerKey = LedgerKey::new(
            record.call_number.clone(),
            deadline.notification_type,
            deadline.due_date,
        );

        let existing: Option<LedgerEntry> = with_store(
            &self.repository,
            self.config.store_timeout,
            |repository| repository.find_ledger_entry(&key.call_number, key.notification_type),
        )
        .await?;
        if existing.is_some_and(|entry| entry.key.due_date == key.due_date) {
            return Ok(());
        }

        let entry: NewLedgerEntry = NewLedgerEntry {
            key: key.clone(),
            message: notification_message(record, deadline),
            created_at: self.clock.now(),
        };
        let appended: Result<LedgerEntry, StoreError> = with_store(
            &self.repository,
            self.config.store_timeout,
            |repository| repository.append_ledger_entry(&entry),
        )
        .await;

        match appended {
            Ok(entry) => {
                info!(
                    key = %entry.key,
                    overdue = deadline.is_overdue,
                    "Created notification ledger entry"
                );
                outcome.created += 1;
                self.deliver(&entry.key, &Notification::from(&entry), outcome)
                    .await;
                Ok(())
            }
            Err(StoreError::Repository(RepositoryError::Duplicate(_))) => {
                debug!(key = %key, "Ledger entry already present");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Offers one notification to the channel and marks it sent on success.
    ///
    /// Any failure leaves the entry pending for the next sweep.
    async fn deliver(
        &self,
        key: &LedgerKey,
        notification: &Notification,
        outcome: &mut VehicleOutcome,
    ) {
        let limit = self.config.notification_timeout;
        let delivered: Result<(), DeliveryError> =
            tokio::time::timeout(limit, self.channel.deliver(notification))
                .await
                .unwrap_or(Err(DeliveryError::Timeout(limit)));

        if let Err(e) = delivered {
            warn!(key = %key, error = %e, "Notification delivery failed; left pending");
            outcome.pending += 1;
            outcome.error(
                &key.call_number,
                VehicleErrorKind::NotificationDelivery,
                format!("{key}: {e}"),
            );
            return;
        }

        let sent_at = self.clock.now();
        match with_store(&self.repository, self.config.store_timeout, |repository| {
            repository.mark_ledger_entry_sent(key, sent_at)
        })
        .await
        {
            Ok(()) => outcome.sent += 1,
            Err(e) => {
                warn!(key = %key, error = %e, "Delivered notification could not be marked sent");
                outcome.pending += 1;
                outcome.error(&key.call_number, VehicleErrorKind::Store, e.to_string());
            }
        }
    }

    async fn advance(
        &self,
        record: &VehicleRecord,
        deadline: &Deadline,
        plan: PlannedAdvance,
        outcome: &mut VehicleOutcome,
    ) {
        let call_number: &CallNumber = &record.call_number;

        if let Some(document) = plan.document {
            let request: DocumentRequest = DocumentRequest {
                call_number: call_number.clone(),
                document,
                snapshot: record.clone(),
            };
            let limit = self.config.document_timeout;
            let generated: Result<(), DocumentError> =
                tokio::time::timeout(limit, self.documents.generate(&request))
                    .await
                    .unwrap_or(Err(DocumentError::Timeout(limit)));

            if let Err(e) = generated {
                warn!(call_number = %call_number, document = %document, error = %e, "Document generation failed; transition skipped");
                outcome.error(
                    call_number,
                    VehicleErrorKind::DocumentGeneration,
                    format!("{document}: {e}"),
                );
                return;
            }
            outcome.documents += 1;
        }

        let mut context: TransitionContext = TransitionContext::new(
            self.clock.now(),
            Actor::scheduler(),
            Cause::new(
                format!("deadline:{}", deadline.notification_type),
                format!(
                    "{} due {}",
                    deadline.notification_type.description(),
                    format_iso_date(deadline.due_date)
                ),
            ),
        );
        context.note = plan.document.map(|document| format!("{document} generated"));

        let transition: TransitionResult = match attempt_transition(record, plan.target, &context)
        {
            Ok(transition) => transition,
            Err(e) => {
                let kind: VehicleErrorKind = match e {
                    TransitionError::InvalidTransition { .. } => {
                        VehicleErrorKind::InvalidTransition
                    }
                    TransitionError::MissingPrerequisiteData { .. } => {
                        VehicleErrorKind::MissingPrerequisiteData
                    }
                };
                warn!(call_number = %call_number, error = %e, "Automatic transition rejected");
                outcome.error(call_number, kind, e.to_string());
                return;
            }
        };

        match with_store(&self.repository, self.config.store_timeout, |repository| {
            repository.persist_transition(&transition)
        })
        .await
        {
            Ok(()) => {
                info!(
                    call_number = %call_number,
                    from = %transition.previous_status,
                    to = %transition.record.status,
                    "Applied automatic transition"
                );
                outcome.transitions += 1;
            }
            Err(StoreError::Repository(e @ RepositoryError::Conflict { .. })) => {
                warn!(call_number = %call_number, error = %e, "Vehicle changed during sweep; will retry next sweep");
                outcome.error(
                    call_number,
                    VehicleErrorKind::PersistenceConflict,
                    e.to_string(),
                );
            }
            Err(e) => {
                outcome.error(call_number, VehicleErrorKind::Store, e.to_string());
            }
        }
    }
}

fn notification_message(record: &VehicleRecord, deadline: &Deadline) -> String {
    let timing: &str = if deadline.is_overdue { "overdue since" } else { "due" };
    format!(
        "{call_number}: {what} {timing} {due} for {vehicle}",
        call_number = record.call_number,
        what = deadline.notification_type.description(),
        due = format_iso_date(deadline.due_date),
        vehicle = record.description.summary(),
    )
}
