// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory collaborators with fault injection.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use time::PrimitiveDateTime;
use time::macros::{date, datetime};
use tokio::sync::Mutex as AsyncMutex;
use towline::{
    RepairCounts, RepositoryError, StatusHistoryEntry, TransitionResult, VehicleRepository,
};
use towline_domain::{
    CallNumber, DeliveryStatus, LedgerEntry, LedgerKey, NewLedgerEntry, NotificationType,
    RecordedDate, Status, VehicleRecord,
};

use crate::{
    Clock, DeliveryError, DocumentError, DocumentRequest, DocumentTrigger, FixedClock,
    Notification, NotificationChannel, NotificationScheduler, SchedulerConfig, SharedRepository,
    VehicleAdmin,
};

pub fn call(value: &str) -> CallNumber {
    CallNumber::new(value).expect("valid call number")
}

/// A `New` vehicle towed 2025-01-01.
pub fn towed_vehicle(call_number: &str) -> VehicleRecord {
    let mut record: VehicleRecord = VehicleRecord::new(
        call(call_number),
        Some(RecordedDate::Valid(date!(2025 - 01 - 01))),
    );
    record.description.make = Some(String::from("Honda"));
    record.description.model = Some(String::from("Civic"));
    record.description.model_year = Some(2014);
    record
}

pub fn vehicle_in(call_number: &str, status: Status) -> VehicleRecord {
    let mut record: VehicleRecord = towed_vehicle(call_number);
    record.status = status;
    record.archived = status.archived_flag();
    record
}

/// Vehicle store kept in memory.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    pub vehicles: BTreeMap<CallNumber, VehicleRecord>,
    pub ledger: Vec<LedgerEntry>,
    pub history: Vec<StatusHistoryEntry>,
    /// Every call fails with `Unavailable` while set.
    pub unavailable: bool,
    /// Status an operator sets on the vehicle just before the next write.
    pub concurrent_edits: HashMap<CallNumber, Status>,
}

impl MemoryRepository {
    pub fn with_vehicles(vehicles: Vec<VehicleRecord>) -> Self {
        Self {
            vehicles: vehicles
                .into_iter()
                .map(|v| (v.call_number.clone(), v))
                .collect(),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.unavailable {
            return Err(RepositoryError::Unavailable(String::from(
                "store offline",
            )));
        }
        Ok(())
    }

    fn apply_concurrent_edit(&mut self, call_number: &CallNumber) {
        if let Some(status) = self.concurrent_edits.remove(call_number)
            && let Some(stored) = self.vehicles.get_mut(call_number)
        {
            stored.status = status;
            stored.archived = status.archived_flag();
            stored.revision += 1;
        }
    }

    pub fn ledger_for(&self, call_number: &str) -> Vec<&LedgerEntry> {
        self.ledger
            .iter()
            .filter(|entry| entry.key.call_number.value() == call_number)
            .collect()
    }
}

impl VehicleRepository for MemoryRepository {
    fn get_active_vehicles(&mut self) -> Result<Vec<VehicleRecord>, RepositoryError> {
        self.check()?;
        Ok(self
            .vehicles
            .values()
            .filter(|v| v.status.is_active())
            .cloned()
            .collect())
    }

    fn get_vehicle(
        &mut self,
        call_number: &CallNumber,
    ) -> Result<Option<VehicleRecord>, RepositoryError> {
        self.check()?;
        Ok(self.vehicles.get(call_number).cloned())
    }

    fn insert_vehicle(&mut self, record: &VehicleRecord) -> Result<(), RepositoryError> {
        self.check()?;
        if self.vehicles.contains_key(&record.call_number) {
            return Err(RepositoryError::Duplicate(record.call_number.to_string()));
        }
        let mut stored: VehicleRecord = record.clone();
        stored.archived = stored.status.archived_flag();
        self.vehicles.insert(record.call_number.clone(), stored);
        Ok(())
    }

    fn save_vehicle(
        &mut self,
        record: &VehicleRecord,
        expected_prior_status: Status,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        self.apply_concurrent_edit(&record.call_number);
        let stored: &mut VehicleRecord = self
            .vehicles
            .get_mut(&record.call_number)
            .ok_or_else(|| RepositoryError::NotFound(record.call_number.clone()))?;
        if stored.status != expected_prior_status || stored.revision != record.revision {
            return Err(RepositoryError::Conflict {
                call_number: record.call_number.clone(),
                expected: expected_prior_status,
            });
        }
        *stored = record.clone();
        stored.archived = stored.status.archived_flag();
        stored.revision = record.revision + 1;
        Ok(())
    }

    fn persist_transition(&mut self, result: &TransitionResult) -> Result<(), RepositoryError> {
        self.save_vehicle(&result.record, result.previous_status)?;
        let event = &result.audit_event;
        self.history.push(StatusHistoryEntry {
            call_number: event.call_number.clone(),
            occurred_at: event.occurred_at,
            from_status: event.action.from,
            to_status: event.action.to,
            actor_id: event.actor.id.clone(),
            actor_kind: event.actor.kind.as_str().to_string(),
            cause_id: event.cause.id.clone(),
            cause_description: event.cause.description.clone(),
            note: event.action.details.clone(),
        });
        Ok(())
    }

    fn append_ledger_entry(
        &mut self,
        entry: &NewLedgerEntry,
    ) -> Result<LedgerEntry, RepositoryError> {
        self.check()?;
        if self.ledger.iter().any(|existing| existing.key == entry.key) {
            return Err(RepositoryError::Duplicate(entry.key.to_string()));
        }
        let stored: LedgerEntry = LedgerEntry {
            entry_id: i64::try_from(self.ledger.len()).unwrap() + 1,
            key: entry.key.clone(),
            message: entry.message.clone(),
            status: DeliveryStatus::Pending,
            created_at: entry.created_at,
            sent_at: None,
        };
        self.ledger.push(stored.clone());
        Ok(stored)
    }

    fn mark_ledger_entry_sent(
        &mut self,
        key: &LedgerKey,
        sent_at: PrimitiveDateTime,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        let entry: &mut LedgerEntry = self
            .ledger
            .iter_mut()
            .find(|entry| &entry.key == key)
            .ok_or_else(|| RepositoryError::LedgerEntryNotFound(key.clone()))?;
        if entry.is_pending() {
            entry.status = DeliveryStatus::Sent;
            entry.sent_at = Some(sent_at);
        }
        Ok(())
    }

    fn find_ledger_entry(
        &mut self,
        call_number: &CallNumber,
        notification_type: NotificationType,
    ) -> Result<Option<LedgerEntry>, RepositoryError> {
        self.check()?;
        Ok(self
            .ledger
            .iter()
            .filter(|entry| {
                &entry.key.call_number == call_number
                    && entry.key.notification_type == notification_type
            })
            .max_by_key(|entry| (entry.key.due_date, entry.entry_id))
            .cloned())
    }

    fn pending_ledger_entries(
        &mut self,
        call_number: &CallNumber,
    ) -> Result<Vec<LedgerEntry>, RepositoryError> {
        self.check()?;
        let mut pending: Vec<LedgerEntry> = self
            .ledger
            .iter()
            .filter(|entry| &entry.key.call_number == call_number && entry.is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|entry| (entry.key.due_date, entry.entry_id));
        Ok(pending)
    }

    fn repair_archived_flags(&mut self) -> Result<RepairCounts, RepositoryError> {
        self.check()?;
        let mut counts: RepairCounts = RepairCounts::default();
        for record in self.vehicles.values_mut() {
            if !record.archived_flag_consistent() {
                record.archived = record.status.archived_flag();
                counts.record_fix(record);
            }
        }
        Ok(counts)
    }

    fn status_history(
        &mut self,
        call_number: &CallNumber,
    ) -> Result<Vec<StatusHistoryEntry>, RepositoryError> {
        self.check()?;
        Ok(self
            .history
            .iter()
            .filter(|entry| &entry.call_number == call_number)
            .cloned()
            .collect())
    }
}

/// Notification channel that records what it was given.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    pub delivered: Mutex<Vec<Notification>>,
    pub failing: AtomicBool,
    pub delay: Mutex<Option<Duration>>,
}

impl RecordingChannel {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let delay: Option<Duration> = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(DeliveryError::Unavailable(String::from("mail relay down")));
        }
        self.delivered.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Document trigger that records requests.
#[derive(Debug, Default)]
pub struct RecordingTrigger {
    pub requests: Mutex<Vec<DocumentRequest>>,
    pub failing: AtomicBool,
}

impl RecordingTrigger {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<DocumentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentTrigger for RecordingTrigger {
    async fn generate(&self, request: &DocumentRequest) -> Result<(), DocumentError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DocumentError::Failed(String::from("template missing")));
        }
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}

/// A scheduler and admin service wired to in-memory collaborators.
pub struct Harness {
    pub repository: SharedRepository<MemoryRepository>,
    pub channel: Arc<RecordingChannel>,
    pub documents: Arc<RecordingTrigger>,
    pub clock: Arc<FixedClock>,
    pub scheduler: NotificationScheduler<MemoryRepository>,
    pub admin: VehicleAdmin<MemoryRepository>,
}

pub const SWEEP_TIME: PrimitiveDateTime = datetime!(2025-01-08 06:00:00);

pub fn harness(vehicles: Vec<VehicleRecord>) -> Harness {
    harness_with(vehicles, SchedulerConfig::default())
}

pub fn harness_with(vehicles: Vec<VehicleRecord>, config: SchedulerConfig) -> Harness {
    let repository: SharedRepository<MemoryRepository> =
        Arc::new(AsyncMutex::new(MemoryRepository::with_vehicles(vehicles)));
    let channel: Arc<RecordingChannel> = Arc::new(RecordingChannel::default());
    let documents: Arc<RecordingTrigger> = Arc::new(RecordingTrigger::default());
    let clock: Arc<FixedClock> = Arc::new(FixedClock::new(SWEEP_TIME));

    let scheduler: NotificationScheduler<MemoryRepository> = NotificationScheduler::new(
        Arc::clone(&repository),
        Arc::clone(&channel) as Arc<dyn NotificationChannel>,
        Arc::clone(&documents) as Arc<dyn DocumentTrigger>,
        Arc::clone(&clock) as Arc<dyn Clock>,
        config.clone(),
    );
    let admin: VehicleAdmin<MemoryRepository> = VehicleAdmin::new(
        Arc::clone(&repository),
        Arc::clone(&clock) as Arc<dyn Clock>,
        config.policy,
        config.store_timeout,
    );

    Harness {
        repository,
        channel,
        documents,
        clock,
        scheduler,
        admin,
    }
}

impl Harness {
    pub async fn vehicle(&self, call_number: &str) -> VehicleRecord {
        self.repository
            .lock()
            .await
            .vehicles
            .get(&call(call_number))
            .cloned()
            .expect("vehicle exists")
    }
}
