// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Duration;
use time::macros::{date, datetime};
use tokio::sync::watch;
use towline::DocumentType;
use towline_domain::{DeliveryStatus, NotificationType, RecordedDate, Status, VehicleRecord};

use crate::tests::helpers::{call, harness, harness_with, towed_vehicle, vehicle_in};
use crate::{RepairReport, SchedulerConfig, SweepError, SweepReport, VehicleErrorKind};

#[tokio::test]
async fn test_owner_notice_is_ledgered_sent_and_advances() {
    let h = harness(vec![towed_vehicle("C-1")]);

    let report: SweepReport = h
        .scheduler
        .run_daily_sweep(date!(2025 - 01 - 08))
        .await
        .unwrap();

    assert_eq!(report.sweep_date, "2025-01-08");
    assert_eq!(report.vehicles_processed, 1);
    assert_eq!(report.notifications_created, 1);
    assert_eq!(report.notifications_sent, 1);
    assert_eq!(report.documents_generated, 1);
    assert_eq!(report.transitions_applied, 1);
    assert!(report.errors.is_empty());

    let delivered = h.channel.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].notification_type, NotificationType::OwnerNotice);
    assert_eq!(delivered[0].due_date, date!(2025 - 01 - 08));
    assert!(delivered[0].message.contains("2014 Honda Civic"));

    let requests = h.documents.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].document, DocumentType::Top);
    assert_eq!(requests[0].snapshot.status, Status::New);

    let vehicle: VehicleRecord = h.vehicle("C-1").await;
    assert_eq!(vehicle.status, Status::TopGenerated);
    assert_eq!(
        vehicle.top_sent_date,
        Some(RecordedDate::Valid(date!(2025 - 01 - 08)))
    );
    assert!(!vehicle.archived);

    let repository = h.repository.lock().await;
    assert_eq!(repository.ledger.len(), 1);
    assert_eq!(repository.ledger[0].status, DeliveryStatus::Sent);
    assert_eq!(repository.history.len(), 1);
    assert_eq!(repository.history[0].actor_kind, "scheduler");
}

#[tokio::test]
async fn test_second_sweep_on_same_day_creates_nothing() {
    let h = harness(vec![towed_vehicle("C-1"), vehicle_in("C-2", Status::Tr52Ready)]);
    let today = date!(2025 - 01 - 08);

    let first: SweepReport = h.scheduler.run_daily_sweep(today).await.unwrap();
    let after_first: VehicleRecord = h.vehicle("C-1").await;
    let second: SweepReport = h.scheduler.run_daily_sweep(today).await.unwrap();

    assert_eq!(first.notifications_created, 1);
    assert_eq!(second.notifications_created, 0);
    assert_eq!(second.transitions_applied, 0);
    assert_eq!(h.vehicle("C-1").await, after_first);
    assert_eq!(h.repository.lock().await.ledger.len(), 1);
}

#[tokio::test]
async fn test_nothing_happens_before_due_date() {
    let h = harness(vec![towed_vehicle("C-1")]);

    let report: SweepReport = h
        .scheduler
        .run_daily_sweep(date!(2025 - 01 - 07))
        .await
        .unwrap();

    assert_eq!(report.vehicles_processed, 1);
    assert_eq!(report.notifications_created, 0);
    assert_eq!(h.vehicle("C-1").await.status, Status::New);
}

#[tokio::test]
async fn test_failed_delivery_stays_pending_and_is_retried() {
    let h = harness(vec![towed_vehicle("C-1")]);
    h.channel.set_failing(true);
    let today = date!(2025 - 01 - 08);

    let first: SweepReport = h.scheduler.run_daily_sweep(today).await.unwrap();

    assert_eq!(first.notifications_created, 1);
    assert_eq!(first.notifications_sent, 0);
    assert_eq!(first.notifications_pending, 1);
    assert_eq!(
        first
            .errors_of(VehicleErrorKind::NotificationDelivery)
            .count(),
        1
    );
    assert!(h.repository.lock().await.ledger[0].is_pending());

    h.channel.set_failing(false);
    let second: SweepReport = h.scheduler.run_daily_sweep(today).await.unwrap();

    assert_eq!(second.notifications_created, 0);
    assert_eq!(second.notifications_retried, 1);
    assert_eq!(second.notifications_sent, 1);
    assert_eq!(second.notifications_pending, 0);
    assert!(second.errors.is_empty());
    assert_eq!(h.repository.lock().await.ledger[0].status, DeliveryStatus::Sent);
    assert_eq!(h.channel.delivered().len(), 1);
}

#[tokio::test]
async fn test_slow_channel_times_out_and_leaves_entry_pending() {
    let config: SchedulerConfig = SchedulerConfig {
        notification_timeout: Duration::from_millis(20),
        ..SchedulerConfig::default()
    };
    let h = harness_with(vec![towed_vehicle("C-1")], config);
    h.channel.set_delay(Duration::from_millis(500));

    let report: SweepReport = h
        .scheduler
        .run_daily_sweep(date!(2025 - 01 - 08))
        .await
        .unwrap();

    assert_eq!(report.notifications_pending, 1);
    let error = report
        .errors_of(VehicleErrorKind::NotificationDelivery)
        .next()
        .expect("delivery error recorded");
    assert!(error.message.contains("timed out"));
    assert!(h.repository.lock().await.ledger[0].is_pending());
}

#[tokio::test]
async fn test_document_failure_skips_transition_until_next_sweep() {
    let h = harness(vec![towed_vehicle("C-1")]);
    h.documents.set_failing(true);
    let today = date!(2025 - 01 - 08);

    let first: SweepReport = h.scheduler.run_daily_sweep(today).await.unwrap();

    assert_eq!(first.notifications_sent, 1);
    assert_eq!(first.transitions_applied, 0);
    assert_eq!(
        first
            .errors_of(VehicleErrorKind::DocumentGeneration)
            .count(),
        1
    );
    assert_eq!(h.vehicle("C-1").await.status, Status::New);

    h.documents.set_failing(false);
    let second: SweepReport = h.scheduler.run_daily_sweep(today).await.unwrap();

    assert_eq!(second.notifications_created, 0);
    assert_eq!(second.transitions_applied, 1);
    assert_eq!(h.vehicle("C-1").await.status, Status::TopGenerated);
}

#[tokio::test]
async fn test_redemption_expiry_leads_to_tr52() {
    let mut vehicle: VehicleRecord = vehicle_in("C-1", Status::TopGenerated);
    vehicle.top_sent_date = Some(RecordedDate::Valid(date!(2025 - 01 - 10)));
    let h = harness(vec![vehicle]);
    h.clock.set(datetime!(2025-01-31 06:00:00));

    let report: SweepReport = h
        .scheduler
        .run_daily_sweep(date!(2025 - 01 - 31))
        .await
        .unwrap();

    assert_eq!(report.notifications_created, 2);
    assert_eq!(report.transitions_applied, 1);

    let types: Vec<(NotificationType, time::Date)> = h
        .channel
        .delivered()
        .iter()
        .map(|n| (n.notification_type, n.due_date))
        .collect();
    assert_eq!(
        types,
        vec![
            (NotificationType::RedemptionExpiry, date!(2025 - 01 - 30)),
            (NotificationType::DispositionEligibility, date!(2025 - 01 - 31)),
        ]
    );

    assert_eq!(h.documents.requests()[0].document, DocumentType::Tr52);
    let vehicle: VehicleRecord = h.vehicle("C-1").await;
    assert_eq!(vehicle.status, Status::Tr52Ready);
    assert_eq!(
        vehicle.tr52_sent_date,
        Some(RecordedDate::Valid(date!(2025 - 01 - 31)))
    );
}

#[tokio::test]
async fn test_redemption_expiry_alone_does_not_advance() {
    let mut vehicle: VehicleRecord = vehicle_in("C-1", Status::TopGenerated);
    vehicle.top_sent_date = Some(RecordedDate::Valid(date!(2025 - 01 - 10)));
    let h = harness(vec![vehicle]);

    let report: SweepReport = h
        .scheduler
        .run_daily_sweep(date!(2025 - 01 - 30))
        .await
        .unwrap();

    assert_eq!(report.notifications_created, 1);
    assert_eq!(report.transitions_applied, 0);
    assert_eq!(h.vehicle("C-1").await.status, Status::TopGenerated);
}

#[tokio::test]
async fn test_tr208_jurisdiction_routes_to_scrap_form() {
    let mut vehicle: VehicleRecord = vehicle_in("C-1", Status::TopGenerated);
    vehicle.top_sent_date = Some(RecordedDate::Valid(date!(2025 - 01 - 10)));
    vehicle.jurisdiction = Some(String::from("baltimore county"));
    let mut config: SchedulerConfig = SchedulerConfig::default();
    config.policy.tr208_jurisdictions = vec![String::from("Baltimore County")];
    let h = harness_with(vec![vehicle], config);

    h.scheduler
        .run_daily_sweep(date!(2025 - 01 - 31))
        .await
        .unwrap();

    assert_eq!(h.documents.requests()[0].document, DocumentType::Tr208);
    assert_eq!(h.vehicle("C-1").await.status, Status::Tr208Ready);
}

#[tokio::test]
async fn test_readiness_moves_to_auction_without_document() {
    let mut vehicle: VehicleRecord = vehicle_in("C-1", Status::Tr52Ready);
    vehicle.tr52_sent_date = Some(RecordedDate::Valid(date!(2025 - 01 - 01)));
    let h = harness(vec![vehicle]);

    let report: SweepReport = h
        .scheduler
        .run_daily_sweep(date!(2025 - 01 - 16))
        .await
        .unwrap();

    assert_eq!(report.documents_generated, 0);
    assert_eq!(report.transitions_applied, 1);
    assert!(h.documents.requests().is_empty());
    assert_eq!(h.vehicle("C-1").await.status, Status::ReadyForAuction);
}

#[tokio::test]
async fn test_bad_record_does_not_block_others() {
    let mut missing_tow: VehicleRecord = towed_vehicle("C-1");
    missing_tow.tow_date = None;
    let h = harness(vec![missing_tow, towed_vehicle("C-2")]);

    let report: SweepReport = h
        .scheduler
        .run_daily_sweep(date!(2025 - 01 - 08))
        .await
        .unwrap();

    assert_eq!(report.vehicles_processed, 2);
    assert_eq!(report.data_quality_issues.len(), 1);
    assert_eq!(report.data_quality_issues[0].call_number, call("C-1"));
    assert_eq!(report.data_quality_issues[0].field, "tow_date");
    assert_eq!(report.data_quality_issues[0].rule, NotificationType::OwnerNotice);
    assert_eq!(h.vehicle("C-1").await.status, Status::New);
    assert_eq!(h.vehicle("C-2").await.status, Status::TopGenerated);
}

#[tokio::test]
async fn test_concurrent_edit_is_reported_not_overwritten() {
    let h = harness(vec![towed_vehicle("C-1")]);
    h.repository
        .lock()
        .await
        .concurrent_edits
        .insert(call("C-1"), Status::Released);

    let report: SweepReport = h
        .scheduler
        .run_daily_sweep(date!(2025 - 01 - 08))
        .await
        .unwrap();

    assert_eq!(report.transitions_applied, 0);
    assert_eq!(
        report
            .errors_of(VehicleErrorKind::PersistenceConflict)
            .count(),
        1
    );
    let vehicle: VehicleRecord = h.vehicle("C-1").await;
    assert_eq!(vehicle.status, Status::Released);
    assert!(vehicle.archived);
}

#[tokio::test]
async fn test_unreachable_store_fails_whole_sweep() {
    let h = harness(vec![towed_vehicle("C-1")]);
    h.repository.lock().await.unavailable = true;

    let result: Result<SweepReport, SweepError> =
        h.scheduler.run_daily_sweep(date!(2025 - 01 - 08)).await;

    assert!(matches!(result, Err(SweepError::StoreUnavailable(_))));
    assert!(h.channel.delivered().is_empty());
}

#[tokio::test]
async fn test_claimed_vehicle_is_skipped() {
    let h = harness(vec![towed_vehicle("C-1"), towed_vehicle("C-2")]);
    let _claim = h.scheduler.locks().try_acquire(&call("C-1"));

    let report: SweepReport = h
        .scheduler
        .run_daily_sweep(date!(2025 - 01 - 08))
        .await
        .unwrap();

    assert_eq!(report.vehicles_skipped, 1);
    assert_eq!(report.vehicles_processed, 1);
    assert_eq!(h.vehicle("C-1").await.status, Status::New);
    assert!(h.repository.lock().await.ledger_for("C-1").is_empty());
}

#[tokio::test]
async fn test_overlapping_sweeps_ledger_once() {
    let h = harness(vec![towed_vehicle("C-1")]);
    h.channel.set_delay(Duration::from_millis(50));
    let today = date!(2025 - 01 - 08);

    let (a, b) = tokio::join!(
        h.scheduler.run_daily_sweep(today),
        h.scheduler.run_daily_sweep(today)
    );
    let (a, b): (SweepReport, SweepReport) = (a.unwrap(), b.unwrap());

    assert_eq!(a.notifications_created + b.notifications_created, 1);
    assert_eq!(a.transitions_applied + b.transitions_applied, 1);
    assert_eq!(h.repository.lock().await.ledger.len(), 1);
}

#[tokio::test]
async fn test_shutdown_signal_stops_new_vehicles() {
    let h = harness(vec![towed_vehicle("C-1"), towed_vehicle("C-2")]);
    let (_tx, rx) = watch::channel(true);

    let report: SweepReport = h
        .scheduler
        .run_daily_sweep_with_shutdown(date!(2025 - 01 - 08), rx)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.vehicles_processed, 0);
    assert_eq!(h.vehicle("C-1").await.status, Status::New);
}

#[tokio::test]
async fn test_completed_vehicles_are_not_swept() {
    let h = harness(vec![vehicle_in("C-1", Status::Released)]);

    let report: SweepReport = h
        .scheduler
        .run_daily_sweep(date!(2025 - 03 - 01))
        .await
        .unwrap();

    assert_eq!(report.vehicles_processed, 0);
    assert!(!report.cancelled);
}

#[tokio::test]
async fn test_repair_pass_reports_counts() {
    let mut stale_active: VehicleRecord = towed_vehicle("C-1");
    stale_active.archived = true;
    let mut stale_completed: VehicleRecord = vehicle_in("C-2", Status::Released);
    stale_completed.archived = false;
    let h = harness(vec![stale_active, stale_completed, vehicle_in("C-3", Status::Scrapped)]);

    let first: RepairReport = h.scheduler.repair_archived_flags().await.unwrap();
    let second: RepairReport = h.scheduler.repair_archived_flags().await.unwrap();

    assert_eq!(
        first,
        RepairReport {
            fixed_active: 1,
            fixed_completed: 1,
        }
    );
    assert_eq!(second.fixed_active + second.fixed_completed, 0);
    assert!(!h.vehicle("C-1").await.archived);
    assert!(h.vehicle("C-2").await.archived);
}
