// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::macros::date;
use towline::{TransitionError, VehicleCorrection};
use towline_domain::Status;

use crate::tests::helpers::{call, harness, towed_vehicle, vehicle_in};
use crate::{AdminError, ManualTransition, VehicleView};

fn release_by(operator: &str) -> ManualTransition {
    ManualTransition {
        target: Status::Released,
        operator: operator.to_string(),
        event_date: None,
        note: Some(String::from("Owner paid fees")),
    }
}

#[tokio::test]
async fn test_view_lists_current_deadlines() {
    let h = harness(vec![towed_vehicle("C-1")]);

    let view: VehicleView = h.admin.vehicle_view("C-1").await.unwrap();

    assert_eq!(view.status, "New");
    assert_eq!(view.tow_date.as_deref(), Some("2025-01-01"));
    assert_eq!(view.deadlines.len(), 1);
    assert_eq!(view.deadlines[0].notification_type, "owner_notice");
    assert_eq!(view.deadlines[0].due_date, "2025-01-08");
    assert!(view.deadlines[0].is_due);
    assert!(!view.deadlines[0].is_overdue);
}

#[tokio::test]
async fn test_unknown_vehicle_is_not_found() {
    let h = harness(vec![]);

    let result: Result<VehicleView, AdminError> = h.admin.vehicle_view("C-404").await;

    assert_eq!(result, Err(AdminError::VehicleNotFound(String::from("C-404"))));
}

#[tokio::test]
async fn test_release_from_any_active_status_archives() {
    let mut top: towline_domain::VehicleRecord = vehicle_in("C-1", Status::TopGenerated);
    top.top_sent_date = Some(towline_domain::RecordedDate::Valid(date!(2025 - 01 - 08)));
    let h = harness(vec![top]);

    let view: VehicleView = h
        .admin
        .transition_vehicle("C-1", release_by("clerk-7"))
        .await
        .unwrap();

    assert_eq!(view.status, "Released");
    assert!(view.archived);
    assert_eq!(view.outcome_note.as_deref(), Some("Owner paid fees"));
    assert_eq!(view.outcome_date.as_deref(), Some("2025-01-08"));
    assert_eq!(view.history.len(), 1);
    assert_eq!(view.history[0].actor_id, "clerk-7");
    assert_eq!(view.history[0].to_status, "Released");
}

#[tokio::test]
async fn test_skipping_stages_is_rejected() {
    let h = harness(vec![towed_vehicle("C-1")]);

    let result: Result<VehicleView, AdminError> = h
        .admin
        .transition_vehicle(
            "C-1",
            ManualTransition {
                target: Status::Auctioned,
                operator: String::from("clerk-7"),
                event_date: None,
                note: None,
            },
        )
        .await;

    assert_eq!(
        result,
        Err(AdminError::Transition(TransitionError::InvalidTransition {
            from: Status::New,
            to: Status::Auctioned,
        }))
    );
    assert_eq!(h.vehicle("C-1").await.status, Status::New);
}

#[tokio::test]
async fn test_transition_conflict_is_surfaced() {
    let h = harness(vec![towed_vehicle("C-1")]);
    h.repository
        .lock()
        .await
        .concurrent_edits
        .insert(call("C-1"), Status::TopGenerated);

    let result: Result<VehicleView, AdminError> =
        h.admin.transition_vehicle("C-1", release_by("clerk-7")).await;

    assert_eq!(result, Err(AdminError::Conflict(String::from("C-1"))));
    assert_eq!(h.vehicle("C-1").await.status, Status::TopGenerated);
}

#[tokio::test]
async fn test_correction_updates_dates_and_keeps_status() {
    let mut stale: towline_domain::VehicleRecord = vehicle_in("C-1", Status::Tr52Ready);
    stale.archived = true;
    let h = harness(vec![stale]);

    let correction: VehicleCorrection = VehicleCorrection {
        tr52_sent_date: Some(date!(2025 - 01 - 03)),
        color: Some(String::from("  Silver ")),
        ..VehicleCorrection::default()
    };
    let view: VehicleView = h.admin.correct_vehicle("C-1", &correction).await.unwrap();

    assert_eq!(view.status, "TR52 Ready");
    assert!(!view.archived);
    assert_eq!(view.tr52_sent_date.as_deref(), Some("2025-01-03"));
    assert_eq!(
        h.vehicle("C-1").await.description.color.as_deref(),
        Some("Silver")
    );
    assert_eq!(view.deadlines[0].due_date, "2025-01-18");
}

#[tokio::test]
async fn test_empty_correction_is_rejected() {
    let h = harness(vec![towed_vehicle("C-1")]);

    let result: Result<VehicleView, AdminError> = h
        .admin
        .correct_vehicle("C-1", &VehicleCorrection::default())
        .await;

    assert_eq!(result, Err(AdminError::EmptyCorrection));
}
