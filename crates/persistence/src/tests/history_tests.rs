// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use towline::{
    RepositoryError, StatusHistoryEntry, TransitionResult, VehicleRepository, attempt_transition,
};
use towline_domain::{RecordedDate, Status, VehicleRecord};

use crate::tests::{create_test_context, create_test_vehicle, persistence_with};

#[test]
fn test_persist_transition_writes_record_and_history() {
    let vehicle: VehicleRecord = create_test_vehicle("C-1", Status::New);
    let mut persistence = persistence_with(std::slice::from_ref(&vehicle));

    let result: TransitionResult =
        attempt_transition(&vehicle, Status::TopGenerated, &create_test_context()).unwrap();
    persistence.persist_transition(&result).unwrap();

    let loaded: VehicleRecord = persistence
        .get_vehicle(&vehicle.call_number)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.status, Status::TopGenerated);
    assert!(matches!(loaded.top_sent_date, Some(RecordedDate::Valid(_))));

    let history: Vec<StatusHistoryEntry> =
        persistence.status_history(&vehicle.call_number).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].from_status, Status::New);
    assert_eq!(history[0].to_status, Status::TopGenerated);
    assert_eq!(history[0].actor_id, "clerk-1");
    assert_eq!(history[0].actor_kind, "operator");
}

#[test]
fn test_conflicting_transition_writes_nothing() {
    let vehicle: VehicleRecord = create_test_vehicle("C-1", Status::New);
    let mut persistence = persistence_with(std::slice::from_ref(&vehicle));

    let released: TransitionResult =
        attempt_transition(&vehicle, Status::Released, &create_test_context()).unwrap();
    persistence.persist_transition(&released).unwrap();

    let stale: TransitionResult =
        attempt_transition(&vehicle, Status::TopGenerated, &create_test_context()).unwrap();
    let result: Result<(), RepositoryError> = persistence.persist_transition(&stale);

    assert!(matches!(result, Err(RepositoryError::Conflict { .. })));
    let loaded: VehicleRecord = persistence
        .get_vehicle(&vehicle.call_number)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.status, Status::Released);
    assert!(loaded.archived);
    assert_eq!(
        persistence
            .status_history(&vehicle.call_number)
            .unwrap()
            .len(),
        1
    );
}
