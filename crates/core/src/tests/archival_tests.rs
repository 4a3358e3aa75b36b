// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::create_test_vehicle;
use crate::{RepairCounts, enforce_archived_invariant};
use towline_domain::{Status, VehicleRecord};

#[test]
fn test_released_unarchived_is_archived() {
    let mut vehicle: VehicleRecord = create_test_vehicle(Status::Released);
    vehicle.archived = false;

    assert!(enforce_archived_invariant(&mut vehicle));
    assert!(vehicle.archived);
}

#[test]
fn test_new_archived_is_unarchived() {
    let mut vehicle: VehicleRecord = create_test_vehicle(Status::New);
    vehicle.archived = true;

    assert!(enforce_archived_invariant(&mut vehicle));
    assert!(!vehicle.archived);
}

#[test]
fn test_consistent_record_is_untouched() {
    for status in Status::ALL {
        let mut vehicle: VehicleRecord = create_test_vehicle(status);
        assert!(!enforce_archived_invariant(&mut vehicle));
        assert!(vehicle.archived_flag_consistent());
    }
}

#[test]
fn test_repair_counts_split_by_status_group() {
    let mut counts: RepairCounts = RepairCounts::default();
    counts.record_fix(&create_test_vehicle(Status::Scrapped));
    counts.record_fix(&create_test_vehicle(Status::Tr52Ready));
    counts.record_fix(&create_test_vehicle(Status::New));

    assert_eq!(counts.fixed_completed, 1);
    assert_eq!(counts.fixed_active, 2);
    assert_eq!(counts.total(), 3);
}
