// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::TransitionContext;
use time::macros::{date, datetime};
use towline_audit::{Actor, Cause};
use towline_domain::{CallNumber, RecordedDate, Status, VehicleRecord};

pub fn create_test_actor() -> Actor {
    Actor::operator("clerk-1")
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Operator request"))
}

pub fn create_test_context() -> TransitionContext {
    TransitionContext::new(
        datetime!(2025-02-01 09:30:00),
        create_test_actor(),
        create_test_cause(),
    )
}

/// A vehicle towed on 2025-01-01 in the given status with the archived flag
/// already consistent.
pub fn create_test_vehicle(status: Status) -> VehicleRecord {
    let mut record: VehicleRecord = VehicleRecord::new(
        CallNumber::new("C-1001").unwrap(),
        Some(RecordedDate::Valid(date!(2025 - 01 - 01))),
    );
    record.status = status;
    record.archived = status.archived_flag();
    record
}
