// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use towline_domain::VehicleRecord;

/// Counts returned by an archived-flag repair pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairCounts {
    /// Active-status records that were wrongly archived.
    pub fixed_active: usize,
    /// Completed-status records that were wrongly left unarchived.
    pub fixed_completed: usize,
}

impl RepairCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.fixed_active + self.fixed_completed
    }

    /// Adds the fix that [`enforce_archived_invariant`] applied to `record`.
    pub const fn record_fix(&mut self, record: &VehicleRecord) {
        if record.status.is_terminal() {
            self.fixed_completed += 1;
        } else {
            self.fixed_active += 1;
        }
    }
}

/// Sets `archived` from the record's status.
///
/// Returns true if the flag changed.
pub fn enforce_archived_invariant(record: &mut VehicleRecord) -> bool {
    let required: bool = record.status.archived_flag();
    if record.archived == required {
        return false;
    }
    record.archived = required;
    true
}
