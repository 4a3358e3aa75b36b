// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-vehicle exclusion between overlapping sweeps.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use towline_domain::CallNumber;

/// The set of vehicles currently being processed.
#[derive(Debug, Clone, Default)]
pub struct VehicleLocks {
    held: Arc<Mutex<HashSet<CallNumber>>>,
}

impl VehicleLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a vehicle, or returns `None` if it is already claimed.
    ///
    /// The claim is released when the guard is dropped.
    #[must_use]
    pub fn try_acquire(&self, call_number: &CallNumber) -> Option<VehicleLockGuard> {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        if !held.insert(call_number.clone()) {
            return None;
        }
        Some(VehicleLockGuard {
            held: Arc::clone(&self.held),
            call_number: call_number.clone(),
        })
    }

    /// Returns true if the vehicle is currently claimed.
    #[must_use]
    pub fn is_held(&self, call_number: &CallNumber) -> bool {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(call_number)
    }
}

/// Releases its vehicle on drop.
#[derive(Debug)]
pub struct VehicleLockGuard {
    held: Arc<Mutex<HashSet<CallNumber>>>,
    call_number: CallNumber,
}

impl VehicleLockGuard {
    #[must_use]
    pub const fn call_number(&self) -> &CallNumber {
        &self.call_number
    }
}

impl Drop for VehicleLockGuard {
    fn drop(&mut self) {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.call_number);
    }
}
