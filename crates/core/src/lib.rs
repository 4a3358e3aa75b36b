// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod advance;
mod archival;
mod correction;
mod error;
mod repository;
mod transition;

#[cfg(test)]
mod tests;

pub use advance::{DocumentType, PlannedAdvance, planned_advance};
pub use archival::{RepairCounts, enforce_archived_invariant};
pub use correction::{VehicleCorrection, apply_correction};
pub use error::{RepositoryError, TransitionError};
pub use repository::{StatusHistoryEntry, VehicleRepository};
pub use transition::{
    TransitionContext, TransitionResult, allowed_targets, attempt_transition,
    is_transition_allowed,
};
