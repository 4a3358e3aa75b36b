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

mod dates;
mod deadlines;
mod error;
mod ledger;
mod policy;
mod status;
mod vehicle;

#[cfg(test)]
mod tests;

pub use dates::{
    RecordedDate, format_iso_date, format_timestamp, normalize_date, parse_iso_date,
    parse_timestamp,
};
pub use deadlines::{
    DataQualityIssue, DataQualityProblem, Deadline, DeadlineBasis, DeadlineEvaluation,
    NotificationType, compute_deadlines, redemption_expiry,
};
pub use error::DomainError;
pub use ledger::{DeliveryStatus, LedgerEntry, LedgerKey, NewLedgerEntry};
pub use policy::{DeadlinePolicy, DispositionForm, ReadinessRoute};
pub use status::Status;
pub use vehicle::{CallNumber, VehicleDescription, VehicleRecord};
