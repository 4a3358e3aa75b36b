// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Workflow orchestration for the Towline impound system.
//!
//! This crate runs the daily notification sweep over active vehicles and
//! exposes the administrative operations (manual transitions, corrections,
//! bulk intake, archival repair) that operate on the same store.
//!
//! The vehicle store is shared with the HTTP layer and with concurrent
//! sweeps. It is held behind a `tokio::sync::Mutex` and every acquisition is
//! bounded by a timeout. Work is done per vehicle: one vehicle's failure is
//! recorded in the report and never stops the rest of the sweep.

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
#![allow(clippy::multiple_crate_versions)]

mod admin;
mod clock;
mod config;
mod error;
mod import;
mod locks;
mod ports;
mod report;
mod scheduler;
mod store;

#[cfg(test)]
mod tests;

pub use admin::{
    DeadlineView, HistoryView, ManualTransition, VehicleAdmin, VehicleView,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::SchedulerConfig;
pub use error::{AdminError, DeliveryError, DocumentError, ImportError, StoreError, SweepError};
pub use import::{
    ImportReport, ImportRowOutcome, ImportRowResult, ParsedRow, parse_vehicle_csv,
};
pub use locks::{VehicleLockGuard, VehicleLocks};
pub use ports::{DocumentRequest, DocumentTrigger, Notification, NotificationChannel};
pub use report::{DataQualityRecord, RepairReport, SweepReport, VehicleError, VehicleErrorKind};
pub use scheduler::NotificationScheduler;
pub use store::SharedRepository;
