// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Periodic archival repair and daily sweep.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{error, info};
use towline::VehicleRepository;
use towline_workflow::{NotificationScheduler, RepairReport, SweepReport};

/// Runs a repair pass then a sweep every `period` until `shutdown` flips to
/// `true`.
///
/// When `sweep_on_startup` is set the first run happens immediately;
/// otherwise it waits one full period. A sweep in progress when shutdown is
/// signalled finishes the vehicles it has started and then returns.
pub async fn run_periodic_sweeps<R>(
    scheduler: Arc<NotificationScheduler<R>>,
    period: Duration,
    sweep_on_startup: bool,
    mut shutdown: watch::Receiver<bool>,
) where
    R: VehicleRepository + 'static,
{
    let mut ticker: Interval = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    if !sweep_on_startup {
        ticker.tick().await;
    }

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_once(&scheduler, shutdown.clone()).await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("Sweep timer stopped");
                    return;
                }
            }
        }
    }
}

/// One scheduled run: repair, then sweep against the clock's today.
pub async fn run_once<R: VehicleRepository>(
    scheduler: &NotificationScheduler<R>,
    shutdown: watch::Receiver<bool>,
) -> Option<SweepReport> {
    match scheduler.repair_archived_flags().await {
        Ok(RepairReport {
            fixed_active,
            fixed_completed,
        }) => {
            info!(fixed_active, fixed_completed, "Archival repair finished");
        }
        Err(e) => {
            error!(error = %e, "Archival repair failed");
        }
    }

    match scheduler
        .run_daily_sweep_with_shutdown(scheduler.today(), shutdown)
        .await
    {
        Ok(report) => Some(report),
        Err(e) => {
            error!(error = %e, "Scheduled sweep failed");
            None
        }
    }
}
