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
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod live;
mod sweep_timer;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRef, Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use time::Date;
use tokio::sync::{Mutex, watch};
use tracing::{error, info, warn};
use towline::VehicleCorrection;
use towline_domain::{DeadlinePolicy, DomainError, Status, normalize_date};
use towline_persistence::Persistence;
use towline_workflow::{
    AdminError, Clock, ImportError, ImportReport, ManualTransition, NotificationScheduler,
    RepairReport, SchedulerConfig, SharedRepository, StoreError, SweepError, SweepReport,
    SystemClock, VehicleAdmin, VehicleView,
};

use crate::live::{LiveFeed, live_events_handler};

/// Towline Server - impound disposition sweep and administrative surface
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Seconds between scheduled sweeps
    #[arg(long, default_value_t = 86_400)]
    sweep_interval_secs: u64,

    /// Do not sweep immediately at startup; wait one interval first
    #[arg(long)]
    no_startup_sweep: bool,

    /// Upper bound on one notification delivery
    #[arg(long, default_value_t = 30)]
    notification_timeout_secs: u64,

    /// Upper bound on one document generation
    #[arg(long, default_value_t = 60)]
    document_timeout_secs: u64,

    /// Upper bound on waiting for the vehicle store (also the `SQLite` busy timeout)
    #[arg(long, default_value_t = 10)]
    store_timeout_secs: u64,

    /// Vehicles processed concurrently within one sweep
    #[arg(long, default_value_t = 4)]
    sweep_concurrency: usize,

    /// Days after the tow date that the owner notice falls due
    #[arg(long, default_value_t = 7)]
    owner_notice_days: u32,

    /// Length of the redemption period, from the TOP-sent date
    #[arg(long, default_value_t = 20)]
    redemption_days: u32,

    /// Redemption start offset from the tow date when no TOP-sent date is recorded
    #[arg(long, default_value_t = 1)]
    redemption_fallback_offset_days: u32,

    /// Days after redemption expiry that a disposition form may be issued
    #[arg(long, default_value_t = 1)]
    disposition_eligibility_offset_days: u32,

    /// Days after the disposition form is sent that a vehicle is ready
    #[arg(long, default_value_t = 15)]
    disposition_ready_days: u32,

    /// Jurisdiction that takes the TR208 form instead of TR52 (repeatable)
    #[arg(long = "tr208-jurisdiction")]
    tr208_jurisdictions: Vec<String>,
}

impl Args {
    fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            policy: DeadlinePolicy {
                owner_notice_days: self.owner_notice_days,
                redemption_days: self.redemption_days,
                redemption_fallback_offset_days: self.redemption_fallback_offset_days,
                disposition_eligibility_offset_days: self.disposition_eligibility_offset_days,
                disposition_ready_days: self.disposition_ready_days,
                tr208_jurisdictions: self.tr208_jurisdictions.clone(),
                ..DeadlinePolicy::default()
            },
            notification_timeout: Duration::from_secs(self.notification_timeout_secs),
            document_timeout: Duration::from_secs(self.document_timeout_secs),
            store_timeout: Duration::from_secs(self.store_timeout_secs),
            concurrency: self.sweep_concurrency,
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    scheduler: Arc<NotificationScheduler<Persistence>>,
    admin: Arc<VehicleAdmin<Persistence>>,
    feed: Arc<LiveFeed>,
}

impl FromRef<AppState> for Arc<LiveFeed> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.feed)
    }
}

impl AppState {
    fn new(persistence: Persistence, clock: Arc<dyn Clock>, config: SchedulerConfig) -> Self {
        let repository: SharedRepository<Persistence> = Arc::new(Mutex::new(persistence));
        let feed: Arc<LiveFeed> = Arc::new(LiveFeed::new());
        let admin: VehicleAdmin<Persistence> = VehicleAdmin::new(
            Arc::clone(&repository),
            Arc::clone(&clock),
            config.policy.clone(),
            config.store_timeout,
        );
        let scheduler: NotificationScheduler<Persistence> = NotificationScheduler::new(
            repository,
            feed.clone(),
            feed.clone(),
            clock,
            config,
        );
        Self {
            scheduler: Arc::new(scheduler),
            admin: Arc::new(admin),
            feed,
        }
    }
}

/// Query parameters for a manual sweep.
#[derive(Debug, Deserialize)]
struct SweepQuery {
    /// Evaluate deadlines as of this date instead of today.
    date: Option<String>,
}

/// API request for a manual status change.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct TransitionApiRequest {
    /// The target status label, e.g. `Released`.
    target: String,
    /// The operator making the change.
    operator: String,
    /// The real-world date of the event, if not today.
    event_date: Option<String>,
    /// Free-text outcome note.
    note: Option<String>,
}

/// API request for a data correction. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct CorrectionApiRequest {
    jurisdiction: Option<String>,
    vin: Option<String>,
    plate: Option<String>,
    plate_state: Option<String>,
    make: Option<String>,
    model: Option<String>,
    model_year: Option<u16>,
    color: Option<String>,
    tow_date: Option<String>,
    top_sent_date: Option<String>,
    tr52_sent_date: Option<String>,
    tr208_sent_date: Option<String>,
}

impl CorrectionApiRequest {
    fn into_correction(self) -> Result<VehicleCorrection, HttpError> {
        Ok(VehicleCorrection {
            jurisdiction: self.jurisdiction,
            vin: self.vin,
            plate: self.plate,
            plate_state: self.plate_state,
            make: self.make,
            model: self.model,
            model_year: self.model_year,
            color: self.color,
            tow_date: parse_optional_date(self.tow_date.as_deref())?,
            top_sent_date: parse_optional_date(self.top_sent_date.as_deref())?,
            tr52_sent_date: parse_optional_date(self.tr52_sent_date.as_deref())?,
            tr208_sent_date: parse_optional_date(self.tr208_sent_date.as_deref())?,
        })
    }
}

/// API response for the health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<DomainError> for HttpError {
    fn from(err: DomainError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for HttpError {
    fn from(err: StoreError) -> Self {
        error!(error = %err, "Store error");
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: err.to_string(),
        }
    }
}

impl From<SweepError> for HttpError {
    fn from(err: SweepError) -> Self {
        let SweepError::StoreUnavailable(inner) = err;
        Self::from(inner)
    }
}

impl From<ImportError> for HttpError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::InvalidCsvFormat { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            },
            ImportError::Store(inner) => Self::from(inner),
        }
    }
}

impl From<AdminError> for HttpError {
    fn from(err: AdminError) -> Self {
        let status: StatusCode = match &err {
            AdminError::InvalidInput(_) | AdminError::EmptyCorrection => StatusCode::BAD_REQUEST,
            AdminError::VehicleNotFound(_) => StatusCode::NOT_FOUND,
            AdminError::Transition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdminError::Conflict(_) => StatusCode::CONFLICT,
            AdminError::Store(inner) => return Self::from(inner.clone()),
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

fn parse_optional_date(raw: Option<&str>) -> Result<Option<Date>, HttpError> {
    raw.map(normalize_date).transpose().map_err(HttpError::from)
}

/// Handler for GET `/health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

/// Handler for POST `/admin/sweep` endpoint.
///
/// Runs one sweep now, optionally as of another date.
async fn handle_sweep(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<SweepQuery>,
) -> Result<Json<SweepReport>, HttpError> {
    let today: Date = match parse_optional_date(query.date.as_deref())? {
        Some(date) => date,
        None => app_state.scheduler.today(),
    };
    info!(sweep_date = %today, "Handling manual sweep request");

    let report: SweepReport = app_state.scheduler.run_daily_sweep(today).await?;
    Ok(Json(report))
}

/// Handler for POST `/admin/repair-archived` endpoint.
async fn handle_repair_archived(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<RepairReport>, HttpError> {
    info!("Handling archival repair request");
    let report: RepairReport = app_state.scheduler.repair_archived_flags().await?;
    Ok(Json(report))
}

/// Handler for POST `/admin/import` endpoint.
///
/// The request body is the raw CSV.
async fn handle_import(
    AxumState(app_state): AxumState<AppState>,
    body: Bytes,
) -> Result<Json<ImportReport>, HttpError> {
    let csv_content: &str = std::str::from_utf8(&body).map_err(|e| HttpError {
        status: StatusCode::BAD_REQUEST,
        message: format!("CSV body is not valid UTF-8: {e}"),
    })?;
    info!(bytes = body.len(), "Handling CSV import request");

    let report: ImportReport = app_state.admin.import_csv(csv_content).await?;
    Ok(Json(report))
}

/// Handler for GET `/vehicles/{call_number}` endpoint.
async fn handle_get_vehicle(
    AxumState(app_state): AxumState<AppState>,
    Path(call_number): Path<String>,
) -> Result<Json<VehicleView>, HttpError> {
    let view: VehicleView = app_state.admin.vehicle_view(&call_number).await?;
    Ok(Json(view))
}

/// Handler for POST `/vehicles/{call_number}/transition` endpoint.
async fn handle_transition(
    AxumState(app_state): AxumState<AppState>,
    Path(call_number): Path<String>,
    Json(req): Json<TransitionApiRequest>,
) -> Result<Json<VehicleView>, HttpError> {
    info!(
        call_number = %call_number,
        target = %req.target,
        operator = %req.operator,
        "Handling transition request"
    );

    let target: Status = Status::parse_lenient(&req.target)?;
    let request: ManualTransition = ManualTransition {
        target,
        operator: req.operator,
        event_date: parse_optional_date(req.event_date.as_deref())?,
        note: req.note,
    };

    let view: VehicleView = app_state
        .admin
        .transition_vehicle(&call_number, request)
        .await?;
    Ok(Json(view))
}

/// Handler for POST `/vehicles/{call_number}/correct` endpoint.
async fn handle_correct(
    AxumState(app_state): AxumState<AppState>,
    Path(call_number): Path<String>,
    Json(req): Json<CorrectionApiRequest>,
) -> Result<Json<VehicleView>, HttpError> {
    info!(call_number = %call_number, "Handling correction request");

    let correction: VehicleCorrection = req.into_correction()?;
    let view: VehicleView = app_state
        .admin
        .correct_vehicle(&call_number, &correction)
        .await?;
    Ok(Json(view))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/admin/sweep", post(handle_sweep))
        .route("/admin/repair-archived", post(handle_repair_archived))
        .route("/admin/import", post(handle_import))
        .route("/vehicles/{call_number}", get(handle_get_vehicle))
        .route("/vehicles/{call_number}/transition", post(handle_transition))
        .route("/vehicles/{call_number}/correct", post(handle_correct))
        .route("/live", get(live_events_handler))
        .with_state(app_state)
}

async fn wait_for_ctrl_c(shutdown: watch::Sender<bool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
    let _ = shutdown.send(true);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Towline Server");

    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };
    persistence.set_busy_timeout(Duration::from_secs(args.store_timeout_secs))?;

    let config: SchedulerConfig = args.scheduler_config();
    let app_state: AppState = AppState::new(persistence, Arc::new(SystemClock), config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let timer = tokio::spawn(sweep_timer::run_periodic_sweeps(
        Arc::clone(&app_state.scheduler),
        Duration::from_secs(args.sweep_interval_secs.max(1)),
        !args.no_startup_sweep,
        shutdown_rx.clone(),
    ));
    tokio::spawn(wait_for_ctrl_c(shutdown_tx));

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let mut server_shutdown: watch::Receiver<bool> = shutdown_rx;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = server_shutdown.wait_for(|stop| *stop).await;
        })
        .await?;

    timer.await?;
    info!("Towline Server stopped");
    Ok(())
}
