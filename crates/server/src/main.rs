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
#![allow(clippy::multiple_crate_versions)]

mod identity;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use rotaplan_api::{
    ApiError, AssignmentResponse, AssignmentWriteResponse, BulkSchedulePreviewResponse,
    BulkScheduleRequest, BulkScheduleResponse, CreateAssignmentRequest, CreateSessionRequest,
    CreateSessionResponse, CreateSwapRequest, DateRangeQuery, EligibilityRequest,
    EligibilityResponse, ListAssignmentsResponse, ListEventsQuery, ListEventsResponse,
    ListSwapsResponse, OrganizationResponse, RotaResponse, StaticUsageGate, SwapWriteResponse,
    SyncOrganizationRequest, SyncStaffRequest, TransitionAssignmentRequest, WriteResponse,
};
use rotaplan_domain::OrganizationId;
use rotaplan_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::identity::Identity;

/// Rotaplan Server - HTTP server for the rota planner
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Organization whose assignment writes are refused by the usage gate.
    /// May be repeated.
    #[arg(long = "over-quota-org", value_name = "ORGANIZATION_ID")]
    over_quota_org: Vec<i64>,
}

/// Application state shared across handlers.
///
/// The persistence layer is wrapped in a Mutex; every API operation holds it
/// for its whole duration.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// The usage-cap gate consulted before assignment writes.
    gate: Arc<StaticUsageGate>,
    /// Source of request ids for callers that do not supply one.
    request_counter: Arc<AtomicU64>,
}

impl AppState {
    fn new(persistence: Persistence, gate: StaticUsageGate) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            gate: Arc::new(gate),
            request_counter: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Query parameters for session eligibility.
#[derive(Debug, Default, Deserialize)]
struct SessionEligibilityQuery {
    /// Comma-separated staff ids; the whole directory when absent.
    staff_ids: Option<String>,
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    /// Always `"ok"`.
    status: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Stable error kind.
    kind: String,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error kind.
    kind: &'static str,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            kind: self.kind.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Parses a comma-separated id list.
fn parse_id_list(raw: &str) -> Result<Vec<i64>, HttpError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>().map_err(|_| HttpError {
                status: StatusCode::BAD_REQUEST,
                kind: "invalid_argument",
                message: format!("Invalid staff id '{part}'"),
            })
        })
        .collect()
}

// ============================================================================
// Sessions
// ============================================================================

/// Handler for POST `/sessions` endpoint.
async fn handle_create_session(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, HttpError> {
    info!(
        staff_id = identity.principal.staff_id.value(),
        title = %req.title,
        "Handling create_session request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: CreateSessionResponse = rotaplan_api::create_session(
        &mut persistence,
        &identity.principal,
        req,
        identity.cause,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/sessions/bulk/preview` endpoint.
///
/// Counts the sessions a recurring schedule would create.
async fn handle_preview_bulk_schedule(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Json(req): Json<BulkScheduleRequest>,
) -> Result<Json<BulkSchedulePreviewResponse>, HttpError> {
    info!(
        staff_id = identity.principal.staff_id.value(),
        start_date = %req.start_date,
        end_date = %req.end_date,
        "Handling preview_bulk_schedule request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: BulkSchedulePreviewResponse = rotaplan_api::preview_bulk_schedule(
        &mut persistence,
        &identity.principal,
        &req,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/sessions/bulk` endpoint.
///
/// Expands and persists a recurring schedule, then pre-assigns any listed
/// staff. Pre-assignment failures are reported in the body, not as an error.
async fn handle_bulk_schedule(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Json(req): Json<BulkScheduleRequest>,
) -> Result<Json<BulkScheduleResponse>, HttpError> {
    info!(
        staff_id = identity.principal.staff_id.value(),
        start_date = %req.start_date,
        end_date = %req.end_date,
        pre_assign = req.staff_ids.len(),
        "Handling bulk_schedule request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: BulkScheduleResponse = rotaplan_api::bulk_schedule(
        &mut persistence,
        &identity.principal,
        app_state.gate.as_ref(),
        &req,
        OffsetDateTime::now_utc(),
        identity.cause,
    )?;
    drop(persistence);

    if !response.pre_assignments.failed.is_empty() {
        warn!(
            failed = response.pre_assignments.failed.len(),
            "Bulk schedule completed with pre-assignment failures"
        );
    }

    Ok(Json(response))
}

// ============================================================================
// Eligibility
// ============================================================================

/// Handler for GET `/sessions/{session_id}/eligibility` endpoint.
async fn handle_session_eligibility(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Path(session_id): Path<i64>,
    Query(query): Query<SessionEligibilityQuery>,
) -> Result<Json<EligibilityResponse>, HttpError> {
    info!(session_id, "Handling session_eligibility request");

    let staff_ids: Option<Vec<i64>> = query.staff_ids.as_deref().map(parse_id_list).transpose()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: EligibilityResponse = rotaplan_api::resolve_session_eligibility(
        &mut persistence,
        &identity.principal,
        session_id,
        staff_ids.as_deref(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/eligibility` endpoint.
async fn handle_window_eligibility(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Json(req): Json<EligibilityRequest>,
) -> Result<Json<EligibilityResponse>, HttpError> {
    info!(
        start = %req.start,
        end = %req.end,
        group_id = ?req.group_id,
        "Handling window_eligibility request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: EligibilityResponse =
        rotaplan_api::resolve_window_eligibility(&mut persistence, &identity.principal, &req)?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Assignments
// ============================================================================

/// Handler for POST `/assignments` endpoint.
async fn handle_create_assignment(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Json(req): Json<CreateAssignmentRequest>,
) -> Result<Json<AssignmentWriteResponse>, HttpError> {
    info!(
        session_id = req.session_id,
        staff_id = req.staff_id,
        role = %req.role,
        "Handling create_assignment request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: AssignmentWriteResponse = rotaplan_api::create_assignment(
        &mut persistence,
        &identity.principal,
        app_state.gate.as_ref(),
        req,
        identity.cause,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/assignments` endpoint.
async fn handle_list_assignments(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<ListAssignmentsResponse>, HttpError> {
    info!(from = %query.from, to = %query.to, "Handling list_assignments request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ListAssignmentsResponse =
        rotaplan_api::list_assignments(&mut persistence, &identity.principal, &query)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/assignments/mine` endpoint.
async fn handle_list_my_assignments(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<ListAssignmentsResponse>, HttpError> {
    info!(
        staff_id = identity.principal.staff_id.value(),
        from = %query.from,
        to = %query.to,
        "Handling list_my_assignments request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: ListAssignmentsResponse =
        rotaplan_api::list_my_assignments(&mut persistence, &identity.principal, &query)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/assignments/{assignment_id}` endpoint.
async fn handle_get_assignment(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Path(assignment_id): Path<i64>,
) -> Result<Json<AssignmentResponse>, HttpError> {
    info!(assignment_id, "Handling get_assignment request");

    let mut persistence = app_state.persistence.lock().await;
    let response: AssignmentResponse =
        rotaplan_api::get_assignment(&mut persistence, &identity.principal, assignment_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for DELETE `/assignments/{assignment_id}` endpoint.
async fn handle_delete_assignment(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Path(assignment_id): Path<i64>,
) -> Result<Json<WriteResponse>, HttpError> {
    info!(assignment_id, "Handling delete_assignment request");

    let mut persistence = app_state.persistence.lock().await;
    let response: WriteResponse = rotaplan_api::delete_assignment(
        &mut persistence,
        &identity.principal,
        assignment_id,
        identity.cause,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/assignments/{assignment_id}/status` endpoint.
async fn handle_transition_assignment(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Path(assignment_id): Path<i64>,
    Json(req): Json<TransitionAssignmentRequest>,
) -> Result<Json<AssignmentWriteResponse>, HttpError> {
    info!(
        assignment_id,
        status = %req.status,
        "Handling transition_assignment request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: AssignmentWriteResponse = rotaplan_api::transition_assignment(
        &mut persistence,
        &identity.principal,
        app_state.gate.as_ref(),
        assignment_id,
        &req,
        identity.cause,
    )?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Swap Requests
// ============================================================================

/// Handler for POST `/swaps` endpoint.
async fn handle_request_swap(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Json(req): Json<CreateSwapRequest>,
) -> Result<Json<SwapWriteResponse>, HttpError> {
    info!(
        assignment_id = req.assignment_id,
        to_staff_id = req.to_staff_id,
        "Handling request_swap request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: SwapWriteResponse = rotaplan_api::request_swap(
        &mut persistence,
        &identity.principal,
        &req,
        identity.cause,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/swaps/{swap_request_id}/accept` endpoint.
async fn handle_accept_swap(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Path(swap_request_id): Path<i64>,
) -> Result<Json<SwapWriteResponse>, HttpError> {
    info!(swap_request_id, "Handling accept_swap request");

    let mut persistence = app_state.persistence.lock().await;
    let response: SwapWriteResponse = rotaplan_api::accept_swap(
        &mut persistence,
        &identity.principal,
        swap_request_id,
        identity.cause,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/swaps/{swap_request_id}/decline` endpoint.
async fn handle_decline_swap(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Path(swap_request_id): Path<i64>,
) -> Result<Json<SwapWriteResponse>, HttpError> {
    info!(swap_request_id, "Handling decline_swap request");

    let mut persistence = app_state.persistence.lock().await;
    let response: SwapWriteResponse = rotaplan_api::decline_swap(
        &mut persistence,
        &identity.principal,
        swap_request_id,
        identity.cause,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/swaps` endpoint.
///
/// Returns the acting staff member's inbound and outbound swap requests.
async fn handle_list_swaps(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
) -> Result<Json<ListSwapsResponse>, HttpError> {
    info!(
        staff_id = identity.principal.staff_id.value(),
        "Handling list_swaps request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: ListSwapsResponse =
        rotaplan_api::list_swaps(&mut persistence, &identity.principal)?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Rota
// ============================================================================

/// Handler for GET `/rota` endpoint.
async fn handle_build_rota(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<RotaResponse>, HttpError> {
    info!(from = %query.from, to = %query.to, "Handling build_rota request");

    let mut persistence = app_state.persistence.lock().await;
    let response: RotaResponse =
        rotaplan_api::build_rota(&mut persistence, &identity.principal, &query)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/rota.csv` endpoint.
async fn handle_export_rota_csv(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Query(query): Query<DateRangeQuery>,
) -> Result<Response, HttpError> {
    info!(from = %query.from, to = %query.to, "Handling export_rota_csv request");

    let mut persistence = app_state.persistence.lock().await;
    let body: String =
        rotaplan_api::export_rota_csv(&mut persistence, &identity.principal, &query)?;
    drop(persistence);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"rota.csv\""),
        ],
        body,
    )
        .into_response())
}

// ============================================================================
// Schedule Events
// ============================================================================

/// Handler for GET `/events` endpoint.
async fn handle_list_events(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<ListEventsResponse>, HttpError> {
    info!(
        after = ?query.after,
        limit = ?query.limit,
        "Handling list_events request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: ListEventsResponse =
        rotaplan_api::list_events(&mut persistence, &identity.principal, query)?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Collaborator Sync
// ============================================================================

/// Handler for PUT `/staff/{staff_id}/availability` endpoint.
async fn handle_sync_staff(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Path(staff_id): Path<i64>,
    Json(req): Json<SyncStaffRequest>,
) -> Result<Json<WriteResponse>, HttpError> {
    info!(
        staff_id,
        windows = req.windows.len(),
        "Handling sync_staff request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: WriteResponse =
        rotaplan_api::sync_staff(&mut persistence, &identity.principal, staff_id, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for PUT `/organization` endpoint.
async fn handle_sync_organization(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    Json(req): Json<SyncOrganizationRequest>,
) -> Result<Json<OrganizationResponse>, HttpError> {
    info!(
        organization_id = identity.principal.organization_id.value(),
        timezone = %req.timezone,
        "Handling sync_organization request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: OrganizationResponse =
        rotaplan_api::sync_organization(&mut persistence, &identity.principal, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/health` endpoint.
#[allow(clippy::unused_async)]
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/sessions", post(handle_create_session))
        .route("/sessions/bulk", post(handle_bulk_schedule))
        .route("/sessions/bulk/preview", post(handle_preview_bulk_schedule))
        .route(
            "/sessions/{session_id}/eligibility",
            get(handle_session_eligibility),
        )
        .route("/eligibility", post(handle_window_eligibility))
        .route(
            "/assignments",
            post(handle_create_assignment).get(handle_list_assignments),
        )
        .route("/assignments/mine", get(handle_list_my_assignments))
        .route(
            "/assignments/{assignment_id}",
            get(handle_get_assignment).delete(handle_delete_assignment),
        )
        .route(
            "/assignments/{assignment_id}/status",
            post(handle_transition_assignment),
        )
        .route("/swaps", post(handle_request_swap).get(handle_list_swaps))
        .route("/swaps/{swap_request_id}/accept", post(handle_accept_swap))
        .route("/swaps/{swap_request_id}/decline", post(handle_decline_swap))
        .route("/rota", get(handle_build_rota))
        .route("/rota.csv", get(handle_export_rota_csv))
        .route("/events", get(handle_list_events))
        .route("/staff/{staff_id}/availability", put(handle_sync_staff))
        .route("/organization", put(handle_sync_organization))
        .route("/health", get(handle_health))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Rotaplan Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    if !args.over_quota_org.is_empty() {
        warn!(
            organizations = ?args.over_quota_org,
            "Assignment writes will be refused for over-quota organizations"
        );
    }
    let gate: StaticUsageGate = StaticUsageGate::new(
        args.over_quota_org
            .iter()
            .copied()
            .map(OrganizationId::new),
    );

    let app: Router = build_router(AppState::new(persistence, gate));

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
