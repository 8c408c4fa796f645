// 🌐 REST API - axum router over the planner
//
// JSON envelope: { "success": bool, "data": ..., "error": "..." }
// Status codes:
//   400 validation / bad time / weight budget / email taken / bad JSON
//   401 bad credentials, 404 unknown user or item, 409 schedule conflict

use crate::calendar::{MonthGrid, WeekView};
use crate::entities::{
    BatchScheduleRequest, Evaluation, EvaluationRequest, Event, EventRequest, LoginRequest,
    RegisterRequest, ScheduleRequest, ScheduleSlot, Subject, User,
};
use crate::grades::GradeReport;
use crate::error::{PlannerError, PlannerResult};
use crate::planner::Planner;
use crate::search::{no_match_message, SearchResult};
use crate::time_input::parse_date;
use crate::validation::{AccountRules, ValidationError};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{Local, NaiveDate};
use log::{error, warn};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub rules: AccountRules,
}

impl AppState {
    pub fn new(conn: Connection, rules: AccountRules) -> Self {
        AppState {
            db: Arc::new(Mutex::new(conn)),
            rules,
        }
    }

    /// Run one planner call while holding the connection
    fn with_planner<T, F>(&self, f: F) -> PlannerResult<T>
    where
        F: FnOnce(&Planner) -> PlannerResult<T>,
    {
        let conn = self
            .db
            .lock()
            .map_err(|_| PlannerError::Storage(anyhow::anyhow!("database lock poisoned")))?;
        let planner = Planner::new(&conn, self.rules.clone());
        f(&planner)
    }
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

pub struct ApiError(PlannerError);

impl From<PlannerError> for ApiError {
    fn from(err: PlannerError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(PlannerError::Validation(vec![ValidationError {
            field: "body".to_string(),
            message: rejection.body_text(),
            context: "Request".to_string(),
        }]))
    }
}

pub fn status_for(err: &PlannerError) -> StatusCode {
    match err {
        PlannerError::Validation(_)
        | PlannerError::InvalidTime(_)
        | PlannerError::WeightExceeded { .. }
        | PlannerError::EmailTaken => StatusCode::BAD_REQUEST,
        PlannerError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        PlannerError::NotFound(_) => StatusCode::NOT_FOUND,
        PlannerError::Conflict(_) => StatusCode::CONFLICT,
        PlannerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!("event=api_error kind={} error={:#}", self.0.kind(), self.0);
        } else {
            warn!("event=api_rejected kind={} status={}", self.0.kind(), status.as_u16());
        }
        (status, Json(ApiResponse::error(self.0.to_string()))).into_response()
    }
}

type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::ok(data))))
}

fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(data))))
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

impl DateQuery {
    /// Requested date, or today when absent
    fn resolve(&self) -> PlannerResult<NaiveDate> {
        match self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => parse_date(raw).map_err(|message| {
                PlannerError::Validation(vec![ValidationError {
                    field: "date".to_string(),
                    message,
                    context: "Calendar".to_string(),
                }])
            }),
            None => Ok(today()),
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(req) = body?;
    created(state.with_planner(|p| p.register(&req))?)
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(req) = body?;
    ok(state.with_planner(|p| p.login(&req))?)
}

/// GET /api/auth/users/:id
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<User> {
    ok(state.with_planner(|p| p.get_user(id))?)
}

/// GET /api/subjects
async fn list_subjects(State(state): State<AppState>) -> ApiResult<Vec<Subject>> {
    ok(state.with_planner(|p| p.list_subjects())?)
}

// ----------------------------------------------------------------------------
// Events
// ----------------------------------------------------------------------------

async fn list_events(
    State(state): State<AppState>,
    Path(uid): Path<i64>,
) -> ApiResult<Vec<Event>> {
    ok(state.with_planner(|p| p.list_events(uid))?)
}

async fn create_event(
    State(state): State<AppState>,
    Path(uid): Path<i64>,
    body: Result<Json<EventRequest>, JsonRejection>,
) -> ApiResult<Event> {
    let Json(req) = body?;
    created(state.with_planner(|p| p.create_event(uid, &req))?)
}

async fn update_event(
    State(state): State<AppState>,
    Path((uid, id)): Path<(i64, i64)>,
    body: Result<Json<EventRequest>, JsonRejection>,
) -> ApiResult<Event> {
    let Json(req) = body?;
    ok(state.with_planner(|p| p.update_event(uid, id, &req))?)
}

async fn delete_event(
    State(state): State<AppState>,
    Path((uid, id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    state.with_planner(|p| p.delete_event(uid, id))?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------------
// Schedules
// ----------------------------------------------------------------------------

async fn list_schedules(
    State(state): State<AppState>,
    Path(uid): Path<i64>,
) -> ApiResult<Vec<ScheduleSlot>> {
    ok(state.with_planner(|p| p.list_schedules(uid))?)
}

async fn create_schedule(
    State(state): State<AppState>,
    Path(uid): Path<i64>,
    body: Result<Json<ScheduleRequest>, JsonRejection>,
) -> ApiResult<ScheduleSlot> {
    let Json(req) = body?;
    created(state.with_planner(|p| p.create_schedule(uid, &req))?)
}

async fn create_schedule_batch(
    State(state): State<AppState>,
    Path(uid): Path<i64>,
    body: Result<Json<BatchScheduleRequest>, JsonRejection>,
) -> ApiResult<Vec<ScheduleSlot>> {
    let Json(req) = body?;
    created(state.with_planner(|p| p.create_schedule_batch(uid, &req))?)
}

async fn update_schedule(
    State(state): State<AppState>,
    Path((uid, id)): Path<(i64, i64)>,
    body: Result<Json<ScheduleRequest>, JsonRejection>,
) -> ApiResult<ScheduleSlot> {
    let Json(req) = body?;
    ok(state.with_planner(|p| p.update_schedule(uid, id, &req))?)
}

async fn delete_schedule(
    State(state): State<AppState>,
    Path((uid, id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    state.with_planner(|p| p.delete_schedule(uid, id))?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------------
// Evaluations
// ----------------------------------------------------------------------------

async fn list_evaluations(
    State(state): State<AppState>,
    Path(uid): Path<i64>,
) -> ApiResult<Vec<Evaluation>> {
    ok(state.with_planner(|p| p.list_evaluations(uid))?)
}

async fn create_evaluation(
    State(state): State<AppState>,
    Path(uid): Path<i64>,
    body: Result<Json<EvaluationRequest>, JsonRejection>,
) -> ApiResult<Evaluation> {
    let Json(req) = body?;
    created(state.with_planner(|p| p.create_evaluation(uid, &req))?)
}

async fn update_evaluation(
    State(state): State<AppState>,
    Path((uid, id)): Path<(i64, i64)>,
    body: Result<Json<EvaluationRequest>, JsonRejection>,
) -> ApiResult<Evaluation> {
    let Json(req) = body?;
    ok(state.with_planner(|p| p.update_evaluation(uid, id, &req))?)
}

async fn delete_evaluation(
    State(state): State<AppState>,
    Path((uid, id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    state.with_planner(|p| p.delete_evaluation(uid, id))?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------------
// Views
// ----------------------------------------------------------------------------

/// GET /api/users/:uid/grades
async fn grades(
    State(state): State<AppState>,
    Path(uid): Path<i64>,
) -> ApiResult<GradeReport> {
    ok(state.with_planner(|p| p.grade_report(uid))?)
}

/// GET /api/users/:uid/calendar/week?date=YYYY-MM-DD
async fn week(
    State(state): State<AppState>,
    Path(uid): Path<i64>,
    Query(query): Query<DateQuery>,
) -> ApiResult<WeekView> {
    let date = query.resolve()?;
    ok(state.with_planner(|p| p.week_view(uid, date))?)
}

/// GET /api/calendar/month?date=YYYY-MM-DD
async fn month(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> ApiResult<MonthGrid> {
    let date = query.resolve()?;
    ok(state.with_planner(|p| Ok(p.month_view(date, today())))?)
}

/// GET /api/users/:uid/search/:term
async fn search(
    State(state): State<AppState>,
    Path((uid, term)): Path<(i64, String)>,
) -> ApiResult<SearchResult> {
    // Path has already percent-decoded the term
    match state.with_planner(|p| p.search(uid, &term, today()))? {
        Some(hit) => ok(hit),
        None => Err(PlannerError::NotFound(no_match_message(&term)).into()),
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let users = Router::new()
        .route("/:uid/events", get(list_events).post(create_event))
        .route("/:uid/events/:id", put(update_event).delete(delete_event))
        .route("/:uid/schedules", get(list_schedules).post(create_schedule))
        .route("/:uid/schedules/batch", post(create_schedule_batch))
        .route("/:uid/schedules/:id", put(update_schedule).delete(delete_schedule))
        .route("/:uid/evaluations", get(list_evaluations).post(create_evaluation))
        .route(
            "/:uid/evaluations/:id",
            put(update_evaluation).delete(delete_evaluation),
        )
        .route("/:uid/grades", get(grades))
        .route("/:uid/calendar/week", get(week))
        .route("/:uid/search/:term", get(search));

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/users/:id", get(get_user))
        .route("/subjects", get(list_subjects))
        .route("/calendar/month", get(month))
        .nest("/users", users)
        .with_state(state);

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors_layer(cors_origin)?))
}

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    if origin.trim() == "*" {
        return Ok(CorsLayer::permissive());
    }
    let origin: HeaderValue = origin
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid CORS origin {}: {}", origin, e))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any))
}
