//! HTTP API server for smartplan.
//!
//! Session-token authentication over a JSON API: clients log in with
//! username/password, receive an opaque bearer token, and pass it in the
//! `Authorization` header on every other call.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use smartplan_core::auth;
use smartplan_core::schedule::{DayResult, Planner, ValidationError};
use smartplan_core::session::{MemorySessionStore, Session, SessionStore};
use smartplan_core::store::postgres::{PgNotificationSink, PgPlanStore, PgTaskStore};
use smartplan_db::models::{Category, Notification, Task};
use smartplan_db::queries::{categories, notifications, plan_entries, tasks, users};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.into(),
        }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State and session helpers
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
    sessions: Arc<dyn SessionStore>,
}

/// Mint an opaque session token: 32 random bytes, hex-encoded.
fn generate_session_token() -> String {
    use rand::Rng;
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn require_session(state: &AppState, headers: &HeaderMap) -> Result<Session, AppError> {
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::unauthorized("missing Authorization header"))?;
    state
        .sessions
        .get(token)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::unauthorized("invalid or expired session"))
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub deadline: NaiveDate,
    pub duration_minutes: i32,
    pub priority: i32,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratePlanRequest {
    pub start_date: NaiveDate,
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct ScheduledTaskResponse {
    pub task_id: Uuid,
    pub title: String,
    pub order: i32,
    pub duration_minutes: i32,
    /// Start time as HH:MM.
    pub scheduled_time: String,
}

#[derive(Debug, Serialize)]
pub struct DayPlanResponse {
    pub date: NaiveDate,
    pub tasks_planned: usize,
    pub remaining_minutes: i32,
    /// Day start as HH:MM.
    pub start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub tasks: Vec<ScheduledTaskResponse>,
}

impl From<DayResult> for DayPlanResponse {
    fn from(day: DayResult) -> Self {
        Self {
            date: day.date,
            tasks_planned: day.tasks_planned,
            remaining_minutes: day.remaining_minutes,
            start_time: day.start_time.format("%H:%M").to_string(),
            message: day.message,
            tasks: day
                .entries
                .into_iter()
                .map(|e| ScheduledTaskResponse {
                    task_id: e.task_id,
                    title: e.title,
                    order: e.order,
                    duration_minutes: e.duration,
                    scheduled_time: e.scheduled_time.format("%H:%M").to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanEntryResponse {
    pub task_id: Uuid,
    pub plan_date: NaiveDate,
    pub order: i32,
    pub scheduled_time: String,
    pub title: String,
    pub duration_minutes: i32,
    pub priority: i32,
    pub deadline: NaiveDate,
    pub category: String,
    pub status: String,
}

impl From<plan_entries::PlanEntryWithTask> for PlanEntryResponse {
    fn from(row: plan_entries::PlanEntryWithTask) -> Self {
        Self {
            task_id: row.task_id,
            plan_date: row.plan_date,
            order: row.task_order,
            scheduled_time: row.scheduled_time.format("%H:%M").to_string(),
            title: row.title,
            duration_minutes: row.duration_minutes,
            priority: row.priority,
            deadline: row.deadline,
            category: row.category,
            status: row.status.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(pool: PgPool, sessions: Arc<dyn SessionStore>) -> Router {
    let state = AppState { pool, sessions };
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/me", get(me))
        .route("/api/tasks", get(list_tasks_handler).post(create_task))
        .route("/api/tasks/{id}/complete", post(complete_task_handler))
        .route("/api/tasks/{id}/uncomplete", post(uncomplete_task_handler))
        .route("/api/tasks/{id}", delete(delete_task_handler))
        .route("/api/generate-plan", post(generate_plan))
        .route("/api/plan", get(show_plan))
        .route("/api/calendar", get(show_calendar))
        .route(
            "/api/categories",
            get(list_categories_handler).post(create_category),
        )
        .route("/api/notifications", get(list_notifications_handler))
        .route("/api/notifications/{id}/read", post(mark_notification_read))
        .route("/api/notifications/{id}", delete(delete_notification_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(pool: PgPool, bind: &str, port: u16) -> Result<()> {
    let sessions: Arc<dyn SessionStore> = MemorySessionStore::new();
    let app = build_router(pool, sessions);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("smartplan serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("smartplan serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for Ctrl+C, shutting down");
    }
}

// ---------------------------------------------------------------------------
// Auth handlers
// ---------------------------------------------------------------------------

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<axum::response::Response, AppError> {
    let user = users::get_user_by_username(&state.pool, &req.username)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::unauthorized("invalid username or password"))?;

    if !auth::verify_password(&req.password, &user.password_hash) {
        return Err(AppError::unauthorized("invalid username or password"));
    }

    let token = generate_session_token();
    let session = Session::new(user.id, user.username.clone(), user.role);
    state
        .sessions
        .set(&token, session)
        .await
        .map_err(AppError::internal)?;

    tracing::info!(username = %user.username, "login");

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        username: user.username,
        role: user.role.to_string(),
    })
    .into_response())
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<axum::response::Response, AppError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::unauthorized("missing Authorization header"))?;
    state
        .sessions
        .remove(token)
        .await
        .map_err(AppError::internal)?;
    Ok(Json(serde_json::json!({ "success": true })).into_response())
}

async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<axum::response::Response, AppError> {
    let session = require_session(&state, &headers).await?;
    Ok(Json(serde_json::json!({
        "user_id": session.user_id,
        "username": session.username,
        "role": session.role.to_string(),
    }))
    .into_response())
}

// ---------------------------------------------------------------------------
// Task handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Admins may pass `all=true` to see every user's tasks.
    #[serde(default)]
    pub all: bool,
}

async fn list_tasks_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListTasksQuery>,
) -> Result<axum::response::Response, AppError> {
    let session = require_session(&state, &headers).await?;

    let listed: Vec<Task> = if query.all {
        if !session.role.is_admin() {
            return Err(AppError::forbidden("admin role required"));
        }
        tasks::list_all_tasks(&state.pool)
            .await
            .map_err(AppError::internal)?
    } else {
        tasks::list_tasks_for_user(&state.pool, session.user_id)
            .await
            .map_err(AppError::internal)?
    };

    Ok(Json(listed).into_response())
}

async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateTaskRequest>,
) -> Result<axum::response::Response, AppError> {
    let session = require_session(&state, &headers).await?;

    if req.duration_minutes <= 0 {
        return Err(AppError::bad_request("duration_minutes must be positive"));
    }

    let category = req.category.as_deref().unwrap_or("General");
    let task = tasks::insert_task(
        &state.pool,
        session.user_id,
        &req.title,
        req.deadline,
        req.duration_minutes,
        req.priority,
        category,
    )
    .await
    .map_err(AppError::internal)?;

    Ok((StatusCode::CREATED, Json(task)).into_response())
}

/// Fetch a task and check the caller may act on it (owner or admin).
async fn load_owned_task(
    state: &AppState,
    session: &Session,
    id: Uuid,
) -> Result<Task, AppError> {
    let task = tasks::get_task(&state.pool, id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found(format!("task {id} not found")))?;

    if task.user_id != session.user_id && !session.role.is_admin() {
        return Err(AppError::forbidden("not your task"));
    }
    Ok(task)
}

async fn complete_task_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let session = require_session(&state, &headers).await?;
    let task = load_owned_task(&state, &session, id).await?;

    tasks::complete_task(&state.pool, task.id)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(serde_json::json!({ "success": true })).into_response())
}

async fn uncomplete_task_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let session = require_session(&state, &headers).await?;
    let task = load_owned_task(&state, &session, id).await?;

    tasks::uncomplete_task(&state.pool, task.id)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(serde_json::json!({ "success": true })).into_response())
}

async fn delete_task_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let session = require_session(&state, &headers).await?;
    let task = load_owned_task(&state, &session, id).await?;

    tasks::delete_task(&state.pool, task.id)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(serde_json::json!({ "success": true })).into_response())
}

// ---------------------------------------------------------------------------
// Plan handlers
// ---------------------------------------------------------------------------

async fn generate_plan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<GeneratePlanRequest>,
) -> Result<axum::response::Response, AppError> {
    let session = require_session(&state, &headers).await?;

    if req.days < 1 || req.days > 30 {
        return Err(AppError::bad_request("days must be between 1 and 30"));
    }

    let dates: Vec<NaiveDate> = (0..req.days as i64)
        .map(|i| req.start_date + Duration::days(i))
        .collect();

    let planner = Planner::new(
        PgTaskStore::new(state.pool.clone()),
        PgPlanStore::new(state.pool.clone()),
        PgNotificationSink::new(state.pool.clone()),
    );

    let results = planner
        .generate(session.user_id, &dates)
        .await
        .map_err(|err| match err.downcast_ref::<ValidationError>() {
            Some(e) => AppError::bad_request(e.to_string()),
            None => AppError::internal(err),
        })?;

    let days: Vec<DayPlanResponse> = results.into_iter().map(Into::into).collect();
    let total: usize = days.iter().map(|d| d.tasks_planned).sum();
    let message = format!(
        "Generated plan for {} day(s) with {total} tasks scheduled!",
        days.len()
    );
    Ok(Json(serde_json::json!({
        "message": message,
        "total_tasks_planned": total,
        "results": days,
    }))
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct ShowPlanQuery {
    pub date: NaiveDate,
}

async fn show_plan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ShowPlanQuery>,
) -> Result<axum::response::Response, AppError> {
    let session = require_session(&state, &headers).await?;

    let rows = plan_entries::list_day_with_tasks(&state.pool, session.user_id, query.date)
        .await
        .map_err(AppError::internal)?;

    let entries: Vec<PlanEntryResponse> = rows.into_iter().map(Into::into).collect();
    Ok(Json(entries).into_response())
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

async fn show_calendar(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CalendarQuery>,
) -> Result<axum::response::Response, AppError> {
    let session = require_session(&state, &headers).await?;

    if query.end < query.start {
        return Err(AppError::bad_request("end must not precede start"));
    }

    let rows =
        plan_entries::list_range_with_tasks(&state.pool, session.user_id, query.start, query.end)
            .await
            .map_err(AppError::internal)?;

    let entries: Vec<PlanEntryResponse> = rows.into_iter().map(Into::into).collect();
    Ok(Json(entries).into_response())
}

// ---------------------------------------------------------------------------
// Category and notification handlers
// ---------------------------------------------------------------------------

async fn list_categories_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<axum::response::Response, AppError> {
    let session = require_session(&state, &headers).await?;

    let listed: Vec<Category> = categories::list_visible(&state.pool, session.user_id)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(listed).into_response())
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "#667eea".to_string()
}

async fn create_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<axum::response::Response, AppError> {
    let session = require_session(&state, &headers).await?;

    if req.name.trim().is_empty() {
        return Err(AppError::bad_request("category name must not be empty"));
    }

    let category =
        categories::insert_category(&state.pool, Some(session.user_id), &req.name, &req.color)
            .await
            .map_err(AppError::internal)?;

    Ok((StatusCode::CREATED, Json(category)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

async fn list_notifications_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<NotificationsQuery>,
) -> Result<axum::response::Response, AppError> {
    let session = require_session(&state, &headers).await?;

    let listed: Vec<Notification> =
        notifications::list_notifications(&state.pool, session.user_id, query.unread_only)
            .await
            .map_err(AppError::internal)?;

    Ok(Json(listed).into_response())
}

async fn mark_notification_read(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<axum::response::Response, AppError> {
    let session = require_session(&state, &headers).await?;

    notifications::mark_read(&state.pool, id, session.user_id)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(serde_json::json!({ "success": true })).into_response())
}

async fn delete_notification_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<axum::response::Response, AppError> {
    let session = require_session(&state, &headers).await?;

    notifications::delete_notification(&state.pool, id, session.user_id)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(serde_json::json!({ "success": true })).into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sqlx::PgPool;
    use tower::ServiceExt;

    use smartplan_core::auth;
    use smartplan_core::session::MemorySessionStore;
    use smartplan_db::models::Role;
    use smartplan_db::queries::users;
    use smartplan_test_utils::{create_test_db, drop_test_db};

    // -----------------------------------------------------------------------
    // HTTP helpers
    // -----------------------------------------------------------------------

    fn test_router(pool: PgPool) -> Router {
        super::build_router(pool, MemorySessionStore::new())
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn seed_and_login(app: &Router, pool: &PgPool, username: &str, role: Role) -> String {
        users::insert_user(pool, username, &auth::hash_password("pw"), role)
            .await
            .unwrap();
        let resp = send(
            app,
            "POST",
            "/api/login",
            None,
            Some(serde_json::json!({ "username": username, "password": "pw" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        body_json(resp).await["token"].as_str().unwrap().to_string()
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let (pool, db_name) = create_test_db().await;
        let app = test_router(pool.clone());

        users::insert_user(&pool, "alice", &auth::hash_password("pw"), Role::User)
            .await
            .unwrap();

        let resp = send(
            &app,
            "POST",
            "/api/login",
            None,
            Some(serde_json::json!({ "username": "alice", "password": "wrong" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn requests_without_a_token_are_unauthorized() {
        let (pool, db_name) = create_test_db().await;
        let app = test_router(pool.clone());

        let resp = send(&app, "GET", "/api/tasks", None, None).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn logout_invalidates_the_token() {
        let (pool, db_name) = create_test_db().await;
        let app = test_router(pool.clone());
        let token = seed_and_login(&app, &pool, "alice", Role::User).await;

        let resp = send(&app, "GET", "/api/me", Some(&token), None).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = send(&app, "POST", "/api/logout", Some(&token), None).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = send(&app, "GET", "/api/me", Some(&token), None).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn create_and_list_tasks() {
        let (pool, db_name) = create_test_db().await;
        let app = test_router(pool.clone());
        let token = seed_and_login(&app, &pool, "alice", Role::User).await;

        let resp = send(
            &app,
            "POST",
            "/api/tasks",
            Some(&token),
            Some(serde_json::json!({
                "title": "write report",
                "deadline": "2026-07-01",
                "duration_minutes": 90,
                "priority": 4,
                "category": "Work",
            })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        assert_eq!(created["title"], "write report");
        assert_eq!(created["status"], "pending");

        let resp = send(&app, "GET", "/api/tasks", Some(&token), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let listed = body_json(resp).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn zero_duration_task_is_rejected() {
        let (pool, db_name) = create_test_db().await;
        let app = test_router(pool.clone());
        let token = seed_and_login(&app, &pool, "alice", Role::User).await;

        let resp = send(
            &app,
            "POST",
            "/api/tasks",
            Some(&token),
            Some(serde_json::json!({
                "title": "broken",
                "deadline": "2026-07-01",
                "duration_minutes": 0,
                "priority": 3,
            })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn users_cannot_touch_each_others_tasks() {
        let (pool, db_name) = create_test_db().await;
        let app = test_router(pool.clone());
        let alice = seed_and_login(&app, &pool, "alice", Role::User).await;
        let bob = seed_and_login(&app, &pool, "bob", Role::User).await;

        let resp = send(
            &app,
            "POST",
            "/api/tasks",
            Some(&alice),
            Some(serde_json::json!({
                "title": "hers",
                "deadline": "2026-07-01",
                "duration_minutes": 30,
                "priority": 3,
            })),
        )
        .await;
        let task_id = body_json(resp).await["id"].as_str().unwrap().to_string();

        let resp = send(
            &app,
            "POST",
            &format!("/api/tasks/{task_id}/complete"),
            Some(&bob),
            None,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn admin_may_complete_any_task() {
        let (pool, db_name) = create_test_db().await;
        let app = test_router(pool.clone());
        let alice = seed_and_login(&app, &pool, "alice", Role::User).await;
        let admin = seed_and_login(&app, &pool, "root", Role::Admin).await;

        let resp = send(
            &app,
            "POST",
            "/api/tasks",
            Some(&alice),
            Some(serde_json::json!({
                "title": "hers",
                "deadline": "2026-07-01",
                "duration_minutes": 30,
                "priority": 3,
            })),
        )
        .await;
        let task_id = body_json(resp).await["id"].as_str().unwrap().to_string();

        let resp = send(
            &app,
            "POST",
            &format!("/api/tasks/{task_id}/complete"),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn all_tasks_listing_requires_admin() {
        let (pool, db_name) = create_test_db().await;
        let app = test_router(pool.clone());
        let alice = seed_and_login(&app, &pool, "alice", Role::User).await;
        let admin = seed_and_login(&app, &pool, "root", Role::Admin).await;

        let resp = send(&app, "GET", "/api/tasks?all=true", Some(&alice), None).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = send(&app, "GET", "/api/tasks?all=true", Some(&admin), None).await;
        assert_eq!(resp.status(), StatusCode::OK);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn generate_plan_returns_timestamped_schedule() {
        let (pool, db_name) = create_test_db().await;
        let app = test_router(pool.clone());
        let token = seed_and_login(&app, &pool, "alice", Role::User).await;

        // Priorities force the rank order big, medium, small.
        for (title, duration, priority) in [("big", 250, 5), ("medium", 100, 4), ("small", 40, 3)] {
            let resp = send(
                &app,
                "POST",
                "/api/tasks",
                Some(&token),
                Some(serde_json::json!({
                    "title": title,
                    "deadline": "2026-07-02",
                    "duration_minutes": duration,
                    "priority": priority,
                })),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let resp = send(
            &app,
            "POST",
            "/api/generate-plan",
            Some(&token),
            Some(serde_json::json!({ "start_date": "2026-07-01", "days": 1 })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["total_tasks_planned"], 2);

        let day = &json["results"][0];
        assert_eq!(day["date"], "2026-07-01");
        assert_eq!(day["tasks_planned"], 2);
        assert_eq!(day["remaining_minutes"], 10);
        assert_eq!(day["start_time"], "09:00");

        // 250 fits, 100 does not, 40 still does.
        let tasks = day["tasks"].as_array().unwrap();
        assert_eq!(tasks[0]["title"], "big");
        assert_eq!(tasks[0]["scheduled_time"], "09:00");
        assert_eq!(tasks[1]["title"], "small");
        assert_eq!(tasks[1]["scheduled_time"], "13:10");

        // The persisted plan is visible through /api/plan.
        let resp = send(&app, "GET", "/api/plan?date=2026-07-01", Some(&token), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let entries = body_json(resp).await;
        assert_eq!(entries.as_array().unwrap().len(), 2);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn generate_plan_rejects_too_many_days() {
        let (pool, db_name) = create_test_db().await;
        let app = test_router(pool.clone());
        let token = seed_and_login(&app, &pool, "alice", Role::User).await;

        let resp = send(
            &app,
            "POST",
            "/api/generate-plan",
            Some(&token),
            Some(serde_json::json!({ "start_date": "2026-07-01", "days": 31 })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn generation_leaves_a_notification() {
        let (pool, db_name) = create_test_db().await;
        let app = test_router(pool.clone());
        let token = seed_and_login(&app, &pool, "alice", Role::User).await;

        send(
            &app,
            "POST",
            "/api/generate-plan",
            Some(&token),
            Some(serde_json::json!({ "start_date": "2026-07-01" })),
        )
        .await;

        let resp = send(&app, "GET", "/api/notifications", Some(&token), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["kind"], "success");
        assert_eq!(arr[0]["read_status"], false);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn categories_include_the_defaults() {
        let (pool, db_name) = create_test_db().await;
        let app = test_router(pool.clone());
        let token = seed_and_login(&app, &pool, "alice", Role::User).await;

        let resp = send(&app, "GET", "/api/categories", Some(&token), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let names: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"General"));
        assert!(names.contains(&"Work"));

        pool.close().await;
        drop_test_db(&db_name).await;
    }
}
