// crates/server/src/routes/sessions.rs
//! Session scheduling endpoints: the academy feed, create/update/delete,
//! attendance marking, and per-player metric submission.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use pitchside_core::{
    dedupe_occurrences, expand_template, now_ts, parse_hhmm, refresh_status, AttendanceEntry,
    AttendanceStatus, AttributeSnapshot, PerformanceEntry, Session, SessionMetrics, SessionPage,
    ValidationError, Weekday,
};
use pitchside_db::Database;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Default page size for the academy feed.
const DEFAULT_PAGE_SIZE: u32 = 50;

/// Upper bound on a single feed page.
const MAX_PAGE_SIZE: u32 = 200;

// ============================================================================
// Request / Response Types
// ============================================================================

/// Query parameters for GET /api/academies/:academy_id/sessions
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FeedQuery {
    /// 1-based page number (default 1)
    pub page: Option<u32>,
    /// Page size (default 50, max 200)
    pub limit: Option<u32>,
}

/// Body for POST /api/sessions.
///
/// Times arrive as "HH:MM" strings and are parsed at this boundary so a
/// malformed value is a 400 validation failure, not a decode rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub academy_id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub coaches: Vec<String>,
    #[serde(default)]
    pub players: Vec<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub selected_days: BTreeSet<Weekday>,
    #[serde(default)]
    pub recurring_end_date: Option<NaiveDate>,
}

/// Body for PATCH /api/sessions/:id. Absent fields stay unchanged.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateSessionRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub coaches: Option<Vec<String>>,
    pub players: Option<Vec<String>>,
    pub selected_days: Option<BTreeSet<Weekday>>,
    pub recurring_end_date: Option<NaiveDate>,
}

impl UpdateSessionRequest {
    fn touches_recurrence(&self) -> bool {
        self.selected_days.is_some() || self.recurring_end_date.is_some()
    }
}

/// Body for POST /api/sessions/delete.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSessionsRequest {
    pub ids: Vec<String>,
    pub academy_id: String,
}

/// Response for POST /api/sessions/delete. `deleted` counts directly
/// matched rows; occurrences removed by a template cascade are not
/// included.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct DeleteSessionsResponse {
    pub deleted: u64,
}

/// Body for POST /api/sessions/:id/attendance.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRequest {
    pub player_id: String,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub marked_by: Option<String>,
}

/// Body for POST /api/sessions/:id/metrics.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRequest {
    pub player_id: String,
    #[serde(default)]
    pub attributes: AttributeSnapshot,
    #[serde(default)]
    pub session_rating: Option<f64>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/academies/:academy_id/sessions - Paginated session feed.
///
/// Statuses are recomputed against the current clock on every read; the
/// stored status column is only a reconciliation hint. An unknown
/// academy is indistinguishable from an empty one and returns an empty
/// page.
pub async fn list_academy_sessions(
    State(state): State<Arc<AppState>>,
    Path(academy_id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Json<SessionPage>> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);

    if page < 1 {
        return Err(ApiError::BadRequest("page must be at least 1".to_string()));
    }
    if limit < 1 || limit > MAX_PAGE_SIZE {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    let offset = (page - 1).saturating_mul(limit);
    let mut sessions = state
        .db
        .list_academy_sessions(&academy_id, limit, offset)
        .await?;
    let total = state.db.count_academy_sessions(&academy_id).await?;

    let now = Utc::now();
    for session in &mut sessions {
        refresh_status(session, now);
    }

    Ok(Json(SessionPage {
        sessions,
        page,
        total,
    }))
}

/// GET /api/sessions/:id - Fetch a single session.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Session>> {
    let mut session = state
        .db
        .get_session(&id)
        .await?
        .ok_or(ApiError::SessionNotFound(id))?;

    refresh_status(&mut session, Utc::now());
    Ok(Json(session))
}

/// POST /api/sessions - Create a session.
///
/// A non-recurring body creates a single occurrence. A recurring body
/// creates a template, expands it into dated occurrences, and reconciles
/// them against the academy's existing occurrence set. The created
/// template (or occurrence) is returned with 201.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    let start = parse_hhmm(&req.start_time)?;
    let end = parse_hhmm(&req.end_time)?;

    let mut session = Session::new(req.academy_id, req.name, req.date, start, end)
        .with_coaches(req.coaches)
        .with_players(req.players);
    if let Some(category) = req.category {
        session = session.with_category(category);
    }
    if req.is_recurring {
        session.is_recurring = true;
        session.selected_days = req.selected_days;
        session.recurring_end_date = req.recurring_end_date;
    }
    session.validate()?;
    refresh_status(&mut session, Utc::now());

    state.db.insert_session(&session).await?;
    if session.is_template() {
        reconcile_academy(&state.db, &session).await?;
    }

    Ok((StatusCode::CREATED, Json(session)))
}

/// PATCH /api/sessions/:id - Update a session.
///
/// Recurrence fields are only accepted on templates. Template edits
/// re-run expansion and reconcile the academy's occurrence set, so
/// future same-slot occurrences are re-stamped from the edited template
/// while started or finished ones survive untouched.
pub async fn update_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSessionRequest>,
) -> ApiResult<Json<Session>> {
    let mut session = state
        .db
        .get_session(&id)
        .await?
        .ok_or(ApiError::SessionNotFound(id))?;

    if !session.is_template() && req.touches_recurrence() {
        return Err(ApiError::BadRequest(
            "recurrence fields can only be changed on a recurring template".to_string(),
        ));
    }

    if let Some(name) = req.name {
        session.name = name;
    }
    if let Some(category) = req.category {
        session.category = Some(category);
    }
    if let Some(date) = req.date {
        session.date = date;
    }
    if let Some(raw) = req.start_time.as_deref() {
        session.start_time = parse_hhmm(raw)?;
    }
    if let Some(raw) = req.end_time.as_deref() {
        session.end_time = parse_hhmm(raw)?;
    }
    if let Some(coaches) = req.coaches {
        session.coaches = coaches;
    }
    if let Some(players) = req.players {
        session.players = players;
    }
    if let Some(days) = req.selected_days {
        session.selected_days = days;
    }
    if let Some(until) = req.recurring_end_date {
        session.recurring_end_date = Some(until);
    }

    session.validate()?;
    session.updated_at = now_ts();
    refresh_status(&mut session, Utc::now());

    if !state.db.update_session(&session).await? {
        return Err(ApiError::SessionNotFound(session.id));
    }
    if session.is_template() {
        reconcile_academy(&state.db, &session).await?;
    }

    Ok(Json(session))
}

/// POST /api/sessions/delete - Bulk delete sessions by id.
///
/// Ids are scoped to the academy in the body; ids belonging to another
/// academy are ignored. Deleting a template also removes the occurrences
/// it generated.
pub async fn delete_sessions(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteSessionsRequest>,
) -> ApiResult<Json<DeleteSessionsResponse>> {
    let deleted = state.db.delete_sessions(&req.ids, &req.academy_id).await?;
    Ok(Json(DeleteSessionsResponse { deleted }))
}

/// POST /api/sessions/:id/attendance - Mark one player's attendance.
///
/// Rejected for templates and for players not on the session roster.
pub async fn mark_attendance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AttendanceRequest>,
) -> ApiResult<StatusCode> {
    let mut session = state
        .db
        .get_session(&id)
        .await?
        .ok_or(ApiError::SessionNotFound(id))?;

    ensure_schedulable(&session)?;
    ensure_on_roster(&session, &req.player_id)?;

    session.attendance.insert(
        req.player_id,
        AttendanceEntry {
            status: req.status,
            marked_at: now_ts(),
            marked_by: req.marked_by.unwrap_or_default(),
        },
    );
    session.updated_at = now_ts();

    if !state.db.update_session(&session).await? {
        return Err(ApiError::SessionNotFound(session.id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sessions/:id/metrics - Record one player's metrics.
///
/// Two-step write: the session's metrics map commits first, then the
/// entry is appended to the player's performance history. A failed
/// append leaves the session write committed and surfaces as a partial
/// write so the caller retries the whole submission.
///
/// The submission only appends history; a player's current attribute
/// snapshot is never modified here.
pub async fn record_metrics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<MetricsRequest>,
) -> ApiResult<StatusCode> {
    let mut session = state
        .db
        .get_session(&id)
        .await?
        .ok_or(ApiError::SessionNotFound(id))?;

    ensure_schedulable(&session)?;
    ensure_on_roster(&session, &req.player_id)?;

    let entry = PerformanceEntry {
        date: session.date,
        session_rating: req.session_rating,
        rating: None,
        attributes: Some(req.attributes),
        session_id: Some(session.id.clone()),
    };

    session.player_metrics.insert(
        req.player_id.clone(),
        SessionMetrics {
            attributes: req.attributes,
            session_rating: req.session_rating,
            recorded_at: now_ts(),
        },
    );
    session.updated_at = now_ts();

    if !state.db.update_session(&session).await? {
        return Err(ApiError::SessionNotFound(session.id));
    }

    if let Err(source) = state
        .db
        .append_performance_entry(&req.player_id, &entry)
        .await
    {
        return Err(ApiError::PartialWrite {
            completed: "session metrics write",
            failed: "player history append",
            source,
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Reconciliation
// ============================================================================

/// Bring an academy's stored occurrences in line with a template.
///
/// Existing occurrences are status-refreshed and fed to the deduplicator
/// first, fresh expansion last, so on a status tie the newest copy of a
/// slot wins and picks up template edits. Occurrences already past
/// Upcoming outrank fresh candidates and are never replaced. The winner
/// set becomes the persisted set: winners not yet stored are inserted,
/// stored rows that lost their slot are deleted.
async fn reconcile_academy(db: &Database, template: &Session) -> Result<(u64, u64), ApiError> {
    let expanded = expand_template(template);
    let mut existing = db.list_academy_occurrences(&template.academy_id).await?;

    let now = Utc::now();
    for session in &mut existing {
        refresh_status(session, now);
    }

    let existing_ids: HashSet<String> = existing.iter().map(|s| s.id.clone()).collect();

    let mut candidates = existing;
    candidates.extend(expanded);
    let winners = dedupe_occurrences(candidates);

    let winner_ids: HashSet<&str> = winners.iter().map(|s| s.id.as_str()).collect();
    let to_insert: Vec<Session> = winners
        .iter()
        .filter(|s| !existing_ids.contains(&s.id))
        .cloned()
        .collect();
    let to_delete: Vec<String> = existing_ids
        .iter()
        .filter(|id| !winner_ids.contains(id.as_str()))
        .cloned()
        .collect();

    let inserted = db.insert_occurrences(&to_insert).await?;
    let removed = db.delete_sessions_by_id(&to_delete).await?;

    if inserted > 0 || removed > 0 {
        tracing::info!(
            academy_id = %template.academy_id,
            template_id = %template.id,
            inserted,
            removed,
            "reconciled occurrence set"
        );
    }
    Ok((inserted, removed))
}

fn ensure_schedulable(session: &Session) -> Result<(), ApiError> {
    if session.is_template() {
        return Err(ValidationError::TemplateNotSchedulable {
            id: session.id.clone(),
        }
        .into());
    }
    Ok(())
}

fn ensure_on_roster(session: &Session, player_id: &str) -> Result<(), ApiError> {
    if !session.players.iter().any(|p| p == player_id) {
        return Err(ValidationError::PlayerNotAssigned {
            session_id: session.id.clone(),
            player_id: player_id.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Create the sessions routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/academies/{academy_id}/sessions",
            get(list_academy_sessions),
        )
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).patch(update_session))
        .route("/sessions/delete", post(delete_sessions))
        .route("/sessions/{id}/attendance", post(mark_attendance))
        .route("/sessions/{id}/metrics", post(record_metrics))
}
