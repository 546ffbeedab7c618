//! API route handlers for the pitchside server.

pub mod health;
pub mod players;
pub mod sessions;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined API router with all routes under /api prefix.
///
/// Routes:
/// - GET /api/health - Health check
/// - GET /api/academies/:academy_id/sessions - Paginated session feed for an academy
/// - GET /api/sessions/:id - Get a single session
/// - POST /api/sessions - Create a session (expands recurring templates)
/// - PATCH /api/sessions/:id - Update a session (regenerates occurrences on template edits)
/// - POST /api/sessions/delete - Bulk delete sessions by id
/// - POST /api/sessions/:id/attendance - Mark a player's attendance
/// - POST /api/sessions/:id/metrics - Record a player's performance metrics
/// - GET /api/players/:player_id/performance - Player ratings and history
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router())
        .nest("/api", sessions::router())
        .nest("/api", players::router())
        .with_state(state)
}
