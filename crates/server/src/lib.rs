// crates/server/src/lib.rs
//! Pitchside server library.
//!
//! This crate provides the Axum-based HTTP server for the pitchside
//! academy portal: the session scheduling API, attendance and metrics
//! submission, and the player performance read side.

pub mod error;
pub mod routes;
pub mod state;

pub use error::*;
pub use routes::api_routes;
pub use state::AppState;

use axum::Router;
use pitchside_db::Database;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware.
///
/// This sets up:
/// - API routes (health, sessions, players)
/// - CORS for development (allows any origin)
/// - Request tracing
pub fn create_app(db: Database) -> Router {
    let state = AppState::new(db);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api_routes(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Integration Tests
// ============================================================================
