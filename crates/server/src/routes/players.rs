// crates/server/src/routes/players.rs
//! Player performance endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use pitchside_core::{average_performance, overall_rating, PlayerPerformance};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/players/:player_id/performance - Ratings and history.
///
/// `overallRating` and `averagePerformance` are derived from the stored
/// record on every read; they are never persisted.
pub async fn get_player_performance(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> ApiResult<Json<PlayerPerformance>> {
    let record = state
        .db
        .get_player(&player_id)
        .await?
        .ok_or(ApiError::PlayerNotFound(player_id))?;

    let overall = overall_rating(&record.attributes, &record.performance_history);
    let average = average_performance(&record.performance_history);

    Ok(Json(PlayerPerformance {
        player_id: record.player_id,
        attributes: record.attributes,
        performance_history: record.performance_history,
        overall_rating: overall,
        average_performance: average,
    }))
}

/// Create the players routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/players/{player_id}/performance", get(get_player_performance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tower::ServiceExt;

    use pitchside_core::{
        AttributeSnapshot, PerformanceEntry, PlayerPerformanceRecord, Session,
    };
    use pitchside_db::Database;

    async fn test_db() -> Database {
        Database::new_in_memory().await.expect("in-memory DB")
    }

    fn build_app(db: Database) -> axum::Router {
        crate::create_app(db)
    }

    async fn do_get(app: axum::Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn do_post(app: axum::Router, uri: &str, body: serde_json::Value) -> StatusCode {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_performance_not_found() {
        let db = test_db().await;
        let app = build_app(db);
        let (status, body) = do_get(app, "/api/players/ghost/performance").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["details"].as_str().unwrap().contains("ghost"));
    }

    #[tokio::test]
    async fn test_performance_derives_ratings() {
        let db = test_db().await;
        let mut record = PlayerPerformanceRecord::new("p1");
        record.attributes = AttributeSnapshot {
            shooting: Some(10.0),
            pace: Some(10.0),
            positioning: Some(10.0),
            passing: Some(10.0),
            ball_control: Some(10.0),
            crossing: Some(10.0),
            ..Default::default()
        };
        record.performance_history = vec![
            PerformanceEntry {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                session_rating: None,
                rating: Some(6.0),
                attributes: None,
                session_id: None,
            },
            PerformanceEntry {
                date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
                session_rating: Some(8.0),
                rating: None,
                attributes: None,
                session_id: None,
            },
        ];
        db.insert_player(&record).await.unwrap();

        let app = build_app(db);
        let (status, body) = do_get(app, "/api/players/p1/performance").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        // Six perfect attributes, no snapshot in history to blend with.
        assert_eq!(json["overallRating"], 10.0);
        // (6.0 + 8.0) / 2
        assert_eq!(json["averagePerformance"], 7.0);
        assert_eq!(json["performanceHistory"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_performance_blends_metrics_submission() {
        let db = test_db().await;

        // Player starts with a known baseline.
        let mut record = PlayerPerformanceRecord::new("p1");
        record.attributes.shooting = Some(4.0);
        db.insert_player(&record).await.unwrap();

        let session = Session::new(
            "acad-1",
            "training",
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            chrono::NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        )
        .with_players(vec!["p1".to_string()]);
        db.insert_session(&session).await.unwrap();

        let app = build_app(db);
        let status = do_post(
            app.clone(),
            &format!("/api/sessions/{}/metrics", session.id),
            json!({
                "playerId": "p1",
                "attributes": { "shooting": 6.0 },
                "sessionRating": 8.0
            }),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = do_get(app, "/api/players/p1/performance").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        // Baseline 4.0 blended with the submitted 6.0: (4 + 6) / 2 = 5.0,
        // and shooting is the only weighted field present.
        assert_eq!(json["overallRating"], 5.0);
        assert_eq!(json["averagePerformance"], 8.0);
        // The stored snapshot itself is untouched by the submission.
        assert_eq!(json["attributes"]["shooting"], 4.0);
    }
}
