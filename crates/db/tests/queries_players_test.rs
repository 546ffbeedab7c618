//! Integration tests for Database player-record repository methods.

use chrono::NaiveDate;
use pitchside_core::{AttributeSnapshot, PerformanceEntry, PlayerPerformanceRecord};
use pitchside_db::Database;
use pretty_assertions::assert_eq;

use queries_shared::jan;

fn entry(day: u32, session_rating: Option<f64>) -> PerformanceEntry {
    PerformanceEntry {
        date: jan(day),
        session_rating,
        rating: None,
        attributes: Some(AttributeSnapshot {
            shooting: Some(7.0),
            pace: Some(6.5),
            ..Default::default()
        }),
        session_id: Some(format!("sess-{day}")),
    }
}

#[tokio::test]
async fn test_get_player_missing_is_none() {
    let db = Database::new_in_memory().await.unwrap();
    assert!(db.get_player("p404").await.unwrap().is_none());
}

#[tokio::test]
async fn test_insert_and_get_round_trip() {
    let db = Database::new_in_memory().await.unwrap();

    let mut record = PlayerPerformanceRecord::new("p1");
    record.attributes.shooting = Some(8.0);
    record.performance_history.push(entry(8, Some(7.5)));
    db.insert_player(&record).await.unwrap();

    let stored = db.get_player("p1").await.unwrap().unwrap();
    assert_eq!(stored, record);
}

#[tokio::test]
async fn test_append_creates_record_on_first_touch() {
    let db = Database::new_in_memory().await.unwrap();

    db.append_performance_entry("p-new", &entry(8, Some(6.0)))
        .await
        .unwrap();

    let stored = db.get_player("p-new").await.unwrap().unwrap();
    assert!(stored.attributes.is_empty());
    assert_eq!(stored.performance_history.len(), 1);
    assert_eq!(stored.performance_history[0].session_rating, Some(6.0));
}

#[tokio::test]
async fn test_append_preserves_order_and_existing_entries() {
    let db = Database::new_in_memory().await.unwrap();

    db.append_performance_entry("p1", &entry(1, Some(5.0)))
        .await
        .unwrap();
    db.append_performance_entry("p1", &entry(8, Some(7.0)))
        .await
        .unwrap();
    db.append_performance_entry("p1", &entry(15, None)).await.unwrap();

    let stored = db.get_player("p1").await.unwrap().unwrap();
    let dates: Vec<NaiveDate> = stored
        .performance_history
        .iter()
        .map(|e| e.date)
        .collect();
    assert_eq!(dates, vec![jan(1), jan(8), jan(15)]);
    // Earlier entries are untouched by later appends.
    assert_eq!(stored.performance_history[0].session_rating, Some(5.0));
}
