// crates/db/src/queries/row_types.rs
// Internal row types bridging SQLite columns and domain documents.

use chrono::{NaiveDate, NaiveTime};
use sqlx::Row;

use pitchside_core::{
    AttendanceEntry, AttributeSnapshot, PerformanceEntry, PlayerPerformanceRecord, Session,
    SessionMetrics, SessionStatus, Weekday,
};

use crate::{DbError, DbResult};

#[derive(Debug)]
pub(crate) struct SessionRow {
    id: String,
    academy_id: String,
    name: String,
    category: Option<String>,
    date: String,
    start_time: String,
    end_time: String,
    coaches: String,
    players: String,
    attendance: String,
    player_metrics: String,
    status: String,
    is_recurring: bool,
    selected_days: String,
    recurring_end_date: Option<String>,
    parent_session_id: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for SessionRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            academy_id: row.try_get("academy_id")?,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            date: row.try_get("date")?,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
            coaches: row.try_get("coaches")?,
            players: row.try_get("players")?,
            attendance: row.try_get("attendance")?,
            player_metrics: row.try_get("player_metrics")?,
            status: row.try_get("status")?,
            is_recurring: row.try_get("is_recurring")?,
            selected_days: row.try_get("selected_days")?,
            recurring_end_date: row.try_get("recurring_end_date")?,
            parent_session_id: row.try_get("parent_session_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl SessionRow {
    /// Convert into the domain document.
    ///
    /// Schedule columns (date, times) are load-bearing for deduplication
    /// and classification, so corrupt values are an error. JSON document
    /// columns fall back to empty, matching how the rest of the system
    /// treats missing optional payloads.
    pub(crate) fn into_session(self) -> DbResult<Session> {
        let date = parse_date("date", &self.date)?;
        let start_time = parse_time("start_time", &self.start_time)?;
        let end_time = parse_time("end_time", &self.end_time)?;
        let recurring_end_date = self
            .recurring_end_date
            .as_deref()
            .map(|raw| parse_date("recurring_end_date", raw))
            .transpose()?;

        let coaches: Vec<String> = serde_json::from_str(&self.coaches).unwrap_or_default();
        let players: Vec<String> = serde_json::from_str(&self.players).unwrap_or_default();
        let attendance: std::collections::HashMap<String, AttendanceEntry> =
            serde_json::from_str(&self.attendance).unwrap_or_default();
        let player_metrics: std::collections::HashMap<String, SessionMetrics> =
            serde_json::from_str(&self.player_metrics).unwrap_or_default();
        let selected_days: std::collections::BTreeSet<Weekday> =
            serde_json::from_str(&self.selected_days).unwrap_or_default();

        Ok(Session {
            id: self.id,
            academy_id: self.academy_id,
            name: self.name,
            category: self.category,
            date,
            start_time,
            end_time,
            coaches,
            players,
            attendance,
            player_metrics,
            status: SessionStatus::from_name(&self.status).unwrap_or_default(),
            is_recurring: self.is_recurring,
            selected_days,
            recurring_end_date,
            parent_session_id: self.parent_session_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug)]
pub(crate) struct PlayerRow {
    id: String,
    attributes: String,
    performance_history: String,
    created_at: i64,
    updated_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for PlayerRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            attributes: row.try_get("attributes")?,
            performance_history: row.try_get("performance_history")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl PlayerRow {
    pub(crate) fn into_record(self) -> PlayerPerformanceRecord {
        let attributes: AttributeSnapshot =
            serde_json::from_str(&self.attributes).unwrap_or_default();
        let performance_history: Vec<PerformanceEntry> =
            serde_json::from_str(&self.performance_history).unwrap_or_default();
        PlayerPerformanceRecord {
            player_id: self.id,
            attributes,
            performance_history,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn parse_date(column: &'static str, raw: &str) -> DbResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| DbError::Corrupt {
        column,
        value: raw.to_string(),
    })
}

fn parse_time(column: &'static str, raw: &str) -> DbResult<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| DbError::Corrupt {
        column,
        value: raw.to_string(),
    })
}
