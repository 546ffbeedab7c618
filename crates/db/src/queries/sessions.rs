// crates/db/src/queries/sessions.rs
// Session repository: insert, list, update, delete, reconcile support.

use tracing::debug;

use pitchside_core::{format_hhmm, Session};

use super::row_types::SessionRow;
use crate::{Database, DbResult};

const SESSION_COLUMNS: &str = "id, academy_id, name, category, date, start_time, end_time, \
     coaches, players, attendance, player_metrics, status, is_recurring, \
     selected_days, recurring_end_date, parent_session_id, created_at, updated_at";

impl Database {
    /// Insert one session document (template or occurrence).
    pub async fn insert_session(&self, session: &Session) -> DbResult<()> {
        let mut tx = self.pool().begin().await?;
        insert_session_tx(&mut tx, session).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Insert a batch of occurrences atomically. Returns how many rows
    /// were written.
    pub async fn insert_occurrences(&self, occurrences: &[Session]) -> DbResult<u64> {
        if occurrences.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool().begin().await?;
        for occurrence in occurrences {
            insert_session_tx(&mut tx, occurrence).await?;
        }
        tx.commit().await?;
        Ok(occurrences.len() as u64)
    }

    /// Fetch one session by id.
    pub async fn get_session(&self, id: &str) -> DbResult<Option<Session>> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(SessionRow::into_session).transpose()
    }

    /// One page of an academy's sessions (templates included), ordered
    /// by calendar slot so paging is stable.
    pub async fn list_academy_sessions(
        &self,
        academy_id: &str,
        limit: u32,
        offset: u32,
    ) -> DbResult<Vec<Session>> {
        let rows: Vec<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE academy_id = ?1
             ORDER BY date ASC, start_time ASC, end_time ASC, id ASC
             LIMIT ?2 OFFSET ?3"
        ))
        .bind(academy_id)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(SessionRow::into_session).collect()
    }

    /// Total sessions stored for an academy.
    pub async fn count_academy_sessions(&self, academy_id: &str) -> DbResult<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE academy_id = ?1")
            .bind(academy_id)
            .fetch_one(self.pool())
            .await?;
        Ok(row.0 as u64)
    }

    /// Every persisted occurrence (non-template) for an academy — the
    /// reconciliation input set.
    pub async fn list_academy_occurrences(&self, academy_id: &str) -> DbResult<Vec<Session>> {
        let rows: Vec<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE academy_id = ?1 AND is_recurring = 0
             ORDER BY date ASC, start_time ASC"
        ))
        .bind(academy_id)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(SessionRow::into_session).collect()
    }

    /// Overwrite a session document. `created_at` and `id` never change.
    /// Returns false when no row matched.
    pub async fn update_session(&self, session: &Session) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                academy_id = ?2,
                name = ?3,
                category = ?4,
                date = ?5,
                start_time = ?6,
                end_time = ?7,
                coaches = ?8,
                players = ?9,
                attendance = ?10,
                player_metrics = ?11,
                status = ?12,
                is_recurring = ?13,
                selected_days = ?14,
                recurring_end_date = ?15,
                parent_session_id = ?16,
                updated_at = ?17
            WHERE id = ?1
            "#,
        )
        .bind(&session.id)
        .bind(&session.academy_id)
        .bind(&session.name)
        .bind(&session.category)
        .bind(session.date.to_string())
        .bind(format_hhmm(session.start_time))
        .bind(format_hhmm(session.end_time))
        .bind(json_or(&session.coaches, "[]"))
        .bind(json_or(&session.players, "[]"))
        .bind(json_or(&session.attendance, "{}"))
        .bind(json_or(&session.player_metrics, "{}"))
        .bind(session.status.as_str())
        .bind(session.is_recurring)
        .bind(json_or(&session.selected_days, "[]"))
        .bind(session.recurring_end_date.map(|d| d.to_string()))
        .bind(&session.parent_session_id)
        .bind(session.updated_at)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete sessions by id within one academy. A deleted template takes
    /// its generated occurrences with it. Returns the number of directly
    /// matched rows (cascaded occurrences are not counted).
    pub async fn delete_sessions(&self, ids: &[String], academy_id: &str) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool().begin().await?;
        let mut deleted = 0u64;
        let mut cascaded = 0u64;
        for id in ids {
            let children = sqlx::query(
                "DELETE FROM sessions WHERE parent_session_id = ?1 AND academy_id = ?2",
            )
            .bind(id)
            .bind(academy_id)
            .execute(&mut *tx)
            .await?;
            cascaded += children.rows_affected();

            let direct = sqlx::query("DELETE FROM sessions WHERE id = ?1 AND academy_id = ?2")
                .bind(id)
                .bind(academy_id)
                .execute(&mut *tx)
                .await?;
            deleted += direct.rows_affected();
        }
        tx.commit().await?;

        if cascaded > 0 {
            debug!(academy_id, deleted, cascaded, "cascade-deleted occurrences");
        }
        Ok(deleted)
    }

    /// Delete exactly the given occurrence rows (reconciliation losers).
    pub async fn delete_sessions_by_id(&self, ids: &[String]) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool().begin().await?;
        let mut deleted = 0u64;
        for id in ids {
            let result = sqlx::query("DELETE FROM sessions WHERE id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            deleted += result.rows_affected();
        }
        tx.commit().await?;
        Ok(deleted)
    }
}

async fn insert_session_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    session: &Session,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sessions (
            id, academy_id, name, category, date, start_time, end_time,
            coaches, players, attendance, player_metrics, status,
            is_recurring, selected_days, recurring_end_date,
            parent_session_id, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7,
            ?8, ?9, ?10, ?11, ?12,
            ?13, ?14, ?15,
            ?16, ?17, ?18
        )
        "#,
    )
    .bind(&session.id)
    .bind(&session.academy_id)
    .bind(&session.name)
    .bind(&session.category)
    .bind(session.date.to_string())
    .bind(format_hhmm(session.start_time))
    .bind(format_hhmm(session.end_time))
    .bind(json_or(&session.coaches, "[]"))
    .bind(json_or(&session.players, "[]"))
    .bind(json_or(&session.attendance, "{}"))
    .bind(json_or(&session.player_metrics, "{}"))
    .bind(session.status.as_str())
    .bind(session.is_recurring)
    .bind(json_or(&session.selected_days, "[]"))
    .bind(session.recurring_end_date.map(|d| d.to_string()))
    .bind(&session.parent_session_id)
    .bind(session.created_at)
    .bind(session.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

fn json_or<T: serde::Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| fallback.to_string())
}
