// crates/db/src/queries/players.rs
// Player performance records: fetch plus the append-only history write.

use tracing::debug;

use pitchside_core::{now_ts, PerformanceEntry, PlayerPerformanceRecord};

use super::row_types::PlayerRow;
use crate::{Database, DbResult};

impl Database {
    /// Fetch one player's performance record.
    pub async fn get_player(&self, player_id: &str) -> DbResult<Option<PlayerPerformanceRecord>> {
        let row: Option<PlayerRow> = sqlx::query_as(
            "SELECT id, attributes, performance_history, created_at, updated_at
             FROM players WHERE id = ?1",
        )
        .bind(player_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(PlayerRow::into_record))
    }

    /// Insert a fresh player record.
    pub async fn insert_player(&self, record: &PlayerPerformanceRecord) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO players (id, attributes, performance_history, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&record.player_id)
        .bind(json_or(&record.attributes, "{}"))
        .bind(json_or(&record.performance_history, "[]"))
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Append one entry to a player's performance history, creating the
    /// record on first touch. History is append-only: existing entries
    /// are never rewritten, the new entry always lands at the end.
    pub async fn append_performance_entry(
        &self,
        player_id: &str,
        entry: &PerformanceEntry,
    ) -> DbResult<()> {
        let mut record = match self.get_player(player_id).await? {
            Some(existing) => existing,
            None => {
                debug!(player_id, "creating player record on first metrics write");
                let fresh = PlayerPerformanceRecord::new(player_id);
                self.insert_player(&fresh).await?;
                fresh
            }
        };

        record.performance_history.push(entry.clone());

        sqlx::query("UPDATE players SET performance_history = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(player_id)
            .bind(json_or(&record.performance_history, "[]"))
            .bind(now_ts())
            .execute(self.pool())
            .await?;

        Ok(())
    }
}

fn json_or<T: serde::Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| fallback.to_string())
}
