// MysticMovies Mobile Core
// Copyright (C) 2025 MysticMovies contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Database query functions
//!
//! Free functions over a `SqlitePool`, one group per table.

use crate::api::runtime::RuntimeConfig;
use crate::error::Result;
use crate::storage::models::{
    PlaybackProgress, StoredRuntimeConfig, RESUME_MIN_POSITION_SECS, RESUME_TAIL_SECS,
};
use sqlx::SqlitePool;
use tracing::warn;

// ============================================================================
// RUNTIME CONFIG
// ============================================================================

/// Persist the bootstrap result, replacing the previous one
///
/// The handshake token is stripped; it is only valid for one launch.
pub async fn save_runtime_config(pool: &SqlitePool, config: &RuntimeConfig) -> Result<()> {
    let stored = StoredRuntimeConfig::from_config(config)?;
    sqlx::query(
        r#"
        INSERT INTO runtime_config (id, payload, updated_at) VALUES (1, ?, ?)
        ON CONFLICT(id) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at
        "#,
    )
    .bind(&stored.payload)
    .bind(stored.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Last persisted bootstrap result
///
/// A row that no longer deserializes is treated as absent.
pub async fn load_runtime_config(pool: &SqlitePool) -> Result<Option<RuntimeConfig>> {
    let row = sqlx::query_as::<_, StoredRuntimeConfig>(
        "SELECT payload, updated_at FROM runtime_config WHERE id = 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row.and_then(|stored| match stored.to_config() {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(error = %e, "Discarding unreadable runtime config");
            None
        }
    }))
}

// ============================================================================
// PLAYBACK PROGRESS
// ============================================================================

/// Upsert a resume position
pub async fn save_progress(pool: &SqlitePool, progress: &PlaybackProgress) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO playback_progress (item_id, title, position, duration, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(item_id) DO UPDATE SET
            title = excluded.title,
            position = excluded.position,
            duration = excluded.duration,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&progress.item_id)
    .bind(&progress.title)
    .bind(progress.position)
    .bind(progress.duration)
    .bind(progress.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn load_progress(pool: &SqlitePool, item_id: &str) -> Result<Option<PlaybackProgress>> {
    let progress = sqlx::query_as::<_, PlaybackProgress>(
        "SELECT item_id, title, position, duration, updated_at FROM playback_progress WHERE item_id = ?",
    )
    .bind(item_id)
    .fetch_optional(pool)
    .await?;

    Ok(progress)
}

/// Started, unfinished items, newest first
pub async fn list_continue_watching(pool: &SqlitePool, limit: u32) -> Result<Vec<PlaybackProgress>> {
    let rows = sqlx::query_as::<_, PlaybackProgress>(
        r#"
        SELECT item_id, title, position, duration, updated_at
        FROM playback_progress
        WHERE position > ? AND position < duration - ?
        ORDER BY updated_at DESC
        LIMIT ?
        "#,
    )
    .bind(RESUME_MIN_POSITION_SECS)
    .bind(RESUME_TAIL_SECS)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Forget one item, or everything when `item_id` is `None`
///
/// Returns the number of rows removed.
pub async fn clear_progress(pool: &SqlitePool, item_id: Option<&str>) -> Result<u64> {
    let result = match item_id {
        Some(id) => {
            sqlx::query("DELETE FROM playback_progress WHERE item_id = ?")
                .bind(id)
                .execute(pool)
                .await?
        }
        None => sqlx::query("DELETE FROM playback_progress").execute(pool).await?,
    };

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use chrono::{Duration, Utc};

    fn progress_at(id: &str, position: f64, duration: f64, minutes_ago: i64) -> PlaybackProgress {
        let mut p = PlaybackProgress::new(id, id.to_uppercase(), position, duration);
        p.updated_at = Utc::now() - Duration::minutes(minutes_ago);
        p
    }

    #[tokio::test]
    async fn test_runtime_config_roundtrip() {
        let db = Database::new_in_memory().await.unwrap();
        assert!(load_runtime_config(db.pool()).await.unwrap().is_none());

        let mut config = RuntimeConfig::new("https://b.example");
        config.handshake_token = "tok".to_string();
        config.telegram_bot_username = "mystic_bot".to_string();
        save_runtime_config(db.pool(), &config).await.unwrap();

        config.telegram_bot_username = "other_bot".to_string();
        save_runtime_config(db.pool(), &config).await.unwrap();

        let loaded = load_runtime_config(db.pool()).await.unwrap().unwrap();
        assert_eq!(loaded.telegram_bot_username, "other_bot");
        assert_eq!(loaded.api_base_url, "https://b.example");
        assert!(loaded.handshake_token.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_runtime_config_is_absent() {
        let db = Database::new_in_memory().await.unwrap();
        sqlx::query("INSERT INTO runtime_config (id, payload, updated_at) VALUES (1, 'nope', ?)")
            .bind(Utc::now())
            .execute(db.pool())
            .await
            .unwrap();

        assert!(load_runtime_config(db.pool()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_progress_upsert() {
        let db = Database::new_in_memory().await.unwrap();
        save_progress(db.pool(), &progress_at("dune", 100.0, 9000.0, 5)).await.unwrap();
        save_progress(db.pool(), &progress_at("dune", 250.0, 9000.0, 1)).await.unwrap();

        let loaded = load_progress(db.pool(), "dune").await.unwrap().unwrap();
        assert_eq!(loaded.position, 250.0);
        assert!(load_progress(db.pool(), "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_continue_watching_window_and_order() {
        let db = Database::new_in_memory().await.unwrap();
        for p in [
            progress_at("older", 300.0, 6000.0, 30),
            progress_at("newer", 60.0, 6000.0, 2),
            progress_at("barely", 10.0, 6000.0, 1),
            progress_at("finished", 5990.0, 6000.0, 0),
        ] {
            save_progress(db.pool(), &p).await.unwrap();
        }

        let list = list_continue_watching(db.pool(), 10).await.unwrap();
        let ids: Vec<&str> = list.iter().map(|p| p.item_id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "older"]);

        let limited = list_continue_watching(db.pool(), 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_progress() {
        let db = Database::new_in_memory().await.unwrap();
        save_progress(db.pool(), &progress_at("a", 100.0, 6000.0, 1)).await.unwrap();
        save_progress(db.pool(), &progress_at("b", 100.0, 6000.0, 1)).await.unwrap();

        assert_eq!(clear_progress(db.pool(), Some("a")).await.unwrap(), 1);
        assert_eq!(clear_progress(db.pool(), None).await.unwrap(), 1);
        assert!(list_continue_watching(db.pool(), 10).await.unwrap().is_empty());
    }
}
