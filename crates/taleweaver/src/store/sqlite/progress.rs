//! SQLite implementation of ProgressStore and ProfileStore.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use super::SqliteStore;
use crate::store::error::StorageResult;
use crate::store::progress::{ProfileStore, ProgressStore};

#[async_trait]
impl ProgressStore for SqliteStore {
    async fn upsert(
        &self,
        session_token: &str,
        story_id: &str,
        node_id: &str,
    ) -> StorageResult<()> {
        self.with_conn("upsert progress", |conn| {
            conn.execute(
                "INSERT INTO session_progress (session_token, story_id, node_id, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (session_token, story_id)
                 DO UPDATE SET node_id = excluded.node_id, updated_at = excluded.updated_at",
                params![session_token, story_id, node_id, Utc::now()],
            )
            .map(|_| ())
        })
    }

    async fn clear(&self, session_token: &str, story_id: &str) -> StorageResult<()> {
        self.with_conn("clear progress", |conn| {
            conn.execute(
                "DELETE FROM session_progress WHERE session_token = ?1 AND story_id = ?2",
                params![session_token, story_id],
            )
            .map(|_| ())
        })
    }

    async fn resume(&self, session_token: &str, story_id: &str) -> StorageResult<Option<String>> {
        self.with_conn("load progress", |conn| {
            conn.query_row(
                "SELECT node_id FROM session_progress
                 WHERE session_token = ?1 AND story_id = ?2",
                params![session_token, story_id],
                |row| row.get(0),
            )
            .optional()
        })
    }
}

#[async_trait]
impl ProfileStore for SqliteStore {
    async fn set_player_name(&self, session_token: &str, name: &str) -> StorageResult<()> {
        self.with_conn("save player name", |conn| {
            conn.execute(
                "INSERT INTO play_sessions (session_token, player_name, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (session_token)
                 DO UPDATE SET player_name = excluded.player_name, updated_at = excluded.updated_at",
                params![session_token, name, Utc::now()],
            )
            .map(|_| ())
        })
    }

    async fn player_name(&self, session_token: &str) -> StorageResult<Option<String>> {
        self.with_conn("load player name", |conn| {
            conn.query_row(
                "SELECT player_name FROM play_sessions WHERE session_token = ?1",
                params![session_token],
                |row| row.get(0),
            )
            .optional()
        })
    }
}
