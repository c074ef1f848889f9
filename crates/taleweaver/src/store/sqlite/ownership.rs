//! SQLite implementation of OwnershipStore.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use super::SqliteStore;
use crate::store::error::StorageResult;
use crate::store::ownership::OwnershipStore;

#[async_trait]
impl OwnershipStore for SqliteStore {
    async fn record_owner(&self, story_id: &str, user_id: &str) -> StorageResult<()> {
        self.with_conn("record owner", |conn| {
            conn.execute(
                "INSERT INTO story_ownership (story_id, user_id, created_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (story_id) DO UPDATE SET user_id = excluded.user_id",
                params![story_id, user_id, Utc::now()],
            )
            .map(|_| ())
        })
    }

    async fn owner(&self, story_id: &str) -> StorageResult<Option<String>> {
        self.with_conn("load owner", |conn| {
            conn.query_row(
                "SELECT user_id FROM story_ownership WHERE story_id = ?1",
                params![story_id],
                |row| row.get(0),
            )
            .optional()
        })
    }

    async fn release(&self, story_id: &str) -> StorageResult<()> {
        self.with_conn("release owner", |conn| {
            conn.execute(
                "DELETE FROM story_ownership WHERE story_id = ?1",
                params![story_id],
            )
            .map(|_| ())
        })
    }

    async fn stories_for(&self, user_id: &str) -> StorageResult<Vec<String>> {
        self.with_conn("list owned stories", |conn| {
            let mut stmt = conn.prepare(
                "SELECT story_id FROM story_ownership WHERE user_id = ?1 ORDER BY created_at, story_id",
            )?;
            let rows = stmt.query_map(params![user_id], |row| row.get(0))?;
            rows.collect()
        })
    }
}
