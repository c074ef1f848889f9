//! SQLite implementation of RatingStore.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::params;

use super::SqliteStore;
use crate::store::error::StorageResult;
use crate::store::rating::{RatingStore, StoryRating};

#[async_trait]
impl RatingStore for SqliteStore {
    async fn upsert(
        &self,
        user_id: &str,
        story_id: &str,
        score: u8,
        comment: Option<&str>,
    ) -> StorageResult<StoryRating> {
        let updated_at = Utc::now();
        self.with_conn("upsert rating", |conn| {
            conn.execute(
                "INSERT INTO story_ratings (user_id, story_id, score, comment, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (user_id, story_id) DO UPDATE SET
                   score = excluded.score,
                   comment = excluded.comment,
                   updated_at = excluded.updated_at",
                params![user_id, story_id, score, comment, updated_at],
            )
            .map(|_| ())
        })?;

        Ok(StoryRating {
            user_id: user_id.to_string(),
            story_id: story_id.to_string(),
            score,
            comment: comment.map(str::to_string),
            updated_at,
        })
    }

    async fn list_for_story(&self, story_id: &str) -> StorageResult<Vec<StoryRating>> {
        self.with_conn("list ratings", |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, story_id, score, comment, updated_at
                 FROM story_ratings WHERE story_id = ?1
                 ORDER BY updated_at DESC, id DESC",
            )?;
            let rows = stmt.query_map(params![story_id], |row| {
                Ok(StoryRating {
                    user_id: row.get(0)?,
                    story_id: row.get(1)?,
                    score: row.get(2)?,
                    comment: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })?;
            rows.collect()
        })
    }
}
