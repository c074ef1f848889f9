//! SQLite implementation of OutcomeLog.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Row, params};

use super::SqliteStore;
use crate::store::error::StorageResult;
use crate::store::outcome::{OutcomeLog, PlayOutcome};

fn outcome_from_row(row: &Row<'_>) -> rusqlite::Result<PlayOutcome> {
    Ok(PlayOutcome {
        id: row.get(0)?,
        user_id: row.get(1)?,
        story_id: row.get(2)?,
        ending_node_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[async_trait]
impl OutcomeLog for SqliteStore {
    async fn record(
        &self,
        user_id: Option<&str>,
        story_id: &str,
        ending_node_id: &str,
    ) -> StorageResult<PlayOutcome> {
        let created_at = Utc::now();
        let id = self.with_conn("record outcome", |conn| {
            conn.execute(
                "INSERT INTO play_outcomes (user_id, story_id, ending_node_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, story_id, ending_node_id, created_at],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        Ok(PlayOutcome {
            id,
            user_id: user_id.map(str::to_string),
            story_id: story_id.to_string(),
            ending_node_id: ending_node_id.to_string(),
            created_at,
        })
    }

    async fn list_all(&self) -> StorageResult<Vec<PlayOutcome>> {
        self.with_conn("list outcomes", |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, story_id, ending_node_id, created_at
                 FROM play_outcomes ORDER BY id ASC",
            )?;
            let rows = stmt.query_map([], outcome_from_row)?;
            rows.collect()
        })
    }

    async fn list_for_user(&self, user_id: &str, limit: usize) -> StorageResult<Vec<PlayOutcome>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn("list user outcomes", |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, story_id, ending_node_id, created_at
                 FROM play_outcomes WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![user_id, limit], outcome_from_row)?;
            rows.collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_assigns_increasing_ids() {
        let store = SqliteStore::in_memory().unwrap();

        let first = store.record(Some("u1"), "s1", "end-a").await.unwrap();
        let second = store.record(None, "s1", "end-b").await.unwrap();

        assert!(second.id > first.id);
        assert_eq!(first.user_id.as_deref(), Some("u1"));
        assert_eq!(second.user_id, None);
    }

    #[tokio::test]
    async fn list_all_is_oldest_first() {
        let store = SqliteStore::in_memory().unwrap();
        store.record(None, "s1", "end-a").await.unwrap();
        store.record(Some("u1"), "s2", "end-b").await.unwrap();

        let all = store.list_all().await.unwrap();
        let endings: Vec<_> = all.iter().map(|o| o.ending_node_id.as_str()).collect();
        assert_eq!(endings, vec!["end-a", "end-b"]);
        assert_eq!(all[1].story_id, "s2");
    }

    #[tokio::test]
    async fn list_for_user_is_newest_first_and_limited() {
        let store = SqliteStore::in_memory().unwrap();
        store.record(Some("u1"), "s1", "e1").await.unwrap();
        store.record(Some("u2"), "s1", "e2").await.unwrap();
        store.record(Some("u1"), "s1", "e3").await.unwrap();
        store.record(Some("u1"), "s2", "e4").await.unwrap();

        let recent = store.list_for_user("u1", 2).await.unwrap();
        let endings: Vec<_> = recent.iter().map(|o| o.ending_node_id.as_str()).collect();
        assert_eq!(endings, vec!["e4", "e3"]);
    }

    #[tokio::test]
    async fn recorded_timestamp_round_trips() {
        let store = SqliteStore::in_memory().unwrap();
        let recorded = store.record(None, "s1", "end").await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all, vec![recorded]);
    }
}
