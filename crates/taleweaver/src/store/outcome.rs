//! Play outcome log trait.
//!
//! Defines the interface for recording endings reached by players.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::StorageResult;

/// One ending reached by a player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayOutcome {
    pub id: i64,
    /// `None` for anonymous players.
    pub user_id: Option<String>,
    pub story_id: String,
    /// Declared id of the ending node, as served by the content API.
    pub ending_node_id: String,
    pub created_at: DateTime<Utc>,
}

/// Storage interface for play outcomes.
///
/// The log is append-only: rows are never updated or deleted by traversal.
#[async_trait]
pub trait OutcomeLog: Send + Sync {
    /// Append one outcome. Either the whole row is stored or nothing is.
    async fn record(
        &self,
        user_id: Option<&str>,
        story_id: &str,
        ending_node_id: &str,
    ) -> StorageResult<PlayOutcome>;

    /// Every outcome, oldest first. Used for aggregate statistics.
    async fn list_all(&self) -> StorageResult<Vec<PlayOutcome>>;

    /// Outcomes of one user, newest first.
    async fn list_for_user(&self, user_id: &str, limit: usize) -> StorageResult<Vec<PlayOutcome>>;
}
