//! Session progress storage traits.
//!
//! Defines where a browser session currently stands in each story, and the
//! player name chosen for that session.

use async_trait::async_trait;

use super::error::StorageResult;

/// Storage interface for per-(session, story) progress.
///
/// Holds at most one node id per (session token, story id). Writes from the
/// same session are effectively serial, so last write wins.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Create or replace the current node for the key.
    async fn upsert(&self, session_token: &str, story_id: &str, node_id: &str)
    -> StorageResult<()>;

    /// Remove the row for the key. Succeeds when nothing is stored.
    async fn clear(&self, session_token: &str, story_id: &str) -> StorageResult<()>;

    /// Node the session last visited in the story, if any.
    async fn resume(&self, session_token: &str, story_id: &str) -> StorageResult<Option<String>>;
}

/// Storage interface for the player name attached to a browser session.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Remember the (already normalized) player name for the session.
    async fn set_player_name(&self, session_token: &str, name: &str) -> StorageResult<()>;

    /// Player name chosen for the session, if any.
    async fn player_name(&self, session_token: &str) -> StorageResult<Option<String>>;
}
