//! Story ownership storage trait.
//!
//! Records which local user authored each remote story.

use async_trait::async_trait;

use super::error::StorageResult;

/// Storage interface for author ownership records.
///
/// Each story has at most one owner.
#[async_trait]
pub trait OwnershipStore: Send + Sync {
    /// Record `user_id` as the owner of `story_id`, replacing any previous owner.
    async fn record_owner(&self, story_id: &str, user_id: &str) -> StorageResult<()>;

    /// Owner of a story, if one was recorded.
    async fn owner(&self, story_id: &str) -> StorageResult<Option<String>>;

    /// Forget the owner of a story. Succeeds when nothing is recorded.
    async fn release(&self, story_id: &str) -> StorageResult<()>;

    /// Stories owned by a user.
    async fn stories_for(&self, user_id: &str) -> StorageResult<Vec<String>>;
}
