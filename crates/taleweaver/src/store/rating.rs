//! Story rating storage trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::StorageResult;

/// Lowest accepted score.
pub const MIN_SCORE: u8 = 1;
/// Highest accepted score.
pub const MAX_SCORE: u8 = 5;

/// A user's rating and optional comment for a story.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryRating {
    pub user_id: String,
    pub story_id: String,
    pub score: u8,
    pub comment: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Storage interface for ratings.
///
/// A user holds at most one rating per story; rating again replaces it.
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Create or replace the user's rating. `score` must already be validated.
    async fn upsert(
        &self,
        user_id: &str,
        story_id: &str,
        score: u8,
        comment: Option<&str>,
    ) -> StorageResult<StoryRating>;

    /// Ratings for a story, newest first.
    async fn list_for_story(&self, story_id: &str) -> StorageResult<Vec<StoryRating>>;
}
