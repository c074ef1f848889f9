//! Remote content service access.
//!
//! [`ContentSource`] is the seam between the local application and the
//! remote story API. Production code uses [`HttpContentClient`];
//! [`MemoryContent`] serves stories from process memory.

mod client;
mod error;
mod memory;

pub use client::HttpContentClient;
pub use error::{ContentError, ContentResult};
pub use memory::MemoryContent;

use async_trait::async_trait;
use taleweaver_content::{
    Choice, ChoiceDraft, Node, NodeDraft, StoryDetail, StoryDraft, StorySummary,
};

/// Read and author access to remote story content.
///
/// Lookups distinguish "absent" (`Ok(None)`) from "service unavailable"
/// (`Err` with [`ContentError::is_unavailable`]). Authoring operations default
/// to [`ContentError::ReadOnly`] so read-only sources need not implement them.
#[async_trait]
pub trait ContentSource: Send + Sync {
    // ========================================================================
    // Reads
    // ========================================================================

    /// List stories, optionally filtered by status.
    ///
    /// An empty list means "no stories"; an error means the service could not
    /// be reached.
    async fn list_stories(&self, status: Option<&str>) -> ContentResult<Vec<StorySummary>>;

    /// Fetch the entry node of a story.
    async fn story_start(&self, story_id: &str) -> ContentResult<Option<Node>>;

    /// Fetch one node of a story.
    async fn node(&self, story_id: &str, node_id: &str) -> ContentResult<Option<Node>>;

    /// Fetch a story with all nodes and choices.
    async fn story_detail(&self, story_id: &str) -> ContentResult<Option<StoryDetail>>;

    /// Fetch the flat node list of a story.
    async fn story_nodes(&self, story_id: &str) -> ContentResult<Vec<Node>>;

    /// Fetch a story for whole-graph analysis.
    ///
    /// Some deployments of the content service answer the detail endpoint
    /// without nested pages; the node list endpoint fills them in then.
    async fn story_with_pages(&self, story_id: &str) -> ContentResult<Option<StoryDetail>> {
        let Some(mut story) = self.story_detail(story_id).await? else {
            return Ok(None);
        };
        if story.pages.is_empty() {
            story.pages = self.story_nodes(story_id).await?;
        }
        Ok(Some(story))
    }

    // ========================================================================
    // Authoring
    // ========================================================================

    async fn create_story(&self, _draft: &StoryDraft) -> ContentResult<StoryDetail> {
        Err(ContentError::ReadOnly)
    }

    async fn update_story(&self, _story_id: &str, _draft: &StoryDraft) -> ContentResult<StoryDetail> {
        Err(ContentError::ReadOnly)
    }

    async fn delete_story(&self, _story_id: &str) -> ContentResult<()> {
        Err(ContentError::ReadOnly)
    }

    async fn create_node(&self, _story_id: &str, _draft: &NodeDraft) -> ContentResult<Node> {
        Err(ContentError::ReadOnly)
    }

    async fn update_node(&self, _node_id: &str, _draft: &NodeDraft) -> ContentResult<Node> {
        Err(ContentError::ReadOnly)
    }

    async fn delete_node(&self, _node_id: &str) -> ContentResult<()> {
        Err(ContentError::ReadOnly)
    }

    async fn create_choice(&self, _node_id: &str, _draft: &ChoiceDraft) -> ContentResult<Choice> {
        Err(ContentError::ReadOnly)
    }

    async fn update_choice(&self, _choice_id: &str, _draft: &ChoiceDraft) -> ContentResult<Choice> {
        Err(ContentError::ReadOnly)
    }

    async fn delete_choice(&self, _choice_id: &str) -> ContentResult<()> {
        Err(ContentError::ReadOnly)
    }
}
