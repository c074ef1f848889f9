//! Traversal controller.
//!
//! Each player request is one pass through
//! fetch → personalize → classify → commit → render. Nothing survives between
//! requests except the stores, so a reload or crash resumes from whatever
//! `session_progress` last recorded.
//!
//! Persistence failures are logged and swallowed: losing a statistics row is
//! acceptable, trapping a player on an error page is not.

use std::sync::Arc;

use serde::Serialize;
use taleweaver_content::Node;
use tracing::{debug, warn};

use super::notice::Notice;
use super::personalize::{normalize_player_name, personalize_node};
use super::resolve::{ResolveError, RollOutcome, resolve_choice};
use super::roll::{DiceRoller, ThreadDice};
use crate::config::PlayerConfig;
use crate::content::{ContentError, ContentSource};
use crate::store::{OutcomeLog, ProfileStore, ProgressStore, RatingStore, StoryRating};

// ============================================================================
// Outcomes
// ============================================================================

/// Where a player is sent when the requested content cannot be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Story or node does not exist.
    StoryList,
    /// Remote content service could not be reached.
    Unavailable,
}

impl Fallback {
    fn from_error(error: &ContentError) -> Self {
        if error.is_unavailable() {
            Self::Unavailable
        } else {
            Self::StoryList
        }
    }
}

/// Result of a navigation step that ends in a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Node {
        node_id: String,
        notice: Option<Notice>,
    },
    Fallback(Fallback),
}

/// Result of rendering a node.
#[derive(Debug, Clone)]
pub enum ViewOutcome {
    Render(Box<NodeView>),
    Fallback(Fallback),
}

/// Result of submitting a choice.
#[derive(Debug, Clone)]
pub enum AdvanceOutcome {
    Moved {
        node_id: String,
        roll: Option<RollOutcome>,
        notice: Option<Notice>,
    },
    /// The choice could not be resolved; the current node is shown again.
    Rejected {
        error: ResolveError,
        view: Box<NodeView>,
    },
    Fallback(Fallback),
}

/// Ratings shown beneath an ending.
#[derive(Debug, Clone, Serialize)]
pub struct RatingSummary {
    pub count: usize,
    /// Mean score rounded to one decimal, absent without ratings.
    pub average: Option<f64>,
    pub ratings: Vec<StoryRating>,
}

impl RatingSummary {
    pub fn from_ratings(ratings: Vec<StoryRating>) -> Self {
        let count = ratings.len();
        let average = (count > 0).then(|| {
            let total: f64 = ratings.iter().map(|r| f64::from(r.score)).sum();
            (total / count as f64 * 10.0).round() / 10.0
        });
        Self {
            count,
            average,
            ratings,
        }
    }
}

/// Everything needed to display one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub story_id: String,
    pub node: Node,
    pub player_name: String,
    pub is_terminal: bool,
    /// Only looked up for terminal nodes, where it decides whether the play
    /// is counted. Always `false` elsewhere.
    pub is_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings: Option<RatingSummary>,
}

// ============================================================================
// Controller
// ============================================================================

/// Stores the controller reads and writes.
#[derive(Clone)]
pub struct TraversalStores {
    pub progress: Arc<dyn ProgressStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub outcomes: Arc<dyn OutcomeLog>,
    pub ratings: Arc<dyn RatingStore>,
}

impl TraversalStores {
    /// Use one backend for every store.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: ProgressStore + ProfileStore + OutcomeLog + RatingStore + 'static,
    {
        Self {
            progress: store.clone(),
            profiles: store.clone(),
            outcomes: store.clone(),
            ratings: store,
        }
    }
}

/// Drives players through stories.
#[derive(Clone)]
pub struct Traversal {
    content: Arc<dyn ContentSource>,
    stores: TraversalStores,
    dice: Arc<dyn DiceRoller>,
    player: PlayerConfig,
}

impl Traversal {
    pub fn new(
        content: Arc<dyn ContentSource>,
        stores: TraversalStores,
        player: PlayerConfig,
    ) -> Self {
        Self {
            content,
            stores,
            dice: Arc::new(ThreadDice),
            player,
        }
    }

    /// Replace the dice used for rolling choices.
    pub fn with_dice(mut self, dice: Arc<dyn DiceRoller>) -> Self {
        self.dice = dice;
        self
    }

    /// Start a story from its entry node, discarding saved progress.
    ///
    /// A supplied `player_name` is normalized and remembered for the session.
    pub async fn begin(
        &self,
        session_token: &str,
        story_id: &str,
        player_name: Option<&str>,
    ) -> Navigation {
        if let Some(raw) = player_name {
            let name = normalize_player_name(Some(raw), &self.player.default_name);
            if let Err(e) = self.stores.profiles.set_player_name(session_token, &name).await {
                warn!(story_id, error = %e, "Failed to save player name");
            }
        }

        if let Err(e) = self.stores.progress.clear(session_token, story_id).await {
            warn!(story_id, error = %e, "Failed to clear progress before start");
        }

        match self.content.story_start(story_id).await {
            Ok(Some(node)) if !node.id.is_empty() => {
                debug!(story_id, node_id = %node.id, "Starting story");
                Navigation::Node {
                    node_id: node.id,
                    notice: None,
                }
            }
            Ok(_) => {
                debug!(story_id, "Story has no start node");
                Navigation::Fallback(Fallback::StoryList)
            }
            Err(e) => {
                warn!(story_id, error = %e, "Failed to fetch story start");
                Navigation::Fallback(Fallback::from_error(&e))
            }
        }
    }

    /// Continue from saved progress, or start fresh when there is none.
    pub async fn resume_or_begin(&self, session_token: &str, story_id: &str) -> Navigation {
        match self.stores.progress.resume(session_token, story_id).await {
            Ok(Some(node_id)) => {
                return Navigation::Node {
                    node_id,
                    notice: None,
                };
            }
            Ok(None) => {}
            Err(e) => warn!(story_id, error = %e, "Failed to load progress"),
        }
        self.begin(session_token, story_id, None).await
    }

    /// Show a node and commit where the player now stands.
    ///
    /// Terminal nodes append one play outcome (unless the story is an author
    /// preview) and clear progress. Other nodes save progress.
    pub async fn view(
        &self,
        session_token: &str,
        user_id: Option<&str>,
        story_id: &str,
        node_id: &str,
        notice: Option<Notice>,
    ) -> ViewOutcome {
        let node = match self.fetch_node(story_id, node_id).await {
            Ok(node) => node,
            Err(fallback) => return ViewOutcome::Fallback(fallback),
        };
        let player_name = self.player_name(session_token).await;
        let is_terminal = node.is_terminal();

        let mut is_preview = false;
        let mut ratings = None;
        if is_terminal {
            is_preview = self.is_preview(story_id).await;
            self.commit_terminal(session_token, user_id, story_id, &node.id, is_preview)
                .await;
            ratings = self.load_ratings(story_id).await;
        } else if let Err(e) = self
            .stores
            .progress
            .upsert(session_token, story_id, &node.id)
            .await
        {
            warn!(story_id, node_id = %node.id, error = %e, "Failed to save progress");
        }

        ViewOutcome::Render(Box::new(NodeView {
            story_id: story_id.to_string(),
            node: personalize_node(node, &player_name, &self.player.speaker_aliases),
            player_name,
            is_terminal,
            is_preview,
            notice,
            ratings,
        }))
    }

    /// Resolve a submitted choice on the current node.
    ///
    /// Never writes to a store; the redirect target's [`Traversal::view`]
    /// does the committing.
    pub async fn advance(
        &self,
        session_token: &str,
        story_id: &str,
        node_id: &str,
        choice_id: &str,
    ) -> AdvanceOutcome {
        let node = match self.fetch_node(story_id, node_id).await {
            Ok(node) => node,
            Err(fallback) => return AdvanceOutcome::Fallback(fallback),
        };

        match resolve_choice(&node.id, &node.choices, choice_id, self.dice.as_ref()) {
            Ok(resolution) => {
                debug!(
                    story_id,
                    from = %node.id,
                    to = %resolution.next_node_id,
                    "Resolved choice"
                );
                AdvanceOutcome::Moved {
                    node_id: resolution.next_node_id,
                    roll: resolution.roll,
                    notice: resolution.notice,
                }
            }
            Err(error) => {
                debug!(story_id, node_id = %node.id, error = %error, "Rejected choice");
                let player_name = self.player_name(session_token).await;
                let notice = Notice::warning(rejection_message(&error));
                AdvanceOutcome::Rejected {
                    error,
                    view: Box::new(self.render_readonly(story_id, node, player_name, Some(notice))),
                }
            }
        }
    }

    /// Render a node without touching any store.
    pub async fn inspect(
        &self,
        story_id: &str,
        node_id: &str,
        player_name: &str,
        notice: Option<Notice>,
    ) -> ViewOutcome {
        match self.fetch_node(story_id, node_id).await {
            Ok(node) => ViewOutcome::Render(Box::new(self.render_readonly(
                story_id,
                node,
                player_name.to_string(),
                notice,
            ))),
            Err(fallback) => ViewOutcome::Fallback(fallback),
        }
    }

    /// Player name for the session, or the configured default.
    pub async fn player_name(&self, session_token: &str) -> String {
        match self.stores.profiles.player_name(session_token).await {
            Ok(Some(name)) => name,
            Ok(None) => self.player.default_name.clone(),
            Err(e) => {
                warn!(error = %e, "Failed to load player name");
                self.player.default_name.clone()
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn fetch_node(&self, story_id: &str, node_id: &str) -> Result<Node, Fallback> {
        match self.content.node(story_id, node_id).await {
            Ok(Some(mut node)) => {
                if node.id.is_empty() {
                    node.id = node_id.to_string();
                }
                Ok(node)
            }
            Ok(None) => {
                debug!(story_id, node_id, "Node not found");
                Err(Fallback::StoryList)
            }
            Err(e) => {
                warn!(story_id, node_id, error = %e, "Failed to fetch node");
                Err(Fallback::from_error(&e))
            }
        }
    }

    async fn is_preview(&self, story_id: &str) -> bool {
        match self.content.story_detail(story_id).await {
            Ok(Some(story)) => story.is_preview(),
            Ok(None) => false,
            Err(e) => {
                warn!(story_id, error = %e, "Failed to fetch story status; counting play");
                false
            }
        }
    }

    async fn commit_terminal(
        &self,
        session_token: &str,
        user_id: Option<&str>,
        story_id: &str,
        ending_node_id: &str,
        is_preview: bool,
    ) {
        if is_preview {
            debug!(story_id, ending_node_id, "Preview play; outcome not recorded");
        } else if let Err(e) = self
            .stores
            .outcomes
            .record(user_id, story_id, ending_node_id)
            .await
        {
            warn!(story_id, ending_node_id, error = %e, "Failed to record play outcome");
        }

        if let Err(e) = self.stores.progress.clear(session_token, story_id).await {
            warn!(story_id, error = %e, "Failed to clear progress at ending");
        }
    }

    async fn load_ratings(&self, story_id: &str) -> Option<RatingSummary> {
        match self.stores.ratings.list_for_story(story_id).await {
            Ok(ratings) => Some(RatingSummary::from_ratings(ratings)),
            Err(e) => {
                warn!(story_id, error = %e, "Failed to load ratings");
                None
            }
        }
    }

    fn render_readonly(
        &self,
        story_id: &str,
        node: Node,
        player_name: String,
        notice: Option<Notice>,
    ) -> NodeView {
        let is_terminal = node.is_terminal();
        NodeView {
            story_id: story_id.to_string(),
            node: personalize_node(node, &player_name, &self.player.speaker_aliases),
            player_name,
            is_terminal,
            is_preview: false,
            notice,
            ratings: None,
        }
    }
}

fn rejection_message(error: &ResolveError) -> &'static str {
    match error {
        ResolveError::ChoiceNotFound(_) => "That choice is not available here. Please pick another.",
        ResolveError::NoDestination(_) => "That path leads nowhere yet. Please pick another.",
    }
}
