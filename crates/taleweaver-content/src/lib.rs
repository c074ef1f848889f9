//! Wire types for the remote story content API.
//!
//! The content service owns stories, nodes (also called pages) and choices.
//! Taleweaver only reads them during play and forwards author edits, so these
//! types mirror the JSON the service emits rather than any local schema.
//!
//! Several fields have been renamed across versions of the remote schema.
//! The types accept every historical spelling:
//!
//! - story start: `start_node_id` or `start_page_id`
//! - story nodes: `pages` or `nodes`
//! - node body: `text`, `body` or `content`
//! - choice target: `next_page_id`, then `target_node`, then `target`
//! - terminal flag: `type == "ending"`, `game_over` or `is_ending`
//!
//! # Example
//!
//! ```
//! use taleweaver_content::Node;
//!
//! let node: Node = serde_json::from_str(
//!     r#"{"id": 3, "text": "The end.", "is_ending": true, "choices": []}"#,
//! ).unwrap();
//! assert_eq!(node.id, "3");
//! assert!(node.is_terminal());
//! ```

pub mod de;

use serde::{Deserialize, Serialize};

/// Story statuses under which plays are treated as author previews.
pub const PREVIEW_STATUSES: &[&str] = &["draft", "preview"];

// ============================================================================
// Stories
// ============================================================================

/// Entry of the story listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySummary {
    #[serde(default, deserialize_with = "de::id")]
    pub id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Full story with its nested node list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryDetail {
    #[serde(default, deserialize_with = "de::id")]
    pub id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "start_page_id", deserialize_with = "de::opt_id")]
    pub start_node_id: Option<String>,
    #[serde(default, alias = "nodes", deserialize_with = "de::null_default")]
    pub pages: Vec<Node>,
}

impl StoryDetail {
    /// Whether plays of this story are author previews and must not be counted.
    pub fn is_preview(&self) -> bool {
        is_preview_status(self.status.as_deref())
    }
}

/// Whether a story status marks an unpublished preview.
pub fn is_preview_status(status: Option<&str>) -> bool {
    status.is_some_and(|s| {
        PREVIEW_STATUSES
            .iter()
            .any(|p| s.trim().eq_ignore_ascii_case(p))
    })
}

// ============================================================================
// Nodes
// ============================================================================

/// A single story node (page).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, deserialize_with = "de::id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "body", alias = "content")]
    pub text: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub game_over: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_ending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ending_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome_text: Option<String>,
    #[serde(default, alias = "illustration", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(
        default,
        deserialize_with = "de::null_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub dialogue: Vec<DialogueLine>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub choices: Vec<Choice>,
}

impl Node {
    /// Whether reaching this node ends the play-through.
    ///
    /// Three content conventions coexist on the remote service and any one of
    /// them marks an ending.
    pub fn is_terminal(&self) -> bool {
        self.node_type.as_deref() == Some("ending") || self.game_over || self.is_ending
    }
}

/// One spoken line inside a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueLine {
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

// ============================================================================
// Choices
// ============================================================================

/// An outgoing edge of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default, deserialize_with = "de::opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    #[serde(default, deserialize_with = "de::opt_id", skip_serializing_if = "Option::is_none")]
    pub next_page_id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_id", skip_serializing_if = "Option::is_none")]
    pub target_node: Option<String>,
    #[serde(default, deserialize_with = "de::opt_id", skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub requires_roll: bool,
    #[serde(default, deserialize_with = "de::lenient_int", skip_serializing_if = "Option::is_none")]
    pub roll_sides: Option<i64>,
    #[serde(default, deserialize_with = "de::lenient_int", skip_serializing_if = "Option::is_none")]
    pub roll_required: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_id", skip_serializing_if = "Option::is_none")]
    pub on_fail_target: Option<String>,
}

impl Choice {
    /// Destination node id, honoring the historical field priority.
    pub fn destination(&self) -> Option<&str> {
        [&self.next_page_id, &self.target_node, &self.target]
            .into_iter()
            .filter_map(|field| field.as_deref().map(str::trim))
            .find(|id| !id.is_empty())
    }

    /// Node to fall back to when a roll fails, if one is set.
    pub fn fail_destination(&self) -> Option<&str> {
        self.on_fail_target
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Text shown to the player, falling back to the short label.
    pub fn display_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or(self.label.as_deref().filter(|l| !l.trim().is_empty()))
    }
}

// ============================================================================
// Author Payloads
// ============================================================================

/// Body for creating or updating a story.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_page_id: Option<String>,
}

/// Body for creating or updating a node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub is_ending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ending_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Body for creating or updating a choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChoiceDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_id: Option<String>,
    #[serde(default)]
    pub requires_roll: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_sides: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_required: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_fail_target: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_flag_accepts_any_convention() {
        let by_type: Node = serde_json::from_str(r#"{"id": "a", "type": "ending"}"#).unwrap();
        let by_game_over: Node = serde_json::from_str(r#"{"id": "b", "game_over": 1}"#).unwrap();
        let by_is_ending: Node = serde_json::from_str(r#"{"id": "c", "is_ending": true}"#).unwrap();
        let plain: Node = serde_json::from_str(r#"{"id": "d", "type": "scene"}"#).unwrap();

        assert!(by_type.is_terminal());
        assert!(by_game_over.is_terminal());
        assert!(by_is_ending.is_terminal());
        assert!(!plain.is_terminal());
    }

    #[test]
    fn destination_follows_field_priority() {
        let all: Choice = serde_json::from_str(
            r#"{"id": 1, "next_page_id": 7, "target_node": "b", "target": "c"}"#,
        )
        .unwrap();
        assert_eq!(all.destination(), Some("7"));

        let mid: Choice =
            serde_json::from_str(r#"{"id": 1, "next_page_id": "", "target_node": "b", "target": "c"}"#)
                .unwrap();
        assert_eq!(mid.destination(), Some("b"));

        let last: Choice = serde_json::from_str(r#"{"id": 1, "target": "c"}"#).unwrap();
        assert_eq!(last.destination(), Some("c"));

        let none: Choice = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(none.destination(), None);
    }

    #[test]
    fn story_detail_accepts_legacy_names() {
        let story: StoryDetail = serde_json::from_str(
            r#"{"id": 5, "title": "T", "start_page_id": 10, "nodes": [{"id": 10}], "status": "Draft"}"#,
        )
        .unwrap();
        assert_eq!(story.id, "5");
        assert_eq!(story.start_node_id.as_deref(), Some("10"));
        assert_eq!(story.pages.len(), 1);
        assert!(story.is_preview());
    }

    #[test]
    fn published_story_is_not_preview() {
        assert!(!is_preview_status(Some("published")));
        assert!(!is_preview_status(None));
        assert!(is_preview_status(Some(" preview ")));
    }

    #[test]
    fn null_lists_decode_as_empty() {
        let node: Node = serde_json::from_str(
            r#"{"id": 4, "text": "Dark.", "dialogue": null, "choices": null}"#,
        )
        .unwrap();
        assert!(node.dialogue.is_empty());
        assert!(node.choices.is_empty());

        let story: StoryDetail =
            serde_json::from_str(r#"{"id": 1, "title": null, "pages": null}"#).unwrap();
        assert_eq!(story.title, "");
        assert!(story.pages.is_empty());

        let list: Vec<StorySummary> =
            serde_json::from_str(r#"[{"id": 1, "title": null}, {"id": 2, "title": "Cave"}]"#)
                .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].title, "");
    }

    #[test]
    fn node_body_aliases() {
        let node: Node = serde_json::from_str(r#"{"id": "x", "body": "hello"}"#).unwrap();
        assert_eq!(node.text.as_deref(), Some("hello"));
    }
}
