//! Redirect helpers for the player-facing routes.
//!
//! Notices travel to the next page as `notice` and `level` query parameters.

use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use url::Url;

use crate::story::{Fallback, Navigation, Notice, NoticeLevel};

pub const STORY_LIST_PATH: &str = "/";
pub const UNAVAILABLE_PATH: &str = "/unavailable";

/// Notice carried on a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    #[serde(default)]
    pub notice: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

impl NoticeQuery {
    pub fn into_notice(self) -> Option<Notice> {
        let message = self.notice.map(|m| m.trim().to_string()).filter(|m| !m.is_empty())?;
        let level = self
            .level
            .as_deref()
            .map(NoticeLevel::parse)
            .unwrap_or(NoticeLevel::Info);
        Some(Notice { level, message })
    }
}

/// Build a local path from raw segments, percent-encoding each one.
pub fn location(segments: &[&str], notice: Option<&Notice>) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return STORY_LIST_PATH.to_string();
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    if let Some(notice) = notice {
        url.query_pairs_mut()
            .append_pair("notice", &notice.message)
            .append_pair("level", notice.level.as_str());
    }

    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    }
}

pub fn node_location(story_id: &str, node_id: &str, notice: Option<&Notice>) -> String {
    location(&["play", story_id, node_id], notice)
}

pub fn see_other(location: &str) -> Response {
    Redirect::to(location).into_response()
}

pub fn fallback_redirect(fallback: Fallback) -> Response {
    match fallback {
        Fallback::StoryList => see_other(&location(
            &[],
            Some(&Notice::warning("That story or page could not be found.")),
        )),
        Fallback::Unavailable => see_other(UNAVAILABLE_PATH),
    }
}

pub fn navigation_redirect(story_id: &str, navigation: Navigation) -> Response {
    match navigation {
        Navigation::Node { node_id, notice } => {
            see_other(&node_location(story_id, &node_id, notice.as_ref()))
        }
        Navigation::Fallback(fallback) => fallback_redirect(fallback),
    }
}
