//! Story listing and the "waking up" page.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use taleweaver_content::StorySummary;
use tracing::warn;

use super::navigation::NoticeQuery;
use crate::server::AppState;
use crate::story::Notice;

/// Seconds a browser should wait before retrying while the service wakes up.
pub const RETRY_AFTER_SECONDS: u64 = 10;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub notice: NoticeQuery,
}

#[derive(Debug, Serialize)]
pub struct StoryListResponse {
    pub stories: Vec<StorySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// True when the content service could not be reached. Distinguishes
    /// "no stories" from "service asleep".
    pub unavailable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

pub async fn list_stories(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<StoryListResponse> {
    let status = query
        .status
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let (stories, unavailable) = match state.content.list_stories(status.as_deref()).await {
        Ok(stories) => (stories, false),
        Err(e) => {
            warn!(error = %e, "Failed to list stories");
            (Vec::new(), true)
        }
    };

    Json(StoryListResponse {
        stories,
        status,
        unavailable,
        notice: query.notice.into_notice(),
    })
}

#[derive(Debug, Serialize)]
pub struct UnavailableResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub retry_after_seconds: u64,
}

pub async fn unavailable() -> impl IntoResponse {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        [(header::RETRY_AFTER, RETRY_AFTER_SECONDS.to_string())],
        Json(UnavailableResponse {
            status: "waking_up",
            message: "The story service is waking up. Please try again in a few seconds.",
            retry_after_seconds: RETRY_AFTER_SECONDS,
        }),
    )
}
