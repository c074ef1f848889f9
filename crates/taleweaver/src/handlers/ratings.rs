//! Story ratings.

use axum::Json;
use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::problem_details;
use crate::server::AppState;
use crate::session::Viewer;
use crate::story::access::require_user;
use crate::story::traversal::RatingSummary;
use crate::store::StoryRating;
use crate::store::rating::{MAX_SCORE, MIN_SCORE};

pub const MAX_COMMENT_CHARS: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct RateForm {
    #[serde(default)]
    pub score: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub rating: StoryRating,
    pub summary: RatingSummary,
}

fn parse_score(raw: &str) -> Option<u8> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|s| (MIN_SCORE..=MAX_SCORE).contains(s))
}

fn clean_comment(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    (!trimmed.is_empty()).then(|| trimmed.chars().take(MAX_COMMENT_CHARS).collect())
}

pub async fn rate_story(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
    viewer: Viewer,
    Form(form): Form<RateForm>,
) -> Response {
    let user_id = match require_user(&viewer) {
        Ok(user_id) => user_id,
        Err(e) => return problem_details::from_access_error(&e).into_response(),
    };
    let Some(score) = parse_score(&form.score) else {
        return problem_details::unprocessable(format!(
            "score must be a whole number from {MIN_SCORE} to {MAX_SCORE}"
        ))
        .into_response();
    };

    match state.content.story_detail(&story_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return problem_details::not_found(format!("story '{story_id}' not found"))
                .into_response();
        }
        Err(e) => return problem_details::from_content_error(&e).into_response(),
    }

    let comment = clean_comment(form.comment.as_deref());
    let rating = match state
        .ratings
        .upsert(user_id, &story_id, score, comment.as_deref())
        .await
    {
        Ok(rating) => rating,
        Err(e) => {
            error!(story_id = %story_id, error = %e, "Failed to save rating");
            return problem_details::internal_error("failed to save rating").into_response();
        }
    };
    info!(story_id = %story_id, score, "Story rated");

    let ratings = match state.ratings.list_for_story(&story_id).await {
        Ok(ratings) => ratings,
        Err(e) => {
            error!(story_id = %story_id, error = %e, "Failed to load ratings");
            vec![rating.clone()]
        }
    };

    (
        StatusCode::OK,
        Json(RateResponse {
            rating,
            summary: RatingSummary::from_ratings(ratings),
        }),
    )
        .into_response()
}
