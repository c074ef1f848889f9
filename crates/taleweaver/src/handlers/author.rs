//! Authoring endpoints.
//!
//! Thin proxies to the content service behind the ownership check. Creating a
//! story records the creator as its owner; deleting it releases ownership.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use taleweaver_content::{ChoiceDraft, NodeDraft, StoryDraft};
use tracing::{debug, error, info, warn};

use super::problem_details;
use crate::server::AppState;
use crate::session::Viewer;
use crate::story::access::require_user;
use crate::story::{authorize_author, diagnose};

// ============================================================================
// Guards
// ============================================================================

async fn authorize(state: &AppState, viewer: &Viewer, story_id: &str) -> Result<(), Response> {
    authorize_author(viewer, story_id, state.ownership.as_ref())
        .await
        .map_err(|e| {
            debug!(story_id, error = %e, "Authoring request denied");
            problem_details::from_access_error(&e).into_response()
        })
}

/// Reject ids that do not belong to `story_id`, so owning one story does not
/// grant edits to another story's pages.
async fn require_page(state: &AppState, story_id: &str, page_id: &str) -> Result<(), Response> {
    match state.content.node(story_id, page_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(
            problem_details::not_found(format!("page '{page_id}' not found in story '{story_id}'"))
                .into_response(),
        ),
        Err(e) => Err(problem_details::from_content_error(&e).into_response()),
    }
}

async fn require_choice(
    state: &AppState,
    story_id: &str,
    choice_id: &str,
) -> Result<(), Response> {
    let story = match state.content.story_with_pages(story_id).await {
        Ok(Some(story)) => story,
        Ok(None) => {
            return Err(
                problem_details::not_found(format!("story '{story_id}' not found")).into_response(),
            );
        }
        Err(e) => return Err(problem_details::from_content_error(&e).into_response()),
    };

    let found = story
        .pages
        .iter()
        .flat_map(|page| page.choices.iter())
        .any(|choice| choice.id.as_deref() == Some(choice_id));
    if found {
        Ok(())
    } else {
        Err(problem_details::not_found(format!(
            "choice '{choice_id}' not found in story '{story_id}'"
        ))
        .into_response())
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

pub async fn story_graph(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
    viewer: Viewer,
) -> Response {
    if let Err(denied) = authorize(&state, &viewer, &story_id).await {
        return denied;
    }

    match state.content.story_with_pages(&story_id).await {
        Ok(Some(story)) => Json(diagnose(&story)).into_response(),
        Ok(None) => {
            problem_details::not_found(format!("story '{story_id}' not found")).into_response()
        }
        Err(e) => problem_details::from_content_error(&e).into_response(),
    }
}

// ============================================================================
// Stories
// ============================================================================

pub async fn create_story(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(draft): Json<StoryDraft>,
) -> Response {
    let user_id = match require_user(&viewer) {
        Ok(user_id) => user_id,
        Err(e) => return problem_details::from_access_error(&e).into_response(),
    };
    if draft.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
        return problem_details::unprocessable("title is required").into_response();
    }

    let story = match state.content.create_story(&draft).await {
        Ok(story) => story,
        Err(e) => return problem_details::from_content_error(&e).into_response(),
    };

    if let Err(e) = state.ownership.record_owner(&story.id, user_id).await {
        error!(story_id = %story.id, error = %e, "Failed to record story owner");
    } else {
        info!(story_id = %story.id, "Story created");
    }
    (StatusCode::CREATED, Json(story)).into_response()
}

pub async fn update_story(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
    viewer: Viewer,
    Json(draft): Json<StoryDraft>,
) -> Response {
    if let Err(denied) = authorize(&state, &viewer, &story_id).await {
        return denied;
    }
    match state.content.update_story(&story_id, &draft).await {
        Ok(story) => Json(story).into_response(),
        Err(e) => problem_details::from_content_error(&e).into_response(),
    }
}

pub async fn delete_story(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
    viewer: Viewer,
) -> Response {
    if let Err(denied) = authorize(&state, &viewer, &story_id).await {
        return denied;
    }
    if let Err(e) = state.content.delete_story(&story_id).await {
        return problem_details::from_content_error(&e).into_response();
    }
    if let Err(e) = state.ownership.release(&story_id).await {
        warn!(story_id = %story_id, error = %e, "Failed to release story owner");
    }
    info!(story_id = %story_id, "Story deleted");
    StatusCode::NO_CONTENT.into_response()
}

// ============================================================================
// Pages
// ============================================================================

pub async fn create_page(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
    viewer: Viewer,
    Json(draft): Json<NodeDraft>,
) -> Response {
    if let Err(denied) = authorize(&state, &viewer, &story_id).await {
        return denied;
    }
    match state.content.create_node(&story_id, &draft).await {
        Ok(node) => (StatusCode::CREATED, Json(node)).into_response(),
        Err(e) => problem_details::from_content_error(&e).into_response(),
    }
}

pub async fn update_page(
    State(state): State<AppState>,
    Path((story_id, page_id)): Path<(String, String)>,
    viewer: Viewer,
    Json(draft): Json<NodeDraft>,
) -> Response {
    if let Err(denied) = authorize(&state, &viewer, &story_id).await {
        return denied;
    }
    if let Err(missing) = require_page(&state, &story_id, &page_id).await {
        return missing;
    }
    match state.content.update_node(&page_id, &draft).await {
        Ok(node) => Json(node).into_response(),
        Err(e) => problem_details::from_content_error(&e).into_response(),
    }
}

pub async fn delete_page(
    State(state): State<AppState>,
    Path((story_id, page_id)): Path<(String, String)>,
    viewer: Viewer,
) -> Response {
    if let Err(denied) = authorize(&state, &viewer, &story_id).await {
        return denied;
    }
    if let Err(missing) = require_page(&state, &story_id, &page_id).await {
        return missing;
    }
    match state.content.delete_node(&page_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => problem_details::from_content_error(&e).into_response(),
    }
}

// ============================================================================
// Choices
// ============================================================================

pub async fn create_choice(
    State(state): State<AppState>,
    Path((story_id, page_id)): Path<(String, String)>,
    viewer: Viewer,
    Json(draft): Json<ChoiceDraft>,
) -> Response {
    if let Err(denied) = authorize(&state, &viewer, &story_id).await {
        return denied;
    }
    if let Err(missing) = require_page(&state, &story_id, &page_id).await {
        return missing;
    }
    match state.content.create_choice(&page_id, &draft).await {
        Ok(choice) => (StatusCode::CREATED, Json(choice)).into_response(),
        Err(e) => problem_details::from_content_error(&e).into_response(),
    }
}

pub async fn update_choice(
    State(state): State<AppState>,
    Path((story_id, choice_id)): Path<(String, String)>,
    viewer: Viewer,
    Json(draft): Json<ChoiceDraft>,
) -> Response {
    if let Err(denied) = authorize(&state, &viewer, &story_id).await {
        return denied;
    }
    if let Err(missing) = require_choice(&state, &story_id, &choice_id).await {
        return missing;
    }
    match state.content.update_choice(&choice_id, &draft).await {
        Ok(choice) => Json(choice).into_response(),
        Err(e) => problem_details::from_content_error(&e).into_response(),
    }
}

pub async fn delete_choice(
    State(state): State<AppState>,
    Path((story_id, choice_id)): Path<(String, String)>,
    viewer: Viewer,
) -> Response {
    if let Err(denied) = authorize(&state, &viewer, &story_id).await {
        return denied;
    }
    if let Err(missing) = require_choice(&state, &story_id, &choice_id).await {
        return missing;
    }
    match state.content.delete_choice(&choice_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => problem_details::from_content_error(&e).into_response(),
    }
}
