//! Player navigation.
//!
//! Starting, continuing and choosing all answer with `303 See Other`; only
//! viewing a node renders a body. A rejected choice renders the current node
//! again with `422` instead of redirecting, so nothing is committed for it.

use axum::Json;
use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::navigation::{NoticeQuery, fallback_redirect, navigation_redirect, node_location, see_other};
use crate::server::AppState;
use crate::session::{SessionToken, Viewer};
use crate::story::{AdvanceOutcome, ViewOutcome};

#[derive(Debug, Default, Deserialize)]
pub struct StartParams {
    #[serde(default)]
    pub player_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChooseForm {
    #[serde(default)]
    pub choice_id: Option<String>,
}

pub async fn start_story(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
    session: SessionToken,
    Query(params): Query<StartParams>,
) -> Response {
    let navigation = state
        .traversal
        .begin(session.as_str(), &story_id, params.player_name.as_deref())
        .await;
    navigation_redirect(&story_id, navigation)
}

pub async fn start_story_form(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
    session: SessionToken,
    Form(params): Form<StartParams>,
) -> Response {
    let navigation = state
        .traversal
        .begin(session.as_str(), &story_id, params.player_name.as_deref())
        .await;
    navigation_redirect(&story_id, navigation)
}

pub async fn continue_story(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
    session: SessionToken,
) -> Response {
    let navigation = state
        .traversal
        .resume_or_begin(session.as_str(), &story_id)
        .await;
    navigation_redirect(&story_id, navigation)
}

pub async fn view_node(
    State(state): State<AppState>,
    Path((story_id, node_id)): Path<(String, String)>,
    session: SessionToken,
    viewer: Viewer,
    Query(query): Query<NoticeQuery>,
) -> Response {
    let outcome = state
        .traversal
        .view(
            session.as_str(),
            viewer.user_id(),
            &story_id,
            &node_id,
            query.into_notice(),
        )
        .await;

    match outcome {
        ViewOutcome::Render(view) => (StatusCode::OK, Json(view)).into_response(),
        ViewOutcome::Fallback(fallback) => fallback_redirect(fallback),
    }
}

pub async fn choose(
    State(state): State<AppState>,
    Path((story_id, node_id)): Path<(String, String)>,
    session: SessionToken,
    Form(form): Form<ChooseForm>,
) -> Response {
    let choice_id = form.choice_id.unwrap_or_default();
    let outcome = state
        .traversal
        .advance(session.as_str(), &story_id, &node_id, &choice_id)
        .await;

    match outcome {
        AdvanceOutcome::Moved {
            node_id, notice, ..
        } => see_other(&node_location(&story_id, &node_id, notice.as_ref())),
        AdvanceOutcome::Rejected { view, .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(view)).into_response()
        }
        AdvanceOutcome::Fallback(fallback) => fallback_redirect(fallback),
    }
}
