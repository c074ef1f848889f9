//! Endings reached by the signed-in player.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use super::problem_details;
use crate::server::AppState;
use crate::session::Viewer;
use crate::story::access::require_user;
use crate::store::PlayOutcome;

pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub user_id: String,
    pub outcomes: Vec<PlayOutcome>,
}

pub async fn my_history(State(state): State<AppState>, viewer: Viewer) -> Response {
    let user_id = match require_user(&viewer) {
        Ok(user_id) => user_id,
        Err(e) => return problem_details::from_access_error(&e).into_response(),
    };

    match state.outcomes.list_for_user(user_id, HISTORY_LIMIT).await {
        Ok(outcomes) => Json(HistoryResponse {
            user_id: user_id.to_string(),
            outcomes,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load play history");
            problem_details::internal_error("failed to load play history").into_response()
        }
    }
}
