use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use tracing::error;

use super::problem_details;
use crate::server::AppState;
use crate::story::stats::aggregate;

pub async fn play_stats(State(state): State<AppState>) -> Response {
    match state.outcomes.list_all().await {
        Ok(outcomes) => Json(aggregate(&outcomes)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load play outcomes");
            problem_details::internal_error("failed to load statistics").into_response()
        }
    }
}
