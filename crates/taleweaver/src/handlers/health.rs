use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::server::AppState;

pub async fn livez() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

#[derive(Serialize)]
pub struct ReadyzResponse {
    pub status: String,
    pub database: String,
}

/// Ready once the local database answers; the remote content service is not
/// required, since players are sent to the "waking up" page while it is down.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<ReadyzResponse>) {
    match state.health.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(ReadyzResponse {
                status: "ok".to_string(),
                database: "ok".to_string(),
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyzResponse {
                status: "unavailable".to_string(),
                database: e.to_string(),
            }),
        ),
    }
}
