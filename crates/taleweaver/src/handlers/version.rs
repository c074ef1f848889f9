use axum::Json;
use axum::extract::State;

use crate::build_info::BuildInfo;
use crate::server::AppState;

pub async fn version(State(state): State<AppState>) -> Json<BuildInfo> {
    Json(state.build)
}
