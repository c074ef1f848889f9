use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::build_info::BuildInfo;
use crate::config::{Config, IdentityConfig, SessionConfig};
use crate::content::ContentSource;
use crate::handlers;
use crate::session;
use crate::story::{DiceRoller, Traversal, TraversalStores};
use crate::store::{
    OutcomeLog, OwnershipStore, ProfileStore, ProgressStore, RatingStore, StoreHealth,
};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub content: Arc<dyn ContentSource>,
    pub traversal: Traversal,
    pub ownership: Arc<dyn OwnershipStore>,
    pub ratings: Arc<dyn RatingStore>,
    pub outcomes: Arc<dyn OutcomeLog>,
    pub health: Arc<dyn StoreHealth>,
    pub identity: IdentityConfig,
    pub session: SessionConfig,
    pub build: BuildInfo,
    pub max_connections: usize,
}

impl AppState {
    /// Wire state from one store backend implementing every store trait.
    pub fn new<S>(content: Arc<dyn ContentSource>, store: Arc<S>, config: &Config) -> Self
    where
        S: ProgressStore
            + ProfileStore
            + OutcomeLog
            + RatingStore
            + OwnershipStore
            + StoreHealth
            + 'static,
    {
        let traversal = Traversal::new(
            content.clone(),
            TraversalStores::shared(store.clone()),
            config.player.clone(),
        );
        Self {
            content,
            traversal,
            ownership: store.clone(),
            ratings: store.clone(),
            outcomes: store.clone(),
            health: store,
            identity: config.identity.clone(),
            session: config.session.clone(),
            build: BuildInfo::new(),
            max_connections: config.server.max_connections,
        }
    }

    /// Replace the dice used for rolling choices.
    pub fn with_dice(mut self, dice: Arc<dyn DiceRoller>) -> Self {
        self.traversal = self.traversal.with_dice(dice);
        self
    }
}

// ============================================================================
// Server Setup
// ============================================================================

pub fn build_app(state: AppState, request_timeout_seconds: u64) -> Router {
    let max_connections = state.max_connections.max(1);

    // Player routes - need a session token
    let play_routes = Router::new()
        .route("/", get(handlers::stories::list_stories))
        .route("/unavailable", get(handlers::stories::unavailable))
        .route(
            "/story/{story_id}/start",
            get(handlers::play::start_story).post(handlers::play::start_story_form),
        )
        .route("/story/{story_id}/continue", get(handlers::play::continue_story))
        .route("/story/{story_id}/rate", post(handlers::ratings::rate_story))
        .route("/play/{story_id}/{node_id}", get(handlers::play::view_node))
        .route(
            "/play/{story_id}/{node_id}/choose",
            post(handlers::play::choose),
        )
        .route("/history", get(handlers::history::my_history))
        .route("/stats", get(handlers::stats::play_stats))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session::ensure_session,
        ))
        .with_state(state.clone());

    // Authoring routes - identity only
    let author_routes = Router::new()
        .route("/story", post(handlers::author::create_story))
        .route(
            "/story/{story_id}",
            axum::routing::put(handlers::author::update_story)
                .delete(handlers::author::delete_story),
        )
        .route("/story/{story_id}/graph", get(handlers::author::story_graph))
        .route("/story/{story_id}/page", post(handlers::author::create_page))
        .route(
            "/story/{story_id}/page/{page_id}",
            axum::routing::put(handlers::author::update_page)
                .delete(handlers::author::delete_page),
        )
        .route(
            "/story/{story_id}/page/{page_id}/choice",
            post(handlers::author::create_choice),
        )
        .route(
            "/story/{story_id}/choice/{choice_id}",
            axum::routing::put(handlers::author::update_choice)
                .delete(handlers::author::delete_choice),
        )
        .with_state(state.clone());

    let app_routes = Router::new()
        .merge(play_routes)
        .nest("/author", author_routes)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(request_timeout_seconds),
        ))
        .layer(DefaultBodyLimit::max(256 * 1024)) // 256 KB
        .layer(ConcurrencyLimitLayer::new(max_connections));

    Router::new()
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .route("/version", get(handlers::version))
        .with_state(state)
        .merge(app_routes)
}
