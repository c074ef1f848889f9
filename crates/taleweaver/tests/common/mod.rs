//! Common test utilities.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use tower::ServiceExt;

use taleweaver::config::Config;
use taleweaver::content::MemoryContent;
use taleweaver::server::{self, AppState};
use taleweaver::story::FixedRoll;
use taleweaver::store::SqliteStore;
use taleweaver_content::{Choice, Node, StoryDetail};

pub const STORY_ID: &str = "cave";
pub const COOKIE_NAME: &str = "taleweaver_session";

/// Handles on the backing services of a test app.
pub struct TestApp {
    pub router: Router,
    pub content: Arc<MemoryContent>,
    pub store: Arc<SqliteStore>,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Create a test app serving [`sample_story`] with dice that always roll `roll`.
pub fn test_app_with_roll(roll: u32) -> TestApp {
    let content = Arc::new(MemoryContent::new().with_story(sample_story("published")));
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let state = AppState::new(content.clone(), store.clone(), &Config::default())
        .with_dice(Arc::new(FixedRoll(roll)));
    TestApp {
        router: server::build_app(state, 30),
        content,
        store,
    }
}

/// Create a test app whose dice always succeed.
pub fn test_app() -> TestApp {
    test_app_with_roll(6)
}

pub fn page(id: &str, text: &str, choices: Vec<Choice>) -> Node {
    Node {
        id: id.to_string(),
        title: Some(id.to_string()),
        text: Some(text.to_string()),
        choices,
        ..Default::default()
    }
}

pub fn ending(id: &str) -> Node {
    Node {
        node_type: Some("ending".to_string()),
        ..page(id, "The end, {{player_name}}.", vec![])
    }
}

pub fn choice(id: &str, target: &str) -> Choice {
    Choice {
        id: Some(id.to_string()),
        text: Some(format!("Go to {target}")),
        next_page_id: Some(target.to_string()),
        ..Default::default()
    }
}

/// entrance -> (1) hall -> (1) treasure [ending]
///                           (2) leads nowhere
///          -> (2) rolled jump to treasure, falling back to pit [ending]
///          -> (3) dangling
/// secret is unreachable.
pub fn sample_story(status: &str) -> StoryDetail {
    let jump = Choice {
        id: Some("2".to_string()),
        text: Some("Jump the chasm".to_string()),
        next_page_id: Some("treasure".to_string()),
        requires_roll: true,
        roll_sides: Some(6),
        roll_required: Some(4),
        on_fail_target: Some("pit".to_string()),
        ..Default::default()
    };

    let stairs = Choice {
        id: Some("2".to_string()),
        text: Some("Climb the collapsed stairs".to_string()),
        ..Default::default()
    };

    StoryDetail {
        id: STORY_ID.to_string(),
        title: "The Cave".to_string(),
        status: Some(status.to_string()),
        start_node_id: Some("entrance".to_string()),
        pages: vec![
            page(
                "entrance",
                "Welcome, {{player_name}}.",
                vec![choice("1", "hall"), jump, choice("3", "void")],
            ),
            page("hall", "A long hall.", vec![choice("1", "treasure"), stairs]),
            ending("treasure"),
            ending("pit"),
            page("secret", "Nobody gets here.", vec![]),
        ],
        ..Default::default()
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header("cookie", format!("{COOKIE_NAME}={token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(uri: &str, token: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("cookie", format!("{COOKIE_NAME}={token}"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get("location")
        .expect("location header")
        .to_str()
        .unwrap()
        .to_string()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
