//! Integration tests for listing, health, statistics and ratings.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;

mod common;

use common::{COOKIE_NAME, get, get_with_cookie, json_body, test_app};
use taleweaver::store::OutcomeLog;

fn as_user(request: axum::http::request::Builder, user: &str) -> axum::http::request::Builder {
    request
        .header("cookie", format!("{COOKIE_NAME}=tok"))
        .header("x-remote-user", user)
}

// ============================================================================
// Health Endpoints
// ============================================================================

#[tokio::test]
async fn test_livez() {
    let app = test_app();

    let response = app.send(get("/livez")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_readyz_ignores_content_service() {
    let app = test_app();
    app.content.set_unavailable(true);

    let response = app.send(get("/readyz")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn test_version() {
    let app = test_app();

    let response = app.send(get("/version")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert!(json.get("version").is_some());
}

// ============================================================================
// Story List
// ============================================================================

#[tokio::test]
async fn test_list_stories() {
    let app = test_app();

    let response = app.send(get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("set-cookie").is_some());

    let json = json_body(response).await;
    assert_eq!(json["unavailable"], false);
    assert_eq!(json["stories"][0]["id"], "cave");
    assert_eq!(json["stories"][0]["title"], "The Cave");
}

#[tokio::test]
async fn test_list_stories_filters_by_status() {
    let app = test_app();

    let json = json_body(app.send(get("/?status=draft")).await).await;
    assert_eq!(json["status"], "draft");
    assert_eq!(json["stories"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_list_stories_while_unavailable() {
    let app = test_app();
    app.content.set_unavailable(true);

    let response = app.send(get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["unavailable"], true);
    assert!(json["stories"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_echoes_notice() {
    let app = test_app();

    let json = json_body(app.send(get("/?notice=Gone&level=warning")).await).await;
    assert_eq!(json["notice"]["message"], "Gone");
    assert_eq!(json["notice"]["level"], "warning");
}

// ============================================================================
// Statistics and History
// ============================================================================

#[tokio::test]
async fn test_stats_aggregate_endings() {
    let app = test_app();

    app.send(get_with_cookie("/play/cave/treasure", "a")).await;
    app.send(get_with_cookie("/play/cave/treasure", "b")).await;
    app.send(get_with_cookie("/play/cave/pit", "c")).await;

    let response = app.send(get("/stats")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["total_plays"], 3);
    let story = &json["stories"][0];
    assert_eq!(story["story_id"], "cave");
    assert_eq!(story["plays"], 3);
    assert_eq!(story["endings"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_history_requires_user() {
    let app = test_app();

    let response = app.send(get("/history")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/problem+json"
    );
}

#[tokio::test]
async fn test_history_lists_own_plays() {
    let app = test_app();
    app.store
        .record(Some("alice"), "cave", "treasure")
        .await
        .unwrap();
    app.store.record(Some("bob"), "cave", "pit").await.unwrap();

    let request = as_user(Request::get("/history"), "alice")
        .body(Body::empty())
        .unwrap();
    let json = json_body(app.send(request).await).await;
    assert_eq!(json["user_id"], "alice");
    let outcomes = json["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0]["ending_node_id"], "treasure");
}

// ============================================================================
// Ratings
// ============================================================================

fn rate(user: Option<&str>, body: &str) -> Request<Body> {
    let builder = Request::post("/story/cave/rate")
        .header("content-type", "application/x-www-form-urlencoded");
    let builder = match user {
        Some(user) => as_user(builder, user),
        None => builder,
    };
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_rating_requires_user() {
    let app = test_app();

    let response = app.send(rate(None, "score=5")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rating_rejects_out_of_range_score() {
    let app = test_app();

    let response = app.send(rate(Some("alice"), "score=9")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_rating_replaces_previous_rating() {
    let app = test_app();

    let response = app.send(rate(Some("alice"), "score=2")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(rate(Some("alice"), "score=4&comment=Loved+it"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["rating"]["score"], 4);
    assert_eq!(json["rating"]["comment"], "Loved it");
    assert_eq!(json["summary"]["count"], 1);
    assert_eq!(json["summary"]["average"], 4.0);
}

#[tokio::test]
async fn test_rating_unknown_story() {
    let app = test_app();

    let request = as_user(Request::post("/story/nope/rate"), "alice")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("score=3"))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
