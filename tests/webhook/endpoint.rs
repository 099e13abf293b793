use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use labhook::config::Config;
use labhook::create_app;
use labhook::gitlab::verify::{sign_body, SignatureScheme};
use labhook::handlers::default_router;
use labhook::router::table::EventRouter;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tower::ServiceExt;

#[path = "../common/common.rs"]
mod common;

fn secured() -> Config {
    Config {
        webhook_secret: Some("s3cret".into()),
        push_action_delay: Duration::from_secs(5),
        ..Config::default()
    }
}

fn webhook(kind: Option<&str>, token: Option<&str>, body: String) -> Request<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json");
    if let Some(kind) = kind {
        req = req.header("x-gitlab-event", kind);
    }
    if let Some(token) = token {
        req = req.header("x-gitlab-token", token);
    }
    req.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn test_issue_open_is_acknowledged_and_greeted() {
    let gl = Arc::new(common::MockGitLab::default());
    let config = secured();
    let state = common::create_state(config.clone(), default_router(&config), gl.clone());
    let tasks = state.tasks.clone();

    let res = create_app(state)
        .oneshot(webhook(
            Some("Issue Hook"),
            Some("s3cret"),
            common::issue_open_payload().to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert!(body.is_empty());

    assert!(tasks.shutdown(Duration::from_secs(5)).await);
    let posts = gl.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].0, "/projects/42/issues/7/notes");
    assert_eq!(
        posts[0].1,
        json!({ "body": "Thanks for the report @alice! I will look into it ASAP! (I'm a bot)." })
    );
}

#[tokio::test(start_paused = true)]
async fn test_push_is_acknowledged_before_background_work_finishes() {
    let gl = Arc::new(common::MockGitLab::default());
    let config = secured();
    let state = common::create_state(config.clone(), default_router(&config), gl);
    let tasks = state.tasks.clone();

    let started = Instant::now();
    let res = create_app(state)
        .oneshot(webhook(
            Some("Push Hook"),
            Some("s3cret"),
            common::push_payload().to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(tasks.in_flight(), 1);

    assert!(tasks.shutdown(Duration::from_secs(10)).await);
    assert!(started.elapsed() >= Duration::from_secs(5));
    assert_eq!(tasks.in_flight(), 0);
}

#[tokio::test]
async fn test_wrong_or_missing_token_is_unauthorized() {
    let gl = Arc::new(common::MockGitLab::default());
    let config = secured();
    let state = common::create_state(config.clone(), default_router(&config), gl.clone());
    let app = create_app(state.clone());
    let body = common::issue_open_payload().to_string();

    let res = app
        .clone()
        .oneshot(webhook(Some("Issue Hook"), Some("wrong"), body.clone()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .oneshot(webhook(Some("Issue Hook"), None, body))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(state.tasks.in_flight(), 0);
    assert!(gl.posts().is_empty());
}

#[tokio::test]
async fn test_unparsable_body_is_rejected_without_dispatch() {
    let gl = Arc::new(common::MockGitLab::default());
    let config = secured();
    let state = common::create_state(config.clone(), default_router(&config), gl.clone());

    let res = create_app(state.clone())
        .oneshot(webhook(Some("Issue Hook"), Some("s3cret"), "{\"object_kind\":".into()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert!(state.tasks.shutdown(Duration::from_secs(1)).await);
    assert!(gl.posts().is_empty());
}

#[tokio::test]
async fn test_missing_event_header_is_bad_request() {
    let gl = Arc::new(common::MockGitLab::default());
    let state = common::create_state(Config::default(), EventRouter::new(), gl);

    let res = create_app(state.clone())
        .oneshot(webhook(None, None, "{}".into()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.tasks.in_flight(), 0);
}

#[tokio::test]
async fn test_handler_failure_still_acknowledged() {
    let gl = Arc::new(common::MockGitLab::failing());
    let config = secured();
    let state = common::create_state(config.clone(), default_router(&config), gl.clone());
    let tasks = state.tasks.clone();

    let res = create_app(state)
        .oneshot(webhook(
            Some("Issue Hook"),
            Some("s3cret"),
            common::issue_open_payload().to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(tasks.shutdown(Duration::from_secs(5)).await);

    // The greeting was attempted and failed after the 200 went out.
    assert_eq!(gl.attempts(), ["/projects/42/issues/7/notes"]);
    assert!(gl.posts().is_empty());
}

#[tokio::test]
async fn test_hmac_scheme_over_http() {
    let gl = Arc::new(common::MockGitLab::default());
    let config = Config {
        webhook_secret: Some("key".into()),
        signature_scheme: SignatureScheme::HmacSha256,
        ..Config::default()
    };
    let state = common::create_state(config.clone(), default_router(&config), gl.clone());
    let tasks = state.tasks.clone();
    let body = common::issue_open_payload().to_string();

    let req = Request::builder()
        .method("POST")
        .uri("/webhooks/gitlab")
        .header("content-type", "application/json")
        .header("x-gitlab-event", "Issue Hook")
        .header("x-gitlab-signature-256", sign_body("key", body.as_bytes()))
        .body(Body::from(body))
        .unwrap();
    let res = create_app(state).oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    assert!(tasks.shutdown(Duration::from_secs(5)).await);
    assert_eq!(gl.posts().len(), 1);
}

#[tokio::test]
async fn test_health() {
    let state = common::create_state(
        Config::default(),
        EventRouter::new(),
        Arc::new(common::MockGitLab::default()),
    );
    let res = create_app(state)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "labhook");
}
