use labhook::config::Config;
use labhook::error::HandlerError;
use labhook::handlers::{default_router, IssueGreeter};
use labhook::router::dispatch::Dispatcher;
use labhook::router::table::Handler;
use serde_json::json;
use std::sync::Arc;

#[path = "../common/common.rs"]
mod common;

#[tokio::test]
async fn test_issue_open_posts_greeting() {
    let gl = common::MockGitLab::default();
    let dispatcher = Dispatcher::new(Arc::new(default_router(&Config::default())));

    let event = common::event("Issue Hook", common::issue_open_payload());
    let outcome = dispatcher.dispatch(&event, &gl).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.handlers.len(), 1);
    assert_eq!(
        gl.posts(),
        vec![(
            "/projects/42/issues/7/notes".to_string(),
            json!({ "body": "Thanks for the report @alice! I will look into it ASAP! (I'm a bot)." })
        )]
    );
}

#[tokio::test]
async fn test_issue_close_is_not_greeted() {
    let gl = common::MockGitLab::default();
    let dispatcher = Dispatcher::new(Arc::new(default_router(&Config::default())));

    let mut payload = common::issue_open_payload();
    payload["object_attributes"]["action"] = json!("close");
    let outcome = dispatcher
        .dispatch(&common::event("Issue Hook", payload), &gl)
        .await;

    assert!(outcome.handlers.is_empty());
    assert!(gl.posts().is_empty());
}

#[tokio::test]
async fn test_missing_iid_is_payload_error() {
    let gl = common::MockGitLab::default();
    let mut payload = common::issue_open_payload();
    payload["object_attributes"]
        .as_object_mut()
        .unwrap()
        .remove("iid");

    let err = IssueGreeter
        .handle(&common::event("Issue Hook", payload), &gl)
        .await
        .unwrap_err();
    assert!(matches!(err, HandlerError::Payload(field) if field == "object_attributes.iid"));
    assert!(gl.posts().is_empty());
}

#[tokio::test]
async fn test_transport_failure_is_handler_failure() {
    let gl = common::MockGitLab::failing();
    let dispatcher = Dispatcher::new(Arc::new(default_router(&Config::default())));

    let outcome = dispatcher
        .dispatch(&common::event("Issue Hook", common::issue_open_payload()), &gl)
        .await;

    assert!(!outcome.is_success());
    let failures: Vec<_> = outcome.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "issue_greeter");
    assert!(matches!(failures[0].1, HandlerError::Transport(_)));
    assert_eq!(gl.attempts().len(), 1);
}
