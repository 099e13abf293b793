pub mod config;
pub mod error;
pub mod gitlab;
pub mod handlers;
pub mod router;

use crate::config::Config;
use crate::gitlab::client::PlatformClient;
use crate::gitlab::webhook::handle_webhook;
use crate::router::dispatch::Dispatcher;
use crate::router::supervisor::TaskSupervisor;
use axum::{
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Process-wide context: the read-only routing table behind the dispatcher,
/// the shared GitLab client and the background task supervisor.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub dispatcher: Arc<Dispatcher>,
    pub gitlab: Arc<dyn PlatformClient>,
    pub tasks: TaskSupervisor,
}

impl AppState {
    pub fn new(config: Config, dispatcher: Dispatcher, gitlab: Arc<dyn PlatformClient>) -> Self {
        Self {
            config,
            dispatcher: Arc::new(dispatcher),
            gitlab,
            tasks: TaskSupervisor::new(),
        }
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "labhook",
        "version": VERSION
    }))
}

pub async fn root() -> &'static str {
    "labhook - GitLab webhooks -> handlers"
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root).post(handle_webhook))
        .route("/webhooks/gitlab", post(handle_webhook))
        .route("/health", get(health))
        .with_state(state)
}
