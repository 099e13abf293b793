use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use tracing::{info, warn};

use crate::error::Result;
use crate::gitlab::{events::Event, verify::verify};
use crate::AppState;

/// `POST /`: verify, parse, hand off to the background dispatcher, acknowledge.
/// Handler failures happen after the 200 and never reach GitLab.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    if let Err(e) = verify(
        &headers,
        &body,
        state.config.webhook_secret.as_deref(),
        state.config.signature_scheme,
    ) {
        warn!(error = %e, "rejected gitlab webhook");
        return Err(e.into());
    }

    let event = Event::parse(&headers, &body).inspect_err(|e| {
        warn!(error = %e, "unparsable gitlab webhook");
    })?;

    info!(
        kind = event.kind(),
        action = ?event.action(),
        delivery_id = event.delivery_id(),
        "accepted gitlab webhook"
    );

    state
        .tasks
        .spawn_dispatch(state.dispatcher.clone(), event, state.gitlab.clone());

    Ok(StatusCode::OK)
}
