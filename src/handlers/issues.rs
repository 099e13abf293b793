use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::error::HandlerError;
use crate::gitlab::client::PlatformClient;
use crate::gitlab::events::Event;
use crate::handlers::formatters::{greeting, issue_notes_path};
use crate::router::table::Handler;

/// Greets the author of a newly opened issue with a note.
pub struct IssueGreeter;

#[async_trait]
impl Handler for IssueGreeter {
    fn name(&self) -> &str {
        "issue_greeter"
    }

    async fn handle(&self, event: &Event, gl: &dyn PlatformClient) -> Result<(), HandlerError> {
        let project_id = event
            .project_id()
            .ok_or_else(|| HandlerError::Payload("project.id".into()))?;
        let issue_iid = event
            .object_attributes()
            .and_then(|attrs| attrs.get("iid"))
            .and_then(Value::as_u64)
            .ok_or_else(|| HandlerError::Payload("object_attributes.iid".into()))?;
        let username = event
            .username()
            .ok_or_else(|| HandlerError::Payload("user.username".into()))?;

        let path = issue_notes_path(project_id, issue_iid);
        gl.post(&path, &json!({ "body": greeting(username) }))
            .await?;

        info!(project_id, issue_iid, username, "greeted issue author");
        Ok(())
    }
}
