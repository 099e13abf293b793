use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::error::HandlerError;
use crate::gitlab::client::PlatformClient;
use crate::gitlab::events::Event;
use crate::router::table::Handler;

/// Stand-in for a long-running job kicked off by a push. Runs after the
/// webhook has already been acknowledged.
pub struct PushAction {
    delay: Duration,
}

impl PushAction {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Handler for PushAction {
    fn name(&self) -> &str {
        "push_action"
    }

    async fn handle(&self, event: &Event, _gl: &dyn PlatformClient) -> Result<(), HandlerError> {
        info!(
            kind = event.kind(),
            delivery_id = event.delivery_id(),
            started_at = %chrono::Utc::now(),
            "triggering push action"
        );
        tokio::time::sleep(self.delay).await;
        info!(
            delivery_id = event.delivery_id(),
            finished_at = %chrono::Utc::now(),
            "push action done"
        );
        Ok(())
    }
}
