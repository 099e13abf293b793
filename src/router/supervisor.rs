//! Supervised background execution for dispatches that outlive the webhook
//! response.
//!
//! Every dispatch is tracked so shutdown can wait for it; once the grace period
//! runs out the remaining tasks are cancelled and awaited.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::gitlab::client::PlatformClient;
use crate::gitlab::events::Event;
use crate::router::dispatch::{DispatchOutcome, Dispatcher};

#[derive(Clone, Default)]
pub struct TaskSupervisor {
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands `event` to the dispatcher on a tracked task. The handle yields
    /// `None` when the task was cancelled during shutdown.
    pub fn spawn_dispatch(
        &self,
        dispatcher: Arc<Dispatcher>,
        event: Event,
        gl: Arc<dyn PlatformClient>,
    ) -> JoinHandle<Option<DispatchOutcome>> {
        let cancel = self.cancel.clone();
        self.tracker.spawn(async move {
            tokio::select! {
                outcome = dispatcher.dispatch(&event, gl.as_ref()) => {
                    outcome.log();
                    Some(outcome)
                }
                _ = cancel.cancelled() => {
                    warn!(
                        delivery_id = event.delivery_id(),
                        kind = event.kind(),
                        "dispatch cancelled by shutdown"
                    );
                    None
                }
            }
        })
    }

    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Waits up to `grace` for tracked dispatches, then cancels the rest.
    /// Returns `true` when everything finished on its own.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending > 0 {
            info!(pending, ?grace, "waiting for background dispatches");
        }

        if tokio::time::timeout(grace, self.tracker.wait()).await.is_ok() {
            return true;
        }

        warn!(
            remaining = self.tracker.len(),
            "grace period elapsed, cancelling background dispatches"
        );
        self.cancel.cancel();
        self.tracker.wait().await;
        false
    }
}
