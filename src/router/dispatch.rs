use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info};

use crate::error::HandlerError;
use crate::gitlab::client::PlatformClient;
use crate::gitlab::events::Event;
use crate::router::table::EventRouter;

#[derive(Debug)]
pub struct HandlerOutcome {
    pub handler: String,
    pub result: Result<(), HandlerError>,
}

#[derive(Debug)]
pub struct DispatchOutcome {
    pub delivery_id: String,
    pub kind: String,
    pub handlers: Vec<HandlerOutcome>,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        self.handlers.iter().all(|h| h.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &HandlerError)> {
        self.handlers
            .iter()
            .filter_map(|h| h.result.as_ref().err().map(|e| (h.handler.as_str(), e)))
    }

    pub fn log(&self) {
        for (handler, err) in self.failures() {
            error!(
                delivery_id = %self.delivery_id,
                kind = %self.kind,
                handler,
                error = %err,
                "handler failed"
            );
        }
        info!(
            delivery_id = %self.delivery_id,
            kind = %self.kind,
            handlers = self.handlers.len(),
            failed = self.failures().count(),
            "dispatch finished"
        );
    }
}

pub struct Dispatcher {
    router: Arc<EventRouter>,
}

impl Dispatcher {
    pub fn new(router: Arc<EventRouter>) -> Self {
        Self { router }
    }

    /// Runs every matching handler once, in resolution order. A failing or
    /// panicking handler is recorded and the rest still run.
    pub async fn dispatch(&self, event: &Event, gl: &dyn PlatformClient) -> DispatchOutcome {
        let handlers = self.router.resolve(event);
        if handlers.is_empty() {
            info!(
                kind = event.kind(),
                action = ?event.action(),
                delivery_id = event.delivery_id(),
                "no handlers registered, ignoring"
            );
        }

        let mut outcomes = Vec::with_capacity(handlers.len());
        for handler in handlers {
            let result = AssertUnwindSafe(handler.handle(event, gl))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(HandlerError::Panicked(panic_message(panic))));
            outcomes.push(HandlerOutcome {
                handler: handler.name().to_string(),
                result,
            });
        }

        DispatchOutcome {
            delivery_id: event.delivery_id().to_string(),
            kind: event.kind().to_string(),
            handlers: outcomes,
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
