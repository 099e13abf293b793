use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::gitlab::client::PlatformClient;
use crate::gitlab::events::Event;

/// A unit of bot logic run for matching events.
#[async_trait]
pub trait Handler: Send + Sync {
    fn name(&self) -> &str;

    async fn handle(&self, event: &Event, gl: &dyn PlatformClient) -> Result<(), HandlerError>;
}

pub type SharedHandler = Arc<dyn Handler>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    kind: String,
    /// `None` is the wildcard: every action of `kind`, including none at all.
    action: Option<String>,
}

/// Registration table from (event kind, action) to handlers. Built once at
/// startup and only read afterwards.
#[derive(Default)]
pub struct EventRouter {
    routes: HashMap<RouteKey, Vec<SharedHandler>>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` for `kind` and `action`; pass `None` to match any action.
    pub fn register<H>(&mut self, kind: &str, action: Option<&str>, handler: H) -> &mut Self
    where
        H: Handler + 'static,
    {
        self.register_shared(kind, action, Arc::new(handler))
    }

    pub fn register_shared(
        &mut self,
        kind: &str,
        action: Option<&str>,
        handler: SharedHandler,
    ) -> &mut Self {
        let key = RouteKey {
            kind: kind.to_string(),
            action: action.map(str::to_string),
        };
        tracing::debug!(kind, ?action, handler = handler.name(), "registered handler");
        self.routes.entry(key).or_default().push(handler);
        self
    }

    /// Exact (kind, action) handlers first, then the kind's wildcard handlers,
    /// each group in registration order.
    pub fn resolve(&self, event: &Event) -> Vec<SharedHandler> {
        self.resolve_key(event.kind(), event.action())
    }

    pub fn resolve_key(&self, kind: &str, action: Option<&str>) -> Vec<SharedHandler> {
        let mut found = Vec::new();
        if let Some(action) = action {
            let exact = RouteKey {
                kind: kind.to_string(),
                action: Some(action.to_string()),
            };
            if let Some(handlers) = self.routes.get(&exact) {
                found.extend(handlers.iter().cloned());
            }
        }
        let wildcard = RouteKey {
            kind: kind.to_string(),
            action: None,
        };
        if let Some(handlers) = self.routes.get(&wildcard) {
            found.extend(handlers.iter().cloned());
        }
        found
    }

    /// Total number of registrations.
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
