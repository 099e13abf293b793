//! The bot's handlers and the routing table they are registered into.

pub mod formatters;
pub mod issues;
pub mod push;

use crate::config::Config;
use crate::gitlab::events::{ISSUE_HOOK, PUSH_HOOK};
use crate::router::table::EventRouter;

pub use issues::IssueGreeter;
pub use push::PushAction;

/// Startup registration table for the bot.
pub fn default_router(config: &Config) -> EventRouter {
    let mut router = EventRouter::new();
    router
        .register(ISSUE_HOOK, Some("open"), IssueGreeter)
        .register(PUSH_HOOK, None, PushAction::new(config.push_action_delay));
    router
}
