mod channel;
mod engine;
mod hooks;
mod types;

pub use channel::{
    ChannelPatterns, ChannelResolver, ChannelRole, RolePatterns, DEFAULT_STABLE_PATTERNS,
    DEFAULT_UNSTABLE_PATTERNS,
};
pub use engine::Reconciler;
pub use hooks::{reconcile_command, refresh_hook};
pub use types::{ChannelRoles, PlannedReplacement};
