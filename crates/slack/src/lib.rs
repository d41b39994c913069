//! Slack adapter for hookrelay.
//!
//! Web API calls over `reqwest` with a bot token: `chat.postMessage` for
//! notifications, `conversations.*` for per-project channels and thread
//! replies. Thread history is re-readable, so reply polling needs no cursor.

pub mod api;
pub mod channel;
pub mod config;
pub mod error;
pub mod outbound;

pub use {
    channel::{ChannelResolver, sanitize_channel_name},
    config::SlackAccountConfig,
    outbound::SlackAdapter,
};

#[cfg(test)]
mod mock;
