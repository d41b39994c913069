//! Telegram adapter for hookrelay.
//!
//! Talks to the Bot API directly over `reqwest`: `sendMessage` with HTML
//! parse mode, `createForumTopic` for per-project topics and `getUpdates`
//! for replies. The update queue is shared by every process using the same
//! bot, so the reply poller only acknowledges updates it can prove nobody
//! else wants (see [`offset`]).

pub mod api;
pub mod config;
pub mod error;
pub mod offset;
pub mod outbound;
pub mod poll;
pub mod topic;

pub use {
    config::TelegramAccountConfig, outbound::TelegramAdapter, poll::PollSettings,
    topic::TopicResolver,
};

#[cfg(test)]
mod mock;
