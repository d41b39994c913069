//! Notification dispatch and reply bridge.
//!
//! Glue between resolved [`hookrelay_config::Settings`] and a channel
//! adapter: decides whether an event is sent at all, wires up the adapter
//! for the configured platform, and runs one send-then-maybe-poll cycle.

pub mod bridge;
pub mod connect;
pub mod gate;
pub mod response;

pub use {
    bridge::{BridgeOutcome, Delivery, ReplyBridge},
    connect::{ConfigBindingSink, Connection, connect},
    gate::{Skip, check, is_replyable, will_poll},
    response::HookResponse,
};
