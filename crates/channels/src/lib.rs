//! Channel abstraction shared by the Telegram and Slack adapters.
//!
//! An adapter sends rendered [`MessageChunk`]s to a [`Destination`] and can
//! wait for a human reply to what it sent. Destinations are resolved once per
//! project and handed to a [`BindingSink`] for persistence.

pub mod adapter;
pub mod cancel;
pub mod destination;
pub mod error;
pub mod render;

pub use {
    adapter::{ChannelAdapter, DestinationResolver},
    cancel::{CancelCheck, NeverCancel},
    destination::{BindingSink, Destination, SentMessageRef},
    error::{Error, Result},
    render::{Dialect, MessageChunk, RenderContext, render},
};
