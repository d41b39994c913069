use std::time::Duration;

use {async_trait::async_trait, hookrelay_config::ChannelKind, tracing::debug};

use crate::{
    cancel::CancelCheck,
    destination::{BindingSink, Destination, SentMessageRef},
    error::Result,
    render::MessageChunk,
};

/// Sending and reply polling for one chat platform.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    fn kind(&self) -> ChannelKind;

    /// Post `chunks` in order. Stops at the first rejected chunk and reports
    /// its index; chunks before it stay delivered.
    async fn send(&self, destination: &Destination, chunks: &[MessageChunk])
    -> Result<SentMessageRef>;

    /// Wait up to `timeout` for a human reply to `sent`.
    ///
    /// Never fails: timeout, cancellation and per-iteration errors all end in
    /// `None` or another iteration.
    async fn poll_reply(
        &self,
        sent: &SentMessageRef,
        timeout: Duration,
        cancel: &dyn CancelCheck,
    ) -> Option<String>;
}

/// Maps a project to its destination, creating it on first use.
#[async_trait]
pub trait DestinationResolver: Send + Sync {
    /// Return `existing` unchanged when it is bound, without any platform
    /// call. Otherwise create or discover a destination named after
    /// `project_label` and hand it to `sink`.
    async fn resolve(
        &self,
        project_label: &str,
        existing: Option<&Destination>,
        sink: &dyn BindingSink,
    ) -> Result<Destination>;
}

/// The reusable binding in `existing`, if any.
pub fn fast_path(existing: Option<&Destination>) -> Option<Destination> {
    let destination = existing.filter(|d| d.is_bound())?;
    debug!(%destination, "reusing persisted destination");
    Some(destination.clone())
}
