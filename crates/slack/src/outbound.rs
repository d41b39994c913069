use std::time::Duration;

use {
    async_trait::async_trait,
    hookrelay_channels::{
        CancelCheck, ChannelAdapter, Destination, Error, MessageChunk, Result, SentMessageRef,
    },
    hookrelay_config::ChannelKind,
    tokio::time::{Instant, sleep},
    tracing::{debug, info, warn},
};

use crate::{api::SlackApi, config::SlackAccountConfig};

/// Slack implementation of [`ChannelAdapter`].
#[derive(Debug, Clone)]
pub struct SlackAdapter {
    api: SlackApi,
}

impl SlackAdapter {
    pub fn new(config: SlackAccountConfig) -> Result<Self> {
        let api = SlackApi::new(config).map_err(Error::from)?;
        Ok(Self { api })
    }

    pub fn api(&self) -> &SlackApi {
        &self.api
    }

    /// Read the thread under `ts` every poll interval until it has a reply.
    async fn poll_thread(
        &self,
        channel: &str,
        ts: &str,
        timeout: Duration,
        cancel: &dyn CancelCheck,
    ) -> Option<String> {
        let interval = self.api.config().poll_interval;
        let deadline = Instant::now() + timeout;
        info!(
            channel,
            ts,
            timeout_secs = timeout.as_secs(),
            "waiting for slack thread reply"
        );

        loop {
            if cancel.is_cancelled() {
                info!("slack reply poll cancelled");
                return None;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                info!("slack reply poll timed out");
                return None;
            }

            match self.api.thread_replies(channel, ts).await {
                Ok(messages) => {
                    // The first message is the parent itself.
                    if let Some(reply) = messages.iter().skip(1).last() {
                        info!(chars = reply.text.chars().count(), "slack reply received");
                        return Some(reply.text.clone());
                    }
                    debug!(channel, ts, "no slack replies yet");
                },
                Err(e) => warn!(error = %e, channel, "slack conversations.replies failed"),
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            sleep(interval.min(remaining)).await;
        }
    }
}

#[async_trait]
impl ChannelAdapter for SlackAdapter {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Slack
    }

    async fn send(
        &self,
        destination: &Destination,
        chunks: &[MessageChunk],
    ) -> Result<SentMessageRef> {
        let Destination::Slack { channel_id } = destination else {
            return Err(Error::config(format!(
                "slack adapter cannot send to {destination}"
            )));
        };

        let mut last = None;
        for (idx, chunk) in chunks.iter().enumerate() {
            match self.api.post_message(channel_id, chunk.as_str()).await {
                Ok(posted) => last = Some(posted),
                Err(e) => {
                    warn!(chunk_index = idx, chunk_count = chunks.len(), error = %e, "slack send failed");
                    return Err(Error::send(idx, e));
                },
            }
        }

        let posted = last.ok_or_else(|| Error::config("no message chunks to send"))?;
        info!(
            %destination,
            chunk_count = chunks.len(),
            ts = %posted.ts,
            "slack notification sent"
        );
        Ok(SentMessageRef::Slack {
            channel: posted.channel,
            ts: posted.ts,
        })
    }

    async fn poll_reply(
        &self,
        sent: &SentMessageRef,
        timeout: Duration,
        cancel: &dyn CancelCheck,
    ) -> Option<String> {
        let SentMessageRef::Slack { channel, ts } = sent else {
            warn!(?sent, "slack adapter cannot poll a foreign message ref");
            return None;
        };
        self.poll_thread(channel, ts, timeout, cancel).await
    }
}
