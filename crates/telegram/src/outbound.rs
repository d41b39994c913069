use std::time::Duration;

use {
    async_trait::async_trait,
    hookrelay_channels::{
        CancelCheck, ChannelAdapter, Destination, Error, MessageChunk, Result, SentMessageRef,
    },
    hookrelay_config::ChannelKind,
    tracing::{info, warn},
};

use crate::{
    api::{BotApi, OutgoingMessage},
    config::TelegramAccountConfig,
    offset::Target,
    poll,
};

/// Telegram implementation of [`ChannelAdapter`].
#[derive(Debug, Clone)]
pub struct TelegramAdapter {
    api: BotApi,
}

impl TelegramAdapter {
    pub fn new(config: TelegramAccountConfig) -> Result<Self> {
        let api = BotApi::new(config).map_err(Error::from)?;
        Ok(Self { api })
    }

    pub fn api(&self) -> &BotApi {
        &self.api
    }
}

#[async_trait]
impl ChannelAdapter for TelegramAdapter {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Telegram
    }

    async fn send(
        &self,
        destination: &Destination,
        chunks: &[MessageChunk],
    ) -> Result<SentMessageRef> {
        let Destination::Telegram { chat_id, topic_id } = destination else {
            return Err(Error::config(format!(
                "telegram adapter cannot send to {destination}"
            )));
        };

        let mut last_message_id = None;
        for (idx, chunk) in chunks.iter().enumerate() {
            let msg = OutgoingMessage {
                chat_id,
                topic_id: *topic_id,
                text: chunk.as_str(),
                silent: self.api.config().silent,
            };
            match self.api.send_message(&msg).await {
                Ok(sent) => last_message_id = Some(sent.message_id),
                Err(e) => {
                    warn!(chunk_index = idx, chunk_count = chunks.len(), error = %e, "telegram send failed");
                    return Err(Error::send(idx, e));
                },
            }
        }

        let message_id =
            last_message_id.ok_or_else(|| Error::config("no message chunks to send"))?;
        info!(
            %destination,
            chunk_count = chunks.len(),
            message_id,
            "telegram notification sent"
        );
        Ok(SentMessageRef::Telegram {
            chat_id: chat_id.clone(),
            topic_id: *topic_id,
            message_id,
        })
    }

    async fn poll_reply(
        &self,
        sent: &SentMessageRef,
        timeout: Duration,
        cancel: &dyn CancelCheck,
    ) -> Option<String> {
        let SentMessageRef::Telegram {
            chat_id, topic_id, ..
        } = sent
        else {
            warn!(?sent, "telegram adapter cannot poll a foreign message ref");
            return None;
        };
        let target = Target {
            chat_id,
            topic_id: *topic_id,
        };
        poll::poll_reply(&self.api, target, timeout, cancel).await
    }
}
