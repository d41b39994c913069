use {
    async_trait::async_trait,
    hookrelay_channels::{
        BindingSink, Destination, DestinationResolver, Error, Result, adapter::fast_path,
    },
    tracing::{info, warn},
};

use crate::api::BotApi;

/// Title used when the project has no label.
pub const DEFAULT_TOPIC_TITLE: &str = "Claude Notifications";

/// Resolves a project's forum topic inside the configured group.
///
/// Without `auto_create` an unbound project posts to the group's General
/// topic. Telegram allows duplicate topic titles and cannot list topics, so
/// creation never collides and there is no lookup fallback.
#[derive(Debug, Clone)]
pub struct TopicResolver {
    api: BotApi,
    chat_id: String,
    auto_create: bool,
}

impl TopicResolver {
    pub fn new(api: BotApi, chat_id: impl Into<String>, auto_create: bool) -> Self {
        Self {
            api,
            chat_id: chat_id.into(),
            auto_create,
        }
    }
}

#[async_trait]
impl DestinationResolver for TopicResolver {
    async fn resolve(
        &self,
        project_label: &str,
        existing: Option<&Destination>,
        sink: &dyn BindingSink,
    ) -> Result<Destination> {
        if let Some(destination) = fast_path(existing) {
            return Ok(destination);
        }
        if self.chat_id.is_empty() {
            return Err(Error::config("telegram group id is not configured"));
        }
        if !self.auto_create {
            return Ok(Destination::Telegram {
                chat_id: self.chat_id.clone(),
                topic_id: None,
            });
        }

        let title = if project_label.trim().is_empty() {
            DEFAULT_TOPIC_TITLE
        } else {
            project_label
        };
        let topic = self
            .api
            .create_forum_topic(&self.chat_id, title)
            .await
            .map_err(Error::from)?;
        info!(
            chat_id = %self.chat_id,
            topic_id = topic.message_thread_id,
            name = %topic.name,
            "created telegram forum topic"
        );

        let destination = Destination::Telegram {
            chat_id: self.chat_id.clone(),
            topic_id: Some(topic.message_thread_id),
        };
        if let Err(e) = sink.persist(&destination) {
            warn!(error = %e, %destination, "failed to persist telegram topic binding");
        }
        Ok(destination)
    }
}
