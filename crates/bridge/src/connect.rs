//! Adapter wiring for the configured channel.

use std::path::PathBuf;

use {
    hookrelay_channels::{
        BindingSink, ChannelAdapter, Destination, DestinationResolver, Error, Result,
    },
    hookrelay_config::{ChannelKind, Settings, save_slack_channel_id, save_topic_id},
    hookrelay_slack::{ChannelResolver, SlackAccountConfig, SlackAdapter},
    hookrelay_telegram::{TelegramAccountConfig, TelegramAdapter, TopicResolver},
    secrecy::ExposeSecret,
    tracing::info,
};

/// Everything one invocation needs to talk to its channel.
pub struct Connection {
    pub adapter: Box<dyn ChannelAdapter>,
    pub resolver: Box<dyn DestinationResolver>,
    /// Destination known from settings, bound or not.
    pub existing: Option<Destination>,
    pub sink: ConfigBindingSink,
}

/// Build the adapter and resolver for `settings.channel()`.
///
/// Missing credentials are a configuration error.
pub fn connect(settings: &Settings) -> Result<Connection> {
    let sink = ConfigBindingSink::new(settings.config_path.clone());
    match settings.channel() {
        ChannelKind::Telegram => {
            let tg = &settings.telegram;
            let token = tg
                .bot_token
                .clone()
                .filter(|t| !t.expose_secret().is_empty())
                .ok_or_else(|| {
                    Error::config(format!(
                        "telegram bot token missing (set {})",
                        settings.config.telegram.bot_token_env
                    ))
                })?;
            let group_id = tg.group_id.clone().ok_or_else(|| {
                Error::config(format!(
                    "telegram group id missing (set {})",
                    settings.config.telegram.group_id_env
                ))
            })?;

            let config = TelegramAccountConfig {
                silent: !settings.config.platform_sound,
                ..TelegramAccountConfig::new(token)
            };
            let adapter = TelegramAdapter::new(config)?;
            let resolver =
                TopicResolver::new(adapter.api().clone(), group_id.clone(), tg.auto_create_topic);
            Ok(Connection {
                existing: Some(Destination::Telegram {
                    chat_id: group_id,
                    topic_id: tg.topic_id,
                }),
                adapter: Box::new(adapter),
                resolver: Box::new(resolver),
                sink,
            })
        },
        ChannelKind::Slack => {
            let sl = &settings.slack;
            let token = sl
                .bot_token
                .clone()
                .filter(|t| !t.expose_secret().is_empty())
                .ok_or_else(|| {
                    Error::config(format!(
                        "slack bot token missing (set {})",
                        settings.config.slack.bot_token_env
                    ))
                })?;
            if sl.channel.is_none() && !sl.auto_create_channel {
                return Err(Error::config(format!(
                    "slack channel missing (set {} or enable auto_create_channel)",
                    settings.config.slack.channel_env
                )));
            }

            let adapter = SlackAdapter::new(SlackAccountConfig::new(token))?;
            let resolver = ChannelResolver::new(adapter.api().clone(), sl.auto_create_channel);
            Ok(Connection {
                existing: sl.channel.clone().map(|channel_id| Destination::Slack { channel_id }),
                adapter: Box::new(adapter),
                resolver: Box::new(resolver),
                sink,
            })
        },
    }
}

/// Persists new bindings into the project's config file.
#[derive(Debug, Clone)]
pub struct ConfigBindingSink {
    path: PathBuf,
}

impl ConfigBindingSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl BindingSink for ConfigBindingSink {
    fn persist(&self, destination: &Destination) -> Result<()> {
        let saved = match destination {
            Destination::Telegram {
                topic_id: Some(topic_id),
                ..
            } => save_topic_id(&self.path, *topic_id),
            Destination::Telegram { topic_id: None, .. } => return Ok(()),
            Destination::Slack { channel_id } => save_slack_channel_id(&self.path, channel_id),
        };
        saved.map_err(Error::config)?;
        info!(%destination, path = %self.path.display(), "destination binding saved");
        Ok(())
    }
}
