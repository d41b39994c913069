use std::collections::HashSet;

use {
    async_trait::async_trait,
    hookrelay_channels::{
        BindingSink, Destination, DestinationResolver, Error, Result, adapter::fast_path,
    },
    secrecy::ExposeSecret,
    tracing::{debug, info, warn},
};

use crate::api::{Conversation, SlackApi};

/// Slack's channel name length limit.
const MAX_CHANNEL_NAME: usize = 80;
/// Upper bound on `conversations.list` pages walked by a name lookup.
const MAX_LIST_PAGES: usize = 50;

/// Channel name for a project label: `claude-<label>`, lowercased, with
/// anything outside `[a-z0-9_-]` replaced by `-` and dash runs collapsed.
pub fn sanitize_channel_name(project_label: &str) -> String {
    let label = project_label.trim();
    let label = if label.is_empty() {
        "notifications"
    } else {
        label
    };

    let mut name = String::with_capacity(label.len() + 7);
    for c in format!("claude-{label}").to_lowercase().chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' {
            c
        } else {
            '-'
        };
        if c == '-' && name.ends_with('-') {
            continue;
        }
        name.push(c);
    }
    let name = name.trim_matches('-');
    let name = &name[..name.len().min(MAX_CHANNEL_NAME)];
    name.trim_end_matches('-').to_string()
}

/// Resolves a project's public channel, creating it on first use.
///
/// When the sanitized name is already taken the existing channel is found by
/// listing public channels and joined, so a second machine bound to the same
/// project converges on the same channel.
#[derive(Debug, Clone)]
pub struct ChannelResolver {
    api: SlackApi,
    auto_create: bool,
}

impl ChannelResolver {
    pub fn new(api: SlackApi, auto_create: bool) -> Self {
        Self { api, auto_create }
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Conversation>> {
        let mut cursor: Option<String> = None;
        let mut seen = HashSet::new();
        for _ in 0..MAX_LIST_PAGES {
            let page = self
                .api
                .list_public_channels(cursor.as_deref())
                .await
                .map_err(Error::from)?;
            if let Some(found) = page.channels.iter().find(|c| c.name == name) {
                return Ok(Some(found.clone()));
            }
            let Some(next) = page.next_cursor() else {
                return Ok(None);
            };
            if !seen.insert(next.to_string()) {
                warn!(cursor = next, "slack channel list repeated a cursor");
                return Err(Error::config(format!(
                    "slack channel list did not terminate while looking for #{name}"
                )));
            }
            cursor = Some(next.to_string());
        }
        Err(Error::config(format!(
            "slack channel #{name} not found within {MAX_LIST_PAGES} pages of public channels"
        )))
    }

    async fn create_or_join(&self, name: &str) -> Result<Conversation> {
        match self.api.create_channel(name).await {
            Ok(created) => {
                info!(channel = %created.id, name, "created slack channel");
                Ok(created)
            },
            Err(e) if e.api_code() == Some("name_taken") => {
                debug!(name, "slack channel name taken, looking it up");
                let Some(existing) = self.find_by_name(name).await? else {
                    return Err(Error::config(format!(
                        "slack channel #{name} exists but is not visible to the bot"
                    )));
                };
                self.api
                    .join_channel(&existing.id)
                    .await
                    .map_err(Error::from)?;
                info!(channel = %existing.id, name, "joined existing slack channel");
                Ok(existing)
            },
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl DestinationResolver for ChannelResolver {
    async fn resolve(
        &self,
        project_label: &str,
        existing: Option<&Destination>,
        sink: &dyn BindingSink,
    ) -> Result<Destination> {
        if let Some(destination) = fast_path(existing) {
            return Ok(destination);
        }
        if self.api.config().bot_token.expose_secret().is_empty() {
            return Err(Error::config("slack bot token is not configured"));
        }
        if !self.auto_create {
            return Err(Error::config(
                "slack channel is not configured and auto_create_channel is off",
            ));
        }

        let name = sanitize_channel_name(project_label);
        let channel = self.create_or_join(&name).await?;
        let destination = Destination::Slack {
            channel_id: channel.id,
        };
        if let Err(e) = sink.persist(&destination) {
            warn!(error = %e, %destination, "failed to persist slack channel binding");
        }
        Ok(destination)
    }
}
