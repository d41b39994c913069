//! Credential merge: schema + environment lookup -> resolved [`Settings`].

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use {
    hookrelay_common::{EventKind, NotificationKind},
    secrecy::{ExposeSecret, Secret},
};

use crate::schema::{ChannelKind, NotifyConfig};

/// Telegram credentials and destination after the merge.
#[derive(Debug, Clone, Default)]
pub struct TelegramSettings {
    pub bot_token: Option<Secret<String>>,
    pub group_id: Option<String>,
    pub topic_id: Option<i64>,
    pub auto_create_topic: bool,
}

/// Slack credentials and destination after the merge.
#[derive(Debug, Clone, Default)]
pub struct SlackSettings {
    pub bot_token: Option<Secret<String>>,
    pub channel: Option<String>,
    pub auto_create_channel: bool,
}

/// Fully resolved settings for one project invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: NotifyConfig,
    pub telegram: TelegramSettings,
    pub slack: SlackSettings,
    pub project_label: String,
    pub project_dir: PathBuf,
    /// Where binding write-backs go.
    pub config_path: PathBuf,
}

impl Settings {
    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn channel(&self) -> ChannelKind {
        self.config.channel
    }

    pub fn event_enabled(&self, kind: &EventKind) -> bool {
        self.config.event_enabled(kind)
    }

    pub fn notification_type_enabled(&self, kind: &NotificationKind) -> bool {
        self.config.notification_type_enabled(kind)
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_secs(self.config.send_delay)
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.config.reply_timeout)
    }
}

/// Merge a parsed config with credentials from `env`.
///
/// Inline `*_value` entries win over the env var named by `*_env`; empty
/// strings count as unset. The Slack channel prefers the cached
/// `channel_id`. An empty `project_label` falls back to the basename of
/// `project_dir`.
pub fn resolve<F>(config: NotifyConfig, project_dir: &Path, config_path: PathBuf, env: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| non_empty(env(name));

    let telegram = TelegramSettings {
        bot_token: inline_secret(&config.telegram.bot_token_value)
            .or_else(|| lookup(&config.telegram.bot_token_env).map(Secret::new)),
        group_id: non_empty(config.telegram.group_id_value.clone())
            .or_else(|| lookup(&config.telegram.group_id_env)),
        topic_id: config.telegram.topic_id,
        auto_create_topic: config.telegram.auto_create_topic,
    };

    let slack = SlackSettings {
        bot_token: inline_secret(&config.slack.bot_token_value)
            .or_else(|| lookup(&config.slack.bot_token_env).map(Secret::new)),
        channel: non_empty(config.slack.channel_id.clone())
            .or_else(|| lookup(&config.slack.channel_env)),
        auto_create_channel: config.slack.auto_create_channel,
    };

    let project_label = if config.project_label.is_empty() {
        project_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        config.project_label.clone()
    };

    Settings {
        config,
        telegram,
        slack,
        project_label,
        project_dir: project_dir.to_path_buf(),
        config_path,
    }
}

fn inline_secret(value: &Option<Secret<String>>) -> Option<Secret<String>> {
    value
        .as_ref()
        .filter(|s| !s.expose_secret().is_empty())
        .cloned()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
