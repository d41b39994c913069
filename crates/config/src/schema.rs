//! On-disk config schema.
//!
//! Every section carries `#[serde(default)]`, so a partial file overlays the
//! defaults field by field. The keyed maps (`events`, `notification_types`,
//! `sounds`) overlay per key: lookups fall back to the built-in table for
//! keys the file does not mention.
use std::{collections::HashMap, fmt};

use {
    hookrelay_common::{EventKind, NotificationKind},
    secrecy::Secret,
    serde::{Deserialize, Deserializer, Serialize},
};

/// Chat platform a project notifies through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    #[default]
    Telegram,
    Slack,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Telegram => "telegram",
            Self::Slack => "slack",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root of `notification-config.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub enabled: bool,
    pub channel: ChannelKind,
    /// Per event kind toggles, keyed by wire name (`Notification`, `Stop`, ...).
    pub events: HashMap<String, bool>,
    /// Per notification category toggles (`idle_prompt`, ...).
    pub notification_types: HashMap<String, bool>,
    pub telegram: TelegramConfig,
    pub slack: SlackConfig,
    /// Seconds to wait before sending, giving the user a chance to answer at
    /// the terminal first.
    pub send_delay: u64,
    pub sound: String,
    pub sounds: HashMap<String, String>,
    /// When false, platform messages are delivered silently.
    pub platform_sound: bool,
    pub include_history: bool,
    pub history_lines: usize,
    pub wait_for_reply: bool,
    /// Seconds to wait for a reply.
    pub reply_timeout: u64,
    pub project_label: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            channel: ChannelKind::default(),
            events: HashMap::new(),
            notification_types: HashMap::new(),
            telegram: TelegramConfig::default(),
            slack: SlackConfig::default(),
            send_delay: 10,
            sound: "default".into(),
            sounds: HashMap::new(),
            platform_sound: true,
            include_history: false,
            history_lines: 10,
            wait_for_reply: false,
            reply_timeout: 120,
            project_label: String::new(),
        }
    }
}

impl NotifyConfig {
    pub fn event_enabled(&self, kind: &EventKind) -> bool {
        self.events
            .get(kind.as_str())
            .copied()
            .unwrap_or_else(|| default_event_enabled(kind))
    }

    /// Only an explicit or default `false` filters a category out; unknown
    /// categories pass.
    pub fn notification_type_enabled(&self, kind: &NotificationKind) -> bool {
        self.notification_types
            .get(kind.as_str())
            .copied()
            .unwrap_or_else(|| default_notification_type_enabled(kind))
    }

    pub fn sound_for(&self, kind: &EventKind) -> &str {
        self.sounds
            .get(kind.as_str())
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or(if self.sound.is_empty() {
                "default"
            } else {
                self.sound.as_str()
            })
    }
}

fn default_event_enabled(kind: &EventKind) -> bool {
    match kind {
        EventKind::Notification | EventKind::Stop => true,
        EventKind::SubagentStop | EventKind::Other(_) => false,
    }
}

fn default_notification_type_enabled(kind: &NotificationKind) -> bool {
    !matches!(kind, NotificationKind::AuthSuccess)
}

/// Telegram section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Env var holding the bot token.
    pub bot_token_env: String,
    /// Env var holding the group chat id.
    pub group_id_env: String,
    /// Inline bot token; takes priority over `bot_token_env`.
    pub bot_token_value: Option<Secret<String>>,
    /// Inline group id; takes priority over `group_id_env`.
    #[serde(deserialize_with = "string_or_number")]
    pub group_id_value: Option<String>,
    /// Forum topic for this project. Written back after auto-creation.
    pub topic_id: Option<i64>,
    /// Create a forum topic named after the project when `topic_id` is unset.
    pub auto_create_topic: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token_env: "CLAUDE_NOTIFY_TG_TOKEN".into(),
            group_id_env: "CLAUDE_NOTIFY_TG_GROUP_ID".into(),
            bot_token_value: None,
            group_id_value: None,
            topic_id: None,
            auto_create_topic: false,
        }
    }
}

/// Slack section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    pub bot_token_env: String,
    pub channel_env: String,
    pub bot_token_value: Option<Secret<String>>,
    /// Cached channel id, written back after auto-creation.
    pub channel_id: Option<String>,
    pub auto_create_channel: bool,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token_env: "CLAUDE_NOTIFY_SLACK_TOKEN".into(),
            channel_env: "CLAUDE_NOTIFY_SLACK_CHANNEL".into(),
            bot_token_value: None,
            channel_id: None,
            auto_create_channel: false,
        }
    }
}

/// Chat ids show up both quoted and bare in hand-written configs.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}
