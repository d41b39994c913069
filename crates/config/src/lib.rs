//! Per-project notification settings.
//!
//! Config file: `~/.claude/claude-notify/configs/<encoded project path>/notification-config.json`.
//! Project directories themselves are never read or written.
//!
//! Credentials resolve inline value first, then the named env var.

pub mod error;
pub mod loader;
pub mod resolve;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{
        config_path_for, configs_dir, encode_project_path, load_config, load_settings,
        save_slack_channel_id, save_topic_id, update_config_field,
    },
    resolve::{Settings, SlackSettings, TelegramSettings, resolve},
    schema::{ChannelKind, NotifyConfig, SlackConfig, TelegramConfig},
};
