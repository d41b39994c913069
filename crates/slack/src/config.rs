use std::time::Duration;

use secrecy::Secret;

pub const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Connection settings for one Slack bot.
#[derive(Clone)]
pub struct SlackAccountConfig {
    /// Bot user OAuth token (`xoxb-...`).
    pub bot_token: Secret<String>,
    /// Web API root.
    pub api_url: String,
    pub request_timeout: Duration,
    /// Interval between `conversations.replies` fetches.
    pub poll_interval: Duration,
}

impl SlackAccountConfig {
    pub fn new(bot_token: Secret<String>) -> Self {
        Self {
            bot_token,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub(crate) fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.api_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for SlackAccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackAccountConfig")
            .field("bot_token", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl Default for SlackAccountConfig {
    fn default() -> Self {
        Self {
            bot_token: Secret::new(String::new()),
            api_url: DEFAULT_API_URL.into(),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(5),
        }
    }
}
