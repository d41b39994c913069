use std::time::Duration;

use secrecy::{ExposeSecret, Secret};

use crate::poll::PollSettings;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Connection settings for one bot.
#[derive(Clone)]
pub struct TelegramAccountConfig {
    /// Bot token from @BotFather.
    pub token: Secret<String>,
    /// Bot API root, without the `/bot<token>` suffix.
    pub api_url: String,
    /// Send with `disable_notification` so clients stay silent.
    pub silent: bool,
    /// Timeout for non-polling calls.
    pub request_timeout: Duration,
    pub poll: PollSettings,
}

impl TelegramAccountConfig {
    pub fn new(token: Secret<String>) -> Self {
        Self {
            token,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub(crate) fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_url.trim_end_matches('/'),
            self.token.expose_secret()
        )
    }
}

impl std::fmt::Debug for TelegramAccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramAccountConfig")
            .field("token", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("silent", &self.silent)
            .finish_non_exhaustive()
    }
}

impl Default for TelegramAccountConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            api_url: DEFAULT_API_URL.into(),
            silent: false,
            request_timeout: Duration::from_secs(30),
            poll: PollSettings::default(),
        }
    }
}
