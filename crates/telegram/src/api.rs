//! Minimal Bot API client.
//!
//! Connections are not pooled: every call opens and closes its own
//! connection, so nothing outlives the invocation.

use std::time::Duration;

use {
    serde::{Deserialize, de::DeserializeOwned},
    serde_json::{Value, json},
    tracing::debug,
};

use crate::{
    config::TelegramAccountConfig,
    error::{Error, Result},
};

/// Extra HTTP time on top of a long-poll so the client never gives up before
/// Telegram answers.
const LONG_POLL_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub message_thread_id: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForumTopic {
    pub message_thread_id: i64,
    pub name: String,
}

/// One `sendMessage` call.
#[derive(Debug, Clone, Copy)]
pub struct OutgoingMessage<'a> {
    pub chat_id: &'a str,
    pub topic_id: Option<i64>,
    pub text: &'a str,
    pub silent: bool,
}

#[derive(Debug, Clone)]
pub struct BotApi {
    http: reqwest::Client,
    config: TelegramAccountConfig,
}

impl BotApi {
    pub fn new(config: TelegramAccountConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &TelegramAccountConfig {
        &self.config
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<T> {
        // `without_url` keeps the token out of error messages.
        let resp = self
            .http
            .post(self.config.method_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = resp.status();
        let envelope: ApiResponse<T> = resp.json().await.map_err(reqwest::Error::without_url)?;

        if !envelope.ok {
            return Err(Error::Api {
                code: envelope
                    .error_code
                    .unwrap_or_else(|| i64::from(status.as_u16())),
                description: envelope.description.unwrap_or_default(),
            });
        }
        envelope
            .result
            .ok_or_else(|| Error::message(format!("{method}: ok response without result")))
    }

    pub async fn send_message(&self, msg: &OutgoingMessage<'_>) -> Result<Message> {
        let mut body = json!({
            "chat_id": msg.chat_id,
            "text": msg.text,
            "parse_mode": "HTML",
        });
        if let Some(obj) = body.as_object_mut() {
            if let Some(topic_id) = msg.topic_id {
                obj.insert("message_thread_id".into(), Value::from(topic_id));
            }
            if msg.silent {
                obj.insert("disable_notification".into(), Value::Bool(true));
            }
        }
        let sent: Message = self
            .call("sendMessage", &body, self.config.request_timeout)
            .await?;
        debug!(
            chat_id = msg.chat_id,
            topic_id = ?msg.topic_id,
            message_id = sent.message_id,
            "telegram message sent"
        );
        Ok(sent)
    }

    /// Long-poll for message updates starting at `offset`.
    pub async fn get_updates(&self, offset: i64, wait_secs: u64) -> Result<Vec<Update>> {
        let body = json!({
            "offset": offset,
            "timeout": wait_secs,
            "allowed_updates": ["message"],
        });
        self.call(
            "getUpdates",
            &body,
            Duration::from_secs(wait_secs) + LONG_POLL_GRACE,
        )
        .await
    }

    /// Offset just past the most recent pending update (`0` on an empty
    /// queue). The returned update itself is not processed.
    ///
    /// `offset=-1` makes Telegram forget every update older than the last
    /// one.
    pub async fn latest_offset(&self) -> Result<i64> {
        let body = json!({ "offset": -1, "limit": 1 });
        let updates: Vec<Update> = self
            .call("getUpdates", &body, self.config.request_timeout)
            .await?;
        Ok(updates.last().map_or(0, |u| u.update_id + 1))
    }

    /// Acknowledge every update below `offset` without waiting.
    pub async fn confirm(&self, offset: i64) -> Result<()> {
        let body = json!({ "offset": offset, "timeout": 0, "limit": 1 });
        let _: Vec<Update> = self
            .call("getUpdates", &body, self.config.request_timeout)
            .await?;
        Ok(())
    }

    pub async fn create_forum_topic(&self, chat_id: &str, name: &str) -> Result<ForumTopic> {
        let body = json!({ "chat_id": chat_id, "name": name });
        self.call("createForumTopic", &body, self.config.request_timeout)
            .await
    }
}
