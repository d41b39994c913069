//! Thin Slack Web API client. Every call is a fresh, unpooled request.

use {
    reqwest::RequestBuilder,
    secrecy::ExposeSecret,
    serde::{Deserialize, de::DeserializeOwned},
    serde_json::{Value, json},
    tracing::debug,
};

use crate::{
    config::SlackAccountConfig,
    error::{Error, Result},
};

/// Page size for `conversations.list`.
const LIST_PAGE_SIZE: u32 = 200;
/// Parent plus up to nine replies.
const REPLIES_LIMIT: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMessage {
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct ConversationResponse {
    channel: Conversation,
}

#[derive(Debug, Deserialize)]
pub struct ConversationPage {
    #[serde(default)]
    pub channels: Vec<Conversation>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

impl ConversationPage {
    /// Cursor of the next page, if there is one.
    pub fn next_cursor(&self) -> Option<&str> {
        self.response_metadata
            .as_ref()
            .map(|m| m.next_cursor.as_str())
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Debug, Deserialize)]
struct RepliesResponse {
    #[serde(default)]
    messages: Vec<ThreadMessage>,
}

#[derive(Debug, Clone)]
pub struct SlackApi {
    http: reqwest::Client,
    config: SlackAccountConfig,
}

impl SlackApi {
    pub fn new(config: SlackAccountConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &SlackAccountConfig {
        &self.config
    }

    async fn post<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T> {
        let req = self.http.post(self.config.method_url(method)).json(body);
        self.execute(method, req).await
    }

    async fn get<T: DeserializeOwned>(&self, method: &str, query: &[(&str, String)]) -> Result<T> {
        let req = self.http.get(self.config.method_url(method)).query(query);
        self.execute(method, req).await
    }

    async fn execute<T: DeserializeOwned>(&self, method: &str, req: RequestBuilder) -> Result<T> {
        let resp = req
            .bearer_auth(self.config.bot_token.expose_secret())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = resp.status();
        let body: Value = resp.json().await.map_err(reqwest::Error::without_url)?;
        if body.get("ok").and_then(Value::as_bool) != Some(true) {
            let code = body
                .get("error")
                .and_then(Value::as_str)
                .map_or_else(|| format!("http_{}", status.as_u16()), str::to_string);
            return Err(Error::Api {
                method: method.to_string(),
                code,
            });
        }
        Ok(serde_json::from_value(body)?)
    }

    pub async fn post_message(&self, channel: &str, text: &str) -> Result<PostedMessage> {
        let posted: PostedMessage = self
            .post(
                "chat.postMessage",
                &json!({ "channel": channel, "text": text, "mrkdwn": true }),
            )
            .await?;
        debug!(channel = %posted.channel, ts = %posted.ts, "slack message posted");
        Ok(posted)
    }

    pub async fn create_channel(&self, name: &str) -> Result<Conversation> {
        let resp: ConversationResponse = self
            .post(
                "conversations.create",
                &json!({ "name": name, "is_private": false }),
            )
            .await?;
        Ok(resp.channel)
    }

    pub async fn list_public_channels(&self, cursor: Option<&str>) -> Result<ConversationPage> {
        let mut query = vec![
            ("types", "public_channel".to_string()),
            ("exclude_archived", "true".to_string()),
            ("limit", LIST_PAGE_SIZE.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        self.get("conversations.list", &query).await
    }

    pub async fn join_channel(&self, channel_id: &str) -> Result<Conversation> {
        let resp: ConversationResponse = self
            .post("conversations.join", &json!({ "channel": channel_id }))
            .await?;
        Ok(resp.channel)
    }

    /// Parent message followed by its replies, oldest first.
    pub async fn thread_replies(&self, channel: &str, ts: &str) -> Result<Vec<ThreadMessage>> {
        let query = [
            ("channel", channel.to_string()),
            ("ts", ts.to_string()),
            ("limit", REPLIES_LIMIT.to_string()),
        ];
        let resp: RepliesResponse = self.get("conversations.replies", &query).await?;
        Ok(resp.messages)
    }
}
