//! In-process Web API double for adapter tests.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use {
    axum::{
        Json, Router,
        body::Bytes,
        extract::{Query, State},
        http::{HeaderMap, Uri, header::AUTHORIZATION},
        routing::any,
    },
    secrecy::Secret,
    serde_json::{Value, json},
    tokio::sync::oneshot,
};

use crate::config::SlackAccountConfig;

pub(crate) const TOKEN: &str = "xoxb-test";

#[derive(Default)]
pub(crate) struct MockState {
    /// `conversations.create` rejects with this error string.
    pub create_error: Option<String>,
    /// `conversations.list` pages, served in order via `next_cursor`.
    pub pages: Vec<Vec<Value>>,
    /// Returned as `next_cursor` on every `conversations.list` page.
    pub stuck_cursor: Option<String>,
    /// Keep handing out fresh cursors past the last page.
    pub endless_pages: bool,
    pub join_error: Option<String>,
    /// Zero-based `chat.postMessage` call to reject.
    pub fail_post_at: Option<usize>,
    /// Replies under the parent message, visible once `replies_after` calls
    /// to `conversations.replies` have been answered with the parent alone.
    pub replies: Vec<Value>,
    pub replies_after: usize,
    pub fail_replies: usize,
    /// Method name, merged query and body parameters.
    pub requests: Vec<(String, Value)>,
    pub bad_auth: usize,
    posted: usize,
    replies_calls: usize,
}

#[derive(Clone, Default)]
pub(crate) struct MockSlack {
    pub state: Arc<Mutex<MockState>>,
}

pub(crate) struct MockServer {
    pub url: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

impl MockServer {
    pub fn config(&self) -> SlackAccountConfig {
        SlackAccountConfig {
            poll_interval: Duration::from_millis(50),
            ..SlackAccountConfig::new(Secret::new(TOKEN.into())).with_api_url(&self.url)
        }
    }
}

impl MockSlack {
    pub fn with(f: impl FnOnce(&mut MockState)) -> Self {
        let api = Self::default();
        f(&mut api.state.lock().expect("lock state"));
        api
    }

    pub fn requests(&self, method: &str) -> Vec<Value> {
        self.state
            .lock()
            .expect("lock state")
            .requests
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().expect("lock state").requests.len()
    }

    pub async fn serve(&self) -> MockServer {
        let app = Router::new()
            .route("/{*path}", any(handler))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("serve mock slack api");
        });
        MockServer {
            url: format!("http://{addr}"),
            shutdown: Some(shutdown_tx),
        }
    }
}

pub(crate) fn channel(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "is_channel": true })
}

fn failure(code: &str) -> Value {
    json!({ "ok": false, "error": code })
}

async fn handler(
    State(api): State<MockSlack>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    let method = uri.path().rsplit('/').next().unwrap_or_default().to_string();
    let mut params: serde_json::Map<String, Value> = query
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    if let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(&body) {
        params.extend(fields);
    }
    let params = Value::Object(params);

    let mut state = api.state.lock().expect("lock state");
    state.requests.push((method.clone(), params.clone()));

    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"));
    if !authorized {
        state.bad_auth += 1;
        return Json(failure("not_authed"));
    }

    let response = match method.as_str() {
        "chat.postMessage" => {
            let idx = state.posted;
            state.posted += 1;
            if state.fail_post_at == Some(idx) {
                failure("msg_too_long")
            } else {
                json!({
                    "ok": true,
                    "channel": params["channel"],
                    "ts": format!("1700000000.00010{idx}"),
                    "message": { "text": params["text"] },
                })
            }
        },
        "conversations.create" => match state.create_error.clone() {
            Some(code) => failure(&code),
            None => json!({ "ok": true, "channel": channel("CNEW", params["name"].as_str().unwrap_or_default()) }),
        },
        "conversations.list" => {
            let page = params["cursor"]
                .as_str()
                .and_then(|c| c.strip_prefix("page-"))
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or(0);
            let channels = state.pages.get(page).cloned().unwrap_or_default();
            let next_cursor = if let Some(stuck) = &state.stuck_cursor {
                stuck.clone()
            } else if state.endless_pages || page + 1 < state.pages.len() {
                format!("page-{}", page + 1)
            } else {
                String::new()
            };
            json!({
                "ok": true,
                "channels": channels,
                "response_metadata": { "next_cursor": next_cursor },
            })
        },
        "conversations.join" => match state.join_error.clone() {
            Some(code) => failure(&code),
            None => json!({ "ok": true, "channel": channel(params["channel"].as_str().unwrap_or_default(), "joined") }),
        },
        "conversations.replies" => {
            if state.fail_replies > 0 {
                state.fail_replies -= 1;
                failure("ratelimited")
            } else {
                state.replies_calls += 1;
                let mut messages = vec![json!({ "ts": params["ts"], "text": "parent" })];
                if state.replies_calls > state.replies_after {
                    messages.extend(state.replies.iter().cloned());
                }
                json!({ "ok": true, "messages": messages })
            }
        },
        _ => failure("unknown_method"),
    };
    Json(response)
}
