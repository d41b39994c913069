//! In-process Bot API double for adapter tests.
//!
//! `getUpdates` models the real queue: a positive offset confirms (drops)
//! every older update, `offset=-1` keeps only the newest one, and an empty
//! result blocks for the requested long-poll timeout.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use {
    axum::{Json, Router, extract::State, http::Uri, routing::post},
    secrecy::Secret,
    serde_json::{Value, json},
    tokio::sync::oneshot,
};

use crate::{config::TelegramAccountConfig, poll::PollSettings};

#[derive(Default)]
pub(crate) struct MockState {
    /// Pending updates, oldest first.
    pub queue: Vec<Value>,
    /// Updates that arrive right after the session learns its offset.
    pub arrivals: Vec<Value>,
    /// Number of `offset=-1` calls to fail before succeeding.
    pub fail_latest: usize,
    /// Zero-based `sendMessage` call to reject.
    pub fail_send_at: Option<usize>,
    pub create_topic_error: Option<(i64, String)>,
    pub requests: Vec<(String, Value)>,
    sent: usize,
}

#[derive(Clone, Default)]
pub(crate) struct MockTelegram {
    pub state: Arc<Mutex<MockState>>,
}

pub(crate) struct MockServer {
    pub url: String,
    pub api: MockTelegram,
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
    pub fn config(&self) -> TelegramAccountConfig {
        TelegramAccountConfig {
            poll: PollSettings {
                long_poll: Duration::from_secs(1),
                backoff: Duration::from_millis(50),
            },
            ..TelegramAccountConfig::new(Secret::new("123:TEST".into())).with_api_url(&self.url)
        }
    }
}

impl MockTelegram {
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
            .map(|(_, body)| body.clone())
            .collect()
    }

    pub fn queued_ids(&self) -> Vec<i64> {
        self.state
            .lock()
            .expect("lock state")
            .queue
            .iter()
            .map(|u| u["update_id"].as_i64().unwrap())
            .collect()
    }

    pub async fn serve(self) -> MockServer {
        let app = Router::new()
            .route("/{*path}", post(handler))
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
                .expect("serve mock telegram api");
        });
        MockServer {
            url: format!("http://{addr}"),
            api: self,
            shutdown: Some(shutdown_tx),
        }
    }
}

pub(crate) fn text_update(id: i64, chat: i64, topic: Option<i64>, text: &str) -> Value {
    json!({
        "update_id": id,
        "message": {
            "message_id": id * 10,
            "chat": { "id": chat, "type": "supergroup" },
            "message_thread_id": topic,
            "text": text,
        }
    })
}

async fn handler(
    State(api): State<MockTelegram>,
    uri: Uri,
    Json(body): Json<Value>,
) -> Json<Value> {
    let method = uri.path().rsplit('/').next().unwrap_or_default().to_string();
    let (response, wait) = {
        let mut state = api.state.lock().expect("lock state");
        state.requests.push((method.clone(), body.clone()));
        match method.as_str() {
            "sendMessage" => {
                let idx = state.sent;
                state.sent += 1;
                if state.fail_send_at == Some(idx) {
                    (
                        json!({
                            "ok": false,
                            "error_code": 400,
                            "description": "Bad Request: can't parse entities",
                        }),
                        None,
                    )
                } else {
                    (
                        json!({
                            "ok": true,
                            "result": {
                                "message_id": 100 + idx as i64,
                                "chat": { "id": -1001, "type": "supergroup" },
                                "text": body["text"],
                            }
                        }),
                        None,
                    )
                }
            },
            "createForumTopic" => match state.create_topic_error.clone() {
                Some((code, description)) => (
                    json!({ "ok": false, "error_code": code, "description": description }),
                    None,
                ),
                None => (
                    json!({
                        "ok": true,
                        "result": { "message_thread_id": 77, "name": body["name"] },
                    }),
                    None,
                ),
            },
            "getUpdates" => {
                let offset = body["offset"].as_i64().unwrap_or(0);
                if offset == -1 {
                    if state.fail_latest > 0 {
                        state.fail_latest -= 1;
                        (
                            json!({ "ok": false, "error_code": 502, "description": "Bad Gateway" }),
                            None,
                        )
                    } else {
                        let last: Vec<Value> = state.queue.last().cloned().into_iter().collect();
                        state.queue = last.clone();
                        let arrivals = std::mem::take(&mut state.arrivals);
                        state.queue.extend(arrivals);
                        (json!({ "ok": true, "result": last }), None)
                    }
                } else {
                    if offset > 0 {
                        state
                            .queue
                            .retain(|u| u["update_id"].as_i64().unwrap_or(0) >= offset);
                    }
                    let limit = body["limit"].as_u64().map_or(100, |l| l as usize);
                    let result: Vec<Value> = state.queue.iter().take(limit).cloned().collect();
                    let wait = result
                        .is_empty()
                        .then(|| Duration::from_secs(body["timeout"].as_u64().unwrap_or(0)));
                    (json!({ "ok": true, "result": result }), wait)
                }
            },
            _ => (
                json!({ "ok": false, "error_code": 404, "description": "Not Found" }),
                None,
            ),
        }
    };
    if let Some(wait) = wait {
        tokio::time::sleep(wait).await;
    }
    Json(response)
}
