//! Local stand-in for the Telegram Bot API

use crate::config::TelegramConfig;
use axum::{extract::Path, routing::post, Json, Router};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_TOKEN: &str = "123:test-token";

type Calls = Arc<Mutex<Vec<(String, Value)>>>;
type Responses = Arc<Mutex<HashMap<String, VecDeque<Value>>>>;

/// Records every method call and answers from per-method response queues.
///
/// Methods without a queued response answer `{"ok": true, "result": true}`,
/// except `getUpdates`, which waits briefly and returns no updates.
pub struct FakeBotApi {
    base: String,
    calls: Calls,
    responses: Responses,
}

impl FakeBotApi {
    pub async fn spawn() -> Self {
        let calls: Calls = Arc::default();
        let responses: Responses = Arc::default();
        let (calls_in, responses_in) = (calls.clone(), responses.clone());

        let app = Router::new().route(
            "/:bot/:method",
            post(
                move |Path((_bot, method)): Path<(String, String)>, Json(body): Json<Value>| {
                    let calls = calls_in.clone();
                    let responses = responses_in.clone();
                    async move {
                        calls.lock().unwrap().push((method.clone(), body));
                        let queued = responses
                            .lock()
                            .unwrap()
                            .get_mut(&method)
                            .and_then(VecDeque::pop_front);
                        let reply = match queued {
                            Some(reply) => reply,
                            None if method == "getUpdates" => {
                                tokio::time::sleep(Duration::from_millis(20)).await;
                                json!({"ok": true, "result": []})
                            }
                            None => json!({"ok": true, "result": true}),
                        };
                        Json(reply)
                    }
                },
            ),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            calls,
            responses,
        }
    }

    pub fn config(&self) -> TelegramConfig {
        TelegramConfig {
            token: TEST_TOKEN.to_string(),
            api_base: self.base.clone(),
        }
    }

    /// Queue a reply for the next call to `method`
    pub fn respond(&self, method: &str, reply: Value) {
        self.responses
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, body)| body)
            .collect()
    }
}
