//! In-process mock game server shared by the integration tests.
//!
//! Every request is recorded. Replies are configured per `METHOD path`
//! with a status, an optional JSON body, and an optional delay; anything
//! unconfigured answers `404`.

#![allow(clippy::unwrap_used, dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use echoes_client::GameClient;
use echoes_types::GameState;
use serde_json::{Value, json};

/// A request the mock server received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// A canned reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Option<Value>,
    pub delay: Duration,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16, body: Option<Value>) -> Self {
        Self {
            status,
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<Recorded>>,
    replies: Mutex<HashMap<String, Reply>>,
}

/// A running mock server.
pub struct MockServer {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockServer {
    /// Bind to an ephemeral port and start serving on the current runtime.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> GameClient {
        GameClient::with_http(reqwest::Client::new(), self.base_url())
    }

    /// Configure the reply for `method path`.
    pub fn reply(&self, method: Method, path: &str, reply: Reply) {
        self.state
            .replies
            .lock()
            .unwrap()
            .insert(format!("{method} {path}"), reply);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Poll until `count` requests to `path` have arrived or `timeout` passes.
    pub async fn wait_for(&self, path: &str, count: usize, timeout: Duration) -> Vec<Recorded> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let seen = self.requests_to(path);
            if seen.len() >= count || tokio::time::Instant::now() >= deadline {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let path = uri.path().to_owned();
    state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        body: serde_json::from_slice(&body).ok(),
    });

    let reply = state
        .replies
        .lock()
        .unwrap()
        .get(&format!("{method} {path}"))
        .cloned();
    let Some(reply) = reply else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    let status = StatusCode::from_u16(reply.status).unwrap();
    match reply.body {
        Some(body) => (status, axum::Json(body)).into_response(),
        None => status.into_response(),
    }
}

/// An address nothing listens on.
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Snapshot fixtures
// ---------------------------------------------------------------------------

pub fn stats_json(free_stat_points: u32) -> Value {
    json!({
        "level": 2, "experience": 120, "hp": 48, "mp": 20,
        "strength": 7, "defence": 5, "agility": 6, "wisdom": 5,
        "vitality": 5, "perception": 4, "free_stat_points": free_stat_points
    })
}

pub fn story_json(free_stat_points: u32) -> Value {
    json!({
        "mode": "STORY",
        "narrative": {
            "node_id": "crossroads",
            "text": "A goblin blocks the road.",
            "choices": [
                {"label": "Flee", "_index": 0},
                {"label": "Fight", "_index": 1}
            ]
        },
        "combat": null,
        "player": {
            "stats": stats_json(free_stat_points),
            "inventory": [
                {"name": "Rusty Sword", "type": "weapon"},
                {"name": "Healing Herb", "type": "consumable"}
            ],
            "equipment": {"weapon": null, "armor": null, "accessory": null},
            "flags": {}
        }
    })
}

pub fn combat_json(enemy: &str, hp: i32, log: &[&str]) -> Value {
    json!({
        "mode": "COMBAT",
        "narrative": null,
        "combat": {
            "enemy": {"name": enemy, "hp": hp, "max_hp": 20},
            "log": log
        },
        "player": {
            "stats": stats_json(0),
            "inventory": [],
            "equipment": {
                "weapon": {"name": "Rusty Sword", "type": "weapon"},
                "armor": null,
                "accessory": null
            },
            "flags": {"saw_goblin": true}
        }
    })
}

pub fn state_from(value: Value) -> GameState {
    serde_json::from_value(value).unwrap()
}
