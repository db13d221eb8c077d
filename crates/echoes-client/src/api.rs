//! Remote action client for the game server.
//!
//! One method per server action. Each method performs exactly one HTTP
//! round trip: no retry, no caching, and no ordering between concurrent
//! calls. Failures are normalized into [`RemoteActionError`].
//!
//! The client does not care what the server does with an action -- it sends
//! the intent and expects a complete [`GameState`] back.

use echoes_types::{
    AllocateRequest, ChoiceRequest, ChoiceResponse, CombatAction, CombatActionRequest,
    EquipRequest, ErrorBody, GameState, ResetRequest, StatName,
};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ConfigError, RemoteActionError};

/// How a non-2xx response is explained to the caller.
#[derive(Debug, Clone, Copy)]
enum FailureDetail {
    /// Always use this message.
    Generic(&'static str),
    /// Use the server's `detail` field, falling back to this message.
    ServerOr(&'static str),
}

/// HTTP client bound to one game server.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct GameClient {
    http: reqwest::Client,
    base_url: String,
}

impl GameClient {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_http(config.http_client()?, config.api_url.clone()))
    }

    /// Create a client around an existing HTTP client.
    ///
    /// `base_url` must not end with a slash.
    pub const fn with_http(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// The server base address.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of a server endpoint such as `/state` or `/log`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// `GET /state` -- the current snapshot.
    pub async fn fetch_state(&self) -> Result<GameState, RemoteActionError> {
        let url = self.endpoint("/state");
        self.exchange(
            self.http.get(&url),
            &url,
            FailureDetail::Generic("Failed to fetch game state"),
        )
        .await
    }

    /// `POST /choice` -- select a choice by its server-assigned `_index`.
    ///
    /// The index is only meaningful against the snapshot that carried it;
    /// the server decides whether it is valid.
    pub async fn submit_choice(&self, choice_index: u32) -> Result<GameState, RemoteActionError> {
        let url = self.endpoint("/choice");
        let response: ChoiceResponse = self
            .exchange(
                self.http.post(&url).json(&ChoiceRequest { choice_index }),
                &url,
                FailureDetail::ServerOr("Failed to make choice"),
            )
            .await?;
        debug!(
            choice_index,
            success = response.success,
            message = response.message.as_deref().unwrap_or_default(),
            next_node = response.next_node.as_deref().unwrap_or_default(),
            effects = %response.effects,
            "choice accepted"
        );
        Ok(response.new_state)
    }

    /// `POST /allocate` -- spend one free stat point.
    pub async fn allocate_stat(&self, stat_name: StatName) -> Result<GameState, RemoteActionError> {
        let url = self.endpoint("/allocate");
        self.exchange(
            self.http.post(&url).json(&AllocateRequest { stat_name }),
            &url,
            FailureDetail::ServerOr("Failed to allocate stat"),
        )
        .await
    }

    /// `POST /reset` -- wipe server-side progress and start over.
    pub async fn reset_game(&self) -> Result<GameState, RemoteActionError> {
        let url = self.endpoint("/reset");
        self.exchange(
            self.http.post(&url).json(&ResetRequest { confirm: true }),
            &url,
            FailureDetail::Generic("Failed to reset game"),
        )
        .await
    }

    /// `POST /combat/action` -- take a combat turn.
    pub async fn submit_combat_action(
        &self,
        action: CombatAction,
    ) -> Result<GameState, RemoteActionError> {
        let url = self.endpoint("/combat/action");
        self.exchange(
            self.http.post(&url).json(&CombatActionRequest { action }),
            &url,
            FailureDetail::ServerOr("Failed to perform action"),
        )
        .await
    }

    /// `POST /equip` -- equip an inventory item by position.
    ///
    /// The position refers to the inventory of the current snapshot; the
    /// server checks bounds and that the item is equipable.
    pub async fn equip_item(&self, item_index: u32) -> Result<GameState, RemoteActionError> {
        let url = self.endpoint("/equip");
        self.exchange(
            self.http.post(&url).json(&EquipRequest { item_index }),
            &url,
            FailureDetail::ServerOr("Failed to equip item"),
        )
        .await
    }

    /// `POST /debug/combat` -- start a test encounter.
    ///
    /// Not part of the production action surface. A non-2xx status or an
    /// empty body yields `Ok(None)`; only a missing response is an error.
    pub async fn debug_start_combat(&self) -> Result<Option<GameState>, RemoteActionError> {
        let url = self.endpoint("/debug/combat");
        let response = self.send(self.http.post(&url), &url).await?;

        let status = response.status();
        if !status.is_success() {
            debug!(url, status = status.as_u16(), "debug combat refused");
            return Ok(None);
        }

        let body = response.bytes().await.map_err(|e| RemoteActionError::Decode {
            status: status.as_u16(),
            detail: format!("Failed to read response body: {e}"),
        })?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice::<Option<GameState>>(&body).map_err(|e| RemoteActionError::Decode {
            status: status.as_u16(),
            detail: format!("Malformed game state: {e}"),
        })
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    /// Send a request, translating transport failures.
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, RemoteActionError> {
        debug!(url, "sending game action");
        request
            .send()
            .await
            .map_err(|e| RemoteActionError::connectivity(url, &e))
    }

    /// One full round trip: send, check status, decode the success body.
    async fn exchange<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
        failure: FailureDetail,
    ) -> Result<T, RemoteActionError> {
        let response = self.send(request, url).await?;
        let status = response.status();
        debug!(url, status = status.as_u16(), "game action answered");

        if !status.is_success() {
            return Err(rejection(response, failure).await);
        }

        let body = response.bytes().await.map_err(|e| RemoteActionError::Decode {
            status: status.as_u16(),
            detail: format!("Failed to read response body: {e}"),
        })?;
        serde_json::from_slice(&body).map_err(|e| RemoteActionError::Decode {
            status: status.as_u16(),
            detail: format!("Malformed response body: {e}"),
        })
    }
}

/// Turn a non-2xx response into [`RemoteActionError::Rejected`].
async fn rejection(response: Response, failure: FailureDetail) -> RemoteActionError {
    let status = response.status().as_u16();
    let detail = match failure {
        FailureDetail::Generic(message) => message.to_owned(),
        FailureDetail::ServerOr(fallback) => response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail_message())
            .unwrap_or_else(|| fallback.to_owned()),
    };
    RemoteActionError::Rejected { status, detail }
}
