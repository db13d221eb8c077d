//! The single source of client truth: the current [`GameState`] snapshot.
//!
//! [`StateStore`] holds zero or one snapshot plus a load lifecycle. The
//! snapshot is only ever replaced wholesale: a new `Arc<GameState>` is
//! swapped into a [`tokio::sync::watch`] channel, so readers never observe
//! a half-applied update and presentation can await changes.
//!
//! # Ordering
//!
//! Replacements are last-writer-wins by completion time. When two actions
//! are in flight the store ends up with whichever response arrives last,
//! regardless of which action was issued first. Any single server snapshot
//! is valid, so this is accepted rather than prevented.

use std::sync::Arc;

use echoes_types::GameState;
use tokio::sync::watch;
use tracing::{error, info};

use crate::api::GameClient;
use crate::error::RemoteActionError;

/// Cause shown to the user when the initial load fails.
pub const BOOTSTRAP_FAILURE: &str = "Failed to connect to the game server. Is it running?";

/// Where the store is in its load lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// A load is in progress.
    Loading,
    /// A snapshot is held.
    Ready,
    /// The last load failed; carries a human-readable cause.
    Errored(String),
}

/// What presentation sees: lifecycle, snapshot, and replacement count.
#[derive(Debug, Clone)]
pub struct StoreView {
    /// Load lifecycle.
    pub status: LoadStatus,
    /// The current snapshot, if one has ever been loaded.
    pub game: Option<Arc<GameState>>,
    /// Number of snapshot replacements applied so far.
    pub generation: u64,
}

/// Holder of the current snapshot.
///
/// Cheap to clone; clones share the same snapshot.
#[derive(Debug, Clone)]
pub struct StateStore {
    tx: Arc<watch::Sender<StoreView>>,
}

impl StateStore {
    /// Create an empty store in the [`LoadStatus::Loading`] state.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(StoreView {
            status: LoadStatus::Loading,
            game: None,
            generation: 0,
        });
        Self { tx: Arc::new(tx) }
    }

    /// Load the current snapshot from the server.
    ///
    /// Moves to `Loading`, then to `Ready` with the fetched snapshot, or to
    /// `Errored` with [`BOOTSTRAP_FAILURE`]. A failed load leaves any held
    /// snapshot in place. The error is returned so the caller can offer a
    /// retry.
    pub async fn load(&self, client: &GameClient) -> Result<Arc<GameState>, RemoteActionError> {
        self.tx.send_modify(|view| view.status = LoadStatus::Loading);
        info!(server = client.base_url(), "loading game state");

        match client.fetch_state().await {
            Ok(state) => Ok(self.replace(state)),
            Err(e) => {
                error!(error = %e, status = ?e.status(), "failed to load game state");
                self.tx
                    .send_modify(|view| view.status = LoadStatus::Errored(BOOTSTRAP_FAILURE.to_owned()));
                Err(e)
            }
        }
    }

    /// Overwrite the held snapshot unconditionally and mark the store ready.
    pub fn replace(&self, snapshot: GameState) -> Arc<GameState> {
        let snapshot = Arc::new(snapshot);
        let stored = Arc::clone(&snapshot);
        self.tx.send_modify(move |view| {
            view.game = Some(stored);
            view.status = LoadStatus::Ready;
            view.generation = view.generation.saturating_add(1);
        });
        snapshot
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Option<Arc<GameState>> {
        self.tx.borrow().game.clone()
    }

    /// The current load status.
    pub fn status(&self) -> LoadStatus {
        self.tx.borrow().status.clone()
    }

    /// Number of replacements applied so far.
    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    /// A copy of everything presentation needs.
    pub fn view(&self) -> StoreView {
        self.tx.borrow().clone()
    }

    /// Subscribe to changes. The receiver is notified on every transition.
    pub fn subscribe(&self) -> watch::Receiver<StoreView> {
        self.tx.subscribe()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
