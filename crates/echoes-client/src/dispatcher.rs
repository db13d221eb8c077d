//! Action dispatcher: user intents in, snapshot replacements out.
//!
//! Each intent maps to exactly one [`GameClient`] call. A successful call
//! replaces the store's snapshot with the server's; a failed call is
//! reported as an error-level diagnostic and the store is left alone. There
//! is no rollback and no retry -- the user may simply issue the intent
//! again.
//!
//! Dispatch is not composable. Intents issued while another is in flight
//! are neither queued nor cancelled; both requests run and the store keeps
//! whichever response completes last (see [`crate::store`]).

use echoes_types::{CombatAction, GameState, StatName};
use tracing::{debug, error, info};

use crate::api::GameClient;
use crate::error::RemoteActionError;
use crate::store::StateStore;

/// Question asked before a reset is sent.
pub const RESET_PROMPT: &str = "Are you sure you want to restart? Progress will be lost.";

/// A yes/no question put to the user.
pub trait ConfirmGate {
    /// Ask `prompt`; `true` means the user agreed.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> ConfirmGate for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// What a dispatch did. Presentation may ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The server's snapshot replaced the held one.
    Committed,
    /// The action failed and was reported; the snapshot is untouched.
    Failed,
    /// The user declined the confirmation; nothing was sent.
    Declined,
    /// The action completed without a snapshot to commit.
    Unchanged,
}

/// Binds user intents to remote actions and commits their results.
///
/// Cheap to clone, so each intent can run on its own task.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: GameClient,
    store: StateStore,
}

impl Dispatcher {
    /// Create a dispatcher over a client and the store it commits into.
    pub const fn new(client: GameClient, store: StateStore) -> Self {
        Self { client, store }
    }

    /// The store this dispatcher commits into.
    pub const fn store(&self) -> &StateStore {
        &self.store
    }

    /// The client this dispatcher sends through.
    pub const fn client(&self) -> &GameClient {
        &self.client
    }

    /// Select a story choice by its server-assigned `_index`.
    pub async fn choose(&self, choice_index: u32) -> DispatchOutcome {
        let result = self.client.submit_choice(choice_index).await;
        self.settle("choice", result)
    }

    /// Spend a free stat point on `stat`.
    pub async fn allocate(&self, stat: StatName) -> DispatchOutcome {
        let result = self.client.allocate_stat(stat).await;
        self.settle("allocate", result)
    }

    /// Restart the game after the user confirms through `gate`.
    ///
    /// Declining sends nothing.
    pub async fn reset(&self, mut gate: impl ConfirmGate) -> DispatchOutcome {
        if !gate.confirm(RESET_PROMPT) {
            info!("reset declined");
            return DispatchOutcome::Declined;
        }
        let result = self.client.reset_game().await;
        self.settle("reset", result)
    }

    /// Take a combat turn.
    pub async fn combat(&self, action: CombatAction) -> DispatchOutcome {
        let result = self.client.submit_combat_action(action).await;
        self.settle("combat", result)
    }

    /// Equip the inventory item at `item_index`.
    pub async fn equip(&self, item_index: u32) -> DispatchOutcome {
        let result = self.client.equip_item(item_index).await;
        self.settle("equip", result)
    }

    /// Start a test encounter. Every failure is swallowed.
    pub async fn debug_combat(&self) -> DispatchOutcome {
        match self.client.debug_start_combat().await {
            Ok(Some(state)) => self.commit("debug_combat", state),
            Ok(None) => DispatchOutcome::Unchanged,
            Err(e) => {
                debug!(error = %e, "debug combat unavailable");
                DispatchOutcome::Unchanged
            }
        }
    }

    fn settle(
        &self,
        action: &'static str,
        result: Result<GameState, RemoteActionError>,
    ) -> DispatchOutcome {
        match result {
            Ok(state) => self.commit(action, state),
            Err(e) => {
                error!(action, status = ?e.status(), error = %e, "game action failed");
                DispatchOutcome::Failed
            }
        }
    }

    fn commit(&self, action: &'static str, state: GameState) -> DispatchOutcome {
        let mode = state.mode;
        self.store.replace(state);
        debug!(
            action,
            %mode,
            generation = self.store.generation(),
            "snapshot committed"
        );
        DispatchOutcome::Committed
    }
}
