//! Client runtime for Chronicles of the Echoes.
//!
//! The game's rules live on the server. This crate keeps the client a thin
//! reflector of server truth:
//!
//! - **[`GameClient`]** performs one HTTP round trip per game action
//! - **[`StateStore`]** holds the single current [`GameState`] snapshot and
//!   replaces it wholesale, never field by field
//! - **[`Dispatcher`]** maps user intents to actions, commits successes,
//!   and reports failures without touching state
//! - **[`Telemetry`]** captures error-level diagnostics, panics, and failed
//!   background tasks and forwards them to the server's `/log` sink
//!
//! # Architecture
//!
//! ```text
//! intent --> Dispatcher --> GameClient --> server
//!                |                           |
//!                | failure (error!)          | snapshot
//!                v                           v
//!            Telemetry --> POST /log      StateStore --> watchers
//! ```
//!
//! [`GameState`]: echoes_types::GameState

pub mod api;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod store;
pub mod telemetry;

// Re-export primary types for convenience.
pub use api::GameClient;
pub use config::ClientConfig;
pub use dispatcher::{ConfirmGate, DispatchOutcome, Dispatcher, RESET_PROMPT};
pub use error::{ConfigError, RemoteActionError, TelemetryError};
pub use store::{BOOTSTRAP_FAILURE, LoadStatus, StateStore, StoreView};
pub use telemetry::{BYPASS_TARGET, Telemetry, TelemetryLayer};
