//! Shared wire types for the Chronicles of the Echoes client runtime.
//!
//! This crate is the single source of truth for every JSON shape exchanged
//! with the game server. Types flow downstream to `TypeScript` via `ts-rs`
//! for web presentation layers.
//!
//! # Modules
//!
//! - [`state`] -- The [`GameState`] snapshot and everything it contains
//! - [`actions`] -- Action vocabularies and request/response bodies
//! - [`telemetry`] -- Diagnostic events forwarded to the `/log` sink

pub mod actions;
pub mod state;
pub mod telemetry;

// Re-export all public types at crate root for convenience.
pub use actions::{
    AllocateRequest, ChoiceRequest, ChoiceResponse, CombatAction, CombatActionRequest,
    EquipRequest, ErrorBody, ResetRequest, StatName, UnknownName,
};
pub use state::{
    Choice, CombatState, Enemy, EquipSlot, Equipment, Extra, GameMode, GameState, Item, ItemKind,
    Narrative, Player, PlayerStats,
};
pub use telemetry::{LogEvent, LogLevel};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        // Snapshot
        let _ = crate::state::GameMode::export_all();
        let _ = crate::state::GameState::export_all();
        let _ = crate::state::EquipSlot::export_all();

        // Actions
        let _ = crate::actions::StatName::export_all();
        let _ = crate::actions::CombatAction::export_all();
        let _ = crate::actions::ChoiceResponse::export_all();

        // Telemetry
        let _ = crate::telemetry::LogEvent::export_all();
    }
}
