//! Request and response bodies for the game server's action endpoints.
//!
//! Field names match the server contract literally. Index fields are
//! zero-based positions valid only against the snapshot that produced them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::state::GameState;

// ---------------------------------------------------------------------------
// Action vocabularies
// ---------------------------------------------------------------------------

/// An attribute that accepts free stat points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum StatName {
    /// Hit points.
    Hp,
    /// Mana points.
    Mp,
    /// Strength.
    Strength,
    /// Defence.
    Defence,
    /// Agility.
    Agility,
    /// Wisdom.
    Wisdom,
    /// Vitality.
    Vitality,
    /// Perception.
    Perception,
}

impl StatName {
    /// The attributes offered on the character sheet, in display order.
    pub const ATTRIBUTES: [Self; 6] = [
        Self::Strength,
        Self::Defence,
        Self::Agility,
        Self::Wisdom,
        Self::Vitality,
        Self::Perception,
    ];

    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hp => "hp",
            Self::Mp => "mp",
            Self::Strength => "strength",
            Self::Defence => "defence",
            Self::Agility => "agility",
            Self::Wisdom => "wisdom",
            Self::Vitality => "vitality",
            Self::Perception => "perception",
        }
    }
}

impl core::str::FromStr for StatName {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hp" => Ok(Self::Hp),
            "mp" => Ok(Self::Mp),
            "strength" | "str" => Ok(Self::Strength),
            "defence" | "defense" | "def" => Ok(Self::Defence),
            "agility" | "agi" => Ok(Self::Agility),
            "wisdom" | "wis" => Ok(Self::Wisdom),
            "vitality" | "vit" => Ok(Self::Vitality),
            "perception" | "per" => Ok(Self::Perception),
            _ => Err(UnknownName(s.to_owned())),
        }
    }
}

impl core::fmt::Display for StatName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A move available during combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum CombatAction {
    /// Strike the enemy.
    Attack,
    /// Brace for the enemy's next strike.
    Defend,
}

impl CombatAction {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Defend => "defend",
        }
    }
}

impl core::str::FromStr for CombatAction {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "attack" => Ok(Self::Attack),
            "defend" => Ok(Self::Defend),
            _ => Err(UnknownName(s.to_owned())),
        }
    }
}

impl core::fmt::Display for CombatAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name that does not match any variant of an action vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownName(pub String);

impl core::fmt::Display for UnknownName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown name: {}", self.0)
    }
}

impl std::error::Error for UnknownName {}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /choice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChoiceRequest {
    /// The `_index` of the selected choice.
    pub choice_index: u32,
}

/// Body of `POST /allocate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AllocateRequest {
    /// Attribute receiving the point.
    pub stat_name: StatName,
}

/// Body of `POST /reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResetRequest {
    /// Must be `true` for the server to wipe progress.
    pub confirm: bool,
}

/// Body of `POST /combat/action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CombatActionRequest {
    /// The move to perform.
    pub action: CombatAction,
}

/// Body of `POST /equip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EquipRequest {
    /// Position of the item in the current inventory.
    pub item_index: u32,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// Body of a successful `POST /choice`.
///
/// Only `new_state` is committed by the client; the rest is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChoiceResponse {
    /// Whether the server applied the choice.
    #[serde(default)]
    pub success: bool,
    /// Server message, usually the chosen label.
    #[serde(default)]
    pub message: Option<String>,
    /// Effects the choice triggered, as reported by the server.
    #[serde(default)]
    pub effects: serde_json::Value,
    /// Node the story moved to, if it moved.
    #[serde(default)]
    pub next_node: Option<String>,
    /// The replacement snapshot.
    pub new_state: GameState,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorBody {
    /// Server explanation. Usually a string; validation failures send a list.
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// The `detail` field as display text.
    ///
    /// Strings are returned as-is, other JSON values as compact JSON.
    /// `null` and empty strings count as absent.
    pub fn detail_message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
