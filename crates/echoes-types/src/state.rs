//! The game snapshot served by the game server.
//!
//! [`GameState`] is the single authoritative snapshot the client renders.
//! Every successful action response carries a complete replacement; the
//! client never edits one of these values in place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Snapshot fields outside the typed model.
///
/// Every snapshot struct carries one so a stored snapshot re-encodes to
/// exactly what the server sent.
pub type Extra = BTreeMap<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Which sub-state of a [`GameState`] is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "UPPERCASE")]
pub enum GameMode {
    /// Narrative scene with selectable choices.
    Story,
    /// Turn-based fight against a single enemy.
    Combat,
}

impl GameMode {
    /// Wire representation (`STORY` or `COMBAT`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Story => "STORY",
            Self::Combat => "COMBAT",
        }
    }
}

impl core::fmt::Display for GameMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Complete server-authoritative game state at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameState {
    /// Current mode.
    pub mode: GameMode,
    /// Current scene. Meaningful in [`GameMode::Story`].
    #[serde(default)]
    pub narrative: Option<Narrative>,
    /// Current fight. Meaningful in [`GameMode::Combat`].
    #[serde(default)]
    pub combat: Option<CombatState>,
    /// The player character.
    pub player: Player,
    /// Server fields this client does not model, kept verbatim.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Extra,
}

impl GameState {
    /// Choices of the current scene, or an empty slice outside story mode.
    pub fn choices(&self) -> &[Choice] {
        match (self.mode, &self.narrative) {
            (GameMode::Story, Some(narrative)) => &narrative.choices,
            _ => &[],
        }
    }

    /// The fight in progress, if the snapshot is in combat mode.
    pub const fn active_combat(&self) -> Option<&CombatState> {
        match (self.mode, &self.combat) {
            (GameMode::Combat, Some(combat)) => Some(combat),
            _ => None,
        }
    }
}

/// A narrative scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Narrative {
    /// Server node identifier for the scene, when the server sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    /// Scene text.
    pub text: String,
    /// Choices available in this scene, in display order.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Server fields this client does not model, kept verbatim.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Extra,
}

/// One selectable option of a scene.
///
/// `index` is assigned by the server and is only valid against the
/// snapshot that carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Choice {
    /// Display text.
    pub label: String,
    /// Server-assigned position within the current turn.
    #[serde(rename = "_index")]
    pub index: u32,
    /// Server fields this client does not model, kept verbatim.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Extra,
}

/// An ongoing fight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CombatState {
    /// The opponent.
    pub enemy: Enemy,
    /// Combat log, oldest entry first.
    #[serde(default)]
    pub log: Vec<String>,
    /// Server fields this client does not model, kept verbatim.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Extra,
}

/// The opponent in a fight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Enemy {
    /// Display name.
    pub name: String,
    /// Current hit points.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Server fields this client does not model, kept verbatim.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Extra,
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Leveled attributes.
    #[serde(default)]
    pub stats: PlayerStats,
    /// Carried items, in server order.
    #[serde(default)]
    pub inventory: Vec<Item>,
    /// Equipped items. Absent on the wire means every slot is empty.
    #[serde(default)]
    pub equipment: Equipment,
    /// Story flags set by the server. Opaque to the client.
    #[serde(default)]
    pub flags: BTreeMap<String, serde_json::Value>,
    /// Server fields this client does not model, kept verbatim.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Extra,
}

impl Player {
    /// Inventory entries shown as quest items (key items and weapons).
    pub fn quest_items(&self) -> impl Iterator<Item = &Item> {
        self.inventory
            .iter()
            .filter(|item| matches!(item.kind, ItemKind::KeyItem | ItemKind::Weapon))
    }
}

/// Leveled attributes of the player.
///
/// Keys the server leaves out take the values a fresh character starts
/// with (see the [`Default`] impl).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(default)]
pub struct PlayerStats {
    /// Character level.
    pub level: u32,
    /// Accumulated experience.
    pub experience: u32,
    /// Current hit points.
    pub hp: i32,
    /// Current mana points.
    pub mp: i32,
    /// Strength attribute.
    pub strength: u32,
    /// Defence attribute.
    pub defence: u32,
    /// Agility attribute.
    pub agility: u32,
    /// Wisdom attribute.
    pub wisdom: u32,
    /// Vitality attribute.
    pub vitality: u32,
    /// Perception attribute.
    pub perception: u32,
    /// Unspent attribute points.
    pub free_stat_points: u32,
    /// Server fields this client does not model, kept verbatim.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Extra,
}

/// Baseline value of every attribute.
const BASE_ATTRIBUTE: u32 = 5;

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
            hp: 0,
            mp: 0,
            strength: BASE_ATTRIBUTE,
            defence: BASE_ATTRIBUTE,
            agility: BASE_ATTRIBUTE,
            wisdom: BASE_ATTRIBUTE,
            vitality: BASE_ATTRIBUTE,
            perception: BASE_ATTRIBUTE,
            free_stat_points: 0,
            extra: Extra::new(),
        }
    }
}

impl PlayerStats {
    /// Display maximum for hit points, derived from vitality.
    ///
    /// Presentation only. The server owns the real value.
    pub fn max_hp(&self) -> i64 {
        attribute_pool(50, self.vitality)
    }

    /// Display maximum for mana points, derived from wisdom.
    ///
    /// Presentation only. The server owns the real value.
    pub fn max_mp(&self) -> i64 {
        attribute_pool(25, self.wisdom)
    }
}

/// `base + (attribute - 5) * 5`, saturating.
fn attribute_pool(base: i64, attribute: u32) -> i64 {
    let offset = i64::from(attribute).saturating_sub(i64::from(BASE_ATTRIBUTE)).saturating_mul(5);
    base.saturating_add(offset)
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// An inventory or equipment item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Item {
    /// Display name.
    pub name: String,
    /// Item category. Unknown server categories are preserved verbatim.
    #[serde(rename = "type")]
    #[ts(type = "string")]
    pub kind: ItemKind,
    /// Server fields this client does not model, kept verbatim.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Extra,
}

/// Category of an [`Item`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemKind {
    /// Equips into the weapon slot.
    Weapon,
    /// Equips into the armor slot.
    Armor,
    /// Equips into the accessory slot.
    Accessory,
    /// Story item.
    KeyItem,
    /// Single-use item.
    Consumable,
    /// Any category this client does not know about.
    Other(String),
}

impl ItemKind {
    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Accessory => "accessory",
            Self::KeyItem => "key_item",
            Self::Consumable => "consumable",
            Self::Other(other) => other,
        }
    }

    /// The equipment slot this kind occupies, if it is equipable.
    pub const fn equip_slot(&self) -> Option<EquipSlot> {
        match self {
            Self::Weapon => Some(EquipSlot::Weapon),
            Self::Armor => Some(EquipSlot::Armor),
            Self::Accessory => Some(EquipSlot::Accessory),
            Self::KeyItem | Self::Consumable | Self::Other(_) => None,
        }
    }

    /// Whether items of this kind can be equipped.
    pub const fn is_equipable(&self) -> bool {
        self.equip_slot().is_some()
    }
}

impl From<String> for ItemKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "weapon" => Self::Weapon,
            "armor" => Self::Armor,
            "accessory" => Self::Accessory,
            "key_item" => Self::KeyItem,
            "consumable" => Self::Consumable,
            _ => Self::Other(value),
        }
    }
}

impl From<ItemKind> for String {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Other(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

impl core::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An equipment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    /// Weapon slot.
    Weapon,
    /// Armor slot.
    Armor,
    /// Accessory slot.
    Accessory,
}

impl EquipSlot {
    /// All slots in display order.
    pub const ALL: [Self; 3] = [Self::Weapon, Self::Armor, Self::Accessory];

    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Accessory => "accessory",
        }
    }
}

/// Equipped items by slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Equipment {
    /// Weapon slot.
    #[serde(default)]
    pub weapon: Option<Item>,
    /// Armor slot.
    #[serde(default)]
    pub armor: Option<Item>,
    /// Accessory slot.
    #[serde(default)]
    pub accessory: Option<Item>,
    /// Server fields this client does not model, kept verbatim.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Extra,
}

impl Equipment {
    /// The item in `slot`, if any.
    pub const fn slot(&self, slot: EquipSlot) -> Option<&Item> {
        match slot {
            EquipSlot::Weapon => self.weapon.as_ref(),
            EquipSlot::Armor => self.armor.as_ref(),
            EquipSlot::Accessory => self.accessory.as_ref(),
        }
    }
}
