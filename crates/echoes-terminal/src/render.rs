//! Text rendering of store views.
//!
//! Rendering is a pure function of the current [`StoreView`]; the terminal
//! redraws the whole screen on every snapshot replacement.

use core::fmt::{self, Display, Formatter};

use echoes_client::{LoadStatus, StoreView};
use echoes_types::{EquipSlot, GameMode, GameState, Item, PlayerStats};

/// Combat log lines shown per redraw.
const LOG_TAIL: usize = 5;

/// Renders a [`StoreView`].
pub struct Screen<'a>(pub &'a StoreView);

impl Display for Screen<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (&self.0.status, &self.0.game) {
            (LoadStatus::Loading, _) => writeln!(f, "Loading..."),
            (LoadStatus::Errored(cause), _) => {
                writeln!(f, "Error: {cause}")?;
                writeln!(f, "Press enter to retry, or type `quit`.")
            }
            (LoadStatus::Ready, Some(game)) => write!(f, "{}", Scene(game)),
            (LoadStatus::Ready, None) => writeln!(f, "No game loaded."),
        }
    }
}

/// Renders one snapshot: the active mode, then the character sheet.
struct Scene<'a>(&'a GameState);

impl Display for Scene<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let game = self.0;
        writeln!(f, "===== {} =====", game.mode)?;

        match game.mode {
            GameMode::Story => {
                if let Some(narrative) = &game.narrative {
                    writeln!(f, "{}", narrative.text)?;
                }
                for choice in game.choices() {
                    writeln!(f, "  [{}] {}", choice.index, choice.label)?;
                }
            }
            GameMode::Combat => match game.active_combat() {
                Some(combat) => {
                    let enemy = &combat.enemy;
                    writeln!(f, "{}  HP {}/{}", enemy.name, enemy.hp, enemy.max_hp)?;
                    let skip = combat.log.len().saturating_sub(LOG_TAIL);
                    for entry in combat.log.iter().skip(skip) {
                        writeln!(f, "  > {entry}")?;
                    }
                    writeln!(f, "  attack | defend")?;
                }
                None => writeln!(f, "(no enemy)")?,
            },
        }

        writeln!(f)?;
        write!(f, "{}", Sheet(&game.player.stats))?;

        writeln!(f, "Equipment:")?;
        for slot in EquipSlot::ALL {
            let name = game
                .player
                .equipment
                .slot(slot)
                .map_or("-", |item| item.name.as_str());
            writeln!(f, "  {:<9} {name}", slot.as_str())?;
        }

        writeln!(f, "Inventory:")?;
        if game.player.inventory.is_empty() {
            writeln!(f, "  (empty)")?;
        }
        for (position, item) in game.player.inventory.iter().enumerate() {
            writeln!(f, "  [{position}] {}", Entry(item))?;
        }

        let quest: Vec<&str> = game
            .player
            .quest_items()
            .map(|item| item.name.as_str())
            .collect();
        if !quest.is_empty() {
            writeln!(f, "Quest items: {}", quest.join(", "))?;
        }
        Ok(())
    }
}

/// Renders the character sheet.
struct Sheet<'a>(&'a PlayerStats);

impl Display for Sheet<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = self.0;
        writeln!(f, "Level {}  XP {}", s.level, s.experience)?;
        writeln!(f, "HP {}/{}  MP {}/{}", s.hp, s.max_hp(), s.mp, s.max_mp())?;
        writeln!(
            f,
            "STR {}  DEF {}  AGI {}  WIS {}  VIT {}  PER {}",
            s.strength, s.defence, s.agility, s.wisdom, s.vitality, s.perception
        )?;
        if s.free_stat_points > 0 {
            writeln!(f, "Free points: {} (allocate STAT)", s.free_stat_points)?;
        }
        Ok(())
    }
}

/// Renders one inventory entry.
struct Entry<'a>(&'a Item);

impl Display for Entry<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0.name, self.0.kind)?;
        if self.0.kind.is_equipable() {
            write!(f, "  equip")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;

    fn ready(game: serde_json::Value) -> StoreView {
        StoreView {
            status: LoadStatus::Ready,
            game: Some(Arc::new(serde_json::from_value(game).unwrap())),
            generation: 1,
        }
    }

    fn player(free: u32, inventory: serde_json::Value) -> serde_json::Value {
        json!({
            "stats": {
                "level": 3, "experience": 250, "hp": 40, "mp": 10,
                "strength": 8, "defence": 5, "agility": 5, "wisdom": 7,
                "vitality": 6, "perception": 5, "free_stat_points": free
            },
            "inventory": inventory,
            "equipment": {"weapon": {"name": "Rusty Sword", "type": "weapon"}}
        })
    }

    #[test]
    fn story_screen_lists_choices_by_server_index() {
        let view = ready(json!({
            "mode": "STORY",
            "narrative": {"text": "The road forks.", "choices": [
                {"label": "Left", "_index": 4},
                {"label": "Right", "_index": 7}
            ]},
            "player": player(2, json!([
                {"name": "Amulet", "type": "accessory"},
                {"name": "Old Key", "type": "key_item"}
            ]))
        }));

        let text = Screen(&view).to_string();
        assert!(text.contains("===== STORY ====="));
        assert!(text.contains("The road forks."));
        assert!(text.contains("[4] Left"));
        assert!(text.contains("[7] Right"));
        assert!(text.contains("HP 40/55  MP 10/35"));
        assert!(text.contains("Free points: 2"));
        assert!(text.contains("weapon    Rusty Sword"));
        assert!(text.contains("armor     -"));
        assert!(text.contains("[0] Amulet (accessory)  equip"));
        assert!(text.contains("[1] Old Key (key_item)\n"));
        assert!(text.contains("Quest items: Old Key"));
    }

    #[test]
    fn combat_screen_shows_enemy_and_recent_log() {
        let log: Vec<String> = (1..=7).map(|n| format!("turn {n}")).collect();
        let view = ready(json!({
            "mode": "COMBAT",
            "narrative": {"text": "stale", "choices": [{"label": "Stale", "_index": 0}]},
            "combat": {"enemy": {"name": "Goblin", "hp": 12, "max_hp": 20}, "log": log},
            "player": player(0, json!([]))
        }));

        let text = Screen(&view).to_string();
        assert!(text.contains("Goblin  HP 12/20"));
        assert!(!text.contains("turn 2\n"));
        assert!(text.contains("turn 3"));
        assert!(text.contains("turn 7"));
        assert!(!text.contains("Stale"));
        assert!(!text.contains("Free points"));
        assert!(text.contains("(empty)"));
    }

    #[test]
    fn lifecycle_screens() {
        let loading = StoreView {
            status: LoadStatus::Loading,
            game: None,
            generation: 0,
        };
        assert_eq!(Screen(&loading).to_string(), "Loading...\n");

        let errored = StoreView {
            status: LoadStatus::Errored("Failed to connect".to_owned()),
            game: None,
            generation: 0,
        };
        assert!(Screen(&errored).to_string().starts_with("Error: Failed to connect"));
    }
}
