//! Parsing typed lines into user intents.

use echoes_types::{CombatAction, StatName, UnknownName};

/// One line of user input, understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `choose N` or a bare number: pick the choice with server index `N`.
    Choose(u32),
    /// `allocate STAT`: spend a free point.
    Allocate(StatName),
    /// `attack` or `defend`.
    Combat(CombatAction),
    /// `equip N`: equip inventory position `N`.
    Equip(u32),
    /// `debug`: start a test encounter.
    DebugCombat,
    /// `reset`: restart after confirmation.
    Reset,
    /// `help`.
    Help,
    /// `quit` or `exit`.
    Quit,
}

/// Why a line was not understood.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    /// Nothing was typed.
    #[error("empty command")]
    Empty,
    /// The first word is not a command.
    #[error("unknown command `{0}`, type `help`")]
    Unknown(String),
    /// The command needs an argument that was not given.
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    /// A number was expected.
    #[error("`{0}` is not a valid number")]
    NotANumber(String),
    /// A stat name was expected.
    #[error("{0}")]
    UnknownStat(#[from] UnknownName),
}

/// Usage text printed by `help`.
pub const HELP: &str = "\
Commands:
  choose N | N     pick a story choice
  allocate STAT    spend a free point (str, def, agi, wis, vit, per, hp, mp)
  attack | defend  take a combat turn
  equip N          equip inventory item N
  reset            restart the game
  debug            start a test fight
  help             show this text
  quit             leave";

impl core::str::FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };
        let head = head.to_ascii_lowercase();

        match head.as_str() {
            "choose" | "c" => number(words.next(), "choose").map(Self::Choose),
            "allocate" | "a" => {
                let stat = words.next().ok_or(CommandError::MissingArgument("allocate"))?;
                Ok(Self::Allocate(stat.parse()?))
            }
            "equip" | "e" => number(words.next(), "equip").map(Self::Equip),
            "debug" => Ok(Self::DebugCombat),
            "reset" => Ok(Self::Reset),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => {
                if let Ok(action) = other.parse::<CombatAction>() {
                    return Ok(Self::Combat(action));
                }
                other
                    .parse::<u32>()
                    .map(Self::Choose)
                    .map_err(|_parse| CommandError::Unknown(other.to_owned()))
            }
        }
    }
}

fn number(word: Option<&str>, command: &'static str) -> Result<u32, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument(command))?;
    word.parse()
        .map_err(|_parse| CommandError::NotANumber(word.to_owned()))
}

/// Whether a confirmation answer means yes.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
