//! Session configuration, fixed when the session is created.

use crate::games::eriantys::CharacterId;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Number of seats in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlayerCount {
    /// Two players.
    #[display("2")]
    Two,
    /// Three players.
    #[display("3")]
    Three,
}

impl PlayerCount {
    /// Number of seats as a plain integer.
    pub fn get(self) -> usize {
        match self {
            PlayerCount::Two => 2,
            PlayerCount::Three => 3,
        }
    }
}

impl TryFrom<u8> for PlayerCount {
    type Error = ConfigError;

    #[track_caller]
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(PlayerCount::Two),
            3 => Ok(PlayerCount::Three),
            other => Err(ConfigError::new(format!(
                "Sessions seat 2 or 3 players, not {}",
                other
            ))),
        }
    }
}

impl From<PlayerCount> for u8 {
    fn from(count: PlayerCount) -> Self {
        count.get() as u8
    }
}

/// Rule set of a session.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RuleVariant {
    /// Base rules.
    #[default]
    Base,
    /// Expert rules: coins and character cards.
    Expert,
}

/// Configuration of one session.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct SessionConfig {
    /// Seats in the session.
    #[serde(default = "default_players")]
    players: PlayerCount,

    /// Base or expert rules.
    #[serde(default)]
    variant: RuleVariant,

    /// Rounds before the game ends on its own.
    #[serde(default = "default_max_rounds")]
    max_rounds: u32,

    /// Base mother nature step limit.
    #[serde(default = "default_max_steps")]
    max_steps: usize,

    /// Seed for the bag; random when absent.
    #[serde(default)]
    #[setters(strip_option)]
    seed: Option<u64>,

    /// Character cards to put in play (expert rules); random when absent.
    #[serde(default)]
    #[setters(strip_option)]
    characters: Option<Vec<CharacterId>>,
}

fn default_players() -> PlayerCount {
    PlayerCount::Two
}

fn default_max_rounds() -> u32 {
    10
}

fn default_max_steps() -> usize {
    5
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(default_players())
    }
}

impl SessionConfig {
    /// Creates a base-rules configuration for the given seat count.
    #[instrument]
    pub fn new(players: PlayerCount) -> Self {
        Self {
            players,
            variant: RuleVariant::default(),
            max_rounds: default_max_rounds(),
            max_steps: default_max_steps(),
            seed: None,
            characters: None,
        }
    }

    /// Checks if expert rules are enabled.
    pub fn is_expert(&self) -> bool {
        self.variant == RuleVariant::Expert
    }

    /// Loads and validates a configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading session config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!(players = %config.players, variant = %config.variant, "Session config loaded");
        Ok(config)
    }

    /// Checks the values that serde cannot.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rounds == 0 {
            warn!("Rejecting zero round limit");
            return Err(ConfigError::new("max_rounds must be at least 1".to_string()));
        }
        if self.max_steps == 0 {
            warn!("Rejecting zero step limit");
            return Err(ConfigError::new("max_steps must be at least 1".to_string()));
        }
        if let Some(characters) = &self.characters {
            let mut seen = characters.clone();
            seen.sort();
            seen.dedup();
            if characters.len() != crate::games::eriantys::CHARACTERS_IN_PLAY
                || seen.len() != characters.len()
            {
                warn!(?characters, "Rejecting character selection");
                return Err(ConfigError::new(format!(
                    "characters must list {} distinct cards",
                    crate::games::eriantys::CHARACTERS_IN_PLAY
                )));
            }
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_standard_rules() {
        let config = SessionConfig::default();
        assert_eq!(*config.players(), PlayerCount::Two);
        assert_eq!(*config.variant(), RuleVariant::Base);
        assert_eq!(*config.max_rounds(), 10);
        assert_eq!(*config.max_steps(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_player_count_outside_range_is_rejected() {
        assert!(PlayerCount::try_from(4).is_err());
        assert!(toml::from_str::<SessionConfig>("players = 1").is_err());
        let config: SessionConfig = toml::from_str("players = 3\nvariant = \"expert\"").unwrap();
        assert_eq!(*config.players(), PlayerCount::Three);
        assert!(config.is_expert());
    }

    #[test]
    fn test_duplicate_characters_are_rejected() {
        let config = SessionConfig::default().with_characters(vec![
            CharacterId::Monk,
            CharacterId::Monk,
            CharacterId::Thief,
        ]);
        assert!(config.validate().is_err());
    }
}
