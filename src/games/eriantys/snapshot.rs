//! Serializable view of the game model.

use super::board::{Archipelago, Cloud};
use super::characters::CharacterCard;
use super::game::{Game, TurnModifiers};
use super::player::Player;
use serde::{Deserialize, Serialize};

/// Everything a participant may see of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Current round, starting at 1.
    pub round: u32,
    /// Players in turn order.
    pub players: Vec<Player>,
    /// The island ring.
    pub archipelago: Archipelago,
    /// Clouds, by index.
    pub clouds: Vec<Cloud>,
    /// Students left in the bag.
    pub bag: u32,
    /// Character cards in play (expert rules).
    pub characters: Vec<CharacterCard>,
    /// Veto tiles not on the board.
    pub veto_tiles: u32,
    /// Modifiers in force this turn.
    pub modifiers: TurnModifiers,
}

impl GameSnapshot {
    /// The view of `viewer`: every other participant's hand is hidden.
    ///
    /// Played cards stay visible.
    pub fn concealed_for(mut self, viewer: &str) -> Self {
        self.players
            .iter_mut()
            .filter(|p| p.nickname() != viewer)
            .for_each(Player::conceal_hand);
        self
    }
}

impl From<&Game> for GameSnapshot {
    fn from(game: &Game) -> Self {
        Self {
            round: *game.round(),
            players: game.players().clone(),
            archipelago: game.archipelago().clone(),
            clouds: game.clouds().clone(),
            bag: game.bag().total(),
            characters: game.characters().clone(),
            veto_tiles: *game.veto_tiles(),
            modifiers: game.modifiers().clone(),
        }
    }
}
