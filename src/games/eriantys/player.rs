//! Participants seated in a session.

use super::action::RuleViolation;
use super::assistant::Assistant;
use super::school::School;
use super::types::{TowerColor, Wizard};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Unique identifier (nickname) of a participant.
pub type PlayerId = String;

/// A participant: identity, hand of assistants, wallet and school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Player {
    nickname: PlayerId,
    wizard: Wizard,
    tower_color: TowerColor,
    hand: Vec<Assistant>,
    last_played: Option<Assistant>,
    pub(crate) coins: u32,
    pub(crate) school: School,
}

impl Player {
    /// Creates a player with a full hand and the given tower supply.
    #[instrument]
    pub fn new(
        nickname: PlayerId,
        wizard: Wizard,
        tower_color: TowerColor,
        towers: u32,
        coins: u32,
    ) -> Self {
        Self {
            nickname,
            wizard,
            tower_color,
            hand: Assistant::full_deck(),
            last_played: None,
            coins,
            school: School::new(towers),
        }
    }

    /// Plays an assistant from the hand.
    #[instrument(skip(self), fields(player = %self.nickname))]
    pub(crate) fn play_assistant(&mut self, card: Assistant) -> Result<(), RuleViolation> {
        let Some(position) = self.hand.iter().position(|c| *c == card) else {
            return Err(RuleViolation::CardNotInHand(card));
        };
        self.hand.remove(position);
        self.last_played = Some(card);
        Ok(())
    }

    /// Clears the card played this round; an emptied hand starts a new cycle.
    #[instrument(skip(self), fields(player = %self.nickname))]
    pub(crate) fn open_round(&mut self) {
        self.last_played = None;
        if self.hand.is_empty() {
            debug!("Hand exhausted, returning the full deck");
            self.hand = Assistant::full_deck();
        }
    }

    /// Pays a character cost from the wallet.
    pub(crate) fn pay(&mut self, cost: u32) -> bool {
        if self.coins < cost {
            return false;
        }
        self.coins -= cost;
        true
    }

    #[cfg(test)]
    pub(crate) fn set_hand(&mut self, hand: Vec<Assistant>) {
        self.hand = hand;
    }

    /// Drops the hand from a copy sent to another participant.
    pub(crate) fn conceal_hand(&mut self) {
        self.hand.clear();
    }
}
