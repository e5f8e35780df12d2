//! End-of-game detection and winner resolution.

use crate::games::eriantys::game::Game;
use crate::games::eriantys::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Islands left on the ring at which the game ends.
pub const MIN_ISLANDS: usize = 3;

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EndReason {
    /// The acting player placed their last tower.
    OutOfTowers,
    /// The bag is empty.
    BagEmpty,
    /// Three or fewer islands are left.
    FewIslands,
    /// The last turn of the last round was played.
    LastRound,
}

/// Outcome of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Player won the game.
    Winner(PlayerId),
    /// No winner could be told apart.
    Tie,
}

impl Outcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<&PlayerId> {
        match self {
            Outcome::Winner(player) => Some(player),
            Outcome::Tie => None,
        }
    }

    /// Returns true if the game ended in a tie.
    pub fn is_tie(&self) -> bool {
        matches!(self, Outcome::Tie)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(player) => write!(f, "{} wins", player),
            Outcome::Tie => write!(f, "Tie"),
        }
    }
}

/// How and why a session terminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Termination {
    /// The condition that fired.
    pub reason: EndReason,
    /// Winner or tie.
    pub outcome: Outcome,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.outcome, self.reason)
    }
}

/// Checks the end conditions after `actor`'s turn, first match wins.
#[instrument(skip(game))]
pub fn check_end(
    game: &Game,
    actor: &str,
    last_in_order: bool,
    max_rounds: u32,
) -> Option<EndReason> {
    if game
        .player(actor)
        .is_some_and(|p| *p.school().towers() == 0)
    {
        return Some(EndReason::OutOfTowers);
    }
    if game.bag().is_empty() {
        return Some(EndReason::BagEmpty);
    }
    if game.archipelago().len() <= MIN_ISLANDS {
        return Some(EndReason::FewIslands);
    }
    if *game.round() >= max_rounds && last_in_order {
        return Some(EndReason::LastRound);
    }
    None
}

/// Fewest towers left wins; then most professors; otherwise a tie.
#[instrument(skip(players))]
pub fn resolve_winner(players: &[Player]) -> Outcome {
    let Some(fewest) = players.iter().map(|p| *p.school().towers()).min() else {
        return Outcome::Tie;
    };
    let leaders: Vec<&Player> = players
        .iter()
        .filter(|p| *p.school().towers() == fewest)
        .collect();
    let most = leaders
        .iter()
        .map(|p| p.school().professors())
        .max()
        .unwrap_or(0);
    let best: Vec<&&Player> = leaders
        .iter()
        .filter(|p| p.school().professors() == most)
        .collect();
    debug!(fewest, most, candidates = best.len(), "Resolving winner");
    match best.as_slice() {
        [single] => Outcome::Winner(single.nickname().clone()),
        _ => Outcome::Tie,
    }
}
