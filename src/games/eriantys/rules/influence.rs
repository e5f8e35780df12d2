//! Island control: influence scores, conquest and merging.

use crate::games::eriantys::board::{IslandId, Island};
use crate::games::eriantys::game::{Game, TurnModifiers};
use crate::games::eriantys::player::Player;
use crate::games::eriantys::types::TowerColor;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// What happened when an island was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// A veto tile blocked the recomputation and went back to the pool.
    Vetoed {
        /// The vetoed island.
        island: IslandId,
    },
    /// Ownership did not change.
    Unchanged {
        /// The resolved island.
        island: IslandId,
    },
    /// The acting player took the island.
    Conquered {
        /// Id of the (possibly merged) island.
        island: IslandId,
        /// The new owner.
        owner: TowerColor,
        /// The previous owner, if any.
        previous: Option<TowerColor>,
        /// Islands left on the ring after merging.
        islands: usize,
    },
}

/// Influence of `player` on `island` under the current modifiers.
///
/// Counts students of every color whose professor the player holds, plus
/// one per tower the player has there. The acting player adds the KNIGHT
/// bonus.
pub fn influence(
    island: &Island,
    player: &Player,
    modifiers: &TurnModifiers,
    acting: bool,
) -> u32 {
    let students: u32 = player
        .school()
        .professor_colors()
        .into_iter()
        .filter(|color| Some(*color) != *modifiers.excluded_color())
        .map(|color| island.students().count(color))
        .sum();
    let towers = match island.owner() {
        Some(owner) if owner == player.tower_color() && !modifiers.towers_exempt() => *island.size(),
        _ => 0,
    };
    let bonus = if acting { *modifiers.influence_bonus() } else { 0 };
    students + towers + bonus
}

impl Game {
    /// Recomputes ownership of the island at ring `index` for `actor`.
    ///
    /// Only the acting player and the current owner compete; equal scores
    /// leave the island as it is.
    #[instrument(skip(self))]
    pub(crate) fn resolve_island(&mut self, index: usize, actor: &str) -> Resolution {
        let Some(island) = self.archipelago.get(index) else {
            return Resolution::Unchanged { island: index };
        };
        let id = *island.id();

        if island.has_veto() {
            if let Some(island) = self.archipelago.get_mut(index) {
                island.vetoes -= 1;
            }
            self.veto_tiles += 1;
            info!(island = id, "Veto tile consumed");
            return Resolution::Vetoed { island: id };
        }

        let Some(challenger) = self.player(actor) else {
            return Resolution::Unchanged { island: id };
        };
        let previous = *island.owner();
        if previous == Some(*challenger.tower_color()) {
            return Resolution::Unchanged { island: id };
        }

        let attack = influence(island, challenger, &self.modifiers, true);
        let defence = previous
            .and_then(|owner| self.players.iter().find(|p| *p.tower_color() == owner))
            .map(|owner| influence(island, owner, &self.modifiers, false))
            .unwrap_or(0);
        debug!(island = id, attack, defence, "Influence computed");
        if attack <= defence {
            return Resolution::Unchanged { island: id };
        }

        let owner = *challenger.tower_color();
        let size = *island.size();
        for player in self.players.iter_mut() {
            if Some(*player.tower_color()) == previous {
                player.school.towers += size;
            } else if *player.tower_color() == owner {
                player.school.towers = player.school.towers.saturating_sub(size);
            }
        }
        if let Some(island) = self.archipelago.get_mut(index) {
            island.owner = Some(owner);
        }
        let merged = self.archipelago.merge_around(index);
        let island = self.archipelago.get(merged).map(|i| *i.id()).unwrap_or(id);
        info!(island, %owner, ?previous, islands = self.archipelago.len(), "Island conquered");
        Resolution::Conquered {
            island,
            owner,
            previous,
            islands: self.archipelago.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleVariant;
    use crate::games::eriantys::game::tests::two_player_game;
    use crate::games::eriantys::types::Color;

    fn game_with_red_island() -> Game {
        let mut game = two_player_game(RuleVariant::Base);
        let island = game.archipelago.get_mut(3).unwrap();
        island.students = Default::default();
        island.students.add(Color::Red, 2);
        game
    }

    #[test]
    fn test_equal_scores_leave_island_unowned() {
        let mut game = game_with_red_island();
        assert_eq!(
            game.resolve_island(3, "ludo"),
            Resolution::Unchanged { island: 4 }
        );
        assert_eq!(game.archipelago.get(3).unwrap().owner(), &None);
    }

    #[test]
    fn test_conquest_places_towers() {
        let mut game = game_with_red_island();
        game.players[0].school.set_professor(Color::Red, true);
        let resolution = game.resolve_island(3, "ludo");
        assert!(matches!(
            resolution,
            Resolution::Conquered { owner: TowerColor::White, previous: None, .. }
        ));
        assert_eq!(*game.players[0].school().towers(), 7);
    }

    #[test]
    fn test_defender_towers_count_and_return_on_loss() {
        let mut game = game_with_red_island();
        game.players[0].school.set_professor(Color::Red, true);
        game.resolve_island(3, "ludo");

        // lea's 2 red only tie ludo's blue student plus tower
        game.players[0].school.set_professor(Color::Red, false);
        game.players[1].school.set_professor(Color::Red, true);
        game.players[0].school.set_professor(Color::Blue, true);
        game.archipelago.get_mut(3).unwrap().students.add(Color::Blue, 1);
        assert!(matches!(
            game.resolve_island(3, "lea"),
            Resolution::Unchanged { .. }
        ));

        game.archipelago.get_mut(3).unwrap().students.add(Color::Red, 1);
        assert!(matches!(
            game.resolve_island(3, "lea"),
            Resolution::Conquered { owner: TowerColor::Black, previous: Some(TowerColor::White), .. }
        ));
        assert_eq!(*game.players[0].school().towers(), 8);
        assert_eq!(*game.players[1].school().towers(), 7);
    }

    #[test]
    fn test_veto_blocks_and_returns_to_pool() {
        let mut game = game_with_red_island();
        game.players[0].school.set_professor(Color::Red, true);
        game.archipelago.get_mut(3).unwrap().vetoes = 1;
        game.veto_tiles = 3;
        assert_eq!(game.resolve_island(3, "ludo"), Resolution::Vetoed { island: 4 });
        assert_eq!(game.veto_tiles, 4);
        assert_eq!(game.archipelago.get(3).unwrap().owner(), &None);
        assert!(matches!(game.resolve_island(3, "ludo"), Resolution::Conquered { .. }));
    }

    #[test]
    fn test_towers_exempt_ignores_defender_towers() {
        let mut game = game_with_red_island();
        game.players[0].school.set_professor(Color::Red, true);
        game.resolve_island(3, "ludo");
        game.players[0].school.set_professor(Color::Red, false);
        game.players[1].school.set_professor(Color::Red, true);
        game.players[0].school.set_professor(Color::Blue, true);
        game.archipelago.get_mut(3).unwrap().students.add(Color::Blue, 1);
        assert!(matches!(game.resolve_island(3, "lea"), Resolution::Unchanged { .. }));

        game.modifiers.towers_exempt = true;
        assert!(matches!(
            game.resolve_island(3, "lea"),
            Resolution::Conquered { owner: TowerColor::Black, .. }
        ));
    }
}
