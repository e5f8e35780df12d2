//! Turn order for the action phase.

use crate::games::eriantys::player::Player;
use tracing::{debug, instrument};

/// Sorts players by ascending weight of their card played this round.
///
/// The sort is stable and total, so applying it to an already sorted
/// sequence changes nothing. Players without a card keep their place
/// ahead of the others.
#[instrument(skip(players), fields(players = players.len()))]
pub fn sort_by_priority(players: &mut [Player]) {
    players.sort_by_key(|p| p.last_played().map(|card| card.weight()));
    debug!(
        order = ?players.iter().map(|p| p.nickname().as_str()).collect::<Vec<_>>(),
        "Turn order resolved"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::eriantys::{Assistant, TowerColor, Wizard};

    fn with_card(name: &str, wizard: Wizard, card: Assistant) -> Player {
        let mut player = Player::new(name.into(), wizard, TowerColor::White, 6, 0);
        player.play_assistant(card).unwrap();
        player
    }

    #[test]
    fn test_full_sort_not_single_swap() {
        let mut players = vec![
            with_card("a", Wizard::BlueWizard, Assistant::Turtle),
            with_card("b", Wizard::PinkWizard, Assistant::Fox),
            with_card("c", Wizard::GreenWizard, Assistant::Cheetah),
        ];
        sort_by_priority(&mut players);
        let names: Vec<String> = players.iter().map(|p| p.nickname().clone()).collect();
        assert_eq!(names, ["c", "b", "a"]);

        sort_by_priority(&mut players);
        let again: Vec<String> = players.iter().map(|p| p.nickname().clone()).collect();
        assert_eq!(again, names);
    }
}
