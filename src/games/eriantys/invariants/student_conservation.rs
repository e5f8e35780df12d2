//! Student conservation: students are moved, never created or destroyed.

use super::Invariant;
use crate::games::eriantys::game::Game;
use crate::games::eriantys::types::{NUM_COLORS, STUDENTS_PER_COLOR};

/// Invariant: every student of the game is somewhere.
///
/// Bag, islands, clouds, entrances, tables and cards always add up to
/// 26 students per color once the board is set up.
pub struct StudentConservationInvariant;

impl Invariant<Game> for StudentConservationInvariant {
    fn holds(game: &Game) -> bool {
        *game.round() == 0 || game.students_in_play() == STUDENTS_PER_COLOR * NUM_COLORS as u32
    }

    fn description() -> &'static str {
        "Students in play always total 130"
    }
}
