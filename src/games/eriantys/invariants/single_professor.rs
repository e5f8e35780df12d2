//! Single professor holder per color.

use super::Invariant;
use crate::games::eriantys::game::Game;
use crate::games::eriantys::types::Color;
use strum::IntoEnumIterator;

/// Invariant: at most one school holds each professor.
pub struct SingleProfessorInvariant;

impl Invariant<Game> for SingleProfessorInvariant {
    fn holds(game: &Game) -> bool {
        Color::iter().all(|color| {
            game.players()
                .iter()
                .filter(|p| p.school().has_professor(color))
                .count()
                <= 1
        })
    }

    fn description() -> &'static str {
        "Each professor is held by at most one player"
    }
}
