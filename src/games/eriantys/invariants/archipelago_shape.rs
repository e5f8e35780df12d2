//! Archipelago shape: the ring only shrinks and mother nature stays on it.

use super::Invariant;
use crate::games::eriantys::game::Game;
use crate::games::eriantys::types::NUM_ISLANDS;

/// Invariant: 1 to 12 islands, mother nature on one of them, island
/// sizes adding up to the twelve original islands.
pub struct ArchipelagoShapeInvariant;

impl Invariant<Game> for ArchipelagoShapeInvariant {
    fn holds(game: &Game) -> bool {
        let ring = game.archipelago();
        let sizes: u32 = ring.islands().iter().map(|i| *i.size()).sum();
        (1..=NUM_ISLANDS).contains(&ring.len())
            && *ring.mother_nature() < ring.len()
            && sizes as usize == NUM_ISLANDS
    }

    fn description() -> &'static str {
        "The ring holds 1 to 12 islands with mother nature on one of them"
    }
}
