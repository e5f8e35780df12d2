//! Character cards (expert rules) and their effects.
//!
//! Each card is a tagged [`Effect`] variant carrying only the parameters it
//! needs. [`Game::play_character`] charges the cost and dispatches the
//! effect; the controller clears the active flag when the turn ends.

use super::action::{ActionError, ResourceViolation, RuleViolation};
use super::board::IslandId;
use super::game::Game;
use super::types::{Color, StudentPool};
use derive_getters::Getters;
use derive_new::new;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Exchanges allowed per JESTER invocation.
const JESTER_SWAPS: usize = 3;
/// Exchanges allowed per MINSTREL invocation.
const MINSTREL_SWAPS: usize = 2;
/// Students THIEF takes from each table.
const THIEF_TAKES: u32 = 3;
/// Step limit bonus granted by MAGIC_MAILMAN.
const MAILMAN_STEPS: usize = 2;
/// Influence bonus granted by KNIGHT.
const KNIGHT_BONUS: u32 = 2;

/// Identifier of a character card. The discriminant is the card number.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::FromRepr,
)]
#[repr(u8)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum CharacterId {
    /// Move a student from the card to an island.
    Monk = 1,
    /// Take professors on ties.
    Farmer = 2,
    /// Resolve any island.
    Herald = 3,
    /// Two extra mother nature steps.
    MagicMailman = 4,
    /// Place a veto tile.
    GrandmaHerbs = 5,
    /// Towers do not count.
    Centaur = 6,
    /// Swap card and entrance students.
    Jester = 7,
    /// Two extra influence.
    Knight = 8,
    /// Ignore a color.
    MushroomMan = 9,
    /// Swap entrance and table students.
    Minstrel = 10,
    /// Move a student from the card to the table.
    SpoiledPrincess = 11,
    /// Everyone returns students of a color.
    Thief = 12,
}

impl CharacterId {
    /// Card number, 1 to 12.
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Cost before the first use.
    pub fn base_cost(self) -> u32 {
        match self {
            CharacterId::Monk
            | CharacterId::MagicMailman
            | CharacterId::Jester
            | CharacterId::Minstrel => 1,
            CharacterId::Farmer
            | CharacterId::GrandmaHerbs
            | CharacterId::Knight
            | CharacterId::SpoiledPrincess => 2,
            CharacterId::Herald
            | CharacterId::Centaur
            | CharacterId::MushroomMan
            | CharacterId::Thief => 3,
        }
    }

    /// Students stocked on the card at setup.
    pub fn stock(self) -> u32 {
        match self {
            CharacterId::Monk | CharacterId::SpoiledPrincess => 4,
            CharacterId::Jester => 6,
            _ => 0,
        }
    }
}

/// A character card in play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct CharacterCard {
    id: CharacterId,
    cost: u32,
    used: bool,
    active: bool,
    pub(crate) students: StudentPool,
}

impl CharacterCard {
    /// Creates an unused card at its base cost.
    pub fn new(id: CharacterId) -> Self {
        Self {
            id,
            cost: id.base_cost(),
            used: false,
            active: false,
            students: StudentPool::new(),
        }
    }

    /// Marks the card as used; the cost rises only the first time.
    fn activate(&mut self) {
        if !self.used {
            self.used = true;
            self.cost += 1;
        }
        self.active = true;
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }
}

/// One student exchange requested by JESTER or MINSTREL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, new)]
pub struct Swap {
    /// Color leaving the entrance.
    pub give: Color,
    /// Color entering the entrance (from the card or the table).
    pub take: Color,
}

/// Effect parameters, one variant per card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "card", rename_all = "snake_case")]
pub enum Effect {
    /// Card 1.
    Monk {
        /// Student to take from the card.
        color: Color,
        /// Destination island.
        island: IslandId,
    },
    /// Card 2.
    Farmer,
    /// Card 3.
    Herald {
        /// Island to resolve.
        island: IslandId,
    },
    /// Card 4.
    MagicMailman,
    /// Card 5.
    GrandmaHerbs {
        /// Island receiving the veto tile.
        island: IslandId,
    },
    /// Card 6.
    Centaur,
    /// Card 7.
    Jester {
        /// Up to three swaps.
        swaps: Vec<Swap>,
    },
    /// Card 8.
    Knight,
    /// Card 9.
    MushroomMan {
        /// Color ignored this turn.
        color: Color,
    },
    /// Card 10.
    Minstrel {
        /// Up to two swaps.
        swaps: Vec<Swap>,
    },
    /// Card 11.
    SpoiledPrincess {
        /// Student to seat.
        color: Color,
    },
    /// Card 12.
    Thief {
        /// Color returned to the bag.
        color: Color,
    },
}

impl Effect {
    /// The card these parameters belong to.
    pub fn id(&self) -> CharacterId {
        match self {
            Effect::Monk { .. } => CharacterId::Monk,
            Effect::Farmer => CharacterId::Farmer,
            Effect::Herald { .. } => CharacterId::Herald,
            Effect::MagicMailman => CharacterId::MagicMailman,
            Effect::GrandmaHerbs { .. } => CharacterId::GrandmaHerbs,
            Effect::Centaur => CharacterId::Centaur,
            Effect::Jester { .. } => CharacterId::Jester,
            Effect::Knight => CharacterId::Knight,
            Effect::MushroomMan { .. } => CharacterId::MushroomMan,
            Effect::Minstrel { .. } => CharacterId::Minstrel,
            Effect::SpoiledPrincess { .. } => CharacterId::SpoiledPrincess,
            Effect::Thief { .. } => CharacterId::Thief,
        }
    }
}

impl Game {
    /// Charges the card's cost to `actor` and applies the effect.
    ///
    /// Wallet and card are untouched when the request is refused up front.
    #[instrument(skip(self, effect), fields(card = %id))]
    pub(crate) fn play_character(
        &mut self,
        actor: &str,
        id: CharacterId,
        effect: Effect,
    ) -> Result<(), ActionError> {
        if !self.is_expert() {
            return Err(RuleViolation::ExpertOnly.into());
        }
        let slot = self
            .characters
            .iter()
            .position(|card| card.id == id)
            .ok_or(RuleViolation::CharacterNotInPlay(id))?;
        if effect.id() != id {
            return Err(RuleViolation::InvalidParams(id).into());
        }
        let cost = self.characters[slot].cost;
        let player = self.player_mut(actor)?;
        if !player.pay(cost) {
            return Err(ResourceViolation::InsufficientCoins {
                card: id,
                required: cost,
                available: player.coins,
            }
            .into());
        }
        self.characters[slot].activate();
        info!(actor, cost, "Character invoked");
        self.apply(actor, slot, effect)?;
        Ok(())
    }

    #[instrument(skip(self, effect))]
    fn apply(&mut self, actor: &str, slot: usize, effect: Effect) -> Result<(), ActionError> {
        match effect {
            Effect::Monk { color, island } => {
                let index = self.island_index(island)?;
                if !self.characters[slot].students.remove(color) {
                    return Err(RuleViolation::StudentNotOnCard(color).into());
                }
                if let Some(target) = self.archipelago.get_mut(index) {
                    target.students.add(color, 1);
                }
                self.restock(slot);
            }
            Effect::Farmer => {
                self.modifiers.professor_on_tie = true;
                self.update_professors(Some(actor));
            }
            Effect::Herald { island } => {
                let index = self.island_index(island)?;
                let resolution = self.resolve_island(index, actor);
                debug!(?resolution, "Herald resolved island");
            }
            Effect::MagicMailman => {
                self.modifiers.max_steps += MAILMAN_STEPS;
            }
            Effect::GrandmaHerbs { island } => {
                let index = self.island_index(island)?;
                if self.veto_tiles == 0 {
                    return Err(RuleViolation::NoVetoTiles.into());
                }
                self.veto_tiles -= 1;
                if let Some(target) = self.archipelago.get_mut(index) {
                    target.vetoes += 1;
                }
            }
            Effect::Centaur => {
                self.modifiers.towers_exempt = true;
                let index = *self.archipelago.mother_nature();
                let resolution = self.resolve_island(index, actor);
                debug!(?resolution, "Centaur resolved mother nature's island");
            }
            Effect::Jester { swaps } => {
                if swaps.is_empty() || swaps.len() > JESTER_SWAPS {
                    return Err(RuleViolation::InvalidParams(CharacterId::Jester).into());
                }
                for swap in swaps {
                    let player = self.player_mut(actor)?;
                    if !player.school.entrance.remove(swap.give) {
                        return Err(RuleViolation::StudentNotInEntrance(swap.give).into());
                    }
                    player.school.entrance.add(swap.take, 1);
                    let card = &mut self.characters[slot].students;
                    if !card.remove(swap.take) {
                        return Err(RuleViolation::StudentNotOnCard(swap.take).into());
                    }
                    card.add(swap.give, 1);
                }
            }
            Effect::Knight => {
                self.modifiers.influence_bonus = KNIGHT_BONUS;
            }
            Effect::MushroomMan { color } => {
                self.modifiers.excluded_color = Some(color);
            }
            Effect::Minstrel { swaps } => {
                if swaps.is_empty()
                    || swaps.len() > MINSTREL_SWAPS
                    || swaps.iter().any(|swap| swap.give == swap.take)
                {
                    return Err(RuleViolation::InvalidParams(CharacterId::Minstrel).into());
                }
                for swap in swaps {
                    let player = self.player_mut(actor)?;
                    if !player.school.entrance.remove(swap.give) {
                        return Err(RuleViolation::StudentNotInEntrance(swap.give).into());
                    }
                    if !player.school.unseat(swap.take) {
                        return Err(RuleViolation::StudentNotAtTable(swap.take).into());
                    }
                    if player.school.seat(swap.give)? {
                        player.coins += 1;
                    }
                    player.school.entrance.add(swap.take, 1);
                }
                self.update_professors(Some(actor));
            }
            Effect::SpoiledPrincess { color } => {
                if !self.characters[slot].students.contains(color) {
                    return Err(RuleViolation::StudentNotOnCard(color).into());
                }
                let player = self.player_mut(actor)?;
                if player.school.seat(color)? {
                    player.coins += 1;
                }
                self.characters[slot].students.remove(color);
                self.restock(slot);
                self.update_professors(Some(actor));
            }
            Effect::Thief { color } => {
                for player in self.players.iter_mut() {
                    let mut taken = 0;
                    while taken < THIEF_TAKES && player.school.unseat(color) {
                        taken += 1;
                    }
                    self.bag.add(color, taken);
                    debug!(player = %player.nickname(), taken, "Thief returned students");
                }
                self.update_professors(Some(actor));
            }
        }
        Ok(())
    }

    /// Draws one student from the bag onto the card, if the bag allows.
    fn restock(&mut self, slot: usize) {
        let card = &mut self.characters[slot].students;
        card.fill_from(&mut self.bag, 1, &mut self.rng);
    }
}
