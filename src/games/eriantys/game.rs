//! The authoritative game model and its invariant-preserving mutators.
//!
//! [`Game`] owns the board, the bag, the players' schools and the character
//! cards. It knows nothing about turns or phases; the session controller
//! decides *who* may call which mutator and *when*.

use super::action::{ActionError, Destination, RuleViolation};
use super::board::{Archipelago, Cloud, IslandId};
use super::characters::{CharacterCard, CharacterId};
use super::player::{Player, PlayerId};
use super::rules::influence::Resolution;
use super::rules::professors::professor_holder;
use super::types::{
    Color, NUM_ISLANDS, SETUP_STUDENTS_PER_COLOR, STARTING_COINS, STUDENTS_PER_COLOR, StudentPool,
    TowerColor, VETO_TILES, Wizard, CHARACTERS_IN_PLAY,
};
use crate::config::{PlayerCount, RuleVariant, SessionConfig};
use derive_getters::Getters;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Per-player-count constants
// ─────────────────────────────────────────────────────────────

/// Constants that depend on the number of seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Rules {
    /// Seats in the session (also the number of clouds).
    players: usize,
    /// Students an entrance is filled to.
    entrance: u32,
    /// Towers each player starts with.
    towers: u32,
    /// Students per cloud.
    cloud_capacity: u32,
    /// Student moves per turn.
    moves: u32,
}

impl Rules {
    /// Constants for the given seat count.
    pub fn for_players(count: PlayerCount) -> Self {
        match count {
            PlayerCount::Two => Self {
                players: 2,
                entrance: 7,
                towers: 8,
                cloud_capacity: 3,
                moves: 3,
            },
            PlayerCount::Three => Self {
                players: 3,
                entrance: 9,
                towers: 6,
                cloud_capacity: 4,
                moves: 4,
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Turn modifiers
// ─────────────────────────────────────────────────────────────

/// Values character cards may override for the rest of a turn.
///
/// Reset to the base values whenever a turn ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct TurnModifiers {
    #[serde(skip)]
    #[getter(skip)]
    base_steps: usize,
    /// Mother nature step limit.
    pub(crate) max_steps: usize,
    /// Towers don't count for influence.
    pub(crate) towers_exempt: bool,
    /// Color ignored for influence.
    pub(crate) excluded_color: Option<Color>,
    /// Extra influence for the acting player.
    pub(crate) influence_bonus: u32,
    /// Acting player takes professors on ties.
    pub(crate) professor_on_tie: bool,
}

impl TurnModifiers {
    /// Creates modifiers at their base values.
    pub fn new(base_steps: usize) -> Self {
        Self {
            base_steps,
            max_steps: base_steps,
            towers_exempt: false,
            excluded_color: None,
            influence_bonus: 0,
            professor_on_tie: false,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.base_steps);
    }
}

// ─────────────────────────────────────────────────────────────
//  Game
// ─────────────────────────────────────────────────────────────

/// The authoritative game model of one session.
#[derive(Debug, Clone, Getters)]
pub struct Game {
    rules: Rules,
    variant: RuleVariant,
    /// Players in current turn order.
    pub(crate) players: Vec<Player>,
    pub(crate) archipelago: Archipelago,
    pub(crate) clouds: Vec<Cloud>,
    pub(crate) bag: StudentPool,
    pub(crate) characters: Vec<CharacterCard>,
    /// Veto tiles not on the board.
    pub(crate) veto_tiles: u32,
    pub(crate) modifiers: TurnModifiers,
    round: u32,
    #[getter(skip)]
    pub(crate) rng: StdRng,
}

impl Game {
    /// Creates an empty model for the given configuration.
    #[instrument(skip(config), fields(players = %config.players(), variant = %config.variant()))]
    pub fn new(config: &SessionConfig) -> Self {
        let rng = match config.seed() {
            Some(seed) => StdRng::seed_from_u64(*seed),
            None => StdRng::from_os_rng(),
        };
        let rules = Rules::for_players(*config.players());
        Self {
            rules,
            variant: *config.variant(),
            players: Vec::with_capacity(rules.players),
            archipelago: Archipelago::new(),
            clouds: (0..rules.players).map(|_| Cloud::new()).collect(),
            bag: StudentPool::new(),
            characters: Vec::new(),
            veto_tiles: VETO_TILES,
            modifiers: TurnModifiers::new(*config.max_steps()),
            round: 0,
            rng,
        }
    }

    /// Checks if expert rules are enabled.
    pub fn is_expert(&self) -> bool {
        self.variant == RuleVariant::Expert
    }

    /// Checks if every seat is taken.
    pub fn is_full(&self) -> bool {
        self.players.len() >= self.rules.players
    }

    /// The player with the given nickname.
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.nickname() == id)
    }

    pub(crate) fn player_mut(&mut self, id: &str) -> Result<&mut Player, ActionError> {
        self.players
            .iter_mut()
            .find(|p| p.nickname() == id)
            .ok_or_else(|| ActionError::UnknownParticipant {
                player: id.to_string(),
            })
    }

    /// Position of the player in the current turn order.
    pub fn seat_of(&self, id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.nickname() == id)
    }

    /// Nicknames in current turn order.
    pub fn turn_order(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.nickname().clone()).collect()
    }

    /// Ring index of the island with the given id.
    pub fn island_index(&self, id: IslandId) -> Result<usize, RuleViolation> {
        self.archipelago
            .position(id)
            .ok_or(RuleViolation::IslandNotFound(id))
    }

    /// The character card with the given id, if in play.
    pub fn character(&self, id: CharacterId) -> Option<&CharacterCard> {
        self.characters.iter().find(|card| *card.id() == id)
    }

    /// Seats a new player with a unique wizard. Towers are assigned by join order.
    #[instrument(skip(self))]
    pub(crate) fn add_player(
        &mut self,
        nickname: PlayerId,
        wizard: Wizard,
    ) -> Result<TowerColor, RuleViolation> {
        if self.player(&nickname).is_some() {
            return Err(RuleViolation::AlreadyJoined);
        }
        if self.players.iter().any(|p| *p.wizard() == wizard) {
            warn!(%wizard, "Wizard already taken");
            return Err(RuleViolation::WizardTaken(wizard));
        }
        let tower_color =
            TowerColor::for_seat(self.players.len()).ok_or(RuleViolation::AlreadyJoined)?;
        let coins = if self.is_expert() { STARTING_COINS } else { 0 };
        self.players.push(Player::new(
            nickname,
            wizard,
            tower_color,
            self.rules.towers,
            coins,
        ));
        Ok(tower_color)
    }

    /// Seeds islands, bag, entrances, characters and clouds; round 1 begins.
    #[instrument(skip(self, characters))]
    pub(crate) fn setup(&mut self, characters: Option<&[CharacterId]>) {
        let opposite = NUM_ISLANDS / 2;
        let mut start = StudentPool::uniform(SETUP_STUDENTS_PER_COLOR);
        for index in (1..NUM_ISLANDS).filter(|i| *i != opposite) {
            if let Some(color) = start.draw(&mut self.rng)
                && let Some(island) = self.archipelago.get_mut(index)
            {
                island.students.add(color, 1);
            }
        }
        self.bag = StudentPool::uniform(STUDENTS_PER_COLOR - SETUP_STUDENTS_PER_COLOR);

        let entrance = self.rules.entrance;
        for player in self.players.iter_mut() {
            player
                .school
                .entrance
                .fill_from(&mut self.bag, entrance, &mut self.rng);
        }

        if self.is_expert() {
            let ids = match characters {
                Some(ids) => ids.to_vec(),
                None => {
                    let mut all: Vec<CharacterId> = CharacterId::iter().collect();
                    all.shuffle(&mut self.rng);
                    all.truncate(CHARACTERS_IN_PLAY);
                    all
                }
            };
            for id in ids {
                let mut card = CharacterCard::new(id);
                card.students
                    .fill_from(&mut self.bag, id.stock(), &mut self.rng);
                self.characters.push(card);
            }
            info!(characters = ?self.characters.iter().map(|c| *c.id()).collect::<Vec<_>>(), "Characters in play");
        }

        self.refill_clouds();
        self.round = 1;
        info!(bag = self.bag.total(), "Board set up");
    }

    /// Moves one student out of the acting player's entrance.
    #[instrument(skip(self))]
    pub(crate) fn move_student(
        &mut self,
        actor: &str,
        color: Color,
        destination: Destination,
    ) -> Result<(), ActionError> {
        let expert = self.is_expert();
        match destination {
            Destination::Table => {
                let player = self.player_mut(actor)?;
                if player.school.entrance_to_table(color)? && expert {
                    player.coins += 1;
                    debug!(coins = player.coins, "Coin earned");
                }
                self.update_professors(Some(actor));
            }
            Destination::Island(id) => {
                let index = self.island_index(id)?;
                let player = self.player_mut(actor)?;
                if !player.school.entrance.remove(color) {
                    return Err(RuleViolation::StudentNotInEntrance(color).into());
                }
                if let Some(island) = self.archipelago.get_mut(index) {
                    island.students.add(color, 1);
                }
            }
        }
        Ok(())
    }

    /// Recomputes professor control for every color.
    #[instrument(skip(self))]
    pub(crate) fn update_professors(&mut self, actor: Option<&str>) {
        let favoured = actor
            .filter(|_| self.modifiers.professor_on_tie)
            .and_then(|id| self.seat_of(id));
        for color in Color::iter() {
            let counts: Vec<u32> = self
                .players
                .iter()
                .map(|p| *p.school.table(color).students())
                .collect();
            let holder = self
                .players
                .iter()
                .position(|p| p.school.has_professor(color));
            let next = professor_holder(&counts, holder, favoured);
            if next != holder {
                for (seat, player) in self.players.iter_mut().enumerate() {
                    player.school.set_professor(color, Some(seat) == next);
                }
                debug!(%color, ?holder, ?next, "Professor moved");
            }
        }
    }

    /// Moves mother nature and resolves the island she lands on.
    #[instrument(skip(self))]
    pub(crate) fn move_mother_nature(
        &mut self,
        actor: &str,
        steps: usize,
    ) -> Result<Resolution, RuleViolation> {
        let max = self.modifiers.max_steps;
        if steps == 0 || steps > max {
            return Err(RuleViolation::InvalidSteps {
                requested: steps,
                max,
            });
        }
        let index = self.archipelago.advance(steps);
        Ok(self.resolve_island(index, actor))
    }

    /// Drains a cloud into the acting player's entrance.
    ///
    /// When every cloud is empty the pick is accepted as an empty draw.
    #[instrument(skip(self))]
    pub(crate) fn take_cloud(&mut self, actor: &str, cloud: usize) -> Result<u32, ActionError> {
        let Some(target) = self.clouds.get(cloud) else {
            return Err(RuleViolation::CloudNotFound(cloud).into());
        };
        if target.is_empty() {
            if self.clouds.iter().any(|c| !c.is_empty()) {
                return Err(RuleViolation::CloudEmpty(cloud).into());
            }
            warn!(cloud, "Every cloud is empty, accepting an empty draw");
            self.player_mut(actor)?;
            return Ok(0);
        }
        let mut students = std::mem::take(&mut self.clouds[cloud].students);
        let drawn = students.total();
        let player = self.player_mut(actor)?;
        player.school.entrance.absorb(&mut students);
        Ok(drawn)
    }

    /// Tops every cloud up from the bag, partially if the bag runs dry.
    #[instrument(skip(self))]
    pub(crate) fn refill_clouds(&mut self) {
        let capacity = self.rules.cloud_capacity;
        for cloud in self.clouds.iter_mut() {
            let missing = capacity.saturating_sub(cloud.students.total());
            let drawn = cloud.students.fill_from(&mut self.bag, missing, &mut self.rng);
            if drawn < missing {
                warn!(drawn, missing, "Bag ran dry while refilling clouds");
            }
        }
    }

    /// Reorders players by the weight of the card each played this round.
    pub(crate) fn order_by_priority(&mut self) {
        super::rules::order::sort_by_priority(&mut self.players);
    }

    /// Clears turn-scoped state: active cards and modifiers.
    #[instrument(skip(self))]
    pub(crate) fn end_turn(&mut self) {
        for card in self.characters.iter_mut() {
            card.deactivate();
        }
        self.modifiers.reset();
    }

    /// Refills clouds, bumps the round and opens it for every player.
    #[instrument(skip(self))]
    pub(crate) fn close_round(&mut self) {
        self.refill_clouds();
        self.round += 1;
        for player in self.players.iter_mut() {
            player.open_round();
        }
        info!(round = self.round, "Round opened");
    }

    /// Total students in the bag, on the board, in schools and on cards.
    pub fn students_in_play(&self) -> u32 {
        let islands: u32 = self
            .archipelago
            .islands()
            .iter()
            .map(|i| i.students().total())
            .sum();
        let clouds: u32 = self.clouds.iter().map(|c| c.students().total()).sum();
        let schools: u32 = self
            .players
            .iter()
            .map(|p| p.school().entrance().total() + p.school().seated())
            .sum();
        let cards: u32 = self.characters.iter().map(|c| c.students().total()).sum();
        self.bag.total() + islands + clouds + schools + cards
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::games::eriantys::types::NUM_COLORS;

    /// A two-player game, set up with a fixed seed.
    pub(crate) fn two_player_game(variant: RuleVariant) -> Game {
        let config = SessionConfig::new(PlayerCount::Two)
            .with_variant(variant)
            .with_seed(42);
        let mut game = Game::new(&config);
        game.add_player("ludo".into(), Wizard::PinkWizard).unwrap();
        game.add_player("lea".into(), Wizard::BlueWizard).unwrap();
        game.setup(None);
        game
    }

    #[test]
    fn test_setup_seeds_the_board() {
        let game = two_player_game(RuleVariant::Base);
        let total = STUDENTS_PER_COLOR * NUM_COLORS as u32;
        assert_eq!(game.students_in_play(), total);
        assert_eq!(*game.round(), 1);
        assert!(game.archipelago.get(0).unwrap().students().is_empty());
        assert!(game.archipelago.get(6).unwrap().students().is_empty());
        for index in [1, 2, 3, 4, 5, 7, 8, 9, 10, 11] {
            assert_eq!(game.archipelago.get(index).unwrap().students().total(), 1);
        }
        for player in &game.players {
            assert_eq!(player.school().entrance().total(), 7);
            assert_eq!(*player.school().towers(), 8);
            assert_eq!(*player.coins(), 0);
        }
        assert!(game.clouds.iter().all(|c| c.students().total() == 3));
        assert!(game.characters.is_empty());
    }

    #[test]
    fn test_expert_setup_stocks_characters() {
        let game = two_player_game(RuleVariant::Expert);
        assert_eq!(game.characters.len(), 3);
        for card in &game.characters {
            assert_eq!(card.students().total(), card.id().stock());
        }
        assert!(game.players.iter().all(|p| *p.coins() == 1));
        assert_eq!(game.students_in_play(), 130);
    }

    #[test]
    fn test_duplicate_wizard_is_rejected() {
        let mut game = Game::new(&SessionConfig::default());
        game.add_player("ludo".into(), Wizard::PinkWizard).unwrap();
        assert_eq!(
            game.add_player("lea".into(), Wizard::PinkWizard),
            Err(RuleViolation::WizardTaken(Wizard::PinkWizard))
        );
        assert_eq!(
            game.add_player("ludo".into(), Wizard::GreenWizard),
            Err(RuleViolation::AlreadyJoined)
        );
        assert_eq!(
            game.add_player("lea".into(), Wizard::GreenWizard),
            Ok(TowerColor::Black)
        );
    }

    #[test]
    fn test_moving_to_table_takes_professor() {
        let mut game = two_player_game(RuleVariant::Base);
        let color = game.players[0].school().entrance().colors()[0];
        game.move_student("ludo", color, Destination::Table).unwrap();
        assert!(game.players[0].school().has_professor(color));
        assert!(!game.players[1].school().has_professor(color));
    }

    #[test]
    fn test_moving_to_missing_island_is_rejected() {
        let mut game = two_player_game(RuleVariant::Base);
        let color = game.players[0].school().entrance().colors()[0];
        let before = game.players[0].school().entrance().total();
        assert_eq!(
            game.move_student("ludo", color, Destination::Island(13)),
            Err(ActionError::Rule(RuleViolation::IslandNotFound(13)))
        );
        assert_eq!(game.players[0].school().entrance().total(), before);
    }

    #[test]
    fn test_step_bounds() {
        let mut game = two_player_game(RuleVariant::Base);
        assert_eq!(
            game.move_mother_nature("ludo", 0),
            Err(RuleViolation::InvalidSteps {
                requested: 0,
                max: 5
            })
        );
        assert!(game.move_mother_nature("ludo", 6).is_err());
        assert_eq!(*game.archipelago.mother_nature(), 0);
        assert!(game.move_mother_nature("ludo", 5).is_ok());
        assert_eq!(*game.archipelago.mother_nature(), 5);
    }

    #[test]
    fn test_empty_cloud_is_refused_unless_all_are_empty() {
        let mut game = two_player_game(RuleVariant::Base);
        assert_eq!(game.take_cloud("ludo", 0).unwrap(), 3);
        assert_eq!(
            game.take_cloud("lea", 0),
            Err(ActionError::Rule(RuleViolation::CloudEmpty(0)))
        );
        assert_eq!(
            game.take_cloud("lea", 2),
            Err(ActionError::Rule(RuleViolation::CloudNotFound(2)))
        );
        assert_eq!(game.take_cloud("lea", 1).unwrap(), 3);
        assert_eq!(game.take_cloud("lea", 0).unwrap(), 0);
    }

    #[test]
    fn test_round_close_refills_and_clears() {
        let mut game = two_player_game(RuleVariant::Base);
        game.take_cloud("ludo", 0).unwrap();
        game.players[0]
            .play_assistant(crate::games::eriantys::Assistant::Cat)
            .unwrap();
        game.close_round();
        assert_eq!(*game.round(), 2);
        assert!(game.clouds.iter().all(|c| c.students().total() == 3));
        assert_eq!(game.players[0].last_played(), &None);
    }
}
