//! Core domain types for Eriantys.

use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::instrument;

/// Number of student colors.
pub const NUM_COLORS: usize = 5;
/// Islands on the board when a session starts.
pub const NUM_ISLANDS: usize = 12;
/// Students of each color in the whole game.
pub const STUDENTS_PER_COLOR: u32 = 26;
/// Students of each color placed on the islands during setup.
pub const SETUP_STUDENTS_PER_COLOR: u32 = 2;
/// Seats in a single dining table.
pub const TABLE_LENGTH: u32 = 10;
/// A coin is earned every time a table reaches a multiple of this.
pub const COIN_EVERY: u32 = 3;
/// Coins each player starts with (expert rules).
pub const STARTING_COINS: u32 = 1;
/// Character cards in play (expert rules).
pub const CHARACTERS_IN_PLAY: usize = 3;
/// Veto tiles available in a session.
pub const VETO_TILES: u32 = 4;

/// Color of a student (and of the matching professor and dining table).
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
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Color {
    /// Yellow gnomes.
    Yellow,
    /// Blue unicorns.
    Blue,
    /// Green frogs.
    Green,
    /// Red dragons.
    Red,
    /// Pink fairies.
    Pink,
}

impl Color {
    /// Index of this color in per-color arrays.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Avatar chosen by a participant. Must be unique within a session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Wizard {
    /// Blue wizard.
    BlueWizard,
    /// Yellow wizard.
    YellowWizard,
    /// Green wizard.
    GreenWizard,
    /// Pink wizard.
    PinkWizard,
}

/// Tower color, assigned by join order. Identifies island owners.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TowerColor {
    /// First player to join.
    White,
    /// Second player to join.
    Black,
    /// Third player to join.
    Grey,
}

impl TowerColor {
    /// Tower color for the `seat`-th player to join.
    pub fn for_seat(seat: usize) -> Option<Self> {
        Self::iter().nth(seat)
    }
}

/// A multiset of students, counted per color.
///
/// Used for the bag, islands, clouds, entrances and the students resting
/// on character cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StudentPool {
    counts: [u32; NUM_COLORS],
}

impl StudentPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pool holding `per_color` students of every color.
    pub fn uniform(per_color: u32) -> Self {
        Self {
            counts: [per_color; NUM_COLORS],
        }
    }

    /// Number of students of the given color.
    pub fn count(&self, color: Color) -> u32 {
        self.counts[color.index()]
    }

    /// Total number of students.
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Checks if the pool holds no student.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Checks if at least one student of the color is present.
    pub fn contains(&self, color: Color) -> bool {
        self.count(color) > 0
    }

    /// Adds `n` students of the given color.
    pub fn add(&mut self, color: Color, n: u32) {
        self.counts[color.index()] += n;
    }

    /// Removes one student of the given color. Returns false if none is present.
    pub fn remove(&mut self, color: Color) -> bool {
        let slot = &mut self.counts[color.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Moves every student of `other` into this pool, leaving `other` empty.
    pub fn absorb(&mut self, other: &mut StudentPool) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter_mut()) {
            *mine += *theirs;
            *theirs = 0;
        }
    }

    /// Iterates over `(color, count)` pairs, including empty colors.
    pub fn iter(&self) -> impl Iterator<Item = (Color, u32)> + '_ {
        Color::iter().map(|c| (c, self.count(c)))
    }

    /// Colors with at least one student, in color order.
    pub fn colors(&self) -> Vec<Color> {
        self.iter().filter(|(_, n)| *n > 0).map(|(c, _)| c).collect()
    }

    /// Draws one student uniformly at random among those present.
    #[instrument(skip(self, rng), fields(remaining = self.total()))]
    pub fn draw<R: Rng>(&mut self, rng: &mut R) -> Option<Color> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let mut pick = rng.random_range(0..total);
        for color in Color::iter() {
            let n = self.count(color);
            if pick < n {
                self.counts[color.index()] -= 1;
                return Some(color);
            }
            pick -= n;
        }
        None
    }

    /// Draws up to `n` students from `source` into this pool.
    ///
    /// Returns how many were actually drawn.
    pub fn fill_from<R: Rng>(&mut self, source: &mut StudentPool, n: u32, rng: &mut R) -> u32 {
        let mut drawn = 0;
        while drawn < n {
            match source.draw(rng) {
                Some(color) => {
                    self.add(color, 1);
                    drawn += 1;
                }
                None => break,
            }
        }
        drawn
    }
}

impl std::fmt::Display for StudentPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(c, n)| format!("{}x{}", n, c))
            .collect();
        if parts.is_empty() {
            write!(f, "-")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_color_parses_case_insensitively() {
        assert_eq!("red".parse::<Color>().unwrap(), Color::Red);
        assert_eq!("PINK".parse::<Color>().unwrap(), Color::Pink);
        assert!("purple".parse::<Color>().is_err());
    }

    #[test]
    fn test_wizard_round_trips_through_display() {
        let wizard: Wizard = "pink_wizard".parse().unwrap();
        assert_eq!(wizard, Wizard::PinkWizard);
        assert_eq!(wizard.to_string(), "PINK_WIZARD");
    }

    #[test]
    fn test_draw_empties_pool_exactly() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pool = StudentPool::uniform(2);
        let mut drawn = StudentPool::new();
        assert_eq!(drawn.fill_from(&mut pool, 20, &mut rng), 10);
        assert!(pool.is_empty());
        assert_eq!(drawn, StudentPool::uniform(2));
        assert_eq!(pool.draw(&mut rng), None);
    }

    #[test]
    fn test_remove_missing_color_is_refused() {
        let mut pool = StudentPool::new();
        pool.add(Color::Blue, 1);
        assert!(!pool.remove(Color::Green));
        assert!(pool.remove(Color::Blue));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_tower_colors_follow_join_order() {
        assert_eq!(TowerColor::for_seat(0), Some(TowerColor::White));
        assert_eq!(TowerColor::for_seat(2), Some(TowerColor::Grey));
        assert_eq!(TowerColor::for_seat(3), None);
    }
}
