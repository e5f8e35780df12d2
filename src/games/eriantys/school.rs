//! A player's school: entrance, dining tables and tower supply.

use super::action::RuleViolation;
use super::types::{COIN_EVERY, Color, NUM_COLORS, StudentPool, TABLE_LENGTH};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::instrument;

/// One dining table: seated students and the matching professor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct DiningTable {
    students: u32,
    professor: bool,
    /// Highest seat whose coin was already paid out.
    coins_paid: u32,
}

impl DiningTable {
    /// Checks if every seat is taken.
    pub fn is_full(&self) -> bool {
        self.students >= TABLE_LENGTH
    }
}

/// A player's school board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct School {
    /// Students waiting to be moved.
    pub(crate) entrance: StudentPool,
    tables: [DiningTable; NUM_COLORS],
    /// Towers not yet placed on islands.
    pub(crate) towers: u32,
}

impl School {
    /// Creates an empty school holding the given tower supply.
    pub fn new(towers: u32) -> Self {
        Self {
            entrance: StudentPool::new(),
            tables: [DiningTable::default(); NUM_COLORS],
            towers,
        }
    }

    /// The table of the given color.
    pub fn table(&self, color: Color) -> &DiningTable {
        &self.tables[color.index()]
    }

    /// Checks if the school holds the professor of the given color.
    pub fn has_professor(&self, color: Color) -> bool {
        self.tables[color.index()].professor
    }

    /// Number of professors held (tie-break for the winner).
    pub fn professors(&self) -> usize {
        self.tables.iter().filter(|t| t.professor).count()
    }

    /// Colors whose professor this school holds.
    pub fn professor_colors(&self) -> Vec<Color> {
        Color::iter().filter(|c| self.has_professor(*c)).collect()
    }

    pub(crate) fn set_professor(&mut self, color: Color, held: bool) {
        self.tables[color.index()].professor = held;
    }

    /// Seats a student at the table of its color.
    ///
    /// Returns true when the seat reached earns a coin. Each coin seat pays
    /// out once, however often it is vacated and filled again.
    #[instrument(skip(self))]
    pub(crate) fn seat(&mut self, color: Color) -> Result<bool, RuleViolation> {
        let table = &mut self.tables[color.index()];
        if table.is_full() {
            return Err(RuleViolation::TableFull(color));
        }
        table.students += 1;
        let earns = table.students % COIN_EVERY == 0 && table.students > table.coins_paid;
        if earns {
            table.coins_paid = table.students;
        }
        Ok(earns)
    }

    /// Removes a student from the table of the given color.
    pub(crate) fn unseat(&mut self, color: Color) -> bool {
        let table = &mut self.tables[color.index()];
        if table.students == 0 {
            return false;
        }
        table.students -= 1;
        true
    }

    /// Moves a student of the given color from the entrance to its table.
    ///
    /// Nothing changes when the move is refused.
    #[instrument(skip(self))]
    pub(crate) fn entrance_to_table(&mut self, color: Color) -> Result<bool, RuleViolation> {
        if !self.entrance.contains(color) {
            return Err(RuleViolation::StudentNotInEntrance(color));
        }
        let coin = self.seat(color)?;
        self.entrance.remove(color);
        Ok(coin)
    }

    /// Students seated across all tables.
    pub fn seated(&self) -> u32 {
        self.tables.iter().map(|t| t.students).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_third_seat_earns_a_coin() {
        let mut school = School::new(8);
        school.entrance.add(Color::Yellow, 3);
        school.entrance.add(Color::Pink, 1);

        assert!(!school.entrance_to_table(Color::Yellow).unwrap());
        assert!(!school.entrance_to_table(Color::Pink).unwrap());
        assert!(!school.entrance_to_table(Color::Yellow).unwrap());
        assert!(school.entrance_to_table(Color::Yellow).unwrap());
        assert_eq!(*school.table(Color::Yellow).students(), 3);
    }

    #[test]
    fn test_refilled_coin_seat_pays_once() {
        let mut school = School::new(8);
        assert!(!school.seat(Color::Red).unwrap());
        assert!(!school.seat(Color::Red).unwrap());
        assert!(school.seat(Color::Red).unwrap());

        assert!(school.unseat(Color::Red));
        assert!(!school.seat(Color::Red).unwrap());
        assert_eq!(*school.table(Color::Red).coins_paid(), 3);

        for _ in 0..2 {
            assert!(!school.seat(Color::Red).unwrap());
        }
        assert!(school.seat(Color::Red).unwrap());
        assert_eq!(*school.table(Color::Red).students(), 6);
    }

    #[test]
    fn test_full_table_refuses_without_touching_entrance() {
        let mut school = School::new(8);
        for _ in 0..TABLE_LENGTH {
            school.seat(Color::Green).unwrap();
        }
        school.entrance.add(Color::Green, 1);

        assert_eq!(
            school.entrance_to_table(Color::Green),
            Err(RuleViolation::TableFull(Color::Green))
        );
        assert_eq!(school.entrance.count(Color::Green), 1);
    }

    #[test]
    fn test_missing_color_in_entrance() {
        let mut school = School::new(6);
        assert_eq!(
            school.entrance_to_table(Color::Red),
            Err(RuleViolation::StudentNotInEntrance(Color::Red))
        );
    }
}
