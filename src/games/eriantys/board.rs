//! The shared board: the island ring and the clouds.

use super::types::{NUM_ISLANDS, StudentPool, TowerColor};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Stable identifier of an island (1-based, survives merges).
pub type IslandId = usize;

/// One territory unit of the ring. After merges it stands for a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Island {
    /// Identifier of the island (the absorbing one after a merge).
    id: IslandId,
    /// Students resting on the island.
    pub(crate) students: StudentPool,
    /// Owner, if conquered.
    pub(crate) owner: Option<TowerColor>,
    /// How many original islands this unit spans (= towers when owned).
    pub(crate) size: u32,
    /// Veto tiles resting on the island.
    pub(crate) vetoes: u32,
}

impl Island {
    /// Creates an empty, unowned island.
    pub fn new(id: IslandId) -> Self {
        Self {
            id,
            students: StudentPool::new(),
            owner: None,
            size: 1,
            vetoes: 0,
        }
    }

    /// Checks if a veto tile blocks the next ownership recomputation.
    pub fn has_veto(&self) -> bool {
        self.vetoes > 0
    }

    fn absorb(&mut self, other: &mut Island) {
        self.students.absorb(&mut other.students);
        self.size += other.size;
        self.vetoes += other.vetoes;
    }
}

/// The circular ring of islands plus mother nature's position.
///
/// The ring only ever shrinks (by merging).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Archipelago {
    islands: Vec<Island>,
    /// Index (not id) of the island mother nature stands on.
    mother_nature: usize,
}

impl Archipelago {
    /// Creates the starting ring of twelve islands, mother nature on the first.
    #[instrument]
    pub fn new() -> Self {
        Self {
            islands: (1..=NUM_ISLANDS).map(Island::new).collect(),
            mother_nature: 0,
        }
    }

    /// Number of units currently on the ring.
    pub fn len(&self) -> usize {
        self.islands.len()
    }

    /// Checks if the ring is empty (never true in a running session).
    pub fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }

    /// Island at the given ring index.
    pub fn get(&self, index: usize) -> Option<&Island> {
        self.islands.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Island> {
        self.islands.get_mut(index)
    }

    /// Ring index of the island with the given id.
    pub fn position(&self, id: IslandId) -> Option<usize> {
        self.islands.iter().position(|island| island.id == id)
    }

    /// The island mother nature stands on.
    pub fn mother_nature_island(&self) -> &Island {
        &self.islands[self.mother_nature]
    }

    #[cfg(test)]
    pub(crate) fn set_mother_nature(&mut self, index: usize) {
        self.mother_nature = index % self.islands.len();
    }

    /// Moves mother nature clockwise and returns her new ring index.
    #[instrument(skip(self), fields(from = self.mother_nature))]
    pub(crate) fn advance(&mut self, steps: usize) -> usize {
        self.mother_nature = (self.mother_nature + steps) % self.islands.len();
        self.mother_nature
    }

    /// Merges the island at `index` with adjacent islands of the same owner.
    ///
    /// Returns the ring index of the merged unit. Mother nature stays on the
    /// unit that contains the island she stood on.
    #[instrument(skip(self), fields(len = self.islands.len()))]
    pub(crate) fn merge_around(&mut self, index: usize) -> usize {
        let Some(owner) = self.islands.get(index).and_then(|island| island.owner) else {
            return index;
        };
        let mut mother_id = self.islands[self.mother_nature].id;
        let mut index = index;

        // Clockwise neighbour first, then the anticlockwise one.
        for clockwise in [true, false] {
            while self.islands.len() > 1 {
                let len = self.islands.len();
                let neighbour = if clockwise {
                    (index + 1) % len
                } else {
                    (index + len - 1) % len
                };
                if self.islands[neighbour].owner != Some(owner) {
                    break;
                }
                let mut absorbed = self.islands.remove(neighbour);
                if neighbour < index {
                    index -= 1;
                }
                if absorbed.id == mother_id {
                    mother_id = self.islands[index].id;
                }
                debug!(
                    into = self.islands[index].id,
                    absorbed = absorbed.id,
                    "Merging islands"
                );
                self.islands[index].absorb(&mut absorbed);
            }
        }

        if let Some(position) = self.position(mother_id) {
            self.mother_nature = position;
        }
        index
    }
}

impl Default for Archipelago {
    fn default() -> Self {
        Self::new()
    }
}

/// A cloud: refilled once per round, drained by exactly one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Cloud {
    pub(crate) students: StudentPool,
}

impl Cloud {
    /// Creates an empty cloud.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the cloud has been drained.
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::eriantys::types::Color;

    fn conquer(ring: &mut Archipelago, index: usize, owner: TowerColor) -> usize {
        ring.get_mut(index).unwrap().owner = Some(owner);
        ring.merge_around(index)
    }

    #[test]
    fn test_new_ring_has_twelve_islands() {
        let ring = Archipelago::new();
        assert_eq!(ring.len(), 12);
        assert_eq!(*ring.mother_nature(), 0);
        assert_eq!(*ring.mother_nature_island().id(), 1);
    }

    #[test]
    fn test_advance_wraps_around() {
        let mut ring = Archipelago::new();
        assert_eq!(ring.advance(5), 5);
        assert_eq!(ring.advance(9), 2);
    }

    #[test]
    fn test_merge_with_both_neighbours() {
        let mut ring = Archipelago::new();
        ring.get_mut(3).unwrap().students.add(Color::Red, 2);
        conquer(&mut ring, 3, TowerColor::White);
        conquer(&mut ring, 5, TowerColor::White);
        ring.set_mother_nature(4);
        let merged = conquer(&mut ring, 4, TowerColor::White);

        assert_eq!(ring.len(), 10);
        let island = ring.get(merged).unwrap();
        assert_eq!(*island.size(), 3);
        assert_eq!(island.students().count(Color::Red), 2);
        assert_eq!(*ring.mother_nature(), merged);
    }

    #[test]
    fn test_merge_across_ring_boundary() {
        let mut ring = Archipelago::new();
        conquer(&mut ring, 11, TowerColor::Black);
        let merged = conquer(&mut ring, 0, TowerColor::Black);

        assert_eq!(ring.len(), 11);
        assert_eq!(*ring.get(merged).unwrap().size(), 2);
        assert_eq!(ring.get(merged).unwrap().owner(), &Some(TowerColor::Black));
    }

    #[test]
    fn test_different_owners_do_not_merge() {
        let mut ring = Archipelago::new();
        conquer(&mut ring, 2, TowerColor::White);
        conquer(&mut ring, 3, TowerColor::Black);
        assert_eq!(ring.len(), 12);
    }

    #[test]
    fn test_mother_nature_follows_absorbed_island() {
        let mut ring = Archipelago::new();
        ring.set_mother_nature(6);
        conquer(&mut ring, 6, TowerColor::Grey);
        let merged = conquer(&mut ring, 5, TowerColor::Grey);
        assert_eq!(*ring.mother_nature(), merged);
        assert_eq!(ring.mother_nature_island().owner(), &Some(TowerColor::Grey));
    }
}
