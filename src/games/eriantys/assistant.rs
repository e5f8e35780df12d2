//! Assistant cards: the once-per-round priority cards.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// An assistant (priority) card. Its weight decides turn order.
///
/// Weights are unique, so sorting by weight is a total order.
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
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Assistant {
    /// Weight 1.
    Cheetah = 1,
    /// Weight 2.
    Ostrich = 2,
    /// Weight 3.
    Cat = 3,
    /// Weight 4.
    Eagle = 4,
    /// Weight 5.
    Fox = 5,
    /// Weight 6.
    Lizard = 6,
    /// Weight 7.
    Octopus = 7,
    /// Weight 8.
    Dog = 8,
    /// Weight 9.
    Elephant = 9,
    /// Weight 10.
    Turtle = 10,
}

impl Assistant {
    /// The card's priority weight (lower plays first).
    pub fn weight(self) -> u8 {
        self as u8
    }

    /// A complete hand, lowest weight first.
    pub fn full_deck() -> Vec<Assistant> {
        Self::iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_deck_has_unique_ascending_weights() {
        let deck = Assistant::full_deck();
        assert_eq!(deck.len(), 10);
        let weights: Vec<u8> = deck.iter().map(|c| c.weight()).collect();
        assert_eq!(weights, (1..=10).collect::<Vec<u8>>());
    }

    #[test]
    fn test_names_parse_in_any_case() {
        assert_eq!("cat".parse::<Assistant>().unwrap(), Assistant::Cat);
        assert_eq!(Assistant::Turtle.to_string(), "TURTLE");
    }
}
