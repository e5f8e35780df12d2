//! Legality of priority-card plays during planning.

use crate::games::eriantys::assistant::Assistant;
use tracing::instrument;

/// Checks if `card` may be played.
///
/// The card must be in `hand`. The first player of the round plays freely.
/// Anyone else may play a card already played this round only when every
/// other card left in their hand was played this round too.
#[instrument]
pub fn is_playable(
    hand: &[Assistant],
    played: &[Assistant],
    is_first: bool,
    card: Assistant,
) -> bool {
    if !hand.contains(&card) {
        return false;
    }
    if is_first || !played.contains(&card) {
        return true;
    }
    hand.iter()
        .filter(|other| **other != card)
        .all(|other| played.contains(other))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unplayed_card_is_legal() {
        let hand = [Assistant::Cat, Assistant::Dog];
        assert!(is_playable(&hand, &[Assistant::Dog], false, Assistant::Cat));
    }

    #[test]
    fn test_card_outside_hand_is_illegal() {
        assert!(!is_playable(&[Assistant::Cat], &[], true, Assistant::Dog));
    }

    #[test]
    fn test_replay_needs_every_alternative_taken() {
        let hand = [Assistant::Cat, Assistant::Dog, Assistant::Fox];
        assert!(!is_playable(&hand, &[Assistant::Cat, Assistant::Dog], false, Assistant::Cat));
        let played = [Assistant::Cat, Assistant::Dog, Assistant::Fox];
        assert!(is_playable(&hand[..2], &played, false, Assistant::Cat));
    }

    #[test]
    fn test_first_player_plays_freely() {
        let hand = [Assistant::Cat, Assistant::Dog];
        assert!(is_playable(&hand, &[Assistant::Cat], true, Assistant::Cat));
    }
}
