//! Property-based tests for priority cards and turn order.

#![allow(missing_docs)]

use proptest::prelude::*;
use proptest::sample::subsequence;
use strictly_eriantys::rules::{is_playable, sort_by_priority};
use strictly_eriantys::{
    Action, Assistant, ChannelSink, PlayerCount, Request, SessionConfig, SessionController,
    SessionState, Wizard,
};
use strum::IntoEnumIterator;

fn deck() -> Vec<Assistant> {
    Assistant::iter().collect()
}

fn three_seated(seed: u64) -> SessionController {
    let config = SessionConfig::new(PlayerCount::Three).with_seed(seed);
    let mut session = SessionController::new("prop".to_string(), config).unwrap();
    for (name, wizard) in [
        ("a", Wizard::BlueWizard),
        ("b", Wizard::YellowWizard),
        ("c", Wizard::GreenWizard),
    ] {
        let (sink, _rx) = ChannelSink::new();
        session.attach(name.to_string(), Box::new(sink)).unwrap();
        session
            .handle(Request::new(name, Action::Join { wizard }))
            .unwrap();
    }
    session
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A card nobody played yet is always legal when held.
    #[test]
    fn prop_unplayed_card_is_legal(
        hand in subsequence(deck(), 1..=10),
        played in subsequence(deck(), 0..=2),
        pick in any::<prop::sample::Index>(),
    ) {
        let card = *pick.get(&hand);
        prop_assume!(!played.contains(&card));
        prop_assert!(is_playable(&hand, &played, false, card));
    }

    /// Replaying a card is legal exactly when the hand offers no alternative.
    #[test]
    fn prop_replay_only_without_alternative(
        hand in subsequence(deck(), 1..=10),
        played in subsequence(deck(), 1..=2),
        pick in any::<prop::sample::Index>(),
    ) {
        let card = *pick.get(&played);
        prop_assume!(hand.contains(&card));
        let cornered = hand.iter().all(|c| played.contains(c));
        prop_assert_eq!(is_playable(&hand, &played, false, card), cornered);
        prop_assert!(is_playable(&hand, &played, true, card));
    }

    /// The action phase runs in ascending card weight, and sorting again changes nothing.
    #[test]
    fn prop_action_order_is_sorted_and_stable(
        cards in subsequence(deck(), 3),
        shuffle in Just(vec![0usize, 1, 2]).prop_shuffle(),
        seed in any::<u64>(),
    ) {
        let mut session = three_seated(seed);
        let seats = session.game().turn_order();
        for (seat, slot) in seats.iter().zip(shuffle) {
            session
                .handle(Request::new(seat.as_str(), Action::PlayAssistant { card: cards[slot] }))
                .unwrap();
        }
        prop_assert_eq!(*session.state(), SessionState::Action);

        let weights: Vec<u8> = session
            .game()
            .players()
            .iter()
            .map(|p| p.last_played().unwrap().weight())
            .collect();
        prop_assert!(weights.windows(2).all(|w| w[0] < w[1]));

        let mut again = session.game().players().clone();
        sort_by_priority(&mut again);
        prop_assert_eq!(&again, session.game().players());
    }
}
