//! Whole sessions played between random bots.

use strictly_eriantys::{
    EndReason, GameEvent, Player, PlayerCount, RuleVariant, SessionConfig, SimpleAI,
    run_simulation,
};

fn bots(count: usize, seed: u64) -> Vec<Box<dyn Player>> {
    ["ada", "bo", "cy"]
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, name)| Box::new(SimpleAI::new(*name, seed + i as u64)) as Box<dyn Player>)
        .collect()
}

async fn simulate(players: PlayerCount, variant: RuleVariant, seed: u64) {
    let config = SessionConfig::new(players)
        .with_variant(variant)
        .with_seed(seed);
    let (termination, events) = run_simulation(
        format!("sim-{}-{}-{}", players, variant, seed),
        config,
        bots(players.get(), seed),
    )
    .await
    .unwrap();

    assert!(matches!(events.last(), Some(GameEvent::GameOver(t)) if *t == termination));
    let taken = events
        .iter()
        .filter(|e| matches!(e, GameEvent::ActionTaken { .. }))
        .count();
    assert!(taken > players.get());
    if let Some(winner) = termination.outcome.winner() {
        assert!(["ada", "bo", "cy"].contains(&winner.as_str()));
    }
}

#[tokio::test]
async fn test_two_player_base_game_terminates() {
    simulate(PlayerCount::Two, RuleVariant::Base, 1).await;
}

#[tokio::test]
async fn test_three_player_base_game_terminates() {
    simulate(PlayerCount::Three, RuleVariant::Base, 2).await;
}

#[tokio::test]
async fn test_expert_games_terminate() {
    simulate(PlayerCount::Two, RuleVariant::Expert, 3).await;
    simulate(PlayerCount::Three, RuleVariant::Expert, 4).await;
}

#[tokio::test]
async fn test_short_game_ends_on_round_limit() {
    let config = SessionConfig::default().with_max_rounds(1).with_seed(9);
    let (termination, _) = run_simulation("sim-short".to_string(), config, bots(2, 9))
        .await
        .unwrap();
    assert_eq!(termination.reason, EndReason::LastRound);
}
