//! Session tasks and the manager routing requests to them.

use strictly_eriantys::{
    Action, ActionError, Assistant, ChannelSink, Notification, PromptKind, Request, RuleViolation,
    SessionConfig, SessionError, SessionManager, SessionState, Wizard,
};

#[tokio::test]
async fn test_join_with_identity_starts_session() {
    let manager = SessionManager::new();
    let handle = manager
        .create_session("t1".to_string(), SessionConfig::default().with_seed(2))
        .unwrap();

    let (sink_a, mut rx_a) = ChannelSink::new();
    let (sink_b, _rx_b) = ChannelSink::new();
    manager
        .join_with_identity("t1", "ada".to_string(), Wizard::YellowWizard, Box::new(sink_a))
        .await
        .unwrap();
    assert_eq!(handle.snapshot().await.unwrap().state, SessionState::Setup);
    manager
        .join_with_identity("t1", "bo".to_string(), Wizard::GreenWizard, Box::new(sink_b))
        .await
        .unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, SessionState::Planning);
    assert_eq!(snapshot.awaiting[0].player, "ada");
    assert_eq!(snapshot.awaiting[0].prompt, PromptKind::PriorityCard);

    let mut prompts = Vec::new();
    while let Ok(notification) = rx_a.try_recv() {
        if let Notification::Prompt(prompt) = notification {
            prompts.push(prompt);
        }
    }
    assert_eq!(prompts.first(), Some(&PromptKind::Avatar));
    assert_eq!(prompts.last(), Some(&PromptKind::PriorityCard));
}

#[tokio::test]
async fn test_duplicate_wizard_surfaces_rule_violation() {
    let manager = SessionManager::new();
    manager
        .create_session("t2".to_string(), SessionConfig::default())
        .unwrap();
    let (sink_a, _rx_a) = ChannelSink::new();
    let (sink_b, _rx_b) = ChannelSink::new();
    manager
        .join_with_identity("t2", "ada".to_string(), Wizard::BlueWizard, Box::new(sink_a))
        .await
        .unwrap();
    let err = manager
        .join_with_identity("t2", "bo".to_string(), Wizard::BlueWizard, Box::new(sink_b))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SessionError::Action(ActionError::Rule(RuleViolation::WizardTaken(Wizard::BlueWizard)))
    );
}

#[tokio::test]
async fn test_rejected_wizard_can_be_retried() {
    let manager = SessionManager::new();
    let handle = manager
        .create_session("t2b".to_string(), SessionConfig::default().with_seed(4))
        .unwrap();
    let (sink_a, _rx_a) = ChannelSink::new();
    manager
        .join_with_identity("t2b", "ada".to_string(), Wizard::BlueWizard, Box::new(sink_a))
        .await
        .unwrap();

    let (sink_b, _rx_b) = ChannelSink::new();
    assert!(manager
        .join_with_identity("t2b", "bo".to_string(), Wizard::BlueWizard, Box::new(sink_b))
        .await
        .is_err());
    assert_eq!(handle.snapshot().await.unwrap().state, SessionState::Setup);

    let (sink_b, _rx_b) = ChannelSink::new();
    manager
        .join_with_identity("t2b", "bo".to_string(), Wizard::PinkWizard, Box::new(sink_b))
        .await
        .unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, SessionState::Planning);
    assert_eq!(snapshot.game.players.len(), 2);
}

#[tokio::test]
async fn test_requests_are_applied_in_arrival_order() {
    let manager = SessionManager::new();
    let handle = manager
        .create_session("t3".to_string(), SessionConfig::default().with_seed(8))
        .unwrap();
    for (name, wizard) in [("ada", Wizard::BlueWizard), ("bo", Wizard::PinkWizard)] {
        let (sink, _rx) = ChannelSink::new();
        manager
            .join_with_identity("t3", name.to_string(), wizard, Box::new(sink))
            .await
            .unwrap();
    }

    let first = handle.submit(Request::new("ada", Action::PlayAssistant { card: Assistant::Dog }));
    let second = handle.submit(Request::new("bo", Action::PlayAssistant { card: Assistant::Fox }));
    let (first, second) = tokio::join!(first, second);
    first.unwrap();
    second.unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, SessionState::Action);
    assert_eq!(snapshot.awaiting[0].player, "bo");
}

#[tokio::test]
async fn test_manager_bookkeeping() {
    let manager = SessionManager::new();
    manager
        .create_session("b".to_string(), SessionConfig::default())
        .unwrap();
    manager
        .create_session("a".to_string(), SessionConfig::default())
        .unwrap();
    assert_eq!(manager.list_sessions(), vec!["a", "b"]);

    let err = manager
        .create_session("a".to_string(), SessionConfig::default())
        .unwrap_err();
    assert_eq!(err, SessionError::AlreadyExists { id: "a".into() });

    let err = manager
        .submit("zzz", Request::new("ada", Action::PlayAssistant { card: Assistant::Cat }))
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::NotFound { id: "zzz".into() });

    assert!(manager.remove_session("a").is_some());
    assert!(manager.get_session("a").is_none());
    assert_eq!(manager.list_sessions(), vec!["b"]);
}

#[tokio::test]
async fn test_invalid_config_is_refused() {
    let manager = SessionManager::new();
    let err = manager
        .create_session("bad".to_string(), SessionConfig::default().with_max_rounds(0))
        .unwrap_err();
    assert!(matches!(err, SessionError::Config(_)));
    assert!(manager.list_sessions().is_empty());
}
