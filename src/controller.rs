//! The per-session turn controller.
//!
//! A [`SessionController`] sequences one session through
//! `Setup → Planning → Action → … → Terminated`, validates every request
//! against the current state, commits it to the game model and notifies
//! participants through their sinks.
//!
//! Every mutation runs on a copy of the model that replaces the original
//! only once the action completed and the invariants still hold, so a
//! rejected action never leaves a partial change behind.

use crate::config::{ConfigError, SessionConfig};
use crate::games::eriantys::invariants::{EriantysInvariants, InvariantSet};
use crate::games::eriantys::rules::{check_end, is_playable, resolve_winner};
use crate::games::eriantys::{
    Action, ActionError, ActionKind, Assistant, CharacterId, Color, Destination, EndReason, Effect,
    Game, GameSnapshot, PlayerId, PromptKind, Request, Resolution, RuleViolation, Termination,
    Wizard,
};
use crate::notify::{Notification, NotificationSink};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Top-level state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    /// Waiting for every seat to pick a wizard.
    Setup,
    /// Players play priority cards in turn.
    Planning,
    /// Players take their action turns.
    Action,
    /// The session is over.
    Terminated,
}

/// Per-turn bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
pub struct TurnState {
    /// Index into the turn order of the player who acts.
    pointer: usize,
    /// Student moves left this turn.
    moves_left: u32,
    /// Mother nature already moved this turn.
    mother_nature_moved: bool,
    /// A character card was already invoked this turn.
    character_played: bool,
}

/// Who the session waits for, and with which prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Awaiting {
    /// The participant expected to act.
    pub player: PlayerId,
    /// The kind of action expected.
    pub prompt: PromptKind,
}

/// Serializable view of a whole session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session id.
    pub id: SessionId,
    /// Top-level state.
    pub state: SessionState,
    /// Turn bookkeeping.
    pub turn: TurnState,
    /// Pending prompts.
    pub awaiting: Vec<Awaiting>,
    /// The board.
    pub game: GameSnapshot,
    /// Set once the session terminated.
    pub termination: Option<Termination>,
}

/// The turn controller of one session.
#[derive(Debug, Getters)]
pub struct SessionController {
    id: SessionId,
    config: SessionConfig,
    state: SessionState,
    game: Game,
    turn: TurnState,
    termination: Option<Termination>,
    #[getter(skip)]
    sinks: HashMap<PlayerId, Box<dyn NotificationSink>>,
}

impl SessionController {
    /// Creates a session waiting in `Setup`.
    #[instrument(skip(config))]
    pub fn new(id: SessionId, config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(session_id = %id, players = %config.players(), variant = %config.variant(), "Creating session");
        let game = Game::new(&config);
        Ok(Self {
            id,
            config,
            state: SessionState::Setup,
            game,
            turn: TurnState::default(),
            termination: None,
            sinks: HashMap::new(),
        })
    }

    // ─────────────────────────────────────────────────────────────
    //  Inbound surface
    // ─────────────────────────────────────────────────────────────

    /// Registers a participant's notification sink and prompts for a wizard.
    ///
    /// Attaching again before taking a seat replaces the earlier sink.
    #[instrument(skip(self, sink), fields(session_id = %self.id))]
    pub fn attach(
        &mut self,
        player: PlayerId,
        sink: Box<dyn NotificationSink>,
    ) -> Result<(), ActionError> {
        if self.state != SessionState::Setup
            || self.sinks.len() >= self.config.players().get() && !self.sinks.contains_key(&player)
        {
            warn!(%player, "Session is full");
            return Err(ActionError::SessionFull);
        }
        if self.game.player(&player).is_some() {
            warn!(%player, "Nickname already seated");
            return Err(RuleViolation::AlreadyJoined.into());
        }
        if self.sinks.contains_key(&player) {
            debug!(%player, "Replacing sink of unseated participant");
        } else {
            info!(%player, "Participant attached");
        }
        sink.deliver(Notification::Prompt(PromptKind::Avatar));
        self.sinks.insert(player, sink);
        Ok(())
    }

    /// Validates and applies one request, notifying participants.
    ///
    /// A rejection is reported to the issuing participant only, followed by
    /// the same prompt when it makes sense to retry.
    #[instrument(skip(self), fields(session_id = %self.id, state = %self.state))]
    pub fn handle(&mut self, request: Request) -> Result<(), ActionError> {
        debug!(%request, "Handling request");
        let player = request.player.clone();
        let result = self.dispatch(request);
        if let Err(error) = &result {
            self.reject(&player, error);
        }
        result
    }

    /// Pending prompts: who is expected to act, and how.
    pub fn awaiting(&self) -> Vec<Awaiting> {
        match self.state {
            SessionState::Setup => self
                .sinks
                .keys()
                .filter(|player| self.game.player(player).is_none())
                .map(|player| Awaiting {
                    player: player.clone(),
                    prompt: PromptKind::Avatar,
                })
                .collect(),
            SessionState::Planning | SessionState::Action => self
                .current_player()
                .zip(self.expected_prompt())
                .map(|(player, prompt)| Awaiting { player, prompt })
                .into_iter()
                .collect(),
            SessionState::Terminated => Vec::new(),
        }
    }

    /// Serializable view of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        let mut awaiting = self.awaiting();
        awaiting.sort_by(|a, b| a.player.cmp(&b.player));
        SessionSnapshot {
            id: self.id.clone(),
            state: self.state,
            turn: self.turn,
            awaiting,
            game: GameSnapshot::from(&self.game),
            termination: self.termination.clone(),
        }
    }

    /// Nickname of the participant whose turn it is.
    pub fn current_player(&self) -> Option<PlayerId> {
        match self.state {
            SessionState::Planning | SessionState::Action => self
                .game
                .players()
                .get(self.turn.pointer)
                .map(|p| p.nickname().clone()),
            _ => None,
        }
    }

    /// Checks if the session stopped accepting actions.
    pub fn is_terminated(&self) -> bool {
        self.state == SessionState::Terminated
    }

    // ─────────────────────────────────────────────────────────────
    //  Validation and dispatch
    // ─────────────────────────────────────────────────────────────

    fn dispatch(&mut self, request: Request) -> Result<(), ActionError> {
        let Request { player, action } = request;
        if self.state == SessionState::Terminated {
            return Err(ActionError::SessionOver);
        }
        if !self.sinks.contains_key(&player) {
            return Err(ActionError::UnknownParticipant { player });
        }

        let kind = ActionKind::from(&action);
        if self.state == SessionState::Setup {
            return match action {
                Action::Join { wizard } => self.join(player, wizard),
                _ => Err(ActionError::WrongPhase {
                    expected: PromptKind::Avatar,
                    got: kind,
                }),
            };
        }

        if self.current_player().as_ref() != Some(&player) {
            return Err(ActionError::IllegalTurn { player });
        }
        self.check_phase(kind)?;

        match action {
            Action::Join { .. } => Err(RuleViolation::AlreadyJoined.into()),
            Action::PlayAssistant { card } => self.play_assistant(&player, card),
            Action::MoveStudent { color, destination } => {
                self.move_student(&player, color, destination)
            }
            Action::MoveMotherNature { steps } => self.move_mother_nature(&player, steps),
            Action::ChooseCloud { cloud } => self.choose_cloud(&player, cloud),
            Action::PlayCharacter { card, effect } => self.play_character(&player, card, effect),
        }
    }

    /// The prompt the current participant answers next.
    fn expected_prompt(&self) -> Option<PromptKind> {
        match self.state {
            SessionState::Setup => Some(PromptKind::Avatar),
            SessionState::Planning => Some(PromptKind::PriorityCard),
            SessionState::Action if self.turn.moves_left > 0 => {
                if self.game.is_expert() && !self.turn.character_played {
                    Some(PromptKind::CharacterOrMove)
                } else {
                    Some(PromptKind::StudentMove)
                }
            }
            SessionState::Action if !self.turn.mother_nature_moved => {
                Some(PromptKind::MotherNatureSteps)
            }
            SessionState::Action => Some(PromptKind::Cloud),
            SessionState::Terminated => None,
        }
    }

    /// Checks that `kind` fits the pending prompt of the current participant.
    fn check_phase(&self, kind: ActionKind) -> Result<(), ActionError> {
        let Some(expected) = self.expected_prompt() else {
            return Err(ActionError::SessionOver);
        };
        if self.state == SessionState::Action {
            match kind {
                ActionKind::PlayCharacter => {
                    if !self.game.is_expert() {
                        return Err(RuleViolation::ExpertOnly.into());
                    }
                    if self.turn.character_played {
                        return Err(RuleViolation::CharacterAlreadyPlayed.into());
                    }
                    return Ok(());
                }
                ActionKind::MoveStudent if self.turn.moves_left == 0 => {
                    return Err(RuleViolation::NoMovesLeft.into());
                }
                _ => {}
            }
        }
        if expected.accepts(kind) {
            Ok(())
        } else {
            Err(ActionError::WrongPhase {
                expected,
                got: kind,
            })
        }
    }

    /// Applies `mutate` to a copy of the model and swaps it in on success.
    fn commit<T>(
        &mut self,
        mutate: impl FnOnce(&mut Game) -> Result<T, ActionError>,
    ) -> Result<T, ActionError> {
        let mut next = self.game.clone();
        let value = mutate(&mut next)?;
        if cfg!(debug_assertions)
            && let Err(violations) = EriantysInvariants::check_all(&next)
        {
            let description = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(%description, "Invariant broken, discarding action");
            return Err(ActionError::Invariant { description });
        }
        self.game = next;
        Ok(value)
    }

    // ─────────────────────────────────────────────────────────────
    //  Setup
    // ─────────────────────────────────────────────────────────────

    #[instrument(skip(self))]
    fn join(&mut self, player: PlayerId, wizard: Wizard) -> Result<(), ActionError> {
        let tower = self.commit(|game| Ok(game.add_player(player.clone(), wizard)?))?;
        info!(%player, %wizard, %tower, "Participant joined");
        self.broadcast_except(
            &player,
            format!("{} joined as {} with {} towers", player, wizard, tower),
        );
        if self.game.is_full() {
            self.start()?;
        }
        Ok(())
    }

    /// Sets the board up and opens the first planning phase.
    #[instrument(skip(self))]
    fn start(&mut self) -> Result<(), ActionError> {
        let characters = self.config.characters().clone();
        self.commit(|game| {
            game.setup(characters.as_deref());
            Ok(())
        })?;
        self.state = SessionState::Planning;
        self.turn = TurnState::default();
        info!(order = ?self.game.turn_order(), "Session started");
        self.publish();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    //  Planning
    // ─────────────────────────────────────────────────────────────

    #[instrument(skip(self))]
    fn play_assistant(&mut self, player: &str, card: Assistant) -> Result<(), ActionError> {
        let played: Vec<Assistant> = self
            .game
            .players()
            .iter()
            .filter(|p| p.nickname() != player)
            .filter_map(|p| *p.last_played())
            .collect();
        let hand = self
            .game
            .player(player)
            .map(|p| p.hand().clone())
            .unwrap_or_default();
        if !hand.contains(&card) {
            return Err(RuleViolation::CardNotInHand(card).into());
        }
        if !is_playable(&hand, &played, self.turn.pointer == 0, card) {
            return Err(RuleViolation::CardNotPlayable(card).into());
        }

        self.commit(|game| Ok(game.player_mut(player)?.play_assistant(card)?))?;
        info!(player, %card, "Priority card played");
        self.broadcast_except(player, format!("{} played {}", player, card));

        self.turn.pointer += 1;
        if self.turn.pointer >= self.game.players().len() {
            self.end_planning();
        }
        self.publish();
        Ok(())
    }

    /// Fixes the turn order for the action phase.
    #[instrument(skip(self))]
    fn end_planning(&mut self) {
        self.game.order_by_priority();
        self.state = SessionState::Action;
        self.begin_turn(0);
        info!(order = ?self.game.turn_order(), "Action phase begins");
    }

    // ─────────────────────────────────────────────────────────────
    //  Action
    // ─────────────────────────────────────────────────────────────

    fn begin_turn(&mut self, pointer: usize) {
        self.turn = TurnState {
            pointer,
            moves_left: *self.game.rules().moves(),
            mother_nature_moved: false,
            character_played: false,
        };
    }

    #[instrument(skip(self))]
    fn move_student(
        &mut self,
        player: &str,
        color: Color,
        destination: Destination,
    ) -> Result<(), ActionError> {
        self.commit(|game| game.move_student(player, color, destination))?;
        self.turn.moves_left -= 1;
        debug!(moves_left = self.turn.moves_left, "Student moved");
        self.broadcast_except(player, format!("{} moved {} to {}", player, color, destination));
        self.publish();
        Ok(())
    }

    #[instrument(skip(self))]
    fn move_mother_nature(&mut self, player: &str, steps: usize) -> Result<(), ActionError> {
        let resolution = self.commit(|game| Ok(game.move_mother_nature(player, steps)?))?;
        self.turn.mother_nature_moved = true;
        info!(player, steps, ?resolution, "Mother nature moved");
        self.announce(player, &resolution);
        self.publish();
        Ok(())
    }

    #[instrument(skip(self))]
    fn choose_cloud(&mut self, player: &str, cloud: usize) -> Result<(), ActionError> {
        let drawn = self.commit(|game| game.take_cloud(player, cloud))?;
        debug!(player, cloud, drawn, "Cloud drained");
        self.broadcast_except(player, format!("{} took cloud {}", player, cloud + 1));
        self.end_turn(player);
        Ok(())
    }

    #[instrument(skip(self, effect))]
    fn play_character(
        &mut self,
        player: &str,
        card: CharacterId,
        effect: Effect,
    ) -> Result<(), ActionError> {
        self.commit(|game| game.play_character(player, card, effect))?;
        self.turn.character_played = true;
        self.broadcast_except(player, format!("{} invoked {}", player, card));
        self.publish();
        Ok(())
    }

    /// Ends the current turn: checks the end of the game, then moves on.
    #[instrument(skip(self))]
    fn end_turn(&mut self, player: &str) {
        self.game.end_turn();
        let last = self.turn.pointer + 1 >= self.game.players().len();
        if let Some(reason) = check_end(&self.game, player, last, *self.config.max_rounds()) {
            self.terminate(reason);
            return;
        }
        if last {
            self.close_round();
        } else {
            self.begin_turn(self.turn.pointer + 1);
        }
        self.publish();
    }

    /// Refills clouds and returns to planning.
    #[instrument(skip(self))]
    fn close_round(&mut self) {
        self.game.close_round();
        self.state = SessionState::Planning;
        self.turn = TurnState::default();
        info!(round = self.game.round(), "Round closed");
    }

    #[instrument(skip(self))]
    fn terminate(&mut self, reason: EndReason) {
        let outcome = resolve_winner(self.game.players());
        let termination = Termination { reason, outcome };
        info!(%termination, "Session terminated");
        self.state = SessionState::Terminated;
        self.termination = Some(termination.clone());
        self.publish_state();
        self.broadcast(Notification::GameOver(termination));
    }

    // ─────────────────────────────────────────────────────────────
    //  Notifications
    // ─────────────────────────────────────────────────────────────

    fn reject(&self, player: &str, error: &ActionError) {
        warn!(player, %error, "Request rejected");
        let Some(sink) = self.sinks.get(player) else {
            return;
        };
        sink.deliver(Notification::Message(error.to_string()));
        if !error.reprompts() {
            return;
        }
        let prompt = match self.state {
            SessionState::Setup => Some(PromptKind::Avatar),
            _ if self.current_player().as_deref() == Some(player) => self.expected_prompt(),
            _ => None,
        };
        if let Some(prompt) = prompt {
            sink.deliver(Notification::Prompt(prompt));
        }
    }

    fn announce(&self, player: &str, resolution: &Resolution) {
        let text = match resolution {
            Resolution::Vetoed { island } => format!("A veto tile protected island {}", island),
            Resolution::Unchanged { island } => {
                format!("{} moved mother nature to island {}", player, island)
            }
            Resolution::Conquered { island, owner, .. } => {
                format!("{} ({}) conquered island {}", player, owner, island)
            }
        };
        self.broadcast(Notification::Message(text));
    }

    /// Sends the state to everyone, then the pending prompt to the current player.
    fn publish(&self) {
        self.publish_state();
        for awaiting in self.awaiting() {
            if let Some(sink) = self.sinks.get(&awaiting.player) {
                sink.deliver(Notification::Prompt(awaiting.prompt));
            }
        }
    }

    /// Sends each participant the state with opponents' hands hidden.
    fn publish_state(&self) {
        let snapshot = self.snapshot();
        for (player, sink) in &self.sinks {
            let mut view = snapshot.clone();
            view.game = view.game.concealed_for(player);
            sink.deliver(Notification::State(Box::new(view)));
        }
    }

    fn broadcast(&self, notification: Notification) {
        for sink in self.sinks.values() {
            sink.deliver(notification.clone());
        }
    }

    fn broadcast_except(&self, excluded: &str, text: String) {
        for (player, sink) in &self.sinks {
            if player != excluded {
                sink.deliver(Notification::Message(text.clone()));
            }
        }
    }
}
