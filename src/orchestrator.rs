//! Drives a whole session with automated players.

use crate::config::SessionConfig;
use crate::controller::{SessionController, SessionId};
use crate::games::eriantys::{Action, PlayerId, Request, Termination};
use crate::notify::{ChannelSink, Notification};
use crate::players::Player;
use crate::session::{SessionError, SessionHandle};
use anyhow::{Result, bail};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Rejections in a row after which a simulation gives up.
const MAX_REJECTIONS: usize = 100;

/// Messages sent from the orchestrator to whoever watches the game.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// An action was accepted.
    ActionTaken {
        /// Who acted.
        player: PlayerId,
        /// What they did.
        action: Action,
    },
    /// An action was refused.
    Rejected {
        /// Who tried.
        player: PlayerId,
        /// Why it failed.
        reason: String,
    },
    /// Game ended.
    GameOver(Termination),
}

/// Orchestrates a session between automated players.
pub struct Orchestrator {
    handle: SessionHandle,
    players: Vec<Box<dyn Player>>,
    inboxes: Vec<mpsc::UnboundedReceiver<Notification>>,
    event_tx: mpsc::UnboundedSender<GameEvent>,
}

impl Orchestrator {
    /// Spawns the session and attaches every player to it.
    #[instrument(skip(config, players, event_tx))]
    pub async fn new(
        id: SessionId,
        config: SessionConfig,
        players: Vec<Box<dyn Player>>,
        event_tx: mpsc::UnboundedSender<GameEvent>,
    ) -> Result<Self> {
        if players.len() != config.players().get() {
            bail!(
                "{} players configured, {} provided",
                config.players(),
                players.len()
            );
        }
        let handle = SessionHandle::spawn(SessionController::new(id, config)?);
        let mut inboxes = Vec::with_capacity(players.len());
        for player in &players {
            let (sink, rx) = ChannelSink::new();
            handle.attach(player.name().to_string(), Box::new(sink)).await?;
            inboxes.push(rx);
        }
        Ok(Self {
            handle,
            players,
            inboxes,
            event_tx,
        })
    }

    /// Runs the game loop until the session terminates.
    #[instrument(skip(self), fields(session_id = %self.handle.id()))]
    pub async fn run(&mut self) -> Result<Termination> {
        info!("Starting game orchestration");
        let mut rejections = 0;

        loop {
            let snapshot = self.handle.snapshot().await?;
            if let Some(termination) = snapshot.termination.clone() {
                info!(%termination, "Game over");
                let _ = self.event_tx.send(GameEvent::GameOver(termination.clone()));
                return Ok(termination);
            }
            let Some(awaiting) = snapshot.awaiting.first().cloned() else {
                bail!("Session is waiting for nobody");
            };
            let Some(player) = self
                .players
                .iter_mut()
                .find(|p| p.name() == awaiting.player)
            else {
                bail!("No player named {}", awaiting.player);
            };

            debug!(player = %awaiting.player, prompt = %awaiting.prompt, "Waiting for action");
            let action = player.choose(&snapshot, awaiting.prompt).await?;
            let request = Request::new(awaiting.player.clone(), action.clone());
            match self.handle.submit(request).await {
                Ok(()) => {
                    rejections = 0;
                    let _ = self.event_tx.send(GameEvent::ActionTaken {
                        player: awaiting.player,
                        action,
                    });
                }
                Err(SessionError::Action(error)) => {
                    rejections += 1;
                    warn!(player = %awaiting.player, %error, rejections, "Action rejected");
                    let _ = self.event_tx.send(GameEvent::Rejected {
                        player: awaiting.player,
                        reason: error.to_string(),
                    });
                    if rejections >= MAX_REJECTIONS {
                        bail!("Too many rejected actions in a row");
                    }
                }
                Err(other) => return Err(other.into()),
            }
            self.drain_inboxes();
        }
    }

    /// Discards notifications; bots read the snapshot instead.
    fn drain_inboxes(&mut self) {
        for inbox in self.inboxes.iter_mut() {
            while inbox.try_recv().is_ok() {}
        }
    }
}

/// Runs a complete simulated session and returns how it ended.
#[instrument(skip(config, players))]
pub async fn run_simulation(
    id: SessionId,
    config: SessionConfig,
    players: Vec<Box<dyn Player>>,
) -> Result<(Termination, Vec<GameEvent>)> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut orchestrator = Orchestrator::new(id, config, players, event_tx).await?;
    let termination = orchestrator.run().await?;
    drop(orchestrator);
    let mut events = Vec::new();
    while let Some(event) = event_rx.recv().await {
        events.push(event);
    }
    Ok((termination, events))
}
