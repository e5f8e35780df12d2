//! Session actors and the manager that routes requests to them.
//!
//! Each session runs as one tokio task owning its [`SessionController`].
//! Requests reach it through a bounded channel and are handled one at a
//! time, in arrival order.

use crate::config::{ConfigError, SessionConfig};
use crate::controller::{SessionController, SessionId, SessionSnapshot};
use crate::games::eriantys::{Action, ActionError, PlayerId, Request, Wizard};
use crate::notify::NotificationSink;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

/// Pending commands a session buffers before senders wait.
const COMMAND_BUFFER: usize = 64;

/// Errors surfaced by session handles and the manager.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SessionError {
    /// The session task is gone.
    #[display("Session is closed")]
    Closed,
    /// A session with this id already exists.
    #[display("Session {id} already exists")]
    AlreadyExists {
        /// The duplicate id.
        id: SessionId,
    },
    /// No session with this id.
    #[display("Session {id} not found")]
    NotFound {
        /// The unknown id.
        id: SessionId,
    },
    /// The controller rejected the request.
    #[display("{_0}")]
    #[from]
    Action(ActionError),
    /// The configuration is invalid.
    #[display("{_0}")]
    #[from]
    Config(ConfigError),
}

#[derive(Debug)]
enum Command {
    Attach {
        player: PlayerId,
        sink: Box<dyn NotificationSink>,
        reply: oneshot::Sender<Result<(), ActionError>>,
    },
    Submit {
        request: Request,
        reply: oneshot::Sender<Result<(), ActionError>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// Cloneable handle to a running session task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Spawns the task owning `controller`. Needs a tokio runtime.
    #[instrument(skip(controller), fields(session_id = %controller.id()))]
    pub fn spawn(controller: SessionController) -> Self {
        let id = controller.id().clone();
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        tokio::spawn(run(controller, rx));
        info!("Session task spawned");
        Self { id, tx }
    }

    /// The session id.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Registers a participant's sink (lobby hand-off).
    #[instrument(skip(self, sink), fields(session_id = %self.id))]
    pub async fn attach(
        &self,
        player: PlayerId,
        sink: Box<dyn NotificationSink>,
    ) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Attach {
            player,
            sink,
            reply,
        })
        .await?;
        Ok(rx.await.map_err(|_| SessionError::Closed)??)
    }

    /// Submits a request and waits for the verdict.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn submit(&self, request: Request) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Submit { request, reply }).await?;
        Ok(rx.await.map_err(|_| SessionError::Closed)??)
    }

    /// Current view of the session.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    async fn send(&self, command: Command) -> Result<(), SessionError> {
        self.tx.send(command).await.map_err(|_| {
            warn!(session_id = %self.id, "Session task is gone");
            SessionError::Closed
        })
    }
}

/// The session task: one command at a time until every handle is dropped.
async fn run(mut controller: SessionController, mut rx: mpsc::Receiver<Command>) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Attach {
                player,
                sink,
                reply,
            } => {
                let _ = reply.send(controller.attach(player, sink));
            }
            Command::Submit { request, reply } => {
                let _ = reply.send(controller.handle(request));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(controller.snapshot());
            }
        }
    }
    debug!(session_id = %controller.id(), "Session task finished");
}

/// Manages all game sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<SessionId, SessionHandle>>>,
}

impl SessionManager {
    /// Creates a new session manager.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session manager");
        Self::default()
    }

    /// Creates and spawns a new session.
    #[instrument(skip(self, config))]
    pub fn create_session(
        &self,
        id: SessionId,
        config: SessionConfig,
    ) -> Result<SessionHandle, SessionError> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if sessions.contains_key(&id) {
            warn!(session_id = %id, "Session already exists");
            return Err(SessionError::AlreadyExists { id });
        }
        let handle = SessionHandle::spawn(SessionController::new(id.clone(), config)?);
        sessions.insert(id.clone(), handle.clone());
        info!(session_id = %id, "Created new session");
        Ok(handle)
    }

    /// Gets a session by ID.
    #[instrument(skip(self))]
    pub fn get_session(&self, id: &str) -> Option<SessionHandle> {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let handle = sessions.get(id).cloned();
        if handle.is_none() {
            debug!(session_id = id, "Session not found");
        }
        handle
    }

    /// Attaches a participant to a session and submits their wizard.
    #[instrument(skip(self, sink))]
    pub async fn join_with_identity(
        &self,
        session_id: &str,
        player: PlayerId,
        wizard: Wizard,
        sink: Box<dyn NotificationSink>,
    ) -> Result<SessionHandle, SessionError> {
        let handle = self.require(session_id)?;
        handle.attach(player.clone(), sink).await?;
        handle
            .submit(Request::new(player, Action::Join { wizard }))
            .await?;
        Ok(handle)
    }

    /// Routes a request to its session.
    #[instrument(skip(self))]
    pub async fn submit(&self, session_id: &str, request: Request) -> Result<(), SessionError> {
        self.require(session_id)?.submit(request).await
    }

    /// Forgets a session; its task ends once the last handle is dropped.
    #[instrument(skip(self))]
    pub fn remove_session(&self, id: &str) -> Option<SessionHandle> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let removed = sessions.remove(id);
        if removed.is_some() {
            info!(session_id = id, "Session removed");
        }
        removed
    }

    /// Lists all active session IDs.
    #[instrument(skip(self))]
    pub fn list_sessions(&self) -> Vec<SessionId> {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<_> = sessions.keys().cloned().collect();
        ids.sort();
        debug!(count = ids.len(), "Listed sessions");
        ids
    }

    fn require(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        self.get_session(session_id)
            .ok_or_else(|| SessionError::NotFound {
                id: session_id.to_string(),
            })
    }
}
