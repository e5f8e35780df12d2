//! Strictly Eriantys library - a per-session turn controller for Eriantys
//!
//! A session seats two or three participants, walks them through the
//! planning and action phases of every round, enforces the rules of the
//! base or expert variant and tells everyone what happened.
//!
//! # Architecture
//!
//! - **Games**: the Eriantys model, rules, invariants and character cards
//! - **Controller**: the state machine validating and applying requests
//! - **Session**: one tokio task per session plus a manager routing to them
//! - **Players**: bots choosing actions from a session snapshot
//! - **Script**: replays textual commands against a session
//!
//! # Example
//!
//! ```no_run
//! use strictly_eriantys::{ChannelSink, Request, Action, SessionConfig, SessionController, Wizard};
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut session = SessionController::new("table-1".to_string(), SessionConfig::default())?;
//! let (sink, _inbox) = ChannelSink::new();
//! session.attach("ludo".to_string(), Box::new(sink))?;
//! session.handle(Request::new("ludo", Action::Join { wizard: Wizard::PinkWizard }))?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod controller;
mod games;
mod notify;
mod orchestrator;
mod players;
mod script;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, PlayerCount, RuleVariant, SessionConfig};

// Crate-level exports - Turn controller
pub use controller::{
    Awaiting, SessionController, SessionId, SessionSnapshot, SessionState, TurnState,
};

// Crate-level exports - Notifications
pub use notify::{ChannelSink, Notification, NotificationSink};

// Crate-level exports - Session management
pub use session::{SessionError, SessionHandle, SessionManager};

// Crate-level exports - Automated play
pub use orchestrator::{GameEvent, Orchestrator, run_simulation};
pub use players::{Player, SimpleAI};

// Crate-level exports - Scripts
pub use script::{Script, ScriptError, ScriptEvent, ScriptLine, run_script};

// Crate-level exports - Game types (Eriantys)
pub use games::eriantys::{
    Action, ActionError, ActionKind, Archipelago, Assistant, CHARACTERS_IN_PLAY, COIN_EVERY,
    CharacterCard, CharacterId, Cloud, Color, Destination, DiningTable, Effect, EndReason, Game,
    GameSnapshot, Island, IslandId, NUM_COLORS, NUM_ISLANDS, Outcome, PromptKind, Request,
    Resolution, ResourceViolation, RuleViolation, Rules, STUDENTS_PER_COLOR, School, StudentPool,
    Swap, TABLE_LENGTH, Termination, TowerColor, TurnModifiers, VETO_TILES, Wizard,
    Player as Seat, PlayerId,
};

// Rule helpers and invariants, for tests and tooling
pub use games::eriantys::invariants;
pub use games::eriantys::rules;
