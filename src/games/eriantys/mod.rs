//! Eriantys: islands, schools, professors and a priority auction.

mod action;
mod assistant;
mod board;
mod characters;
mod game;
pub mod invariants;
mod player;
pub mod rules;
mod school;
mod snapshot;
mod types;

pub use action::{
    Action, ActionError, ActionKind, Destination, PromptKind, Request, ResourceViolation,
    RuleViolation,
};
pub use assistant::Assistant;
pub use board::{Archipelago, Cloud, Island, IslandId};
pub use characters::{CharacterCard, CharacterId, Effect, Swap};
pub use game::{Game, Rules, TurnModifiers};
pub use player::{Player, PlayerId};
pub use rules::{EndReason, Outcome, Resolution, Termination};
pub use school::{DiningTable, School};
pub use snapshot::GameSnapshot;
pub use types::{
    CHARACTERS_IN_PLAY, COIN_EVERY, Color, NUM_COLORS, NUM_ISLANDS, STUDENTS_PER_COLOR,
    StudentPool, TABLE_LENGTH, TowerColor, VETO_TILES, Wizard,
};
