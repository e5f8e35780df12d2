//! Player trait and implementations.

mod simple_ai;

pub use simple_ai::SimpleAI;

use crate::controller::SessionSnapshot;
use crate::games::eriantys::{Action, PromptKind};
use anyhow::Result;

/// Trait for participants that answer prompts with actions.
#[async_trait::async_trait]
pub trait Player: Send {
    /// Chooses an action answering `prompt`, given the current session view.
    async fn choose(&mut self, snapshot: &SessionSnapshot, prompt: PromptKind) -> Result<Action>;

    /// Returns the player's nickname.
    fn name(&self) -> &str;
}
