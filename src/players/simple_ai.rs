//! Simple AI player for simulations.

use super::Player;
use crate::controller::SessionSnapshot;
use crate::games::eriantys::rules::is_playable;
use crate::games::eriantys::{Action, Assistant, Destination, PromptKind, Wizard};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use strum::IntoEnumIterator;
use tracing::debug;

/// Random but always-legal bot. Never plays character cards.
pub struct SimpleAI {
    name: String,
    rng: StdRng,
}

impl SimpleAI {
    /// Creates a bot with its own seeded generator.
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick_wizard(&self, snapshot: &SessionSnapshot) -> Result<Wizard> {
        Wizard::iter()
            .find(|w| !snapshot.game.players.iter().any(|p| p.wizard() == w))
            .context("No wizard left")
    }

    fn pick_card(&mut self, snapshot: &SessionSnapshot) -> Result<Assistant> {
        let me = snapshot
            .game
            .players
            .iter()
            .find(|p| p.nickname() == &self.name)
            .context("Not seated")?;
        let played: Vec<Assistant> = snapshot
            .game
            .players
            .iter()
            .filter(|p| p.nickname() != &self.name)
            .filter_map(|p| *p.last_played())
            .collect();
        let first = *snapshot.turn.pointer() == 0;
        let legal: Vec<Assistant> = me
            .hand()
            .iter()
            .copied()
            .filter(|card| is_playable(me.hand(), &played, first, *card))
            .collect();
        legal.choose(&mut self.rng).copied().context("Empty hand")
    }

    fn pick_move(&mut self, snapshot: &SessionSnapshot) -> Result<Action> {
        let me = snapshot
            .game
            .players
            .iter()
            .find(|p| p.nickname() == &self.name)
            .context("Not seated")?;
        let colors = me.school().entrance().colors();
        let color = *colors.choose(&mut self.rng).context("Empty entrance")?;
        let destination = if !me.school().table(color).is_full() && self.rng.random_bool(0.5) {
            Destination::Table
        } else {
            let island = snapshot
                .game
                .archipelago
                .islands()
                .choose(&mut self.rng)
                .context("No island left")?;
            Destination::Island(*island.id())
        };
        Ok(Action::MoveStudent { color, destination })
    }
}

#[async_trait::async_trait]
impl Player for SimpleAI {
    async fn choose(&mut self, snapshot: &SessionSnapshot, prompt: PromptKind) -> Result<Action> {
        let action = match prompt {
            PromptKind::Avatar => Action::Join {
                wizard: self.pick_wizard(snapshot)?,
            },
            PromptKind::PriorityCard => Action::PlayAssistant {
                card: self.pick_card(snapshot)?,
            },
            PromptKind::StudentMove | PromptKind::CharacterOrMove => self.pick_move(snapshot)?,
            PromptKind::MotherNatureSteps => {
                let max = *snapshot.game.modifiers.max_steps();
                Action::MoveMotherNature {
                    steps: self.rng.random_range(1..=max),
                }
            }
            PromptKind::Cloud => Action::ChooseCloud {
                cloud: snapshot
                    .game
                    .clouds
                    .iter()
                    .position(|c| !c.is_empty())
                    .unwrap_or(0),
            },
        };
        debug!(ai = %self.name, %action, "AI chose action");
        Ok(action)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
