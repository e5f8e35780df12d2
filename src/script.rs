//! Drives a session from a plain-text command file.
//!
//! One command per line, `#` starts a comment:
//!
//! ```text
//! ludo join PINK_WIZARD
//! ludo card CAT
//! ludo move RED table
//! ludo move RED island 3
//! ludo steps 2
//! ludo cloud 1
//! ludo character 11 RED
//! ludo character 7 RED:BLUE GREEN:PINK
//! ```
//!
//! Clouds are numbered from 1 in scripts.

use crate::config::SessionConfig;
use crate::controller::{SessionController, SessionSnapshot};
use crate::games::eriantys::{
    Action, CharacterId, Color, Destination, Effect, IslandId, PlayerId, Request, Swap,
};
use crate::notify::{ChannelSink, Notification};
use derive_more::{Display, Error};
use std::collections::BTreeMap;
use std::str::FromStr;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// A line of the script could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("line {line}: {message}")]
pub struct ScriptError {
    /// 1-based line number.
    pub line: usize,
    /// What went wrong.
    pub message: String,
}

/// One parsed command, tagged with its line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    /// 1-based line number.
    pub line: usize,
    /// The request to submit.
    pub request: Request,
}

/// A parsed script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    lines: Vec<ScriptLine>,
}

impl Script {
    /// The parsed commands in order.
    pub fn lines(&self) -> &[ScriptLine] {
        &self.lines
    }
}

impl FromStr for Script {
    type Err = ScriptError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut lines = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            let request = parse_request(content).map_err(|message| ScriptError { line, message })?;
            lines.push(ScriptLine { line, request });
        }
        Ok(Self { lines })
    }
}

fn parse_request(content: &str) -> Result<Request, String> {
    let words: Vec<&str> = content.split_whitespace().collect();
    let [player, command, args @ ..] = words.as_slice() else {
        return Err("expected `<nickname> <command> ...`".to_string());
    };
    let action = match (*command, args) {
        ("join", [wizard]) => Action::Join {
            wizard: parse(wizard)?,
        },
        ("card", [card]) => Action::PlayAssistant { card: parse(card)? },
        ("move", [color, "table"]) => Action::MoveStudent {
            color: parse(color)?,
            destination: Destination::Table,
        },
        ("move", [color, "island", island]) => Action::MoveStudent {
            color: parse(color)?,
            destination: Destination::Island(parse(island)?),
        },
        ("steps", [steps]) => Action::MoveMotherNature {
            steps: parse(steps)?,
        },
        ("cloud", [cloud]) => {
            let number: usize = parse(cloud)?;
            let cloud = number
                .checked_sub(1)
                .ok_or_else(|| "clouds are numbered from 1".to_string())?;
            Action::ChooseCloud { cloud }
        }
        ("character", [number, params @ ..]) => {
            let number: u8 = parse(number)?;
            let card = CharacterId::from_repr(number)
                .ok_or_else(|| format!("no character number {}", number))?;
            Action::PlayCharacter {
                card,
                effect: parse_effect(card, params)?,
            }
        }
        _ => return Err(format!("cannot understand `{}`", content)),
    };
    Ok(Request::new(*player, action))
}

fn parse_effect(card: CharacterId, params: &[&str]) -> Result<Effect, String> {
    let effect = match (card, params) {
        (CharacterId::Monk, [color, island]) => Effect::Monk {
            color: parse(color)?,
            island: parse::<IslandId>(island)?,
        },
        (CharacterId::Farmer, []) => Effect::Farmer,
        (CharacterId::Herald, [island]) => Effect::Herald {
            island: parse(island)?,
        },
        (CharacterId::MagicMailman, []) => Effect::MagicMailman,
        (CharacterId::GrandmaHerbs, [island]) => Effect::GrandmaHerbs {
            island: parse(island)?,
        },
        (CharacterId::Centaur, []) => Effect::Centaur,
        (CharacterId::Jester, swaps) => Effect::Jester {
            swaps: parse_swaps(swaps)?,
        },
        (CharacterId::Knight, []) => Effect::Knight,
        (CharacterId::MushroomMan, [color]) => Effect::MushroomMan {
            color: parse(color)?,
        },
        (CharacterId::Minstrel, swaps) => Effect::Minstrel {
            swaps: parse_swaps(swaps)?,
        },
        (CharacterId::SpoiledPrincess, [color]) => Effect::SpoiledPrincess {
            color: parse(color)?,
        },
        (CharacterId::Thief, [color]) => Effect::Thief {
            color: parse(color)?,
        },
        (card, _) => return Err(format!("wrong parameters for {}", card)),
    };
    Ok(effect)
}

fn parse_swaps(words: &[&str]) -> Result<Vec<Swap>, String> {
    words
        .iter()
        .map(|word| {
            let (give, take) = word
                .split_once(':')
                .ok_or_else(|| format!("expected GIVE:TAKE, got `{}`", word))?;
            Ok(Swap::new(parse::<Color>(give)?, parse::<Color>(take)?))
        })
        .collect()
}

fn parse<T: FromStr>(word: &str) -> Result<T, String> {
    word.parse()
        .map_err(|_| format!("cannot read `{}` as {}", word, std::any::type_name::<T>()))
}

/// Something that happened while a script ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEvent {
    /// A command was accepted.
    Accepted(ScriptLine),
    /// A command was rejected by the controller.
    Rejected {
        /// The command.
        line: ScriptLine,
        /// Why.
        reason: String,
    },
    /// A participant received a notification.
    Notified {
        /// Recipient.
        player: PlayerId,
        /// What they received.
        notification: Notification,
    },
}

/// Runs a script against a fresh session, reporting every event.
///
/// Participants are attached the first time their nickname appears.
#[instrument(skip(config, script, report))]
pub fn run_script(
    config: SessionConfig,
    script: &Script,
    mut report: impl FnMut(ScriptEvent),
) -> Result<SessionSnapshot, crate::config::ConfigError> {
    let mut controller = SessionController::new("script".to_string(), config)?;
    let mut inboxes: BTreeMap<PlayerId, mpsc::UnboundedReceiver<Notification>> = BTreeMap::new();

    for line in script.lines() {
        let player = &line.request.player;
        if !inboxes.contains_key(player) {
            let (sink, rx) = ChannelSink::new();
            match controller.attach(player.clone(), Box::new(sink)) {
                Ok(()) => {
                    debug!(%player, "Attached script participant");
                    inboxes.insert(player.clone(), rx);
                }
                Err(error) => warn!(%player, %error, "Could not attach participant"),
            }
        }

        match controller.handle(line.request.clone()) {
            Ok(()) => report(ScriptEvent::Accepted(line.clone())),
            Err(error) => report(ScriptEvent::Rejected {
                line: line.clone(),
                reason: error.to_string(),
            }),
        }

        for (player, inbox) in inboxes.iter_mut() {
            while let Ok(notification) = inbox.try_recv() {
                report(ScriptEvent::Notified {
                    player: player.clone(),
                    notification,
                });
            }
        }
    }

    info!(state = %controller.state(), "Script finished");
    Ok(controller.snapshot())
}
