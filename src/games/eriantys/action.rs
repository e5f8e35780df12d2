//! First-class request types for Eriantys.
//!
//! Requests are domain events, not side effects. They carry the
//! participant's intent and are validated by the session controller
//! before anything is mutated.

use super::assistant::Assistant;
use super::board::IslandId;
use super::characters::{CharacterId, Effect};
use super::player::PlayerId;
use super::types::{Color, Wizard};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An action submitted by a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Request {
    /// Nickname of the issuing participant.
    pub player: PlayerId,
    /// What the participant wants to do.
    pub action: Action,
}

impl Request {
    /// Creates a new request.
    pub fn new(player: impl Into<PlayerId>, action: Action) -> Self {
        Self {
            player: player.into(),
            action,
        }
    }
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.player, self.action)
    }
}

/// Where a student moved out of the entrance ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, derive_more::Display)]
#[serde(rename_all = "snake_case", tag = "kind", content = "island")]
pub enum Destination {
    /// The dining table of the student's color.
    #[display("table")]
    Table,
    /// An island of the ring, by id.
    #[display("island {_0}")]
    Island(IslandId),
}

/// Every action the controller understands.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, strum::EnumDiscriminants,
)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum_discriminants(name(ActionKind), derive(strum::Display, Hash))]
pub enum Action {
    /// Pick an avatar and take a seat.
    Join {
        /// The chosen wizard.
        wizard: Wizard,
    },
    /// Play a priority card during planning.
    PlayAssistant {
        /// The card to play.
        card: Assistant,
    },
    /// Move one student out of the entrance.
    MoveStudent {
        /// Color of the student.
        color: Color,
        /// Own table or an island.
        destination: Destination,
    },
    /// Move mother nature clockwise.
    MoveMotherNature {
        /// Number of steps.
        steps: usize,
    },
    /// Drain a cloud into the entrance (0-based).
    ChooseCloud {
        /// Cloud index.
        cloud: usize,
    },
    /// Invoke a character card (expert rules).
    PlayCharacter {
        /// Which card.
        card: CharacterId,
        /// Effect parameters.
        effect: Effect,
    },
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Join { wizard } => write!(f, "join as {}", wizard),
            Action::PlayAssistant { card } => write!(f, "play {}", card),
            Action::MoveStudent { color, destination } => {
                write!(f, "move {} to {}", color, destination)
            }
            Action::MoveMotherNature { steps } => write!(f, "mother nature +{}", steps),
            Action::ChooseCloud { cloud } => write!(f, "cloud {}", cloud),
            Action::PlayCharacter { card, .. } => write!(f, "character {}", card),
        }
    }
}

/// The kind of input a participant is prompted for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PromptKind {
    /// Choose a wizard.
    Avatar,
    /// Play a priority card.
    PriorityCard,
    /// Move a student.
    StudentMove,
    /// Move mother nature.
    MotherNatureSteps,
    /// Choose a cloud.
    Cloud,
    /// Move a student or invoke a character card.
    CharacterOrMove,
}

impl PromptKind {
    /// Checks if an action of the given kind answers this prompt.
    pub fn accepts(self, kind: ActionKind) -> bool {
        match self {
            PromptKind::Avatar => kind == ActionKind::Join,
            PromptKind::PriorityCard => kind == ActionKind::PlayAssistant,
            PromptKind::StudentMove => kind == ActionKind::MoveStudent,
            PromptKind::MotherNatureSteps => kind == ActionKind::MoveMotherNature,
            PromptKind::Cloud => kind == ActionKind::ChooseCloud,
            PromptKind::CharacterOrMove => {
                matches!(kind, ActionKind::MoveStudent | ActionKind::PlayCharacter)
            }
        }
    }
}

/// A game rule refused the action. Recoverable: the same prompt is reissued.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RuleViolation {
    /// The dining table of that color has no free seat.
    #[display("The {_0} table is full")]
    TableFull(Color),
    /// No student of that color is waiting in the entrance.
    #[display("No {_0} student in the entrance")]
    StudentNotInEntrance(Color),
    /// The referenced island does not exist (any more).
    #[display("Island {_0} does not exist")]
    IslandNotFound(IslandId),
    /// Mother nature step count out of bounds.
    #[display("Mother nature moves 1 to {max} steps, not {requested}")]
    InvalidSteps {
        /// Requested steps.
        requested: usize,
        /// Current limit.
        max: usize,
    },
    /// The referenced cloud does not exist.
    #[display("Cloud {_0} does not exist")]
    CloudNotFound(usize),
    /// The cloud was already drained this round.
    #[display("Cloud {_0} is empty")]
    CloudEmpty(usize),
    /// The student-move budget is exhausted.
    #[display("No student moves left this turn")]
    NoMovesLeft,
    /// The card is not in the player's hand.
    #[display("{_0} is not in your hand")]
    CardNotInHand(Assistant),
    /// Another player already played this card and alternatives exist.
    #[display("{_0} was already played this round")]
    CardNotPlayable(Assistant),
    /// Another participant holds that wizard.
    #[display("{_0} is already taken")]
    WizardTaken(Wizard),
    /// The participant already chose a wizard.
    #[display("You already joined this session")]
    AlreadyJoined,
    /// That character card is not in play.
    #[display("Character {_0} is not in play")]
    CharacterNotInPlay(CharacterId),
    /// A character was already invoked this turn.
    #[display("A character was already played this turn")]
    CharacterAlreadyPlayed,
    /// Character cards need the expert rules.
    #[display("Character cards are only available with expert rules")]
    ExpertOnly,
    /// Effect parameters do not fit the card.
    #[display("Invalid parameters for {_0}")]
    InvalidParams(CharacterId),
    /// Every veto tile is already on the board.
    #[display("No veto tile left")]
    NoVetoTiles,
    /// The card holds no student of that color.
    #[display("No {_0} student on the card")]
    StudentNotOnCard(Color),
    /// Not enough students at the table for a swap.
    #[display("No {_0} student at the table")]
    StudentNotAtTable(Color),
}

impl std::error::Error for RuleViolation {}

/// The wallet cannot cover the cost.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ResourceViolation {
    /// Not enough coins for the card.
    #[display("{card} costs {required} coins, you have {available}")]
    InsufficientCoins {
        /// Card being invoked.
        card: CharacterId,
        /// Its current cost.
        required: u32,
        /// Coins in the wallet.
        available: u32,
    },
}

impl std::error::Error for ResourceViolation {}

/// Why a request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ActionError {
    /// The issuing participant is not the current one.
    #[display("It's not {player}'s turn")]
    IllegalTurn {
        /// The participant who tried to act.
        player: PlayerId,
    },
    /// Right participant, wrong kind of action.
    #[display("Expected {expected}, got {got}")]
    WrongPhase {
        /// Prompt that is pending.
        expected: PromptKind,
        /// Kind of action received.
        got: ActionKind,
    },
    /// A game rule was violated.
    #[display("{_0}")]
    #[from]
    Rule(RuleViolation),
    /// The wallet does not cover the cost.
    #[display("{_0}")]
    #[from]
    Resource(ResourceViolation),
    /// The participant is not seated in this session.
    #[display("Unknown participant {player}")]
    UnknownParticipant {
        /// The unknown nickname.
        player: PlayerId,
    },
    /// All seats are taken.
    #[display("Session is full")]
    SessionFull,
    /// The session has terminated.
    #[display("Session is over")]
    SessionOver,
    /// An invariant broke; the action was discarded.
    #[display("Invariant violation: {description}")]
    Invariant {
        /// Description of the violated invariant.
        description: String,
    },
}

impl ActionError {
    /// Checks if the acting participant should be prompted again.
    pub fn reprompts(&self) -> bool {
        !matches!(
            self,
            ActionError::IllegalTurn { .. }
                | ActionError::UnknownParticipant { .. }
                | ActionError::SessionOver
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_matches_prompt() {
        let action = Action::MoveStudent {
            color: Color::Red,
            destination: Destination::Table,
        };
        let kind = ActionKind::from(&action);
        assert!(PromptKind::StudentMove.accepts(kind));
        assert!(PromptKind::CharacterOrMove.accepts(kind));
        assert!(!PromptKind::Cloud.accepts(kind));
    }

    #[test]
    fn test_rule_violation_converts_into_action_error() {
        let err: ActionError = RuleViolation::CloudEmpty(1).into();
        assert_eq!(err.to_string(), "Cloud 1 is empty");
        assert!(err.reprompts());
        assert!(
            !ActionError::IllegalTurn {
                player: "ludo".into()
            }
            .reprompts()
        );
    }

    #[test]
    fn test_request_deserializes_from_json() {
        let json = r#"{"player":"ludo","action":{"type":"move_student","color":"RED","destination":{"kind":"island","island":4}}}"#;
        let request: Request = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.action,
            Action::MoveStudent {
                color: Color::Red,
                destination: Destination::Island(4)
            }
        );
    }
}
