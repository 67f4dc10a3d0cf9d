use super::Theme;
use crate::error::WorkflowError;
use crate::media::EncodedImage;
use crate::outfit::{EventType, OutfitSelection};
use serde::{Deserialize, Serialize};

/// How the source items for a generation attempt are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    /// All eligible items go in automatically.
    Ai,
    /// The user hand-picks 1–8 items, any confirmation state.
    Manual,
}

/// Where one outfit-generation attempt currently stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    SelectingItems,
    /// Suspended until the user supplies an API credential or cancels.
    CredentialSetup,
    AwaitingEventType,
    Generating,
    Complete { image: EncodedImage },
    Failed { reason: String },
}

impl Phase {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SelectingItems => "selecting items",
            Self::CredentialSetup => "awaiting credential setup",
            Self::AwaitingEventType => "awaiting event type",
            Self::Generating => "generating",
            Self::Complete { .. } => "complete",
            Self::Failed { .. } => "failed",
        }
    }
}

/// A discrete, serializable state mutation. Everything the surface layer
/// can do to the workflow goes through one of these, applied by
/// [`AppState::apply`] — which makes the whole flow testable without a UI
/// harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    SelectTheme(Theme),
    BeginSelection { mode: SelectionMode },
    ToggleItem { id: String },
    ConfirmSelection,
    CredentialProvided,
    CancelSetup,
    ChooseEventType(EventType),
    GenerationSucceeded { image: EncodedImage },
    GenerationFailed { reason: String },
    Regenerate,
    Reset,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::SelectTheme(_) => "select theme",
            Self::BeginSelection { .. } => "begin selection",
            Self::ToggleItem { .. } => "toggle item",
            Self::ConfirmSelection => "confirm selection",
            Self::CredentialProvided => "provide credential",
            Self::CancelSetup => "cancel setup",
            Self::ChooseEventType(_) => "choose event type",
            Self::GenerationSucceeded { .. } => "finish generation",
            Self::GenerationFailed { .. } => "fail generation",
            Self::Regenerate => "regenerate",
            Self::Reset => "reset",
        }
    }
}

/// The facts the reducer needs from outside the state itself.
#[derive(Debug, Clone, Copy)]
pub struct ReducerContext {
    pub wardrobe_len: usize,
    pub credential_present: bool,
}

/// The whole application state for one session, mutated only through
/// [`AppState::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub phase: Phase,
    pub mode: SelectionMode,
    pub selection: OutfitSelection,
    pub theme: Theme,
    pub event_type: Option<EventType>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            mode: SelectionMode::Ai,
            selection: OutfitSelection::new(),
            theme: Theme::default(),
            event_type: None,
        }
    }
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one command. Rejected commands leave the state untouched.
    pub fn apply(&mut self, command: Command, ctx: &ReducerContext) -> Result<(), WorkflowError> {
        let invalid = |phase: &Phase, command: &Command| WorkflowError::InvalidTransition {
            phase: phase.name(),
            action: command.name(),
        };

        match command {
            // Theme choice is chrome, allowed in any phase; the paired
            // avatar switches with it.
            Command::SelectTheme(theme) => {
                self.theme = theme;
                Ok(())
            }

            Command::BeginSelection { mode } => {
                if self.phase != Phase::Idle {
                    return Err(invalid(&self.phase, &Command::BeginSelection { mode }));
                }
                if ctx.wardrobe_len == 0 {
                    return Err(WorkflowError::EmptyWardrobe);
                }
                self.mode = mode;
                self.selection.clear();
                self.phase = Phase::SelectingItems;
                Ok(())
            }

            Command::ToggleItem { id } => {
                if self.phase != Phase::SelectingItems || self.mode != SelectionMode::Manual {
                    return Err(invalid(&self.phase, &Command::ToggleItem { id }));
                }
                self.selection.toggle(&id)?;
                Ok(())
            }

            Command::ConfirmSelection => {
                if self.phase != Phase::SelectingItems {
                    return Err(invalid(&self.phase, &Command::ConfirmSelection));
                }
                if self.mode == SelectionMode::Manual && self.selection.is_empty() {
                    return Err(WorkflowError::NothingSelected);
                }
                self.phase = if ctx.credential_present {
                    Phase::AwaitingEventType
                } else {
                    Phase::CredentialSetup
                };
                Ok(())
            }

            Command::CredentialProvided => {
                if self.phase != Phase::CredentialSetup {
                    return Err(invalid(&self.phase, &Command::CredentialProvided));
                }
                self.phase = Phase::AwaitingEventType;
                Ok(())
            }

            Command::CancelSetup => {
                if self.phase != Phase::CredentialSetup {
                    return Err(invalid(&self.phase, &Command::CancelSetup));
                }
                self.reset();
                Ok(())
            }

            Command::ChooseEventType(event_type) => {
                if self.phase != Phase::AwaitingEventType {
                    return Err(invalid(&self.phase, &Command::ChooseEventType(event_type)));
                }
                self.event_type = Some(event_type);
                self.phase = Phase::Generating;
                Ok(())
            }

            Command::GenerationSucceeded { image } => {
                if self.phase != Phase::Generating {
                    return Err(invalid(&self.phase, &Command::GenerationSucceeded { image }));
                }
                self.phase = Phase::Complete { image };
                Ok(())
            }

            Command::GenerationFailed { reason } => {
                if self.phase != Phase::Generating {
                    return Err(invalid(&self.phase, &Command::GenerationFailed { reason }));
                }
                self.phase = Phase::Failed { reason };
                Ok(())
            }

            // Discards the previous result from the machine; the persisted
            // log keeps it.
            Command::Regenerate => {
                if !matches!(self.phase, Phase::Complete { .. }) {
                    return Err(invalid(&self.phase, &Command::Regenerate));
                }
                self.phase = Phase::AwaitingEventType;
                Ok(())
            }

            Command::Reset => {
                self.reset();
                Ok(())
            }
        }
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.selection.clear();
        self.event_type = None;
    }
}
