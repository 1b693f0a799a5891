//! Conductor Messages
//!
//! Messages sent from the Conductor to the display surface. These are the
//! only way the orchestration layer tells a surface what changed.
//!
//! # Design Philosophy
//!
//! The Conductor owns the conversation and the request lifecycle. Surfaces
//! are pure renderers: they print what the Conductor tells them and hold no
//! business logic of their own. The same message stream drives the terminal
//! surface and headless tests alike.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversation::Turn;
use crate::error::{ClassifiedError, ErrorKind};

/// Messages from Conductor to display surface
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ConductorMessage {
    /// A turn was appended to the conversation
    TurnAppended {
        /// The new turn
        turn: Turn,
    },

    /// The Conductor changed state
    State {
        /// The new state
        state: ConductorState,
    },

    /// Show the error banner
    ErrorBanner {
        /// Banner contents
        banner: ErrorBanner,
    },

    /// The error banner was dismissed
    ErrorDismissed,

    /// The conversation was reset
    Cleared,
}

/// Turn identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnId(pub Uuid);

impl TurnId {
    /// Generate a new random turn ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TurnId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TurnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "turn_{}", self.0.simple())
    }
}

/// Who authored a turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// The person asking
    User,
    /// The answer service
    Assistant,
}

/// Conductor operational states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConductorState {
    /// Ready for input
    #[default]
    Idle,
    /// Waiting on the answer service
    Sending,
}

impl ConductorState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Sending => "Waiting for answer...",
        }
    }
}

/// Error banner shown above the conversation until dismissed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBanner {
    /// What kind of failure this reports
    pub kind: ErrorKind,
    /// User-facing text
    pub message: String,
}

impl From<&ClassifiedError> for ErrorBanner {
    fn from(error: &ClassifiedError) -> Self {
        let kind = error.kind();
        Self {
            kind,
            message: kind.banner_text().to_string(),
        }
    }
}
