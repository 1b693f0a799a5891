//! Conversation History
//!
//! The ordered, append-only list of turns for one chat session.
//!
//! # Design Philosophy
//!
//! Turns are never edited once appended. The only mutation besides `push`
//! is a wholesale `clear` on reset. History lives for the process lifetime
//! and is not persisted.

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::backend::AnswerResult;
use crate::markdown::{self, Document};
use crate::messages::{Role, TurnId};

/// Assistant text used when a request fails
pub const FALLBACK_ANSWER: &str = "Sorry, a temporary error occurred. Please try again in a moment.";

/// One message in the conversation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Unique turn ID
    pub id: TurnId,
    /// Who authored this turn
    pub role: Role,
    /// Raw text
    pub content: String,
    /// Source documents (assistant answers only)
    #[serde(default)]
    pub sources: Vec<String>,
    /// Similarity score (assistant answers only)
    #[serde(default)]
    pub confidence: Option<f64>,
    /// When the turn was created (Unix timestamp ms)
    pub created_at: u64,
    /// Rendered content (assistant turns only)
    #[serde(default)]
    pub document: Option<Document>,
}

impl Turn {
    /// A user question, shown as plain text
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: TurnId::new(),
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
            confidence: None,
            created_at: now_ms(),
            document: None,
        }
    }

    /// An assistant answer built from a service reply
    pub fn answer(result: AnswerResult) -> Self {
        let document = markdown::render(&result.answer);
        Self {
            id: TurnId::new(),
            role: Role::Assistant,
            content: result.answer,
            sources: result.sources,
            confidence: Some(result.score),
            created_at: now_ms(),
            document: Some(document),
        }
    }

    /// The generic apology appended when a request fails
    pub fn fallback() -> Self {
        Self {
            id: TurnId::new(),
            role: Role::Assistant,
            content: FALLBACK_ANSWER.to_string(),
            sources: Vec::new(),
            confidence: None,
            created_at: now_ms(),
            document: Some(markdown::render(FALLBACK_ANSWER)),
        }
    }

    /// Local wall-clock time of the turn as `HH:MM`
    #[must_use]
    pub fn display_time(&self) -> String {
        let millis = i64::try_from(self.created_at).unwrap_or(i64::MAX);
        Local
            .timestamp_millis_opt(millis)
            .single()
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_default()
    }
}

/// Ordered turn history
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, returning a copy for the display boundary
    pub fn push(&mut self, turn: Turn) -> Turn {
        self.turns.push(turn.clone());
        turn
    }

    /// All turns, oldest first
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Look up a turn by ID
    #[must_use]
    pub fn get(&self, id: TurnId) -> Option<&Turn> {
        self.turns.iter().find(|t| t.id == id)
    }

    /// Most recent turn
    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Number of turns
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether there are no turns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop every turn
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

/// Get current timestamp in milliseconds
fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
