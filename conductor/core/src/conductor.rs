//! Conductor - The Orchestration Core
//!
//! The Conductor owns one chat session. It:
//! - keeps the ordered conversation
//! - drives one request at a time through the [`RequestController`]
//! - tracks the error banner independently of the turns
//! - tells the display surface about every change
//!
//! # Design Philosophy
//!
//! The Conductor is UI-agnostic. It talks to the surface only through
//! [`ConductorMessage`]s on an mpsc channel, so the terminal surface and a
//! headless test harness drive it the same way.
//!
//! # States
//!
//! ```text
//!            send_message (non-blank)
//!   Idle ───────────────────────────────► Sending
//!    ▲                                      │
//!    └──── poll_response / wait_response ───┘
//!          (answer turn or fallback turn + banner)
//! ```
//!
//! `reset()` returns to `Idle` from either state. A reset while `Sending`
//! cancels the attempt and discards its result.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::{AnswerBackend, AnswerResult};
use crate::controller::{ControllerConfig, RequestController};
use crate::conversation::{Conversation, Turn};
use crate::error::ClassifiedError;
use crate::messages::{ConductorMessage, ConductorState, ErrorBanner};

/// Starter prompts shown while the conversation is empty
pub const SUGGESTED_QUESTIONS: [&str; 3] = [
    "What is Perso.ai?",
    "What are the main features of Perso.ai?",
    "Which languages are supported?",
];

/// Conductor configuration
#[derive(Clone, Debug)]
pub struct ConductorConfig {
    /// Request lifecycle settings
    pub controller: ControllerConfig,
    /// Whether `start` probes the answer service
    pub health_check_on_start: bool,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            health_check_on_start: true,
        }
    }
}

type AttemptResult = Result<AnswerResult, ClassifiedError>;

/// The request currently awaiting resolution
struct PendingAttempt {
    cancel: CancellationToken,
    result_rx: oneshot::Receiver<AttemptResult>,
    task: JoinHandle<()>,
}

/// The Conductor - headless orchestration core
pub struct Conductor<B: AnswerBackend> {
    /// Configuration
    config: ConductorConfig,
    /// Request lifecycle controller, shared with the attempt task
    controller: Arc<RequestController<B>>,
    /// Turn history
    conversation: Conversation,
    /// Current operational state
    state: ConductorState,
    /// Error banner, independent of state
    banner: Option<ErrorBanner>,
    /// Channel to send messages to the display surface
    tx: mpsc::Sender<ConductorMessage>,
    /// Outstanding attempt, present exactly while `Sending`
    pending: Option<PendingAttempt>,
}

impl<B: AnswerBackend + 'static> Conductor<B> {
    /// Create a new Conductor with the given backend
    pub fn new(backend: B, config: ConductorConfig, tx: mpsc::Sender<ConductorMessage>) -> Self {
        let controller = Arc::new(RequestController::new(backend, config.controller.clone()));
        Self {
            config,
            controller,
            conversation: Conversation::new(),
            state: ConductorState::Idle,
            banner: None,
            tx,
            pending: None,
        }
    }

    /// Get current state
    pub fn state(&self) -> ConductorState {
        self.state
    }

    /// Get the conversation
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Get the error banner, if shown
    pub fn banner(&self) -> Option<&ErrorBanner> {
        self.banner.as_ref()
    }

    /// Starter prompts for the empty state
    pub fn suggested_questions(&self) -> &'static [&'static str] {
        &SUGGESTED_QUESTIONS
    }

    /// Announce the initial state, probing the service if configured
    ///
    /// Returns the health check result, or `true` when no check was made.
    /// An unhealthy service is only logged; questions can still be sent.
    pub async fn start(&mut self) -> bool {
        let healthy = if self.config.health_check_on_start {
            let backend = self.controller.backend();
            let healthy = backend.health_check().await;
            if healthy {
                tracing::info!(backend = backend.name(), "Answer service is reachable");
            } else {
                tracing::warn!(backend = backend.name(), "Answer service health check failed");
            }
            healthy
        } else {
            true
        };

        self.send(ConductorMessage::State { state: self.state }).await;
        healthy
    }

    /// Submit a question
    ///
    /// Returns `false` without side effects when the trimmed text is empty
    /// or a request is already in flight. Otherwise the user turn is
    /// appended before the request starts.
    pub async fn send_message(&mut self, text: &str) -> bool {
        let query = text.trim();
        if query.is_empty() {
            return false;
        }
        if self.state == ConductorState::Sending {
            tracing::debug!("Ignoring message while a request is in flight");
            return false;
        }

        let turn = self.conversation.push(Turn::user(query));
        self.send(ConductorMessage::TurnAppended { turn }).await;

        if self.banner.take().is_some() {
            self.send(ConductorMessage::ErrorDismissed).await;
        }

        self.pending = Some(self.spawn_attempt(query.to_string()));
        self.set_state(ConductorState::Sending).await;
        true
    }

    fn spawn_attempt(&self, query: String) -> PendingAttempt {
        let controller = Arc::clone(&self.controller);
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let (result_tx, result_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let result = controller.send_with_cancel(&query, token).await;
            // Receiver is gone after a reset; the result is discarded
            let _ = result_tx.send(result);
        });

        PendingAttempt {
            cancel,
            result_rx,
            task,
        }
    }

    /// Apply the outstanding result if it is ready, without waiting
    ///
    /// Returns `true` if a result was applied.
    pub async fn poll_response(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        let result = match pending.result_rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return false,
            Err(oneshot::error::TryRecvError::Closed) => Err(task_lost()),
        };

        self.resolve(result).await;
        true
    }

    /// Wait for the outstanding result and apply it
    ///
    /// Returns `false` immediately if nothing is in flight. Dropping the
    /// returned future before it completes leaves the attempt pending.
    pub async fn wait_response(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        let result = (&mut pending.result_rx)
            .await
            .unwrap_or_else(|_| Err(task_lost()));

        self.resolve(result).await;
        true
    }

    async fn resolve(&mut self, result: AttemptResult) {
        self.pending = None;

        match result {
            Ok(answer) => {
                let turn = self.conversation.push(Turn::answer(answer));
                self.send(ConductorMessage::TurnAppended { turn }).await;
            }
            Err(error) => {
                let turn = self.conversation.push(Turn::fallback());
                self.send(ConductorMessage::TurnAppended { turn }).await;

                let banner = ErrorBanner::from(&error);
                self.banner = Some(banner.clone());
                self.send(ConductorMessage::ErrorBanner { banner }).await;
            }
        }

        self.set_state(ConductorState::Idle).await;
    }

    /// Withdraw interest in the outstanding request
    ///
    /// The attempt still resolves, as [`ClassifiedError::Cancelled`].
    /// Returns `false` if nothing was in flight.
    pub fn cancel(&self) -> bool {
        match &self.pending {
            Some(pending) => {
                tracing::debug!("Cancelling outstanding request");
                pending.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Clear the error banner; turns are untouched
    pub async fn dismiss_error(&mut self) {
        if self.banner.take().is_some() {
            self.send(ConductorMessage::ErrorDismissed).await;
        }
    }

    /// Drop every turn and the banner, and return to `Idle`
    ///
    /// An outstanding request is cancelled and its result never applied.
    pub async fn reset(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!("Discarding outstanding request on reset");
            pending.cancel.cancel();
            pending.task.abort();
        }

        self.conversation.clear();
        self.banner = None;
        self.send(ConductorMessage::Cleared).await;
        self.set_state(ConductorState::Idle).await;
    }

    /// Set state and notify the surface
    async fn set_state(&mut self, state: ConductorState) {
        self.state = state;
        self.send(ConductorMessage::State { state }).await;
    }

    /// Send message to the display surface
    async fn send(&self, msg: ConductorMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}

fn task_lost() -> ClassifiedError {
    ClassifiedError::Unknown("request task ended without a result".to_string())
}
