//! Request Lifecycle Controller
//!
//! Runs one question against an [`AnswerBackend`] with a deadline and a
//! cancellation signal, and folds every failure into a [`ClassifiedError`].
//!
//! # Lifecycle
//!
//! ```text
//!   send(query)
//!       │
//!       ▼
//!   RequestAttempt { started_at, deadline, cancel }
//!       │
//!       ├── backend resolves ─────────► Ok(AnswerResult) / classified error
//!       ├── cancel() before resolve ──► Cancelled   (backend abort fired)
//!       └── deadline elapses ─────────► Timeout     (backend abort fired)
//! ```
//!
//! The timer belongs to the call's future and the in-flight slot is cleared
//! by a guard, so neither survives the call on any exit path. Nothing is
//! retried; a retry is a fresh `send`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::backend::{AnswerBackend, AnswerRequest, AnswerResult};
use crate::error::ClassifiedError;

/// Default time allowed for one request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Controller configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Deadline measured from call start
    pub timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ControllerConfig {
    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// One outstanding call, alive only for the duration of `send`
#[derive(Clone, Debug)]
pub struct RequestAttempt {
    /// The question being asked
    pub query: String,
    /// When the call started
    pub started_at: Instant,
    /// When the call gives up
    pub deadline: Instant,
    /// Fires when the caller withdraws interest
    pub cancel: CancellationToken,
}

impl RequestAttempt {
    fn begin(query: &str, timeout: Duration, cancel: CancellationToken) -> Self {
        let started_at = Instant::now();
        Self {
            query: query.to_string(),
            started_at,
            deadline: started_at + timeout,
            cancel,
        }
    }
}

/// Cancellation handle of the attempt currently in flight
type InFlight = Mutex<Option<(u64, CancellationToken)>>;

/// Clears the in-flight slot when the call ends, however it ends
///
/// One call at a time: registering a new attempt cancels the one it replaces.
struct InFlightGuard<'a> {
    slot: &'a InFlight,
    generation: u64,
}

impl<'a> InFlightGuard<'a> {
    fn register(slot: &'a InFlight, generation: u64, token: CancellationToken) -> Self {
        let previous = slot.lock().replace((generation, token));
        if let Some((superseded, token)) = previous {
            tracing::warn!(generation, superseded, "Request superseded the one in flight");
            token.cancel();
        }
        Self { slot, generation }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|(g, _)| *g == self.generation) {
            *slot = None;
        }
    }
}

/// Request lifecycle controller
pub struct RequestController<B: AnswerBackend> {
    backend: B,
    config: ControllerConfig,
    in_flight: InFlight,
    generation: AtomicU64,
}

impl<B: AnswerBackend> RequestController<B> {
    /// Create a controller over a backend
    pub fn new(backend: B, config: ControllerConfig) -> Self {
        Self {
            backend,
            config,
            in_flight: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// The wrapped backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Configured request timeout
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Whether a call is currently outstanding
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    /// Cancel the outstanding call, if any
    ///
    /// Returns `true` if there was a call to cancel.
    pub fn cancel(&self) -> bool {
        match self.in_flight.lock().as_ref() {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Ask a question with the configured timeout
    ///
    /// # Errors
    ///
    /// Returns the [`ClassifiedError`] for whichever way the call failed.
    pub async fn send(&self, query: &str) -> Result<AnswerResult, ClassifiedError> {
        self.send_with_cancel(query, CancellationToken::new()).await
    }

    /// Ask a question, also giving up when `cancel` fires
    ///
    /// # Errors
    ///
    /// Returns [`ClassifiedError::Cancelled`] if `cancel` fires first,
    /// [`ClassifiedError::Timeout`] if the deadline passes first, and the
    /// classified transport error otherwise.
    pub async fn send_with_cancel(
        &self,
        query: &str,
        cancel: CancellationToken,
    ) -> Result<AnswerResult, ClassifiedError> {
        let attempt = RequestAttempt::begin(query, self.config.timeout, cancel);
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let _guard = InFlightGuard::register(&self.in_flight, generation, attempt.cancel.clone());

        // Child token: fires on caller cancel, or explicitly on timeout
        let abort = attempt.cancel.child_token();
        let request = AnswerRequest::new(attempt.query.clone());

        tracing::debug!(
            backend = self.backend.name(),
            query_len = attempt.query.len(),
            timeout_ms = self.config.timeout.as_millis() as u64,
            "Starting request attempt"
        );

        let outcome = tokio::time::timeout_at(attempt.deadline, async {
            tokio::select! {
                biased;
                () = attempt.cancel.cancelled() => Err(ClassifiedError::Cancelled),
                result = self.backend.answer(&request, abort.clone()) => {
                    result.map_err(ClassifiedError::from)
                }
            }
        })
        .await;

        let result = outcome.unwrap_or_else(|_elapsed| {
            abort.cancel();
            Err(ClassifiedError::Timeout)
        });

        let elapsed_ms = attempt.started_at.elapsed().as_millis() as u64;
        match &result {
            Ok(answer) => tracing::info!(
                elapsed_ms,
                score = answer.score,
                sources = answer.sources.len(),
                "Request attempt succeeded"
            ),
            Err(error) => tracing::warn!(
                elapsed_ms,
                kind = ?error.kind(),
                error = %error,
                "Request attempt failed"
            ),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::backend::TransportError;

    /// Stub backend with a scripted behaviour and an abort counter
    #[derive(Clone)]
    struct StubBackend {
        behaviour: Behaviour,
        calls: Arc<AtomicUsize>,
        aborts: Arc<AtomicUsize>,
    }

    #[derive(Clone)]
    enum Behaviour {
        Answer,
        AnswerAfter(Duration),
        Fail(TransportError),
        Hang,
    }

    impl StubBackend {
        fn new(behaviour: Behaviour) -> Self {
            Self {
                behaviour,
                calls: Arc::new(AtomicUsize::new(0)),
                aborts: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    fn sample_answer() -> AnswerResult {
        AnswerResult {
            answer: "Perso.ai is an AI dubbing platform.".to_string(),
            score: 0.91,
            sources: vec!["faq.xlsx".to_string()],
            matched_question: "What is Perso.ai?".to_string(),
            top_k: None,
        }
    }

    #[async_trait]
    impl AnswerBackend for StubBackend {
        fn name(&self) -> &str {
            "Stub"
        }

        async fn health_check(&self) -> bool {
            true
        }

        async fn answer(
            &self,
            _request: &AnswerRequest,
            abort: CancellationToken,
        ) -> Result<AnswerResult, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let aborts = Arc::clone(&self.aborts);
            tokio::spawn(async move {
                abort.cancelled().await;
                aborts.fetch_add(1, Ordering::SeqCst);
            });

            match &self.behaviour {
                Behaviour::Answer => Ok(sample_answer()),
                Behaviour::AnswerAfter(delay) => {
                    tokio::time::sleep(*delay).await;
                    Ok(sample_answer())
                }
                Behaviour::Fail(error) => Err(error.clone()),
                Behaviour::Hang => std::future::pending().await,
            }
        }
    }

    #[tokio::test]
    async fn test_success_passes_result_through() {
        let controller = RequestController::new(
            StubBackend::new(Behaviour::Answer),
            ControllerConfig::default(),
        );

        let result = controller.send("What is Perso.ai?").await;
        assert_eq!(result, Ok(sample_answer()));
        assert!(!controller.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires_at_deadline_not_before() {
        let backend = StubBackend::new(Behaviour::Hang);
        let aborts = Arc::clone(&backend.aborts);
        let controller = RequestController::new(backend, ControllerConfig::default());

        let start = Instant::now();
        let result = controller.send("hello").await;

        assert_eq!(result, Err(ClassifiedError::Timeout));
        let elapsed = start.elapsed();
        assert!(elapsed >= DEFAULT_REQUEST_TIMEOUT);
        assert!(elapsed < DEFAULT_REQUEST_TIMEOUT + Duration::from_millis(10));
        assert!(!controller.is_in_flight());

        tokio::task::yield_now().await;
        assert_eq!(aborts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_answer_just_before_deadline_succeeds() {
        let controller = RequestController::new(
            StubBackend::new(Behaviour::AnswerAfter(Duration::from_secs(29))),
            ControllerConfig::default(),
        );

        assert!(controller.send("hello").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_timeout() {
        let controller = RequestController::new(
            StubBackend::new(Behaviour::Hang),
            ControllerConfig::default().with_timeout(Duration::from_secs(5)),
        );

        let start = Instant::now();
        assert_eq!(controller.send("q").await, Err(ClassifiedError::Timeout));
        assert!(start.elapsed() >= Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_cancel_before_resolution() {
        let backend = StubBackend::new(Behaviour::Hang);
        let aborts = Arc::clone(&backend.aborts);
        let controller = Arc::new(RequestController::new(backend, ControllerConfig::default()));

        let task = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.send("hello").await })
        };

        while !controller.is_in_flight() {
            tokio::task::yield_now().await;
        }
        assert!(controller.cancel());

        let result = task.await.unwrap();
        assert_eq!(result, Err(ClassifiedError::Cancelled));
        assert!(!controller.is_in_flight());

        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        assert_eq!(aborts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_send_cancels_superseded_attempt() {
        let backend = StubBackend::new(Behaviour::Hang);
        let calls = Arc::clone(&backend.calls);
        let controller = Arc::new(RequestController::new(backend, ControllerConfig::default()));
        let start = Instant::now();

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.send("first").await })
        };
        while calls.load(Ordering::SeqCst) < 1 {
            tokio::task::yield_now().await;
        }

        let second = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.send("second").await })
        };
        while calls.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }

        assert_eq!(first.await.unwrap(), Err(ClassifiedError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(controller.is_in_flight());

        assert!(controller.cancel());
        assert_eq!(second.await.unwrap(), Err(ClassifiedError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(!controller.is_in_flight());
    }

    #[tokio::test]
    async fn test_external_token_cancels() {
        let controller = RequestController::new(
            StubBackend::new(Behaviour::Hang),
            ControllerConfig::default(),
        );
        let token = CancellationToken::new();
        token.cancel();

        let result = controller.send_with_cancel("hello", token).await;
        assert_eq!(result, Err(ClassifiedError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_with_nothing_in_flight() {
        let controller = RequestController::new(
            StubBackend::new(Behaviour::Answer),
            ControllerConfig::default(),
        );
        assert!(!controller.cancel());
    }

    #[tokio::test]
    async fn test_transport_errors_are_classified() {
        let controller = RequestController::new(
            StubBackend::new(Behaviour::Fail(TransportError::Status {
                status: 500,
                body: String::new(),
            })),
            ControllerConfig::default(),
        );
        assert_eq!(
            controller.send("q").await,
            Err(ClassifiedError::ServerError { detail: None })
        );

        let controller = RequestController::new(
            StubBackend::new(Behaviour::Fail(TransportError::Network("reset".into()))),
            ControllerConfig::default(),
        );
        assert!(matches!(
            controller.send("q").await,
            Err(ClassifiedError::Unknown(_))
        ));
    }

    #[tokio::test]
    async fn test_no_retry_on_failure() {
        let backend = StubBackend::new(Behaviour::Fail(TransportError::Status {
            status: 400,
            body: String::new(),
        }));
        let calls = Arc::clone(&backend.calls);
        let controller = RequestController::new(backend, ControllerConfig::default());

        let _ = controller.send("q").await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
