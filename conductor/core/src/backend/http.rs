//! HTTP Backend Implementation
//!
//! Answer backend for the question-answering REST service.
//!
//! # Service API
//!
//! - `POST /ask` - Answer a question (`{ "query": ... }`)
//! - `GET /health` - Liveness probe
//!
//! Status codes are reported as-is in [`TransportError::Status`]; mapping
//! them to user-facing categories happens in [`crate::error`].

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::traits::{AnswerBackend, AnswerRequest, AnswerResult, TransportError};

/// Default service address
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// HTTP answer backend client
#[derive(Clone)]
pub struct HttpAnswerBackend {
    /// Service base URL, without trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpAnswerBackend {
    /// Create a new backend for a base URL
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Network`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get ask endpoint URL
    fn ask_url(&self) -> String {
        format!("{}/ask", self.base_url)
    }

    /// Get health endpoint URL
    fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    async fn exchange(&self, request: &AnswerRequest) -> Result<AnswerResult, TransportError> {
        let response = self
            .http_client
            .post(self.ask_url())
            .json(request)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<AnswerResult>().await.map_err(from_reqwest)
    }
}

fn from_reqwest(e: reqwest::Error) -> TransportError {
    if e.is_decode() {
        TransportError::Decode(e.to_string())
    } else {
        TransportError::Network(e.to_string())
    }
}

#[async_trait]
impl AnswerBackend for HttpAnswerBackend {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Health check failed");
                false
            }
        }
    }

    async fn answer(
        &self,
        request: &AnswerRequest,
        abort: CancellationToken,
    ) -> Result<AnswerResult, TransportError> {
        tokio::select! {
            biased;
            () = abort.cancelled() => {
                tracing::debug!(url = %self.ask_url(), "Aborting in-flight request");
                Err(TransportError::Aborted)
            }
            result = self.exchange(request) => result,
        }
    }
}
