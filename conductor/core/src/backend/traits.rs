//! Answer Backend Traits
//!
//! Trait definitions for the remote answer service. The controller and the
//! conductor only ever see [`AnswerBackend`], so tests can swap in stubs and
//! other transports can be added without touching core logic.
//!
//! # Wire Format
//!
//! Request: `{ "query": string }`
//!
//! Response: `{ "answer", "score", "matched_question", "sources", "topk"? }`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// A question sent to the answer service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// The user's question, already trimmed
    pub query: String,
}

impl AnswerRequest {
    /// Create a request for a query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// One runner-up match reported alongside the answer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopKMatch {
    /// Stored question that matched
    pub question: String,
    /// Similarity of that question to the query
    pub score: f64,
}

/// Successful reply from the answer service, passed through untouched
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Answer text in markdown-lite
    pub answer: String,
    /// Similarity score of the best match
    pub score: f64,
    /// Documents the answer was drawn from
    #[serde(default)]
    pub sources: Vec<String>,
    /// Stored question the answer belongs to
    #[serde(default)]
    pub matched_question: String,
    /// Runner-up matches, when the service reports them
    #[serde(default, rename = "topk", skip_serializing_if = "Option::is_none")]
    pub top_k: Option<Vec<TopKMatch>>,
}

/// Transport-level failure, before classification
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The service answered with a non-success status
    #[error("answer service returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The request never completed (connect, DNS, reset, ...)
    #[error("network error: {0}")]
    Network(String),

    /// The response body was not a valid answer payload
    #[error("malformed response: {0}")]
    Decode(String),

    /// The abort signal fired before the exchange finished
    #[error("request aborted")]
    Aborted,
}

/// Answer backend trait
///
/// Implement this trait to add support for a different answer service.
#[async_trait]
pub trait AnswerBackend: Send + Sync {
    /// Get the backend name (e.g., "HTTP")
    fn name(&self) -> &str;

    /// Check if the service is healthy and reachable
    async fn health_check(&self) -> bool;

    /// Ask one question
    ///
    /// `abort` is cancelled when the caller stops waiting; implementations
    /// should drop any in-flight work as soon as they observe it.
    async fn answer(
        &self,
        request: &AnswerRequest,
        abort: CancellationToken,
    ) -> Result<AnswerResult, TransportError>;
}
