//! Classified Errors
//!
//! The closed set of ways a question can fail, as seen by the conductor and
//! the display surface. Transport failures are folded into this set by the
//! `From<TransportError>` impl; nothing else produces a [`ClassifiedError`]
//! except the controller's own timeout and cancellation paths.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::TransportError;

/// Terminal outcome of a failed request attempt
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClassifiedError {
    /// The service rejected the query as invalid (HTTP 400/422)
    #[error("bad request{}", detail_suffix(.detail))]
    BadRequest {
        /// Service-provided explanation, if any
        detail: Option<String>,
    },

    /// The service failed internally (HTTP 5xx)
    #[error("server error{}", detail_suffix(.detail))]
    ServerError {
        /// Service-provided explanation, if any
        detail: Option<String>,
    },

    /// No response before the deadline
    #[error("request timed out")]
    Timeout,

    /// The caller withdrew interest before resolution
    #[error("request cancelled")]
    Cancelled,

    /// Anything else: network failure, unexpected status, bad body
    #[error("{0}")]
    Unknown(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

/// Fieldless tag of a [`ClassifiedError`], for display decisions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`ClassifiedError::BadRequest`]
    BadRequest,
    /// See [`ClassifiedError::ServerError`]
    ServerError,
    /// See [`ClassifiedError::Timeout`]
    Timeout,
    /// See [`ClassifiedError::Cancelled`]
    Cancelled,
    /// See [`ClassifiedError::Unknown`]
    Unknown,
}

impl ErrorKind {
    /// User-facing banner text for this kind of failure
    #[must_use]
    pub fn banner_text(self) -> &'static str {
        match self {
            Self::BadRequest => {
                "The question could not be processed. Please rephrase it and try again."
            }
            Self::ServerError => "The answer service hit an internal error. Please try again later.",
            Self::Timeout => "The answer service did not respond in time.",
            Self::Cancelled => "The request was cancelled.",
            Self::Unknown => "Something went wrong while contacting the answer service.",
        }
    }
}

impl ClassifiedError {
    /// The fieldless kind of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::ServerError { .. } => ErrorKind::ServerError,
            Self::Timeout => ErrorKind::Timeout,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Human-readable detail beyond the kind, if any
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::BadRequest { detail } | Self::ServerError { detail } => detail.as_deref(),
            Self::Unknown(message) => Some(message),
            Self::Timeout | Self::Cancelled => None,
        }
    }
}

impl From<TransportError> for ClassifiedError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Status { status, body } => match status {
                400 | 422 => Self::BadRequest {
                    detail: body_detail(&body),
                },
                500..=599 => Self::ServerError {
                    detail: body_detail(&body),
                },
                _ => Self::Unknown(format!("unexpected status {status}")),
            },
            TransportError::Aborted => Self::Cancelled,
            other @ (TransportError::Network(_) | TransportError::Decode(_)) => {
                Self::Unknown(other.to_string())
            }
        }
    }
}

/// Pull a readable message out of an error body
///
/// Prefers a JSON `detail` or `error` string field, falling back to the raw
/// body. Blank bodies give `None`.
fn body_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "error"] {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
                return Some(text.to_string());
            }
        }
    }
    Some(body.to_string())
}
