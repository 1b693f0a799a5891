//! Answer Service Integration
//!
//! This module provides abstracted access to the remote question-answering
//! service through a common trait interface.
//!
//! # Available Backends
//!
//! - **HTTP**: REST service exposing `POST /ask` (default)
//!
//! # Usage
//!
//! ```ignore
//! use perso_conductor_core::backend::{AnswerBackend, AnswerRequest, HttpAnswerBackend};
//! use tokio_util::sync::CancellationToken;
//!
//! let backend = HttpAnswerBackend::new("http://localhost:8000")?;
//! let result = backend
//!     .answer(&AnswerRequest::new("What is Perso.ai?"), CancellationToken::new())
//!     .await?;
//! ```

mod http;
mod traits;

pub use http::{HttpAnswerBackend, DEFAULT_BASE_URL};
pub use traits::{AnswerBackend, AnswerRequest, AnswerResult, TopKMatch, TransportError};
