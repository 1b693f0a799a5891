//! Conductor Core - Headless Q&A Chat Orchestration for Perso
//!
//! This crate provides the core logic of the Perso question-answering chat
//! client, independent of any display surface. It can drive the terminal
//! client or run headless for testing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Display Surface                          │
//! │            (perso-chat terminal client / tests)               │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                │ ConductorMessage (down)
//!                                │ send_message / reset / ... (up)
//! ┌──────────────────────────────┼────────────────────────────────┐
//! │                        CONDUCTOR CORE                         │
//! │  ┌───────────────────────────┴─────────────────────────────┐  │
//! │  │                       Conductor                          │  │
//! │  │  ┌──────────────┐  ┌──────────────────┐  ┌───────────┐  │  │
//! │  │  │ Conversation │  │ RequestController│  │  Markdown │  │  │
//! │  │  │   (turns)    │  │ (timeout/cancel) │  │  renderer │  │  │
//! │  │  └──────────────┘  └────────┬─────────┘  └───────────┘  │  │
//! │  └─────────────────────────────┼───────────────────────────┘  │
//! │                                │                              │
//! │                      AnswerBackend (HTTP)                     │
//! └────────────────────────────────┼──────────────────────────────┘
//!                                  ▼
//!                        POST {base_url}/ask
//! ```
//!
//! # Key Types
//!
//! - [`Conductor`]: Owns the conversation and drives one request at a time
//! - [`ConductorMessage`]: Messages sent from Conductor to the surface
//! - [`RequestController`]: Timeout, cancellation and error classification
//! - [`ClassifiedError`]: The closed set of request failures
//! - [`markdown::render`]: Answer text to a typed document tree
//!
//! # Quick Start
//!
//! ```ignore
//! use perso_conductor_core::{Conductor, HttpAnswerBackend, load_config};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let (tx, mut rx) = mpsc::channel(100);
//!
//!     let backend = HttpAnswerBackend::new(config.base_url.clone())?;
//!     let mut conductor = Conductor::new(backend, config.conductor_config(), tx);
//!     conductor.start().await;
//!
//!     conductor.send_message("What is Perso.ai?").await;
//!     conductor.wait_response().await;
//!
//!     while let Ok(msg) = rx.try_recv() {
//!         // Render message
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`backend`]: Answer service abstraction and HTTP client
//! - [`conductor`]: Main Conductor struct
//! - [`confidence`]: Score to confidence band
//! - [`config`]: Layered configuration (file, env, CLI)
//! - [`controller`]: Request lifecycle (deadline, cancellation)
//! - [`conversation`]: Turn history
//! - [`error`]: Classified request errors
//! - [`markdown`]: Markdown-lite renderer
//! - [`messages`]: Messages from Conductor to the surface
//!
//! # No Terminal Dependencies
//!
//! This crate has **zero** dependencies on terminal or UI crates. Rendering
//! the document tree to a screen is the surface's job.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod conductor;
pub mod confidence;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod error;
pub mod markdown;
pub mod messages;

// Re-exports for convenience
pub use backend::{
    AnswerBackend, AnswerRequest, AnswerResult, HttpAnswerBackend, TopKMatch, TransportError,
};
pub use conductor::{Conductor, ConductorConfig, SUGGESTED_QUESTIONS};
pub use confidence::{classify, format_similarity, ConfidenceBand, SourcesSummary};
pub use controller::{ControllerConfig, RequestAttempt, RequestController};
pub use conversation::{Conversation, Turn};
pub use error::{ClassifiedError, ErrorKind};
pub use markdown::{render, Block, Document, InlineSpan};
pub use messages::{ConductorMessage, ConductorState, ErrorBanner, Role, TurnId};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ChatConfig, ChatToml, ConfigError,
    ConfigOverrides, ConfigSource,
};
