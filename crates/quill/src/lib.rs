//! Quill: Shakespearean rewrites over a chat completion API
//!
//! A question comes in, gets wrapped in a fixed rewrite directive, and is sent
//! as a single user message to an OpenAI-compatible completion endpoint. The
//! first choice of the reply is the answer.
//!
//! ```text
//! AnswerRequest ─► enrich() ─► CompletionClient::complete() ─► AnswerResponse
//! ```
//!
//! The completion client is constructed once at startup and injected into an
//! [`Answerer`], which is shared read-only by every concurrent request. Any
//! upstream failure is logged server-side and collapsed into
//! [`AnswerError::GenerationFailed`] so callers never see upstream details.

mod answer;
mod completion;
mod config;
mod prompt;

pub use answer::{AnswerError, AnswerRequest, AnswerResponse, Answerer};
pub use completion::{
    CompletionClient, CompletionError, DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiClient,
};
pub use config::{Config, ConfigError, DEFAULT_TIMEOUT};
pub use prompt::enrich;
