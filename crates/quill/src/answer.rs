//! Request handling core: enrich, complete, scrub errors.

use std::sync::Arc;

use thiserror::Error;

use crate::completion::CompletionClient;
use crate::prompt::enrich;

/// A question to rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRequest {
    /// Raw question text from the caller
    pub question: String,
}

/// The rewritten text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResponse {
    /// Text of the first completion choice
    pub answer: String,
}

/// Error returned to callers.
///
/// Deliberately carries no cause: upstream failures are logged where they
/// happen and never cross the RPC boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AnswerError {
    /// Any failure reaching or interpreting the completion API
    #[error("failed making your text Shakespearean")]
    GenerationFailed,
}

/// Answers questions using a shared completion client.
pub struct Answerer<C: ?Sized> {
    client: Arc<C>,
}

impl<C: ?Sized> Clone for Answerer<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: ?Sized> std::fmt::Debug for Answerer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Answerer").finish_non_exhaustive()
    }
}

impl<C: CompletionClient + ?Sized> Answerer<C> {
    /// Create an answerer around an already-shared client.
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Rewrite the question via the completion API.
    pub async fn get_answer(&self, request: AnswerRequest) -> Result<AnswerResponse, AnswerError> {
        let prompt = enrich(&request.question);

        tracing::debug!(question_len = request.question.len(), "Requesting answer");

        match self.client.complete(&prompt).await {
            Ok(answer) => Ok(AnswerResponse { answer }),
            Err(e) => {
                tracing::warn!(error = %e, "Completion failed");
                Err(AnswerError::GenerationFailed)
            }
        }
    }
}
