//! Turn controller: one request/response cycle per submission

use super::store::{ConversationStore, Message, Role};
use crate::llm::{LlmMessage, LlmRequest, LlmService};
use std::sync::Arc;

/// Why a submission was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Text was empty after trimming
    Empty,
    /// Another turn is still waiting on the provider
    Busy,
}

impl Rejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Rejection::Empty => "empty",
            Rejection::Busy => "busy",
        }
    }
}

/// Result of `TurnController::submit`
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The turn ran to completion; a reply or error message was appended
    Settled,
    /// Nothing happened
    Rejected(Rejection),
}

/// Drives turns against a store and a completion provider
#[derive(Clone)]
pub struct TurnController {
    store: Arc<ConversationStore>,
    llm: Arc<dyn LlmService>,
}

impl TurnController {
    pub fn new(store: Arc<ConversationStore>, llm: Arc<dyn LlmService>) -> Self {
        Self { store, llm }
    }

    /// Accept `text` as a new user turn, or reject it without side effects.
    ///
    /// Runs synchronously: on success the user message is already in the
    /// transcript and the store is busy until the returned turn is settled
    /// or dropped.
    pub fn begin(&self, text: &str) -> Result<PendingTurn, Rejection> {
        let prompt = text.trim();
        if prompt.is_empty() {
            return Err(Rejection::Empty);
        }

        let history = self
            .store
            .begin_turn(Message::user(prompt))
            .ok_or(Rejection::Busy)?;
        let guard = BusyGuard {
            store: Arc::clone(&self.store),
        };

        tracing::debug!(history_len = history.len(), "Turn accepted");

        Ok(PendingTurn {
            request: build_request(&history, prompt),
            llm: Arc::clone(&self.llm),
            guard,
        })
    }

    /// Accept and settle a turn in one call
    #[cfg(test)]
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        match self.begin(text) {
            Ok(turn) => {
                turn.settle().await;
                SubmitOutcome::Settled
            }
            Err(rejection) => {
                tracing::debug!(reason = rejection.as_str(), "Submission ignored");
                SubmitOutcome::Rejected(rejection)
            }
        }
    }
}

/// An accepted turn waiting on the provider
pub struct PendingTurn {
    request: LlmRequest,
    llm: Arc<dyn LlmService>,
    guard: BusyGuard,
}

impl PendingTurn {
    /// Call the provider once and append its reply, or an `Error: ` message
    pub async fn settle(self) {
        let Self {
            request,
            llm,
            guard,
        } = self;

        let reply = match llm.complete(&request).await {
            Ok(response) => Message::assistant(response.text),
            Err(e) => {
                tracing::warn!(error = %e.message, kind = ?e.kind, "Turn failed");
                Message::assistant(format!("Error: {}", e.message))
            }
        };

        guard.store.append(reply);
        drop(guard);
    }
}

/// Clears the busy flag when the turn ends, however it ends
struct BusyGuard {
    store: Arc<ConversationStore>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.store.set_busy(false);
    }
}

/// Prior transcript plus the new prompt, in provider order
fn build_request(history: &[Message], prompt: &str) -> LlmRequest {
    let mut messages: Vec<LlmMessage> = history
        .iter()
        .map(|msg| match msg.role() {
            Role::User => LlmMessage::user(msg.content()),
            Role::Assistant => LlmMessage::assistant(msg.content()),
        })
        .collect();
    messages.push(LlmMessage::user(prompt));
    LlmRequest { messages }
}
