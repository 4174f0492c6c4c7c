//! Chat session: one transcript, one turn at a time
//!
//! A `ChatSession` is built at startup and dropped at shutdown. It owns the
//! `ConversationStore` and hands out turns through the `TurnController`.

mod controller;
mod store;

#[cfg(test)]
pub mod testing;

#[allow(unused_imports)] // Public API re-exports
pub use controller::{PendingTurn, Rejection, TurnController};
pub use store::{ConversationStore, Message, Role, StoreEvent};

use crate::llm::LlmService;
use std::sync::Arc;
use tokio::sync::broadcast;

pub struct ChatSession {
    store: Arc<ConversationStore>,
    controller: TurnController,
}

impl ChatSession {
    /// New session; a non-blank `greeting` seeds the transcript
    pub fn new(llm: Arc<dyn LlmService>, greeting: Option<&str>) -> Self {
        let store = match greeting.map(str::trim).filter(|g| !g.is_empty()) {
            Some(greeting) => ConversationStore::with_greeting(greeting),
            None => ConversationStore::new(),
        };
        let store = Arc::new(store);
        let controller = TurnController::new(Arc::clone(&store), llm);
        Self { store, controller }
    }

    pub fn begin(&self, text: &str) -> Result<PendingTurn, Rejection> {
        self.controller.begin(text)
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.store.snapshot()
    }

    pub fn is_busy(&self) -> bool {
        self.store.is_busy()
    }

    pub fn view(&self) -> (Vec<Message>, bool) {
        self.store.view()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.subscribe()
    }
}
