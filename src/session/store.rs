//! Conversation store: the transcript and the busy flag

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Change notifications for observers of the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// `index` is the message's position in the transcript
    Appended { index: usize, message: Message },
    Busy(bool),
}

#[derive(Debug, Default)]
struct StoreState {
    transcript: Vec<Message>,
    busy: bool,
}

/// Owns the transcript and turn state for one session.
///
/// Mutations go through `append` and `set_busy`; the lock is never held
/// across an await point.
#[derive(Debug)]
pub struct ConversationStore {
    state: Mutex<StoreState>,
    events_tx: broadcast::Sender<StoreEvent>,
}

impl ConversationStore {
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(StoreState::default()),
            events_tx,
        }
    }

    /// Store whose transcript starts with one assistant greeting
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let store = Self::new();
        store.lock().transcript.push(Message::assistant(greeting));
        store
    }

    pub fn append(&self, message: Message) {
        let mut state = self.lock();
        self.push(&mut state, message);
    }

    pub fn set_busy(&self, busy: bool) {
        let mut state = self.lock();
        self.mark_busy(&mut state, busy);
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().transcript.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    /// Snapshot and busy flag read under one lock
    pub fn view(&self) -> (Vec<Message>, bool) {
        let state = self.lock();
        (state.transcript.clone(), state.busy)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events_tx.subscribe()
    }

    /// Start a turn if none is in flight.
    ///
    /// Checks busy, appends `message` and sets busy in a single critical
    /// section. Returns the transcript as it stood before `message`, or
    /// `None` when a turn is already running.
    pub(super) fn begin_turn(&self, message: Message) -> Option<Vec<Message>> {
        let mut state = self.lock();
        if state.busy {
            return None;
        }
        let history = state.transcript.clone();
        self.push(&mut state, message);
        self.mark_busy(&mut state, true);
        Some(history)
    }

    fn push(&self, state: &mut StoreState, message: Message) {
        let index = state.transcript.len();
        state.transcript.push(message.clone());
        // No receivers is fine
        let _ = self.events_tx.send(StoreEvent::Appended { index, message });
    }

    fn mark_busy(&self, state: &mut StoreState, busy: bool) {
        state.busy = busy;
        let _ = self.events_tx.send(StoreEvent::Busy(busy));
    }

    // A panic while holding the lock cannot leave the state half-written
    // (each mutation is a single push or assignment), so recover from poison.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
