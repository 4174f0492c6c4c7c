//! Server-Sent Events support

use crate::session::{ChatSession, Message, StoreEvent};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Stream the session's store events as SSE, led by a snapshot.
///
/// A subscriber that falls behind the broadcast buffer gets a fresh `init`
/// snapshot in place of the events it missed.
pub fn sse_stream(
    session: Arc<ChatSession>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before reading so no change falls between snapshot and stream
    let broadcast_rx = session.subscribe();
    let (messages, busy) = session.view();
    let init = futures::stream::once(async move { Ok(init_event(&messages, busy)) });

    let broadcasts = BroadcastStream::new(broadcast_rx).map(move |result| match result {
        Ok(event) => Ok(store_event_to_axum(event)),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "SSE subscriber lagged, resending snapshot");
            let (messages, busy) = session.view();
            Ok(init_event(&messages, busy))
        }
    });

    let combined = init.chain(broadcasts);

    Sse::new(combined).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn init_event(messages: &[Message], busy: bool) -> Event {
    Event::default().event("init").data(
        json!({
            "type": "init",
            "messages": messages,
            "busy": busy
        })
        .to_string(),
    )
}

fn store_event_to_axum(event: StoreEvent) -> Event {
    let (event_type, data) = match event {
        StoreEvent::Appended { index, message } => (
            "message",
            json!({
                "type": "message",
                "index": index,
                "message": message
            }),
        ),
        StoreEvent::Busy(busy) => (
            "busy",
            json!({
                "type": "busy",
                "busy": busy
            }),
        ),
    };

    Event::default().event(event_type).data(data.to_string())
}
