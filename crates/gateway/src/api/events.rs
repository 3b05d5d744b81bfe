//! Realtime dashboard feed (SSE).
//!
//! Replays the current analytics snapshot on connect, then forwards the
//! broadcast channel: `analytics` events on every counter mutation and
//! `message` events for each inbound message.

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures_util::Stream;

use crate::analytics::RealtimeEvent;
use crate::state::AppState;

pub async fn events_sse(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut rx = state.analytics.subscribe();
    let initial = RealtimeEvent::AnalyticsUpdate {
        counters: state.analytics.snapshot(),
    };

    let stream = async_stream::stream! {
        // Initial snapshot so a fresh dashboard renders without waiting
        // for the next mutation. Same payload shape as every later
        // `analytics` event.
        if let Ok(json) = serde_json::to_string(&initial) {
            yield Ok(Event::default().event("analytics").data(json));
        }

        loop {
            match rx.recv().await {
                Ok(event) => {
                    let event_type = match &event {
                        RealtimeEvent::AnalyticsUpdate { .. } => "analytics",
                        RealtimeEvent::NewMessage { .. } => "message",
                    };
                    if let Ok(json) = serde_json::to_string(&event) {
                        yield Ok(Event::default().event(event_type).data(json));
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    };

    Sse::new(stream)
}
