//! Aggregate counters + realtime event fan-out.
//!
//! Counters are in-memory only and reset on restart. Every counter
//! mutation broadcasts an `analytics` event; every resolved inbound
//! message additionally broadcasts a `message` event. Consumers attach
//! through the SSE endpoint.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    pub total_messages: u64,
    pub active_users: u64,
    pub verified_stamps: u64,
}

/// Realtime events pushed to dashboard listeners.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeEvent {
    AnalyticsUpdate {
        #[serde(flatten)]
        counters: Counters,
    },
    NewMessage {
        text: String,
        timestamp: DateTime<Utc>,
    },
}

pub struct Analytics {
    counters: RwLock<Counters>,
    event_tx: broadcast::Sender<RealtimeEvent>,
}

impl Analytics {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            counters: RwLock::new(Counters::default()),
            event_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.event_tx.subscribe()
    }

    pub fn snapshot(&self) -> Counters {
        *self.counters.read()
    }

    /// One increment per resolved inbound message, plus the two realtime
    /// events. Not called on the maintenance short-circuit.
    pub fn record_message(&self, text: &str) {
        let counters = {
            let mut c = self.counters.write();
            c.total_messages += 1;
            *c
        };
        self.emit(RealtimeEvent::AnalyticsUpdate { counters });
        self.emit(RealtimeEvent::NewMessage {
            text: text.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn record_verification(&self) {
        let counters = {
            let mut c = self.counters.write();
            c.verified_stamps += 1;
            *c
        };
        self.emit(RealtimeEvent::AnalyticsUpdate { counters });
    }

    pub fn reset(&self) {
        let counters = {
            let mut c = self.counters.write();
            *c = Counters::default();
            *c
        };
        self.emit(RealtimeEvent::AnalyticsUpdate { counters });
    }

    fn emit(&self, event: RealtimeEvent) {
        // No receivers is fine; the dashboard may not be attached.
        let _ = self.event_tx.send(event);
    }
}

impl Default for Analytics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_message_increments_once() {
        let analytics = Analytics::new();
        analytics.record_message("hi");
        analytics.record_message("hi again");
        assert_eq!(analytics.snapshot().total_messages, 2);
        assert_eq!(analytics.snapshot().verified_stamps, 0);
    }

    #[test]
    fn reset_zeroes_all_counters() {
        let analytics = Analytics::new();
        analytics.record_message("hi");
        analytics.record_verification();
        analytics.reset();
        let c = analytics.snapshot();
        assert_eq!(c.total_messages, 0);
        assert_eq!(c.verified_stamps, 0);
        assert_eq!(c.active_users, 0);
    }

    #[tokio::test]
    async fn events_reach_subscribers_in_order() {
        let analytics = Analytics::new();
        let mut rx = analytics.subscribe();
        analytics.record_message("hello");

        let first = rx.recv().await.unwrap();
        assert!(matches!(
            first,
            RealtimeEvent::AnalyticsUpdate { counters } if counters.total_messages == 1
        ));
        let second = rx.recv().await.unwrap();
        assert!(matches!(second, RealtimeEvent::NewMessage { ref text, .. } if text == "hello"));
    }

    #[test]
    fn counter_payload_uses_camel_case() {
        let json = serde_json::to_value(Counters::default()).unwrap();
        assert!(json.get("totalMessages").is_some());
        assert!(json.get("activeUsers").is_some());
        assert!(json.get("verifiedStamps").is_some());
    }

    #[test]
    fn analytics_events_share_one_payload_shape() {
        // The SSE handler replays a snapshot on connect wrapped in the
        // same variant it forwards afterwards, so both carry the tag
        // and the flattened counters.
        let event = RealtimeEvent::AnalyticsUpdate {
            counters: Counters {
                total_messages: 3,
                ..Counters::default()
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "analytics_update");
        assert_eq!(json["totalMessages"], 3);
        assert!(json.get("activeUsers").is_some());
    }
}
