// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Live event fan-out to dashboard clients

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

/// Default number of events a slow subscriber may fall behind by
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Sink for named live events.
///
/// Publishing never fails from the caller's point of view; a publisher with
/// nobody listening simply drops the event.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &str, payload: Value);
}

/// One event as sent over the dashboard WebSocket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveEvent {
    pub event: String,
    pub data: Value,
}

/// `tokio::sync::broadcast` backed publisher
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<LiveEvent>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventPublisher for BroadcastPublisher {
    fn publish(&self, event: &str, payload: Value) {
        let live = LiveEvent {
            event: event.to_string(),
            data: payload,
        };
        // Err only means there are no subscribers right now
        if self.sender.send(live).is_err() {
            debug!("No dashboard subscribers for '{}' event", event);
        }
    }
}
