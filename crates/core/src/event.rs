//! Domain events published out of the agent loop.
//!
//! The thread is the record of truth; these events are a best-effort feed for
//! observers (dashboards, metrics, audit sinks) that want to react to loop
//! activity without reading threads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::action::Intent;
use crate::agent::LoopState;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// The model proposed an action and it was recorded
    ActionProposed {
        thread_id: String,
        agent: String,
        intent: Intent,
        timestamp: DateTime<Utc>,
    },

    /// The dispatcher executed an action
    ToolExecuted {
        thread_id: String,
        intent: Intent,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The loop handed control back to its caller
    LoopSuspended {
        thread_id: String,
        agent: String,
        state: LoopState,
        timestamp: DateTime<Utc>,
    },

    /// An error ended the current run
    ErrorOccurred {
        thread_id: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
