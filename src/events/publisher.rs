use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::broadcast;

/// Event kinds consumed by the host FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostFsmEventKind {
    /// The task finished with aggregate success
    TaskCompleted,
    /// The task finished with aggregate failure
    TaskFailed,
}

impl HostFsmEventKind {
    /// Get a string representation of the event kind for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::TaskCompleted => "task_completed",
            Self::TaskFailed => "task_failed",
        }
    }
}

/// Event delivered on a host's FSM channel
#[derive(Debug, Clone)]
pub struct HostFsmEvent {
    pub kind: HostFsmEventKind,
    pub context: Value,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl HostFsmEvent {
    /// Extract the termination reason from the event payload
    pub fn reason(&self) -> Option<&str> {
        self.context.get("reason").and_then(Value::as_str)
    }
}

/// Per-host FSM event channel
#[derive(Debug, Clone)]
pub struct FsmEventPublisher {
    sender: broadcast::Sender<HostFsmEvent>,
}

impl FsmEventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event carrying the task's termination reason.
    ///
    /// Infallible: a broadcast send only fails when there are no
    /// subscribers, and the FSM may legitimately not be listening yet.
    pub async fn publish(&self, kind: HostFsmEventKind, reason: impl Into<String>) {
        let event = HostFsmEvent {
            kind,
            context: json!({ "reason": reason.into() }),
            published_at: chrono::Utc::now(),
        };

        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            tracing::trace!(kind = %event.kind.event_type(), "no FSM subscribers for event");
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<HostFsmEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for FsmEventPublisher {
    fn default() -> Self {
        Self::new(1000)
    }
}
