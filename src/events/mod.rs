//! Host FSM event channel.
//!
//! The orchestration layer produces exactly two event kinds for a host's
//! state machine: `TASK_COMPLETED` and `TASK_FAILED`, each carrying the
//! termination reason of the task that produced it.

pub mod publisher;

pub use publisher::{FsmEventPublisher, HostFsmEvent, HostFsmEventKind};
