//! # Host Lifecycle Orchestration
//!
//! The per-operation pipeline builders and completion handlers. Builders
//! are pure construction logic: given a host snapshot they produce the
//! ordered work-step list for the operation, with all conditional
//! inclusion decided up front. Completion handlers translate the
//! sequencer's aggregate outcome into host FSM events and the director
//! side effects.

pub mod completion;
pub mod director;
pub mod pipelines;

pub use completion::{DirectorNotice, TaskCompletion};
pub use director::HostDirector;
pub use pipelines::{build_host_task, HostOperation};
