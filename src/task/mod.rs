// Task module for host lifecycle orchestration
//
// A task is an ordered, immutable pipeline of work steps driven one at a
// time by the sequencer. Steps complete asynchronously through the
// StepExecutor seam; the sequencer aggregates their outcomes into a single
// result for the host FSM.

pub mod sequencer;
pub mod step;

// Re-export main types for convenient access
pub use sequencer::{
    CompletionHandler, TaskHandle, TaskOutcome, TaskResult, TaskSequencer,
};
pub use step::{ServiceGroup, StepExecutor, StepKind, StepReport, StepResult, WorkStep};
