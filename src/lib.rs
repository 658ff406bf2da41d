#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Host Orchestration Core
//!
//! Task orchestration layer for managed compute host lifecycle transitions
//! inside a virtualized-infrastructure manager.
//!
//! ## Overview
//!
//! Every host lifecycle operation (add, enable, disable, delete, offline,
//! fail, plus the notify and audit variants) is a dynamically-assembled
//! pipeline of heterogeneous work steps: enabling or disabling host service
//! groups, waiting for remote state convergence, notifying dependent
//! subsystems, querying the hypervisor, auditing live state. The steps must
//! run in a fixed order, tolerate individually-unimportant failures, and
//! report a single aggregate outcome back into the host's own state machine.
//!
//! ## Architecture
//!
//! - **Pipeline builders** ([`orchestration::pipelines`]) inspect a host
//!   snapshot (configured service groups, personality, lock/offline state,
//!   deployment mode) and produce the exact ordered work-step list for an
//!   operation. Construction is pure; all conditional inclusion happens up
//!   front and the resulting step list is immutable.
//! - **Task sequencer** ([`task::sequencer`]) drives the steps one at a
//!   time, interprets each outcome (hard failure vs. force-pass failure vs.
//!   success), supports external abort, and invokes its completion handler
//!   exactly once.
//! - **Completion handlers** ([`orchestration::completion`]) translate the
//!   aggregate result into `TASK_COMPLETED` / `TASK_FAILED` events on the
//!   host's FSM channel, with the per-operation director side effects.
//!
//! Concrete step implementations (the remote calls to compute, network,
//! guest and container services) live outside this crate behind the
//! [`task::step::StepExecutor`] seam, as does the host FSM transition table
//! and the director that applies outcomes to persisted host state.
//!
//! ## Module Organization
//!
//! - [`hosts`] - Host model, personality, and the owning registry
//! - [`task`] - Work step descriptors and the generic task sequencer
//! - [`orchestration`] - Pipeline builders, completion handlers, director seam
//! - [`events`] - Host FSM event channel
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling

pub mod config;
pub mod error;
pub mod events;
pub mod hosts;
pub mod logging;
pub mod orchestration;
pub mod task;

pub use config::OrchestrationConfig;
pub use error::{OrchestrationError, Result};
pub use events::{FsmEventPublisher, HostFsmEvent, HostFsmEventKind};
pub use hosts::{Host, HostPersonality, HostRegistry};
pub use orchestration::{build_host_task, HostDirector, HostOperation};
pub use task::{
    CompletionHandler, ServiceGroup, StepExecutor, StepKind, StepReport, StepResult, TaskHandle,
    TaskOutcome, TaskResult, TaskSequencer, WorkStep,
};
