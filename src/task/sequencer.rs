//! The generic task sequencer.
//!
//! Owns an ordered list of work steps plus abort/completion state. Steps
//! are dispatched strictly one at a time; the sequencer suspends on each
//! step's future and resumes only when the step reports. The first hard
//! failure terminates the pipeline; force-pass failures are logged and
//! skipped over. The completion handler fires exactly once per task.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::hosts::Host;
use crate::task::step::{StepExecutor, StepResult, WorkStep};

/// Aggregate result of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskResult {
    Success,
    Failure,
}

impl TaskResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// Terminal state of a task, handed to its completion handler
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub result: TaskResult,
    pub reason: String,
    pub aborted: bool,
    pub steps_executed: usize,
}

/// Per-operation completion logic, invoked exactly once per task
#[async_trait]
pub trait CompletionHandler: Send + Sync {
    async fn complete(&self, outcome: TaskOutcome);
}

/// External abort control for an in-flight task.
///
/// Aborting never interrupts the step currently executing; it prevents
/// dispatch of further steps and suppresses the task's outward signaling.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    aborted: Arc<AtomicBool>,
}

impl TaskHandle {
    fn new() -> Self {
        Self {
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// Generic executor for one host lifecycle operation.
///
/// The step list is fixed at construction; insertion order is execution
/// order. A sequencer is single-use: `run` consumes it, drives it to a
/// terminal state and invokes the completion handler.
pub struct TaskSequencer {
    id: Uuid,
    name: String,
    host: Weak<Host>,
    steps: Vec<WorkStep>,
    handle: TaskHandle,
    completion: Box<dyn CompletionHandler>,
}

impl TaskSequencer {
    pub fn new(
        name: impl Into<String>,
        host: &Arc<Host>,
        steps: Vec<WorkStep>,
        completion: Box<dyn CompletionHandler>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            host: Arc::downgrade(host),
            steps,
            handle: TaskHandle::new(),
            completion,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[WorkStep] {
        &self.steps
    }

    /// Handle for aborting the task from outside
    pub fn handle(&self) -> TaskHandle {
        self.handle.clone()
    }

    /// Drive the pipeline to its terminal state.
    ///
    /// Dispatches steps strictly in order, suspending on each step's
    /// report. A hard failure or timeout short-circuits the remaining
    /// steps; a force-pass failure is logged and skipped over. The
    /// completion handler is invoked exactly once, after the last
    /// dispatched step has resolved.
    pub async fn run(self, executor: &dyn StepExecutor) -> TaskOutcome {
        let mut result = TaskResult::Success;
        let mut reason = String::new();
        let mut steps_executed = 0;

        for (position, step) in self.steps.iter().enumerate() {
            if self.handle.is_aborted() {
                debug!(task = %self.name, position, "task aborted, not dispatching further steps");
                break;
            }

            let Some(host) = self.host.upgrade() else {
                warn!(task = %self.name, "host no longer exists, failing task");
                result = TaskResult::Failure;
                reason = "host no longer exists".to_string();
                break;
            };

            debug!(task = %self.name, step = %step.name(), position, "dispatching step");
            let report = executor.run(&host, step).await;
            steps_executed += 1;

            match report.result {
                StepResult::Success => {
                    debug!(task = %self.name, step = %step.name(), "step succeeded");
                    reason = report.reason;
                }
                StepResult::Failed | StepResult::TimedOut => {
                    if step.is_force_pass() {
                        // Best-effort step: record the reason, keep going.
                        warn!(
                            task = %self.name,
                            step = %step.name(),
                            reason = %report.reason,
                            "step failed, force passing"
                        );
                        reason = report.reason;
                    } else {
                        warn!(
                            task = %self.name,
                            step = %step.name(),
                            reason = %report.reason,
                            "step failed, task failed"
                        );
                        result = TaskResult::Failure;
                        reason = report.reason;
                        break;
                    }
                }
            }
        }

        let outcome = TaskOutcome {
            result,
            reason,
            aborted: self.handle.is_aborted(),
            steps_executed,
        };

        self.completion.complete(outcome.clone()).await;
        outcome
    }
}

impl fmt::Debug for TaskSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSequencer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("steps", &self.steps.len())
            .field("aborted", &self.handle.is_aborted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrchestrationConfig;
    use crate::hosts::Host;
    use crate::task::step::{ServiceGroup, StepKind, StepReport};
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Executor scripted with per-step-name reports; everything else
    /// succeeds. Records the names of the steps it ran.
    struct ScriptedExecutor {
        reports: HashMap<String, StepReport>,
        executed: Mutex<Vec<String>>,
    }

    impl ScriptedExecutor {
        fn succeeding() -> Self {
            Self {
                reports: HashMap::new(),
                executed: Mutex::new(Vec::new()),
            }
        }

        fn with_report(mut self, step_name: &str, report: StepReport) -> Self {
            self.reports.insert(step_name.to_string(), report);
            self
        }

        fn executed(&self) -> Vec<String> {
            self.executed.lock().clone()
        }
    }

    #[async_trait]
    impl StepExecutor for ScriptedExecutor {
        async fn run(&self, _host: &Host, step: &WorkStep) -> StepReport {
            self.executed.lock().push(step.name());
            self.reports
                .get(&step.name())
                .cloned()
                .unwrap_or_else(|| StepReport::success(format!("{} ok", step.name())))
        }
    }

    struct CountingCompletion {
        calls: Arc<Mutex<Vec<TaskOutcome>>>,
    }

    #[async_trait]
    impl CompletionHandler for CountingCompletion {
        async fn complete(&self, outcome: TaskOutcome) {
            self.calls.lock().push(outcome);
        }
    }

    fn test_host() -> Arc<Host> {
        Arc::new(Host::new(
            "compute-0",
            [crate::hosts::HostPersonality::Worker],
            [ServiceGroup::Compute, ServiceGroup::Guest],
            &OrchestrationConfig::default(),
        ))
    }

    fn sequencer_with(
        host: &Arc<Host>,
        steps: Vec<WorkStep>,
    ) -> (TaskSequencer, Arc<Mutex<Vec<TaskOutcome>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let completion = Box::new(CountingCompletion {
            calls: calls.clone(),
        });
        let task = TaskSequencer::new("test-host_compute-0", host, steps, completion);
        (task, calls)
    }

    #[test]
    fn test_empty_pipeline_succeeds_with_no_steps_executed() {
        let host = test_host();
        let (task, calls) = sequencer_with(&host, Vec::new());
        let executor = ScriptedExecutor::succeeding();

        let outcome = tokio_test::block_on(task.run(&executor));

        assert_eq!(outcome.result, TaskResult::Success);
        assert_eq!(outcome.steps_executed, 0);
        assert!(!outcome.aborted);
        assert_eq!(calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_steps_run_in_insertion_order() {
        let host = test_host();
        let steps = vec![
            WorkStep::new(StepKind::DisableServices(ServiceGroup::Compute)),
            WorkStep::new(StepKind::DisableServices(ServiceGroup::Guest)),
            WorkStep::force_pass(StepKind::QueryHypervisor),
        ];
        let (task, _) = sequencer_with(&host, steps);
        let executor = ScriptedExecutor::succeeding();

        let outcome = task.run(&executor).await;

        assert_eq!(outcome.result, TaskResult::Success);
        assert_eq!(
            executor.executed(),
            vec![
                "disable-compute-services",
                "disable-guest-services",
                "query-hypervisor"
            ]
        );
    }

    #[tokio::test]
    async fn test_hard_failure_short_circuits_remaining_steps() {
        let host = test_host();
        let steps = vec![
            WorkStep::new(StepKind::DeleteServices(ServiceGroup::Compute)),
            WorkStep::new(StepKind::DeleteServices(ServiceGroup::Network)),
            WorkStep::force_pass(StepKind::NotifyServicesDeleted),
        ];
        let (task, calls) = sequencer_with(&host, steps);
        let executor = ScriptedExecutor::succeeding().with_report(
            "delete-compute-services",
            StepReport::failed("compute service delete rejected"),
        );

        let outcome = task.run(&executor).await;

        assert_eq!(outcome.result, TaskResult::Failure);
        assert_eq!(outcome.reason, "compute service delete rejected");
        // The trailing force-pass notify never runs either.
        assert_eq!(executor.executed(), vec!["delete-compute-services"]);
        assert_eq!(calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_a_hard_failure_without_force_pass() {
        let host = test_host();
        let steps = vec![
            WorkStep::new(StepKind::WaitServicesCreated(ServiceGroup::Compute)),
            WorkStep::new(StepKind::EnableServices(ServiceGroup::Compute)),
        ];
        let (task, _) = sequencer_with(&host, steps);
        let executor = ScriptedExecutor::succeeding().with_report(
            "wait-compute-services-created",
            StepReport::timed_out("timed out waiting for compute services"),
        );

        let outcome = task.run(&executor).await;

        assert_eq!(outcome.result, TaskResult::Failure);
        assert_eq!(executor.executed().len(), 1);
    }

    #[tokio::test]
    async fn test_force_pass_failure_does_not_flip_aggregate() {
        let host = test_host();
        let steps = vec![
            WorkStep::new(StepKind::EnableServices(ServiceGroup::Guest)),
            WorkStep::force_pass(StepKind::QueryHypervisor),
            WorkStep::new(StepKind::NotifyServicesEnabled),
        ];
        let (task, _) = sequencer_with(&host, steps);
        let executor = ScriptedExecutor::succeeding()
            .with_report("query-hypervisor", StepReport::failed("hypervisor unreachable"));

        let outcome = task.run(&executor).await;

        assert_eq!(outcome.result, TaskResult::Success);
        assert_eq!(outcome.steps_executed, 3);
    }

    #[tokio::test]
    async fn test_abort_before_start_dispatches_nothing() {
        let host = test_host();
        let steps = vec![WorkStep::new(StepKind::DisableServices(
            ServiceGroup::Compute,
        ))];
        let (task, calls) = sequencer_with(&host, steps);
        let executor = ScriptedExecutor::succeeding();

        task.handle().abort();
        let outcome = task.run(&executor).await;

        assert!(outcome.aborted);
        assert_eq!(outcome.steps_executed, 0);
        assert!(executor.executed().is_empty());
        // The completion handler still fires exactly once, with the abort
        // observable.
        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].aborted);
    }

    #[tokio::test]
    async fn test_vanished_host_fails_task() {
        let host = test_host();
        let steps = vec![WorkStep::new(StepKind::NotifyHostFailed)];
        let (task, calls) = sequencer_with(&host, steps);
        drop(host);
        let executor = ScriptedExecutor::succeeding();

        let outcome = task.run(&executor).await;

        assert_eq!(outcome.result, TaskResult::Failure);
        assert_eq!(outcome.reason, "host no longer exists");
        assert!(executor.executed().is_empty());
        assert_eq!(calls.lock().len(), 1);
    }
}
