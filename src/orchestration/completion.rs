//! Per-operation task completion handling.
//!
//! Invoked by the task sequencer exactly once per task. Aborted tasks are
//! logged and otherwise suppressed: no FSM event, no director side effect.

use async_trait::async_trait;
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

use crate::events::HostFsmEventKind;
use crate::hosts::Host;
use crate::orchestration::director::HostDirector;
use crate::task::sequencer::{CompletionHandler, TaskOutcome, TaskResult};

/// Which director side effect an operation carries at completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorNotice {
    /// No director involvement
    None,
    /// Enable: `host_enabled` on aggregate success only, before the event
    HostEnabledOnSuccess,
    /// Disable: `host_disabled` whenever not aborted, before the event is
    /// computed, regardless of the aggregate result. A failed disable
    /// still leaves the host disabled from the director's point of view.
    HostDisabledAlways,
}

/// Completion handler shared by all host lifecycle operations.
pub struct TaskCompletion {
    task_name: String,
    host: Weak<Host>,
    director: Arc<dyn HostDirector>,
    notice: DirectorNotice,
    quiet: bool,
}

impl TaskCompletion {
    pub fn new(
        task_name: impl Into<String>,
        host: &Arc<Host>,
        director: Arc<dyn HostDirector>,
        notice: DirectorNotice,
    ) -> Self {
        Self {
            task_name: task_name.into(),
            host: Arc::downgrade(host),
            director,
            notice,
            quiet: false,
        }
    }

    /// Log completion at trace level; used by the periodic audit task so
    /// steady-state audits do not flood the debug log.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

#[async_trait]
impl CompletionHandler for TaskCompletion {
    async fn complete(&self, outcome: TaskOutcome) {
        if outcome.aborted {
            debug!(task = %self.task_name, "task complete, but has been aborted");
            return;
        }

        let Some(host) = self.host.upgrade() else {
            warn!(task = %self.task_name, "host no longer exists, dropping completion event");
            return;
        };

        // The disabled notice precedes the result evaluation: a failed
        // disable still leaves the host disabled.
        if self.notice == DirectorNotice::HostDisabledAlways {
            self.director.host_disabled(&host).await;
        }

        if self.quiet {
            trace!(task = %self.task_name, result = %outcome.result, "task complete");
        } else {
            debug!(task = %self.task_name, result = %outcome.result, "task complete");
        }

        let kind = match outcome.result {
            TaskResult::Success => {
                if self.notice == DirectorNotice::HostEnabledOnSuccess {
                    self.director.host_enabled(&host).await;
                }
                HostFsmEventKind::TaskCompleted
            }
            TaskResult::Failure => HostFsmEventKind::TaskFailed,
        };

        host.fsm().publish(kind, outcome.reason).await;
    }
}
