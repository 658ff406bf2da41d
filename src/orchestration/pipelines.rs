//! Pipeline builders for the host lifecycle operations.
//!
//! One builder per operation. Each inspects the host snapshot (configured
//! service groups, personality, lock/offline flags, deployment mode) and
//! produces the fixed, ordered work-step list; the ordering encodes real
//! dependency constraints between the service groups. Construction is
//! pure and deterministic: no I/O, and all conditional inclusion happens
//! here, never during execution.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::hosts::{Host, HostPersonality};
use crate::orchestration::completion::{DirectorNotice, TaskCompletion};
use crate::orchestration::director::HostDirector;
use crate::task::sequencer::TaskSequencer;
use crate::task::step::{ServiceGroup, StepKind, WorkStep};

/// Wait for latent post-live-migration cleanup before finishing a disable.
const STABILIZE_DELAY: Duration = Duration::from_secs(10);

/// The host lifecycle operations this crate can orchestrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOperation {
    Add,
    Delete,
    Enable,
    Disable,
    Offline,
    Fail,
    NotifyDeleteFailed,
    NotifyDisableFailed,
    NotifyEnabledHost,
    NotifyDisabledHost,
    AuditEnabled,
    AuditDisabled,
}

impl HostOperation {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Offline => "offline",
            Self::Fail => "fail",
            Self::NotifyDeleteFailed => "notify-delete-failed",
            Self::NotifyDisableFailed => "notify-disable-failed",
            Self::NotifyEnabledHost => "notify-enabled",
            Self::NotifyDisabledHost => "notify-disabled",
            Self::AuditEnabled => "audit-enabled",
            Self::AuditDisabled => "audit-disabled",
        }
    }

    /// Symbolic task name for a given host
    pub fn task_name(&self, host_name: &str) -> String {
        format!("{}-host_{}", self.label(), host_name)
    }

    fn director_notice(&self) -> DirectorNotice {
        match self {
            Self::Enable => DirectorNotice::HostEnabledOnSuccess,
            Self::Disable => DirectorNotice::HostDisabledAlways,
            _ => DirectorNotice::None,
        }
    }
}

impl fmt::Display for HostOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Build the task for one lifecycle operation on a host.
///
/// The returned sequencer holds only a weak reference to the host and is
/// ready to be driven by the caller's scheduler.
pub fn build_host_task(
    operation: HostOperation,
    host: &Arc<Host>,
    director: &Arc<dyn HostDirector>,
) -> TaskSequencer {
    let single_controller = director.single_controller();
    let steps = match operation {
        HostOperation::Add => add_host_steps(host),
        HostOperation::Delete => delete_host_steps(host),
        HostOperation::Enable => enable_host_steps(host),
        HostOperation::Disable => disable_host_steps(host, single_controller),
        HostOperation::Offline => offline_host_steps(host, single_controller),
        HostOperation::Fail => fail_host_steps(),
        HostOperation::NotifyDeleteFailed => notify_delete_failed_steps(),
        HostOperation::NotifyDisableFailed => notify_disable_failed_steps(),
        HostOperation::NotifyEnabledHost => notify_enabled_host_steps(),
        HostOperation::NotifyDisabledHost => notify_disabled_host_steps(host, single_controller),
        HostOperation::AuditEnabled => audit_enabled_host_steps(host),
        HostOperation::AuditDisabled => audit_disabled_host_steps(),
    };

    let task_name = operation.task_name(host.name());
    let mut completion = TaskCompletion::new(
        &task_name,
        host,
        director.clone(),
        operation.director_notice(),
    );
    if operation == HostOperation::AuditEnabled {
        completion = completion.quiet();
    }

    TaskSequencer::new(task_name, host, steps, Box::new(completion))
}

/// Add: guest services are created on the host when provisioned there.
/// A host without guest services has nothing to do and the empty pipeline
/// completes immediately.
fn add_host_steps(host: &Host) -> Vec<WorkStep> {
    let mut steps = Vec::new();
    if host.service_configured(ServiceGroup::Guest) {
        steps.push(WorkStep::new(StepKind::CreateServices(ServiceGroup::Guest)));
    }
    steps
}

/// Delete: remove every provisioned service group, then tell dependent
/// subsystems the services are gone. The notify is best-effort: a host
/// being deleted should not be kept around because a notification failed.
fn delete_host_steps(host: &Host) -> Vec<WorkStep> {
    let mut steps = Vec::new();
    for group in [
        ServiceGroup::Compute,
        ServiceGroup::Network,
        ServiceGroup::Guest,
        ServiceGroup::Container,
    ] {
        if host.service_configured(group) {
            steps.push(WorkStep::new(StepKind::DeleteServices(group)));
        }
    }
    steps.push(WorkStep::force_pass(StepKind::NotifyServicesDeleted));
    steps
}

fn enable_host_steps(host: &Host) -> Vec<WorkStep> {
    let mut steps = Vec::new();
    if host.service_configured(ServiceGroup::Container) {
        steps.push(WorkStep::new(StepKind::EnableServices(
            ServiceGroup::Container,
        )));
    }
    if host.service_configured(ServiceGroup::Compute) {
        // The compute services must exist remotely before they can be
        // enabled.
        steps.push(WorkStep::new(StepKind::WaitServicesCreated(
            ServiceGroup::Compute,
        )));
        steps.push(WorkStep::new(StepKind::NotifyHostEnabled(
            ServiceGroup::Compute,
        )));
        steps.push(WorkStep::new(StepKind::EnableServices(
            ServiceGroup::Compute,
        )));
    }
    if host.service_configured(ServiceGroup::Network) {
        // Same constraint for the network services.
        steps.push(WorkStep::new(StepKind::WaitServicesCreated(
            ServiceGroup::Network,
        )));
        steps.push(WorkStep::new(StepKind::EnableServices(
            ServiceGroup::Network,
        )));
    }
    if host.service_configured(ServiceGroup::Guest) {
        steps.push(WorkStep::new(StepKind::EnableServices(ServiceGroup::Guest)));
    }
    steps.push(WorkStep::force_pass(StepKind::NotifyServicesEnabled));
    if host.service_configured(ServiceGroup::Compute) {
        steps.push(WorkStep::force_pass(StepKind::QueryHypervisor));
    }
    steps
}

fn disable_host_steps(host: &Host, single_controller: bool) -> Vec<WorkStep> {
    // A worker host disabled by a force lock must be rebooted; reporting
    // the services disable as failed is what triggers that reboot.
    let notify_services_step = if host.has_personality(HostPersonality::Worker)
        && host.is_force_lock()
    {
        StepKind::NotifyServicesDisableFailed
    } else {
        StepKind::NotifyServicesDisabled
    };

    let mut steps = Vec::new();
    if host.service_configured(ServiceGroup::Compute) {
        steps.push(WorkStep::new(StepKind::DisableServices(
            ServiceGroup::Compute,
        )));
    }
    if host.service_configured(ServiceGroup::Guest) {
        steps.push(WorkStep::new(StepKind::DisableServices(ServiceGroup::Guest)));
    }
    if host.service_configured(ServiceGroup::Compute) {
        steps.push(WorkStep::force_pass(StepKind::QueryHypervisor));
    }
    steps.push(WorkStep::new(StepKind::NotifyInstancesDisabling));
    if host.service_configured(ServiceGroup::Compute) {
        steps.push(WorkStep::new(StepKind::NotifyHostDisabled(
            ServiceGroup::Compute,
        )));
    }
    if host.service_configured(ServiceGroup::Network) {
        steps.push(WorkStep::new(StepKind::NotifyHostDisabled(
            ServiceGroup::Network,
        )));
    }
    steps.push(WorkStep::new(StepKind::NotifyInstancesDisabled));
    if host.service_configured(ServiceGroup::Compute) {
        steps.push(WorkStep::new(StepKind::WaitStabilize {
            timeout: STABILIZE_DELAY,
        }));
    }
    if host.service_configured(ServiceGroup::Container) {
        // Only disable the container services if the host is being locked
        // (or is already locked) and this is not a single controller
        // deployment. In a single controller deployment the container
        // services keep running.
        if (host.is_locking() || host.is_locked()) && !single_controller {
            steps.push(WorkStep::new(StepKind::DisableServices(
                ServiceGroup::Container,
            )));
            if !host.is_offline() {
                steps.push(WorkStep::new(StepKind::WaitServicesDisabled(
                    ServiceGroup::Container,
                )));
            }
        }
    }
    steps.push(WorkStep::force_pass(notify_services_step));
    if host.service_configured(ServiceGroup::Compute) {
        steps.push(WorkStep::force_pass(StepKind::QueryHypervisor));
    }
    steps
}

fn offline_host_steps(host: &Host, single_controller: bool) -> Vec<WorkStep> {
    let mut steps = Vec::new();
    if host.service_configured(ServiceGroup::Container) && !single_controller {
        // Keep the container services running in a single controller
        // deployment; otherwise they come down with the host.
        steps.push(WorkStep::new(StepKind::DisableServices(
            ServiceGroup::Container,
        )));
    }
    steps
}

fn fail_host_steps() -> Vec<WorkStep> {
    vec![WorkStep::new(StepKind::NotifyHostFailed)]
}

fn notify_delete_failed_steps() -> Vec<WorkStep> {
    vec![WorkStep::force_pass(StepKind::NotifyServicesDeleteFailed)]
}

fn notify_disable_failed_steps() -> Vec<WorkStep> {
    vec![WorkStep::force_pass(StepKind::NotifyServicesDisableFailed)]
}

fn notify_enabled_host_steps() -> Vec<WorkStep> {
    vec![WorkStep::force_pass(StepKind::NotifyServicesEnabled)]
}

fn notify_disabled_host_steps(host: &Host, single_controller: bool) -> Vec<WorkStep> {
    let mut steps = Vec::new();
    if host.service_configured(ServiceGroup::Container) {
        // Gated on locking alone, unlike the disable pipeline which also
        // accepts an already-locked host. The two guards are intentionally
        // different; unifying them would change which deployments touch
        // container services.
        if host.is_locking() && !single_controller {
            steps.push(WorkStep::new(StepKind::DisableServices(
                ServiceGroup::Container,
            )));
        }
    }
    steps.push(WorkStep::force_pass(StepKind::NotifyServicesDisabled));
    steps
}

fn audit_enabled_host_steps(host: &Host) -> Vec<WorkStep> {
    let mut steps = Vec::new();
    for group in [ServiceGroup::Compute, ServiceGroup::Network, ServiceGroup::Guest] {
        if host.service_configured(group) {
            steps.push(WorkStep::force_pass(StepKind::AuditServices(group)));
        }
    }
    steps.push(WorkStep::new(StepKind::AuditServicesComplete));
    steps
}

fn audit_disabled_host_steps() -> Vec<WorkStep> {
    vec![WorkStep::force_pass(StepKind::AuditInstances)]
}
