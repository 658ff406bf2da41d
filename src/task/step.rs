//! Work step descriptors and the executor seam.
//!
//! Steps are immutable data built at pipeline-construction time. The
//! concrete work (remote calls to the compute, network, guest and
//! container services, hypervisor polling) lives outside this crate
//! behind [`StepExecutor`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::hosts::Host;

/// A logical bundle of host-resident services, independently
/// enabled/disabled per host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceGroup {
    Compute,
    Network,
    Guest,
    Container,
}

impl fmt::Display for ServiceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compute => write!(f, "compute"),
            Self::Network => write!(f, "network"),
            Self::Guest => write!(f, "guest"),
            Self::Container => write!(f, "container"),
        }
    }
}

impl std::str::FromStr for ServiceGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compute" => Ok(Self::Compute),
            "network" => Ok(Self::Network),
            "guest" => Ok(Self::Guest),
            "container" => Ok(Self::Container),
            _ => Err(format!("Invalid service group: {s}")),
        }
    }
}

/// The distinct kinds of work a pipeline can schedule.
///
/// Tagged variants rather than one type per step: conditional pipeline
/// construction stays declarative and the sequencer stays generic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StepKind {
    /// Create the services of a group on the host
    CreateServices(ServiceGroup),
    /// Delete the services of a group from the host
    DeleteServices(ServiceGroup),
    /// Enable the services of a group
    EnableServices(ServiceGroup),
    /// Disable the services of a group
    DisableServices(ServiceGroup),
    /// Wait for a group's services to be created remotely
    WaitServicesCreated(ServiceGroup),
    /// Wait for a group's services to report disabled
    WaitServicesDisabled(ServiceGroup),
    /// Fixed wait window before permitting progression
    WaitStabilize { timeout: Duration },
    /// Notify a service group that the host is enabled
    NotifyHostEnabled(ServiceGroup),
    /// Notify a service group that the host is disabled
    NotifyHostDisabled(ServiceGroup),
    /// Notify instance management that the host is disabling
    NotifyInstancesDisabling,
    /// Notify instance management that the host is disabled
    NotifyInstancesDisabled,
    /// Notify dependent subsystems that host services are enabled
    NotifyServicesEnabled,
    /// Notify dependent subsystems that host services are disabled
    NotifyServicesDisabled,
    /// Notify dependent subsystems that host services are deleted
    NotifyServicesDeleted,
    /// Notify dependent subsystems that deleting host services failed
    NotifyServicesDeleteFailed,
    /// Notify dependent subsystems that disabling host services failed
    NotifyServicesDisableFailed,
    /// Notify dependent subsystems that the host has failed
    NotifyHostFailed,
    /// Query hypervisor state for the host
    QueryHypervisor,
    /// Audit the live state of a group's services
    AuditServices(ServiceGroup),
    /// Mark the host services audit cycle complete
    AuditServicesComplete,
    /// Audit the instances on a disabled host
    AuditInstances,
}

impl StepKind {
    /// Step name used in task logs and reports
    pub fn name(&self) -> String {
        match self {
            Self::CreateServices(group) => format!("create-{group}-services"),
            Self::DeleteServices(group) => format!("delete-{group}-services"),
            Self::EnableServices(group) => format!("enable-{group}-services"),
            Self::DisableServices(group) => format!("disable-{group}-services"),
            Self::WaitServicesCreated(group) => format!("wait-{group}-services-created"),
            Self::WaitServicesDisabled(group) => format!("wait-{group}-services-disabled"),
            Self::WaitStabilize { .. } => "wait-host-stabilize".to_string(),
            Self::NotifyHostEnabled(group) => format!("notify-{group}-host-enabled"),
            Self::NotifyHostDisabled(group) => format!("notify-{group}-host-disabled"),
            Self::NotifyInstancesDisabling => "notify-instances-host-disabling".to_string(),
            Self::NotifyInstancesDisabled => "notify-instances-host-disabled".to_string(),
            Self::NotifyServicesEnabled => "notify-host-services-enabled".to_string(),
            Self::NotifyServicesDisabled => "notify-host-services-disabled".to_string(),
            Self::NotifyServicesDeleted => "notify-host-services-deleted".to_string(),
            Self::NotifyServicesDeleteFailed => "notify-host-services-delete-failed".to_string(),
            Self::NotifyServicesDisableFailed => "notify-host-services-disable-failed".to_string(),
            Self::NotifyHostFailed => "notify-host-failed".to_string(),
            Self::QueryHypervisor => "query-hypervisor".to_string(),
            Self::AuditServices(group) => format!("audit-{group}-services"),
            Self::AuditServicesComplete => "audit-host-services-complete".to_string(),
            Self::AuditInstances => "audit-instances".to_string(),
        }
    }

    /// Target service group, if the step is parameterized by one
    pub fn service_group(&self) -> Option<ServiceGroup> {
        match self {
            Self::CreateServices(group)
            | Self::DeleteServices(group)
            | Self::EnableServices(group)
            | Self::DisableServices(group)
            | Self::WaitServicesCreated(group)
            | Self::WaitServicesDisabled(group)
            | Self::NotifyHostEnabled(group)
            | Self::NotifyHostDisabled(group)
            | Self::AuditServices(group) => Some(*group),
            _ => None,
        }
    }
}

/// One unit of work in a task pipeline, immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkStep {
    kind: StepKind,
    force_pass: bool,
}

impl WorkStep {
    /// A step whose failure fails the enclosing task
    pub fn new(kind: StepKind) -> Self {
        Self {
            kind,
            force_pass: false,
        }
    }

    /// A best-effort step: failure is recorded but does not fail the task
    pub fn force_pass(kind: StepKind) -> Self {
        Self {
            kind,
            force_pass: true,
        }
    }

    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    pub fn is_force_pass(&self) -> bool {
        self.force_pass
    }

    pub fn name(&self) -> String {
        self.kind.name()
    }
}

/// Outcome reported by a step's execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepResult {
    Success,
    Failed,
    TimedOut,
}

impl StepResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Completion report delivered back to the owning task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub result: StepResult,
    pub reason: String,
}

impl StepReport {
    pub fn success(reason: impl Into<String>) -> Self {
        Self {
            result: StepResult::Success,
            reason: reason.into(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            result: StepResult::Failed,
            reason: reason.into(),
        }
    }

    pub fn timed_out(reason: impl Into<String>) -> Self {
        Self {
            result: StepResult::TimedOut,
            reason: reason.into(),
        }
    }
}

/// Execution seam for concrete step implementations.
///
/// Implementations perform the remote or local work for a step and report
/// its outcome asynchronously; they may poll or wait internally. Retries,
/// if any, belong here - the sequencer never retries.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn run(&self, host: &Host, step: &WorkStep) -> StepReport;
}
