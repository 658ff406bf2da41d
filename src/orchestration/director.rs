//! Seam to the external host director.

use async_trait::async_trait;

use crate::hosts::Host;

/// External collaborator that applies task outcomes to persisted host
/// state and knows the deployment mode.
///
/// Only two calls originate from this crate, both from task completion:
/// `host_enabled` after a successful enable, and `host_disabled` for every
/// non-aborted disable regardless of its result.
#[async_trait]
pub trait HostDirector: Send + Sync {
    async fn host_enabled(&self, host: &Host);

    async fn host_disabled(&self, host: &Host);

    /// Whether this deployment runs a single controller. Single controller
    /// deployments keep container services running on a host even while
    /// its other services are disabled.
    fn single_controller(&self) -> bool;
}
