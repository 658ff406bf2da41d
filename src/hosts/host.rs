use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::config::OrchestrationConfig;
use crate::events::FsmEventPublisher;
use crate::task::step::ServiceGroup;

/// Declared role tag of a host, affecting which pipeline variant applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostPersonality {
    Controller,
    Worker,
    Storage,
}

impl fmt::Display for HostPersonality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Controller => write!(f, "controller"),
            Self::Worker => write!(f, "worker"),
            Self::Storage => write!(f, "storage"),
        }
    }
}

impl std::str::FromStr for HostPersonality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "controller" => Ok(Self::Controller),
            "worker" => Ok(Self::Worker),
            "storage" => Ok(Self::Storage),
            _ => Err(format!("Invalid host personality: {s}")),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct HostFlags {
    locking: bool,
    locked: bool,
    offline: bool,
    force_lock: bool,
}

/// A managed compute host, referenced by the orchestration layer.
///
/// The lifetime of a host is managed by the [`HostRegistry`]; tasks hold
/// weak references only. The lock/offline flags are the externally-driven
/// snapshot the pipeline builders key their conditional inclusion on.
///
/// [`HostRegistry`]: crate::hosts::HostRegistry
pub struct Host {
    name: String,
    personality: HashSet<HostPersonality>,
    configured_services: HashSet<ServiceGroup>,
    flags: RwLock<HostFlags>,
    fsm: FsmEventPublisher,
}

impl Host {
    pub fn new(
        name: impl Into<String>,
        personality: impl IntoIterator<Item = HostPersonality>,
        configured_services: impl IntoIterator<Item = ServiceGroup>,
        config: &OrchestrationConfig,
    ) -> Self {
        Self {
            name: name.into(),
            personality: personality.into_iter().collect(),
            configured_services: configured_services.into_iter().collect(),
            flags: RwLock::new(HostFlags::default()),
            fsm: FsmEventPublisher::new(config.fsm_channel_capacity),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn personality(&self) -> &HashSet<HostPersonality> {
        &self.personality
    }

    pub fn has_personality(&self, personality: HostPersonality) -> bool {
        self.personality.contains(&personality)
    }

    /// Whether the given service group is provisioned on this host
    pub fn service_configured(&self, group: ServiceGroup) -> bool {
        self.configured_services.contains(&group)
    }

    pub fn is_locking(&self) -> bool {
        self.flags.read().locking
    }

    pub fn is_locked(&self) -> bool {
        self.flags.read().locked
    }

    pub fn is_offline(&self) -> bool {
        self.flags.read().offline
    }

    pub fn is_force_lock(&self) -> bool {
        self.flags.read().force_lock
    }

    pub fn set_locking(&self, locking: bool) {
        self.flags.write().locking = locking;
    }

    pub fn set_locked(&self, locked: bool) {
        self.flags.write().locked = locked;
    }

    pub fn set_offline(&self, offline: bool) {
        self.flags.write().offline = offline;
    }

    pub fn set_force_lock(&self, force_lock: bool) {
        self.flags.write().force_lock = force_lock;
    }

    /// The host's FSM event channel
    pub fn fsm(&self) -> &FsmEventPublisher {
        &self.fsm
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = self.flags.read();
        f.debug_struct("Host")
            .field("name", &self.name)
            .field("personality", &self.personality)
            .field("configured_services", &self.configured_services)
            .field("locking", &flags.locking)
            .field("locked", &flags.locked)
            .field("offline", &flags.offline)
            .field("force_lock", &flags.force_lock)
            .finish()
    }
}
