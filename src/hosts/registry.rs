use dashmap::DashMap;
use std::sync::{Arc, Weak};

use crate::error::{OrchestrationError, Result};
use crate::hosts::Host;

/// Owning registry of managed hosts, keyed by host name.
///
/// The registry holds the only strong references to hosts. Orchestration
/// code takes [`Weak`] back-references via [`HostRegistry::get_weak`] and
/// upgrades them at each use, so removing a host from the registry lets
/// it be disposed even while one of its tasks is still in flight.
#[derive(Debug, Default)]
pub struct HostRegistry {
    hosts: DashMap<String, Arc<Host>>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self {
            hosts: DashMap::new(),
        }
    }

    /// Register a host, replacing any previous entry with the same name
    pub fn insert(&self, host: Host) -> Arc<Host> {
        let host = Arc::new(host);
        self.hosts.insert(host.name().to_string(), host.clone());
        host
    }

    pub fn get(&self, name: &str) -> Option<Arc<Host>> {
        self.hosts.get(name).map(|entry| entry.value().clone())
    }

    /// Lookup that surfaces a missing host as an error, for callers that
    /// treat an unknown host name as a fault rather than a normal case
    pub fn lookup(&self, name: &str) -> Result<Arc<Host>> {
        self.get(name).ok_or_else(|| OrchestrationError::HostNotFound {
            name: name.to_string(),
        })
    }

    /// Non-owning reference for tasks and completion handlers
    pub fn get_weak(&self, name: &str) -> Option<Weak<Host>> {
        self.hosts.get(name).map(|entry| Arc::downgrade(entry.value()))
    }

    pub fn remove(&self, name: &str) -> Option<Arc<Host>> {
        self.hosts.remove(name).map(|(_, host)| host)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hosts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrchestrationConfig;
    use crate::hosts::HostPersonality;
    use crate::task::step::ServiceGroup;

    fn registry_with_host(name: &str) -> (HostRegistry, Arc<Host>) {
        let registry = HostRegistry::new();
        let host = registry.insert(Host::new(
            name,
            [HostPersonality::Controller],
            [ServiceGroup::Container],
            &OrchestrationConfig::default(),
        ));
        (registry, host)
    }

    #[test]
    fn test_insert_and_lookup() {
        let (registry, host) = registry_with_host("controller-0");
        assert!(registry.contains("controller-0"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("controller-0").unwrap().name(), host.name());
        assert!(registry.get("controller-1").is_none());
    }

    #[test]
    fn test_lookup_reports_missing_host() {
        let (registry, _host) = registry_with_host("controller-0");
        assert!(registry.lookup("controller-0").is_ok());

        let err = registry.lookup("controller-9").unwrap_err();
        assert!(matches!(
            err,
            OrchestrationError::HostNotFound { ref name } if name == "controller-9"
        ));
        assert_eq!(err.to_string(), "Host not found: controller-9");
    }

    #[test]
    fn test_weak_reference_dies_with_registry_entry() {
        let (registry, host) = registry_with_host("controller-0");
        let weak = registry.get_weak("controller-0").unwrap();
        assert!(weak.upgrade().is_some());

        registry.remove("controller-0");
        drop(host);
        assert!(weak.upgrade().is_none());
    }
}
