//! Configuration for the host orchestration layer.

use crate::error::{OrchestrationError, Result};

/// Deployment-level settings consumed when constructing hosts and wiring
/// the director.
#[derive(Debug, Clone)]
pub struct OrchestrationConfig {
    /// Single controller deployments keep container services running on a
    /// host even while its other services are disabled.
    pub single_controller: bool,
    /// Capacity of each host's FSM event channel.
    pub fsm_channel_capacity: usize,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            single_controller: false,
            fsm_channel_capacity: 1000,
        }
    }
}

impl OrchestrationConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(single_controller) = std::env::var("HOST_ORCH_SINGLE_CONTROLLER") {
            config.single_controller = single_controller.parse().map_err(|e| {
                OrchestrationError::Configuration(format!("Invalid single_controller: {e}"))
            })?;
        }

        if let Ok(capacity) = std::env::var("HOST_ORCH_FSM_CHANNEL_CAPACITY") {
            config.fsm_channel_capacity = capacity.parse().map_err(|e| {
                OrchestrationError::Configuration(format!("Invalid fsm_channel_capacity: {e}"))
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestrationConfig::default();
        assert!(!config.single_controller);
        assert_eq!(config.fsm_channel_capacity, 1000);
    }
}
