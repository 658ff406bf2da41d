//! # Error Types
//!
//! Crate-wide structured error handling. Step-level failures never surface
//! here: the task sequencer absorbs them into a single aggregate result
//! that is delivered to the host FSM, so `OrchestrationError` covers only
//! the ambient concerns (configuration and registry lookups).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestrationError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Host not found: {name}")]
    HostNotFound { name: String },
}

pub type Result<T> = std::result::Result<T, OrchestrationError>;
