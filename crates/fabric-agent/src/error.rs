//! Error types for the fabric agent.

use thiserror::Error;

use fabric_election::ReportParseError;
use fabric_topology::TopologyError;

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors that can occur in the agent.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Bad configuration value
    #[error("Invalid {key}: {reason}")]
    Config { key: &'static str, reason: String },

    /// Notification that is not valid JSON or has an unknown shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Notification with invalid content
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    /// Report file could not be read back
    #[error("Report error: {0}")]
    Report(#[from] ReportParseError),

    /// Configuration channel refused an intent
    #[error("Sink error: {0}")]
    Sink(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    pub(crate) fn config(key: &'static str, reason: impl Into<String>) -> Self {
        AgentError::Config {
            key,
            reason: reason.into(),
        }
    }
}
