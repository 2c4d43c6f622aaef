//! Error types for fabric-topology.

use thiserror::Error;

/// Result type for topology operations.
pub type Result<T> = std::result::Result<T, TopologyError>;

/// Errors raised while parsing identities or applying link-state events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// Node identity is not a usable loopback IPv4 address.
    #[error("invalid node identity: {0}")]
    InvalidNodeId(String),

    /// Link-state identifier is not a dot separated hex NET.
    #[error("invalid link-state id: {0}")]
    InvalidLinkStateId(String),

    /// MAC address could not be turned into a system id.
    #[error("invalid MAC address: {0}")]
    InvalidMac(String),

    /// The event is missing fields required for its kind.
    #[error("malformed event for {node}: {reason}")]
    Malformed { node: String, reason: String },
}
