use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::NodeId;

/// Failure of a single node during a fan-out.
///
/// Recorded per node and never merged into the reduced value.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportError {
    #[error("node unreachable: {0}")]
    Unreachable(String),

    #[error("timed out after {0} ms")]
    Timeout(u64),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("node '{0}' is not registered with the transport")]
    NotRegistered(String),
}

/// A node that was selected for a command but produced no reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFailure {
    pub node: NodeId,
    pub error: TransportError,
}

impl NodeFailure {
    pub fn new(node: NodeId, error: TransportError) -> Self {
        Self { node, error }
    }
}

impl std::fmt::Display for NodeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.node, self.error)
    }
}

#[derive(Error, Debug)]
pub enum PubSubError {
    #[error("Registry lookup error: {0}")]
    RegistryLookup(String),

    #[error("Transport error on node '{node}': {source}")]
    Transport {
        node: NodeId,
        #[source]
        source: TransportError,
    },

    #[error("{} node(s) failed: {}", failures.len(), join_failures(failures))]
    PartialFailure { failures: Vec<NodeFailure> },

    #[error("Aggregation error: {0}")]
    Aggregation(String),

    #[error("No nodes available: {0}")]
    NoNodesAvailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Topology error: {0}")]
    Topology(String),
}

fn join_failures(failures: &[NodeFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl PubSubError {
    pub fn transport(node: NodeId, source: TransportError) -> Self {
        Self::Transport { node, source }
    }

    /// Per-node failures carried by this error, if any.
    pub fn failures(&self) -> Vec<NodeFailure> {
        match self {
            Self::PartialFailure { failures } => failures.clone(),
            Self::Transport { node, source } => {
                vec![NodeFailure::new(node.clone(), source.clone())]
            }
            _ => Vec::new(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PubSubError>;
