use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one reachable server node, usually `host:port`.
///
/// Produced by the topology provider; the dispatch layer only compares and
/// clones it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Master,
    Replica,
}

/// A known node and the role it currently plays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: NodeId,
    pub role: NodeRole,
}

impl NodeInfo {
    pub fn master(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            role: NodeRole::Master,
        }
    }

    pub fn replica(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            role: NodeRole::Replica,
        }
    }

    pub fn is_master(&self) -> bool {
        self.role == NodeRole::Master
    }
}
