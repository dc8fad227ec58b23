//! JSON description of an in-memory cluster, used by the CLI and tests.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "id": "10.0.0.1:7000", "channels": { "news": 2 }, "patterns": ["news.*"] },
//!     { "id": "10.0.0.2:7001", "role": "replica", "down": true }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::client::ClusterPubSubClient;
use crate::config::ClientConfig;
use crate::core::{NodeInfo, NodeRole, PubSubError, Result};
use crate::topology::{SlotRange, StaticTopology};
use crate::transport::{InMemoryNode, InMemoryTransport, NodeHealth};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterFixture {
    pub nodes: Vec<FixtureNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureNode {
    pub id: String,
    #[serde(default = "default_role")]
    pub role: NodeRole,
    /// Channel name to subscriber count.
    #[serde(default)]
    pub channels: BTreeMap<String, i64>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub down: bool,
    /// Artificial reply latency in milliseconds.
    #[serde(default)]
    pub latency_ms: Option<u64>,
    /// Inclusive slot range served by this master.
    #[serde(default)]
    pub slots: Option<(u16, u16)>,
}

fn default_role() -> NodeRole {
    NodeRole::Master
}

impl ClusterFixture {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| PubSubError::Config(format!("invalid cluster fixture: {}", err)))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|err| {
            PubSubError::Config(format!("cannot read fixture {}: {}", path.display(), err))
        })?;
        Self::from_json(&json)
    }

    fn node_infos(&self) -> Vec<NodeInfo> {
        self.nodes
            .iter()
            .map(|node| NodeInfo {
                id: node.id.as_str().into(),
                role: node.role,
            })
            .collect()
    }

    /// Topology described by the fixture. Explicit slot ranges are used
    /// when any node declares one, otherwise slots are split evenly.
    pub fn topology(&self) -> Result<StaticTopology> {
        let ranges = self
            .nodes
            .iter()
            .filter_map(|node| {
                node.slots
                    .map(|(start, end)| SlotRange::new(start, end, node.id.as_str()))
            })
            .collect::<Vec<_>>();
        if ranges.is_empty() {
            StaticTopology::new(self.node_infos())
        } else {
            StaticTopology::with_slots(self.node_infos(), ranges)
        }
    }

    /// In-memory transport with one simulated server per fixture node.
    pub async fn transport(&self, response_timeout: Duration) -> Result<InMemoryTransport> {
        let transport = InMemoryTransport::new(response_timeout);
        for node in &self.nodes {
            let mut state = InMemoryNode::new();
            for (channel, subscribers) in &node.channels {
                state = state.with_subscribers(channel.as_str(), *subscribers);
            }
            for pattern in &node.patterns {
                state = state.with_pattern(pattern.as_str());
            }
            if node.down {
                state = state.with_health(NodeHealth::Down);
            } else if let Some(latency) = node.latency_ms {
                state = state.with_health(NodeHealth::Slow(Duration::from_millis(latency)));
            }
            transport.register_node(node.id.as_str(), state).await?;
        }
        Ok(transport)
    }

    /// Cluster client over this fixture. The transport deadline is taken
    /// from `config.response_timeout`.
    pub async fn connect(&self, config: ClientConfig) -> Result<ClusterPubSubClient> {
        config.validate()?;
        let topology = self.topology()?;
        let transport = self.transport(config.response_timeout).await?;
        ClusterPubSubClient::new(config, Arc::new(topology), Arc::new(transport))
    }

    /// Seed list for a cluster configuration.
    pub fn seeds(&self) -> Vec<String> {
        self.nodes.iter().map(|node| node.id.clone()).collect()
    }
}
