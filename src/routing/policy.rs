use serde::{Deserialize, Serialize};

use crate::core::{NodeId, NodeInfo, NodeRole};

/// Rule deciding which of the known nodes a command must reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSelectionPolicy {
    AllNodes,
    AllMasters,
    AllReplicas,
    /// First node in topology order.
    AnyOne,
}

impl NodeSelectionPolicy {
    /// Resolves the policy against the known nodes, keeping topology order.
    pub fn select(&self, nodes: &[NodeInfo]) -> Vec<NodeId> {
        match self {
            Self::AllNodes => nodes.iter().map(|node| node.id.clone()).collect(),
            Self::AllMasters => Self::with_role(nodes, NodeRole::Master),
            Self::AllReplicas => Self::with_role(nodes, NodeRole::Replica),
            Self::AnyOne => nodes.first().map(|node| node.id.clone()).into_iter().collect(),
        }
    }

    fn with_role(nodes: &[NodeInfo], role: NodeRole) -> Vec<NodeId> {
        nodes
            .iter()
            .filter(|node| node.role == role)
            .map(|node| node.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes() -> Vec<NodeInfo> {
        vec![
            NodeInfo::master("m1:7000"),
            NodeInfo::replica("r1:7001"),
            NodeInfo::master("m2:7002"),
        ]
    }

    #[test]
    fn all_nodes_keeps_topology_order() {
        let selected = NodeSelectionPolicy::AllNodes.select(&nodes());
        assert_eq!(
            selected,
            vec![
                NodeId::new("m1:7000"),
                NodeId::new("r1:7001"),
                NodeId::new("m2:7002")
            ]
        );
    }

    #[test]
    fn role_filters() {
        assert_eq!(
            NodeSelectionPolicy::AllMasters.select(&nodes()),
            vec![NodeId::new("m1:7000"), NodeId::new("m2:7002")]
        );
        assert_eq!(
            NodeSelectionPolicy::AllReplicas.select(&nodes()),
            vec![NodeId::new("r1:7001")]
        );
    }

    #[test]
    fn any_one_on_empty_topology_selects_nothing() {
        assert!(NodeSelectionPolicy::AnyOne.select(&[]).is_empty());
        assert_eq!(
            NodeSelectionPolicy::AnyOne.select(&nodes()),
            vec![NodeId::new("m1:7000")]
        );
    }
}
