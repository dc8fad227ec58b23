use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::Topology;
use crate::core::{NodeId, NodeInfo, PubSubError, Result};
use crate::routing::SLOT_COUNT;

/// Inclusive range of hash slots served by one master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRange {
    pub start: u16,
    pub end: u16,
    pub master: NodeId,
}

impl SlotRange {
    pub fn new(start: u16, end: u16, master: impl Into<NodeId>) -> Self {
        Self {
            start,
            end,
            master: master.into(),
        }
    }

    pub fn contains(&self, slot: u16) -> bool {
        (self.start..=self.end).contains(&slot)
    }
}

/// Fixed topology, e.g. from configuration or a test fixture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticTopology {
    nodes: Vec<NodeInfo>,
    #[serde(default)]
    slots: Vec<SlotRange>,
}

impl StaticTopology {
    /// Creates a topology whose slots are split evenly across the masters,
    /// in declaration order.
    pub fn new(nodes: Vec<NodeInfo>) -> Result<Self> {
        let topology = Self {
            slots: Self::even_split(&nodes),
            nodes,
        };
        topology.validate()?;
        Ok(topology)
    }

    /// Creates a topology with explicit slot ownership.
    pub fn with_slots(nodes: Vec<NodeInfo>, slots: Vec<SlotRange>) -> Result<Self> {
        let topology = Self { nodes, slots };
        topology.validate()?;
        Ok(topology)
    }

    /// Single master node; owns every slot.
    pub fn single(node: impl Into<NodeId>) -> Self {
        let nodes = vec![NodeInfo::master(node)];
        Self {
            slots: Self::even_split(&nodes),
            nodes,
        }
    }

    fn even_split(nodes: &[NodeInfo]) -> Vec<SlotRange> {
        let masters = nodes.iter().filter(|n| n.is_master()).collect::<Vec<_>>();
        if masters.is_empty() {
            return Vec::new();
        }
        let per_master = SLOT_COUNT as usize / masters.len();
        let mut ranges = Vec::with_capacity(masters.len());
        for (idx, master) in masters.iter().enumerate() {
            let start = idx * per_master;
            let end = if idx + 1 == masters.len() {
                SLOT_COUNT as usize - 1
            } else {
                start + per_master - 1
            };
            ranges.push(SlotRange::new(start as u16, end as u16, master.id.clone()));
        }
        ranges
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if node.id.as_str().trim().is_empty() {
                return Err(PubSubError::Topology("node id must not be empty".to_string()));
            }
            if !seen.insert(node.id.clone()) {
                return Err(PubSubError::Topology(format!(
                    "node '{}' is listed twice",
                    node.id
                )));
            }
        }
        for range in &self.slots {
            if range.start > range.end || range.end >= SLOT_COUNT {
                return Err(PubSubError::Topology(format!(
                    "invalid slot range {}-{}",
                    range.start, range.end
                )));
            }
            let owner = self.nodes.iter().find(|n| n.id == range.master);
            if !owner.is_some_and(NodeInfo::is_master) {
                return Err(PubSubError::Topology(format!(
                    "slot range {}-{} is owned by '{}', which is not a known master",
                    range.start, range.end, range.master
                )));
            }
        }
        Ok(())
    }

    pub fn slots(&self) -> &[SlotRange] {
        &self.slots
    }
}

impl Topology for StaticTopology {
    fn nodes(&self) -> Vec<NodeInfo> {
        self.nodes.clone()
    }

    fn master_for_slot(&self, slot: u16) -> Result<NodeId> {
        self.slots
            .iter()
            .find(|range| range.contains(slot))
            .map(|range| range.master.clone())
            .ok_or_else(|| PubSubError::Topology(format!("slot {} is not covered", slot)))
    }
}
