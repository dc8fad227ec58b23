//! Cluster topology: which nodes exist, their roles, and who owns a slot.

mod static_topology;

pub use static_topology::{SlotRange, StaticTopology};

use crate::core::{NodeId, NodeInfo, Result};

/// Source of the current cluster layout.
///
/// Discovery and refresh are the implementor's concern; the dispatch layer
/// only reads snapshots.
pub trait Topology: Send + Sync {
    /// Every known node with its role, in a stable order.
    fn nodes(&self) -> Vec<NodeInfo>;

    /// The master currently serving `slot`.
    fn master_for_slot(&self, slot: u16) -> Result<NodeId>;
}
