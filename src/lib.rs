// ============================================================================
// pubsub-cluster Library
// ============================================================================

//! Cluster-wide pub/sub introspection for a partitioned key-value store.
//!
//! A cluster spreads subscription state across many nodes. Questions like
//! "which channels have subscribers?" have to be asked of every node and
//! the answers reconciled. [`ClusterPubSubClient`] does that: the
//! node-selection registry picks the targets for a command, the transport
//! sends to all of them concurrently, and the reducer registered for the
//! command folds the per-node replies into one value. Passing
//! `aggregate = false` returns the per-node replies untouched instead.
//!
//! # Examples
//!
//! ```
//! use pubsub_cluster::{
//!     ClientConfig, ClusterPubSubClient, InMemoryNode, InMemoryTransport, NodeInfo,
//!     PubSubCommands, StaticTopology,
//! };
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> pubsub_cluster::Result<()> {
//! let transport = InMemoryTransport::default();
//! transport.register_node("n1:7000", InMemoryNode::new().with_subscribers("a", 1)).await?;
//! transport.register_node("n2:7001", InMemoryNode::new().with_subscribers("b", 2)).await?;
//!
//! let topology = StaticTopology::new(vec![
//!     NodeInfo::master("n1:7000"),
//!     NodeInfo::master("n2:7001"),
//! ])?;
//! let client = ClusterPubSubClient::new(
//!     ClientConfig::cluster(&["n1:7000", "n2:7001"]),
//!     Arc::new(topology),
//!     Arc::new(transport),
//! )?;
//!
//! let channels = client.pubsub_channels(None, true).await?.into_reduced()?;
//! assert_eq!(channels, vec!["a", "b"]);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod command;
pub mod config;
pub mod core;
pub mod fixture;
pub mod pattern;
pub mod reducer;
pub mod registries;
pub mod routing;
pub mod topology;
pub mod transport;

// Re-export main types for convenience
pub use crate::client::{ClusterPubSubClient, FanOutReply, PubSubClient, PubSubCommands};
pub use crate::command::{Command, CommandRequest};
pub use crate::config::{ClientConfig, PartialFailurePolicy};
pub use crate::core::{
    NodeFailure, NodeId, NodeInfo, NodeRole, PubSubError, Reply, Result, TransportError,
};
pub use crate::fixture::ClusterFixture;
pub use crate::reducer::{Aggregated, PerNodeReplies, ReducedResult, ReducerRegistry};
pub use crate::registries::CommandRegistries;
pub use crate::routing::{NodeSelectionPolicy, NodeSelectionRegistry};
pub use crate::topology::{SlotRange, StaticTopology, Topology};
pub use crate::transport::{InMemoryNode, InMemoryTransport, NodeHealth, Transport};
