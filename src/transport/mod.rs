//! Sending commands to nodes.
//!
//! The wire codec and connection handling live behind [`Transport`]; this
//! crate ships an in-memory implementation for tests and demos.

mod in_memory;

pub use in_memory::{InMemoryNode, InMemoryTransport, NodeHealth};

use async_trait::async_trait;
use futures::future::join_all;

use crate::command::CommandRequest;
use crate::core::{NodeId, Reply, TransportError};

/// Outcome of one request to one node.
pub type NodeOutcome = std::result::Result<Reply, TransportError>;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` to `node` and waits for its reply.
    ///
    /// Connection failures, timeouts and protocol violations come back as
    /// `TransportError`; a server-side error reply is a successful
    /// exchange carrying `Reply::Error`.
    async fn send(&self, node: &NodeId, request: &CommandRequest) -> NodeOutcome;

    /// Sends `request` to every target concurrently and waits for all of
    /// them. Outcomes are returned in target order, one per target.
    async fn send_all(
        &self,
        targets: &[NodeId],
        request: &CommandRequest,
    ) -> Vec<(NodeId, NodeOutcome)> {
        let sends = targets.iter().map(|node| async move {
            let outcome = self.send(node, request).await;
            (node.clone(), outcome)
        });
        join_all(sends).await
    }
}
