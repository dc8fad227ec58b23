//! Caller-facing pub/sub commands for single-node and cluster setups.

mod cluster;
mod single;

pub use cluster::ClusterPubSubClient;
pub use single::PubSubClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{NodeFailure, PubSubError, Result};
use crate::reducer::Aggregated;

/// Result of an introspection call together with the nodes that did not
/// answer.
///
/// `failures` is empty unless the client runs with
/// [`PartialFailurePolicy::BestEffort`](crate::PartialFailurePolicy::BestEffort).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanOutReply<T> {
    pub result: Aggregated<T>,
    pub failures: Vec<NodeFailure>,
}

impl<T> FanOutReply<T> {
    pub fn complete(result: Aggregated<T>) -> Self {
        Self {
            result,
            failures: Vec::new(),
        }
    }

    /// True when every selected node answered.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The reduced value; an error if aggregation was turned off.
    pub fn into_reduced(self) -> Result<T> {
        self.result.into_reduced()
    }

    /// Like [`into_reduced`](Self::into_reduced) but also refuses a value
    /// computed over a subset of the nodes.
    pub fn into_complete(self) -> Result<T> {
        if !self.failures.is_empty() {
            return Err(PubSubError::PartialFailure {
                failures: self.failures,
            });
        }
        self.result.into_reduced()
    }

    pub fn try_map<U>(self, f: impl FnOnce(T) -> Result<U>) -> Result<FanOutReply<U>> {
        Ok(FanOutReply {
            result: self.result.try_map(f)?,
            failures: self.failures,
        })
    }
}

/// Publish and cluster introspection commands.
///
/// With `aggregate = false` the introspection calls return the raw reply of
/// every node instead of a folded value.
#[async_trait]
pub trait PubSubCommands: Send + Sync {
    /// Publishes `message` on `channel`; returns how many subscribers
    /// received it.
    async fn publish(&self, channel: &str, message: &str) -> Result<i64>;

    /// Channels with at least one subscriber matching `pattern`
    /// (the configured default pattern when `None`).
    async fn pubsub_channels(
        &self,
        pattern: Option<&str>,
        aggregate: bool,
    ) -> Result<FanOutReply<Vec<String>>>;

    /// Number of pattern subscriptions.
    async fn pubsub_numpat(&self, aggregate: bool) -> Result<FanOutReply<i64>>;

    /// Subscriber count for each of `channels`.
    async fn pubsub_numsub(
        &self,
        channels: &[&str],
        aggregate: bool,
    ) -> Result<FanOutReply<Vec<(String, i64)>>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{NodeId, TransportError};
    use crate::reducer::PerNodeReplies;

    #[test]
    fn into_complete_refuses_partial_results() {
        let reply = FanOutReply {
            result: Aggregated::Reduced(3i64),
            failures: vec![NodeFailure::new(
                NodeId::new("n2"),
                TransportError::Timeout(10),
            )],
        };
        assert!(!reply.is_complete());
        assert_eq!(reply.clone().into_reduced().unwrap(), 3);
        assert!(matches!(
            reply.into_complete(),
            Err(PubSubError::PartialFailure { .. })
        ));
    }

    #[test]
    fn try_map_keeps_raw_and_failures() {
        let reply: FanOutReply<i64> = FanOutReply::complete(Aggregated::Raw(PerNodeReplies::new()));
        let mapped = reply.try_map(|n| Ok(n.to_string())).unwrap();
        assert!(mapped.result.raw().is_some());
        assert!(mapped.is_complete());
    }
}
