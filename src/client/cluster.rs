use async_trait::async_trait;
use std::sync::Arc;
use tracing::{Instrument, Level, event, info_span};

use super::{FanOutReply, PubSubCommands};
use crate::command::CommandRequest;
use crate::config::{ClientConfig, PartialFailurePolicy};
use crate::core::{NodeFailure, NodeId, PubSubError, Result};
use crate::reducer::{PerNodeReplies, ReducedResult};
use crate::registries::CommandRegistries;
use crate::routing::key_slot;
use crate::topology::Topology;
use crate::transport::Transport;

/// Cluster-aware pub/sub commands.
///
/// Introspection commands are fanned out to the nodes chosen by the
/// node-selection registry, and the replies are folded by the reducer
/// registered for the command. `publish` goes to the master owning the
/// channel's hash slot.
pub struct ClusterPubSubClient {
    topology: Arc<dyn Topology>,
    transport: Arc<dyn Transport>,
    registries: Arc<CommandRegistries>,
    config: ClientConfig,
}

impl std::fmt::Debug for ClusterPubSubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterPubSubClient")
            .field("registries", &self.registries)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ClusterPubSubClient {
    /// Creates a client using the shared default registries.
    pub fn new(
        config: ClientConfig,
        topology: Arc<dyn Topology>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        Self::with_registries(config, topology, transport, CommandRegistries::shared()?)
    }

    pub fn with_registries(
        config: ClientConfig,
        topology: Arc<dyn Topology>,
        transport: Arc<dyn Transport>,
        registries: Arc<CommandRegistries>,
    ) -> Result<Self> {
        config.validate()?;
        if !config.cluster {
            return Err(PubSubError::Config(
                "single-node configuration given to a cluster client".to_string(),
            ));
        }
        registries.validate()?;
        Ok(Self {
            topology,
            transport,
            registries,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn registries(&self) -> &CommandRegistries {
        &self.registries
    }

    /// Sends `request` to every selected node, waits for all of them and
    /// reduces the replies.
    pub async fn fan_out(
        &self,
        request: &CommandRequest,
        aggregate: bool,
    ) -> Result<FanOutReply<ReducedResult>> {
        let command = request.command;
        let policy = self.registries.selection().policy_for(command)?;
        let targets = policy.select(&self.topology.nodes());
        if targets.is_empty() {
            return Err(PubSubError::NoNodesAvailable(format!(
                "policy {:?} selected no node for '{}'",
                policy, command
            )));
        }

        let span = info_span!(
            "pubsub.fanout",
            command = %command,
            targets = targets.len(),
            aggregate
        );
        self.collect_and_reduce(request, &targets, aggregate)
            .instrument(span)
            .await
    }

    /// Fan-in barrier: every target has answered or failed before the
    /// reducer runs.
    async fn collect_and_reduce(
        &self,
        request: &CommandRequest,
        targets: &[NodeId],
        aggregate: bool,
    ) -> Result<FanOutReply<ReducedResult>> {
        let outcomes = self.transport.send_all(targets, request).await;

        let mut replies = PerNodeReplies::new();
        let mut failures = Vec::new();
        for (node, outcome) in outcomes {
            match outcome {
                Ok(reply) => replies.insert(node, reply)?,
                Err(err) => {
                    event!(Level::WARN, node = %node, error = %err, "node failed during fan-out");
                    failures.push(NodeFailure::new(node, err));
                }
            }
        }

        if !failures.is_empty() && self.config.partial_failure == PartialFailurePolicy::RequireAll {
            return Err(PubSubError::PartialFailure { failures });
        }

        event!(
            Level::DEBUG,
            replied = replies.len(),
            failed = failures.len(),
            "reducing replies"
        );
        let result = self
            .registries
            .reducers()
            .reduce(request.command, replies, aggregate)?;
        Ok(FanOutReply { result, failures })
    }
}

#[async_trait]
impl PubSubCommands for ClusterPubSubClient {
    async fn publish(&self, channel: &str, message: &str) -> Result<i64> {
        let slot = key_slot(channel.as_bytes());
        let node = self.topology.master_for_slot(slot)?;
        event!(Level::DEBUG, channel, slot, node = %node, "publishing");
        self.transport
            .send(&node, &CommandRequest::publish(channel, message))
            .await
            .map_err(|err| PubSubError::transport(node.clone(), err))?
            .as_integer()
    }

    async fn pubsub_channels(
        &self,
        pattern: Option<&str>,
        aggregate: bool,
    ) -> Result<FanOutReply<Vec<String>>> {
        let pattern = pattern.unwrap_or(self.config.default_pattern.as_str());
        self.fan_out(&CommandRequest::channels(pattern), aggregate)
            .await?
            .try_map(ReducedResult::into_channels)
    }

    async fn pubsub_numpat(&self, aggregate: bool) -> Result<FanOutReply<i64>> {
        self.fan_out(&CommandRequest::numpat(), aggregate)
            .await?
            .try_map(ReducedResult::into_count)
    }

    async fn pubsub_numsub(
        &self,
        channels: &[&str],
        aggregate: bool,
    ) -> Result<FanOutReply<Vec<(String, i64)>>> {
        self.fan_out(&CommandRequest::numsub(channels), aggregate)
            .await?
            .try_map(ReducedResult::into_channel_counts)
    }
}
