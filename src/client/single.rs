use async_trait::async_trait;
use std::sync::Arc;
use tracing::{Level, event};

use super::{FanOutReply, PubSubCommands};
use crate::command::CommandRequest;
use crate::config::ClientConfig;
use crate::core::{NodeId, PubSubError, Reply, Result};
use crate::reducer::{Aggregated, PerNodeReplies, parse_numsub};
use crate::transport::Transport;

/// Pub/sub commands against one server.
///
/// Every call is a single request/reply exchange; with `aggregate = false`
/// the raw reply comes back keyed by this client's node.
pub struct PubSubClient {
    node: NodeId,
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl PubSubClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        if config.cluster {
            return Err(PubSubError::Config(
                "cluster configuration given to a single-node client".to_string(),
            ));
        }
        let node = config
            .nodes
            .first()
            .map(|node| NodeId::new(node.as_str()))
            .ok_or_else(|| PubSubError::Config("at least one node is required".to_string()))?;
        Ok(Self {
            node,
            transport,
            config,
        })
    }

    pub fn node(&self) -> &NodeId {
        &self.node
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn request(&self, request: &CommandRequest) -> Result<Reply> {
        event!(Level::DEBUG, command = %request.command, node = %self.node, "sending request");
        self.transport
            .send(&self.node, request)
            .await
            .map_err(|err| PubSubError::transport(self.node.clone(), err))
    }

    /// Decodes `reply` with `decode`, or wraps it untouched.
    fn shape<T>(
        &self,
        reply: Reply,
        aggregate: bool,
        decode: impl FnOnce(&Reply) -> Result<T>,
    ) -> Result<FanOutReply<T>> {
        let result = if aggregate {
            Aggregated::Reduced(decode(&reply)?)
        } else {
            Aggregated::Raw(PerNodeReplies::from_entries([(self.node.clone(), reply)])?)
        };
        Ok(FanOutReply::complete(result))
    }
}

#[async_trait]
impl PubSubCommands for PubSubClient {
    async fn publish(&self, channel: &str, message: &str) -> Result<i64> {
        self.request(&CommandRequest::publish(channel, message))
            .await?
            .as_integer()
    }

    async fn pubsub_channels(
        &self,
        pattern: Option<&str>,
        aggregate: bool,
    ) -> Result<FanOutReply<Vec<String>>> {
        let pattern = pattern.unwrap_or(self.config.default_pattern.as_str());
        let reply = self.request(&CommandRequest::channels(pattern)).await?;
        self.shape(reply, aggregate, Reply::to_string_list)
    }

    async fn pubsub_numpat(&self, aggregate: bool) -> Result<FanOutReply<i64>> {
        let reply = self.request(&CommandRequest::numpat()).await?;
        self.shape(reply, aggregate, Reply::as_integer)
    }

    async fn pubsub_numsub(
        &self,
        channels: &[&str],
        aggregate: bool,
    ) -> Result<FanOutReply<Vec<(String, i64)>>> {
        let reply = self.request(&CommandRequest::numsub(channels)).await?;
        self.shape(reply, aggregate, parse_numsub)
    }
}
