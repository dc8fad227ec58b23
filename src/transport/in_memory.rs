use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{NodeOutcome, Transport};
use crate::command::{Command, CommandRequest};
use crate::core::{NodeId, PubSubError, Reply, Result, TransportError};
use crate::pattern::glob_match;

/// Simulated reachability of an in-memory node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeHealth {
    #[default]
    Up,
    /// Refuses connections.
    Down,
    /// Answers after the given delay.
    Slow(Duration),
}

/// Subscription state held by one simulated server.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNode {
    channels: BTreeMap<String, i64>,
    patterns: Vec<String>,
    published: Vec<(String, String)>,
    health: NodeHealth,
}

impl InMemoryNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `subscribers` subscriptions to `channel`.
    pub fn with_subscribers(mut self, channel: impl Into<String>, subscribers: i64) -> Self {
        *self.channels.entry(channel.into()).or_insert(0) += subscribers;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    pub fn with_health(mut self, health: NodeHealth) -> Self {
        self.health = health;
        self
    }

    pub fn subscribe(&mut self, channel: &str) {
        *self.channels.entry(channel.to_string()).or_insert(0) += 1;
    }

    /// Drops one subscription; the channel disappears at zero.
    pub fn unsubscribe(&mut self, channel: &str) -> bool {
        let Some(count) = self.channels.get_mut(channel) else {
            return false;
        };
        *count -= 1;
        if *count <= 0 {
            self.channels.remove(channel);
        }
        true
    }

    pub fn psubscribe(&mut self, pattern: &str) {
        self.patterns.push(pattern.to_string());
    }

    pub fn published(&self) -> &[(String, String)] {
        &self.published
    }

    fn subscribers(&self, channel: &str) -> i64 {
        self.channels.get(channel).copied().unwrap_or(0)
    }

    fn execute(&mut self, request: &CommandRequest) -> Reply {
        match self.try_execute(request) {
            Ok(reply) => reply,
            Err(err) => Reply::Error(format!("ERR {}", err)),
        }
    }

    fn try_execute(&mut self, request: &CommandRequest) -> Result<Reply> {
        let args = &request.args;
        match request.command {
            Command::Publish => {
                let [channel, message] = args.as_slice() else {
                    return Err(arity(request));
                };
                let mut receivers = self.subscribers(channel);
                for pattern in &self.patterns {
                    if glob_match(pattern, channel)? {
                        receivers += 1;
                    }
                }
                self.published.push((channel.clone(), message.clone()));
                Ok(Reply::Integer(receivers))
            }
            Command::PubsubChannels => {
                let pattern = match args.as_slice() {
                    [] => "*",
                    [pattern] => pattern.as_str(),
                    _ => return Err(arity(request)),
                };
                let mut active = Vec::new();
                for (channel, count) in &self.channels {
                    if *count > 0 && glob_match(pattern, channel)? {
                        active.push(Reply::bulk(channel.as_str()));
                    }
                }
                Ok(Reply::Array(active))
            }
            Command::PubsubNumsub => Ok(Reply::Array(
                args.iter()
                    .flat_map(|channel| {
                        [
                            Reply::bulk(channel.as_str()),
                            Reply::Integer(self.subscribers(channel)),
                        ]
                    })
                    .collect(),
            )),
            Command::PubsubNumpat => {
                if !args.is_empty() {
                    return Err(arity(request));
                }
                Ok(Reply::Integer(self.patterns.len() as i64))
            }
        }
    }
}

fn arity(request: &CommandRequest) -> PubSubError {
    PubSubError::UnknownCommand(format!(
        "wrong number of arguments for '{}'",
        request.command.name().to_ascii_lowercase()
    ))
}

/// Transport that answers from in-process [`InMemoryNode`]s.
///
/// Each request is bounded by the response timeout, like a network
/// transport's per-request deadline.
#[derive(Clone)]
pub struct InMemoryTransport {
    nodes: Arc<Mutex<HashMap<NodeId, InMemoryNode>>>,
    response_timeout: Duration,
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl InMemoryTransport {
    pub fn new(response_timeout: Duration) -> Self {
        Self {
            nodes: Arc::new(Mutex::new(HashMap::new())),
            response_timeout,
        }
    }

    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    pub async fn register_node(
        &self,
        node_id: impl Into<NodeId>,
        node: InMemoryNode,
    ) -> Result<()> {
        let node_id = node_id.into();
        if node_id.as_str().trim().is_empty() {
            return Err(PubSubError::Topology("node_id must not be empty".to_string()));
        }
        self.nodes.lock().await.insert(node_id, node);
        Ok(())
    }

    pub async fn set_health(&self, node_id: &NodeId, health: NodeHealth) -> Result<()> {
        self.update_node(node_id, |node| node.health = health).await
    }

    /// Applies `f` to a registered node's state.
    pub async fn update_node<F>(&self, node_id: &NodeId, f: F) -> Result<()>
    where
        F: FnOnce(&mut InMemoryNode),
    {
        let mut nodes = self.nodes.lock().await;
        let node = nodes
            .get_mut(node_id)
            .ok_or_else(|| PubSubError::Topology(format!("node '{}' is not registered", node_id)))?;
        f(node);
        Ok(())
    }

    /// Messages delivered to `node_id` by `PUBLISH`, oldest first.
    pub async fn published(&self, node_id: &NodeId) -> Vec<(String, String)> {
        self.nodes
            .lock()
            .await
            .get(node_id)
            .map(|node| node.published().to_vec())
            .unwrap_or_default()
    }

    async fn health(&self, node_id: &NodeId) -> std::result::Result<NodeHealth, TransportError> {
        self.nodes
            .lock()
            .await
            .get(node_id)
            .map(|node| node.health)
            .ok_or_else(|| TransportError::NotRegistered(node_id.to_string()))
    }

    async fn exchange(
        &self,
        node_id: &NodeId,
        request: &CommandRequest,
        delay: Option<Duration>,
    ) -> NodeOutcome {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut nodes = self.nodes.lock().await;
        let node = nodes
            .get_mut(node_id)
            .ok_or_else(|| TransportError::NotRegistered(node_id.to_string()))?;
        Ok(node.execute(request))
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, node: &NodeId, request: &CommandRequest) -> NodeOutcome {
        let delay = match self.health(node).await? {
            NodeHealth::Up => None,
            NodeHealth::Down => {
                return Err(TransportError::Unreachable(format!(
                    "connection to {} refused",
                    node
                )));
            }
            NodeHealth::Slow(delay) => Some(delay),
        };

        let exchange = self.exchange(node, request, delay);
        match tokio::time::timeout(self.response_timeout, exchange).await {
            Ok(outcome) => outcome,
            Err(_) => Err(TransportError::Timeout(
                self.response_timeout.as_millis() as u64,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn transport_with(node: InMemoryNode) -> (InMemoryTransport, NodeId) {
        let transport = InMemoryTransport::new(Duration::from_millis(100));
        let id = NodeId::new("n1:7000");
        transport.register_node(id.clone(), node).await.unwrap();
        (transport, id)
    }

    #[tokio::test]
    async fn answers_introspection_commands() {
        let node = InMemoryNode::new()
            .with_subscribers("news", 2)
            .with_subscribers("sport", 1)
            .with_pattern("news.*");
        let (transport, id) = transport_with(node).await;

        let channels = transport
            .send(&id, &CommandRequest::channels("n*"))
            .await
            .unwrap();
        assert_eq!(channels, Reply::bulk_array(["news"]));

        let numsub = transport
            .send(&id, &CommandRequest::numsub(&["news", "missing"]))
            .await
            .unwrap();
        assert_eq!(
            numsub,
            Reply::Array(vec![
                Reply::bulk("news"),
                Reply::Integer(2),
                Reply::bulk("missing"),
                Reply::Integer(0),
            ])
        );

        let numpat = transport.send(&id, &CommandRequest::numpat()).await.unwrap();
        assert_eq!(numpat, Reply::Integer(1));
    }

    #[tokio::test]
    async fn publish_counts_channel_and_pattern_subscribers() {
        let node = InMemoryNode::new()
            .with_subscribers("news.tech", 2)
            .with_pattern("news.*")
            .with_pattern("weather");
        let (transport, id) = transport_with(node).await;

        let reply = transport
            .send(&id, &CommandRequest::publish("news.tech", "hello"))
            .await
            .unwrap();
        assert_eq!(reply, Reply::Integer(3));
        assert_eq!(
            transport.published(&id).await,
            vec![("news.tech".to_string(), "hello".to_string())]
        );
    }

    #[tokio::test]
    async fn unsubscribe_removes_empty_channels() {
        let (transport, id) = transport_with(InMemoryNode::new().with_subscribers("a", 1)).await;
        transport
            .update_node(&id, |node| {
                assert!(node.unsubscribe("a"));
                assert!(!node.unsubscribe("b"));
            })
            .await
            .unwrap();
        let reply = transport
            .send(&id, &CommandRequest::channels("*"))
            .await
            .unwrap();
        assert_eq!(reply, Reply::Array(vec![]));
    }

    #[tokio::test]
    async fn bad_arguments_yield_error_reply() {
        let (transport, id) = transport_with(InMemoryNode::new()).await;
        let reply = transport
            .send(&id, &CommandRequest::new(Command::Publish).arg("only-channel"))
            .await
            .unwrap();
        assert!(matches!(
            reply,
            Reply::Error(ref message) if message.contains("wrong number of arguments")
        ));
    }

    #[tokio::test]
    async fn failures_are_reported_per_node() {
        let (transport, id) = transport_with(InMemoryNode::new()).await;
        let unknown = NodeId::new("ghost:1");
        assert_eq!(
            transport.send(&unknown, &CommandRequest::numpat()).await,
            Err(TransportError::NotRegistered("ghost:1".to_string()))
        );

        transport.set_health(&id, NodeHealth::Down).await.unwrap();
        assert!(matches!(
            transport.send(&id, &CommandRequest::numpat()).await,
            Err(TransportError::Unreachable(_))
        ));

        transport
            .set_health(&id, NodeHealth::Slow(Duration::from_millis(500)))
            .await
            .unwrap();
        assert_eq!(
            transport.send(&id, &CommandRequest::numpat()).await,
            Err(TransportError::Timeout(100))
        );
    }

    #[tokio::test]
    async fn send_all_keeps_target_order() {
        let transport = InMemoryTransport::new(Duration::from_millis(100));
        transport
            .register_node("a:1", InMemoryNode::new().with_pattern("x"))
            .await
            .unwrap();
        transport
            .register_node(
                "b:1",
                InMemoryNode::new().with_health(NodeHealth::Slow(Duration::from_millis(10))),
            )
            .await
            .unwrap();

        let targets = vec![NodeId::new("b:1"), NodeId::new("a:1"), NodeId::new("c:1")];
        let outcomes = transport
            .send_all(&targets, &CommandRequest::numpat())
            .await;
        let ids = outcomes.iter().map(|(id, _)| id.clone()).collect::<Vec<_>>();
        assert_eq!(ids, targets);
        assert_eq!(outcomes[0].1, Ok(Reply::Integer(0)));
        assert_eq!(outcomes[1].1, Ok(Reply::Integer(1)));
        assert!(outcomes[2].1.is_err());
    }
}
