use pubsub_cluster::{
    Aggregated, ClientConfig, InMemoryNode, InMemoryTransport, NodeId, PubSubClient,
    PubSubCommands, Reply, Transport,
};
use std::sync::Arc;

async fn connect(node: InMemoryNode) -> (PubSubClient, InMemoryTransport) {
    let config = ClientConfig::from_url("redis://127.0.0.1:6379").unwrap();
    let transport = InMemoryTransport::new(config.response_timeout);
    transport.register_node("127.0.0.1:6379", node).await.unwrap();
    let shared: Arc<dyn Transport> = Arc::new(transport.clone());
    (PubSubClient::new(config, shared).unwrap(), transport)
}

#[tokio::test]
async fn numsub_reply_is_paired_positionally() {
    let (client, _) = connect(
        InMemoryNode::new()
            .with_subscribers("foo", 3)
            .with_subscribers("bar", 5),
    )
    .await;
    let counts = client
        .pubsub_numsub(&["foo", "bar", "baz"], true)
        .await
        .unwrap()
        .into_reduced()
        .unwrap();
    assert_eq!(
        counts,
        vec![
            ("foo".to_string(), 3),
            ("bar".to_string(), 5),
            ("baz".to_string(), 0)
        ]
    );
}

#[tokio::test]
async fn raw_numsub_keeps_the_flat_reply() {
    let (client, _) = connect(InMemoryNode::new().with_subscribers("foo", 3)).await;
    let reply = client.pubsub_numsub(&["foo"], false).await.unwrap();
    match reply.result {
        Aggregated::Raw(replies) => {
            assert_eq!(
                replies.get(&NodeId::new("127.0.0.1:6379")),
                Some(&Reply::Array(vec![Reply::bulk("foo"), Reply::Integer(3)]))
            );
        }
        Aggregated::Reduced(_) => panic!("expected raw replies"),
    }
}

#[tokio::test]
async fn default_pattern_comes_from_config() {
    let config = ClientConfig::single("127.0.0.1:6379").default_pattern("news.*");
    let transport = InMemoryTransport::new(config.response_timeout);
    transport
        .register_node(
            "127.0.0.1:6379",
            InMemoryNode::new()
                .with_subscribers("news.tech", 1)
                .with_subscribers("sport", 1),
        )
        .await
        .unwrap();
    let client = PubSubClient::new(config, Arc::new(transport)).unwrap();

    let channels = client.pubsub_channels(None, true).await.unwrap();
    assert_eq!(channels.into_reduced().unwrap(), vec!["news.tech"]);
    let everything = client.pubsub_channels(Some("*"), true).await.unwrap();
    assert_eq!(everything.into_reduced().unwrap(), vec!["news.tech", "sport"]);
}

#[tokio::test]
async fn publish_reaches_channel_and_pattern_subscribers() {
    let (client, transport) = connect(
        InMemoryNode::new()
            .with_subscribers("orders", 2)
            .with_pattern("ord*"),
    )
    .await;
    assert_eq!(client.publish("orders", "created").await.unwrap(), 3);
    assert_eq!(client.publish("other", "ignored").await.unwrap(), 0);
    assert_eq!(transport.published(client.node()).await.len(), 2);
}
