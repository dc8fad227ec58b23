use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{PubSubError, Result};

const SINGLE_SCHEME: &str = "redis://";
const CLUSTER_SCHEME: &str = "redis-cluster://";
const DEFAULT_PORT: u16 = 6379;

/// What an introspection call does when some selected nodes did not
/// answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialFailurePolicy {
    /// Fail the whole call, listing every node that failed.
    #[default]
    RequireAll,
    /// Reduce over the nodes that answered and report the rest alongside
    /// the value.
    BestEffort,
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Seed nodes as `host:port`
    pub nodes: Vec<String>,

    /// True when the seeds describe a cluster
    pub cluster: bool,

    /// Per-node response deadline. Clients do not enforce it themselves;
    /// it is handed to the transport when one is built from this config
    /// (see `ClusterFixture::connect`).
    pub response_timeout: Duration,

    /// Handling of unreachable nodes during fan-out
    pub partial_failure: PartialFailurePolicy,

    /// Pattern used by `pubsub_channels` when none is given
    pub default_pattern: String,
}

impl ClientConfig {
    /// Configuration for a single server.
    pub fn single(node: &str) -> Self {
        Self {
            nodes: vec![node.to_string()],
            cluster: false,
            response_timeout: Duration::from_secs(5),
            partial_failure: PartialFailurePolicy::RequireAll,
            default_pattern: "*".to_string(),
        }
    }

    /// Configuration for a cluster reachable through `seeds`.
    pub fn cluster<S: AsRef<str>>(seeds: &[S]) -> Self {
        Self {
            nodes: seeds.iter().map(|s| s.as_ref().to_string()).collect(),
            cluster: true,
            ..Self::single("")
        }
    }

    /// Set the per-node response timeout
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Set the partial failure policy
    pub fn partial_failure(mut self, policy: PartialFailurePolicy) -> Self {
        self.partial_failure = policy;
        self
    }

    /// Set the default channel pattern
    pub fn default_pattern(mut self, pattern: &str) -> Self {
        self.default_pattern = pattern.to_string();
        self
    }

    /// Parse from connection string
    ///
    /// Formats: `redis://host:port` and `redis-cluster://h1:p1,h2:p2`.
    /// A missing port defaults to 6379.
    pub fn from_url(url: &str) -> Result<Self> {
        let (cluster, rest) = if let Some(rest) = url.strip_prefix(CLUSTER_SCHEME) {
            (true, rest)
        } else if let Some(rest) = url.strip_prefix(SINGLE_SCHEME) {
            (false, rest)
        } else {
            return Err(PubSubError::Config(format!(
                "URL must start with '{}' or '{}'",
                SINGLE_SCHEME, CLUSTER_SCHEME
            )));
        };

        let rest = rest.trim_end_matches('/');
        let nodes = rest
            .split(',')
            .map(parse_host_port)
            .collect::<Result<Vec<_>>>()?;

        if !cluster && nodes.len() != 1 {
            return Err(PubSubError::Config(format!(
                "'{}' accepts exactly one host, got {}",
                SINGLE_SCHEME,
                nodes.len()
            )));
        }

        let config = Self {
            nodes,
            cluster,
            ..Self::single("")
        };
        config.validate()?;
        Ok(config)
    }

    /// Convert to connection string
    pub fn to_url(&self) -> String {
        let scheme = if self.cluster {
            CLUSTER_SCHEME
        } else {
            SINGLE_SCHEME
        };
        format!("{}{}", scheme, self.nodes.join(","))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(PubSubError::Config("at least one node is required".to_string()));
        }
        for node in &self.nodes {
            parse_host_port(node)?;
        }
        if !self.cluster && self.nodes.len() > 1 {
            return Err(PubSubError::Config(
                "single-node configuration lists more than one node".to_string(),
            ));
        }
        if self.response_timeout.is_zero() {
            return Err(PubSubError::Config("response_timeout must be > 0".to_string()));
        }
        if self.default_pattern.is_empty() {
            return Err(PubSubError::Config("default_pattern cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Normalizes `host[:port]` to `host:port`.
fn parse_host_port(node: &str) -> Result<String> {
    let node = node.trim();
    let (host, port) = match node.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| PubSubError::Config(format!("invalid port in '{}'", node)))?;
            (host, port)
        }
        None => (node, DEFAULT_PORT),
    };
    if host.is_empty() {
        return Err(PubSubError::Config(format!("empty host in '{}'", node)));
    }
    Ok(format!("{}:{}", host, port))
}
