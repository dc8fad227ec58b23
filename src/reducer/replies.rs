use serde::{Deserialize, Serialize};

use crate::core::{NodeId, PubSubError, Reply, Result};

/// Replies collected from one fan-out, keyed by node.
///
/// Holds exactly one entry per node that answered, in the order the
/// replies were appended. Reducers must not depend on that order; it is
/// kept so un-aggregated callers see a stable shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerNodeReplies {
    entries: Vec<(NodeId, Reply)>,
}

impl PerNodeReplies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the mapping from `(node, reply)` pairs, rejecting a node that
    /// appears twice.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NodeId, Reply)>,
    {
        let mut replies = Self::new();
        for (node, reply) in entries {
            replies.insert(node, reply)?;
        }
        Ok(replies)
    }

    pub fn insert(&mut self, node: NodeId, reply: Reply) -> Result<()> {
        if self.contains(&node) {
            return Err(PubSubError::Aggregation(format!(
                "duplicate reply from node '{}'",
                node
            )));
        }
        self.entries.push((node, reply));
        Ok(())
    }

    pub fn get(&self, node: &NodeId) -> Option<&Reply> {
        self.entries
            .iter()
            .find(|(id, _)| id == node)
            .map(|(_, reply)| reply)
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.get(node).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &Reply)> {
        self.entries.iter().map(|(node, reply)| (node, reply))
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.entries.iter().map(|(node, _)| node.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<(NodeId, Reply)> {
        self.entries
    }
}

/// Output of an introspection call: the folded value, or the untouched
/// per-node replies when the caller opted out of aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregated<T> {
    Reduced(T),
    Raw(PerNodeReplies),
}

impl<T> Aggregated<T> {
    pub fn reduced(&self) -> Option<&T> {
        match self {
            Self::Reduced(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    pub fn raw(&self) -> Option<&PerNodeReplies> {
        match self {
            Self::Reduced(_) => None,
            Self::Raw(replies) => Some(replies),
        }
    }

    pub fn is_reduced(&self) -> bool {
        matches!(self, Self::Reduced(_))
    }

    pub fn into_reduced(self) -> Result<T> {
        match self {
            Self::Reduced(value) => Ok(value),
            Self::Raw(_) => Err(PubSubError::Aggregation(
                "result was requested without aggregation".to_string(),
            )),
        }
    }

    pub fn into_raw(self) -> Result<PerNodeReplies> {
        match self {
            Self::Raw(replies) => Ok(replies),
            Self::Reduced(_) => Err(PubSubError::Aggregation(
                "result was aggregated; per-node replies are gone".to_string(),
            )),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Aggregated<U> {
        match self {
            Self::Reduced(value) => Aggregated::Reduced(f(value)),
            Self::Raw(replies) => Aggregated::Raw(replies),
        }
    }

    pub fn try_map<U>(self, f: impl FnOnce(T) -> Result<U>) -> Result<Aggregated<U>> {
        match self {
            Self::Reduced(value) => f(value).map(Aggregated::Reduced),
            Self::Raw(replies) => Ok(Aggregated::Raw(replies)),
        }
    }
}
