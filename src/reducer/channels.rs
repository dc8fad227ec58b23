use std::collections::HashSet;

use super::{Aggregated, PerNodeReplies, ReducedResult};
use crate::core::Result;

/// Reducer for `PUBSUB CHANNELS`.
pub fn reduce_channels(
    replies: PerNodeReplies,
    aggregate: bool,
) -> Result<Aggregated<ReducedResult>> {
    if !aggregate {
        return Ok(Aggregated::Raw(replies));
    }
    let channels = union_channels(&replies)?;
    Ok(Aggregated::Reduced(ReducedResult::Channels(channels)))
}

/// Union of every node's channel listing, first-seen order, no duplicates.
///
/// A channel reported by several nodes (or twice by one node) is listed
/// once.
pub fn union_channels(replies: &PerNodeReplies) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut channels = Vec::new();
    for (_, reply) in replies.iter() {
        for channel in reply.to_string_list()? {
            if seen.insert(channel.clone()) {
                channels.push(channel);
            }
        }
    }
    Ok(channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{NodeId, PubSubError, Reply};

    fn listing(entries: &[(&str, &[&str])]) -> PerNodeReplies {
        PerNodeReplies::from_entries(entries.iter().map(|(node, channels)| {
            (NodeId::new(*node), Reply::bulk_array(channels.iter().copied()))
        }))
        .unwrap()
    }

    #[test]
    fn union_keeps_first_seen_order() {
        let replies = listing(&[("n1", &["a", "b"]), ("n2", &["b", "c"]), ("n3", &[])]);
        assert_eq!(union_channels(&replies).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn disjoint_sets_keep_every_channel() {
        let replies = listing(&[("n1", &["a", "b"]), ("n2", &["c"]), ("n3", &["d", "e"])]);
        assert_eq!(union_channels(&replies).unwrap().len(), 5);
    }

    #[test]
    fn duplicates_within_one_node_collapse() {
        let replies = listing(&[("n1", &["a", "a", "b"])]);
        assert_eq!(union_channels(&replies).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn no_nodes_reduces_to_empty_list() {
        let result = reduce_channels(PerNodeReplies::new(), true).unwrap();
        assert_eq!(result, Aggregated::Reduced(ReducedResult::Channels(vec![])));
    }

    #[test]
    fn passthrough_returns_input_untouched() {
        let replies = listing(&[("n1", &["a"]), ("n2", &["a"])]);
        let result = reduce_channels(replies.clone(), false).unwrap();
        assert_eq!(result, Aggregated::Raw(replies));
    }

    #[test]
    fn malformed_listing_is_an_error() {
        let replies =
            PerNodeReplies::from_entries([(NodeId::new("n1"), Reply::Integer(3))]).unwrap();
        assert!(matches!(
            reduce_channels(replies, true),
            Err(PubSubError::Aggregation(_))
        ));
    }
}
