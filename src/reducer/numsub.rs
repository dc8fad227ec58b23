use std::collections::HashMap;

use super::{Aggregated, PerNodeReplies, ReducedResult};
use crate::core::{PubSubError, Reply, Result};

/// Pairs a flat `PUBSUB NUMSUB` reply positionally:
/// `[ch1, n1, ch2, n2, ...]` becomes `[(ch1, n1), (ch2, n2), ...]`.
pub fn parse_numsub(reply: &Reply) -> Result<Vec<(String, i64)>> {
    let items = reply.as_array()?;
    if items.len() % 2 != 0 {
        return Err(PubSubError::Aggregation(format!(
            "numsub reply has odd length {}",
            items.len()
        )));
    }
    items
        .chunks_exact(2)
        .map(|pair| -> Result<(String, i64)> {
            Ok((pair[0].as_str()?.to_string(), pair[1].as_integer()?))
        })
        .collect()
}

/// Reducer for `PUBSUB NUMSUB`.
pub fn reduce_numsub(
    replies: PerNodeReplies,
    aggregate: bool,
) -> Result<Aggregated<ReducedResult>> {
    if !aggregate {
        return Ok(Aggregated::Raw(replies));
    }
    let counts = sum_numsub(&replies)?;
    Ok(Aggregated::Reduced(ReducedResult::ChannelCounts(counts)))
}

/// Groups every node's `(channel, count)` pairs by channel and sums the
/// counts, emitting channels in order of first appearance.
pub fn sum_numsub(replies: &PerNodeReplies) -> Result<Vec<(String, i64)>> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut totals: Vec<(String, i64)> = Vec::new();
    for (node, reply) in replies.iter() {
        for (channel, count) in parse_numsub(reply)? {
            match positions.get(&channel) {
                Some(&idx) => {
                    let entry = &mut totals[idx].1;
                    *entry = entry.checked_add(count).ok_or_else(|| {
                        PubSubError::Aggregation(format!(
                            "subscriber count overflow for '{}' from '{}'",
                            channel, node
                        ))
                    })?;
                }
                None => {
                    positions.insert(channel.clone(), totals.len());
                    totals.push((channel, count));
                }
            }
        }
    }
    Ok(totals)
}
