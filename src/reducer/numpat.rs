use super::{Aggregated, PerNodeReplies, ReducedResult};
use crate::core::{PubSubError, Result};

/// Reducer for `PUBSUB NUMPAT`.
pub fn reduce_numpat(
    replies: PerNodeReplies,
    aggregate: bool,
) -> Result<Aggregated<ReducedResult>> {
    if !aggregate {
        return Ok(Aggregated::Raw(replies));
    }
    let total = sum_counts(&replies)?;
    Ok(Aggregated::Reduced(ReducedResult::Count(total)))
}

/// Sum of the integer reply of every node; zero when no node answered.
pub fn sum_counts(replies: &PerNodeReplies) -> Result<i64> {
    let mut total: i64 = 0;
    for (node, reply) in replies.iter() {
        total = total.checked_add(reply.as_integer()?).ok_or_else(|| {
            PubSubError::Aggregation(format!("count overflow adding reply from '{}'", node))
        })?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{NodeId, Reply};

    fn counts(values: &[i64]) -> PerNodeReplies {
        PerNodeReplies::from_entries(
            values
                .iter()
                .enumerate()
                .map(|(idx, value)| (NodeId::new(format!("n{}", idx)), Reply::Integer(*value))),
        )
        .unwrap()
    }

    #[test]
    fn sums_every_node() {
        assert_eq!(sum_counts(&counts(&[2, 0, 5])).unwrap(), 7);
    }

    #[test]
    fn empty_mapping_sums_to_zero() {
        let result = reduce_numpat(PerNodeReplies::new(), true).unwrap();
        assert_eq!(result, Aggregated::Reduced(ReducedResult::Count(0)));
    }

    #[test]
    fn passthrough_returns_input_untouched() {
        let replies = counts(&[1, 2]);
        assert_eq!(
            reduce_numpat(replies.clone(), false).unwrap(),
            Aggregated::Raw(replies)
        );
    }

    #[test]
    fn overflow_is_reported() {
        let err = sum_counts(&counts(&[i64::MAX, 1])).unwrap_err();
        assert!(err.to_string().contains("count overflow"));
    }

    #[test]
    fn non_integer_reply_is_an_error() {
        let replies =
            PerNodeReplies::from_entries([(NodeId::new("n0"), Reply::bulk_array(["x"]))]).unwrap();
        assert!(reduce_numpat(replies, true).is_err());
    }
}
