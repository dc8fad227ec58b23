//! Folding per-node replies into one cluster-wide answer.
//!
//! Every reducer has the same shape, `(PerNodeReplies, aggregate) ->
//! Aggregated<ReducedResult>`, and returns its input untouched when
//! `aggregate` is false.

pub mod channels;
pub mod numpat;
pub mod numsub;
pub mod registry;
pub mod replies;

pub use channels::{reduce_channels, union_channels};
pub use numpat::{reduce_numpat, sum_counts};
pub use numsub::{parse_numsub, reduce_numsub, sum_numsub};
pub use registry::{ReducerFn, ReducerRegistry};
pub use replies::{Aggregated, PerNodeReplies};

use serde::{Deserialize, Serialize};

use crate::core::{PubSubError, Result};

/// Folded value produced by a reducer. Which variant a command yields is
/// fixed by the reducer registered for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReducedResult {
    Channels(Vec<String>),
    Count(i64),
    ChannelCounts(Vec<(String, i64)>),
}

impl ReducedResult {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Channels(_) => "channel list",
            Self::Count(_) => "count",
            Self::ChannelCounts(_) => "channel counts",
        }
    }

    pub fn into_channels(self) -> Result<Vec<String>> {
        match self {
            Self::Channels(channels) => Ok(channels),
            other => Err(mismatch("channel list", &other)),
        }
    }

    pub fn into_count(self) -> Result<i64> {
        match self {
            Self::Count(count) => Ok(count),
            other => Err(mismatch("count", &other)),
        }
    }

    pub fn into_channel_counts(self) -> Result<Vec<(String, i64)>> {
        match self {
            Self::ChannelCounts(counts) => Ok(counts),
            other => Err(mismatch("channel counts", &other)),
        }
    }
}

fn mismatch(expected: &str, actual: &ReducedResult) -> PubSubError {
    PubSubError::Aggregation(format!(
        "reducer produced {}, expected {}",
        actual.kind(),
        expected
    ))
}
