pub mod error;
pub mod types;
pub mod value;

pub use error::{NodeFailure, PubSubError, Result, TransportError};
pub use types::{NodeId, NodeInfo, NodeRole};
pub use value::Reply;
