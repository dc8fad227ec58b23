//! Which nodes receive a command.

pub mod policy;
pub mod registry;
pub mod slot;

pub use policy::NodeSelectionPolicy;
pub use registry::NodeSelectionRegistry;
pub use slot::{SLOT_COUNT, key_slot};
