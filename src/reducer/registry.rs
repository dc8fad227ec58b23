use std::collections::HashMap;

use super::{Aggregated, PerNodeReplies, ReducedResult};
use super::{reduce_channels, reduce_numpat, reduce_numsub};
use crate::command::Command;
use crate::core::{PubSubError, Result};

/// A reducer: folds the replies of one fan-out, or passes them through
/// when `aggregate` is false.
pub type ReducerFn = fn(PerNodeReplies, bool) -> Result<Aggregated<ReducedResult>>;

/// Maps each fan-out command to the reducer reconciling its replies.
#[derive(Clone, Default)]
pub struct ReducerRegistry {
    reducers: HashMap<Command, ReducerFn>,
}

impl ReducerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates every command in `commands` with `reducer`.
    pub fn register(&mut self, commands: &[Command], reducer: ReducerFn) -> Result<()> {
        if let Some(command) = commands.iter().find(|c| self.reducers.contains_key(*c)) {
            return Err(PubSubError::RegistryLookup(format!(
                "command '{}' already has a reducer",
                command
            )));
        }
        for command in commands {
            self.reducers.insert(*command, reducer);
        }
        Ok(())
    }

    pub fn with_default_reducers() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(&[Command::PubsubChannels], reduce_channels)?;
        registry.register(&[Command::PubsubNumsub], reduce_numsub)?;
        registry.register(&[Command::PubsubNumpat], reduce_numpat)?;
        Ok(registry)
    }

    pub fn reducer_for(&self, command: Command) -> Result<ReducerFn> {
        self.reducers.get(&command).copied().ok_or_else(|| {
            PubSubError::RegistryLookup(format!("no reducer registered for '{}'", command))
        })
    }

    pub fn contains(&self, command: Command) -> bool {
        self.reducers.contains_key(&command)
    }

    /// Looks up the reducer for `command` and applies it.
    pub fn reduce(
        &self,
        command: Command,
        replies: PerNodeReplies,
        aggregate: bool,
    ) -> Result<Aggregated<ReducedResult>> {
        let reducer = self.reducer_for(command)?;
        reducer(replies, aggregate)
    }
}

impl std::fmt::Debug for ReducerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut commands = self.reducers.keys().map(Command::name).collect::<Vec<_>>();
        commands.sort_unstable();
        f.debug_struct("ReducerRegistry")
            .field("commands", &commands)
            .finish()
    }
}
