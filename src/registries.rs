use lazy_static::lazy_static;
use std::sync::Arc;

use crate::command::Command;
use crate::core::{PubSubError, Result};
use crate::reducer::ReducerRegistry;
use crate::routing::NodeSelectionRegistry;

lazy_static! {
    static ref DEFAULT_REGISTRIES: std::result::Result<Arc<CommandRegistries>, String> =
        CommandRegistries::new()
            .map(Arc::new)
            .map_err(|err| err.to_string());
}

/// Node-selection and reducer registries, validated together.
///
/// Immutable once built, so one instance is shared by every client.
#[derive(Debug, Clone)]
pub struct CommandRegistries {
    selection: NodeSelectionRegistry,
    reducers: ReducerRegistry,
}

impl CommandRegistries {
    /// Builds the default registries and checks that they agree.
    pub fn new() -> Result<Self> {
        Self::from_parts(
            NodeSelectionRegistry::with_default_policies()?,
            ReducerRegistry::with_default_reducers()?,
        )
    }

    /// Combines custom registries, failing if any routable command lacks a
    /// reducer or any introspection command is missing from either side.
    pub fn from_parts(selection: NodeSelectionRegistry, reducers: ReducerRegistry) -> Result<Self> {
        let registries = Self {
            selection,
            reducers,
        };
        registries.validate()?;
        Ok(registries)
    }

    /// The process-wide default, built on first use.
    pub fn shared() -> Result<Arc<Self>> {
        DEFAULT_REGISTRIES
            .as_ref()
            .map(Arc::clone)
            .map_err(|message| PubSubError::RegistryLookup(message.clone()))
    }

    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        for command in Command::INTROSPECTION {
            if !self.selection.contains(command) {
                missing.push(format!("{} has no node selection policy", command));
            }
        }
        let mut routable = self.selection.commands().collect::<Vec<_>>();
        routable.extend(Command::INTROSPECTION);
        routable.sort_by_key(|command| command.name());
        routable.dedup();
        for command in routable {
            if !self.reducers.contains(command) {
                missing.push(format!("{} has no reducer", command));
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PubSubError::RegistryLookup(missing.join("; ")))
        }
    }

    pub fn selection(&self) -> &NodeSelectionRegistry {
        &self.selection
    }

    pub fn reducers(&self) -> &ReducerRegistry {
        &self.reducers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::{reduce_channels, reduce_numpat};
    use crate::routing::NodeSelectionPolicy;

    #[test]
    fn default_registries_are_complete() {
        let registries = CommandRegistries::new().unwrap();
        assert!(registries.validate().is_ok());
        let shared = CommandRegistries::shared().unwrap();
        assert!(Arc::ptr_eq(&shared, &CommandRegistries::shared().unwrap()));
    }

    #[test]
    fn routable_command_without_reducer_fails_validation() {
        let mut reducers = ReducerRegistry::new();
        reducers
            .register(&[Command::PubsubChannels], reduce_channels)
            .unwrap();
        reducers
            .register(&[Command::PubsubNumpat], reduce_numpat)
            .unwrap();

        let err = CommandRegistries::from_parts(
            NodeSelectionRegistry::with_default_policies().unwrap(),
            reducers,
        )
        .unwrap_err();
        assert!(matches!(err, PubSubError::RegistryLookup(_)));
        assert_eq!(
            err.to_string(),
            "Registry lookup error: PUBSUB NUMSUB has no reducer"
        );
    }

    #[test]
    fn introspection_command_without_policy_fails_validation() {
        let mut selection = NodeSelectionRegistry::new();
        selection
            .register(
                &[Command::PubsubChannels, Command::PubsubNumsub],
                NodeSelectionPolicy::AllMasters,
            )
            .unwrap();
        let err = CommandRegistries::from_parts(
            selection,
            ReducerRegistry::with_default_reducers().unwrap(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("PUBSUB NUMPAT has no node selection policy"));
    }
}
