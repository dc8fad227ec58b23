use std::collections::HashMap;

use super::NodeSelectionPolicy;
use crate::command::Command;
use crate::core::{PubSubError, Result};

/// Maps each fan-out command to the policy choosing its target nodes.
///
/// Built once at client construction; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct NodeSelectionRegistry {
    policies: HashMap<Command, NodeSelectionPolicy>,
}

impl NodeSelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates every command in `commands` with `policy`.
    ///
    /// Registering a command twice is rejected.
    pub fn register(&mut self, commands: &[Command], policy: NodeSelectionPolicy) -> Result<()> {
        for command in commands {
            if let Some(existing) = self.policies.get(command) {
                return Err(PubSubError::RegistryLookup(format!(
                    "command '{}' already has selection policy {:?}",
                    command, existing
                )));
            }
        }
        for command in commands {
            self.policies.insert(*command, policy);
        }
        Ok(())
    }

    /// Registry preloaded with the cluster-wide introspection commands.
    pub fn with_default_policies() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(
            &[
                Command::PubsubChannels,
                Command::PubsubNumsub,
                Command::PubsubNumpat,
            ],
            NodeSelectionPolicy::AllNodes,
        )?;
        Ok(registry)
    }

    pub fn policy_for(&self, command: Command) -> Result<NodeSelectionPolicy> {
        self.policies.get(&command).copied().ok_or_else(|| {
            PubSubError::RegistryLookup(format!("no node selection policy for '{}'", command))
        })
    }

    pub fn contains(&self, command: Command) -> bool {
        self.policies.contains_key(&command)
    }

    pub fn commands(&self) -> impl Iterator<Item = Command> + '_ {
        self.policies.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policies_cover_introspection() {
        let registry = NodeSelectionRegistry::with_default_policies().unwrap();
        for command in Command::INTROSPECTION {
            assert_eq!(
                registry.policy_for(command).unwrap(),
                NodeSelectionPolicy::AllNodes
            );
        }
        assert!(!registry.contains(Command::Publish));
    }

    #[test]
    fn missing_command_is_a_lookup_error() {
        let registry = NodeSelectionRegistry::new();
        let err = registry.policy_for(Command::PubsubNumpat).unwrap_err();
        assert!(matches!(err, PubSubError::RegistryLookup(_)));
        assert!(err.to_string().contains("PUBSUB NUMPAT"));
    }

    #[test]
    fn duplicate_registration_is_rejected_atomically() {
        let mut registry = NodeSelectionRegistry::new();
        registry
            .register(&[Command::PubsubNumpat], NodeSelectionPolicy::AllMasters)
            .unwrap();
        let err = registry
            .register(
                &[Command::PubsubChannels, Command::PubsubNumpat],
                NodeSelectionPolicy::AllNodes,
            )
            .unwrap_err();
        assert!(matches!(err, PubSubError::RegistryLookup(_)));
        assert!(!registry.contains(Command::PubsubChannels));
        assert_eq!(
            registry.policy_for(Command::PubsubNumpat).unwrap(),
            NodeSelectionPolicy::AllMasters
        );
    }
}
