use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{PubSubError, Result};

/// Commands understood by the dispatch layer.
///
/// The set is closed: adding a command means adding a variant here and
/// registering it in both registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Publish,
    PubsubChannels,
    PubsubNumsub,
    PubsubNumpat,
}

impl Command {
    /// Commands fanned out across the cluster; each needs a selection
    /// policy and a reducer.
    pub const INTROSPECTION: [Command; 3] = [
        Command::PubsubChannels,
        Command::PubsubNumsub,
        Command::PubsubNumpat,
    ];

    pub const ALL: [Command; 4] = [
        Command::Publish,
        Command::PubsubChannels,
        Command::PubsubNumsub,
        Command::PubsubNumpat,
    ];

    /// Canonical upper-case name, e.g. `PUBSUB CHANNELS`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Publish => "PUBLISH",
            Self::PubsubChannels => "PUBSUB CHANNELS",
            Self::PubsubNumsub => "PUBSUB NUMSUB",
            Self::PubsubNumpat => "PUBSUB NUMPAT",
        }
    }

    /// Parses a command name case-insensitively, collapsing runs of
    /// whitespace between the words.
    pub fn from_name(name: &str) -> Result<Self> {
        let normalized = name
            .split_whitespace()
            .map(str::to_ascii_uppercase)
            .collect::<Vec<_>>()
            .join(" ");
        Self::ALL
            .into_iter()
            .find(|command| command.name() == normalized)
            .ok_or_else(|| PubSubError::UnknownCommand(name.to_string()))
    }

    pub fn is_introspection(&self) -> bool {
        Self::INTROSPECTION.contains(self)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One command invocation as handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command: Command,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn publish(channel: &str, message: &str) -> Self {
        Self::new(Command::Publish).arg(channel).arg(message)
    }

    pub fn channels(pattern: &str) -> Self {
        Self::new(Command::PubsubChannels).arg(pattern)
    }

    pub fn numsub<S: AsRef<str>>(channels: &[S]) -> Self {
        Self::new(Command::PubsubNumsub).args(channels.iter().map(|c| c.as_ref().to_string()))
    }

    pub fn numpat() -> Self {
        Self::new(Command::PubsubNumpat)
    }

    /// Full argument vector as sent on the wire, command words first.
    pub fn to_argv(&self) -> Vec<String> {
        let mut argv = self
            .command
            .name()
            .split(' ')
            .map(str::to_string)
            .collect::<Vec<_>>();
        argv.extend(self.args.iter().cloned());
        argv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_normalizes_case_and_spacing() {
        assert_eq!(
            Command::from_name("pubsub   channels").unwrap(),
            Command::PubsubChannels
        );
        assert_eq!(Command::from_name(" Publish ").unwrap(), Command::Publish);
        assert!(matches!(
            Command::from_name("PUBSUB SHARDCHANNELS"),
            Err(PubSubError::UnknownCommand(_))
        ));
    }

    #[test]
    fn names_round_trip_for_every_command() {
        for command in Command::ALL {
            assert_eq!(Command::from_name(command.name()).unwrap(), command);
        }
    }

    #[test]
    fn publish_is_not_introspection() {
        assert!(!Command::Publish.is_introspection());
        assert!(Command::PubsubNumpat.is_introspection());
    }

    #[test]
    fn argv_splits_subcommand() {
        let request = CommandRequest::numsub(&["a", "b"]);
        assert_eq!(request.to_argv(), vec!["PUBSUB", "NUMSUB", "a", "b"]);
        assert_eq!(CommandRequest::numpat().to_argv(), vec!["PUBSUB", "NUMPAT"]);
    }
}
