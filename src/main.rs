use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pubsub_cluster::{ClientConfig, ClusterFixture, PartialFailurePolicy, PubSubCommands};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pubsub-cluster")]
#[command(about = "Cluster-wide pub/sub introspection against an in-memory cluster fixture")]
struct Cli {
    /// JSON file describing nodes and their subscriptions
    #[arg(long)]
    fixture: PathBuf,

    /// Reduce over the nodes that answered instead of failing the call
    #[arg(long)]
    best_effort: bool,

    /// Per-node response timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List channels with at least one subscriber
    Channels {
        #[arg(long)]
        pattern: Option<String>,
        /// Print per-node replies instead of the merged list
        #[arg(long)]
        raw: bool,
    },
    /// Count pattern subscriptions
    Numpat {
        #[arg(long)]
        raw: bool,
    },
    /// Subscriber count per channel
    Numsub {
        channels: Vec<String>,
        #[arg(long)]
        raw: bool,
    },
    /// Publish a message to the node owning the channel
    Publish { channel: String, message: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to render output")?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let fixture = ClusterFixture::from_path(&cli.fixture)
        .with_context(|| format!("loading fixture {}", cli.fixture.display()))?;

    let policy = if cli.best_effort {
        PartialFailurePolicy::BestEffort
    } else {
        PartialFailurePolicy::RequireAll
    };
    let config = ClientConfig::cluster(&fixture.seeds())
        .response_timeout(Duration::from_millis(cli.timeout_ms))
        .partial_failure(policy);

    let client = fixture
        .connect(config)
        .await
        .context("failed to build cluster client")?;

    match cli.command {
        Command::Channels { pattern, raw } => {
            print_json(&client.pubsub_channels(pattern.as_deref(), !raw).await?)
        }
        Command::Numpat { raw } => print_json(&client.pubsub_numpat(!raw).await?),
        Command::Numsub { channels, raw } => {
            let channels = channels.iter().map(String::as_str).collect::<Vec<_>>();
            print_json(&client.pubsub_numsub(&channels, !raw).await?)
        }
        Command::Publish { channel, message } => {
            print_json(&client.publish(&channel, &message).await?)
        }
    }
}
