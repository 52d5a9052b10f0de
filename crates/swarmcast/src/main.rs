//! swarmcast - HLS ingress relay publishing to a Swarm feed
//!
//! Subcommands:
//! - `swarmcast serve` - Run the ingress relay
//! - `swarmcast identity` - Show feed owner, topic and next index
//! - `swarmcast config` - Show the effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use castconf::CastConfig;
use clap::{Args, Parser, Subcommand};
use swarmcast::{commands, serve, telemetry};

#[derive(Parser)]
#[command(name = "swarmcast")]
#[command(about = "Relay a live HLS stream into Swarm behind a signed feed")]
#[command(version)]
struct Cli {
    /// Config file (replaces ./swarmcast.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Flags that win over config files and environment.
#[derive(Args)]
struct Overrides {
    /// HTTP port to bind
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Bee API base URL
    #[arg(long, global = true)]
    bee_api_url: Option<String>,

    /// Feed owner private key (hex)
    #[arg(long, global = true)]
    private_key: Option<String>,

    /// Postage batch id
    #[arg(long, global = true)]
    batch_id: Option<String>,

    /// Feed topic name
    #[arg(long, global = true)]
    topic: Option<String>,

    /// How far back feed lookups may roll (e.g. 7d, 12h)
    #[arg(long, global = true)]
    since: Option<String>,

    /// OTLP gRPC endpoint for OpenTelemetry (e.g., "localhost:4317")
    #[arg(long, global = true)]
    otlp_endpoint: Option<String>,
}

impl Overrides {
    fn apply(self, config: &mut CastConfig) {
        if let Some(port) = self.port {
            config.infra.bind.http_port = port;
        }
        if let Some(url) = self.bee_api_url {
            config.infra.bee.api_url = url;
        }
        if let Some(key) = self.private_key {
            config.feed.private_key = key;
        }
        if let Some(batch) = self.batch_id {
            config.feed.batch_id = batch;
        }
        if let Some(topic) = self.topic {
            config.feed.topic = topic;
        }
        if let Some(since) = self.since {
            config.feed.since = since;
        }
        if let Some(endpoint) = self.otlp_endpoint {
            config.infra.telemetry.otlp_endpoint = endpoint;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the ingress relay
    Serve,

    /// Show the feed owner, topic and the index the next update would use
    Identity {
        /// Skip the Bee lookup
        #[arg(long)]
        offline: bool,
    },

    /// Print the effective configuration (secrets redacted)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, sources) = CastConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    cli.overrides.apply(&mut config);

    match cli.command {
        Commands::Serve => {
            let _telemetry = telemetry::init(
                &config.infra.telemetry.otlp_endpoint,
                &config.infra.telemetry.log_level,
            )?;
            serve::run(config).await?;
        }
        Commands::Identity { offline } => {
            telemetry::init_fmt(&config.infra.telemetry.log_level);
            commands::identity(&config, offline).await?;
        }
        Commands::Config => {
            commands::show_config(&config, &sources);
        }
    }

    Ok(())
}
