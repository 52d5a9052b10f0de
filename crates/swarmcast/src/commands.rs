//! One-shot CLI commands

use anyhow::{Context, Result};
use castconf::{CastConfig, ConfigSources};
use swarmchunk::{LocalSigner, Signer, Topic};

use crate::bee::BeeClient;
use crate::feed_index::resolve_start_index;

/// Print the feed owner, topic and (unless offline) the index the relay
/// would publish at next.
pub async fn identity(config: &CastConfig, offline: bool) -> Result<()> {
    if config.feed.private_key.trim().is_empty() {
        anyhow::bail!("No private key configured (set [feed] private_key or SWARMCAST_PRIVATE_KEY)");
    }
    let signer = LocalSigner::from_hex(&config.feed.private_key).context("Invalid private key")?;
    let owner = signer.address();
    let topic = Topic::from_name(&config.feed.topic);

    println!("owner:  {}", owner);
    println!("topic:  {} ({:?})", topic, config.feed.topic);

    if offline {
        return Ok(());
    }

    let bee = BeeClient::new(
        &config.infra.bee.api_url,
        &config.feed.batch_id,
        config.infra.bee.timeout(),
    )?;
    let index = resolve_start_index(&bee, &owner, &topic)
        .await
        .with_context(|| format!("Failed to look up feed at {}", bee.base_url()))?;
    println!("next:   {}", index);

    Ok(())
}

/// Print the effective configuration and where it came from.
pub fn show_config(config: &CastConfig, sources: &ConfigSources) {
    if sources.files.is_empty() {
        println!("# no config files found, using defaults");
    }
    for file in &sources.files {
        println!("# loaded: {}", file.display());
    }
    for var in &sources.env_overrides {
        println!("# env override: {}", var);
    }
    println!();
    print!("{}", config.to_toml());
}
