//! Configuration loading for swarmcast.
//!
//! # Sections
//!
//! - **Infrastructure** (`InfraConfig`): bind address, Bee API endpoint and
//!   deadline, telemetry.
//! - **Feed** (`FeedConfig`): owner key, postage batch, topic, rollback window.
//! - **Relay** (`RelayConfig`): playlist/segment markers, segment retention,
//!   body limit.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/swarmcast/config.toml` (system)
//! 2. `~/.config/swarmcast/config.toml` (user)
//! 3. `./swarmcast.toml` (local override, or the `--config` path)
//! 4. Environment variables (`SWARMCAST_*`)
//!
//! Command-line flags are applied on top by the binary.
//!
//! # Example Config
//!
//! ```toml
//! [bind]
//! http_port = 9999
//!
//! [bee]
//! api_url = "http://localhost:1633"
//! timeout_ms = 30000
//!
//! [feed]
//! private_key = "…"
//! batch_id = "…"
//! topic = "test radio"
//! since = "7d"
//! ```

pub mod feed;
pub mod infra;
pub mod loader;

pub use feed::{parse_duration, FeedConfig, RelayConfig};
pub use infra::{BeeConfig, BindConfig, InfraConfig, TelemetryConfig};
pub use loader::{discover_config_files_with_override, ConfigSources};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid setting {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Complete swarmcast configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CastConfig {
    #[serde(flatten)]
    pub infra: InfraConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub relay: RelayConfig,
}

impl CastConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env overrides.
    pub fn load_from(config_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&std::path::Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = CastConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            loader::load_from_file(&mut config, &path)?;
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Check everything the relay cannot start without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.private_key.trim().is_empty() {
            return Err(ConfigError::Missing("feed.private_key"));
        }
        if self.feed.batch_id.trim().is_empty() {
            return Err(ConfigError::Missing("feed.batch_id"));
        }
        if self.infra.bee.api_url.trim().is_empty() {
            return Err(ConfigError::Missing("bee.api_url"));
        }
        self.since()?;
        if self.relay.segment_retention_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "relay.segment_retention_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.relay.queue_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "relay.queue_depth",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// The rollback window as a duration.
    pub fn since(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.feed.since).ok_or_else(|| ConfigError::Invalid {
            field: "feed.since",
            message: format!("cannot parse duration {:?}", self.feed.since),
        })
    }

    /// Serialize config to TOML string, with the private key redacted.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# swarmcast configuration\n\n");

        output.push_str("[bind]\n");
        output.push_str(&format!("host = \"{}\"\n", self.infra.bind.host));
        output.push_str(&format!("http_port = {}\n", self.infra.bind.http_port));

        output.push_str("\n[bee]\n");
        output.push_str(&format!("api_url = \"{}\"\n", self.infra.bee.api_url));
        output.push_str(&format!("timeout_ms = {}\n", self.infra.bee.timeout_ms));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!(
            "otlp_endpoint = \"{}\"\n",
            self.infra.telemetry.otlp_endpoint
        ));
        output.push_str(&format!(
            "log_level = \"{}\"\n",
            self.infra.telemetry.log_level
        ));

        output.push_str("\n[feed]\n");
        output.push_str(&format!(
            "private_key = \"{}\"\n",
            feed::redact(&self.feed.private_key)
        ));
        output.push_str(&format!("batch_id = \"{}\"\n", self.feed.batch_id));
        output.push_str(&format!("topic = \"{}\"\n", self.feed.topic));
        output.push_str(&format!("since = \"{}\"\n", self.feed.since));

        output.push_str("\n[relay]\n");
        output.push_str(&format!(
            "playlist_marker = \"{}\"\n",
            self.relay.playlist_marker
        ));
        output.push_str(&format!(
            "segment_marker = \"{}\"\n",
            self.relay.segment_marker
        ));
        output.push_str(&format!(
            "segment_retention_secs = {}\n",
            self.relay.segment_retention_secs
        ));
        output.push_str(&format!("max_body_bytes = {}\n", self.relay.max_body_bytes));
        output.push_str(&format!("queue_depth = {}\n", self.relay.queue_depth));

        output
    }
}
