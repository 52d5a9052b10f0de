//! Config file discovery, loading, and environment variable overlay.

use crate::{CastConfig, ConfigError};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/swarmcast/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("swarmcast/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("swarmcast.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read a config file and layer it over `config`.
pub fn load_from_file(config: &mut CastConfig, path: &Path) -> Result<(), ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    apply_toml(config, &contents, path)
}

/// Layer the keys present in a TOML document over `config`.
///
/// Keys that are absent leave the existing value alone, so later files only
/// override what they mention.
pub fn apply_toml(config: &mut CastConfig, contents: &str, path: &Path) -> Result<(), ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let invalid = |key: &str| ConfigError::Parse {
        path: path.to_path_buf(),
        message: format!("{} is out of range", key),
    };

    if let Some(bind) = table.get("bind").and_then(|v| v.as_table()) {
        if let Some(v) = bind.get("host").and_then(|v| v.as_str()) {
            config.infra.bind.host = v.to_string();
        }
        if let Some(v) = bind.get("http_port").and_then(|v| v.as_integer()) {
            config.infra.bind.http_port = u16::try_from(v).map_err(|_| invalid("bind.http_port"))?;
        }
    }

    if let Some(bee) = table.get("bee").and_then(|v| v.as_table()) {
        if let Some(v) = bee.get("api_url").and_then(|v| v.as_str()) {
            config.infra.bee.api_url = v.to_string();
        }
        if let Some(v) = bee.get("timeout_ms").and_then(|v| v.as_integer()) {
            config.infra.bee.timeout_ms = u64::try_from(v).map_err(|_| invalid("bee.timeout_ms"))?;
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = telemetry.get("otlp_endpoint").and_then(|v| v.as_str()) {
            config.infra.telemetry.otlp_endpoint = v.to_string();
        }
        if let Some(v) = telemetry.get("log_level").and_then(|v| v.as_str()) {
            config.infra.telemetry.log_level = v.to_string();
        }
    }

    if let Some(feed) = table.get("feed").and_then(|v| v.as_table()) {
        if let Some(v) = feed.get("private_key").and_then(|v| v.as_str()) {
            config.feed.private_key = v.to_string();
        }
        if let Some(v) = feed.get("batch_id").and_then(|v| v.as_str()) {
            config.feed.batch_id = v.to_string();
        }
        if let Some(v) = feed.get("topic").and_then(|v| v.as_str()) {
            config.feed.topic = v.to_string();
        }
        if let Some(v) = feed.get("since").and_then(|v| v.as_str()) {
            config.feed.since = v.to_string();
        }
    }

    if let Some(relay) = table.get("relay").and_then(|v| v.as_table()) {
        if let Some(v) = relay.get("playlist_marker").and_then(|v| v.as_str()) {
            config.relay.playlist_marker = v.to_string();
        }
        if let Some(v) = relay.get("segment_marker").and_then(|v| v.as_str()) {
            config.relay.segment_marker = v.to_string();
        }
        if let Some(v) = relay.get("segment_retention_secs").and_then(|v| v.as_integer()) {
            config.relay.segment_retention_secs =
                u64::try_from(v).map_err(|_| invalid("relay.segment_retention_secs"))?;
        }
        if let Some(v) = relay.get("max_body_bytes").and_then(|v| v.as_integer()) {
            config.relay.max_body_bytes =
                usize::try_from(v).map_err(|_| invalid("relay.max_body_bytes"))?;
        }
        if let Some(v) = relay.get("queue_depth").and_then(|v| v.as_integer()) {
            config.relay.queue_depth = usize::try_from(v).map_err(|_| invalid("relay.queue_depth"))?;
        }
    }

    Ok(())
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut CastConfig, sources: &mut ConfigSources) {
    apply_env_overrides_from(config, sources, env::vars());
}

/// Apply overrides from an explicit set of variables.
pub fn apply_env_overrides_from(
    config: &mut CastConfig,
    sources: &mut ConfigSources,
    vars: impl IntoIterator<Item = (String, String)>,
) {
    for (key, value) in vars {
        let applied = match key.as_str() {
            "SWARMCAST_HOST" => {
                config.infra.bind.host = value;
                true
            }
            "SWARMCAST_HTTP_PORT" => match value.parse() {
                Ok(port) => {
                    config.infra.bind.http_port = port;
                    true
                }
                Err(_) => false,
            },
            "SWARMCAST_BEE_API_URL" => {
                config.infra.bee.api_url = value;
                true
            }
            "SWARMCAST_BEE_TIMEOUT_MS" => match value.parse() {
                Ok(ms) => {
                    config.infra.bee.timeout_ms = ms;
                    true
                }
                Err(_) => false,
            },
            // Standard OTEL variable is honoured alongside ours
            "SWARMCAST_OTLP_ENDPOINT" | "OTEL_EXPORTER_OTLP_ENDPOINT" => {
                config.infra.telemetry.otlp_endpoint = value;
                true
            }
            "SWARMCAST_LOG_LEVEL" | "RUST_LOG" => {
                config.infra.telemetry.log_level = value;
                true
            }
            "SWARMCAST_PRIVATE_KEY" => {
                config.feed.private_key = value;
                true
            }
            "SWARMCAST_BATCH_ID" => {
                config.feed.batch_id = value;
                true
            }
            "SWARMCAST_TOPIC" => {
                config.feed.topic = value;
                true
            }
            "SWARMCAST_SINCE" => {
                config.feed.since = value;
                true
            }
            "SWARMCAST_SEGMENT_RETENTION_SECS" => match value.parse() {
                Ok(secs) => {
                    config.relay.segment_retention_secs = secs;
                    true
                }
                Err(_) => false,
            },
            _ => false,
        };

        if applied {
            sources.env_overrides.push(key);
        }
    }
}
