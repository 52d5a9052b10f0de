//! Infrastructure configuration - where we listen, which Bee node we talk to,
//! where telemetry goes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Network bind settings for the ingress relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindConfig {
    /// Address to bind the ingress HTTP server on.
    /// Default: 0.0.0.0
    #[serde(default = "BindConfig::default_host")]
    pub host: String,

    /// HTTP port for segment/manifest ingress and health.
    /// Default: 9999
    #[serde(default = "BindConfig::default_http_port")]
    pub http_port: u16,
}

impl BindConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_http_port() -> u16 {
        9999
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            http_port: Self::default_http_port(),
        }
    }
}

/// Bee node API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeeConfig {
    /// Base URL of the Bee HTTP API.
    /// Default: http://localhost:1633
    #[serde(default = "BeeConfig::default_api_url")]
    pub api_url: String,

    /// Deadline for every outbound request, in milliseconds.
    /// Default: 30000
    #[serde(default = "BeeConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl BeeConfig {
    fn default_api_url() -> String {
        "http://localhost:1633".to_string()
    }

    fn default_timeout_ms() -> u64 {
        30_000
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for BeeConfig {
    fn default() -> Self {
        Self {
            api_url: Self::default_api_url(),
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

/// Telemetry and observability configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// OTLP gRPC endpoint for OpenTelemetry. Empty disables export.
    /// Default: "" (stdout logging only)
    #[serde(default)]
    pub otlp_endpoint: String,

    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: String::new(),
            log_level: Self::default_log_level(),
        }
    }
}

/// Infrastructure configuration - cannot change at runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfraConfig {
    #[serde(default)]
    pub bind: BindConfig,

    #[serde(default)]
    pub bee: BeeConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
