//! Configuration file model.
//!
//! Everything except the API token comes from one TOML file. Sections other
//! than `[routing]` are optional and fall back to production defaults.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use triage::{GrafanaConfig, RoutingConfig};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub linear: LinearSection,
    #[serde(default)]
    pub identity: IdentitySection,
    #[serde(default)]
    pub grafana: GrafanaConfig,
    #[serde(default)]
    pub telemetry: TelemetrySection,
    pub routing: RoutingConfig,
}

impl AppConfig {
    /// Reads and parses the file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearSection {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl LinearSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LinearSection {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    linear::DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    linear::DEFAULT_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentitySection {
    /// Only reporters in this domain are resolved to accounts.
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Warm the account cache from the backend before handling a report.
    #[serde(default)]
    pub prefill: bool,
}

impl Default for IdentitySection {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            prefill: false,
        }
    }
}

fn default_domain() -> String {
    triage::identity::DEFAULT_DOMAIN.to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
    /// OTLP gRPC collector; spans are only exported when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            json: false,
            otlp_endpoint: None,
            service_name: default_service_name(),
        }
    }
}

fn default_service_name() -> String {
    "triage-router".to_string()
}
