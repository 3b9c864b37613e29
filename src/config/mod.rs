//! Configuration management.
//!
//! flowlens configuration can come from:
//! - Config file (~/.config/flowlens/config.toml)
//! - Environment variables (FLOWLENS_*)
//! - Command-line flags, applied by the binary last

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::error::Result;

/// flowlens configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Dashboard API the reports are fetched from
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// Upstream dashboard API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL serving `/api/workflows` and `/api/workflow-detail`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from the default config file and environment.
    pub fn load() -> Self {
        Self::load_with(&Self::config_dir().join("config.toml"))
    }

    /// Load configuration from `path` (if present) and environment.
    ///
    /// A missing file is not an error; an unreadable or invalid one is
    /// logged and ignored.
    pub fn load_with(path: &Path) -> Self {
        let mut config = Self::default();

        if path.exists() {
            match Self::load_partial_from_path(path) {
                Ok(partial) => config.apply_partial(partial),
                Err(e) => warn!(code = e.code(), "Ignoring config file {}: {}", path.display(), e),
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Get the config directory.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("flowlens"))
            .unwrap_or_else(|| PathBuf::from(".flowlens"))
    }

    /// Apply `FLOWLENS_*` overrides read through `lookup`.
    ///
    /// `NEXT_PUBLIC_BASE_URL` is honoured when `FLOWLENS_BASE_URL` is unset,
    /// so an existing dashboard deployment's environment works unchanged.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("FLOWLENS_SERVER_PORT") {
            match port.parse::<u16>() {
                Ok(parsed) => self.server.port = parsed,
                Err(_) => warn!("Invalid FLOWLENS_SERVER_PORT '{}'", port),
            }
        }
        if let Some(host) = lookup("FLOWLENS_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(base_url) =
            lookup("FLOWLENS_BASE_URL").or_else(|| lookup("NEXT_PUBLIC_BASE_URL"))
        {
            self.upstream.base_url = base_url;
        }
        if let Some(timeout) = lookup("FLOWLENS_UPSTREAM_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(parsed) => self.upstream.timeout_seconds = parsed,
                Err(_) => warn!("Invalid FLOWLENS_UPSTREAM_TIMEOUT_SECONDS '{}'", timeout),
            }
        }
    }

    fn load_partial_from_path(path: &Path) -> Result<PartialConfig> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    fn apply_partial(&mut self, partial: PartialConfig) {
        if let Some(server) = partial.server {
            self.server = server;
        }
        if let Some(upstream) = partial.upstream {
            self.upstream = upstream;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    server: Option<ServerConfig>,
    upstream: Option<UpstreamConfig>,
}
