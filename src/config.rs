//! Runtime configuration for bedrock-relay.
//!
//! Configuration can be loaded from a JSON file or constructed
//! programmatically. The listen port can be overridden by `--port` or the
//! `PORT` environment variable.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "bedrock-relay", about = "Streaming chat relay for Bedrock-hosted models")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// HTTP listen port (overrides the config file).
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// Bedrock connection settings.
    pub backend: BackendConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen port (e.g. 8080).
    pub port: u16,

    /// Maximum seconds to wait for the next backend event before the
    /// stream is considered stalled.
    pub stream_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            stream_timeout_secs: 300,
        }
    }
}

/// Bedrock connection settings.
///
/// Authentication is the AWS credential chain (env vars, shared
/// credentials file, SSO, instance metadata); only routing knobs live
/// here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// AWS region (None = whatever the credential chain resolves).
    pub region: Option<String>,

    /// Named AWS profile from `~/.aws/config`.
    pub profile: Option<String>,

    /// Custom endpoint URL (VPC endpoints or local testing).
    pub endpoint_override: Option<String>,
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults when
    /// the file is missing.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    /// Effective listen address after CLI/env overrides.
    pub fn listen_addr(&self, port_override: Option<u16>) -> String {
        format!("0.0.0.0:{}", port_override.unwrap_or(self.server.port))
    }
}
