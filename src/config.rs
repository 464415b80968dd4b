//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.tradeagents.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".tradeagents.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Remote service settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Per-endpoint request timeouts.
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Initial analysis parameters.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Remote TradingAgents service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the service, without the `/api/trading` suffix.
    #[serde(default = "default_backend_url")]
    pub url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:8001".to_string()
}

/// Request timeouts in seconds, one per endpoint family.
///
/// The lifecycle components never assume a timeout; these values only
/// configure the HTTP transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// `GET /status` and `GET /network-status`.
    #[serde(default = "default_status_timeout")]
    pub status_seconds: u64,

    /// `GET /test-deepseek` and `/test-deepseek-quick`.
    #[serde(default = "default_llm_probe_timeout")]
    pub llm_probe_seconds: u64,

    /// `POST /analyze`.
    #[serde(default = "default_analyze_timeout")]
    pub analyze_seconds: u64,

    /// `POST /launch-cli`.
    #[serde(default = "default_launch_timeout")]
    pub launch_seconds: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            status_seconds: default_status_timeout(),
            llm_probe_seconds: default_llm_probe_timeout(),
            analyze_seconds: default_analyze_timeout(),
            launch_seconds: default_launch_timeout(),
        }
    }
}

impl TimeoutConfig {
    pub fn status(&self) -> Duration {
        Duration::from_secs(self.status_seconds)
    }

    pub fn llm_probe(&self) -> Duration {
        Duration::from_secs(self.llm_probe_seconds)
    }

    pub fn analyze(&self) -> Duration {
        Duration::from_secs(self.analyze_seconds)
    }

    pub fn launch(&self) -> Duration {
        Duration::from_secs(self.launch_seconds)
    }
}

fn default_status_timeout() -> u64 {
    10
}

fn default_llm_probe_timeout() -> u64 {
    15
}

fn default_analyze_timeout() -> u64 {
    30
}

fn default_launch_timeout() -> u64 {
    30
}

/// Analysis parameters the session starts with.
///
/// Kept as raw values here; the configuration store validates them when
/// a session starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_ticker")]
    pub ticker: String,

    /// `YYYY-MM-DD`.
    #[serde(default = "default_analysis_date")]
    pub analysis_date: String,

    #[serde(default = "default_analysts")]
    pub analysts: Vec<String>,

    /// 1 (shallow), 2 (medium) or 3 (deep).
    #[serde(default = "default_research_depth")]
    pub research_depth: u8,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            ticker: default_ticker(),
            analysis_date: default_analysis_date(),
            analysts: default_analysts(),
            research_depth: default_research_depth(),
        }
    }
}

fn default_ticker() -> String {
    "NVDA".to_string()
}

fn default_analysis_date() -> String {
    "2024-05-10".to_string()
}

fn default_analysts() -> Vec<String> {
    vec!["market", "social", "news", "fundamentals"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_research_depth() -> u8 {
    1
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.backend_url {
            self.backend.url = url.clone();
        }

        if let Some(timeout) = args.timeout {
            self.timeouts.analyze_seconds = timeout;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Log level after merging: `--quiet` wins, then `verbose` from either
    /// the file or the command line.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
