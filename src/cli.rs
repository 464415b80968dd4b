//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tradeagents - console for the TradingAgents multi-agent service
///
/// Submit a ticker to the multi-agent LLM trading pipeline, follow its
/// progress, and read the final recommendation.
///
/// Examples:
///   tradeagents status
///   tradeagents analyze --ticker TSLA --analysts market,news --depth 2
///   tradeagents launch
///   tradeagents diagnose --ticker NVDA
///   tradeagents --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Base URL of the TradingAgents service
    ///
    /// Read once at startup. Overrides the [backend] section of the config file.
    #[arg(long, global = true, env = "TRADEAGENTS_BACKEND_URL", value_name = "URL")]
    pub backend_url: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .tradeagents.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Timeout for the analysis request in seconds
    ///
    /// Overrides [timeouts] analyze_seconds from the config file.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Generate a default .tradeagents.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the service's system status (built-in status when offline)
    Status,

    /// Launch the companion TradingAgents CLI on the service host
    Launch,

    /// Run a multi-agent analysis and print the result
    Analyze(AnalysisArgs),

    /// Check status, LLM connectivity, network and a sample analysis
    Diagnose(AnalysisArgs),
}

/// Overrides for the analysis parameters from the config file.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct AnalysisArgs {
    /// Ticker to analyze (e.g. NVDA)
    #[arg(short, long, value_name = "SYMBOL")]
    pub ticker: Option<String>,

    /// Analysis date (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    pub date: Option<String>,

    /// Analysts to consult (comma-separated)
    ///
    /// Values: market, social, news, fundamentals
    #[arg(short, long, value_name = "LIST")]
    pub analysts: Option<String>,

    /// Research depth: 1 (shallow), 2 (medium) or 3 (deep)
    #[arg(long, value_name = "LEVEL")]
    pub depth: Option<String>,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.command.is_none() {
            return Err(
                "A command is required (status, launch, analyze, diagnose)".to_string(),
            );
        }

        if let Some(ref url) = self.backend_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Backend URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }
}
