//! tradeagents - console for the TradingAgents multi-agent service
//!
//! Drives the analysis job lifecycle against a remote TradingAgents
//! service: status check, companion CLI launch, analysis submission with
//! live progress, and end-to-end diagnostics.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid arguments, config, output failure)
//!   2 - The requested operation failed (analysis failed, launch failed,
//!       diagnostics reported a failing check)

mod api;
mod cli;
mod config;
mod error;
mod models;
mod render;
mod session;

use anyhow::{Context, Result};
use cli::{AnalysisArgs, Args, Command, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use session::{ConfigField, JobState, Session, StatusSource, SubmitOutcome};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration first so `[general] verbose` can set the log level
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(config.log_level(args.quiet));

    info!("tradeagents v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .tradeagents.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the backend URL, timeouts and default analysis.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Where the configuration came from, logged once logging is up.
enum ConfigSource {
    Explicit(PathBuf),
    WorkingDirectory,
    Defaults,
    Unreadable(anyhow::Error),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::WorkingDirectory => {
                info!("Loaded default config from {}", CONFIG_FILE_NAME)
            }
            ConfigSource::Defaults => debug!("No config file found, using defaults"),
            ConfigSource::Unreadable(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::WorkingDirectory)),
        Ok(None) => Ok((Config::default(), ConfigSource::Defaults)),
        Err(e) => Ok((Config::default(), ConfigSource::Unreadable(e))),
    }
}

/// Build the session and dispatch the command. Returns the exit code.
async fn run(args: Args, config: Config) -> Result<i32> {
    let backend = api::HttpBackend::new(&config.backend.url, config.timeouts)?;
    debug!("Using service at {}", backend.base_url());
    let mut session = Session::start(Arc::new(backend), &config.defaults)
        .context("Invalid [defaults] in configuration")?;

    let format = args.format;
    let exit_code = match args.command {
        Some(Command::Status) => run_status(&mut session, format).await?,
        Some(Command::Launch) => run_launch(&mut session, format).await?,
        Some(Command::Analyze(ref analysis)) => {
            apply_overrides(&mut session, analysis)?;
            run_analyze(&mut session, format, !args.quiet).await?
        }
        Some(Command::Diagnose(ref analysis)) => {
            apply_overrides(&mut session, analysis)?;
            run_diagnose(&mut session, format).await?
        }
        None => 1,
    };

    session.end();
    Ok(exit_code)
}

/// Apply command-line overrides to the configuration store.
fn apply_overrides(session: &mut Session, analysis: &AnalysisArgs) -> Result<()> {
    let overrides = [
        (ConfigField::Ticker, &analysis.ticker),
        (ConfigField::AnalysisDate, &analysis.date),
        (ConfigField::Analysts, &analysis.analysts),
        (ConfigField::ResearchDepth, &analysis.depth),
    ];

    for (field, value) in overrides {
        if let Some(value) = value {
            session.config.set(field, value)?;
        }
    }
    Ok(())
}

async fn run_status(session: &mut Session, format: OutputFormat) -> Result<i32> {
    let status = session.status.load().await.clone();
    let source = session
        .status
        .source()
        .unwrap_or(StatusSource::Fallback);

    match format {
        OutputFormat::Json => println!(
            "{}",
            render::to_json(&serde_json::json!({ "source": source, "status": status }))?
        ),
        OutputFormat::Text => print!("{}", render::render_status(&status, source)),
    }
    Ok(0)
}

async fn run_launch(session: &mut Session, format: OutputFormat) -> Result<i32> {
    match session.launcher.launch().await {
        Ok(outcome) => {
            match format {
                OutputFormat::Json => println!("{}", render::to_json(&outcome)?),
                OutputFormat::Text => print!("{}", render::render_launch(&outcome)),
            }
            Ok(0)
        }
        Err(e) => {
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    render::to_json(&serde_json::json!({
                        "outcome": "failed",
                        "message": e.to_string(),
                        "detail": e.detail(),
                    }))?
                ),
                OutputFormat::Text => {
                    eprintln!("❌ Companion CLI launch failed: {}", e);
                    eprintln!("   Detail: {}", e.detail());
                    if e.is_transport() {
                        eprintln!("   Is the service running? Set --backend-url or TRADEAGENTS_BACKEND_URL.");
                    }
                }
            }
            Ok(2)
        }
    }
}

async fn run_analyze(
    session: &mut Session,
    format: OutputFormat,
    show_progress: bool,
) -> Result<i32> {
    if format == OutputFormat::Text {
        println!("🚀 Submitting analysis");
        print!("{}", render::render_config(session.config.current()));
    }

    let progress = if show_progress && format == OutputFormat::Text {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .context("Invalid progress template")?,
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let mut updates = session.jobs.subscribe();
    let submit = session.jobs.submit(&session.config);
    tokio::pin!(submit);

    let outcome = loop {
        tokio::select! {
            outcome = &mut submit => break outcome,
            Ok(()) = updates.changed() => {
                if let (Some(pb), Some(p)) = (&progress, updates.borrow_and_update().progress()) {
                    pb.set_message(format!("{} ({}%)", p.current_phase, p.completion_percent));
                }
            }
        }
    };

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let state = session.jobs.state();
    match format {
        OutputFormat::Json => println!("{}", render::to_json(&state)?),
        OutputFormat::Text => print!("\n{}", render::render_job(&state)),
    }

    Ok(match outcome {
        SubmitOutcome::Completed => 0,
        SubmitOutcome::Failed | SubmitOutcome::Ignored => 2,
    })
}

async fn run_diagnose(session: &mut Session, format: OutputFormat) -> Result<i32> {
    if format == OutputFormat::Text {
        println!(
            "🔍 Running diagnostics against {} ...\n",
            session.config.current().ticker()
        );
    }

    let report = session.diagnose().await;

    match format {
        OutputFormat::Json => println!("{}", render::to_json(&report)?),
        OutputFormat::Text => print!("{}", render::render_diagnostics(&report)),
    }

    if let JobState::Failed { ref error, .. } = report.analysis {
        debug!("Diagnostic analysis detail: {}", error.detail);
    }

    Ok(if report.all_ok() { 0 } else { 2 })
}
