//! Text and JSON rendering of session state.
//!
//! Pure formatting: every function reads state and returns a string.

use crate::models::{AnalysisConfig, LaunchDetails, SystemStatus};
use crate::session::{DiagnosticReport, JobState, LaunchOutcome, LlmProbeReport, StatusSource};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Serialize any state as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Render the system status snapshot.
pub fn render_status(status: &SystemStatus, source: StatusSource) -> String {
    let mut output = String::new();

    output.push_str(&format!("📊 {} ({})\n", status.status, status.version));
    if source == StatusSource::Fallback {
        output.push_str("   (service unreachable, showing built-in status)\n");
    }

    output.push_str(&render_table("Components", &status.components));
    output.push_str(&render_table("APIs", &status.apis));

    output
}

fn render_table(title: &str, entries: &BTreeMap<String, String>) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut section = format!("\n{}:\n", title);
    let width = entries.keys().map(|k| k.len()).max().unwrap_or(0);
    for (key, value) in entries {
        let label = key.replace('_', " ");
        section.push_str(&format!("   {:<width$}  {}\n", label, value, width = width));
    }
    section
}

/// Render the frozen configuration of a job.
pub fn render_config(config: &AnalysisConfig) -> String {
    let analysts: Vec<&str> = config.analysts().iter().map(|a| a.as_str()).collect();
    format!(
        "   Ticker: {}\n   Date: {}\n   Analysts: {}\n   Depth: {} ({})\n",
        config.ticker(),
        config.analysis_date(),
        analysts.join(", "),
        config.research_depth().level(),
        config.research_depth().label(),
    )
}

/// Render the current job state.
pub fn render_job(state: &JobState) -> String {
    let mut output = String::new();

    match state {
        JobState::Idle => output.push_str("No analysis submitted.\n"),
        JobState::Submitting { config } => {
            output.push_str(&format!("⏳ Submitting analysis of {}\n", config.ticker()));
        }
        JobState::Running { config, progress } => {
            output.push_str(&format!(
                "🔄 Analysing {} - {} ({}%)\n",
                config.ticker(),
                progress.current_phase,
                progress.completion_percent
            ));
        }
        JobState::Completed {
            config,
            progress,
            result,
        } => {
            output.push_str(&format!("✅ {}\n\n", result.message()));
            output.push_str("Configuration:\n");
            output.push_str(&render_config(config));
            if let Some(model) = result
                .configuration()
                .and_then(|c| c.llm_model.as_deref())
            {
                output.push_str(&format!("   LLM: {}\n", model));
            }

            output.push_str(&format!(
                "\nProgress: {} ({}%)\n",
                progress.current_phase, progress.completion_percent
            ));
            for (i, phase) in progress.phases.iter().enumerate() {
                output.push_str(&format!("   {}/{} {}\n", i + 1, progress.phases.len(), phase));
            }

            if let Some(analysis) = result.analysis_output() {
                output.push_str("\nAnalysis:\n");
                output.push_str(analysis.trim());
                output.push('\n');
            }

            if let Some(recommendations) = result.recommendations() {
                output.push_str(&format!("\n{}\n", recommendations.system_status));
                for step in &recommendations.next_steps {
                    output.push_str(&format!("   - {}\n", step));
                }
            }
        }
        JobState::Failed { config, error } => {
            output.push_str(&format!("❌ {}\n", error.message));
            output.push_str(&render_config(config));
            output.push_str(&format!("   Detail: {}\n", error.detail));
        }
    }

    output
}

/// Render the companion CLI launch outcome.
pub fn render_launch(outcome: &LaunchOutcome) -> String {
    match outcome {
        LaunchOutcome::AlreadyLaunched => {
            "ℹ️  Companion CLI already launched in this session.\n".to_string()
        }
        LaunchOutcome::Launched(details) => render_launch_details(details),
    }
}

fn render_launch_details(details: &LaunchDetails) -> String {
    let mut output = String::new();

    output.push_str("🖥️  Companion CLI launched\n\n");
    output.push_str(&format!("   Command: {}\n", details.command));
    output.push_str(&format!("   Working directory: {}\n", details.working_directory));
    output.push_str(&format!("   LLM model: {}\n", details.llm_model));
    if !details.backend_url.is_empty() {
        output.push_str(&format!("   LLM endpoint: {}\n", details.backend_url));
    }
    if !details.apis_configured.is_empty() {
        output.push_str(&format!(
            "   APIs configured: {}\n",
            details.apis_configured.join(", ")
        ));
    }

    if !details.next_steps.is_empty() {
        output.push_str("\nNext steps:\n");
        for (i, step) in details.next_steps.iter().enumerate() {
            output.push_str(&format!("   {}. {}\n", i + 1, step));
        }
    }

    if let Some(ref cli_output) = details.cli_output {
        output.push_str("\nCLI output:\n");
        for line in cli_output.lines() {
            output.push_str(&format!("   | {}\n", line));
        }
    }

    output
}

fn check_line(ok: bool, label: &str, detail: &str) -> String {
    let mark = if ok { "✅" } else { "❌" };
    format!("{} {:<10} {}\n", mark, label, detail)
}

fn llm_detail(llm: &LlmProbeReport) -> String {
    match (&llm.model, &llm.latency) {
        (Some(model), Some(latency)) => format!("{} ({}, {})", llm.message, model, latency),
        (Some(model), None) => format!("{} ({})", llm.message, model),
        (None, Some(latency)) => format!("{} ({})", llm.message, latency),
        (None, None) => llm.message.clone(),
    }
}

/// Render the end-to-end diagnostic summary.
pub fn render_diagnostics(report: &DiagnosticReport) -> String {
    let mut output = String::new();

    output.push_str("🧪 TradingAgents diagnostics\n\n");
    output.push_str(&check_line(
        report.status_source == StatusSource::Remote,
        "Status",
        &report.system_status.status,
    ));
    output.push_str(&check_line(report.llm.ok, "LLM", &llm_detail(&report.llm)));

    match (&report.network, &report.network_error) {
        (Some(network), _) => {
            output.push_str(&check_line(true, "Network", &network.overall_status));
            for (name, health) in &network.services {
                let latency = health.latency.as_deref().unwrap_or("N/A");
                output.push_str(&format!("   {}: {} [{}]\n", name, health.status, latency));
            }
        }
        (None, Some(error)) => output.push_str(&check_line(false, "Network", error)),
        (None, None) => output.push_str(&check_line(false, "Network", "not checked")),
    }

    let analysis_detail = match &report.analysis {
        JobState::Completed { result, .. } => result.message().to_string(),
        JobState::Failed { error, .. } => error.message.clone(),
        other => other.name().to_string(),
    };
    output.push_str(&check_line(
        matches!(report.analysis, JobState::Completed { .. }),
        "Analysis",
        &analysis_detail,
    ));

    let verdict = if report.all_ok() {
        "\n🎉 All checks passed.\n"
    } else {
        "\n⚠️  Some checks failed.\n"
    };
    output.push_str(verdict);

    output
}
