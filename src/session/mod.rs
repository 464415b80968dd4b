//! Client-side session: the configuration store and the components that
//! talk to the TradingAgents service.
//!
//! A [`Session`] owns one of each component. It is created when the
//! console starts and consumed by [`Session::end`]; nothing is global.

pub mod config_store;
pub mod diagnostics;
pub mod job;
pub mod launcher;
pub mod status;

pub use config_store::{ConfigField, ConfigStore};
pub use diagnostics::{Diagnostics, LlmProbeReport};
pub use job::{JobController, JobFailure, JobProgress, JobState, SubmitOutcome};
pub use launcher::{CliLauncher, LaunchOutcome};
pub use status::{StatusProbe, StatusSource};

use crate::api::TradingBackend;
use crate::config::DefaultsConfig;
use crate::error::ValidationError;
use crate::models::{NetworkStatus, SystemStatus};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Everything the presenter reads and drives during one run.
pub struct Session {
    pub config: ConfigStore,
    pub jobs: JobController,
    pub status: StatusProbe,
    pub launcher: CliLauncher,
    pub diagnostics: Diagnostics,
}

/// Combined result of [`Session::diagnose`].
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub status_source: StatusSource,
    pub system_status: SystemStatus,
    pub llm: LlmProbeReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_error: Option<String>,
    pub analysis: JobState,
}

impl DiagnosticReport {
    /// Every check passed.
    pub fn all_ok(&self) -> bool {
        self.status_source == StatusSource::Remote
            && self.llm.ok
            && self.network.is_some()
            && matches!(self.analysis, JobState::Completed { .. })
    }
}

impl Session {
    /// Start a session against `backend`, seeding the store from `defaults`.
    pub fn start(
        backend: Arc<dyn TradingBackend>,
        defaults: &DefaultsConfig,
    ) -> Result<Self, ValidationError> {
        let config = ConfigStore::from_defaults(defaults)?;
        debug!("Session started with {:?}", config.current());

        Ok(Self {
            config,
            jobs: JobController::new(backend.clone()),
            status: StatusProbe::new(backend.clone()),
            launcher: CliLauncher::new(backend.clone()),
            diagnostics: Diagnostics::new(backend),
        })
    }

    /// End-to-end check: status, LLM probe, network status, and one
    /// analysis of the store's current configuration.
    pub async fn diagnose(&mut self) -> DiagnosticReport {
        let (system_status, llm, network) = futures::join!(
            self.status.load(),
            self.diagnostics.probe_llm(true),
            self.diagnostics.network_status(),
        );
        let system_status = system_status.clone();
        let status_source = self.status.source().unwrap_or(StatusSource::Fallback);

        if self.jobs.state().is_terminal() {
            if let Err(e) = self.jobs.reset() {
                debug!("Keeping previous job state: {}", e);
            }
        }
        self.jobs.submit(&self.config).await;

        let (network, network_error) = match network {
            Ok(status) => (Some(status), None),
            Err(e) => (None, Some(e.to_string())),
        };

        DiagnosticReport {
            status_source,
            system_status,
            llm,
            network,
            network_error,
            analysis: self.jobs.state(),
        }
    }

    /// Close the session, dropping every component.
    pub fn end(self) {
        info!(
            "Session ended (job {}, companion CLI {})",
            self.jobs.state().name(),
            if self.launcher.is_launched() {
                "launched"
            } else {
                "not launched"
            }
        );
    }
}
