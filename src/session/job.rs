//! Analysis job lifecycle.
//!
//! ```text
//! Idle -> Submitting -> Running -> Completed | Failed -> (reset) Idle
//! ```
//!
//! At most one job is in flight per controller. State changes are
//! published on a watch channel so a presenter can re-render while the
//! submission future is suspended on the remote call.

use crate::api::{endpoints, TradingBackend};
use crate::error::{ApiError, TransitionError};
use crate::models::{AnalysisConfig, AnalyzeRequest, AnalyzeResponse};
use crate::session::ConfigStore;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Phase shown between submission and the first response.
pub const INITIAL_PHASE: &str = "Initialisation des agents";

/// Named stages of the remote multi-agent pipeline.
pub const PIPELINE_PHASES: [&str; 5] = [
    "📊 Équipe d'Analyse - Collecte des données de marché",
    "🔬 Équipe de Recherche - Débat haussier vs baissier",
    "💼 Équipe de Trading - Formulation de stratégie",
    "⚠️ Gestion des Risques - Évaluation des risques",
    "💰 Gestion de Portefeuille - Décision finale",
];

/// Progress of a job as displayed to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobProgress {
    pub current_phase: String,
    pub phases: Vec<String>,
    /// 0..=100
    pub completion_percent: u8,
}

impl JobProgress {
    /// Optimistic progress before the service has answered.
    pub fn placeholder() -> Self {
        Self {
            current_phase: INITIAL_PHASE.to_string(),
            phases: PIPELINE_PHASES.iter().map(|p| p.to_string()).collect(),
            completion_percent: 0,
        }
    }

    /// Progress of a resolved job. Completion defaults to 100 unless the
    /// service reported its own value.
    fn resolved(response: &AnalyzeResponse) -> Self {
        match response.progress() {
            Some(progress) => Self {
                current_phase: progress.current_phase.clone(),
                phases: if progress.phases.is_empty() {
                    Self::placeholder().phases
                } else {
                    progress.phases.clone()
                },
                completion_percent: progress.completion.unwrap_or(100).min(100),
            },
            None => Self {
                current_phase: response.message().to_string(),
                phases: Self::placeholder().phases,
                completion_percent: 100,
            },
        }
    }
}

/// Why a job failed, with the raw payload for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobFailure {
    pub message: String,
    pub detail: Value,
}

/// The single job owned by a [`JobController`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Submitting {
        config: AnalysisConfig,
    },
    Running {
        config: AnalysisConfig,
        progress: JobProgress,
    },
    Completed {
        config: AnalysisConfig,
        progress: JobProgress,
        result: AnalyzeResponse,
    },
    Failed {
        config: AnalysisConfig,
        error: JobFailure,
    },
}

impl JobState {
    pub fn name(&self) -> &'static str {
        match self {
            JobState::Idle => "idle",
            JobState::Submitting { .. } => "submitting",
            JobState::Running { .. } => "running",
            JobState::Completed { .. } => "completed",
            JobState::Failed { .. } => "failed",
        }
    }

    /// A request is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self, JobState::Submitting { .. } | JobState::Running { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed { .. } | JobState::Failed { .. })
    }

    /// Configuration frozen into the current job, if any.
    #[allow(dead_code)] // State accessor
    pub fn config(&self) -> Option<&AnalysisConfig> {
        match self {
            JobState::Idle => None,
            JobState::Submitting { config }
            | JobState::Running { config, .. }
            | JobState::Completed { config, .. }
            | JobState::Failed { config, .. } => Some(config),
        }
    }

    pub fn progress(&self) -> Option<&JobProgress> {
        match self {
            JobState::Running { progress, .. } | JobState::Completed { progress, .. } => {
                Some(progress)
            }
            _ => None,
        }
    }
}

/// What a call to [`JobController::submit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A job was already in flight; nothing changed.
    Ignored,
    Completed,
    Failed,
}

/// Drives one analysis job at a time against the backend.
pub struct JobController {
    backend: Arc<dyn TradingBackend>,
    state: watch::Sender<JobState>,
}

impl JobController {
    pub fn new(backend: Arc<dyn TradingBackend>) -> Self {
        let (state, _) = watch::channel(JobState::Idle);
        Self { backend, state }
    }

    /// Current state.
    pub fn state(&self) -> JobState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every transition.
    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.state.subscribe()
    }

    /// Submit the store's current configuration as a new job.
    ///
    /// All transitions up to `Running` happen before the first await, so a
    /// concurrent observer never sees a response processed ahead of them.
    /// Returns [`SubmitOutcome::Ignored`] without touching anything when a
    /// job is already in flight.
    pub async fn submit(&self, store: &ConfigStore) -> SubmitOutcome {
        let Some(config) = self.begin(store) else {
            return SubmitOutcome::Ignored;
        };

        let request = AnalyzeRequest::from(&config);
        info!(
            "Submitting analysis for {} ({}, depth {})",
            request.ticker, request.analysis_date, request.research_depth
        );

        let response = self.backend.analyze(&request).await;
        self.finish(config, response)
    }

    /// Return to `Idle` after a job has completed or failed.
    pub fn reset(&self) -> Result<(), TransitionError> {
        let mut rejected = None;
        self.state.send_if_modified(|state| {
            if state.is_terminal() {
                *state = JobState::Idle;
                true
            } else {
                rejected = Some(state.name());
                false
            }
        });

        match rejected {
            Some(state) => Err(TransitionError {
                operation: "reset",
                state,
            }),
            None => {
                debug!("Job reset to idle");
                Ok(())
            }
        }
    }

    /// Freeze the configuration and move to `Running`, unless busy.
    fn begin(&self, store: &ConfigStore) -> Option<AnalysisConfig> {
        let mut frozen = None;
        self.state.send_if_modified(|state| {
            if state.is_busy() {
                return false;
            }
            let config = store.snapshot();
            *state = JobState::Submitting {
                config: config.clone(),
            };
            frozen = Some(config);
            true
        });

        let Some(config) = frozen else {
            debug!("Submit ignored: a job is already in flight");
            return None;
        };

        self.state.send_replace(JobState::Running {
            config: config.clone(),
            progress: JobProgress::placeholder(),
        });
        Some(config)
    }

    fn finish(
        &self,
        config: AnalysisConfig,
        response: Result<AnalyzeResponse, ApiError>,
    ) -> SubmitOutcome {
        let (next, outcome) = match response.and_then(reject_service_error) {
            Ok(result) => {
                let progress = JobProgress::resolved(&result);
                info!(
                    "Analysis of {} finished with status '{}' ({}%)",
                    config.ticker(),
                    result.status(),
                    progress.completion_percent
                );
                (
                    JobState::Completed {
                        config,
                        progress,
                        result,
                    },
                    SubmitOutcome::Completed,
                )
            }
            Err(err) => {
                warn!("Analysis of {} failed: {}", config.ticker(), err);
                let error = JobFailure {
                    message: format!("Analysis of {} failed: {}", config.ticker(), err.message()),
                    detail: err.detail(),
                };
                (JobState::Failed { config, error }, SubmitOutcome::Failed)
            }
        };

        self.state.send_replace(next);
        outcome
    }
}

/// A body with `status: "error"` is a failure even on HTTP 200.
fn reject_service_error(response: AnalyzeResponse) -> Result<AnalyzeResponse, ApiError> {
    if !response.is_error() {
        return Ok(response);
    }
    let message = if response.message().is_empty() {
        "service reported an error".to_string()
    } else {
        response.message().to_string()
    };
    Err(ApiError::service(
        endpoints::ANALYZE,
        message,
        Some(response.raw().clone()),
    ))
}
