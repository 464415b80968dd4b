//! One-shot launcher for the companion TradingAgents CLI.

use crate::api::{endpoints, TradingBackend};
use crate::error::ApiError;
use crate::models::{LaunchDetails, LaunchResponse};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of [`CliLauncher::launch`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "details", rename_all = "snake_case")]
pub enum LaunchOutcome {
    Launched(LaunchDetails),
    /// A previous launch in this session succeeded; no request was sent.
    AlreadyLaunched,
}

pub struct CliLauncher {
    backend: Arc<dyn TradingBackend>,
    launched: bool,
}

impl CliLauncher {
    pub fn new(backend: Arc<dyn TradingBackend>) -> Self {
        Self {
            backend,
            launched: false,
        }
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    /// Ask the service to start the companion CLI.
    ///
    /// The flag is set before the request goes out and cleared again if it
    /// fails, so the caller can retry. Once a launch succeeds it stays set
    /// for the rest of the session.
    pub async fn launch(&mut self) -> Result<LaunchOutcome, ApiError> {
        if self.launched {
            info!("Companion CLI already launched");
            return Ok(LaunchOutcome::AlreadyLaunched);
        }

        self.launched = true;
        match self.backend.launch_cli().await.and_then(launch_details) {
            Ok(details) => {
                info!("Companion CLI launched: {}", details.command);
                Ok(LaunchOutcome::Launched(details))
            }
            Err(e) => {
                self.launched = false;
                warn!("Companion CLI launch failed: {}", e);
                Err(e)
            }
        }
    }
}

/// Accept only a started launch that carries its CLI description.
fn launch_details(response: LaunchResponse) -> Result<LaunchDetails, ApiError> {
    let status = response.status.to_lowercase();
    if status == "error" || status == "timeout" {
        let message = if response.message.is_empty() {
            format!("launch reported status '{}'", response.status)
        } else {
            response.message.clone()
        };
        return Err(ApiError::service(
            endpoints::LAUNCH_CLI,
            message,
            serde_json::to_value(&response).ok(),
        ));
    }

    let LaunchResponse {
        cli_info,
        next_steps,
        cli_output,
        ..
    } = response.clone();

    match cli_info {
        Some(info) => Ok(LaunchDetails::from_parts(info, next_steps, cli_output)),
        None => Err(ApiError::service(
            endpoints::LAUNCH_CLI,
            "launch response is missing cli_info",
            Some(serde_json::to_value(&response).unwrap_or(Value::Null)),
        )),
    }
}
