//! Connectivity checks against the service and its upstream LLM.

use crate::api::TradingBackend;
use crate::error::ApiError;
use crate::models::NetworkStatus;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of the LLM connectivity test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlmProbeReport {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<String>,
}

pub struct Diagnostics {
    backend: Arc<dyn TradingBackend>,
}

impl Diagnostics {
    pub fn new(backend: Arc<dyn TradingBackend>) -> Self {
        Self { backend }
    }

    /// Ask the service to call its LLM. Never fails: errors become a
    /// report with `ok == false`.
    pub async fn probe_llm(&self, quick: bool) -> LlmProbeReport {
        match self.backend.test_llm(quick).await {
            Ok(response) => {
                let text = |key: &str| match response.details.get(key) {
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(Value::Null) | None => None,
                    Some(other) => Some(other.to_string()),
                };
                let report = LlmProbeReport {
                    ok: response.status.eq_ignore_ascii_case("success"),
                    message: response.message.clone(),
                    model: text("model"),
                    latency: text("latency"),
                };
                info!("LLM probe: {} ({})", report.message, response.status);
                report
            }
            Err(e) => {
                warn!("LLM probe failed: {}", e);
                LlmProbeReport {
                    ok: false,
                    message: e.to_string(),
                    model: None,
                    latency: None,
                }
            }
        }
    }

    /// Reachability of the service's upstream dependencies.
    pub async fn network_status(&self) -> Result<NetworkStatus, ApiError> {
        let status = self.backend.network_status().await?;
        info!("Network status: {}", status.overall_status);
        Ok(status)
    }
}
