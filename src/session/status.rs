//! One-shot system status probe with an offline fallback.

use crate::api::TradingBackend;
use crate::models::SystemStatus;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Where the stored snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusSource {
    Remote,
    Fallback,
}

pub struct StatusProbe {
    backend: Arc<dyn TradingBackend>,
    snapshot: Option<(SystemStatus, StatusSource)>,
}

impl StatusProbe {
    pub fn new(backend: Arc<dyn TradingBackend>) -> Self {
        Self {
            backend,
            snapshot: None,
        }
    }

    /// Fetch the status once. Failures are absorbed into
    /// [`SystemStatus::fallback`]; later calls return the stored snapshot.
    pub async fn load(&mut self) -> &SystemStatus {
        let snapshot = match self.snapshot.take() {
            Some(snapshot) => snapshot,
            None => self.fetch().await,
        };
        &self.snapshot.insert(snapshot).0
    }

    async fn fetch(&self) -> (SystemStatus, StatusSource) {
        match self.backend.status().await {
            Ok(status) => {
                info!("System status: {} ({})", status.status, status.version);
                (status, StatusSource::Remote)
            }
            Err(e) => {
                warn!("Status check failed, using built-in status: {}", e);
                (SystemStatus::fallback(), StatusSource::Fallback)
            }
        }
    }

    #[allow(dead_code)] // Cached snapshot without triggering a fetch
    pub fn status(&self) -> Option<&SystemStatus> {
        self.snapshot.as_ref().map(|(status, _)| status)
    }

    pub fn source(&self) -> Option<StatusSource> {
        self.snapshot.as_ref().map(|(_, source)| *source)
    }
}
