//! Access to the remote TradingAgents service.
//!
//! Every lifecycle component talks to the service through the
//! [`TradingBackend`] trait so tests can substitute an in-memory fake.

pub mod http;

#[cfg(test)]
pub mod fake;

pub use http::HttpBackend;

use crate::error::ApiError;
use crate::models::{
    AnalyzeRequest, AnalyzeResponse, LaunchResponse, LlmProbeResponse, NetworkStatus,
    SystemStatus,
};
use async_trait::async_trait;

/// Endpoint paths under `{backend}/api/trading`.
pub mod endpoints {
    pub const STATUS: &str = "/status";
    pub const LAUNCH_CLI: &str = "/launch-cli";
    pub const ANALYZE: &str = "/analyze";
    pub const TEST_LLM: &str = "/test-deepseek";
    pub const TEST_LLM_QUICK: &str = "/test-deepseek-quick";
    pub const NETWORK_STATUS: &str = "/network-status";
}

/// One method per remote endpoint. Each call issues exactly one request.
#[async_trait]
pub trait TradingBackend: Send + Sync {
    /// `GET /status`
    async fn status(&self) -> Result<SystemStatus, ApiError>;

    /// `POST /launch-cli`
    async fn launch_cli(&self) -> Result<LaunchResponse, ApiError>;

    /// `POST /analyze`
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, ApiError>;

    /// `GET /test-deepseek`, or `/test-deepseek-quick` when `quick` is set.
    async fn test_llm(&self, quick: bool) -> Result<LlmProbeResponse, ApiError>;

    /// `GET /network-status`
    async fn network_status(&self) -> Result<NetworkStatus, ApiError>;
}
