//! HTTP implementation of the backend using reqwest.

use crate::api::{endpoints, TradingBackend};
use crate::config::TimeoutConfig;
use crate::error::{error_chain, ApiError};
use crate::models::{
    AnalyzeRequest, AnalyzeResponse, LaunchResponse, LlmProbeResponse, NetworkStatus,
    SystemStatus,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Path prefix of every trading endpoint.
const API_PREFIX: &str = "/api/trading";

/// Talks to a live TradingAgents service.
pub struct HttpBackend {
    base_url: String,
    http_client: reqwest::Client,
    timeouts: TimeoutConfig,
}

impl HttpBackend {
    /// Create a backend for the service at `backend_url`.
    pub fn new(backend_url: &str, timeouts: TimeoutConfig) -> Result<Self> {
        let base_url = format!("{}{}", backend_url.trim_end_matches('/'), API_PREFIX);
        info!("Using TradingAgents service at {}", base_url);

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("tradeagents/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url,
            http_client,
            timeouts,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Send a prepared request and decode the JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<T, ApiError> {
        debug!("Sending request to {} (timeout {}s)", endpoint, timeout.as_secs());

        let response = request.timeout(timeout).send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("request timed out after {}s", timeout.as_secs())
            } else if e.is_connect() {
                format!("cannot connect to TradingAgents service at {}", self.base_url)
            } else {
                "failed to send request".to_string()
            };
            ApiError::transport(endpoint, message, error_chain(&e))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ApiError::transport(endpoint, "failed to read response", error_chain(&e))
        })?;

        decode_body(endpoint, status, &body)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, timeout: Duration) -> Result<T, ApiError> {
        let request = self.http_client.get(self.url(endpoint));
        self.execute(endpoint, request, timeout).await
    }
}

/// Turn a status code and raw body into a typed value or a service error.
fn decode_body<T: DeserializeOwned>(
    endpoint: &str,
    status: reqwest::StatusCode,
    body: &str,
) -> Result<T, ApiError> {
    let value: Option<Value> = serde_json::from_str(body).ok();

    if !status.is_success() {
        let detail = value.unwrap_or_else(|| Value::String(body.to_string()));
        return Err(ApiError::service(
            endpoint,
            format!("service returned HTTP {}", status),
            Some(detail),
        ));
    }

    let Some(value) = value else {
        return Err(ApiError::service(
            endpoint,
            "response is not valid JSON",
            Some(Value::String(body.to_string())),
        ));
    };

    serde_json::from_value(value.clone()).map_err(|e| {
        ApiError::service(
            endpoint,
            format!("unexpected response shape: {}", e),
            Some(value),
        )
    })
}

#[async_trait]
impl TradingBackend for HttpBackend {
    async fn status(&self) -> Result<SystemStatus, ApiError> {
        self.get(endpoints::STATUS, self.timeouts.status()).await
    }

    async fn launch_cli(&self) -> Result<LaunchResponse, ApiError> {
        let request = self.http_client.post(self.url(endpoints::LAUNCH_CLI));
        self.execute(endpoints::LAUNCH_CLI, request, self.timeouts.launch())
            .await
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, ApiError> {
        let builder = self
            .http_client
            .post(self.url(endpoints::ANALYZE))
            .json(request);
        self.execute(endpoints::ANALYZE, builder, self.timeouts.analyze())
            .await
    }

    async fn test_llm(&self, quick: bool) -> Result<LlmProbeResponse, ApiError> {
        let endpoint = if quick {
            endpoints::TEST_LLM_QUICK
        } else {
            endpoints::TEST_LLM
        };
        self.get(endpoint, self.timeouts.llm_probe()).await
    }

    async fn network_status(&self) -> Result<NetworkStatus, ApiError> {
        self.get(endpoints::NETWORK_STATUS, self.timeouts.status())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:8001/", TimeoutConfig::default()).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8001/api/trading");
        assert_eq!(
            backend.url(endpoints::ANALYZE),
            "http://localhost:8001/api/trading/analyze"
        );
    }

    #[test]
    fn test_decode_success_body() {
        let body = r#"{"status":"ok","version":"v1","components":{},"apis":{}}"#;
        let status: SystemStatus = decode_body("/status", StatusCode::OK, body).unwrap();
        assert_eq!(status.version, "v1");
    }

    #[test]
    fn test_decode_http_error_keeps_body() {
        let body = r#"{"detail":"Not Found"}"#;
        let err = decode_body::<SystemStatus>("/status", StatusCode::NOT_FOUND, body).unwrap_err();
        assert!(!err.is_transport());
        assert!(err.message().contains("404"));
        assert_eq!(err.detail(), json!({"detail": "Not Found"}));
    }

    #[test]
    fn test_decode_non_json_body() {
        let err =
            decode_body::<SystemStatus>("/status", StatusCode::OK, "<html>oops</html>").unwrap_err();
        assert_eq!(err.message(), "response is not valid JSON");
        assert_eq!(err.detail(), json!("<html>oops</html>"));
    }

    #[test]
    fn test_decode_wrong_shape() {
        let err = decode_body::<SystemStatus>("/status", StatusCode::OK, r#"[1,2,3]"#).unwrap_err();
        assert!(err.message().starts_with("unexpected response shape"));
        assert_eq!(err.detail(), json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let timeouts = TimeoutConfig {
            status_seconds: 2,
            ..TimeoutConfig::default()
        };
        let backend = HttpBackend::new("http://127.0.0.1:9", timeouts).unwrap();
        let err = backend.status().await.unwrap_err();
        assert!(err.is_transport());

        // The reqwest error text survives next to our own message.
        let detail = err.detail();
        let detail = detail.as_str().unwrap();
        assert_ne!(detail, err.message());
        assert!(detail.contains("127.0.0.1:9"));
    }
}
