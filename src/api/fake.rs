//! In-memory backend for tests.

use crate::api::TradingBackend;
use crate::error::ApiError;
use crate::models::{
    AnalyzeRequest, AnalyzeResponse, CliConfiguration, CliInfo, LaunchResponse, LlmProbeResponse,
    NetworkStatus, SystemStatus,
};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Scripted backend that counts calls and can hold `/analyze` open.
pub struct FakeBackend {
    pub status: Mutex<Result<SystemStatus, ApiError>>,
    pub launch: Mutex<Result<LaunchResponse, ApiError>>,
    pub analyze: Mutex<Result<AnalyzeResponse, ApiError>>,
    pub llm: Mutex<Result<LlmProbeResponse, ApiError>>,
    pub network: Mutex<Result<NetworkStatus, ApiError>>,
    pub requests: Mutex<Vec<AnalyzeRequest>>,
    status_calls: AtomicUsize,
    launch_calls: AtomicUsize,
    analyze_calls: AtomicUsize,
    llm_calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            status: Mutex::new(Ok(online_status())),
            launch: Mutex::new(Ok(launch_response())),
            analyze: Mutex::new(Ok(completed_response("NVDA"))),
            llm: Mutex::new(Ok(LlmProbeResponse {
                status: "success".to_string(),
                message: "✅ DeepSeek OK".to_string(),
                details: json!({"model": "deepseek-chat", "latency": "850ms"})
                    .as_object()
                    .cloned()
                    .unwrap_or_default(),
            })),
            network: Mutex::new(Ok(NetworkStatus {
                timestamp: "2024-05-10T12:00:00".to_string(),
                services: Default::default(),
                overall_status: "✅ Tous les services accessibles".to_string(),
                error: None,
            })),
            requests: Mutex::new(Vec::new()),
            status_calls: AtomicUsize::new(0),
            launch_calls: AtomicUsize::new(0),
            analyze_calls: AtomicUsize::new(0),
            llm_calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Make `/analyze` wait until the returned handle is notified.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn unreachable() -> Self {
        let down = |endpoint: &str| {
            ApiError::transport(
                endpoint,
                "connection refused",
                "error sending request: tcp connect error: Connection refused (os error 111)",
            )
        };
        let fake = Self::new();
        *fake.status.lock().unwrap() = Err(down("/status"));
        *fake.launch.lock().unwrap() = Err(down("/launch-cli"));
        *fake.analyze.lock().unwrap() = Err(down("/analyze"));
        *fake.llm.lock().unwrap() = Err(down("/test-deepseek-quick"));
        *fake.network.lock().unwrap() = Err(down("/network-status"));
        fake
    }

    pub fn set_analyze(&self, response: Result<AnalyzeResponse, ApiError>) {
        *self.analyze.lock().unwrap() = response;
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn launch_calls(&self) -> usize {
        self.launch_calls.load(Ordering::SeqCst)
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn llm_calls(&self) -> usize {
        self.llm_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<AnalyzeRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TradingBackend for FakeBackend {
    async fn status(&self) -> Result<SystemStatus, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status.lock().unwrap().clone()
    }

    async fn launch_cli(&self) -> Result<LaunchResponse, ApiError> {
        self.launch_calls.fetch_add(1, Ordering::SeqCst);
        self.launch.lock().unwrap().clone()
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, ApiError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.analyze.lock().unwrap().clone()
    }

    async fn test_llm(&self, _quick: bool) -> Result<LlmProbeResponse, ApiError> {
        self.llm_calls.fetch_add(1, Ordering::SeqCst);
        self.llm.lock().unwrap().clone()
    }

    async fn network_status(&self) -> Result<NetworkStatus, ApiError> {
        self.network.lock().unwrap().clone()
    }
}

pub fn online_status() -> SystemStatus {
    SystemStatus {
        status: "🟢 Remote Online".to_string(),
        version: "v2.3.0".to_string(),
        components: [("analyst_team".to_string(), "✅ Ready".to_string())]
            .into_iter()
            .collect(),
        apis: [("deepseek".to_string(), "✅ Configured".to_string())]
            .into_iter()
            .collect(),
    }
}

pub fn launch_response() -> LaunchResponse {
    LaunchResponse {
        id: Some("launch-1".to_string()),
        status: "started".to_string(),
        message: "Interface CLI TradingAgents lancée avec succès".to_string(),
        cli_output: Some("🚀 TradingAgents CLI Interface lancée!".to_string()),
        cli_info: Some(CliInfo {
            command: "python -m cli.main".to_string(),
            working_directory: "/app/TradingAgents".to_string(),
            configuration: CliConfiguration {
                llm_model: "deepseek-chat".to_string(),
                backend_url: "https://api.deepseek.com/v1".to_string(),
                apis_configured: vec!["DeepSeek".to_string(), "FinnHub".to_string()],
            },
        }),
        next_steps: vec![
            "Sélectionner le ticker à analyser".to_string(),
            "Lancer l'analyse multi-agents".to_string(),
        ],
    }
}

/// A finished analysis as the service reports it.
pub fn completed_response(ticker: &str) -> AnalyzeResponse {
    serde_json::from_value(json!({
        "id": "job-42",
        "status": "completed",
        "message": format!("Analyse de {} terminée avec succès", ticker),
        "configuration": {
            "ticker": ticker,
            "date": "2024-05-10",
            "llm_model": "deepseek-chat",
            "research_depth": 1
        },
        "analysis_output": "🎯 L'analyse TradingAgents est terminée",
        "progress": {
            "current_phase": "✅ Analyse terminée",
            "phases": ["📊 Équipe d'Analyse - Collecte des données de marché"]
        },
        "recommendations": {
            "system_status": "✅ TradingAgents opérationnel avec DeepSeek",
            "analysis_complete": true,
            "next_steps": ["Examiner les résultats de l'analyse"]
        }
    }))
    .unwrap()
}
