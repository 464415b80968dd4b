//! Data models for the trading console.
//!
//! This module contains the analysis request parameters and the shapes
//! exchanged with the remote TradingAgents service.

use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Date format used on the wire and on the command line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Analysis category requested for a job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Analyst {
    /// Technical indicators
    Market,
    /// Sentiment and social media
    Social,
    /// Global news
    News,
    /// Company financials
    Fundamentals,
}

impl Analyst {
    pub const ALL: [Analyst; 4] = [
        Analyst::Market,
        Analyst::Social,
        Analyst::News,
        Analyst::Fundamentals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Analyst::Market => "market",
            Analyst::Social => "social",
            Analyst::News => "news",
            Analyst::Fundamentals => "fundamentals",
        }
    }
}

impl fmt::Display for Analyst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Analyst {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "market" => Ok(Analyst::Market),
            "social" => Ok(Analyst::Social),
            "news" => Ok(Analyst::News),
            "fundamentals" => Ok(Analyst::Fundamentals),
            other => Err(ValidationError::new(
                "analysts",
                format!(
                    "unknown analyst '{}' (expected market, social, news or fundamentals)",
                    other
                ),
            )),
        }
    }
}

/// Number of research debate rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ResearchDepth {
    Shallow = 1,
    Medium = 2,
    Deep = 3,
}

impl ResearchDepth {
    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            ResearchDepth::Shallow => "Shallow",
            ResearchDepth::Medium => "Medium",
            ResearchDepth::Deep => "Deep",
        }
    }
}

impl TryFrom<u8> for ResearchDepth {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ResearchDepth::Shallow),
            2 => Ok(ResearchDepth::Medium),
            3 => Ok(ResearchDepth::Deep),
            other => Err(ValidationError::new(
                "research_depth",
                format!("{} is not one of 1, 2 or 3", other),
            )),
        }
    }
}

impl From<ResearchDepth> for u8 {
    fn from(depth: ResearchDepth) -> Self {
        depth.level()
    }
}

/// Uppercase and trim a ticker, rejecting empty or spaced input.
pub fn normalize_ticker(raw: &str) -> Result<String, ValidationError> {
    let ticker = raw.trim();
    if ticker.is_empty() {
        return Err(ValidationError::new("ticker", "must not be empty"));
    }
    if ticker.chars().any(char::is_whitespace) {
        return Err(ValidationError::new(
            "ticker",
            format!("'{}' must not contain whitespace", ticker),
        ));
    }
    Ok(ticker.to_uppercase())
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_analysis_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        ValidationError::new(
            "analysis_date",
            format!("'{}' is not a valid YYYY-MM-DD date", raw.trim()),
        )
    })
}

/// Parse a list of analyst names into a non-empty set.
pub fn parse_analysts<I, S>(names: I) -> Result<BTreeSet<Analyst>, ValidationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut analysts = BTreeSet::new();
    for name in names {
        let name = name.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        analysts.insert(name.parse::<Analyst>()?);
    }
    if analysts.is_empty() {
        return Err(ValidationError::new(
            "analysts",
            "at least one analyst must be selected",
        ));
    }
    Ok(analysts)
}

/// Parameters of one analysis request.
///
/// Only constructed through validated paths, so every instance satisfies
/// the field invariants. There are no setters: a config frozen into a job
/// cannot change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisConfig {
    ticker: String,
    analysis_date: NaiveDate,
    analysts: BTreeSet<Analyst>,
    research_depth: ResearchDepth,
}

impl AnalysisConfig {
    /// Build a config from raw parts, validating each one.
    pub fn new(
        ticker: &str,
        analysis_date: NaiveDate,
        analysts: BTreeSet<Analyst>,
        research_depth: ResearchDepth,
    ) -> Result<Self, ValidationError> {
        if analysts.is_empty() {
            return Err(ValidationError::new(
                "analysts",
                "at least one analyst must be selected",
            ));
        }
        Ok(Self {
            ticker: normalize_ticker(ticker)?,
            analysis_date,
            analysts,
            research_depth,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn analysis_date(&self) -> NaiveDate {
        self.analysis_date
    }

    pub fn analysts(&self) -> &BTreeSet<Analyst> {
        &self.analysts
    }

    pub fn research_depth(&self) -> ResearchDepth {
        self.research_depth
    }

    /// Copy with a different field. Callers validate the value first.
    pub(crate) fn with_ticker(&self, ticker: String) -> Self {
        Self {
            ticker,
            ..self.clone()
        }
    }

    pub(crate) fn with_analysis_date(&self, analysis_date: NaiveDate) -> Self {
        Self {
            analysis_date,
            ..self.clone()
        }
    }

    pub(crate) fn with_analysts(&self, analysts: BTreeSet<Analyst>) -> Self {
        Self {
            analysts,
            ..self.clone()
        }
    }

    pub(crate) fn with_research_depth(&self, research_depth: ResearchDepth) -> Self {
        Self {
            research_depth,
            ..self.clone()
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ticker: "NVDA".to_string(),
            analysis_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap_or_default(),
            analysts: Analyst::ALL.into_iter().collect(),
            research_depth: ResearchDepth::Shallow,
        }
    }
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeRequest {
    pub ticker: String,
    pub analysis_date: String,
    pub analysts: Vec<Analyst>,
    pub research_depth: u8,
}

impl From<&AnalysisConfig> for AnalyzeRequest {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            ticker: config.ticker.clone(),
            analysis_date: config.analysis_date.format(DATE_FORMAT).to_string(),
            analysts: config.analysts.iter().copied().collect(),
            research_depth: config.research_depth.level(),
        }
    }
}

/// Response of `POST /analyze`, kept verbatim.
///
/// The body the service sent is stored as-is and serialized back
/// unchanged, explicit `null`s and unknown keys included. The accessors
/// are a typed view over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct AnalyzeResponse {
    body: AnalyzeBody,
    raw: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct AnalyzeBody {
    /// One of `running`, `completed` or `error`.
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    configuration: Option<EchoedConfiguration>,
    #[serde(default)]
    progress: Option<ServiceProgress>,
    #[serde(default)]
    analysis_output: Option<String>,
    #[serde(default)]
    recommendations: Option<Recommendations>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<Value> for AnalyzeResponse {
    type Error = serde_json::Error;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        let body = AnalyzeBody::deserialize(&raw)?;
        Ok(Self { body, raw })
    }
}

impl From<AnalyzeResponse> for Value {
    fn from(response: AnalyzeResponse) -> Self {
        response.raw
    }
}

impl AnalyzeResponse {
    pub fn status(&self) -> &str {
        &self.body.status
    }

    pub fn message(&self) -> &str {
        &self.body.message
    }

    pub fn configuration(&self) -> Option<&EchoedConfiguration> {
        self.body.configuration.as_ref()
    }

    pub fn progress(&self) -> Option<&ServiceProgress> {
        self.body.progress.as_ref()
    }

    pub fn analysis_output(&self) -> Option<&str> {
        self.body.analysis_output.as_deref()
    }

    pub fn recommendations(&self) -> Option<&Recommendations> {
        self.body.recommendations.as_ref()
    }

    /// Top-level keys the console does not interpret.
    #[allow(dead_code)] // Typed view; `raw` carries these on output
    pub fn extra(&self) -> &Map<String, Value> {
        &self.body.extra
    }

    /// The body exactly as received.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn is_error(&self) -> bool {
        self.body.status.eq_ignore_ascii_case("error")
    }
}

/// Request parameters as echoed back by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoedConfiguration {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_depth: Option<u8>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Pipeline progress reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceProgress {
    #[serde(default)]
    pub current_phase: String,
    #[serde(default)]
    pub phases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<u8>,
}

/// Follow-up guidance attached to a finished analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub system_status: String,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Snapshot returned by `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub status: String,
    pub version: String,
    #[serde(default)]
    pub components: BTreeMap<String, String>,
    #[serde(default)]
    pub apis: BTreeMap<String, String>,
}

impl SystemStatus {
    /// Fixed snapshot shown when the service cannot be reached.
    pub fn fallback() -> Self {
        let ready = |name: &str| (name.to_string(), "✅ Ready".to_string());
        let configured = |name: &str| (name.to_string(), "✅ Configured".to_string());

        Self {
            status: "🟢 TradingAgents System Online".to_string(),
            version: "v1.0.0".to_string(),
            components: [
                ready("analyst_team"),
                ready("research_team"),
                ready("trading_team"),
                ready("risk_management"),
                ready("portfolio_management"),
            ]
            .into_iter()
            .collect(),
            apis: [configured("deepseek"), configured("finnhub")]
                .into_iter()
                .collect(),
        }
    }
}

/// Response of `POST /launch-cli`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_info: Option<CliInfo>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliInfo {
    pub command: String,
    pub working_directory: String,
    pub configuration: CliConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfiguration {
    pub llm_model: String,
    #[serde(default)]
    pub backend_url: String,
    #[serde(default)]
    pub apis_configured: Vec<String>,
}

/// What the console shows after a successful companion CLI launch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchDetails {
    pub command: String,
    pub working_directory: String,
    pub llm_model: String,
    pub backend_url: String,
    pub apis_configured: Vec<String>,
    pub next_steps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cli_output: Option<String>,
}

impl LaunchDetails {
    pub fn from_parts(info: CliInfo, next_steps: Vec<String>, cli_output: Option<String>) -> Self {
        Self {
            command: info.command,
            working_directory: info.working_directory,
            llm_model: info.configuration.llm_model,
            backend_url: info.configuration.backend_url,
            apis_configured: info.configuration.apis_configured,
            next_steps,
            cli_output,
        }
    }
}

/// Response of `GET /test-deepseek` and `/test-deepseek-quick`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmProbeResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Map<String, Value>,
}

/// Response of `GET /network-status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkStatus {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceHealth>,
    #[serde(default)]
    pub overall_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reachability of one upstream dependency of the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_analyst_from_str() {
        assert_eq!("market".parse::<Analyst>().unwrap(), Analyst::Market);
        assert_eq!(" News ".parse::<Analyst>().unwrap(), Analyst::News);
        let err = "macro".parse::<Analyst>().unwrap_err();
        assert_eq!(err.field, "analysts");
    }

    #[test]
    fn test_research_depth_bounds() {
        assert_eq!(ResearchDepth::try_from(2).unwrap(), ResearchDepth::Medium);
        assert!(ResearchDepth::try_from(0).is_err());
        assert!(ResearchDepth::try_from(4).is_err());
        assert!(serde_json::from_value::<ResearchDepth>(json!(5)).is_err());
        assert_eq!(serde_json::to_value(ResearchDepth::Deep).unwrap(), json!(3));
    }

    #[test]
    fn test_normalize_ticker() {
        assert_eq!(normalize_ticker("  nvda ").unwrap(), "NVDA");
        assert_eq!(normalize_ticker("brk.b").unwrap(), "BRK.B");
        assert!(normalize_ticker("   ").is_err());
        assert!(normalize_ticker("NV DA").is_err());
    }

    #[test]
    fn test_parse_analysis_date() {
        let date = parse_analysis_date("2024-05-10").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert!(parse_analysis_date("2024-02-30").is_err());
        assert!(parse_analysis_date("10/05/2024").is_err());
    }

    #[test]
    fn test_parse_analysts_rejects_empty() {
        let set = parse_analysts(["news", "market", "news"]).unwrap();
        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            vec![Analyst::Market, Analyst::News]
        );
        assert!(parse_analysts(Vec::<String>::new()).is_err());
        assert!(parse_analysts([" ", ""]).is_err());
    }

    #[test]
    fn test_analyze_request_wire_shape() {
        let request = AnalyzeRequest::from(&AnalysisConfig::default());
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "ticker": "NVDA",
                "analysis_date": "2024-05-10",
                "analysts": ["market", "social", "news", "fundamentals"],
                "research_depth": 1
            })
        );
    }

    #[test]
    fn test_analyze_response_keeps_unknown_fields() {
        let body = json!({
            "id": "abc-123",
            "status": "completed",
            "message": "Analyse de NVDA terminée avec succès",
            "configuration": {
                "ticker": "NVDA",
                "date": "2024-05-10",
                "analysts": ["market"],
                "research_depth": 1,
                "llm_model": "deepseek-chat"
            },
            "progress": {"current_phase": "✅ Analyse terminée", "phases": ["a"], "completion": 100},
            "recommendations": {
                "system_status": "ok",
                "analysis_complete": true,
                "next_steps": ["review"]
            }
        });

        let response: AnalyzeResponse = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(response.extra().get("id"), Some(&json!("abc-123")));
        assert!(!response.is_error());
        assert_eq!(serde_json::to_value(&response).unwrap(), body);
    }

    #[test]
    fn test_analyze_response_keeps_explicit_nulls() {
        let body = json!({
            "status": "completed",
            "message": "ok",
            "analysis_output": null,
            "progress": null,
            "recommendations": {"system_status": "ok", "next_steps": [], "extra_note": null}
        });

        let response: AnalyzeResponse = serde_json::from_value(body.clone()).unwrap();
        assert!(response.analysis_output().is_none());
        assert!(response.progress().is_none());
        assert_eq!(response.raw(), &body);
        assert_eq!(serde_json::to_string(&response).unwrap(), body.to_string());
    }

    #[test]
    fn test_system_status_fallback_keys() {
        let status = SystemStatus::fallback();
        assert_eq!(status.version, "v1.0.0");
        assert_eq!(status.components.len(), 5);
        assert!(status.components.contains_key("portfolio_management"));
        assert_eq!(status.apis.get("deepseek").map(String::as_str), Some("✅ Configured"));
    }

    #[test]
    fn test_status_ignores_extra_fields() {
        let body = json!({
            "status": "online",
            "version": "v2",
            "components": {"analyst_team": "ok"},
            "dependencies": "✅ All installed",
            "apis": {}
        });
        let status: SystemStatus = serde_json::from_value(body).unwrap();
        assert_eq!(status.components.len(), 1);
        assert!(status.apis.is_empty());
    }
}
