//! Editable analysis parameters.

use crate::config::DefaultsConfig;
use crate::error::ValidationError;
use crate::models::{
    normalize_ticker, parse_analysis_date, parse_analysts, AnalysisConfig, Analyst, ResearchDepth,
};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Field of [`AnalysisConfig`] addressable through [`ConfigStore::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    Ticker,
    AnalysisDate,
    /// Comma-separated analyst names.
    Analysts,
    ResearchDepth,
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigField::Ticker => "ticker",
            ConfigField::AnalysisDate => "analysis_date",
            ConfigField::Analysts => "analysts",
            ConfigField::ResearchDepth => "research_depth",
        };
        f.write_str(name)
    }
}

/// Holds the configuration the next job will be submitted with.
///
/// Every setter validates before mutating, so the store is valid at all
/// times and [`snapshot`](Self::snapshot) never has to check anything.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    current: AnalysisConfig,
}

impl ConfigStore {
    #[allow(dead_code)] // Built-in defaults; the console seeds from the config file
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from the `[defaults]` section of the config file.
    pub fn from_defaults(defaults: &DefaultsConfig) -> Result<Self, ValidationError> {
        let current = AnalysisConfig::new(
            &defaults.ticker,
            parse_analysis_date(&defaults.analysis_date)?,
            parse_analysts(&defaults.analysts)?,
            ResearchDepth::try_from(defaults.research_depth)?,
        )?;
        Ok(Self { current })
    }

    /// Current values, for display.
    pub fn current(&self) -> &AnalysisConfig {
        &self.current
    }

    /// Immutable copy of the current configuration.
    pub fn snapshot(&self) -> AnalysisConfig {
        self.current.clone()
    }

    /// Parse and apply a textual value for one field.
    pub fn set(&mut self, field: ConfigField, value: &str) -> Result<(), ValidationError> {
        debug!("Setting {} = {:?}", field, value);
        match field {
            ConfigField::Ticker => self.set_ticker(value),
            ConfigField::AnalysisDate => self.set_analysis_date(parse_analysis_date(value)?),
            ConfigField::Analysts => self.set_analysts(parse_analysts(value.split(','))?),
            ConfigField::ResearchDepth => {
                let raw = value.trim();
                let level: i64 = raw.parse().map_err(|_| {
                    ValidationError::new("research_depth", format!("'{}' is not a number", raw))
                })?;
                let level = u8::try_from(level).map_err(|_| {
                    ValidationError::new(
                        "research_depth",
                        format!("{} is not one of 1, 2 or 3", level),
                    )
                })?;
                self.set_research_depth(level)
            }
        }
    }

    pub fn set_ticker(&mut self, ticker: &str) -> Result<(), ValidationError> {
        let ticker = normalize_ticker(ticker)?;
        self.current = self.current.with_ticker(ticker);
        Ok(())
    }

    pub fn set_analysis_date(&mut self, date: NaiveDate) -> Result<(), ValidationError> {
        self.current = self.current.with_analysis_date(date);
        Ok(())
    }

    pub fn set_analysts(&mut self, analysts: BTreeSet<Analyst>) -> Result<(), ValidationError> {
        if analysts.is_empty() {
            return Err(ValidationError::new(
                "analysts",
                "at least one analyst must be selected",
            ));
        }
        self.current = self.current.with_analysts(analysts);
        Ok(())
    }

    pub fn set_research_depth(&mut self, level: u8) -> Result<(), ValidationError> {
        let depth = ResearchDepth::try_from(level)?;
        self.current = self.current.with_research_depth(depth);
        Ok(())
    }

    /// Flip one analyst on or off. Deselecting the last one is rejected.
    #[allow(dead_code)] // Interactive selection helper
    pub fn toggle_analyst(&mut self, analyst: Analyst) -> Result<(), ValidationError> {
        let mut analysts = self.current.analysts().clone();
        if !analysts.remove(&analyst) {
            analysts.insert(analyst);
        }
        self.set_analysts(analysts)
    }
}
