//! Runtime configuration from the environment (and an optional `.env` file).
//!
//! Valuation rates are not configured here; they live in
//! `valuation::ValuationWeights` and are overridden with `--weights`.

use std::env;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_LEDGER: &str = "tesla_final_clean.csv";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Top-level runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub ledger_path: PathBuf,
    /// Fixed dealer deduction used for payout quotes.
    pub deduction_margin: f64,
    pub telemetry: TelemetryConfig,
}

/// Tracing controls.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ledger_path = lookup("COMPS_LEDGER")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LEDGER.to_string());

        let log_level = lookup("COMPS_LOG_LEVEL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let deduction_margin = match lookup("COMPS_DEDUCTION_MARGIN") {
            Some(raw) if !raw.trim().is_empty() => parse_margin(&raw)?,
            _ => 0.0,
        };

        Ok(Self {
            ledger_path: PathBuf::from(ledger_path),
            deduction_margin,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// A deduction margin must be a finite, non-negative amount.
pub fn parse_margin(raw: &str) -> Result<f64, ConfigError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidDeductionMargin(raw.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidDeductionMargin(raw.to_string()));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidDeductionMargin(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDeductionMargin(raw) => write!(
                f,
                "COMPS_DEDUCTION_MARGIN must be a finite number >= 0 (got '{raw}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
