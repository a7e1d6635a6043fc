//! Shared "load, then value" logic behind the subcommands.
//!
//! Every ledger-backed command goes through the same steps:
//! resolve config -> load weights -> ingest ledger -> run the engine
//!
//! The handlers in `app` then only decide what to print and export.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cli::GlobalArgs;
use crate::config::AppConfig;
use crate::domain::AuctionRecord;
use crate::error::AppError;
use crate::io::ingest::{LedgerData, load_auction_ledger};
use crate::io::weights::read_weights_json;
use crate::valuation::{
    BacktestReport, DealerInsights, HistoricalValuation, NeighborProfile, ValuationEngine,
    ValuationWeights, dealer_insights, neighbor_profile, run_backtest,
};

/// Config from the environment with the CLI's global flags layered on top.
pub fn resolve_config(global: &GlobalArgs) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load().map_err(|e| AppError::input(e.to_string()))?;
    apply_overrides(&mut config, global);
    Ok(config)
}

pub fn apply_overrides(config: &mut AppConfig, global: &GlobalArgs) {
    if let Some(path) = &global.ledger {
        config.ledger_path = path.clone();
    }
    if let Some(level) = &global.log_level {
        config.telemetry.log_level = level.clone();
    }
}

/// Build the engine from the default weights or a `--weights` file.
pub fn load_engine(weights: Option<&Path>) -> Result<ValuationEngine, AppError> {
    let weights = match weights {
        Some(path) => {
            let weights = read_weights_json(path)?;
            info!(path = %path.display(), "loaded valuation weights");
            weights
        }
        None => ValuationWeights::default(),
    };
    Ok(ValuationEngine::new(weights))
}

/// A loaded ledger plus the engine that values against it.
#[derive(Debug, Clone)]
pub struct Session {
    pub ledger_path: PathBuf,
    pub ledger: LedgerData,
    pub engine: ValuationEngine,
}

impl Session {
    pub fn open(config: &AppConfig, weights: Option<&Path>) -> Result<Self, AppError> {
        let engine = load_engine(weights)?;
        let ledger = load_auction_ledger(&config.ledger_path)?;

        info!(
            path = %config.ledger_path.display(),
            rows_read = ledger.rows_read,
            rows_used = ledger.rows_used,
            rejected = ledger.row_errors.len(),
            "loaded auction ledger"
        );
        if !ledger.row_errors.is_empty() {
            warn!(rejected = ledger.row_errors.len(), "some ledger rows were skipped");
        }
        for row in &ledger.row_errors {
            debug!(line = row.line, id = row.id.as_deref().unwrap_or("-"), "{}", row.message);
        }

        Ok(Self {
            ledger_path: config.ledger_path.clone(),
            ledger,
            engine,
        })
    }

    pub fn records(&self) -> &[AuctionRecord] {
        &self.ledger.records
    }

    pub fn find_auction(&self, auction_id: &str) -> Result<&AuctionRecord, AppError> {
        let wanted = auction_id.trim();
        self.records()
            .iter()
            .find(|r| r.auction_id == wanted)
            .ok_or_else(|| {
                AppError::no_data(format!("Auction '{wanted}' not found in the ledger."))
            })
    }

    pub fn explore(&self, auction_id: &str) -> Result<ExploreOutput, AppError> {
        let target = self.find_auction(auction_id)?;
        let historical = self.engine.estimate_for_historical_auction(target, self.records());
        Ok(ExploreOutput::from_historical(historical))
    }

    pub fn backtest(&self, top_n: usize) -> Result<BacktestReport, AppError> {
        let report = run_backtest(&self.engine, self.records(), top_n);
        if report.summary.is_none() {
            return Err(AppError::no_data(format!(
                "Backtest produced no estimates ({} targets skipped).",
                report.skipped.len()
            )));
        }
        Ok(report)
    }
}

/// Everything `comps explore` shows for one auction.
#[derive(Debug, Clone, Serialize)]
pub struct ExploreOutput {
    pub historical: HistoricalValuation,
    pub insights: Option<DealerInsights>,
    pub profile: Option<NeighborProfile>,
}

impl ExploreOutput {
    pub fn from_historical(historical: HistoricalValuation) -> Self {
        let insights = dealer_insights(&historical);
        let profile = neighbor_profile(historical.result.neighbors());
        Self {
            historical,
            insights,
            profile,
        }
    }
}
