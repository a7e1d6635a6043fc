//! Command-line parsing for the comparable-sales valuation tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the valuation code.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use crate::domain::{ModelFamily, TaxTreatment, TireStrategy, VehicleConfiguration};
use crate::io::ingest::parse_datetime;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "comps", version, about = "Glass-box EV valuation from comparable auction sales")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand. Unset values fall back to the
/// environment (`COMPS_*`, optionally from `.env`).
#[derive(Debug, Args, Clone, Default)]
pub struct GlobalArgs {
    /// Auction ledger CSV [env: COMPS_LEDGER].
    #[arg(long, global = true, value_name = "CSV")]
    pub ledger: Option<PathBuf>,

    /// JSON file overriding some or all valuation weights.
    #[arg(long, global = true, value_name = "JSON")]
    pub weights: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `ev_comps=trace` [env: COMPS_LOG_LEVEL].
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Value a vehicle configuration against the ledger.
    Value(ValueArgs),
    /// Value a historical auction using only what was known before it closed.
    Explore(ExploreArgs),
    /// Measure estimate accuracy on the most recent closed auctions.
    Backtest(BacktestArgs),
    /// Write a synthetic ledger CSV for demos.
    Sample(SampleArgs),
    /// Write the default weight table as JSON (a starting point for `--weights`).
    Weights(WeightsArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ValueArgs {
    #[arg(long, value_enum)]
    pub model: ModelFamily,

    /// Variant code, e.g. `m3_lr` or `my_p`.
    #[arg(long)]
    pub variant: String,

    /// Post-refresh ("Highland") generation.
    #[arg(long)]
    pub highland: bool,

    #[arg(long, value_enum, default_value_t = TaxTreatment::Margin)]
    pub tax: TaxTreatment,

    /// The car has an accident history.
    #[arg(long)]
    pub accident_damaged: bool,

    /// Autopilot package label (`Standard`, `EAP`, `FSD`).
    #[arg(long, default_value = "Standard")]
    pub autopilot: String,

    #[arg(long, value_enum, default_value_t = TireStrategy::FourSummer)]
    pub tires: TireStrategy,

    #[arg(long)]
    pub heat_pump: bool,

    #[arg(long)]
    pub hitch: bool,

    /// Odometer reading in km.
    #[arg(long)]
    pub mileage: u32,

    /// First registration date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub first_registration: NaiveDate,

    /// Value as of this date/time instead of now.
    #[arg(long, value_name = "DATE", value_parser = parse_as_of)]
    pub as_of: Option<DateTime<Utc>>,

    /// Dealer deduction margin for the payout line [env: COMPS_DEDUCTION_MARGIN].
    #[arg(long)]
    pub deduction_margin: Option<f64>,

    /// Export the full result to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export the selected neighbors to CSV.
    #[arg(long = "export-neighbors", value_name = "CSV")]
    pub export_neighbors: Option<PathBuf>,
}

impl ValueArgs {
    pub fn vehicle(&self) -> VehicleConfiguration {
        VehicleConfiguration {
            model: self.model,
            variant: self.variant.trim().to_ascii_lowercase(),
            is_highland: self.highland,
            tax_type: self.tax,
            accident_free: !self.accident_damaged,
            autopilot: self.autopilot.clone(),
            tire_strategy: self.tires,
            has_heat_pump: self.heat_pump,
            has_hitch: self.hitch,
            mileage_km: self.mileage,
            first_registration: self.first_registration,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct ExploreArgs {
    /// Ledger auction id to value.
    #[arg(long)]
    pub auction_id: String,

    /// Export the historical valuation and insights to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct BacktestArgs {
    /// Number of most recent closed auctions to evaluate.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Show the N worst predictions after the table.
    #[arg(long, default_value_t = 5)]
    pub worst: usize,

    /// Export per-target results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output ledger CSV.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    #[arg(short = 'n', long, default_value_t = 400)]
    pub count: usize,

    #[arg(long, default_value_t = 7)]
    pub seed: u64,

    /// Latest auction close (defaults to now).
    #[arg(long, value_name = "DATE", value_parser = parse_as_of)]
    pub end: Option<DateTime<Utc>>,

    /// Auctions close within this many days before `--end`.
    #[arg(long, default_value_t = 540)]
    pub span_days: u32,
}

#[derive(Debug, Args, Clone)]
pub struct WeightsArgs {
    #[arg(long, value_name = "JSON")]
    pub out: PathBuf,
}

fn parse_as_of(s: &str) -> Result<DateTime<Utc>, String> {
    parse_datetime(s.trim())
}
