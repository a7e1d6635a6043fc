//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and resolves configuration
//! - installs the tracing subscriber
//! - loads the ledger and weights
//! - runs valuations, explorations and backtests
//! - prints reports and writes optional exports

use clap::Parser;
use tracing::{info, warn};

use crate::cli::{BacktestArgs, Cli, Command, ExploreArgs, SampleArgs, ValueArgs, WeightsArgs};
use crate::config::{AppConfig, parse_margin};
use crate::data::{SampleConfig, generate_sample_ledger};
use crate::error::AppError;
use crate::valuation::{PayoutQuote, ValuationTarget, ValuationWeights};

pub mod pipeline;

use pipeline::Session;

/// Entry point for the `comps` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = pipeline::resolve_config(&cli.global)?;

    crate::telemetry::init(&config.telemetry).map_err(|e| AppError::input(e.to_string()))?;

    run_command(cli, &config)
}

/// Dispatch a parsed command. Assumes telemetry (if any) is already set up.
pub fn run_command(cli: Cli, config: &AppConfig) -> Result<(), AppError> {
    let weights = cli.global.weights.as_deref();
    match cli.command {
        Command::Value(args) => handle_value(args, config, Session::open(config, weights)?),
        Command::Explore(args) => handle_explore(args, Session::open(config, weights)?),
        Command::Backtest(args) => handle_backtest(args, Session::open(config, weights)?),
        Command::Sample(args) => handle_sample(args),
        Command::Weights(args) => handle_weights(args),
    }
}

fn handle_value(args: ValueArgs, config: &AppConfig, session: Session) -> Result<(), AppError> {
    println!("{}", ledger_summary(&session));

    let vehicle = args.vehicle();
    let target = match args.as_of {
        Some(as_of) => ValuationTarget::at(vehicle.clone(), as_of),
        None => ValuationTarget::now(vehicle.clone()),
    };
    let result = session.engine.estimate_target(&target, session.records());
    info!(
        cohort_size = result.cohort_size(),
        estimate = ?result.estimated_value(),
        "valuation finished"
    );

    let margin = deduction_margin(&args, config)?;
    let payout = result
        .valuation()
        .filter(|_| margin > 0.0)
        .map(|v| PayoutQuote::for_valuation(v, margin));

    println!(
        "{}",
        crate::report::format_valuation(&vehicle, &result, payout.as_ref())
    );

    if let Some(path) = &args.export_json {
        crate::io::export::write_valuation_json(path, &result)?;
        info!(path = %path.display(), "wrote valuation JSON");
    }
    if let Some(path) = &args.export_neighbors {
        match result.valuation() {
            Some(valuation) => {
                crate::io::export::write_neighbors_csv(path, valuation)?;
                info!(path = %path.display(), "wrote neighbors CSV");
            }
            None => warn!("no estimate, neighbors CSV not written"),
        }
    }
    Ok(())
}

/// The CLI margin wins over `COMPS_DEDUCTION_MARGIN`.
fn deduction_margin(args: &ValueArgs, config: &AppConfig) -> Result<f64, AppError> {
    match args.deduction_margin {
        Some(margin) => parse_margin(&margin.to_string())
            .map_err(|_| AppError::input(format!("--deduction-margin must be >= 0 (got {margin})"))),
        None => Ok(config.deduction_margin),
    }
}

fn handle_explore(args: ExploreArgs, session: Session) -> Result<(), AppError> {
    println!("{}", ledger_summary(&session));

    let output = session.explore(&args.auction_id)?;
    info!(
        auction_id = %output.historical.source_auction.auction_id,
        visible_cohort = output.historical.full_cohort.len(),
        "historical valuation finished"
    );

    println!("{}", crate::report::format_historical(&output.historical));
    match &output.insights {
        Some(insights) => println!(
            "{}",
            crate::report::format_insights(insights, output.profile.as_ref())
        ),
        None => println!("No dealer insights (no estimate for this auction)."),
    }

    if let Some(path) = &args.export_json {
        crate::io::export::write_json(path, &output, "exploration JSON")?;
        info!(path = %path.display(), "wrote exploration JSON");
    }
    Ok(())
}

fn handle_backtest(args: BacktestArgs, session: Session) -> Result<(), AppError> {
    println!("{}", ledger_summary(&session));

    info!(top = args.top, "running backtest");
    let report = session.backtest(args.top)?;
    for skip in &report.skipped {
        info!(auction_id = %skip.auction_id, reason = skip.reason.message(), "target skipped");
    }

    println!("{}", crate::report::format_backtest(&report));

    if args.worst > 0 {
        let worst = crate::report::worst_predictions(&report.entries, args.worst);
        println!("Worst {} predictions:", worst.len());
        for entry in &worst {
            println!(
                "  {:<12} actual {:>9}  predicted {:>9}  error {:>+7.1}%",
                entry.auction_id,
                crate::report::fmt_thousands(entry.actual_price.round() as i64),
                crate::report::fmt_thousands(entry.predicted_value),
                entry.signed_error_pct
            );
        }
    }

    if let Some(path) = &args.export {
        crate::io::export::write_backtest_csv(path, &report)?;
        info!(path = %path.display(), "wrote backtest CSV");
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let mut config = SampleConfig {
        count: args.count,
        seed: args.seed,
        span_days: args.span_days,
        ..SampleConfig::default()
    };
    config.end = args.end.unwrap_or_else(chrono::Utc::now);

    let records = generate_sample_ledger(&config)?;
    crate::io::export::write_ledger_csv(&args.out, &records)?;
    info!(path = %args.out.display(), count = records.len(), seed = args.seed, "wrote sample ledger");
    println!("Wrote {} auctions to {}", records.len(), args.out.display());
    Ok(())
}

fn handle_weights(args: WeightsArgs) -> Result<(), AppError> {
    crate::io::weights::write_weights_json(&args.out, &ValuationWeights::default())?;
    println!("Wrote default weights to {}", args.out.display());
    Ok(())
}

fn ledger_summary(session: &Session) -> String {
    crate::report::format_ledger_summary(
        &session.ledger,
        &session.ledger_path.display().to_string(),
    )
}
